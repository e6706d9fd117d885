mod cli;
mod config;
mod domain;
mod error;
mod infra;
mod logging;
mod media;
mod workflows;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};

use cli::{Cli, Command, PreferencesArgs};
use config::Settings;
use infra::plex::PlexClient;
use media::guesser::KeywordGuesser;
use workflows::{preferences, report};

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.debug);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.url, cli.token)?;
    let mut client = PlexClient::new(&settings);
    debug!("Connected to {}", settings.url);

    match cli.command {
        Command::Preferences(args) => save_preferences(&mut client, &args),
    }
}

fn save_preferences(client: &mut PlexClient, args: &PreferencesArgs) -> Result<()> {
    let criteria = args.criteria()?;
    let prefs = args.preferences()?;
    if args.dry_run {
        info!("Dry run, no change will be saved");
    }

    let summary = preferences::run(client, &criteria, &prefs, &KeywordGuesser, args.dry_run)?;
    if summary.found == 0 {
        println!("No video found {criteria}");
        return Ok(());
    }

    for line in report::render(&summary, args.full_summary) {
        println!("{line}");
    }
    Ok(())
}
