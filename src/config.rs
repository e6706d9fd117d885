use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    url: Option<String>,
    token: Option<String>,
}

/// Connection settings of the Plex server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub url: String,
    pub token: String,
}

impl Settings {
    /// Resolves the settings from the command line, then the `PLEX_URL` and
    /// `PLEX_TOKEN` environment variables, then the config file.
    pub fn load(url: Option<String>, token: Option<String>) -> Result<Self> {
        load_from(&get_config_path(), url, token, |name| env::var(name).ok())
    }
}

fn load_from(
    config_path: &Path,
    url: Option<String>,
    token: Option<String>,
    env_var: impl Fn(&str) -> Option<String>,
) -> Result<Settings> {
    let url = url.or_else(|| env_var("PLEX_URL"));
    let token = token.or_else(|| env_var("PLEX_TOKEN"));

    let file = if (url.is_none() || token.is_none()) && config_path.exists() {
        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        toml::from_str(&config_content)
            .with_context(|| format!("Invalid config file {}", config_path.display()))?
    } else {
        ConfigFile::default()
    };

    let Some(url) = url.or(file.url) else {
        bail!(
            "Plex URL not found. Use --url, set PLEX_URL or add url = \"http://host:32400\" to {}",
            config_path.display()
        )
    };
    let Some(token) = token.or(file.token) else {
        bail!(
            "Plex token not found. Use --token, set PLEX_TOKEN or add token = \"your-token\" to {}",
            config_path.display()
        )
    };

    Ok(Settings { url, token })
}

fn get_config_dir_path() -> PathBuf {
    xdir::config()
        .map(|path| path.join("watchpref"))
        // If the standard path could not be found (e.g.`$HOME` is not set),
        // default to the current directory.
        .unwrap_or_default()
}

fn get_config_path() -> PathBuf {
    get_config_dir_path().join("config.toml")
}
