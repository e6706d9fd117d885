use tracing_subscriber::EnvFilter;

/// Logs to stderr at INFO, or DEBUG with `debug`. `RUST_LOG` takes precedence.
pub fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("watchpref={level},warn")));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(filter)
        .init();

    tracing::debug!("Debug logging enabled");
}
