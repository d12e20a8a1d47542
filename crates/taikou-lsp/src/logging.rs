use tracing_subscriber::EnvFilter;

/// Install the stderr logger. Stdout carries the protocol and must stay clean.
///
/// The filter comes from `--log-level` if given, else `RUST_LOG`, else `info`.
pub fn init_logging(log_level: Option<&str>) {
    let filter = match log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let result = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .try_init();

    if let Err(e) = result {
        eprintln!("Failed to install logger: {}", e);
    }
}
