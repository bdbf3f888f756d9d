use crate::error::ConfigError;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Installs the global JSON log subscriber, writing to stdout.
///
/// `level` is the configured default; an unrecognised value means `info`.
/// `RUST_LOG`, when set, takes precedence. Must be called once per process.
pub fn init_tracing(level: &str) -> Result<(), ConfigError> {
    let filter = EnvFilter::builder()
        .with_default_directive(parse_level(level).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .try_init()
        .map_err(|e| ConfigError::LoggingError(e.to_string()))
}

fn parse_level(level: &str) -> LevelFilter {
    // `LevelFilter` parses "" as ERROR.
    let level = level.trim();
    if level.is_empty() {
        return LevelFilter::INFO;
    }
    level.parse().unwrap_or(LevelFilter::INFO)
}
