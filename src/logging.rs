use tracing::subscriber::SetGlobalDefaultError;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Installs the global tracing subscriber.
///
/// The level is read from the `LOGGER_LEVEL` environment variable
/// (`error`, `warn`, `info`, `debug`, `trace`), defaulting to `info`.
pub fn init_logging() -> Result<(), SetGlobalDefaultError> {
    let level = std::env::var("LOGGER_LEVEL")
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_line_number(true)
        .with_file(true)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
}
