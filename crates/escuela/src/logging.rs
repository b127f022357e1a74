use crate::config::AppConfig;
use crate::error::ConfigError;

/// Installs the global fmt subscriber at the configured level.
pub fn setup_logging(config: &AppConfig) -> Result<(), ConfigError> {
    let level = config.log_level()?;
    tracing_subscriber::fmt().with_max_level(level).init();
    Ok(())
}
