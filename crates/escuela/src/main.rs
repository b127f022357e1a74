use std::path::PathBuf;

use anyhow::Context;
use escuela::{bootstrap, logging, AppConfig};
use tracing::info;

fn main() -> anyhow::Result<()> {
    // Optional single argument: path to a JSON config file.
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => AppConfig::load_from_file(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AppConfig::default(),
    };
    logging::setup_logging(&config)?;

    let summaries = bootstrap::run(&config)?;
    for summary in &summaries {
        info!("{} ({} rows)", summary.path.display(), summary.rows);
    }

    Ok(())
}
