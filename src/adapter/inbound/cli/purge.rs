//! Handler for the `purge` command.

use std::path::Path;

use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;

/// Delete expired dedup records once and report how many went.
pub async fn execute(path: &Path) -> Result<()> {
    let config = Config::load(path)?;
    let removed = bootstrap::purge_once(&config).await?;

    output::success(&format!("Removed {removed} expired notification records"));
    output::field("Backend", config.dedup.backend);
    output::field("Retention", format!("{}h", config.dedup.retention_hours));
    Ok(())
}
