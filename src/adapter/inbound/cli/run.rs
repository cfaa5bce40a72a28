//! Handler for the `run` command.

use tokio::sync::watch;
use tracing::{info, warn};

use crate::adapter::inbound::cli::command::RunArgs;
use crate::adapter::inbound::cli::output;
use crate::error::{ConfigError, Result};
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::logging::LogFormat;
use crate::infrastructure::config::settings::Config;

/// Execute the run command.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let mut config = Config::load(&args.config.config)?;
    apply_overrides(&mut config, args, output::is_json())?;
    config.init_logging();

    if !output::is_quiet() || output::is_json() {
        print_startup(&config);
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let service = bootstrap::run_with_shutdown(config, shutdown_rx);
    tokio::pin!(service);

    tokio::select! {
        result = &mut service => return result,
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!(error = %e, "Failed to listen for Ctrl-C, shutting down");
            }
            info!("Shutdown signal received");
        }
    }

    shutdown_tx.send_replace(true);
    service.await?;
    info!("orderbell stopped");
    Ok(())
}

fn apply_overrides(config: &mut Config, args: &RunArgs, force_json_logs: bool) -> Result<()> {
    if let Some(level) = &args.log_level {
        config.logging.level.clone_from(level);
    }
    if args.json_logs || force_json_logs {
        config.logging.format = LogFormat::Json;
    }
    if let Some(secs) = args.poll_interval {
        if secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "poll_interval",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        config.schedule.poll_interval_secs = secs;
    }
    if let Some(path) = &args.database {
        config.database = path.to_string_lossy().into_owned();
    }
    Ok(())
}

fn print_startup(config: &Config) {
    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Shop", &config.source.shop_id);
    output::field("Orders", config.source.orders_url());
    output::field("Dedup", format!("{} ({})", config.dedup.backend, config.dedup.granularity));
    output::field("Retention", format!("{}h", config.dedup.retention_hours));
    output::field("Poll", format!("{}s", config.schedule.poll_interval_secs));
    output::field("Database", &config.database);
    if output::verbosity() > 0 {
        output::field("Pacing", format!("{}ms", config.schedule.pacing_ms));
        output::field("UTC offset", format!("{:+}h", config.schedule.utc_offset_hours));
        output::field("Report time", &config.schedule.report_time);
    }
}
