//! Handler for the `config` command group.

use std::fs;
use std::path::Path;

use crate::adapter::inbound::cli::output;
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::settings::{Config, ENV_API_KEY, ENV_BOT_TOKEN};

/// Default config template with documentation.
const CONFIG_TEMPLATE: &str = include_str!("../../../../config.toml.example");

/// Execute `config init`.
pub fn execute_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(ConfigError::InvalidValue {
            field: "config",
            reason: "file already exists (use --force to overwrite)".to_string(),
        }
        .into());
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(path, CONFIG_TEMPLATE)?;
    output::section("Config Initialized");
    output::success("Created configuration file");
    output::field("Path", path.display());
    output::section("Next Steps");
    output::note(&format!("1. Set source.shop_id in {}", path.display()));
    output::note(&format!("2. Export {ENV_BOT_TOKEN} and {ENV_API_KEY}"));
    output::note(&format!("3. Run: orderbell config validate -c {}", path.display()));
    output::note(&format!("4. Run: orderbell run -c {}", path.display()));
    Ok(())
}

/// Execute `config show`.
pub fn execute_show(path: &Path) -> Result<()> {
    let config = Config::load(path)?;

    output::section("Source");
    output::field("Orders", config.source.orders_url());
    output::field("Shop", &config.source.shop_id);
    output::field("Status", &config.source.status);
    output::field("API key", presence(config.default_credential().is_some()));
    output::field(
        "Timeouts",
        format!(
            "{}ms / connect {}ms",
            config.source.http.timeout_ms, config.source.http.connect_timeout_ms
        ),
    );

    output::section("Telegram");
    output::field("Bot token", presence(config.telegram.token().is_some()));
    output::field(
        "Chat",
        config
            .telegram
            .chat_id
            .map_or_else(|| "(none)".to_string(), |id| id.to_string()),
    );
    output::field("Commands", enabled(config.telegram.commands_enabled));
    if !config.telegram.allowed_chats.is_empty() {
        let chats: Vec<String> = config
            .telegram
            .allowed_chats
            .iter()
            .map(ToString::to_string)
            .collect();
        output::field("Allowed chats", chats.join(", "));
    }

    output::section("Dedup");
    output::field("Backend", config.dedup.backend);
    output::field("Granularity", config.dedup.granularity);
    output::field("Retention", format!("{}h", config.dedup.retention_hours));
    output::field("Sweep", format!("{}s", config.dedup.sweep_interval_secs));

    output::section("Schedule");
    output::field("Poll", format!("{}s", config.schedule.poll_interval_secs));
    output::field("Pacing", format!("{}ms", config.schedule.pacing_ms));
    output::field("UTC offset", format!("{:+}h", config.schedule.utc_offset_hours));
    output::field("Report time", &config.schedule.report_time);
    output::field("Digest", enabled(config.schedule.digest_enabled));

    output::section("Storage");
    output::field("Database", &config.database);
    output::field("Log level", &config.logging.level);
    Ok(())
}

/// Execute `config validate`.
pub fn execute_validate(path: &Path) -> Result<()> {
    output::section("Config Validation");
    output::field("Path", path.display());
    let config = Config::load(path)?;
    output::success("Config file is valid");

    let warnings = readiness_warnings(&config);
    if !warnings.is_empty() {
        output::section("Warnings");
        for warning in &warnings {
            output::warning(warning);
        }
    }

    output::field("Next", format!("orderbell config show -c {}", path.display()));
    Ok(())
}

/// Problems that do not make the file invalid but would hamper `run`.
fn readiness_warnings(config: &Config) -> Vec<String> {
    let mut warnings = Vec::new();
    if config.telegram.token().is_none() {
        warnings.push(format!("No bot token; `run` needs {ENV_BOT_TOKEN}"));
    }
    if config.default_credential().is_none() {
        warnings.push(format!(
            "No default API key ({ENV_API_KEY}); chats must send /config themselves"
        ));
    }
    if config.telegram.chat_id.is_none() && !config.telegram.commands_enabled {
        warnings.push("No chat_id and commands disabled; nobody can register".to_string());
    }
    warnings
}

fn presence(set: bool) -> &'static str {
    if set {
        "set"
    } else {
        "not set"
    }
}

fn enabled(on: bool) -> &'static str {
    if on {
        "enabled"
    } else {
        "disabled"
    }
}
