//! Command-line interface definitions.
//!
//! Defines the CLI structure for orderbell using `clap`: run the service,
//! preview the current orders, sweep expired dedup records, and manage the
//! configuration file.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::paths;

/// Watch seller orders and announce new ones to Telegram
#[derive(Parser, Debug)]
#[command(name = "orderbell")]
#[command(version)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll orders and deliver notifications until interrupted
    Run(RunArgs),

    /// Fetch current orders and print the notifications (nothing is sent)
    Fetch(FetchArgs),

    /// Delete dedup records older than the retention window
    Purge(ConfigPathArg),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Subcommands for `orderbell config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Generate a new configuration file from template.
    Init(ConfigInitArgs),
    /// Display the effective configuration with defaults applied.
    Show(ConfigPathArg),
    /// Validate a configuration file for correctness.
    Validate(ConfigPathArg),
}

/// Shared argument struct for commands that require only a configuration path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,
}

/// Arguments for `run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigPathArg,

    /// Override the log level (e.g. debug, info, warn)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Override the poll interval in seconds
    #[arg(long, value_name = "SECS")]
    pub poll_interval: Option<u64>,

    /// Override the SQLite database path
    #[arg(long)]
    pub database: Option<PathBuf>,
}

/// Arguments for `fetch`.
#[derive(Parser, Debug)]
pub struct FetchArgs {
    #[command(flatten)]
    pub config: ConfigPathArg,

    /// Only show items not yet announced to this chat (read-only check)
    #[arg(long, value_name = "CHAT_ID")]
    pub unseen_for: Option<i64>,
}

/// Arguments for `config init`.
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Output path for the generated configuration file.
    #[arg(default_value_os_t = paths::default_config())]
    pub path: PathBuf,
    /// Overwrite the file if it already exists.
    #[arg(long)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_name() {
        assert_eq!(Cli::command().get_name(), "orderbell");
    }

    #[test]
    fn parse_run_with_defaults() {
        let cli = Cli::try_parse_from(["orderbell", "run"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.config.config, paths::default_config());
        assert!(args.log_level.is_none());
        assert!(!args.json_logs);
        assert!(!cli.json);
        assert!(!cli.quiet);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn parse_run_overrides() {
        let cli = Cli::try_parse_from([
            "orderbell",
            "run",
            "-c",
            "/etc/orderbell.toml",
            "--poll-interval",
            "30",
            "--json-logs",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.config.config, PathBuf::from("/etc/orderbell.toml"));
        assert_eq!(args.poll_interval, Some(30));
        assert!(args.json_logs);
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["orderbell", "purge", "--json", "-vv"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Purge(_)));
    }

    #[test]
    fn parse_color_never() {
        let cli = Cli::try_parse_from(["orderbell", "--color", "never", "purge"]).unwrap();
        assert!(matches!(cli.color, ColorChoice::Never));
    }

    #[test]
    fn parse_fetch_unseen_for() {
        let cli = Cli::try_parse_from(["orderbell", "fetch", "--unseen-for", "-100123"]).unwrap();
        let Commands::Fetch(args) = cli.command else {
            panic!("expected fetch");
        };
        assert_eq!(args.unseen_for, Some(-100_123));
    }

    #[test]
    fn parse_config_validate() {
        let cli = Cli::try_parse_from(["orderbell", "config", "validate", "-c", "x.toml"]).unwrap();
        let Commands::Config(ConfigCommand::Validate(arg)) = cli.command else {
            panic!("expected config validate");
        };
        assert_eq!(arg.config, PathBuf::from("x.toml"));
    }

    #[test]
    fn missing_subcommand_is_an_error() {
        assert!(Cli::try_parse_from(["orderbell"]).is_err());
    }
}
