//! CLI module graph and command dispatch.

pub mod command;
pub mod config;
pub mod fetch;
pub mod output;
pub mod paths;
pub mod purge;
pub mod run;

use crate::error::Result;

use command::{Cli, Commands, ConfigCommand};

/// Apply global flags, then run the selected command.
///
/// # Errors
///
/// Returns whatever the command handler returns.
pub async fn execute(cli: Cli) -> Result<()> {
    output::apply_color(cli.color);
    output::configure(output::OutputConfig::new(cli.json, cli.quiet, cli.verbose));

    match cli.command {
        Commands::Run(args) => run::execute(&args).await,
        Commands::Fetch(args) => fetch::execute(&args).await,
        Commands::Purge(arg) => purge::execute(&arg.config).await,
        Commands::Config(ConfigCommand::Init(args)) => config::execute_init(&args.path, args.force),
        Commands::Config(ConfigCommand::Show(arg)) => config::execute_show(&arg.config),
        Commands::Config(ConfigCommand::Validate(arg)) => config::execute_validate(&arg.config),
    }
}

