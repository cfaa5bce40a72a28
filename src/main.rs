use clap::Parser;

use orderbell::adapter::inbound::cli::command::Cli;
use orderbell::adapter::inbound::cli::{self, output};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    // reqwest and teloxide share one TLS stack; pin its crypto provider.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();
    if let Err(e) = cli::execute(cli).await {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
