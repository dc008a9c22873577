//! authgate CLI binary entry point.

use authgate::cli::commands::{handle_call, handle_check_auth, resolve_config};
use authgate::cli::{Cli, Commands};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("authgate=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match resolve_config(&cli) {
        Ok(config) => match &cli.command {
            Commands::CheckAuth(args) => handle_check_auth(config, args).await,
            Commands::Call(args) => handle_call(config, args).await,
        },
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
