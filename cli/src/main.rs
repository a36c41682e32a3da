use clap::Parser;
use colored::*;
use dotenvy::dotenv;
use inukadas_cli::{CliConfig, ProxyClient};
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod output;

use crate::cli::Args;

#[tokio::main]
async fn main() {
    dotenv().ok();
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut config = CliConfig::load_from_default()?;
    config.apply_env_from(|key| std::env::var(key).ok());

    // Flags win over file and environment
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(token) = args.id_token {
        config.id_token = Some(token);
    }
    if let Some(store) = args.store {
        config.store_path = Some(store);
    }

    let client = ProxyClient::new(&config)?;
    app::run(args.command, &client, config.resolved_store_path()).await
}
