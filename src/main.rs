mod cli;

use apiwire_core::ApiClient;
use clap::Parser;

use crate::cli::{Cli, load_config, resolve_config_path, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_subscriber();

    let cli = Cli::parse();
    let config_path = resolve_config_path(cli.config.clone());
    let config = load_config(&config_path)?;
    let client_config = config.client_config()?;
    let client = ApiClient::new(&client_config)?;

    let body = run(&client, &cli).await?;
    println!("{body}");
    Ok(())
}

// Logs go to stderr so stdout carries only the response body.
fn init_subscriber() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
