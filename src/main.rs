use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use grokart_admin::cli::{self, Cli, Commands};
use grokart_admin::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Setup logging
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::debug!("Backend: {}", config.api_url);

    let command = cli.command.unwrap_or(Commands::Watch {
        status: "All".to_string(),
    });
    if let Err(e) = cli::run(command, &config).await {
        tracing::error!("Command failed: {:#}", e);
        eprintln!("✗ {}", cli::failure_message(&e));
        std::process::exit(1);
    }

    Ok(())
}
