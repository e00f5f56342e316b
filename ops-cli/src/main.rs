use anyhow::Context;
use clap::Parser;
use config_engine::{AppConfig, ConfigLoader};
use database_layer::DatabasePool;
use logger_redacted::init_logging;
use std::process::ExitCode;
use tracing::{error, info};

use ops_cli::{exit_code, run_command, Cli};

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    let mut config = loader.load().context("loading configuration")?;
    if let Some(url) = &cli.database_url {
        config.database.url = url.clone();
    }
    if cli.verbose {
        config.logging.log_level = "debug".to_string();
    }
    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<String> {
    let config = load_config(&cli)?;
    init_logging(&config.logging).context("initializing logging")?;

    info!(
        command = cli.command.name(),
        database = %config.database.masked_url(),
        "lexledger-ops starting"
    );
    let pool = DatabasePool::connect(&config.database)
        .await
        .context("connecting to the database")?;

    run_command(&cli, &config, pool).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %format!("{:#}", e), "Command failed");
            eprintln!("error: {:#}", e);
            let code = u8::try_from(exit_code(&e)).unwrap_or(1);
            ExitCode::from(code)
        }
    }
}
