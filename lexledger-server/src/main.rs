use accounting_service::store::PostgresLedgerStore;
use accounting_service::AccountingService;
use anyhow::Context;
use clap::Parser;
use config_engine::ConfigLoader;
use database_layer::{run_migrations, DatabasePool};
use logger_redacted::{init_logging, PiiRedactor};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use lexledger_server::{create_app, LedgerServer};

/// LexLedger HTTP Server
#[derive(Parser, Debug)]
#[command(name = "lexledger-server", version)]
#[command(about = "Ledger and trust accounting HTTP API")]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "LEXLEDGER_CONFIG")]
    config: Option<PathBuf>,

    /// Server bind address, overrides the configuration
    #[arg(long)]
    host: Option<String>,

    /// Server port, overrides the configuration
    #[arg(short, long)]
    port: Option<u16>,

    /// Serve from an in-memory store instead of PostgreSQL
    #[arg(long)]
    in_memory: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_file(path);
    }
    let mut config = loader.load().context("loading configuration")?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.verbose {
        config.logging.log_level = "debug".to_string();
    }

    init_logging(&config.logging).context("initializing logging")?;
    info!(version = env!("CARGO_PKG_VERSION"), "Starting LexLedger server");

    let redactor = PiiRedactor::from_enabled(config.logging.redaction_enabled);
    let server = if args.in_memory {
        info!("Using in-memory ledger store");
        let store = Arc::new(accounting_service::store::InMemoryLedgerStore::new());
        LedgerServer::new(AccountingService::new(store, config.ledger.clone(), redactor)?)
    } else {
        info!(database = %config.database.masked_url(), "Connecting to database");
        let pool = DatabasePool::connect(&config.database)
            .await
            .context("connecting to the database")?;
        if config.database.run_migrations {
            run_migrations(&pool).await.context("running migrations")?;
        }
        let store = Arc::new(PostgresLedgerStore::new(pool.clone()));
        LedgerServer::new(AccountingService::new(store, config.ledger.clone(), redactor)?)
            .with_database(pool)
    };

    let app = create_app(server, &config.server);
    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;

    info!(address = %addr, "LexLedger server listening");
    info!("Health check available at: http://{}/health", addr);
    info!("API v1 available at: http://{}/api/v1", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    info!("LexLedger server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
