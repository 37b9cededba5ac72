//! pagegate
//!
//! Serves a site's content directory with password gates on configured paths.

use clap::Parser;
use pagegate::{
    alias::StaticAliases,
    auth::TokenPermissions,
    config::{AppConfig, LogFormat, StorageBackend, load_config},
    gate::{AccessGate, LogOnlySuppressor},
    server::{AppState, run_server},
    session::MemoryUnlocks,
    store::{JsonFileStore, MemoryStore, PageStore},
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// pagegate - password-protect parts of a web site
#[derive(Parser, Debug)]
#[command(name = "pagegate")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "PAGEGATE_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "PAGEGATE_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Bind host
    #[arg(long, env = "PAGEGATE_HOST")]
    host: Option<String>,

    /// Bind port
    #[arg(long, env = "PAGEGATE_PORT")]
    port: Option<u16>,
}

fn init_tracing(args: &Args, config: &AppConfig) {
    let level = if args.log_level == "info" {
        config.logging.level.clone()
    } else {
        args.log_level.clone()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match config.logging.format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init(),
    }
}

async fn build_store(config: &AppConfig) -> anyhow::Result<Arc<dyn PageStore>> {
    Ok(match config.storage.backend {
        StorageBackend::File => {
            let expanded = shellexpand::tilde(&config.storage.path);
            Arc::new(JsonFileStore::open(expanded.as_ref()).await?)
        }
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let mut config = load_config(args.config.as_deref())
        .inspect_err(|e| eprintln!("Failed to load configuration: {e}"))?;
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    // Initialize logging
    init_tracing(&args, &config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = config.server.port,
        "Starting pagegate"
    );

    if config.protection.admin_token.is_none() {
        info!("No admin token configured; the /admin API is disabled");
    }

    // Assemble the gate and its collaborators
    let store = build_store(&config)
        .await
        .inspect_err(|e| error!(error = %e, "Failed to open page store"))?;

    let sessions = Arc::new(match config.protection.session_ttl_secs {
        0 => MemoryUnlocks::new(),
        secs => MemoryUnlocks::with_ttl(Duration::from_secs(secs)),
    });

    let aliases = Arc::new(StaticAliases::new(&config.aliases));

    let permissions = Arc::new(TokenPermissions::new(
        config.protection.bypass_token.clone(),
        config.protection.admin_token.clone(),
    ));

    let gate = Arc::new(AccessGate::new(
        store.clone(),
        sessions.clone(),
        aliases.clone(),
        permissions.clone(),
        Arc::new(LogOnlySuppressor),
        config.protection.login_path.clone(),
    ));

    let state = AppState {
        gate,
        store,
        sessions,
        aliases,
        permissions,
        config: Arc::new(config),
    };

    run_server(state).await
}
