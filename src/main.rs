use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{watch, Mutex};
use tracing::info;

use latticedb::{config::Config, db::core::Keyspace, db::sweeper, server};

/// LatticeDB - an in-memory key-value server speaking a simplified RESP dialect
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "latticedb.toml")]
    config: String,

    /// Override bind address
    #[arg(long)]
    bind: Option<String>,

    /// Override port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();

    let mut config = Config::from_file(&args.config).unwrap_or_else(|e| {
        eprintln!("warning: failed to load config file: {}", e);
        eprintln!("using default configuration");
        Config::default()
    });

    if let Some(bind) = args.bind {
        config.server.bind_address = bind;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .init();

    latticedb::observability::metrics::init_metrics(&config.server.bind_address, 9100);

    info!("starting LatticeDB server");
    info!("configuration loaded from: {}", args.config);
    info!(address = %config.server_address(), "listening");
    info!(max_connections = config.server.max_connections, "connection limit");

    let keyspace = Arc::new(Mutex::new(Keyspace::new()));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let sweep_interval = std::time::Duration::from_millis(config.server.sweep_interval_ms);
    tokio::spawn(sweeper::run(
        Arc::clone(&keyspace),
        sweep_interval,
        shutdown_rx.clone(),
    ));

    tokio::spawn({
        let shutdown_tx = shutdown_tx.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("received shutdown signal");
                let _ = shutdown_tx.send(true);
            }
        }
    });

    let listener = TcpListener::bind(&config.server_address()).await?;
    server::run(listener, keyspace, config.server.max_connections, shutdown_rx).await;

    info!("shut down");
    Ok(())
}
