// =============================================================================
// AVMo AI Service - Main Entry Point
// =============================================================================
//
// Project: ShaydZ AVMo - Virtual Mobile Device Platform
// Contributors: AVMo Development Team
// Version: 0.1.0
// License: MIT
//
// Description:
//   Loads configuration, initializes tracing, wires the recommendation
//   engine and serves the HTTP API until Ctrl+C or SIGTERM.
//
// Build Requirements:
//   • cargo build --bin avmo-ai
//   • cargo build --features="backend_postgresql" --bin avmo-ai
//
// =============================================================================

use std::net::SocketAddr;

use anyhow::Context;
use tokio::{net::TcpListener, signal};
use tracing::{error, info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

use avmo_ai::{retention, service, Config};

mod clap;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let args = clap::parse();

    let mut config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("It looks like your config is invalid. The following error occurred: {e}");
            std::process::exit(1);
        }
    };
    if let Some(level) = args.log_level {
        config.log = level;
    }

    match args.command {
        clap::Commands::Config => match toml::to_string_pretty(&config) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => {
                eprintln!("Failed to render configuration: {e}");
                std::process::exit(1);
            }
        },
        clap::Commands::Start { address, port } => {
            if let Some(address) = address {
                match address.parse() {
                    Ok(addr) => config.address = addr,
                    Err(_) => {
                        eprintln!("Invalid address format: {address}");
                        std::process::exit(1);
                    }
                }
            }
            if let Some(port) = port {
                config.port = port;
            }

            init_tracing(&config);
            if let Err(e) = start_server(config).await {
                error!("❌ Server crashed: {:#}", e);
                std::process::exit(1);
            }
        }
    }
}

fn init_tracing(config: &Config) {
    let registry = tracing_subscriber::Registry::default();
    let fmt_layer = tracing_subscriber::fmt::Layer::new();
    let filter_layer = match EnvFilter::try_new(&config.log) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("It looks like your log filter is invalid. The following error occurred while parsing it: {e}");
            EnvFilter::new("warn")
        }
    };

    let subscriber = registry.with(filter_layer).with(fmt_layer);
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install tracing subscriber: {e}");
    }
}

async fn start_server(config: Config) -> anyhow::Result<()> {
    info!("🚀 Starting AVMo AI Service {}", clap::version());

    let services = service::build_services(&config)
        .await
        .context("failed to initialize services")?;

    let sweeper = retention::spawn_sweeper(
        services.interactions.clone(),
        services.feature_usage.clone(),
        config.retention.clone(),
    );

    let app = avmo_api::create_router(services.state);
    let addr = SocketAddr::from((config.address, config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("🚀 AVMo AI Service listening on: {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    info!("✅ Server shutdown completed successfully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let sig: &str;

    tokio::select! {
        _ = ctrl_c => { sig = "Ctrl+C"; },
        _ = terminate => { sig = "SIGTERM"; },
    }

    warn!("Received {}, shutting down...", sig);
}
