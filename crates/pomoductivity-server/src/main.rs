use std::path::PathBuf;

use clap::Parser;
use pomoductivity_core::Config;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "pomoductivity_core=info,pomoductivity_server=info,tower_http=info";

#[derive(Parser)]
#[command(name = "pomoductivity-server", version, about = "Pomoductivity timer server")]
struct Cli {
    /// Config file (defaults to ~/.config/pomoductivity/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Port to listen on; overrides config and PORT
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let (state, driver) = pomoductivity_server::start(&config.alerts);
    let timer = state.timer.clone();
    let app = pomoductivity_server::router(state, &config.server.cors_origin);

    let listener = TcpListener::bind(("0.0.0.0", config.server.port)).await?;
    info!(
        addr = %listener.local_addr()?,
        environment = %config.server.environment,
        cors_origin = %config.server.cors_origin,
        "pomoductivity server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Err(e) = timer.shutdown().await {
        warn!(error = %e, "timer driver already gone");
    }
    driver.await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(e) => {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    }
}
