use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use funed::config;
use funed::web::{self, AppState};

const WORKSPACE_SWEEP_SECS: u64 = 600;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists
    if let Err(e) = dotenvy::dotenv() {
        println!("No .env file found, using environment variables: {}", e);
    }

    let settings = config::get_settings();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if settings.json_logs() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("Starting {} {}...", settings.app_name, settings.version);
    info!(
        "Backend at {} (courses at {}, write policy {:?})",
        settings.api_url, settings.courses_path, settings.write_policy
    );

    let state = AppState::new(settings.clone())?;
    state
        .workspaces
        .start_sweep_task(Duration::from_secs(WORKSPACE_SWEEP_SECS));
    info!(
        "Admin workspace sweep every {} seconds",
        WORKSPACE_SWEEP_SECS
    );
    let app = web::router(state);

    // Create server address
    let addr: SocketAddr = settings.address().parse()?;

    info!("{} started on http://{}", settings.app_name, addr);

    // Start server with graceful shutdown
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutting down FUNED web...");
        },
        _ = terminate => {
            info!("Shutting down FUNED web...");
        },
    }
}
