use hyperliquid_recon::application::handlers::pnl_handler::{router, AppState};
use hyperliquid_recon::application::services::reconciliation_service::ReconciliationService;
use hyperliquid_recon::config::AppConfig;
use hyperliquid_recon::domain::value_objects::history_days::HistoryDays;
use hyperliquid_recon::infrastructure::hyperliquid_client::HyperliquidClient;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine; real environment variables still apply
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hyperliquid_recon=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();
    info!(
        "Configuration loaded: api={}, history={}d, batch={}, pacing={}ms, freshness={}s, stale policy={:?}",
        config.api_url,
        config.trade_history_days,
        config.max_trades_per_batch,
        config.rate_limit_delay_ms,
        config.cache_freshness_seconds,
        config.stale_policy
    );

    let client = HyperliquidClient::new(config.hyperliquid())?;
    let service = ReconciliationService::with_policy(Arc::new(client), config.refresh_policy());
    let default_days = HistoryDays::new(config.trade_history_days)?;

    let app = router(AppState {
        service: Arc::new(service),
        default_days,
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C signal"),
            Err(e) => error!("Failed to install Ctrl+C handler: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received SIGTERM signal");
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
