//! # server
//!
//! AirAware prediction service binary.

use server::{router, PredictionService, ServerConfig};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (optional - won't fail if missing)
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "server=info,model=info,tower_http=info".into()),
        )
        .init();

    let config = ServerConfig::from_env().expect("invalid server configuration");
    let addr = config.socket_addr().expect("Invalid HOST:PORT configuration");

    let service = Arc::new(PredictionService::load(&config.model_path));
    let app = router(service);

    tracing::info!("server v{} listening on {}", env!("CARGO_PKG_VERSION"), addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listener");
    axum::serve(listener, app).await.expect("server error");
}
