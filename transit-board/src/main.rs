use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use transit_board::cache::{CacheConfig, CachingTransport};
use transit_board::prim::{HttpTransport, PrimClient, PrimConfig};
use transit_board::web::{AppState, create_router};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,transit_board=debug")),
        )
        .init();

    // A missing API key is logged; upstream answers 401 until it is set
    let prim_config = PrimConfig::from_env();

    let cache_config = CacheConfig::default();
    let transport = CachingTransport::new(HttpTransport::new(&prim_config)?, &cache_config);
    let client = PrimClient::new(&prim_config, Arc::new(transport))?;

    let state = AppState::new(client, cache_config.refresh);
    let app = create_router(state);

    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
        .parse()?;

    info!(%addr, base_url = %prim_config.base_url, "transit board listening");
    info!("GET /api/passages/:stop_id, /api/passages/bulk?stops=, /api/passages/line/:line_id");
    info!("GET /api/trafic, /api/messages/trafic, /api/messages/affichage");
    info!("GET /api/search?q=, /api/line-stops/:line_id, /health");
    info!("GET /api/incidents?lineId=, /api/late-chance?lines=");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
