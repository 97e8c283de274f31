use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use newspaper_catalog::{
    config::Config,
    api::routes::create_router,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();

    // Load configuration
    let config = Config::load()?;
    let server_addr = config.server_addr;
    info!(
        catalog = %config.catalog_url,
        cache_key = %config.cache_key,
        redis = ?config.redis,
        strict_cache = config.cache_write_strict,
        "configuration loaded"
    );

    let app_state = AppState::from_config(&config)?;
    let app = create_router(app_state);

    let listener = TcpListener::bind(server_addr).await?;

    info!(%server_addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
