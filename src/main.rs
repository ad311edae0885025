// Page Builder Server

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use page_builder::{
    app_state::AppState,
    config::Config,
    routes::create_app_router,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing, `RUST_LOG` overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize application state
    let app_state = AppState::new(config.clone()).await?;

    let app = create_app_router(app_state);

    // Start server
    let addr = config.server_address();
    let listener = TcpListener::bind(&addr).await?;
    info!("Page builder running on http://{}", addr);
    info!("  GET    /api                       - List collections");
    info!("  GET    /api/{{collection}}          - List items");
    info!("  POST   /api/{{collection}}          - Create item");
    info!("  GET    /pages/{{page_id}}?id=       - Render page");
    info!("  POST   /admin-api/schemas         - Create or update a collection schema");

    axum::serve(listener, app).await?;

    Ok(())
}
