pub mod api;

use crate::services::Dashboard;
use axum::{extract::FromRef, routing::get, Router};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

pub type SharedDashboard = Arc<Dashboard>;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub dashboard: SharedDashboard,
    pub public_dir: PathBuf,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(dashboard: Dashboard, public_dir: PathBuf) -> Self {
        Self {
            dashboard: Arc::new(dashboard),
            public_dir,
            started_at: Instant::now(),
        }
    }
}

impl FromRef<AppState> for SharedDashboard {
    fn from_ref(app_state: &AppState) -> SharedDashboard {
        app_state.dashboard.clone()
    }
}

/// Build the router: page, JSON API, health and static files
pub fn router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::OPTIONS])
        .allow_headers(Any);

    let public_dir = app_state.public_dir.clone();

    Router::new()
        .route("/", get(api::index_handler))
        .route("/api/companies", get(api::companies_handler))
        .route("/api/dashboard", get(api::dashboard_handler))
        .route("/api/overview", get(api::overview_handler))
        .route("/api/detail", get(api::detail_handler))
        .route("/health", get(api::health_handler))
        .nest_service("/public", ServeDir::new(public_dir))
        .layer(cors)
        .with_state(app_state)
}

/// Start the axum server
pub async fn serve(app_state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Starting automaker-stocks server");
    tracing::info!("Using public directory: {}", app_state.public_dir.display());

    tracing::info!("Registering routes:");
    tracing::info!("  GET /");
    tracing::info!("  GET /api/companies");
    tracing::info!("  GET /api/dashboard?days=180&company=TOYOTA&company=HONDA&ymin=0&ymax=6000&firm=TOYOTA");
    tracing::info!("  GET /api/overview?days=180&company=TOYOTA&format=csv");
    tracing::info!("  GET /api/detail?firm=TOYOTA");
    tracing::info!("  GET /health");
    tracing::info!("  GET /public/* (static files from {})", app_state.public_dir.display());

    let app = router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
