//! zpa-server library - ZIP penetration HTTP API
//!
//! Serves the enriched dataset read-only: filter/sort queries, summary
//! statistics, a toy login and the static dashboard.

use axum::http::Uri;
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use zpa_common::Record;

pub mod api;
pub mod bootstrap;
pub mod error;
pub mod query;
pub mod stats;

pub use crate::error::{ApiError, ApiResult};

use crate::api::LoginGate;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Enriched dataset, read-only while serving
    pub dataset: Arc<Vec<Record>>,
    pub login: Arc<LoginGate>,
    /// Directory served at `/`; nothing is served when `None`
    pub static_assets: Option<PathBuf>,
}

impl AppState {
    pub fn new(dataset: Vec<Record>, login_password: Option<&str>) -> Self {
        Self {
            dataset: Arc::new(dataset),
            login: Arc::new(LoginGate::new(login_password)),
            static_assets: None,
        }
    }

    pub fn with_static_assets(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_assets = Some(dir.into());
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let router = Router::new()
        .route("/api/data", get(api::get_data))
        .route("/api/stats", get(api::get_stats))
        .route("/api/login", post(api::login))
        .merge(api::health_routes());

    let router = match &state.static_assets {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router.fallback(not_found),
    };

    router
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}
