//! Artist OS backend
//!
//! Metrics dashboards, CSV imports and background artist analysis for
//! musicians and their teams. Every request is resolved to a [`auth::Session`]
//! and reaches the database through a client scoped to that session.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod pages;
pub mod services;
pub mod types;

use crate::auth::AuthGateway;
use crate::config::{AppConfig, SecurityConfig};
use crate::database::{ClientFactory, Store};
use crate::services::{ArtistDataProvider, ArtistService, ProgressTracker};

/// Multipart framing on top of the file itself
const UPLOAD_OVERHEAD_BYTES: usize = 64 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub clients: ClientFactory,
    pub auth: Arc<dyn AuthGateway>,
    pub provider: Arc<dyn ArtistDataProvider>,
    pub progress: ProgressTracker,
    pub artists: ArtistService,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn Store>,
        auth: Arc<dyn AuthGateway>,
        provider: Arc<dyn ArtistDataProvider>,
    ) -> Self {
        let clients = ClientFactory::new(store, config.has_service_role());
        let progress = ProgressTracker::new(clients.clone(), &config.progress);
        let artists = ArtistService::new(clients.clone(), provider.clone(), progress.clone());

        Self {
            config: Arc::new(config),
            clients,
            auth,
            provider,
            progress,
            artists,
        }
    }
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    use handlers::{elevated, protected, public};

    let upload_limit = state.config.import.max_file_bytes + UPLOAD_OVERHEAD_BYTES;

    // Public routes (no session required)
    let public = Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/auth/callback", get(public::callback_get))
        .route("/api/artist-ai/analyze", post(public::analyze_post))
        .route("/api/artist-ai/status/:analysis_id", get(public::status_get))
        .route("/api/import/template", get(public::template_get));

    // Protected routes (handlers reject anonymous sessions)
    let protected = Router::new()
        .route("/api/dashboard/metrics", get(protected::metrics_get))
        .route("/api/debug/fan-engagement", get(protected::fan_engagement_get))
        .route("/api/debug/sync-viberate-history", post(protected::sync_history_post))
        .route("/api/debug/test-db", get(protected::test_db_get))
        .route(
            "/api/import/csv",
            post(protected::import_csv_post).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/test-artist-profile", get(protected::test_artist_profile_get));

    // Operator routes (superadmin + service credential)
    let elevated = Router::new()
        .route("/api/setup-progress-table", get(elevated::setup_progress_table_get))
        .route("/api/viberate/debug-sync", get(elevated::debug_sync_get));

    let pages = Router::new()
        .route("/dashboard", get(pages::dashboard_page))
        .route("/dashboard/superadmin", get(pages::superadmin_page))
        .route("/login", get(pages::login_page));

    Router::new()
        .merge(public)
        .merge(protected)
        .merge(elevated)
        .merge(pages)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::session_middleware,
        ))
        .layer(cors_layer(&state.config.security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
