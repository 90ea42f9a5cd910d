//! NoteCheck - currency note counterfeit detection service
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        NOTECHECK                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌───────────┐  ┌─────────────────────────┐  │
//! │  │  API      │  │  Auth     │  │  Scan Pipeline          │  │
//! │  │  (Axum)   │  │  (JWT)    │  │  classifier + forensics │  │
//! │  └─────┬─────┘  └─────┬─────┘  └────────────┬────────────┘  │
//! │        └──────────────┼─────────────────────┘               │
//! │                       ▼                                     │
//! │      ┌─────────────────────────┐   ┌─────────────────┐      │
//! │      │ ScanStore (JSON files)  │──▶│ Analytics       │      │
//! │      │ history + audit log     │   │ (read-only)     │      │
//! │      └─────────────────────────┘   └─────────────────┘      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod forensics;
pub mod classifier;
pub mod analytics;
pub mod verification;
pub mod pipeline;
pub mod export;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, delete},
    middleware as axum_middleware,
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
    services::ServeDir,
};

pub use error::{AppError, AppResult};

use config::Config;
use handlers::auth::AdminCredentials;
use pipeline::ScanPipeline;
use store::ScanStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ScanStore>,
    pub pipeline: ScanPipeline,
    pub config: Arc<Config>,
    pub credentials: Arc<AdminCredentials>,
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/v1/auth/login", post(handlers::auth::login))
        .route("/api/v1/scans", post(handlers::scans::predict))
        .route("/api/v1/scans/visuals", get(handlers::scans::visuals))
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir));

    // Admin routes (JWT auth)
    let admin_routes = Router::new()
        .route("/api/v1/auth/logout", post(handlers::auth::logout))
        .route("/api/v1/admin/dashboard", get(handlers::admin::dashboard))
        .route("/api/v1/admin/performance", get(handlers::admin::performance))
        .route("/api/v1/admin/risk", get(handlers::admin::risk))
        .route("/api/v1/admin/audit", get(handlers::admin::audit_log))

        // History
        .route("/api/v1/history", get(handlers::history::list))
        .route("/api/v1/history", delete(handlers::history::clear))
        .route("/api/v1/history/export", get(handlers::history::export_history))
        .route("/api/v1/history/:id", delete(handlers::history::delete))

        // Verification
        .route("/api/v1/verify", post(handlers::verify::verify))

        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_admin_auth
        ));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
