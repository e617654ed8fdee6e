//! Archive Upload Server Library
//!
//! Accepts a batch of files over HTTP and bundles them into a single zip
//! archive on local storage. The main server binary is in main.rs.
//!
//! # Modules
//!
//! - `archive`: Spooling, naming rules and the streaming zip pipeline
//! - `routes`: HTTP handlers
//! - `config`: Environment-driven configuration

pub mod archive;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
///
/// Static assets from the public directory are the fallback for every path
/// not matched by a route.
pub fn app(state: AppState) -> Router {
    let body_limit = match state.config().upload.max_body_size {
        Some(max) => DefaultBodyLimit::max(max),
        None => DefaultBodyLimit::disable(),
    };
    let public_dir = state.config().storage.public_dir.clone();

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/upload", post(routes::upload::upload))
        .fallback_service(ServeDir::new(public_dir))
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
