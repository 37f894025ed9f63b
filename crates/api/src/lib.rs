//! HTTP API layer with Axum routes and extractors.
//!
//! This crate provides:
//! - REST API routes for purchases, sales and products
//! - The `X-Local-ID` tenant extractor
//! - Error to response mapping

pub mod error;
pub mod extractors;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use almacen_db::{CatalogRepository, OrderRepository};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Row-lock wait bound for order transitions.
    pub lock_timeout: Option<Duration>,
}

impl AppState {
    /// Creates the application state.
    #[must_use]
    pub fn new(db: DatabaseConnection, lock_timeout: Option<Duration>) -> Self {
        Self {
            db: Arc::new(db),
            lock_timeout,
        }
    }

    /// Order repository bound to this state's pool.
    #[must_use]
    pub fn orders(&self) -> OrderRepository {
        OrderRepository::new((*self.db).clone()).with_lock_timeout(self.lock_timeout)
    }

    /// Catalog repository bound to this state's pool.
    #[must_use]
    pub fn catalog(&self) -> CatalogRepository {
        CatalogRepository::new((*self.db).clone())
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
