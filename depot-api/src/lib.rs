//! # Depot API Server
//!
//! JSON API exposing cached per-warehouse weather.
//!
//! ## Endpoints
//!
//! - `GET /health` - Liveness and basic counters
//! - `GET /api/v1/warehouses/:id/weather` - Current weather at a warehouse
//! - `GET /api/v1/cache/stats` - Weather cache statistics
//!
//! ## Example
//!
//! ```rust,ignore
//! use depot_api::{ApiServer, ApiConfig};
//!
//! let server = ApiServer::new(ApiConfig::from_env())?;
//! server.run(([0, 0, 0, 0], 3001)).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod dto;
mod error;
mod handlers;
mod routes;
mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{ApiConfig, AppState};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use depot_core::error::Result;

/// API server for Depot.
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Creates a new API server backed by the live weather API.
    pub fn new(config: ApiConfig) -> Result<Self> {
        Ok(Self::with_state(AppState::new(config)?))
    }

    /// Creates a server around prepared state.
    pub fn with_state(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Creates the router with all routes configured.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        create_router(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Loads startup warehouses, then serves on the given address.
    pub async fn run(self, addr: impl Into<SocketAddr>) -> Result<()> {
        let seeded = self.state.seed_directory().await?;
        let addr = addr.into();
        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!(
            %addr,
            warehouses = seeded,
            freshness_secs = self.state.config.cache_ttl.as_secs(),
            "Depot API server listening"
        );

        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

