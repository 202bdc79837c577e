//! surgebox-server - REST API server for surgebox.
//!
//! Serves the managed Surge profile: password login, the versioned
//! document API under a secret path token, and a raw download URL.
//!
//! # Example
//!
//! ```ignore
//! use surgebox_server::{create_server, AppState, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let state = AppState::from_config(ServerConfig::from_env().unwrap()).unwrap();
//!     let app = create_server(state);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{middleware as axum_middleware, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Create the server with all routes and middleware.
pub fn create_server(state: AppState) -> Router {
    routes::create_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(middleware::cors_layer())
            .layer(axum_middleware::from_fn(middleware::logging_middleware)),
    )
}
