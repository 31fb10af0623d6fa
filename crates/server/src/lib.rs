//! BCW Server - HTTP inference API for the breast cancer classifier
//!
//! Serves a model artifact produced by `bcw-train`. The artifact is loaded
//! once at start-up and shared read-only by every request; if it cannot be
//! loaded the server refuses to start.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /` - Liveness banner
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /metrics` - Prometheus metrics
//! - `GET /model` - Loaded model metadata and held-out scores
//! - `POST /predict` - Classify a feature vector (API key required when keys are configured)
//!
//! Errors are returned as `{"error": {"code": "...", "message": "..."}}`.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, init_tracing, start_server};
pub use state::{ModelInfo, ServerState};
