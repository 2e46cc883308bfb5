//! HTTP API for node self-removal
//!
//! # API Endpoints
//!
//! - `POST /self-destruct` (or `DELETE`) - Delete the Node this pod runs on
//! - `GET /healthz` - Liveness probe
//!
//! # Authentication
//!
//! When a token is configured, `/self-destruct` requires:
//! ```text
//! Authorization: Bearer <TOKEN>
//! ```
//! Without a token the endpoint accepts any caller that can reach the port.

pub mod auth;
pub mod errors;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use errors::ApiError;
pub use server::create_routes;
pub use server::ApiServer;
