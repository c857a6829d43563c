//! HTTP API layer for plebiscite.
//!
//! A thin JSON surface over the core services:
//!
//! - **Endpoints**: proposals, support and proponents, ballots, administration
//! - **Extractors**: the authenticated member and their actor
//! - **Middleware**: bearer token authentication
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
