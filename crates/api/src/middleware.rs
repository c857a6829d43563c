//! API middleware.

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use plebiscite_core::Services;
use tracing::debug;

use crate::extractors::AuthUser;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// The core services.
    pub services: Services,
}

impl AppState {
    /// Create the state from the core services.
    #[must_use]
    pub const fn new(services: Services) -> Self {
        Self { services }
    }
}

/// Authentication middleware.
///
/// Resolves a `Bearer` token to the member and their actor. Requests without
/// a valid token pass through unauthenticated; handlers that need a member
/// reject them through [`AuthUser`].
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);

    if let Some(token) = token {
        match state.services.members.authenticate(&token).await {
            Ok((member, actor)) => {
                req.extensions_mut().insert(AuthUser { member, actor });
            }
            Err(e) => debug!(error = %e, "Bearer token rejected"),
        }
    }

    next.run(req).await
}
