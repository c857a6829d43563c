//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use plebiscite_common::AppError;
use plebiscite_core::Actor;
use plebiscite_db::entities::member;

/// Authenticated member extractor.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The member behind the bearer token.
    pub member: member::Model,
    /// The member acting, as administrator if they hold the right.
    pub actor: Actor,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by the auth middleware
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// Optional authenticated member extractor.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<AuthUser>().cloned()))
    }
}
