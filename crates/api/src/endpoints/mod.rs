//! API endpoints.

mod admin;
mod meta;
mod periods;
mod proposals;
mod support;

use axum::Router;

use crate::middleware::AppState;

pub use periods::{BallotResponse, VoterResponse};
pub use proposals::{DraftResponse, ProposalResponse};
pub use support::SupporterResponse;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/meta", meta::router())
        .nest("/proposals", proposals::router().merge(support::router()))
        .nest("/periods", periods::router())
        .nest("/admin", admin::router())
}
