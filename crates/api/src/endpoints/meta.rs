//! Meta endpoints.

use axum::{Json, Router, extract::State, routing::post};
use plebiscite_core::Ratio;
use serde::Serialize;

use crate::middleware::AppState;

/// Server metadata and the governance rules in force.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaResponse {
    pub name: String,
    pub version: String,
    pub quorum: Ratio,
    pub quorum_alternative: Ratio,
    pub required_proponents: u64,
    pub supporters_valid_months: u32,
    pub revoke_grace_days: i64,
    pub proponent_max_length: usize,
}

/// Get server metadata.
async fn meta(State(state): State<AppState>) -> Json<MetaResponse> {
    let rules = &state.services.rules;
    Json(MetaResponse {
        name: "plebiscite".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        quorum: rules.quorum,
        quorum_alternative: rules.quorum_alternative,
        required_proponents: rules.required_proponents,
        supporters_valid_months: rules.supporters_valid_months,
        revoke_grace_days: rules.revoke_grace.num_days(),
        proponent_max_length: rules.proponent_max_length,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(meta))
}
