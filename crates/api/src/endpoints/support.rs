//! Support and proponent endpoints.

use axum::{Json, Router, extract::State, routing::post};
use plebiscite_common::{AppError, AppResult};
use plebiscite_core::SupportersView;
use plebiscite_db::entities::supporter;
use serde::{Deserialize, Serialize};

use super::proposals::{ProposalIdRequest, ProposalResponse};
use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// The caller's own supporter record.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupporterResponse {
    pub proposal_id: String,
    pub member_id: String,
    pub created_at: String,
    pub anonymous: bool,
    pub proponent: Option<String>,
    pub proponent_confirmed: bool,
}

impl From<supporter::Model> for SupporterResponse {
    fn from(s: supporter::Model) -> Self {
        Self {
            proposal_id: s.proposal_id,
            member_id: s.member_id,
            created_at: s.created_at.to_rfc3339(),
            anonymous: s.anonymous,
            proponent: s.proponent,
            proponent_confirmed: s.proponent_confirmed,
        }
    }
}

/// Support request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportRequest {
    pub proposal_id: String,
    #[serde(default)]
    pub anonymous: bool,
}

/// Proponent name request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProponentRequest {
    pub proposal_id: String,
    pub name: String,
}

/// Request naming a proponent of a proposal.
///
/// Without `memberId` the caller withdraws their own proponency.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProponentMemberRequest {
    pub proposal_id: String,
    pub member_id: Option<String>,
}

/// Support a proposal, or renew the support.
async fn support(
    AuthUser { actor, .. }: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SupportRequest>,
) -> AppResult<ApiResponse<SupporterResponse>> {
    let outcome = state
        .services
        .ledger
        .add_support(&actor, &req.proposal_id, req.anonymous)
        .await?;
    Ok(ApiResponse::from_outcome(outcome))
}

/// Renew an existing support.
async fn renew(
    AuthUser { actor, .. }: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ProposalIdRequest>,
) -> AppResult<ApiResponse<SupporterResponse>> {
    let outcome = state
        .services
        .ledger
        .renew_support(&actor, &req.proposal_id)
        .await?;
    Ok(ApiResponse::from_outcome(outcome))
}

/// Withdraw a support.
async fn revoke(
    AuthUser { actor, .. }: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ProposalIdRequest>,
) -> AppResult<ApiResponse<()>> {
    let outcome = state
        .services
        .ledger
        .revoke_support(&actor, &req.proposal_id)
        .await?;
    Ok(ApiResponse::from_outcome(outcome))
}

/// Supporters of a proposal as seen by the caller.
async fn supporters(
    MaybeAuthUser(auth): MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<ProposalIdRequest>,
) -> AppResult<ApiResponse<SupportersView>> {
    let viewer = auth.as_ref().map(|auth| auth.member.id.as_str());
    let view = state
        .services
        .ledger
        .supporters(&req.proposal_id, viewer)
        .await?;
    Ok(ApiResponse::ok(view))
}

/// Display names of the confirmed proponents.
async fn proponents(
    State(state): State<AppState>,
    Json(req): Json<ProposalIdRequest>,
) -> AppResult<ApiResponse<Vec<String>>> {
    let names = state
        .services
        .ledger
        .proponent_names(&req.proposal_id)
        .await?;
    Ok(ApiResponse::ok(names))
}

/// Apply to become proponent.
async fn apply(
    AuthUser { actor, .. }: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ProponentRequest>,
) -> AppResult<ApiResponse<SupporterResponse>> {
    let outcome = state
        .services
        .ledger
        .apply_as_proponent(&actor, &req.proposal_id, &req.name)
        .await?;
    Ok(ApiResponse::from_outcome(outcome))
}

/// Confirm a pending application.
async fn confirm(
    AuthUser { actor, .. }: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ProponentMemberRequest>,
) -> AppResult<ApiResponse<SupporterResponse>> {
    let applicant = req
        .member_id
        .ok_or_else(|| AppError::BadRequest("memberId is required".to_string()))?;
    let outcome = state
        .services
        .ledger
        .confirm_proponent(&actor, &req.proposal_id, &applicant)
        .await?;
    Ok(ApiResponse::from_outcome(outcome))
}

/// Change the caller's proponent name.
async fn update(
    AuthUser { actor, .. }: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ProponentRequest>,
) -> AppResult<ApiResponse<SupporterResponse>> {
    let outcome = state
        .services
        .ledger
        .update_proponent_info(&actor, &req.proposal_id, &req.name)
        .await?;
    Ok(ApiResponse::from_outcome(outcome))
}

/// Withdraw a proponency.
async fn remove(
    AuthUser { member, actor }: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ProponentMemberRequest>,
) -> AppResult<ApiResponse<ProposalResponse>> {
    let member_id = req.member_id.unwrap_or(member.id);
    let outcome = state
        .services
        .ledger
        .remove_proponent(&actor, &req.proposal_id, &member_id)
        .await?;
    Ok(ApiResponse::from_outcome(outcome))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/support", post(support))
        .route("/support/renew", post(renew))
        .route("/support/revoke", post(revoke))
        .route("/supporters", post(supporters))
        .route("/proponents", post(proponents))
        .route("/proponents/apply", post(apply))
        .route("/proponents/confirm", post(confirm))
        .route("/proponents/update", post(update))
        .route("/proponents/remove", post(remove))
}
