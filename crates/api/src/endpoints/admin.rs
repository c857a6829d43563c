//! Administrative endpoints.
//!
//! Every operation checks the administrative right itself; these routes only
//! group them.

use axum::{Json, Router, extract::State, routing::post};
use plebiscite_common::AppResult;
use plebiscite_core::{CancelTarget, MemberProfile, MoveTarget};
use plebiscite_db::entities::member;
use serde::{Deserialize, Serialize};

use super::{
    periods::{BallotResponse, PeriodIdRequest},
    proposals::ProposalResponse,
};
use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Admission decision request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmitRequest {
    pub proposal_id: String,
    pub decision: String,
}

/// Cancel proposal request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    pub proposal_id: String,
    pub target: CancelTarget,
}

/// Move proposal request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub proposal_id: String,
    pub target: MoveTarget,
}

/// Create ballot request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBallotRequest {
    pub period_id: String,
    pub name: String,
}

/// One approval flag.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallotApproval {
    pub ballot_id: String,
    pub approved: bool,
}

/// Save approvals request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveBallotsRequest {
    pub period_id: String,
    pub ballots: Vec<BallotApproval>,
}

/// Count response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedResponse {
    pub assigned: u64,
}

/// Revoked proposals response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokedResponse {
    pub revoked: Vec<String>,
}

/// Synchronized member, with the session token for the identity provider to hand out.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncedMemberResponse {
    pub id: String,
    pub username: String,
    pub participant: bool,
    pub token: Option<String>,
}

impl From<member::Model> for SyncedMemberResponse {
    fn from(m: member::Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            participant: m.participant,
            token: m.token,
        }
    }
}

/// Admit a proposal by decision, or change the decision text.
async fn admit(
    AuthUser { actor, .. }: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<AdmitRequest>,
) -> AppResult<ApiResponse<ProposalResponse>> {
    let outcome = state
        .services
        .proposals
        .set_admission_decision(&actor, &req.proposal_id, &req.decision)
        .await?;
    Ok(ApiResponse::from_outcome(outcome))
}

/// Cancel a proposal.
async fn cancel(
    AuthUser { actor, .. }: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CancelRequest>,
) -> AppResult<ApiResponse<ProposalResponse>> {
    let outcome = state
        .services
        .proposals
        .cancel(&actor, &req.proposal_id, req.target)
        .await?;
    Ok(ApiResponse::from_outcome(outcome))
}

/// Move a proposal to another issue.
async fn move_proposal(
    AuthUser { actor, .. }: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<MoveRequest>,
) -> AppResult<ApiResponse<ProposalResponse>> {
    let outcome = state
        .services
        .proposals
        .move_to_issue(&actor, &req.proposal_id, req.target)
        .await?;
    Ok(ApiResponse::from_outcome(outcome))
}

/// Revoke every proposal whose revocation deadline passed.
async fn revoke_expired(
    AuthUser { actor, .. }: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<RevokedResponse>> {
    actor.require_admin()?;
    let revoked = state
        .services
        .proposals
        .revoke_expired(chrono::Utc::now())
        .await?;
    Ok(ApiResponse::ok(RevokedResponse { revoked }))
}

/// Add a ballot location to a period.
async fn create_ballot(
    AuthUser { actor, .. }: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateBallotRequest>,
) -> AppResult<ApiResponse<BallotResponse>> {
    let ballot = state
        .services
        .ballots
        .create_ballot(&actor, &req.period_id, &req.name)
        .await?;
    Ok(ApiResponse::ok(ballot.into()))
}

/// Save the approval flags of ballots.
async fn approve_ballots(
    AuthUser { actor, .. }: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ApproveBallotsRequest>,
) -> AppResult<ApiResponse<Vec<BallotResponse>>> {
    let selections = req
        .ballots
        .into_iter()
        .map(|b| (b.ballot_id, b.approved))
        .collect();
    let ballots = state
        .services
        .ballots
        .save_approved_ballots(&actor, &req.period_id, selections)
        .await?;
    Ok(ApiResponse::ok(ballots.into_iter().map(Into::into).collect()))
}

/// Assign every member without a ballot to an approved one.
async fn assign_remaining(
    AuthUser { actor, .. }: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PeriodIdRequest>,
) -> AppResult<ApiResponse<AssignedResponse>> {
    let assigned = state
        .services
        .ballots
        .assign_remaining_members(&actor, &req.period_id)
        .await?;
    Ok(ApiResponse::ok(AssignedResponse { assigned }))
}

/// Create or update a member from the identity provider.
async fn sync_member(
    AuthUser { actor, .. }: AuthUser,
    State(state): State<AppState>,
    Json(profile): Json<MemberProfile>,
) -> AppResult<ApiResponse<SyncedMemberResponse>> {
    actor.require_admin()?;
    let member = state.services.members.sync_member(profile).await?;
    Ok(ApiResponse::ok(member.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/proposals/admit", post(admit))
        .route("/proposals/cancel", post(cancel))
        .route("/proposals/move", post(move_proposal))
        .route("/proposals/revoke-expired", post(revoke_expired))
        .route("/ballots/create", post(create_ballot))
        .route("/ballots/approve", post(approve_ballots))
        .route("/ballots/assign-remaining", post(assign_remaining))
        .route("/members/sync", post(sync_member))
}
