//! Voting period endpoints: ballot locations and the caller's ballot choice.

use axum::{Json, Router, extract::State, routing::post};
use plebiscite_common::AppResult;
use plebiscite_db::entities::{ballot, voter};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Ballot response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BallotResponse {
    pub id: String,
    pub period_id: String,
    pub name: String,
    pub approved: bool,
    pub voters: i32,
}

impl From<ballot::Model> for BallotResponse {
    fn from(b: ballot::Model) -> Self {
        Self {
            id: b.id,
            period_id: b.period_id,
            name: b.name,
            approved: b.approved,
            voters: b.voters,
        }
    }
}

/// Voter response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterResponse {
    pub member_id: String,
    pub period_id: String,
    pub ballot_id: String,
    pub agent: bool,
    pub created_at: String,
}

impl From<voter::Model> for VoterResponse {
    fn from(v: voter::Model) -> Self {
        Self {
            member_id: v.member_id,
            period_id: v.period_id,
            ballot_id: v.ballot_id,
            agent: v.agent,
            created_at: v.created_at.to_rfc3339(),
        }
    }
}

/// Request naming a period.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodIdRequest {
    pub period_id: String,
}

/// Select ballot request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectBallotRequest {
    pub period_id: String,
    pub ballot_id: String,
    /// Whether the caller volunteers as agent of the ballot.
    #[serde(default)]
    pub agent: bool,
}

/// Unselect ballot response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnselectResponse {
    pub removed: bool,
}

/// Ballots of a period.
async fn ballots(
    State(state): State<AppState>,
    Json(req): Json<PeriodIdRequest>,
) -> AppResult<ApiResponse<Vec<BallotResponse>>> {
    let ballots = state.services.ballots.ballots(&req.period_id).await?;
    Ok(ApiResponse::ok(ballots.into_iter().map(Into::into).collect()))
}

/// The caller's ballot in a period, if any.
async fn voter(
    AuthUser { member, .. }: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PeriodIdRequest>,
) -> AppResult<ApiResponse<Option<VoterResponse>>> {
    let voter = state
        .services
        .ballots
        .voter(&member.id, &req.period_id)
        .await?;
    Ok(ApiResponse::ok(voter.map(Into::into)))
}

/// Choose a ballot.
async fn select(
    AuthUser { actor, .. }: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SelectBallotRequest>,
) -> AppResult<ApiResponse<VoterResponse>> {
    let voter = state
        .services
        .ballots
        .select_ballot(&actor, &req.period_id, &req.ballot_id, req.agent)
        .await?;
    Ok(ApiResponse::ok(voter.into()))
}

/// Withdraw the ballot choice.
async fn unselect(
    AuthUser { actor, .. }: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PeriodIdRequest>,
) -> AppResult<ApiResponse<UnselectResponse>> {
    let removed = state
        .services
        .ballots
        .unselect_ballot(&actor, &req.period_id)
        .await?;
    Ok(ApiResponse::ok(UnselectResponse { removed }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ballots", post(ballots))
        .route("/ballots/select", post(select))
        .route("/ballots/unselect", post(unselect))
        .route("/voter", post(voter))
}
