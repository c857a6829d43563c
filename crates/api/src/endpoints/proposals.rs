//! Proposal endpoints.

use axum::{Json, Router, extract::State, routing::post};
use plebiscite_common::{AppError, AppResult};
use plebiscite_core::{MoveOption, Placement, ProposalService, ProposalText, QuorumInfo};
use plebiscite_db::entities::{draft, proposal};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Proposal response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalResponse {
    pub id: String,
    pub issue_id: String,
    pub title: String,
    pub content: String,
    pub reason: String,
    pub state: String,
    pub state_name: String,
    pub supporters: i32,
    pub quorum_reached: bool,
    pub admission_decision: Option<String>,
    pub submitted_at: Option<String>,
    pub admitted_at: Option<String>,
    pub cancelled_at: Option<String>,
    pub revoke_at: Option<String>,
    pub created_at: String,
}

impl From<proposal::Model> for ProposalResponse {
    fn from(p: proposal::Model) -> Self {
        Self {
            id: p.id,
            issue_id: p.issue_id,
            title: p.title,
            content: p.content,
            reason: p.reason,
            state: p.state.as_str().to_string(),
            state_name: ProposalService::state_name(p.state).to_string(),
            supporters: p.supporters,
            quorum_reached: p.quorum_reached,
            admission_decision: p.admission_decision,
            submitted_at: p.submitted_at.map(|t| t.to_rfc3339()),
            admitted_at: p.admitted_at.map(|t| t.to_rfc3339()),
            cancelled_at: p.cancelled_at.map(|t| t.to_rfc3339()),
            revoke_at: p.revoke_at.map(|t| t.to_rfc3339()),
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

/// Draft response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftResponse {
    pub id: String,
    pub proposal_id: String,
    pub author_id: Option<String>,
    pub title: String,
    pub content: String,
    pub reason: String,
    pub created_at: String,
}

impl From<draft::Model> for DraftResponse {
    fn from(d: draft::Model) -> Self {
        Self {
            id: d.id,
            proposal_id: d.proposal_id,
            author_id: d.author_id,
            title: d.title,
            content: d.content,
            reason: d.reason,
            created_at: d.created_at.to_rfc3339(),
        }
    }
}

/// Request naming a single proposal.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalIdRequest {
    pub proposal_id: String,
}

/// List proposals request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProposalsRequest {
    pub issue_id: String,
}

/// Create proposal request.
///
/// Without `issueId` the proposal opens a new issue in `areaId`, placed in
/// `periodId` when one is given.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProposalRequest {
    pub area_id: Option<String>,
    pub issue_id: Option<String>,
    pub period_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub reason: String,
    /// Display name of the creator as first proponent.
    pub proponent: String,
}

/// New draft request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDraftRequest {
    pub proposal_id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub reason: String,
}

/// Get a proposal.
async fn show(
    State(state): State<AppState>,
    Json(req): Json<ProposalIdRequest>,
) -> AppResult<ApiResponse<ProposalResponse>> {
    let proposal = state.services.proposals.get(&req.proposal_id).await?;
    Ok(ApiResponse::ok(proposal.into()))
}

/// List the proposals of an issue.
async fn list(
    State(state): State<AppState>,
    Json(req): Json<ListProposalsRequest>,
) -> AppResult<ApiResponse<Vec<ProposalResponse>>> {
    let proposals = state.services.proposals.list_by_issue(&req.issue_id).await?;
    Ok(ApiResponse::ok(proposals.into_iter().map(Into::into).collect()))
}

/// Create a proposal.
async fn create(
    AuthUser { actor, .. }: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateProposalRequest>,
) -> AppResult<ApiResponse<ProposalResponse>> {
    let placement = match (req.issue_id, req.area_id) {
        (Some(issue_id), _) => Placement::Issue { issue_id },
        (None, Some(area_id)) => Placement::NewIssue {
            area_id,
            period_id: req.period_id,
        },
        (None, None) => {
            return Err(AppError::BadRequest(
                "Either issueId or areaId is required".to_string(),
            ));
        }
    };
    let text = ProposalText {
        title: req.title,
        content: req.content,
        reason: req.reason,
    };
    let outcome = state
        .services
        .proposals
        .create_proposal(&actor, placement, text, &req.proponent)
        .await?;
    Ok(ApiResponse::from_outcome(outcome))
}

/// Store a new revision of a proposal.
async fn create_draft(
    AuthUser { actor, .. }: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<NewDraftRequest>,
) -> AppResult<ApiResponse<DraftResponse>> {
    let text = ProposalText {
        title: req.title,
        content: req.content,
        reason: req.reason,
    };
    let outcome = state
        .services
        .proposals
        .new_draft(&actor, &req.proposal_id, text)
        .await?;
    Ok(ApiResponse::from_outcome(outcome))
}

/// List the revisions of a proposal, newest first.
async fn drafts(
    State(state): State<AppState>,
    Json(req): Json<ProposalIdRequest>,
) -> AppResult<ApiResponse<Vec<DraftResponse>>> {
    let drafts = state.services.proposals.drafts(&req.proposal_id).await?;
    Ok(ApiResponse::ok(drafts.into_iter().map(Into::into).collect()))
}

/// Submit a draft.
async fn submit(
    AuthUser { actor, .. }: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ProposalIdRequest>,
) -> AppResult<ApiResponse<ProposalResponse>> {
    let outcome = state
        .services
        .proposals
        .submit(&actor, &req.proposal_id)
        .await?;
    Ok(ApiResponse::from_outcome(outcome))
}

/// Explain the quorum of a proposal.
async fn quorum(
    State(state): State<AppState>,
    Json(req): Json<ProposalIdRequest>,
) -> AppResult<ApiResponse<QuorumInfo>> {
    let info = state.services.proposals.quorum_info(&req.proposal_id).await?;
    Ok(ApiResponse::ok(info))
}

/// Issues a proposal may be moved to.
async fn move_options(
    State(state): State<AppState>,
    Json(req): Json<ProposalIdRequest>,
) -> AppResult<ApiResponse<Vec<MoveOption>>> {
    let options = state
        .services
        .proposals
        .options_move_to_issue(&req.proposal_id)
        .await?;
    Ok(ApiResponse::ok(options))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/show", post(show))
        .route("/list", post(list))
        .route("/create", post(create))
        .route("/drafts", post(drafts))
        .route("/drafts/create", post(create_draft))
        .route("/submit", post(submit))
        .route("/quorum", post(quorum))
        .route("/move-options", post(move_options))
}
