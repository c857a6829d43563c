//! API integration tests.
//!
//! These tests drive the router against a migrated in-memory database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use chrono::{Months, Utc};
use plebiscite_api::{AppState, auth_middleware, router as api_router};
use plebiscite_core::{GovernanceRules, NoOpNotifier, Services};
use plebiscite_db::{
    entities::{member, proposal::ProposalState},
    repositories::IssueRepository,
    test_utils::TestDatabase,
};
use sea_orm::{ActiveModelTrait, Set};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

async fn create_test_app() -> (TestDatabase, Router) {
    let db = TestDatabase::new().await.unwrap();
    let services = Services::new(
        db.pool(),
        GovernanceRules::default(),
        Arc::new(NoOpNotifier),
    );
    let state = AppState::new(services);
    let app = api_router()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state);
    (db, app)
}

async fn post(app: &Router, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
    let mut request = Request::builder()
        .uri(uri)
        .method("POST")
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        request = request.header("Authorization", format!("Bearer {token}"));
    }
    let response = app
        .clone()
        .oneshot(request.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn test_meta_exposes_rules() {
    let (_db, app) = create_test_app().await;

    let (status, body) = post(&app, "/meta", None, json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "plebiscite");
    assert_eq!(body["requiredProponents"], 5);
    assert_eq!(body["supportersValidMonths"], 6);
}

#[tokio::test]
async fn test_support_requires_token() {
    let (db, app) = create_test_app().await;
    let seeded = db.seed_proposal().await.unwrap();

    let (status, _) = post(
        &app,
        "/proposals/support",
        None,
        json!({ "proposalId": seeded.proposal_id }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = post(
        &app,
        "/proposals/support",
        Some("nobody"),
        json!({ "proposalId": seeded.proposal_id }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_support_and_supporter_view() {
    let (db, app) = create_test_app().await;
    let seeded = db.seed_proposal().await.unwrap();
    let proposal = db
        .seed_proposal_in(&seeded.issue_id, ProposalState::Submitted)
        .await
        .unwrap();
    let alice = db.seed_member("alice").await.unwrap();

    let (status, body) = post(
        &app,
        "/proposals/support",
        Some("alice"),
        json!({ "proposalId": proposal.id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["memberId"], alice.id.as_str());
    assert!(body.get("warnings").is_none());

    let (status, body) = post(
        &app,
        "/proposals/show",
        None,
        json!({ "proposalId": proposal.id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["supporters"], 1);
    assert_eq!(body["data"]["state"], "submitted");

    let (status, body) = post(
        &app,
        "/proposals/supporters",
        Some("alice"),
        json!({ "proposalId": proposal.id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isValid"], true);
}

#[tokio::test]
async fn test_renewing_expired_support_returns_warning() {
    let (db, app) = create_test_app().await;
    let seeded = db.seed_proposal().await.unwrap();
    let proposal = db
        .seed_proposal_in(&seeded.issue_id, ProposalState::Submitted)
        .await
        .unwrap();
    let old = db.seed_member("old").await.unwrap();
    let stale = Utc::now().checked_sub_months(Months::new(7)).unwrap();
    db.seed_supporter(&proposal.id, &old.id, stale, None)
        .await
        .unwrap();

    let (status, body) = post(
        &app,
        "/proposals/support/renew",
        Some("old"),
        json!({ "proposalId": proposal.id }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["warnings"][0]["kind"], "support_expired");
}

#[tokio::test]
async fn test_supporting_a_draft_is_forbidden() {
    let (db, app) = create_test_app().await;
    let seeded = db.seed_proposal().await.unwrap();
    db.seed_member("alice").await.unwrap();

    let (status, _) = post(
        &app,
        "/proposals/support",
        Some("alice"),
        json!({ "proposalId": seeded.proposal_id }),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_requires_a_placement() {
    let (db, app) = create_test_app().await;
    db.seed_member("alice").await.unwrap();

    let (status, _) = post(
        &app,
        "/proposals/create",
        Some("alice"),
        json!({ "title": "Title", "proponent": "Alice" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_places_new_issue_in_period() {
    let (db, app) = create_test_app().await;
    let ngroup = db.seed_ngroup(100).await.unwrap();
    let area = db.seed_area(&ngroup.id).await.unwrap();
    let period = db.seed_period(&ngroup.id, Utc::now()).await.unwrap();
    db.seed_member("alice").await.unwrap();

    let (status, body) = post(
        &app,
        "/proposals/create",
        Some("alice"),
        json!({
            "areaId": area.id,
            "periodId": period.id,
            "title": "Night buses",
            "proponent": "Alice",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let issue_id = body["data"]["issueId"].as_str().unwrap();
    let issue = IssueRepository::new(db.pool())
        .get_by_id(db.connection(), issue_id)
        .await
        .unwrap();
    assert_eq!(issue.period_id, Some(period.id));
}

#[tokio::test]
async fn test_admin_routes_check_rights() {
    let (db, app) = create_test_app().await;
    db.seed_member("alice").await.unwrap();
    let admin = db.seed_member("admin").await.unwrap();
    let mut model: member::ActiveModel = admin.into();
    model.is_admin = Set(true);
    model.update(db.connection()).await.unwrap();

    let profile = json!({
        "auid": "idp-bob",
        "username": "bob",
        "participant": true,
    });

    let (status, _) = post(&app, "/admin/members/sync", Some("alice"), profile.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = post(&app, "/admin/members/sync", Some("admin"), profile).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "bob");
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, body) = post(&app, "/meta", Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "plebiscite");
}

#[tokio::test]
async fn test_invalid_json_is_rejected() {
    let (_db, app) = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/proposals/show")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from("invalid json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(
        response.status() == StatusCode::BAD_REQUEST
            || response.status() == StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let (_db, app) = create_test_app().await;

    let (status, _) = post(&app, "/nonexistent/endpoint", None, json!({})).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
