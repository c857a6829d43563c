//! Shared fixtures for the workflow tests.

#![allow(clippy::unwrap_used, dead_code)]

use async_trait::async_trait;
use chrono::{Duration, Utc};
use plebiscite_common::AppResult;
use plebiscite_core::{
    Actor, GovernanceRules, Notification, NotificationKind, Notifier, Services,
};
use plebiscite_db::{
    entities::{issue::IssueState, member, proposal::ProposalState},
    repositories::{IssueRepository, ProposalRepository},
    test_utils::TestDatabase,
};
use std::sync::{Arc, Mutex};

/// Notifier that keeps every notification for later inspection.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn of_kind(&self, kind: NotificationKind) -> Vec<Notification> {
        self.sent()
            .into_iter()
            .filter(|n| n.kind == kind)
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: Notification) -> AppResult<()> {
        self.sent.lock().unwrap().push(notification);
        Ok(())
    }
}

pub struct Harness {
    pub db: TestDatabase,
    pub services: Services,
    pub notifier: Arc<RecordingNotifier>,
    pub proposal_repo: ProposalRepository,
    pub issue_repo: IssueRepository,
}

impl Harness {
    pub async fn new() -> Self {
        let db = TestDatabase::new().await.unwrap();
        let notifier = Arc::new(RecordingNotifier::default());
        let pool = db.pool();
        let services = Services::new(pool.clone(), GovernanceRules::default(), notifier.clone());
        Self {
            db,
            services,
            notifier,
            proposal_repo: ProposalRepository::new(pool.clone()),
            issue_repo: IssueRepository::new(pool),
        }
    }

    pub async fn member(&self, username: &str) -> (member::Model, Actor) {
        let member = self.db.seed_member(username).await.unwrap();
        let actor = Actor::Member(member.id.clone());
        (member, actor)
    }

    pub async fn admin(&self) -> Actor {
        let member = self.db.seed_member("admin").await.unwrap();
        Actor::Admin(member.id)
    }

    /// An issue in entry of an area with a population floor of 100.
    pub async fn issue(&self) -> (String, String) {
        let ngroup = self.db.seed_ngroup(100).await.unwrap();
        let area = self.db.seed_area(&ngroup.id).await.unwrap();
        let issue = self
            .db
            .seed_issue(&area.id, None, IssueState::Entry)
            .await
            .unwrap();
        (area.id, issue.id)
    }

    pub async fn proposal_in(&self, issue_id: &str, state: ProposalState) -> String {
        self.db.seed_proposal_in(issue_id, state).await.unwrap().id
    }

    /// Seed `count` members supporting the proposal right now.
    pub async fn seed_supporters(&self, proposal_id: &str, prefix: &str, count: usize) {
        for i in 0..count {
            let member = self.db.seed_member(&format!("{prefix}{i}")).await.unwrap();
            self.db
                .seed_supporter(proposal_id, &member.id, Utc::now(), None)
                .await
                .unwrap();
        }
    }

    /// Seed `count` confirmed proponents.
    pub async fn seed_proponents(&self, proposal_id: &str, prefix: &str, count: usize) {
        for i in 0..count {
            let member = self.db.seed_member(&format!("{prefix}{i}")).await.unwrap();
            self.db
                .seed_supporter(
                    proposal_id,
                    &member.id,
                    Utc::now() - Duration::minutes(1),
                    Some((&format!("Proponent {i}"), true)),
                )
                .await
                .unwrap();
        }
    }
}
