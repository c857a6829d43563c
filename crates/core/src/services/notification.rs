//! Notification collaborator.
//!
//! Core services describe what happened; delivery (mail, push, ...) is the
//! business of the `Notifier` implementation.

use async_trait::async_trait;
use plebiscite_common::AppResult;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Event types sent to the notification collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewProposal,
    NewDraft,
    Submitted,
    ApplyProponent,
    ConfirmedProponent,
    RemovedProponent,
    ProposalMoved,
}

impl NotificationKind {
    /// Wire name of the event.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NewProposal => "new_proposal",
            Self::NewDraft => "new_draft",
            Self::Submitted => "submitted",
            Self::ApplyProponent => "apply_proponent",
            Self::ConfirmedProponent => "confirmed_proponent",
            Self::RemovedProponent => "removed_proponent",
            Self::ProposalMoved => "proposal_moved",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who receives a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipients {
    /// The notifier decides, e.g. from the members' notification settings.
    Default,
    /// Exactly these members.
    Members(Vec<String>),
}

/// A notification about a proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub proposal_id: String,
    pub issue_id: String,
    /// Issue the proposal was moved away from.
    pub previous_issue_id: Option<String>,
    /// Name of the proponent the event is about, if any.
    pub proponent: Option<String>,
    /// Name of the proponent who confirmed an application.
    pub confirming_proponent: Option<String>,
    pub recipients: Recipients,
}

impl Notification {
    /// A notification for the default recipients.
    pub fn new(
        kind: NotificationKind,
        proposal_id: impl Into<String>,
        issue_id: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            proposal_id: proposal_id.into(),
            issue_id: issue_id.into(),
            previous_issue_id: None,
            proponent: None,
            confirming_proponent: None,
            recipients: Recipients::Default,
        }
    }

    #[must_use]
    pub fn with_proponent(mut self, proponent: Option<String>) -> Self {
        self.proponent = proponent;
        self
    }

    #[must_use]
    pub fn with_confirming_proponent(mut self, proponent: Option<String>) -> Self {
        self.confirming_proponent = proponent;
        self
    }

    #[must_use]
    pub fn with_previous_issue(mut self, issue_id: impl Into<String>) -> Self {
        self.previous_issue_id = Some(issue_id.into());
        self
    }

    #[must_use]
    pub fn for_members(mut self, members: Vec<String>) -> Self {
        self.recipients = Recipients::Members(members);
        self
    }
}

/// Trait for delivering notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a notification.
    async fn notify(&self, notification: Notification) -> AppResult<()>;
}

/// Notifier that writes one structured log line per event.
#[derive(Clone, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, notification: Notification) -> AppResult<()> {
        let recipients = match &notification.recipients {
            Recipients::Default => "default".to_string(),
            Recipients::Members(members) => members.join(","),
        };
        info!(
            kind = %notification.kind,
            proposal_id = %notification.proposal_id,
            issue_id = %notification.issue_id,
            previous_issue_id = ?notification.previous_issue_id,
            proponent = ?notification.proponent,
            confirming_proponent = ?notification.confirming_proponent,
            recipients = %recipients,
            "Notification"
        );
        Ok(())
    }
}

/// Notifier that drops every event.
#[derive(Clone, Default)]
pub struct NoOpNotifier;

#[async_trait]
impl Notifier for NoOpNotifier {
    async fn notify(&self, _notification: Notification) -> AppResult<()> {
        Ok(())
    }
}

pub type NotifierService = Arc<dyn Notifier>;

/// Send a notification; delivery failures are logged, never propagated.
pub async fn dispatch(notifier: &NotifierService, notification: Notification) {
    let kind = notification.kind;
    let proposal_id = notification.proposal_id.clone();
    if let Err(e) = notifier.notify(notification).await {
        warn!(kind = %kind, proposal_id = %proposal_id, error = %e, "Failed to send notification");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(NotificationKind::ApplyProponent.to_string(), "apply_proponent");
        assert_eq!(
            serde_json::to_value(NotificationKind::ProposalMoved).unwrap(),
            serde_json::json!("proposal_moved")
        );
    }

    #[test]
    fn test_builder() {
        let notification = Notification::new(NotificationKind::ProposalMoved, "p1", "i2")
            .with_previous_issue("i1")
            .for_members(vec!["m1".to_string()]);

        assert_eq!(notification.previous_issue_id.as_deref(), Some("i1"));
        assert_eq!(
            notification.recipients,
            Recipients::Members(vec!["m1".to_string()])
        );
    }

    #[tokio::test]
    async fn test_noop_notifier() {
        let notifier: NotifierService = Arc::new(NoOpNotifier);
        dispatch(
            &notifier,
            Notification::new(NotificationKind::Submitted, "p1", "i1"),
        )
        .await;
    }
}
