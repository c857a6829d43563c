//! Who performs a workflow operation.

use plebiscite_common::{AppError, AppResult};

/// The caller of a workflow operation, passed explicitly into every service call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    /// A member acting on their own behalf.
    Member(String),
    /// A member with administrative rights.
    Admin(String),
    /// Scheduled jobs and other unattended callers.
    System,
}

impl Actor {
    /// Member ID of the actor, if it is a member.
    #[must_use]
    pub fn member_id(&self) -> Option<&str> {
        match self {
            Self::Member(id) | Self::Admin(id) => Some(id),
            Self::System => None,
        }
    }

    /// Whether the actor may use administrative operations.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin(_) | Self::System)
    }

    /// Author recorded on drafts; administrative edits have none.
    #[must_use]
    pub fn draft_author(&self) -> Option<String> {
        match self {
            Self::Member(id) => Some(id.clone()),
            Self::Admin(_) | Self::System => None,
        }
    }

    /// The member ID, or an error for unattended callers.
    pub fn require_member(&self) -> AppResult<&str> {
        self.member_id().ok_or(AppError::Unauthorized)
    }

    /// Fail unless the actor has administrative rights.
    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::permission_denied(
                "This operation is reserved to administrators",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_author() {
        assert_eq!(
            Actor::Member("m1".to_string()).draft_author().as_deref(),
            Some("m1")
        );
        assert!(Actor::Admin("m2".to_string()).draft_author().is_none());
        assert!(Actor::System.draft_author().is_none());
    }

    #[test]
    fn test_permissions() {
        assert!(Actor::Member("m1".to_string()).require_admin().is_err());
        assert!(Actor::System.require_admin().is_ok());
        assert!(matches!(
            Actor::System.require_member(),
            Err(AppError::Unauthorized)
        ));
        assert_eq!(Actor::Admin("m2".to_string()).require_member().ok(), Some("m2"));
    }
}
