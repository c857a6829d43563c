//! Supporter ledger workflows against a migrated database.

#![allow(clippy::unwrap_used)]

mod common;

use chrono::{Duration, Months, Utc};
use common::Harness;
use plebiscite_common::AppError;
use plebiscite_core::{Notice, NotificationKind, QuorumLevel, Recipients, SupportStatus};
use plebiscite_db::entities::proposal::ProposalState;

#[tokio::test]
async fn test_quorum_escalates_once_a_sibling_is_admitted() {
    let h = Harness::new().await;
    let (_, issue_id) = h.issue().await;
    let a = h.proposal_in(&issue_id, ProposalState::Submitted).await;
    let b = h.proposal_in(&issue_id, ProposalState::Submitted).await;

    assert_eq!(h.services.proposals.quorum_info(&b).await.unwrap().required, 10);

    for i in 0..10 {
        let (_, actor) = h.member(&format!("supporter{i}")).await;
        h.services.ledger.add_support(&actor, &a, false).await.unwrap();
    }

    let a = h.services.proposals.get(&a).await.unwrap();
    assert_eq!(a.supporters, 10);
    assert!(a.quorum_reached);
    assert_eq!(a.state, ProposalState::Admitted);
    assert!(a.admitted_at.is_some());

    let info = h.services.proposals.quorum_info(&b).await.unwrap();
    assert_eq!(info.level, QuorumLevel::Alternative);
    assert_eq!(info.required, 20);
    assert_eq!(info.population, 100);
    assert_eq!(info.participants, 10);

    let b = h.services.proposals.get(&b).await.unwrap();
    assert!(!b.quorum_reached);
    assert_eq!(b.state, ProposalState::Submitted);
}

#[tokio::test]
async fn test_first_proponent_is_confirmed_without_notification() {
    let h = Harness::new().await;
    let (_, issue_id) = h.issue().await;
    let proposal_id = h.proposal_in(&issue_id, ProposalState::Draft).await;
    let (first, first_actor) = h.member("alice").await;
    let (_, second_actor) = h.member("bob").await;

    let outcome = h
        .services
        .ledger
        .apply_as_proponent(&first_actor, &proposal_id, "Alice")
        .await
        .unwrap();
    assert!(outcome.value.proponent_confirmed);
    assert!(outcome.warnings.is_empty());
    assert!(h.notifier.of_kind(NotificationKind::ApplyProponent).is_empty());

    let outcome = h
        .services
        .ledger
        .apply_as_proponent(&second_actor, &proposal_id, "Bob")
        .await
        .unwrap();
    assert!(!outcome.value.proponent_confirmed);
    assert!(outcome.has(&Notice::ApplicationPending));

    let sent = h.notifier.of_kind(NotificationKind::ApplyProponent);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].proponent.as_deref(), Some("Bob"));
    assert_eq!(sent[0].recipients, Recipients::Members(vec![first.id]));
}

#[tokio::test]
async fn test_proponent_name_is_checked_and_clamped() {
    let h = Harness::new().await;
    let (_, issue_id) = h.issue().await;
    let proposal_id = h.proposal_in(&issue_id, ProposalState::Draft).await;
    let (_, actor) = h.member("alice").await;

    let err = h
        .services
        .ledger
        .apply_as_proponent(&actor, &proposal_id, "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let outcome = h
        .services
        .ledger
        .apply_as_proponent(&actor, &proposal_id, &"x".repeat(150))
        .await
        .unwrap();
    assert_eq!(outcome.value.proponent.as_deref().map(str::len), Some(100));
    assert!(outcome.has(&Notice::Truncated { max: 100 }));

    let outcome = h
        .services
        .ledger
        .update_proponent_info(&actor, &proposal_id, "Alice")
        .await
        .unwrap();
    assert_eq!(outcome.value.proponent.as_deref(), Some("Alice"));
    assert!(outcome.warnings.is_empty());
}

#[tokio::test]
async fn test_removing_last_proponent_schedules_revocation_once() {
    let h = Harness::new().await;
    let (_, issue_id) = h.issue().await;
    let proposal_id = h.proposal_in(&issue_id, ProposalState::Draft).await;
    let (alice, alice_actor) = h.member("alice").await;
    let (bob, bob_actor) = h.member("bob").await;

    h.services
        .ledger
        .apply_as_proponent(&alice_actor, &proposal_id, "Alice")
        .await
        .unwrap();
    h.services
        .ledger
        .apply_as_proponent(&bob_actor, &proposal_id, "Bob")
        .await
        .unwrap();

    let before = Utc::now();
    let proposal = h
        .services
        .ledger
        .remove_proponent(&alice_actor, &proposal_id, &alice.id)
        .await
        .unwrap()
        .value;
    let revoke_at = proposal.revoke_at.unwrap();
    assert!(revoke_at >= before + Duration::days(7));
    assert!(revoke_at <= Utc::now() + Duration::days(7));

    // A racing removal must not move the deadline.
    let written = h
        .proposal_repo
        .schedule_revoke(
            h.db.connection(),
            &proposal_id,
            (Utc::now() + Duration::days(30)).into(),
        )
        .await
        .unwrap();
    assert!(!written);

    let proposal = h
        .services
        .ledger
        .remove_proponent(&bob_actor, &proposal_id, &bob.id)
        .await
        .unwrap()
        .value;
    assert_eq!(proposal.revoke_at, Some(revoke_at));

    // The former proponent stays a plain supporter.
    let view = h
        .services
        .ledger
        .supporters(&proposal_id, Some(&alice.id))
        .await
        .unwrap();
    assert_eq!(view.is_supporter, SupportStatus::Named);
    assert!(!view.is_proponent);
    assert_eq!(h.notifier.of_kind(NotificationKind::RemovedProponent).len(), 2);
}

#[tokio::test]
async fn test_members_can_only_remove_themselves() {
    let h = Harness::new().await;
    let (_, issue_id) = h.issue().await;
    let proposal_id = h.proposal_in(&issue_id, ProposalState::Draft).await;
    let (alice, alice_actor) = h.member("alice").await;
    let (_, bob_actor) = h.member("bob").await;
    h.services
        .ledger
        .apply_as_proponent(&alice_actor, &proposal_id, "Alice")
        .await
        .unwrap();

    let err = h
        .services
        .ledger
        .remove_proponent(&bob_actor, &proposal_id, &alice.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::PermissionDenied(_)));

    let admin = h.admin().await;
    h.services
        .ledger
        .remove_proponent(&admin, &proposal_id, &alice.id)
        .await
        .unwrap();
    assert!(h.services.ledger.proponents(&proposal_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_confirming_enough_proponents_clears_revocation() {
    let h = Harness::new().await;
    let (_, issue_id) = h.issue().await;
    let proposal_id = h.proposal_in(&issue_id, ProposalState::Draft).await;
    let (alice, alice_actor) = h.member("alice").await;
    let (bob, bob_actor) = h.member("bob").await;

    h.services
        .ledger
        .apply_as_proponent(&alice_actor, &proposal_id, "Alice")
        .await
        .unwrap();
    h.services
        .ledger
        .apply_as_proponent(&bob_actor, &proposal_id, "Bob")
        .await
        .unwrap();
    h.services
        .ledger
        .remove_proponent(&alice_actor, &proposal_id, &alice.id)
        .await
        .unwrap();
    assert!(h.services.proposals.get(&proposal_id).await.unwrap().revoke_at.is_some());

    // Bob's application is still pending; nobody but an administrator can confirm it.
    let err = h
        .services
        .ledger
        .confirm_proponent(&alice_actor, &proposal_id, &bob.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::PermissionDenied(_)));

    let admin = h.admin().await;
    let outcome = h
        .services
        .ledger
        .confirm_proponent(&admin, &proposal_id, &bob.id)
        .await
        .unwrap();
    assert!(outcome.value.proponent_confirmed);

    let proposal = h.services.proposals.get(&proposal_id).await.unwrap();
    assert!(proposal.revoke_at.is_none());
    assert_eq!(
        h.services.ledger.proponent_names(&proposal_id).await.unwrap(),
        vec!["Bob".to_string()]
    );
    assert_eq!(
        h.notifier.of_kind(NotificationKind::ConfirmedProponent).len(),
        1
    );
}

#[tokio::test]
async fn test_confirming_a_non_applicant_is_rejected() {
    let h = Harness::new().await;
    let (_, issue_id) = h.issue().await;
    let proposal_id = h.proposal_in(&issue_id, ProposalState::Submitted).await;
    let (_, alice_actor) = h.member("alice").await;
    let (carol, carol_actor) = h.member("carol").await;
    h.services
        .ledger
        .apply_as_proponent(&alice_actor, &proposal_id, "Alice")
        .await
        .unwrap();
    h.services
        .ledger
        .add_support(&carol_actor, &proposal_id, false)
        .await
        .unwrap();

    let err = h
        .services
        .ledger
        .confirm_proponent(&alice_actor, &proposal_id, &carol.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_racing_removals_of_the_last_proponents_schedule_revocation() {
    let h = Harness::new().await;
    let (_, issue_id) = h.issue().await;
    let proposal_id = h.proposal_in(&issue_id, ProposalState::Submitted).await;
    let (alice, alice_actor) = h.member("alice").await;
    let (bob, bob_actor) = h.member("bob").await;
    for (member, name) in [(&alice, "Alice"), (&bob, "Bob")] {
        h.db
            .seed_supporter(
                &proposal_id,
                &member.id,
                Utc::now() - Duration::minutes(1),
                Some((name, true)),
            )
            .await
            .unwrap();
    }

    let (first, second) = tokio::join!(
        h.services
            .ledger
            .remove_proponent(&alice_actor, &proposal_id, &alice.id),
        h.services
            .ledger
            .remove_proponent(&bob_actor, &proposal_id, &bob.id),
    );
    first.unwrap();
    second.unwrap();

    let proposal = h.services.proposals.get(&proposal_id).await.unwrap();
    assert!(proposal.revoke_at.is_some());
}

#[tokio::test]
async fn test_supporter_count_follows_the_ledger() {
    let h = Harness::new().await;
    let (_, issue_id) = h.issue().await;
    let proposal_id = h.proposal_in(&issue_id, ProposalState::Submitted).await;

    let (old, old_actor) = h.member("old").await;
    let stale = Utc::now().checked_sub_months(Months::new(7)).unwrap();
    h.db
        .seed_supporter(&proposal_id, &old.id, stale, None)
        .await
        .unwrap();

    let (_, first) = h.member("first").await;
    let (_, second) = h.member("second").await;
    h.services.ledger.add_support(&first, &proposal_id, false).await.unwrap();
    h.services.ledger.add_support(&second, &proposal_id, true).await.unwrap();
    assert_eq!(h.services.proposals.get(&proposal_id).await.unwrap().supporters, 2);

    h.services.ledger.revoke_support(&second, &proposal_id).await.unwrap();
    assert_eq!(h.services.proposals.get(&proposal_id).await.unwrap().supporters, 1);

    let outcome = h
        .services
        .ledger
        .renew_support(&old_actor, &proposal_id)
        .await
        .unwrap();
    assert!(outcome.has(&Notice::SupportExpired));
    assert_eq!(h.services.proposals.get(&proposal_id).await.unwrap().supporters, 2);

    let outcome = h
        .services
        .ledger
        .add_support(&first, &proposal_id, false)
        .await
        .unwrap();
    assert!(outcome.warnings.is_empty());
    assert_eq!(h.services.proposals.get(&proposal_id).await.unwrap().supporters, 2);

    let err = h
        .services
        .ledger
        .renew_support(&second, &proposal_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_confirmed_proponent_can_not_revoke_support() {
    let h = Harness::new().await;
    let (_, issue_id) = h.issue().await;
    let proposal_id = h.proposal_in(&issue_id, ProposalState::Submitted).await;
    let (alice, actor) = h.member("alice").await;
    h.services
        .ledger
        .apply_as_proponent(&actor, &proposal_id, "Alice")
        .await
        .unwrap();

    let err = h
        .services
        .ledger
        .revoke_support(&actor, &proposal_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::PermissionDenied(_)));
    assert_eq!(
        h.services.ledger.proponents(&proposal_id).await.unwrap(),
        vec![alice.id]
    );
    assert_eq!(h.services.proposals.get(&proposal_id).await.unwrap().supporters, 1);
}

#[tokio::test]
async fn test_support_gate_follows_phase() {
    let h = Harness::new().await;
    let (_, issue_id) = h.issue().await;
    let draft = h.proposal_in(&issue_id, ProposalState::Draft).await;
    let (alice, actor) = h.member("alice").await;

    let err = h
        .services
        .ledger
        .add_support(&actor, &draft, false)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::PermissionDenied(_)));

    let view = h.services.ledger.supporters(&draft, Some(&alice.id)).await.unwrap();
    assert_eq!(view.is_supporter, SupportStatus::NotSupporting);
    assert!(view.supporters.is_empty());
}

#[tokio::test]
async fn test_anonymous_supporters_are_hidden_from_others() {
    let h = Harness::new().await;
    let (_, issue_id) = h.issue().await;
    let proposal_id = h.proposal_in(&issue_id, ProposalState::Submitted).await;
    let (alice, alice_actor) = h.member("alice").await;
    let (bob, _) = h.member("bob").await;
    h.services
        .ledger
        .add_support(&alice_actor, &proposal_id, true)
        .await
        .unwrap();

    let own = h.services.ledger.supporters(&proposal_id, Some(&alice.id)).await.unwrap();
    assert_eq!(own.is_supporter, SupportStatus::Anonymous);
    assert!(own.is_valid);
    assert_eq!(own.supporters[0].member_id.as_deref(), Some(alice.id.as_str()));

    let other = h.services.ledger.supporters(&proposal_id, Some(&bob.id)).await.unwrap();
    assert_eq!(other.is_supporter, SupportStatus::NotSupporting);
    assert!(other.supporters[0].member_id.is_none());
    assert!(other.supporters[0].anonymous);
}
