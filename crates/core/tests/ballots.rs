//! Ballot assignment and member synchronization against a migrated database.

#![allow(clippy::unwrap_used)]

mod common;

use chrono::{Duration, Utc};
use common::Harness;
use plebiscite_common::AppError;
use plebiscite_core::{Actor, MemberProfile};
use std::collections::HashMap;

/// A period whose ballot assignment started two days ago.
async fn assignment_period(h: &Harness) -> String {
    let ngroup = h.db.seed_ngroup(100).await.unwrap();
    h.db
        .seed_period(&ngroup.id, Utc::now() - Duration::days(10))
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_assign_remaining_without_approved_ballots_is_a_noop() {
    let h = Harness::new().await;
    let period_id = assignment_period(&h).await;
    h.db.seed_ballot(&period_id, "Town hall", false).await.unwrap();
    h.member("alice").await;
    let admin = h.admin().await;

    let assigned = h
        .services
        .ballots
        .assign_remaining_members(&admin, &period_id)
        .await
        .unwrap();
    assert_eq!(assigned, 0);

    let ballots = h.services.ballots.ballots(&period_id).await.unwrap();
    assert!(ballots.iter().all(|ballot| ballot.voters == 0));
}

#[tokio::test]
async fn test_assign_remaining_gives_everyone_one_approved_ballot() {
    let h = Harness::new().await;
    let period_id = assignment_period(&h).await;
    let north = h.db.seed_ballot(&period_id, "North", true).await.unwrap();
    let south = h.db.seed_ballot(&period_id, "South", true).await.unwrap();
    let closed = h.db.seed_ballot(&period_id, "Closed", false).await.unwrap();

    let (chooser, chooser_actor) = h.member("chooser").await;
    let err = h
        .services
        .ballots
        .select_ballot(&chooser_actor, &period_id, &closed.id, false)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::PermissionDenied(_)));
    h.services
        .ballots
        .select_ballot(&chooser_actor, &period_id, &north.id, true)
        .await
        .unwrap();

    let mut members = Vec::new();
    for i in 0..6 {
        members.push(h.member(&format!("member{i}")).await.0);
    }
    let admin = h.admin().await;

    let assigned = h
        .services
        .ballots
        .assign_remaining_members(&admin, &period_id)
        .await
        .unwrap();
    // Six members plus the administrator.
    assert_eq!(assigned, 7);

    for member in &members {
        let voter = h
            .services
            .ballots
            .voter(&member.id, &period_id)
            .await
            .unwrap()
            .unwrap();
        assert!(voter.ballot_id == north.id || voter.ballot_id == south.id);
        assert!(!voter.agent);
    }
    let own = h
        .services
        .ballots
        .voter(&chooser.id, &period_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(own.ballot_id, north.id);
    assert!(own.agent);

    let counts: HashMap<String, i32> = h
        .services
        .ballots
        .ballots(&period_id)
        .await
        .unwrap()
        .into_iter()
        .map(|ballot| (ballot.id, ballot.voters))
        .collect();
    assert_eq!(counts[&north.id] + counts[&south.id], 8);
    assert_eq!(counts[&closed.id], 0);

    let again = h
        .services
        .ballots
        .assign_remaining_members(&admin, &period_id)
        .await
        .unwrap();
    assert_eq!(again, 0);
}

#[tokio::test]
async fn test_assign_remaining_handles_a_large_membership() {
    let h = Harness::new().await;
    let period_id = assignment_period(&h).await;
    let ballot = h.db.seed_ballot(&period_id, "Central", true).await.unwrap();
    h.db.seed_members("voter", 7000).await.unwrap();
    let admin = h.admin().await;

    let assigned = h
        .services
        .ballots
        .assign_remaining_members(&admin, &period_id)
        .await
        .unwrap();
    assert_eq!(assigned, 7001);

    let ballots = h.services.ballots.ballots(&period_id).await.unwrap();
    let central = ballots.iter().find(|b| b.id == ballot.id).unwrap();
    assert_eq!(central.voters, 7001);
}

#[tokio::test]
async fn test_ballot_choice_only_during_assignment() {
    let h = Harness::new().await;
    let ngroup = h.db.seed_ngroup(100).await.unwrap();
    let period = h
        .db
        .seed_period(&ngroup.id, Utc::now() + Duration::days(1))
        .await
        .unwrap();
    let ballot = h.db.seed_ballot(&period.id, "North", true).await.unwrap();
    let (_, actor) = h.member("alice").await;

    let err = h
        .services
        .ballots
        .select_ballot(&actor, &period.id, &ballot.id, false)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::PermissionDenied(_)));
}

#[tokio::test]
async fn test_unselect_ballot_updates_counts() {
    let h = Harness::new().await;
    let period_id = assignment_period(&h).await;
    let ballot = h.db.seed_ballot(&period_id, "North", true).await.unwrap();
    let (_, actor) = h.member("alice").await;

    h.services
        .ballots
        .select_ballot(&actor, &period_id, &ballot.id, false)
        .await
        .unwrap();
    assert_eq!(h.services.ballots.ballots(&period_id).await.unwrap()[0].voters, 1);

    assert!(h.services.ballots.unselect_ballot(&actor, &period_id).await.unwrap());
    assert!(!h.services.ballots.unselect_ballot(&actor, &period_id).await.unwrap());
    assert_eq!(h.services.ballots.ballots(&period_id).await.unwrap()[0].voters, 0);
}

#[tokio::test]
async fn test_approvals_are_saved_all_or_nothing() {
    let h = Harness::new().await;
    let period_id = assignment_period(&h).await;
    let admin = h.admin().await;
    let ballot = h
        .services
        .ballots
        .create_ballot(&admin, &period_id, "  Library ")
        .await
        .unwrap();
    assert_eq!(ballot.name, "Library");
    assert!(!ballot.approved);

    let err = h
        .services
        .ballots
        .save_approved_ballots(
            &admin,
            &period_id,
            vec![(ballot.id.clone(), true), ("missing".to_string(), true)],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert!(!h.services.ballots.ballots(&period_id).await.unwrap()[0].approved);

    let ballots = h
        .services
        .ballots
        .save_approved_ballots(&admin, &period_id, vec![(ballot.id.clone(), true)])
        .await
        .unwrap();
    assert!(ballots[0].approved);

    let (_, member) = h.member("alice").await;
    let err = h
        .services
        .ballots
        .create_ballot(&member, &period_id, "Mine")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::PermissionDenied(_)));
}

#[tokio::test]
async fn test_sync_member_issues_a_fresh_token() {
    let h = Harness::new().await;
    let ngroup = h.db.seed_ngroup(100).await.unwrap();
    let profile = MemberProfile {
        auid: "idp-42".to_string(),
        username: "carol".to_string(),
        public_id: Some("Carol".to_string()),
        profile: None,
        participant: true,
        ngroup_ids: vec![ngroup.id.clone()],
    };

    let first = h.services.members.sync_member(profile.clone()).await.unwrap();
    let first_token = first.token.clone().unwrap();
    assert!(!first.is_admin);
    assert_eq!(
        h.services.members.ngroup_ids(&first.id).await.unwrap(),
        vec![ngroup.id]
    );

    let second = h
        .services
        .members
        .sync_member(MemberProfile {
            participant: false,
            ngroup_ids: Vec::new(),
            ..profile
        })
        .await
        .unwrap();
    assert_eq!(second.id, first.id);
    assert!(!second.participant);
    assert!(h.services.members.ngroup_ids(&first.id).await.unwrap().is_empty());

    let err = h.services.members.authenticate(&first_token).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));

    let (member, actor) = h
        .services
        .members
        .authenticate(&second.token.unwrap())
        .await
        .unwrap();
    assert_eq!(member.id, first.id);
    assert_eq!(actor, Actor::Member(first.id));
}

#[tokio::test]
async fn test_sync_member_rejects_empty_identity() {
    let h = Harness::new().await;
    let err = h
        .services
        .members
        .sync_member(MemberProfile {
            auid: String::new(),
            username: "nobody".to_string(),
            public_id: None,
            profile: None,
            participant: true,
            ngroup_ids: Vec::new(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_sync_member_rejects_a_taken_username() {
    let h = Harness::new().await;
    h.member("dave").await;

    let err = h
        .services
        .members
        .sync_member(MemberProfile {
            auid: "idp-7".to_string(),
            username: "dave".to_string(),
            public_id: None,
            profile: None,
            participant: true,
            ngroup_ids: Vec::new(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}
