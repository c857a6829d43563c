//! Business logic services.

#![allow(missing_docs)]

pub mod actor;
pub mod ballot;
pub mod container;
pub mod gate;
pub mod issue;
pub mod jobs;
pub mod member;
pub mod notification;
pub mod outcome;
pub mod participation;
pub mod proposal;
pub mod quorum;
pub mod rules;
pub mod supporter_ledger;
pub mod tally;

pub use actor::Actor;
pub use ballot::BallotService;
pub use container::Services;
pub use issue::IssueService;
pub use jobs::{spawn_revoke_scheduler, Job, JobSender, JobService, JobWorkerContext};
pub use member::{MemberProfile, MemberService};
pub use notification::{
    dispatch, NoOpNotifier, Notification, NotificationKind, Notifier, NotifierService,
    Recipients, TracingNotifier,
};
pub use outcome::{Notice, Outcome};
pub use participation::{AreaPopulation, ParticipationService};
pub use proposal::{CancelTarget, MoveOption, MoveTarget, Placement, ProposalService, ProposalText};
pub use quorum::{QuorumCalculator, QuorumInfo, QuorumLevel};
pub use rules::{GovernanceRules, Ratio};
pub use supporter_ledger::{SupportStatus, SupporterEntry, SupporterLedger, SupportersView};
pub use tally::VoterTally;
