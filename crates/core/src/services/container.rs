//! Wiring of the core services on top of one database pool.

use crate::services::ballot::BallotService;
use crate::services::issue::IssueService;
use crate::services::member::MemberService;
use crate::services::notification::NotifierService;
use crate::services::participation::ParticipationService;
use crate::services::proposal::ProposalService;
use crate::services::quorum::QuorumCalculator;
use crate::services::rules::GovernanceRules;
use crate::services::supporter_ledger::SupporterLedger;
use crate::services::tally::VoterTally;
use plebiscite_db::repositories::{
    AreaRepository, BallotRepository, DraftRepository, IssueRepository, MemberRepository,
    PeriodRepository, ProposalRepository, SupporterRepository,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Every core service, sharing repositories, rules and notifier.
#[derive(Clone)]
pub struct Services {
    pub proposals: ProposalService,
    pub ledger: SupporterLedger,
    pub ballots: BallotService,
    pub members: MemberService,
    pub issues: IssueService,
    pub quorum: QuorumCalculator,
    pub tally: VoterTally,
    pub rules: GovernanceRules,
}

impl Services {
    /// Build the services.
    #[must_use]
    pub fn new(
        db: Arc<DatabaseConnection>,
        rules: GovernanceRules,
        notifier: NotifierService,
    ) -> Self {
        let proposal_repo = ProposalRepository::new(Arc::clone(&db));
        let issue_repo = IssueRepository::new(Arc::clone(&db));
        let supporter_repo = SupporterRepository::new(Arc::clone(&db));
        let draft_repo = DraftRepository::new(Arc::clone(&db));
        let member_repo = MemberRepository::new(Arc::clone(&db));
        let period_repo = PeriodRepository::new(Arc::clone(&db));
        let ballot_repo = BallotRepository::new(Arc::clone(&db));
        let area_repo = AreaRepository::new(db);

        let issues = IssueService::new(
            issue_repo.clone(),
            proposal_repo.clone(),
            period_repo.clone(),
            area_repo.clone(),
        );
        let participation = ParticipationService::new(area_repo);
        let quorum = QuorumCalculator::new(
            proposal_repo.clone(),
            issue_repo.clone(),
            participation.clone(),
            rules.clone(),
        );
        let tally = VoterTally::new(
            proposal_repo.clone(),
            supporter_repo.clone(),
            ballot_repo.clone(),
            quorum.clone(),
            issues.clone(),
            rules.clone(),
        );
        let ledger = SupporterLedger::new(
            proposal_repo.clone(),
            issue_repo.clone(),
            supporter_repo.clone(),
            member_repo.clone(),
            tally.clone(),
            participation.clone(),
            notifier.clone(),
            rules.clone(),
        );
        let proposals = ProposalService::new(
            proposal_repo,
            issue_repo,
            supporter_repo,
            draft_repo,
            member_repo.clone(),
            issues.clone(),
            ledger.clone(),
            tally.clone(),
            quorum.clone(),
            participation,
            notifier,
            rules.clone(),
        );
        let ballots = BallotService::new(ballot_repo, period_repo, member_repo.clone(), tally.clone());
        let members = MemberService::new(member_repo);

        Self {
            proposals,
            ledger,
            ballots,
            members,
            issues,
            quorum,
            tally,
            rules,
        }
    }
}
