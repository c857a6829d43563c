//! Repository layer for database operations.

pub mod area;
pub mod ballot;
pub mod count_cache;
pub mod draft;
pub mod issue;
pub mod member;
pub mod period;
pub mod proposal;
pub mod supporter;

pub use area::AreaRepository;
pub use ballot::BallotRepository;
pub use count_cache::CountCache;
pub use draft::DraftRepository;
pub use issue::IssueRepository;
pub use member::MemberRepository;
pub use period::PeriodRepository;
pub use proposal::ProposalRepository;
pub use supporter::SupporterRepository;
