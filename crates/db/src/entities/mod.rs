//! Database entities.

#![allow(missing_docs)]

pub mod area;
pub mod ballot;
pub mod draft;
pub mod issue;
pub mod member;
pub mod member_ngroup;
pub mod ngroup;
pub mod participant;
pub mod period;
pub mod proposal;
pub mod supporter;
pub mod voter;
pub mod votingmode_token;

pub use area::Entity as Area;
pub use ballot::Entity as Ballot;
pub use draft::Entity as Draft;
pub use issue::Entity as Issue;
pub use member::Entity as Member;
pub use member_ngroup::Entity as MemberNgroup;
pub use ngroup::Entity as Ngroup;
pub use participant::Entity as Participant;
pub use period::Entity as Period;
pub use proposal::Entity as Proposal;
pub use supporter::Entity as Supporter;
pub use voter::Entity as Voter;
pub use votingmode_token::Entity as VotingmodeToken;
