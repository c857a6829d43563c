//! Core business logic for plebiscite.
//!
//! Proposal lifecycle, supporter ledger, quorum and ballot assignment. Every
//! workflow operation takes the acting [`Actor`] explicitly.

pub mod services;

pub use services::*;
