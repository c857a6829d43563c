//! Common utilities and shared types for plebiscite.
//!
//! This crate provides foundational components used across all plebiscite crates:
//!
//! - **Configuration**: Application settings via [`Config`], including the
//!   governance rules (quorum ratios, proponent minimum, validity window)
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//!
//! # Example
//!
//! ```no_run
//! use plebiscite_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {} (quorum {}/{})", id, config.governance.quorum_num, config.governance.quorum_den);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;

pub use config::{Config, GovernanceConfig};
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
