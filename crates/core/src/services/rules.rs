//! Governance rules derived from the configuration.

use chrono::{DateTime, Duration, FixedOffset, Months, NaiveTime, Utc};
use plebiscite_common::{AppError, AppResult, GovernanceConfig};
use plebiscite_db::entities::proposal;
use serde::Serialize;

/// A quorum fraction `num / den`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ratio {
    pub num: u32,
    pub den: u32,
}

impl Ratio {
    /// `ceil(population * num / den)`.
    #[must_use]
    pub fn of(self, population: i64) -> i64 {
        let num = i64::from(self.num);
        let den = i64::from(self.den);
        (population * num + den - 1).div_euclid(den)
    }
}

impl std::fmt::Display for Ratio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// Rules every workflow operation is evaluated against.
#[derive(Debug, Clone)]
pub struct GovernanceRules {
    pub quorum: Ratio,
    /// Applies once another proposal of the same issue reached its quorum.
    pub quorum_alternative: Ratio,
    pub required_proponents: u64,
    pub supporters_valid_months: u32,
    pub revoke_grace: Duration,
    pub proponent_max_length: usize,
}

impl GovernanceRules {
    /// Build the rules from the configuration, rejecting unusable values.
    pub fn from_config(config: &GovernanceConfig) -> AppResult<Self> {
        if config.quorum_den == 0 || config.quorum_alternative_den == 0 {
            return Err(AppError::Config(
                "Quorum denominators must be positive".to_string(),
            ));
        }
        if config.proponent_max_length == 0 {
            return Err(AppError::Config(
                "proponent_max_length must be positive".to_string(),
            ));
        }
        Ok(Self::build(config))
    }

    fn build(config: &GovernanceConfig) -> Self {
        Self {
            quorum: Ratio {
                num: config.quorum_num,
                den: config.quorum_den,
            },
            quorum_alternative: Ratio {
                num: config.quorum_alternative_num,
                den: config.quorum_alternative_den,
            },
            required_proponents: u64::from(config.required_proponents),
            supporters_valid_months: config.supporters_valid_months,
            revoke_grace: Duration::days(i64::from(config.revoke_grace_days)),
            proponent_max_length: config.proponent_max_length,
        }
    }

    /// Confirmed proponents a proposal needs so it is not up for revocation.
    ///
    /// Drafts need a single proponent.
    #[must_use]
    pub const fn proponents_needed(&self, state: proposal::ProposalState) -> u64 {
        match state {
            proposal::ProposalState::Draft => 1,
            _ => self.required_proponents,
        }
    }

    /// Supports created at or before the returned instant have expired.
    ///
    /// The window is anchored at the day of admission or cancellation once
    /// the proposal left the collecting phase, else at the current day.
    #[must_use]
    pub fn validity_cutoff(&self, proposal: &proposal::Model, now: DateTime<Utc>) -> DateTime<FixedOffset> {
        let anchor = proposal
            .admitted_at
            .or(proposal.cancelled_at)
            .map_or(now, |at| at.with_timezone(&Utc));
        let day = anchor.date_naive();
        let start = day
            .checked_sub_months(Months::new(self.supporters_valid_months))
            .unwrap_or(day);
        start.and_time(NaiveTime::default()).and_utc().fixed_offset()
    }

    /// Whether a support created at `created_at` still counts.
    #[must_use]
    pub fn support_is_valid(
        &self,
        proposal: &proposal::Model,
        created_at: DateTime<FixedOffset>,
        now: DateTime<Utc>,
    ) -> bool {
        created_at > self.validity_cutoff(proposal, now)
    }

    /// Clamp a proponent name to the maximum length.
    ///
    /// Returns the name and whether it was cut.
    #[must_use]
    pub fn clamp_proponent_name(&self, name: &str) -> (String, bool) {
        if name.chars().count() > self.proponent_max_length {
            (name.chars().take(self.proponent_max_length).collect(), true)
        } else {
            (name.to_string(), false)
        }
    }
}

impl Default for GovernanceRules {
    fn default() -> Self {
        Self::build(&GovernanceConfig::default())
    }
}
