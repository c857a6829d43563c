//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Governance rules (quorum, proponents, validity window).
    #[serde(default)]
    pub governance: GovernanceConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Governance configuration.
///
/// The quorum ratios are applied to an area's population: a proposal needs
/// `ceil(population * num / den)` valid supporters to be admitted. Once another
/// proposal of the same issue reached its quorum, the alternative ratio applies.
#[derive(Debug, Clone, Deserialize)]
pub struct GovernanceConfig {
    /// Numerator of the standard quorum.
    #[serde(default = "default_quorum_num")]
    pub quorum_num: u32,
    /// Denominator of the standard quorum.
    #[serde(default = "default_quorum_den")]
    pub quorum_den: u32,
    /// Numerator of the quorum for further proposals of an issue.
    #[serde(default = "default_quorum_alternative_num")]
    pub quorum_alternative_num: u32,
    /// Denominator of the quorum for further proposals of an issue.
    #[serde(default = "default_quorum_alternative_den")]
    pub quorum_alternative_den: u32,
    /// Confirmed proponents needed to submit a proposal.
    #[serde(default = "default_required_proponents")]
    pub required_proponents: u32,
    /// Months a support stays valid.
    #[serde(default = "default_supporters_valid_months")]
    pub supporters_valid_months: u32,
    /// Days until a proposal without proponents gets revoked.
    #[serde(default = "default_revoke_grace_days")]
    pub revoke_grace_days: u32,
    /// Maximum length of a proponent display name.
    #[serde(default = "default_proponent_max_length")]
    pub proponent_max_length: usize,
    /// Seconds between runs of the auto-revocation job.
    #[serde(default = "default_revoke_job_interval_secs")]
    pub revoke_job_interval_secs: u64,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            quorum_num: default_quorum_num(),
            quorum_den: default_quorum_den(),
            quorum_alternative_num: default_quorum_alternative_num(),
            quorum_alternative_den: default_quorum_alternative_den(),
            required_proponents: default_required_proponents(),
            supporters_valid_months: default_supporters_valid_months(),
            revoke_grace_days: default_revoke_grace_days(),
            proponent_max_length: default_proponent_max_length(),
            revoke_job_interval_secs: default_revoke_job_interval_secs(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

const fn default_quorum_num() -> u32 {
    1
}

const fn default_quorum_den() -> u32 {
    10
}

const fn default_quorum_alternative_num() -> u32 {
    1
}

const fn default_quorum_alternative_den() -> u32 {
    5
}

const fn default_required_proponents() -> u32 {
    5
}

const fn default_supporters_valid_months() -> u32 {
    6
}

const fn default_revoke_grace_days() -> u32 {
    7
}

const fn default_proponent_max_length() -> usize {
    100
}

const fn default_revoke_job_interval_secs() -> u64 {
    300
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `PLEBISCITE_ENV`)
    /// 3. Environment variables with `PLEBISCITE_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        // A missing .env file is fine; real deployments use the environment.
        let _ = dotenvy::dotenv();

        let env = std::env::var("PLEBISCITE_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("PLEBISCITE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("PLEBISCITE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
