//! Configuration for the command framework.

use anyhow::{Context, Result};
use std::env;

use crate::error::BuildError;

/// Framework configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Discord application ID used for all command endpoints
    pub application_id: u64,

    /// Guilds that commands without an explicit scope are forced into,
    /// so development builds never publish globally
    pub debug_guilds: Option<Vec<u64>>,

    /// Single owner override for `is_owner` permission resolution
    pub owner_id: Option<u64>,

    /// Multi-owner override; mutually exclusive with `owner_id`
    pub owner_ids: Option<Vec<u64>>,

    /// Log level
    pub log_level: String,
}

impl Config {
    /// Create a configuration with only the required application id.
    pub fn new(application_id: u64) -> Self {
        Self {
            application_id,
            debug_guilds: None,
            owner_id: None,
            owner_ids: None,
            log_level: "info".to_string(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let application_id = env::var("APPLICATION_ID")
            .context("APPLICATION_ID environment variable not set")?
            .parse()
            .context("APPLICATION_ID is not a valid id")?;

        let debug_guilds = env::var("DEBUG_GUILD_IDS").ok().map(parse_id_list);

        let owner_id = env::var("OWNER_ID").ok().and_then(|s| s.parse().ok());

        let owner_ids = env::var("OWNER_IDS").ok().map(parse_id_list);

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            application_id,
            debug_guilds,
            owner_id,
            owner_ids,
            log_level,
        })
    }

    /// Reject conflicting owner declarations. Called by the bot builder.
    pub(crate) fn validate(&self) -> Result<(), BuildError> {
        if self.owner_id.is_some() && self.owner_ids.is_some() {
            return Err(BuildError::ConflictingOwnerIds);
        }
        Ok(())
    }

    /// Owner ids declared in configuration, if any.
    pub(crate) fn owner_override(&self) -> Option<Vec<u64>> {
        if let Some(id) = self.owner_id {
            return Some(vec![id]);
        }
        self.owner_ids.clone()
    }
}

fn parse_id_list(raw: String) -> Vec<u64> {
    raw.split(',')
        .filter_map(|part| part.trim().parse().ok())
        .collect()
}
