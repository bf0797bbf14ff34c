// SPDX-License-Identifier: PMPL-1.0-or-later
//! Team configuration store and audit history log

pub mod memory;
pub mod models;

pub use memory::{InMemoryAuditHistory, InMemoryTeamConfigStore, TracingAuditHistory};

use async_trait::async_trait;

use crate::error::Result;
use models::{AuditHistoryEntry, TeamConfig};

/// Lookup of per-team configuration
#[async_trait]
pub trait TeamConfigStore: Send + Sync {
    /// `Ok(None)` when the team has not configured anything
    async fn get(&self, team_id: &str) -> Result<Option<TeamConfig>>;

    /// Validate and store a team's configuration
    async fn save(&self, team_id: &str, config: TeamConfig) -> Result<()>;
}

/// Append-only audit history
#[async_trait]
pub trait AuditHistory: Send + Sync {
    async fn record(&self, entry: AuditHistoryEntry) -> Result<()>;
}
