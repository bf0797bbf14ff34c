// SPDX-License-Identifier: PMPL-1.0-or-later
//! In-process store implementations

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::info;

use super::models::{AuditHistoryEntry, TeamConfig};
use super::{AuditHistory, TeamConfigStore};
use crate::error::{Error, Result};

/// Team configs held in memory, seeded from the `teams` config section
#[derive(Debug, Default)]
pub struct InMemoryTeamConfigStore {
    teams: Mutex<HashMap<String, TeamConfig>>,
}

impl InMemoryTeamConfigStore {
    pub fn new(teams: HashMap<String, TeamConfig>) -> Self {
        Self {
            teams: Mutex::new(teams),
        }
    }
}

#[async_trait]
impl TeamConfigStore for InMemoryTeamConfigStore {
    async fn get(&self, team_id: &str) -> Result<Option<TeamConfig>> {
        let teams = self
            .teams
            .lock()
            .map_err(|_| Error::Store("team config lock poisoned".to_string()))?;
        Ok(teams.get(team_id).cloned())
    }

    async fn save(&self, team_id: &str, config: TeamConfig) -> Result<()> {
        config.validate()?;
        let mut teams = self
            .teams
            .lock()
            .map_err(|_| Error::Store("team config lock poisoned".to_string()))?;
        teams.insert(team_id.to_string(), config);
        Ok(())
    }
}

/// History sink that writes entries to the log
#[derive(Debug, Default)]
pub struct TracingAuditHistory;

#[async_trait]
impl AuditHistory for TracingAuditHistory {
    async fn record(&self, entry: AuditHistoryEntry) -> Result<()> {
        info!(
            audit_type = %entry.audit_type,
            team_id = entry.team_id.as_deref().unwrap_or("-"),
            user_id = entry.user_id.as_deref().unwrap_or("-"),
            issues_found = entry.issues_found,
            "Audit recorded"
        );
        Ok(())
    }
}

/// History kept in memory for inspection
#[derive(Debug, Default)]
pub struct InMemoryAuditHistory {
    entries: Mutex<Vec<AuditHistoryEntry>>,
}

impl InMemoryAuditHistory {
    pub fn entries(&self) -> Vec<AuditHistoryEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AuditHistory for InMemoryAuditHistory {
    async fn record(&self, entry: AuditHistoryEntry) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| Error::Store("audit history lock poisoned".to_string()))?
            .push(entry);
        Ok(())
    }
}
