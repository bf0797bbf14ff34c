// SPDX-License-Identifier: PMPL-1.0-or-later
//! Persisted records: team configuration and audit history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analyzers::RuleSpec;
use crate::design_system::validate_design_system_url;
use crate::error::{Error, Result};
use crate::issue::WcagLevel;

/// A team's design-system and accessibility settings.
///
/// Read as camelCase over HTTP; the snake_case aliases serve `[teams.*]`
/// sections in the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamConfig {
    #[serde(default, alias = "design_system_url")]
    pub design_system_url: Option<String>,

    /// Free-text design guidelines
    #[serde(default, alias = "design_system_text")]
    pub design_system_text: Option<String>,

    #[serde(default, alias = "accessibility_level")]
    pub accessibility_level: Option<WcagLevel>,

    #[serde(default, alias = "custom_rules")]
    pub custom_rules: Vec<RuleSpec>,
}

impl TeamConfig {
    /// Check a config before it is saved
    pub fn validate(&self) -> Result<()> {
        let url = self.design_system_url.as_deref().filter(|u| !u.is_empty());
        let text = self.design_system_text.as_deref().filter(|t| !t.is_empty());

        if url.is_none() && text.is_none() {
            return Err(Error::InvalidRequest(
                "Either designSystemUrl or designSystemText is required".to_string(),
            ));
        }
        if let Some(url) = url {
            validate_design_system_url(url)?;
        }
        Ok(())
    }

    pub fn has_custom_rules(&self) -> bool {
        !self.custom_rules.is_empty()
    }
}

/// One row of audit history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditHistoryEntry {
    pub user_id: Option<String>,
    pub team_id: Option<String>,
    pub audit_type: String,
    pub issues_found: usize,
    pub created_at: DateTime<Utc>,
}
