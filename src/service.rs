// SPDX-License-Identifier: PMPL-1.0-or-later
//! Audit orchestration.
//!
//! [`AuditService`] validates a request, resolves the team's configuration,
//! runs the requested audits and records the outcome in the audit history.
//! Collaborator failures downgrade the design-system result instead of
//! failing the request; only malformed requests are rejected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::analysis::{OpenAiAnalyzer, TextAnalyzer};
use crate::analyzers::{CustomRule, RuleSpec};
use crate::audit::{perform_accessibility_audit, AccessibilityReport, AuditOptions};
use crate::config::{AuditConfig, Config};
use crate::design_system::consistency::analyze_consistency;
use crate::design_system::{
    CachingFetcher, CatalogFetcher, DesignSystem, HttpCatalogFetcher, InMemoryCatalogCache,
};
use crate::error::{Error, Result};
use crate::issue::{Issue, IssueType, Severity, Summary, WcagLevel};
use crate::node::ElementNode;
use crate::store::models::{AuditHistoryEntry, TeamConfig};
use crate::store::{AuditHistory, InMemoryTeamConfigStore, TeamConfigStore, TracingAuditHistory};

/// Which audits to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuditType {
    Accessibility,
    DesignSystem,
    Both,
}

impl AuditType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditType::Accessibility => "accessibility",
            AuditType::DesignSystem => "design-system",
            AuditType::Both => "both",
        }
    }
}

impl FromStr for AuditType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "accessibility" => Ok(AuditType::Accessibility),
            "design-system" => Ok(AuditType::DesignSystem),
            "both" => Ok(AuditType::Both),
            _ => Err(Error::InvalidRequest(
                "Invalid audit type. Use: accessibility, design-system, or both".to_string(),
            )),
        }
    }
}

impl std::fmt::Display for AuditType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Incoming audit request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRequest {
    #[serde(default)]
    pub audit_type: Option<String>,
    #[serde(default)]
    pub frame_data: Option<ElementNode>,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty_rules")]
    pub custom_rules: Vec<RuleSpec>,
    #[serde(default)]
    pub wcag_level: Option<WcagLevel>,
}

fn null_as_empty_rules<'de, D>(deserializer: D) -> std::result::Result<Vec<RuleSpec>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<RuleSpec>>::deserialize(deserializer)?.unwrap_or_default())
}

impl AuditRequest {
    /// Check required fields before any auditing begins
    pub fn validate(&self) -> Result<(AuditType, &ElementNode)> {
        let (Some(audit_type), Some(frame)) = (
            self.audit_type.as_deref().filter(|t| !t.is_empty()),
            self.frame_data.as_ref(),
        ) else {
            return Err(Error::InvalidRequest(
                "Missing required fields: auditType, frameData".to_string(),
            ));
        };
        Ok((audit_type.parse()?, frame))
    }
}

/// Catalog facts reported with a design-system audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogInfo {
    pub name: String,
    pub version: String,
    pub component_count: usize,
}

impl From<&DesignSystem> for CatalogInfo {
    fn from(system: &DesignSystem) -> Self {
        Self {
            name: system.name.clone(),
            version: system.version.clone(),
            component_count: system.components.len(),
        }
    }
}

/// Team configuration facts reported with a design-system audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInfo {
    pub url: Option<String>,
    pub has_custom_rules: bool,
}

/// Result of a design-system audit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignSystemReport {
    pub issues: Vec<Issue>,
    pub summary: Summary,
    pub design_system: Option<CatalogInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ConfigInfo>,
    pub audit_time: DateTime<Utc>,
}

impl DesignSystemReport {
    /// Report holding a single synthetic issue
    fn single(issue: Issue) -> Self {
        let issues = vec![issue];
        Self {
            summary: Summary::from_issues(&issues),
            issues,
            design_system: None,
            config: None,
            audit_time: Utc::now(),
        }
    }

    fn not_configured() -> Self {
        Self::single(
            Issue::new(
                IssueType::Configuration,
                Severity::Warning,
                "No design system configuration found",
            )
            .for_system("system")
            .with_suggestion("Please configure your design system URL or guidelines first"),
        )
    }

    fn failed() -> Self {
        Self::single(
            Issue::new(IssueType::Error, Severity::Error, "Design system audit failed")
                .for_system("system")
                .with_suggestion("Please check your design system configuration"),
        )
    }
}

/// Both audits plus their concatenated issues
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedResults {
    pub accessibility: AccessibilityReport,
    pub design_system: DesignSystemReport,
    pub combined: Vec<Issue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuditResults {
    Both(CombinedResults),
    Accessibility(AccessibilityReport),
    DesignSystem(DesignSystemReport),
}

impl AuditResults {
    /// All issues, in report order
    pub fn issues(&self) -> &[Issue] {
        match self {
            AuditResults::Accessibility(report) => &report.issues,
            AuditResults::DesignSystem(report) => &report.issues,
            AuditResults::Both(results) => &results.combined,
        }
    }
}

/// Response body for a completed audit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEnvelope {
    pub success: bool,
    pub audit_type: AuditType,
    pub audit_id: Uuid,
    pub results: AuditResults,
    pub timestamp: DateTime<Utc>,
}

/// Runs audits against injected collaborators
#[derive(Clone)]
pub struct AuditService {
    store: Arc<dyn TeamConfigStore>,
    fetcher: Arc<dyn CatalogFetcher>,
    analyzer: Arc<dyn TextAnalyzer>,
    history: Arc<dyn AuditHistory>,
    defaults: AuditConfig,
}

impl AuditService {
    pub fn new(
        store: Arc<dyn TeamConfigStore>,
        fetcher: Arc<dyn CatalogFetcher>,
        analyzer: Arc<dyn TextAnalyzer>,
        history: Arc<dyn AuditHistory>,
    ) -> Self {
        Self {
            store,
            fetcher,
            analyzer,
            history,
            defaults: AuditConfig::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: AuditConfig) -> Self {
        self.defaults = defaults;
        self
    }

    /// Wire the HTTP collaborators and in-memory stores from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = Arc::new(HttpCatalogFetcher::new(&config.design_system)?);
        let fetcher = CachingFetcher::new(
            http,
            Arc::new(InMemoryCatalogCache::default()),
            config.design_system.cache_ttl_secs,
        );

        Ok(Self::new(
            Arc::new(InMemoryTeamConfigStore::new(config.teams.clone())),
            Arc::new(fetcher),
            Arc::new(OpenAiAnalyzer::new(&config.analysis)?),
            Arc::new(TracingAuditHistory),
        )
        .with_defaults(config.audit.clone()))
    }

    pub fn store(&self) -> &Arc<dyn TeamConfigStore> {
        &self.store
    }

    /// Deepest tree level kept when parsing and auditing frames
    pub fn max_depth(&self) -> usize {
        self.defaults.max_depth
    }

    /// Validate and run an audit request
    pub async fn run(&self, request: &AuditRequest) -> Result<AuditEnvelope> {
        let (audit_type, frame) = request.validate()?;
        info!(
            "Starting {} audit for team {}",
            audit_type,
            request.team_id.as_deref().unwrap_or("-")
        );

        let team = match request.team_id.as_deref() {
            Some(team_id) => self.store.get(team_id).await,
            None => Ok(None),
        };

        let results = match audit_type {
            AuditType::Accessibility => {
                AuditResults::Accessibility(self.accessibility_audit(frame, request, &team))
            }
            AuditType::DesignSystem => {
                AuditResults::DesignSystem(self.design_system_audit(frame, &team).await)
            }
            AuditType::Both => {
                let (accessibility, design_system) = tokio::join!(
                    async { self.accessibility_audit(frame, request, &team) },
                    self.design_system_audit(frame, &team)
                );
                let combined = accessibility
                    .issues
                    .iter()
                    .chain(design_system.issues.iter())
                    .cloned()
                    .collect();
                AuditResults::Both(CombinedResults {
                    accessibility,
                    design_system,
                    combined,
                })
            }
        };

        self.log_audit(request, audit_type, results.issues().len()).await;

        Ok(AuditEnvelope {
            success: true,
            audit_type,
            audit_id: Uuid::new_v4(),
            results,
            timestamp: Utc::now(),
        })
    }

    /// Level precedence: request, a `wcagLevel` rule entry, team config, default
    pub fn resolve_level(&self, request: &AuditRequest, team: Option<&TeamConfig>) -> WcagLevel {
        request
            .wcag_level
            .or_else(|| request.custom_rules.iter().find_map(RuleSpec::wcag_level))
            .or_else(|| team.and_then(|t| t.accessibility_level))
            .unwrap_or(self.defaults.default_level)
    }

    fn accessibility_audit(
        &self,
        frame: &ElementNode,
        request: &AuditRequest,
        team: &Result<Option<TeamConfig>>,
    ) -> AccessibilityReport {
        let team = match team {
            Ok(team) => team.as_ref(),
            Err(e) => {
                warn!("Team config unavailable, auditing without team rules: {}", e);
                None
            }
        };

        let options = AuditOptions {
            level: self.resolve_level(request, team),
            max_depth: self.defaults.max_depth,
        };

        let team_rules = team.map(|t| t.custom_rules.as_slice()).unwrap_or_default();
        let rules: Vec<CustomRule> = request
            .custom_rules
            .iter()
            .chain(team_rules.iter())
            .cloned()
            .filter_map(RuleSpec::into_custom_rule)
            .collect();

        perform_accessibility_audit(frame, &options, &rules)
    }

    async fn design_system_audit(
        &self,
        frame: &ElementNode,
        team: &Result<Option<TeamConfig>>,
    ) -> DesignSystemReport {
        let config = match team {
            Ok(Some(config)) => config,
            Ok(None) => return DesignSystemReport::not_configured(),
            Err(e) => {
                error!("Design system audit error: {}", e);
                return DesignSystemReport::failed();
            }
        };

        let mut catalog = None;
        if let Some(url) = config.design_system_url.as_deref().filter(|u| !u.is_empty()) {
            match self.fetcher.fetch(url).await {
                Ok(system) => catalog = Some(system),
                Err(e) => error!("Failed to fetch design system: {}", e),
            }
        }

        let analysis =
            analyze_consistency(frame, config, catalog.as_ref(), Arc::clone(&self.analyzer)).await;

        DesignSystemReport {
            issues: analysis.issues,
            summary: analysis.summary,
            design_system: catalog.as_ref().map(CatalogInfo::from),
            config: Some(ConfigInfo {
                url: config.design_system_url.clone(),
                has_custom_rules: config.has_custom_rules(),
            }),
            audit_time: Utc::now(),
        }
    }

    async fn log_audit(&self, request: &AuditRequest, audit_type: AuditType, issues_found: usize) {
        let entry = AuditHistoryEntry {
            user_id: request.user_id.clone(),
            team_id: request.team_id.clone(),
            audit_type: audit_type.to_string(),
            issues_found,
            created_at: Utc::now(),
        };
        if let Err(e) = self.history.record(entry).await {
            error!("Error logging audit: {}", e);
        }
    }
}
