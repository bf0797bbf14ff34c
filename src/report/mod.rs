// SPDX-License-Identifier: PMPL-1.0-or-later
//! Report generation for audit results.
//!
//! Supports multiple output formats:
//! - Text: issues grouped by severity with WCAG references
//! - JSON: the audit envelopes as returned by the HTTP API
//! - SARIF: Static Analysis Results Interchange Format for IDE/CI integration

use serde::Serialize;

use crate::issue::{Issue, Severity, Summary};
use crate::scanner::FrameAudit;

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// Structured JSON
    Json,
    /// SARIF for IDE/CI integration
    Sarif,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Sarif => write!(f, "sarif"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "sarif" => Ok(OutputFormat::Sarif),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

/// Generate a report for audited frames
pub fn generate_report(audits: &[FrameAudit], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => generate_text_report(audits),
        OutputFormat::Json => generate_json_report(audits),
        OutputFormat::Sarif => generate_sarif_report(audits),
    }
}

/// True when any frame has an error-severity issue
pub fn has_errors(audits: &[FrameAudit]) -> bool {
    audits
        .iter()
        .flat_map(|a| a.envelope.results.issues())
        .any(|i| i.severity.is_blocking())
}

fn generate_text_report(audits: &[FrameAudit]) -> String {
    let mut output = String::new();

    output.push_str("=== Design Audit Report ===\n\n");

    if audits.is_empty() {
        output.push_str("No frames found.\n");
        return output;
    }

    for audit in audits {
        let issues = audit.envelope.results.issues();
        let summary = Summary::from_issues(issues);

        output.push_str(&format!(
            "Frame: {} ({} audit)\n",
            audit.path.display(),
            audit.envelope.audit_type
        ));

        if issues.is_empty() {
            output.push_str("  No issues found. All checks passed.\n\n");
            continue;
        }

        output.push_str(&format!(
            "Found {} issue(s): {} error(s), {} warning(s), {} info\n\n",
            summary.total, summary.errors, summary.warnings, summary.info
        ));

        for severity in &[Severity::Error, Severity::Warning, Severity::Info] {
            let group: Vec<&Issue> = issues.iter().filter(|i| i.severity == *severity).collect();
            if group.is_empty() {
                continue;
            }

            output.push_str(&format!("--- {} ({}) ---\n", severity, group.len()));
            for issue in group {
                output.push_str(&format!("[{}] {}: {}\n", issue.issue_type, issue.element, issue.message));
                if let Some(ref position) = issue.position {
                    output.push_str(&format!("  Position: ({}, {})\n", position.x, position.y));
                }
                if let Some(ref criterion) = issue.wcag_criterion {
                    output.push_str(&format!("  WCAG: {}\n", criterion));
                }
                if !issue.suggestion.is_empty() {
                    output.push_str(&format!("  Fix: {}\n", issue.suggestion));
                }
                output.push('\n');
            }
        }
    }

    if has_errors(audits) {
        output.push_str("RESULT: FAIL (errors found)\n");
    } else if audits.iter().any(|a| !a.envelope.results.issues().is_empty()) {
        output.push_str("RESULT: PASS WITH WARNINGS\n");
    } else {
        output.push_str("RESULT: PASS\n");
    }

    output
}

/// JSON report: one envelope per frame, keyed by file
fn generate_json_report(audits: &[FrameAudit]) -> String {
    let frames: Vec<serde_json::Value> = audits
        .iter()
        .map(|a| {
            serde_json::json!({
                "file": a.path.display().to_string(),
                "audit": a.envelope,
            })
        })
        .collect();

    serde_json::to_string_pretty(&serde_json::json!({ "frames": frames }))
        .unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize report: {}\"}}", e))
}

#[derive(Debug, Serialize)]
struct SarifReport {
    #[serde(rename = "$schema")]
    schema: String,
    version: String,
    runs: Vec<SarifRun>,
}

#[derive(Debug, Serialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Debug, Serialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Debug, Serialize)]
struct SarifDriver {
    name: String,
    version: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifResult {
    rule_id: String,
    level: &'static str,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
}

#[derive(Debug, Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifLocation {
    physical_location: SarifPhysicalLocation,
    logical_locations: Vec<SarifLogicalLocation>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifPhysicalLocation {
    artifact_location: SarifArtifactLocation,
}

#[derive(Debug, Serialize)]
struct SarifArtifactLocation {
    uri: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifLogicalLocation {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fully_qualified_name: Option<String>,
    kind: &'static str,
}

fn sarif_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "note",
    }
}

fn generate_sarif_report(audits: &[FrameAudit]) -> String {
    let results: Vec<SarifResult> = audits
        .iter()
        .flat_map(|audit| {
            let uri = audit.path.display().to_string();
            audit.envelope.results.issues().iter().map(move |issue| {
                let text = match issue.wcag_criterion {
                    Some(ref criterion) => format!("{} (WCAG {})", issue.message, criterion),
                    None => issue.message.clone(),
                };
                SarifResult {
                    rule_id: issue.issue_type.to_string(),
                    level: sarif_level(issue.severity),
                    message: SarifMessage { text },
                    locations: vec![SarifLocation {
                        physical_location: SarifPhysicalLocation {
                            artifact_location: SarifArtifactLocation { uri: uri.clone() },
                        },
                        logical_locations: vec![SarifLogicalLocation {
                            name: issue.element.clone(),
                            fully_qualified_name: issue.element_id.clone(),
                            kind: "element",
                        }],
                    }],
                }
            })
        })
        .collect();

    let report = SarifReport {
        schema: "https://json.schemastore.org/sarif-2.1.0.json".to_string(),
        version: "2.1.0".to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: "auditbot".to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                },
            },
            results,
        }],
    };

    serde_json::to_string_pretty(&report)
        .unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize SARIF report: {}\"}}", e))
}
