// SPDX-License-Identifier: PMPL-1.0-or-later
//! Audit findings and their aggregate summary.
//!
//! Issues are value objects: a check builds one, pushes it onto an ordered
//! list, and nothing mutates it afterwards. [`Summary`] is always derived
//! from the current list, never stored alongside it.

use crate::node::ElementNode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Severity levels for issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Must be fixed for conformance
    Error,
    /// Should be addressed
    Warning,
    /// Informational
    Info,
}

impl Severity {
    /// Whether this severity fails an audit run
    pub fn is_blocking(&self) -> bool {
        matches!(self, Severity::Error)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Info => write!(f, "INFO"),
        }
    }
}

/// WCAG conformance level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum WcagLevel {
    /// Level A - minimum conformance
    A,
    /// Level AA - standard conformance
    #[default]
    AA,
    /// Level AAA - enhanced conformance
    AAA,
}

impl std::fmt::Display for WcagLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WcagLevel::A => write!(f, "A"),
            WcagLevel::AA => write!(f, "AA"),
            WcagLevel::AAA => write!(f, "AAA"),
        }
    }
}

impl FromStr for WcagLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(WcagLevel::A),
            "AA" => Ok(WcagLevel::AA),
            "AAA" => Ok(WcagLevel::AAA),
            other => Err(format!("Invalid accessibility level: {}. Use: A, AA, or AAA", other)),
        }
    }
}

impl TryFrom<String> for WcagLevel {
    type Error = String;

    fn try_from(level: String) -> Result<Self, Self::Error> {
        level.parse()
    }
}

/// Issue category.
///
/// Custom rules may declare their own type tag, carried as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IssueType {
    Contrast,
    TextSize,
    TouchTarget,
    AltText,
    Visibility,
    DesignSystem,
    Custom,
    Configuration,
    Error,
    Other(String),
}

impl IssueType {
    pub fn as_str(&self) -> &str {
        match self {
            IssueType::Contrast => "contrast",
            IssueType::TextSize => "text-size",
            IssueType::TouchTarget => "touch-target",
            IssueType::AltText => "alt-text",
            IssueType::Visibility => "visibility",
            IssueType::DesignSystem => "design-system",
            IssueType::Custom => "custom",
            IssueType::Configuration => "configuration",
            IssueType::Error => "error",
            IssueType::Other(tag) => tag,
        }
    }
}

impl From<String> for IssueType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "contrast" => IssueType::Contrast,
            "text-size" => IssueType::TextSize,
            "touch-target" => IssueType::TouchTarget,
            "alt-text" => IssueType::AltText,
            "visibility" => IssueType::Visibility,
            "design-system" => IssueType::DesignSystem,
            "custom" => IssueType::Custom,
            "configuration" => IssueType::Configuration,
            "error" => IssueType::Error,
            _ => IssueType::Other(tag),
        }
    }
}

impl From<IssueType> for String {
    fn from(kind: IssueType) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for IssueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canvas position of the element that triggered an issue
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A single audit finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub severity: Severity,
    /// Display name of the offending element
    pub element: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_id: Option<String>,
    pub message: String,
    #[serde(default)]
    pub suggestion: String,
    /// WCAG success criterion, e.g. "1.4.3"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wcag_criterion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl Issue {
    /// Create an issue not yet attached to an element
    pub fn new(issue_type: IssueType, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            issue_type,
            severity,
            element: String::new(),
            element_id: None,
            message: message.into(),
            suggestion: String::new(),
            wcag_criterion: None,
            position: None,
        }
    }

    /// Attach the triggering element's name, id and position
    pub fn for_element(mut self, node: &ElementNode) -> Self {
        self.element = node.name.clone();
        self.element_id = Some(node.id.clone());
        self.position = Some(Position { x: node.x, y: node.y });
        self
    }

    /// Attribute the issue to a synthetic element such as "system"
    pub fn for_system(mut self, element: &str) -> Self {
        self.element = element.to_string();
        self
    }

    pub fn with_wcag(mut self, criterion: &str) -> Self {
        self.wcag_criterion = Some(criterion.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = suggestion.into();
        self
    }
}

/// Counts derived from an issue list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
    pub by_type: BTreeMap<String, usize>,
}

impl Summary {
    /// Recompute the summary for an issue list
    pub fn from_issues(issues: &[Issue]) -> Self {
        let mut summary = Summary {
            total: issues.len(),
            ..Summary::default()
        };

        for issue in issues {
            match issue.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
                Severity::Info => summary.info += 1,
            }
            *summary.by_type.entry(issue.issue_type.to_string()).or_insert(0) += 1;
        }

        summary
    }

    /// Check if any issue would fail the audit
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}
