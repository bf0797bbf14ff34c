// SPDX-License-Identifier: PMPL-1.0-or-later
//! Caller-supplied rules.
//!
//! A [`CustomRule`] wraps a check that returns `Ok(true)` when the element
//! passes and `Ok(false)` on a violation. A check that errors is logged and
//! skipped; it never aborts the remaining rules.
//!
//! Rules arriving over JSON (audit requests, team configs) are described by
//! a [`RuleSpec`] holding a declarative [`RuleCondition`]:
//!
//! ```json
//! { "type": "brand-size", "severity": "warning",
//!   "message": "Buttons must be at least 48px tall",
//!   "appliesTo": ["INSTANCE"], "condition": { "minHeight": 48 } }
//! ```

use crate::issue::{Issue, IssueType, Severity, WcagLevel};
use crate::node::{ElementNode, NodeType};
use regex::Regex;
use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Failure inside a custom check
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct RuleError(pub String);

type RuleCheck = Box<dyn Fn(&ElementNode) -> Result<bool, RuleError> + Send + Sync>;

/// A custom predicate plus the issue it reports when it fails
pub struct CustomRule {
    pub issue_type: IssueType,
    pub severity: Severity,
    pub message: String,
    pub suggestion: String,
    pub wcag_criterion: String,
    check: RuleCheck,
}

impl std::fmt::Debug for CustomRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomRule")
            .field("issue_type", &self.issue_type)
            .field("severity", &self.severity)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl CustomRule {
    /// Create a rule with the default type, severity and message
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(&ElementNode) -> Result<bool, RuleError> + Send + Sync + 'static,
    {
        Self {
            issue_type: IssueType::Custom,
            severity: Severity::Info,
            message: "Custom rule failed".to_string(),
            suggestion: String::new(),
            wcag_criterion: "custom".to_string(),
            check: Box::new(check),
        }
    }

    pub fn with_type(mut self, issue_type: IssueType) -> Self {
        self.issue_type = issue_type;
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = suggestion.into();
        self
    }

    pub fn with_wcag(mut self, criterion: impl Into<String>) -> Self {
        self.wcag_criterion = criterion.into();
        self
    }

    /// Run the check against a node
    pub fn evaluate(&self, node: &ElementNode) -> Result<bool, RuleError> {
        (self.check)(node)
    }

    fn issue_for(&self, node: &ElementNode) -> Issue {
        Issue::new(self.issue_type.clone(), self.severity, self.message.clone())
            .for_element(node)
            .with_wcag(&self.wcag_criterion)
            .with_suggestion(self.suggestion.clone())
    }
}

/// Evaluate each rule against one node, in order
pub fn run_custom_rules(node: &ElementNode, rules: &[CustomRule]) -> Vec<Issue> {
    let mut issues = Vec::new();

    for rule in rules {
        match rule.evaluate(node) {
            Ok(true) => {}
            Ok(false) => issues.push(rule.issue_for(node)),
            Err(e) => {
                error!(
                    "Error running custom rule '{}' on {}: {}",
                    rule.issue_type, node.name, e
                );
            }
        }
    }

    issues
}

/// Declarative predicate for rules supplied as data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleCondition {
    #[serde(alias = "min_width")]
    MinWidth(f64),
    #[serde(alias = "min_height")]
    MinHeight(f64),
    #[serde(alias = "max_width")]
    MaxWidth(f64),
    #[serde(alias = "max_height")]
    MaxHeight(f64),
    /// Only constrains nodes that carry a font size
    #[serde(alias = "min_font_size")]
    MinFontSize(f64),
    /// Unspecified opacity counts as fully opaque
    #[serde(alias = "min_opacity")]
    MinOpacity(f64),
    /// Regex the layer name must match
    #[serde(alias = "name_pattern")]
    NamePattern(String),
    #[serde(alias = "require_description")]
    RequireDescription,
    #[serde(alias = "allowed_types")]
    AllowedTypes(Vec<NodeType>),
}

impl RuleCondition {
    /// Build the check closure, compiling any pattern once up front
    fn into_check(self) -> RuleCheck {
        match self {
            RuleCondition::MinWidth(v) => Box::new(move |n: &ElementNode| Ok(n.width >= v)),
            RuleCondition::MinHeight(v) => Box::new(move |n: &ElementNode| Ok(n.height >= v)),
            RuleCondition::MaxWidth(v) => Box::new(move |n: &ElementNode| Ok(n.width <= v)),
            RuleCondition::MaxHeight(v) => Box::new(move |n: &ElementNode| Ok(n.height <= v)),
            RuleCondition::MinFontSize(v) => {
                Box::new(move |n: &ElementNode| {
                    Ok(n.text.font_size.map_or(true, |size| size >= v))
                })
            }
            RuleCondition::MinOpacity(v) => {
                Box::new(move |n: &ElementNode| Ok(n.opacity.unwrap_or(1.0) >= v))
            }
            RuleCondition::NamePattern(pattern) => {
                let compiled = Regex::new(&pattern)
                    .map_err(|e| RuleError(format!("invalid name pattern '{}': {}", pattern, e)));
                Box::new(move |n: &ElementNode| match &compiled {
                    Ok(re) => Ok(re.is_match(&n.name)),
                    Err(e) => Err(e.clone()),
                })
            }
            RuleCondition::RequireDescription => {
                Box::new(|n: &ElementNode| Ok(n.description_text().is_some()))
            }
            RuleCondition::AllowedTypes(types) => {
                Box::new(move |n: &ElementNode| Ok(types.contains(&n.node_type)))
            }
        }
    }
}

/// Rule as it arrives over JSON.
///
/// An entry with `type: "wcagLevel"` is not a check; its `value` selects the
/// WCAG level for the audit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSpec {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub rule_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(default, alias = "wcag_criterion", skip_serializing_if = "Option::is_none")]
    pub wcag_criterion: Option<String>,
    /// Restrict the rule to these node types; empty means every node
    #[serde(default, alias = "applies_to", skip_serializing_if = "Vec::is_empty")]
    pub applies_to: Vec<NodeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<RuleCondition>,
    /// Scalar payload; lists and objects are skipped and read as absent
    #[serde(default, deserialize_with = "scalar_text", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    deserializer.deserialize_any(ScalarText)
}

struct ScalarText;

impl<'de> Visitor<'de> for ScalarText {
    type Value = Option<String>;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a rule value")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: serde::Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(ScalarText)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(None)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(None)
    }
}

impl RuleSpec {
    /// WCAG level selected by a `wcagLevel` entry
    pub fn wcag_level(&self) -> Option<WcagLevel> {
        if self.rule_type.as_deref() != Some("wcagLevel") {
            return None;
        }
        self.value.as_deref()?.parse().ok()
    }

    /// Turn the declaration into a runnable rule; `None` for entries with no condition
    pub fn into_custom_rule(self) -> Option<CustomRule> {
        if self.rule_type.as_deref() == Some("wcagLevel") {
            return None;
        }
        let condition = self.condition?;
        let inner = condition.into_check();
        let applies_to = self.applies_to;
        let check = move |n: &ElementNode| {
            if !applies_to.is_empty() && !applies_to.contains(&n.node_type) {
                return Ok(true);
            }
            inner(n)
        };

        let mut rule = CustomRule::new(check);
        if let Some(kind) = self.rule_type {
            rule = rule.with_type(IssueType::from(kind));
        }
        if let Some(severity) = self.severity {
            rule = rule.with_severity(severity);
        }
        if let Some(message) = self.message {
            rule = rule.with_message(message);
        }
        if let Some(suggestion) = self.suggestion {
            rule = rule.with_suggestion(suggestion);
        }
        if let Some(criterion) = self.wcag_criterion {
            rule = rule.with_wcag(criterion);
        }
        Some(rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> ElementNode {
        ElementNode::new("7:1", "Primary CTA", NodeType::Instance).with_size(120.0, 40.0)
    }

    #[test]
    fn test_passing_rule_contributes_nothing() {
        let rules = vec![CustomRule::new(|_| Ok(true))];
        assert!(run_custom_rules(&node(), &rules).is_empty());
    }

    #[test]
    fn test_failing_rule_uses_declared_fields() {
        let rules = vec![CustomRule::new(|n| Ok(n.height >= 48.0))
            .with_type(IssueType::Other("brand-size".into()))
            .with_severity(Severity::Warning)
            .with_message("CTA must be 48px tall")
            .with_suggestion("Use the large button variant")
            .with_wcag("2.5.8")];
        let issues = run_custom_rules(&node(), &rules);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].issue_type.as_str(), "brand-size");
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[0].message, "CTA must be 48px tall");
        assert_eq!(issues[0].wcag_criterion.as_deref(), Some("2.5.8"));
        assert_eq!(issues[0].element_id.as_deref(), Some("7:1"));
    }

    #[test]
    fn test_defaults() {
        let issues = run_custom_rules(&node(), &[CustomRule::new(|_| Ok(false))]);
        assert_eq!(issues[0].issue_type, IssueType::Custom);
        assert_eq!(issues[0].severity, Severity::Info);
        assert_eq!(issues[0].message, "Custom rule failed");
        assert_eq!(issues[0].suggestion, "");
        assert_eq!(issues[0].wcag_criterion.as_deref(), Some("custom"));
    }

    #[test]
    fn test_erroring_rule_is_skipped() {
        let rules = vec![
            CustomRule::new(|_| Err(RuleError("boom".into()))),
            CustomRule::new(|_| Ok(false)).with_message("still runs"),
        ];
        let issues = run_custom_rules(&node(), &rules);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "still runs");
    }

    #[test]
    fn test_spec_from_json() {
        let json = r#"{
            "type": "brand-size", "severity": "warning",
            "message": "Buttons must be at least 48px tall",
            "appliesTo": ["INSTANCE"], "condition": {"minHeight": 48}
        }"#;
        let spec: RuleSpec = serde_json::from_str(json).expect("valid");
        let rule = spec.into_custom_rule().expect("has condition");
        assert_eq!(rule.evaluate(&node()), Ok(false));

        let frame = ElementNode::new("7:2", "Hero", NodeType::Frame).with_size(10.0, 10.0);
        assert_eq!(rule.evaluate(&frame), Ok(true), "rule scoped to INSTANCE");
    }

    #[test]
    fn test_name_pattern_and_bad_regex() {
        let spec = RuleSpec {
            condition: Some(RuleCondition::NamePattern("^(Primary|Secondary) ".into())),
            ..RuleSpec::default()
        };
        assert_eq!(spec.into_custom_rule().unwrap().evaluate(&node()), Ok(true));

        let bad = RuleSpec {
            condition: Some(RuleCondition::NamePattern("(".into())),
            ..RuleSpec::default()
        };
        let rule = bad.into_custom_rule().unwrap();
        assert!(rule.evaluate(&node()).is_err());
        assert!(run_custom_rules(&node(), &[rule]).is_empty());
    }

    #[test]
    fn test_unit_conditions_from_json() {
        let spec: RuleSpec =
            serde_json::from_str(r#"{"condition": "requireDescription"}"#).expect("valid");
        assert_eq!(spec.condition, Some(RuleCondition::RequireDescription));
        let rule = spec.into_custom_rule().unwrap();
        assert_eq!(rule.evaluate(&node()), Ok(false));
    }

    #[test]
    fn test_wcag_level_entry() {
        let spec: RuleSpec =
            serde_json::from_str(r#"{"type": "wcagLevel", "value": "AAA"}"#).expect("valid");
        assert_eq!(spec.wcag_level(), Some(WcagLevel::AAA));
        assert!(spec.into_custom_rule().is_none());
    }

    #[test]
    fn test_non_scalar_value_reads_as_absent() {
        let spec: RuleSpec =
            serde_json::from_str(r#"{"type": "wcagLevel", "value": {"level": ["AAA"]}}"#).expect("valid");
        assert!(spec.value.is_none());
        assert_eq!(spec.wcag_level(), None);

        let spec: RuleSpec = serde_json::from_str(r#"{"type": "wcagLevel", "value": null}"#).expect("valid");
        assert!(spec.value.is_none());
    }
}
