// SPDX-License-Identifier: PMPL-1.0-or-later
//! Accessibility analyzers implementing WCAG 2.1 checks.
//!
//! Each analyzer inspects a single element node and returns zero or more
//! issues. Analyzers never recurse into children; the tree walker in
//! [`crate::audit`] does that.

pub mod alt_text;
pub mod contrast;
pub mod custom;
pub mod text_size;
pub mod touch_target;
pub mod visibility;

use crate::issue::{Issue, WcagLevel};
use crate::node::ElementNode;

pub use custom::{CustomRule, RuleCondition, RuleError, RuleSpec};

/// Trait implemented by all analyzers
pub trait Analyzer: Send + Sync {
    /// Human-readable name of this analyzer
    fn name(&self) -> &str;

    /// Short description of what this analyzer checks
    fn description(&self) -> &str;

    /// Analyze a single element and return issues
    fn analyze_node(&self, node: &ElementNode, level: WcagLevel) -> Vec<Issue>;
}

/// Standard checks, in the order their issues are reported
pub static STANDARD_ANALYZERS: &[&dyn Analyzer] = &[
    &contrast::ContrastAnalyzer,
    &text_size::TextSizeAnalyzer,
    &touch_target::TouchTargetAnalyzer,
    &alt_text::AltTextAnalyzer,
    &visibility::VisibilityAnalyzer,
];

/// Run every standard check and then the custom rules against one element
pub fn audit_element(node: &ElementNode, level: WcagLevel, custom_rules: &[CustomRule]) -> Vec<Issue> {
    let mut issues = Vec::new();

    for analyzer in STANDARD_ANALYZERS {
        issues.extend(analyzer.analyze_node(node, level));
    }

    if !custom_rules.is_empty() {
        issues.extend(custom::run_custom_rules(node, custom_rules));
    }

    issues
}
