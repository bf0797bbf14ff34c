// SPDX-License-Identifier: PMPL-1.0-or-later
//! Visibility analyzer - hidden layers (4.1.2) and near-transparent layers (1.4.3)

use crate::analyzers::Analyzer;
use crate::issue::{Issue, IssueType, Severity, WcagLevel};
use crate::node::ElementNode;

const MIN_OPACITY: f64 = 0.3;

/// Analyzer for hidden and low-opacity elements
pub struct VisibilityAnalyzer;

impl Analyzer for VisibilityAnalyzer {
    fn name(&self) -> &str {
        "Visibility Analyzer"
    }

    fn description(&self) -> &str {
        "Flags hidden and low-opacity elements (WCAG 4.1.2, 1.4.3)"
    }

    fn analyze_node(&self, node: &ElementNode, _level: WcagLevel) -> Vec<Issue> {
        let mut issues = Vec::new();

        if !node.visible {
            issues.push(
                Issue::new(IssueType::Visibility, Severity::Info, "Element is hidden")
                    .for_element(node)
                    .with_wcag("4.1.2")
                    .with_suggestion("Hidden elements are not accessible to screen readers"),
            );
        }

        if let Some(opacity) = node.opacity.filter(|o| *o < MIN_OPACITY) {
            issues.push(
                Issue::new(
                    IssueType::Visibility,
                    Severity::Warning,
                    format!("Low opacity: {}%", (opacity * 100.0).round()),
                )
                .for_element(node)
                .with_wcag("1.4.3")
                .with_suggestion("Very low opacity may cause readability issues"),
            );
        }

        issues
    }
}
