// SPDX-License-Identifier: PMPL-1.0-or-later
//! Touch target analyzer - WCAG 2.5.5 Target Size
//!
//! Interactive elements must be at least 44x44px. An element counts as
//! interactive if its type is BUTTON/COMPONENT/INSTANCE or its name
//! mentions a button, link or input.

use crate::analyzers::Analyzer;
use crate::issue::{Issue, IssueType, Severity, WcagLevel};
use crate::node::ElementNode;

const MIN_TARGET_SIZE: f64 = 44.0;

/// Name fragments that mark an element as interactive
const INTERACTIVE_NAME_HINTS: &[&str] = &["button", "link", "input"];

/// Analyzer for interactive element sizes
pub struct TouchTargetAnalyzer;

fn is_interactive(node: &ElementNode) -> bool {
    if node.node_type.is_interactive() {
        return true;
    }
    let name = node.name.to_lowercase();
    INTERACTIVE_NAME_HINTS.iter().any(|hint| name.contains(hint))
}

impl Analyzer for TouchTargetAnalyzer {
    fn name(&self) -> &str {
        "Touch Target Analyzer"
    }

    fn description(&self) -> &str {
        "Checks interactive elements are at least 44x44px (WCAG 2.5.5)"
    }

    fn analyze_node(&self, node: &ElementNode, _level: WcagLevel) -> Vec<Issue> {
        if !is_interactive(node) {
            return Vec::new();
        }

        if node.width >= MIN_TARGET_SIZE && node.height >= MIN_TARGET_SIZE {
            return Vec::new();
        }

        vec![Issue::new(
            IssueType::TouchTarget,
            Severity::Error,
            format!(
                "Touch target too small: {}x{}px (minimum: 44x44px)",
                node.width.round(),
                node.height.round()
            ),
        )
        .for_element(node)
        .with_wcag("2.5.5")
        .with_suggestion("Increase size to at least 44x44px for mobile accessibility")]
    }
}
