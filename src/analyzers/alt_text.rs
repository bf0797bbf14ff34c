// SPDX-License-Identifier: PMPL-1.0-or-later
//! Image alt text analyzer - WCAG 1.1.1 Non-text Content (Level A)
//!
//! In Figma the alternative text of an image layer lives in its description
//! or in a meaningful layer name. Default names like "Rectangle 12" or
//! "Image 3" do not count.

use crate::analyzers::Analyzer;
use crate::issue::{Issue, IssueType, Severity, WcagLevel};
use crate::node::{ElementNode, NodeType};

/// Layer name prefixes Figma assigns automatically
const DEFAULT_NAME_PREFIXES: &[&str] = &["Rectangle", "Image"];

/// Analyzer for image alt text
pub struct AltTextAnalyzer;

fn has_alt_text(node: &ElementNode) -> bool {
    if node.description_text().is_some() {
        return true;
    }
    !node.name.is_empty()
        && !DEFAULT_NAME_PREFIXES
            .iter()
            .any(|prefix| node.name.starts_with(prefix))
}

impl Analyzer for AltTextAnalyzer {
    fn name(&self) -> &str {
        "Alt Text Analyzer"
    }

    fn description(&self) -> &str {
        "Checks image layers carry descriptive text (WCAG 1.1.1)"
    }

    fn analyze_node(&self, node: &ElementNode, _level: WcagLevel) -> Vec<Issue> {
        let is_image = node.node_type == NodeType::Rectangle && node.has_image_fill();
        if !is_image || has_alt_text(node) {
            return Vec::new();
        }

        vec![Issue::new(IssueType::AltText, Severity::Error, "Image missing alt text")
            .for_element(node)
            .with_wcag("1.1.1")
            .with_suggestion(
                "Add descriptive text in the element name or description for screen readers",
            )]
    }
}
