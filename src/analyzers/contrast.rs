// SPDX-License-Identifier: PMPL-1.0-or-later
//! Color contrast analyzer - WCAG 1.4.3 Contrast (Minimum) / 1.4.6 (Enhanced)
//!
//! Compares the first visible solid fill of a node against the first
//! visible solid of its background. Nodes where either color cannot be
//! determined are skipped rather than reported.

use crate::analyzers::Analyzer;
use crate::color::{contrast_ratio, extract_color, is_large_text, required_contrast};
use crate::issue::{Issue, IssueType, Severity, WcagLevel};
use crate::node::ElementNode;

/// Contrast analyzer for text and filled shapes
pub struct ContrastAnalyzer;

impl Analyzer for ContrastAnalyzer {
    fn name(&self) -> &str {
        "Color Contrast Analyzer"
    }

    fn description(&self) -> &str {
        "Checks foreground/background contrast ratios meet WCAG requirements (1.4.3)"
    }

    fn analyze_node(&self, node: &ElementNode, level: WcagLevel) -> Vec<Issue> {
        if !node.is_text() && node.fills.is_empty() {
            return Vec::new();
        }

        let (Some(fg), Some(bg)) = (extract_color(&node.fills), extract_color(&node.background)) else {
            return Vec::new();
        };

        let ratio = contrast_ratio(fg, bg);
        let large = is_large_text(node.text.font_size, node.text.font_weight);
        let required = required_contrast(level, large);

        if ratio >= required {
            return Vec::new();
        }

        vec![Issue::new(
            IssueType::Contrast,
            Severity::Error,
            format!(
                "Low contrast ratio: {:.2}:1 (required: {}:1 for WCAG {})",
                ratio, required, level
            ),
        )
        .for_element(node)
        .with_wcag("1.4.3")
        .with_suggestion(format!(
            "Increase contrast between text and background. Current: {:.2}:1, Required: {}:1",
            ratio, required
        ))]
    }
}
