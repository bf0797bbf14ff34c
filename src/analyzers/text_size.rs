// SPDX-License-Identifier: PMPL-1.0-or-later
//! Text size analyzer - WCAG 1.4.4 Resize Text
//!
//! 14px is the absolute minimum; body copy should be 16px.

use crate::analyzers::Analyzer;
use crate::issue::{Issue, IssueType, Severity, WcagLevel};
use crate::node::ElementNode;

/// Absolute minimum font size
const MIN_FONT_SIZE: f64 = 14.0;

/// Recommended body text size
const BODY_FONT_SIZE: f64 = 16.0;

/// Analyzer for readable font sizes on TEXT nodes
pub struct TextSizeAnalyzer;

impl Analyzer for TextSizeAnalyzer {
    fn name(&self) -> &str {
        "Text Size Analyzer"
    }

    fn description(&self) -> &str {
        "Checks TEXT nodes use a readable font size (WCAG 1.4.4)"
    }

    fn analyze_node(&self, node: &ElementNode, _level: WcagLevel) -> Vec<Issue> {
        if !node.is_text() {
            return Vec::new();
        }
        let Some(font_size) = node.text.font_size else {
            return Vec::new();
        };

        if font_size < MIN_FONT_SIZE {
            vec![Issue::new(
                IssueType::TextSize,
                Severity::Warning,
                format!("Text size too small: {}px (minimum: 14px)", font_size),
            )
            .for_element(node)
            .with_wcag("1.4.4")
            .with_suggestion("Increase font size to at least 14px, ideally 16px for body text")]
        } else if font_size < BODY_FONT_SIZE && node.text.text_type.as_deref() == Some("body") {
            vec![Issue::new(
                IssueType::TextSize,
                Severity::Info,
                format!("Body text could be larger: {}px (recommended: 16px)", font_size),
            )
            .for_element(node)
            .with_wcag("1.4.4")
            .with_suggestion("Consider using 16px for better readability")]
        } else {
            Vec::new()
        }
    }
}
