// SPDX-License-Identifier: PMPL-1.0-or-later
//! Tree walker for accessibility audits.
//!
//! Walks a frame and its descendants depth-first, pre-order, so a node's
//! issues always precede its descendants' and sibling order is preserved.
//! Recursion is bounded by [`AuditOptions::max_depth`]; nodes at the limit
//! are treated as leaves.

use crate::analyzers::{audit_element, CustomRule};
use crate::issue::{Issue, Summary, WcagLevel};
use crate::node::ElementNode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Default recursion bound for caller-supplied trees
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Options for a single tree audit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditOptions {
    pub level: WcagLevel,
    /// Deepest level whose nodes are audited; the root is depth 0
    pub max_depth: usize,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            level: WcagLevel::AA,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl AuditOptions {
    pub fn with_level(level: WcagLevel) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }
}

/// Issues and counts for one tree
#[derive(Debug, Clone, PartialEq)]
pub struct TreeAudit {
    pub issues: Vec<Issue>,
    pub summary: Summary,
    pub element_count: usize,
}

/// Audit a frame and every descendant
pub fn audit_tree(root: &ElementNode, options: &AuditOptions, custom_rules: &[CustomRule]) -> TreeAudit {
    let mut issues = Vec::new();
    walk(root, 0, options, custom_rules, &mut issues);

    let summary = Summary::from_issues(&issues);
    TreeAudit {
        issues,
        summary,
        element_count: count_elements(root, options.max_depth),
    }
}

fn walk(
    node: &ElementNode,
    depth: usize,
    options: &AuditOptions,
    custom_rules: &[CustomRule],
    issues: &mut Vec<Issue>,
) {
    issues.extend(audit_element(node, options.level, custom_rules));

    if node.children.is_empty() {
        return;
    }
    if depth >= options.max_depth {
        debug!(
            "Depth limit {} reached at '{}', skipping {} children",
            options.max_depth,
            node.name,
            node.children.len()
        );
        return;
    }

    for child in &node.children {
        walk(child, depth + 1, options, custom_rules, issues);
    }
}

/// Count a node and its descendants down to `max_depth`
pub fn count_elements(node: &ElementNode, max_depth: usize) -> usize {
    fn count(node: &ElementNode, depth: usize, max_depth: usize) -> usize {
        if depth >= max_depth {
            return 1;
        }
        1 + node
            .children
            .iter()
            .map(|c| count(c, depth + 1, max_depth))
            .sum::<usize>()
    }
    count(node, 0, max_depth)
}

/// Result of an accessibility audit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityReport {
    pub issues: Vec<Issue>,
    pub summary: Summary,
    pub wcag_level: WcagLevel,
    pub element_count: usize,
    pub audit_time: DateTime<Utc>,
}

/// Run the accessibility audit over a frame
pub fn perform_accessibility_audit(
    frame: &ElementNode,
    options: &AuditOptions,
    custom_rules: &[CustomRule],
) -> AccessibilityReport {
    let TreeAudit {
        issues,
        summary,
        element_count,
    } = audit_tree(frame, options, custom_rules);

    info!(
        "Accessibility audit of '{}' at WCAG {}: {} elements, {} issues",
        frame.name, options.level, element_count, summary.total
    );

    AccessibilityReport {
        issues,
        summary,
        wcag_level: options.level,
        element_count,
        audit_time: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::{IssueType, Severity};
    use crate::node::{NodeType, Paint};

    fn hidden(id: &str, name: &str) -> ElementNode {
        let mut node = ElementNode::new(id, name, NodeType::Frame);
        node.visible = false;
        node
    }

    fn three_level_tree() -> ElementNode {
        hidden("root", "Root")
            .with_child(hidden("a", "A").with_child(hidden("a1", "A1")))
            .with_child(hidden("b", "B").with_child(hidden("b1", "B1")))
    }

    #[test]
    fn test_element_count() {
        let tree = three_level_tree();
        assert_eq!(audit_tree(&tree, &AuditOptions::default(), &[]).element_count, 5);
    }

    #[test]
    fn test_preorder_issue_order() {
        let audit = audit_tree(&three_level_tree(), &AuditOptions::default(), &[]);
        let ids: Vec<_> = audit
            .issues
            .iter()
            .map(|i| i.element_id.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(ids, vec!["root", "a", "a1", "b", "b1"]);
    }

    #[test]
    fn test_summary_matches_issues() {
        let audit = audit_tree(&three_level_tree(), &AuditOptions::default(), &[]);
        assert_eq!(audit.summary, Summary::from_issues(&audit.issues));
        assert_eq!(audit.summary.info, 5);
    }

    #[test]
    fn test_leaf_contributes_own_issues_only() {
        let node = hidden("leaf", "Leaf");
        let audit = audit_tree(&node, &AuditOptions::default(), &[]);
        assert_eq!(audit.element_count, 1);
        assert_eq!(audit.issues.len(), 1);
    }

    #[test]
    fn test_max_depth_treats_deep_nodes_as_leaves() {
        let mut tree = hidden("n0", "n0");
        for i in (1..10).rev() {
            tree = hidden(&format!("n{}", i), "deep").with_child(tree);
        }
        let options = AuditOptions {
            level: WcagLevel::AA,
            max_depth: 3,
        };
        let audit = audit_tree(&tree, &options, &[]);
        assert_eq!(audit.element_count, 4);
        assert_eq!(audit.issues.len(), 4);
    }

    #[test]
    fn test_accessibility_report_end_to_end() {
        let frame: ElementNode = serde_json::from_value(serde_json::json!({
            "type": "TEXT",
            "name": "Fine print",
            "fontSize": 10,
            "fills": [{"type": "SOLID", "color": {"r": 0, "g": 0, "b": 0}, "visible": true}],
            "background": [{"type": "SOLID", "color": {"r": 0.1, "g": 0.1, "b": 0.1}, "visible": true}]
        }))
        .expect("valid frame");

        let report = perform_accessibility_audit(&frame, &AuditOptions::default(), &[]);
        assert_eq!(report.wcag_level, WcagLevel::AA);
        assert_eq!(report.element_count, 1);
        assert_eq!(report.issues.len(), 2);
        assert_eq!(report.issues[0].issue_type, IssueType::Contrast);
        assert_eq!(report.issues[0].severity, Severity::Error);
        assert_eq!(report.issues[1].issue_type, IssueType::TextSize);
        assert_eq!(report.issues[1].severity, Severity::Warning);
    }

    #[test]
    fn test_custom_rules_apply_to_every_node() {
        let mut root = ElementNode::new("r", "Root", NodeType::Frame);
        root.fills = vec![Paint::solid(1.0, 1.0, 1.0)];
        let tree = root.with_child(ElementNode::new("c", "Child", NodeType::Frame));
        let rules = vec![CustomRule::new(|n| Ok(n.description_text().is_some()))];
        let audit = audit_tree(&tree, &AuditOptions::default(), &rules);
        assert_eq!(audit.summary.by_type["custom"], 2);
    }
}
