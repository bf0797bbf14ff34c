// SPDX-License-Identifier: PMPL-1.0-or-later
//! Design-system consistency check.
//!
//! The frame and each of its direct children are described to a
//! [`TextAnalyzer`] along with the system context. Any answer that does not
//! say "no issues found" becomes one warning carrying the answer verbatim.
//! A failed call is logged and the element contributes nothing.

use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error};

use super::catalog::DesignSystem;
use crate::analysis::TextAnalyzer;
use crate::issue::{Issue, IssueType, Severity, Summary};
use crate::node::ElementNode;
use crate::store::models::TeamConfig;

pub const SYSTEM_PROMPT: &str = "You are a design system expert. Analyze Figma elements for \
consistency with established design systems.";

const CONSISTENT_MARKER: &str = "no issues found";

const SUGGESTION: &str = "Review design system guidelines and update element accordingly";

/// Issues from one consistency pass
#[derive(Debug, Clone, PartialEq)]
pub struct ConsistencyAnalysis {
    pub issues: Vec<Issue>,
    pub summary: Summary,
}

/// Describe the design system and team guidelines for the analyzer
pub fn build_system_context(catalog: Option<&DesignSystem>, config: &TeamConfig) -> String {
    let mut context = String::new();

    if let Some(system) = catalog {
        context = format!(
            "Design System: {} {}\nComponents: {}\nColor Tokens: {}\nSpacing Tokens: {}",
            system.name,
            system.version,
            system.components.join(", "),
            system.tokens.colors.keys().cloned().collect::<Vec<_>>().join(", "),
            system.tokens.spacing.keys().cloned().collect::<Vec<_>>().join(", "),
        );
    }

    if let Some(text) = config.design_system_text.as_deref().filter(|t| !t.is_empty()) {
        context.push_str("\nCustom Guidelines: ");
        context.push_str(text);
    }

    context
}

/// Prompt describing one element
pub fn build_element_prompt(element: &ElementNode, system_context: &str) -> String {
    let fills = serde_json::to_string(&element.fills).unwrap_or_else(|_| "[]".to_string());

    format!(
        "Analyze this Figma element for design system consistency:

Element: {name}
Type: {kind}
Width: {width}px
Height: {height}px
Fills: {fills}
Corner Radius: {radius}px

{system_context}

Check for:
1. Component naming conventions
2. Spacing consistency (8px grid system)
3. Color usage (design tokens)
4. Typography consistency
5. Border radius consistency
6. Layout patterns

Return specific issues found, or \"No issues found\" if everything looks consistent.",
        name = element.name,
        kind = element.node_type,
        width = element.width,
        height = element.height,
        fills = fills,
        radius = element.corner_radius.unwrap_or(0.0),
        system_context = system_context,
    )
}

/// Check the frame and its direct children against the design system
pub async fn analyze_consistency(
    frame: &ElementNode,
    config: &TeamConfig,
    catalog: Option<&DesignSystem>,
    analyzer: Arc<dyn TextAnalyzer>,
) -> ConsistencyAnalysis {
    let system_context = build_system_context(catalog, config);
    let elements: Vec<&ElementNode> = std::iter::once(frame).chain(frame.children.iter()).collect();

    let mut tasks = JoinSet::new();
    for (index, element) in elements.iter().enumerate() {
        let prompt = build_element_prompt(element, &system_context);
        let analyzer = Arc::clone(&analyzer);
        tasks.spawn(async move { (index, analyzer.analyze(SYSTEM_PROMPT, &prompt).await) });
    }

    let mut answers = Vec::with_capacity(elements.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, Ok(answer))) => answers.push((index, answer)),
            Ok((index, Err(e))) => {
                error!("Consistency analysis failed for '{}': {}", elements[index].name, e);
            }
            Err(e) => error!("Consistency analysis task failed: {}", e),
        }
    }
    answers.sort_by_key(|(index, _)| *index);

    let issues: Vec<Issue> = answers
        .into_iter()
        .filter(|(_, answer)| !answer.is_empty() && !answer.to_lowercase().contains(CONSISTENT_MARKER))
        .map(|(index, answer)| {
            Issue::new(IssueType::DesignSystem, Severity::Warning, answer)
                .for_element(elements[index])
                .with_suggestion(SUGGESTION)
        })
        .collect();

    debug!("Consistency analysis of '{}' found {} issues", frame.name, issues.len());

    let summary = Summary::from_issues(&issues);
    ConsistencyAnalysis { issues, summary }
}
