// SPDX-License-Identifier: PMPL-1.0-or-later
//! Design-system catalog model and documentation parsing.
//!
//! Catalogs are scraped from documentation pages: headings become the
//! component list, CSS custom properties and theme assignments become
//! tokens, and principle keywords are counted as guidelines.

use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;
use url::Url;

use crate::error::{Error, Result};

/// Hosts with dedicated parsing or known to host design documentation
pub const KNOWN_DOMAINS: &[&str] = &[
    "chakra-ui.com",
    "mui.com",
    "material-ui.com",
    "ant.design",
    "mantine.dev",
    "headlessui.com",
    "figma.com",
    "github.com",
    "gitlab.com",
];

const PRINCIPLES: &[&str] = &[
    "accessibility",
    "contrast",
    "spacing",
    "typography",
    "color",
    "layout",
    "responsive",
    "mobile",
    "touch",
    "focus",
    "keyboard",
];

/// Token maps, name to raw value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tokens {
    #[serde(default)]
    pub colors: BTreeMap<String, String>,
    #[serde(default)]
    pub spacing: BTreeMap<String, String>,
    #[serde(default)]
    pub typography: BTreeMap<String, String>,
    #[serde(default)]
    pub shadows: BTreeMap<String, String>,
}

impl Tokens {
    pub fn count(&self) -> usize {
        self.colors.len() + self.spacing.len() + self.typography.len()
    }
}

/// How often a design principle is mentioned in the documentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guideline {
    pub category: String,
    pub mentions: usize,
    pub system: String,
}

/// A fetched design-system catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignSystem {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub components: Vec<String>,
    #[serde(default)]
    pub tokens: Tokens,
    #[serde(default)]
    pub guidelines: Vec<Guideline>,
}

fn default_version() -> String {
    "latest".to_string()
}

impl DesignSystem {
    pub fn empty(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            components: Vec::new(),
            tokens: Tokens::default(),
            guidelines: Vec::new(),
        }
    }

    pub fn summary(&self) -> DesignSystemSummary {
        DesignSystemSummary {
            name: self.name.clone(),
            version: self.version.clone(),
            component_count: self.components.len(),
            token_count: self.tokens.count(),
            guideline_count: self.guidelines.len(),
        }
    }
}

/// Counts for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignSystemSummary {
    pub name: String,
    pub version: String,
    pub component_count: usize,
    pub token_count: usize,
    pub guideline_count: usize,
}

/// Outcome of a successful URL check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlValidation {
    pub known_domain: bool,
}

impl UrlValidation {
    pub fn warning(&self) -> Option<&'static str> {
        if self.known_domain {
            None
        } else {
            Some("Unknown design system domain. Generic processing will be used.")
        }
    }
}

/// Check that a design-system URL can be fetched
pub fn validate_design_system_url(url: &str) -> Result<UrlValidation> {
    let parsed = Url::parse(url).map_err(|_| Error::InvalidUrl("Invalid URL format".to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::InvalidUrl("URL must use HTTP or HTTPS protocol".to_string()));
    }

    let host = parsed.host_str().unwrap_or_default();
    let known_domain = KNOWN_DOMAINS.iter().any(|domain| host.contains(domain));
    Ok(UrlValidation { known_domain })
}

/// Documentation flavours with dedicated parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemKind {
    Chakra,
    Material,
    Ant,
    Mantine,
    Headless,
    Generic,
}

impl SystemKind {
    /// Detect the flavour from the documentation URL
    pub fn detect(url: &str) -> Self {
        let url = url.to_lowercase();
        if url.contains("chakra-ui.com") {
            SystemKind::Chakra
        } else if url.contains("mui.com") || url.contains("material-ui.com") {
            SystemKind::Material
        } else if url.contains("ant.design") {
            SystemKind::Ant
        } else if url.contains("mantine.dev") {
            SystemKind::Mantine
        } else if url.contains("headlessui.com") {
            SystemKind::Headless
        } else {
            SystemKind::Generic
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SystemKind::Chakra => "Chakra UI",
            SystemKind::Material => "Material UI",
            SystemKind::Ant => "Ant Design",
            SystemKind::Mantine => "Mantine",
            SystemKind::Headless => "Headless UI",
            SystemKind::Generic => "Custom Design System",
        }
    }

    /// Tag recorded on extracted guidelines
    pub fn tag(&self) -> &'static str {
        match self {
            SystemKind::Chakra => "chakra",
            SystemKind::Material => "material",
            SystemKind::Ant => "antd",
            SystemKind::Mantine => "mantine",
            SystemKind::Headless => "headless",
            SystemKind::Generic => "generic",
        }
    }

    fn default_version(&self) -> &'static str {
        match self {
            SystemKind::Generic => "unknown",
            _ => "latest",
        }
    }
}

/// Build a catalog from a fetched documentation body
pub fn parse_design_system(url: &str, content: &str) -> DesignSystem {
    let kind = SystemKind::detect(url);

    let trimmed = content.trim_start();
    if trimmed.starts_with('{') {
        return match serde_json::from_str::<DesignSystem>(trimmed) {
            Ok(system) => system,
            Err(e) => {
                warn!("JSON catalog from {} has an unexpected shape: {}", url, e);
                DesignSystem::empty(kind.display_name(), kind.default_version())
            }
        };
    }

    let mut system = DesignSystem::empty(kind.display_name(), kind.default_version());
    system.components = extract_components(content);
    system.tokens = extract_tokens(kind, content);
    system.guidelines = extract_guidelines(content, kind.tag());
    system
}

/// Heading text, in document order
fn extract_components(content: &str) -> Vec<String> {
    let document = Html::parse_document(content);
    let heading_sel = Selector::parse("h1, h2, h3, h4, h5, h6").expect("valid selector");

    document
        .select(&heading_sel)
        .map(|h| h.text().collect::<String>().trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

fn extract_tokens(kind: SystemKind, content: &str) -> Tokens {
    let mut tokens = Tokens::default();

    match kind {
        SystemKind::Chakra => {
            let color_re = Regex::new(r"--chakra-colors-([^:]+):\s*([^;]+)").expect("valid regex");
            let space_re = Regex::new(r"--chakra-space-([^:]+):\s*([^;]+)").expect("valid regex");
            for cap in color_re.captures_iter(content) {
                tokens.colors.insert(cap[1].trim().to_string(), cap[2].trim().to_string());
            }
            for cap in space_re.captures_iter(content) {
                tokens.spacing.insert(cap[1].trim().to_string(), cap[2].trim().to_string());
            }
        }
        SystemKind::Material => {
            let theme_re = Regex::new(r"theme\.([^=]+)\s*=\s*([^;]+)").expect("valid regex");
            classify(&theme_re, content, &mut tokens, &["spacing"]);
        }
        SystemKind::Ant => {
            let less_re = Regex::new(r"@([^:]+):\s*([^;]+)").expect("valid regex");
            classify(&less_re, content, &mut tokens, &["spacing"]);
        }
        SystemKind::Generic => {
            let var_re = Regex::new(r"--([^:]+):\s*([^;]+)").expect("valid regex");
            classify(&var_re, content, &mut tokens, &["space", "margin", "padding"]);
        }
        SystemKind::Mantine | SystemKind::Headless => {}
    }

    tokens
}

/// Sort `name: value` captures into colors or spacing by name
fn classify(re: &Regex, content: &str, tokens: &mut Tokens, spacing_words: &[&str]) {
    for cap in re.captures_iter(content) {
        let name = cap[1].trim();
        let value = cap[2].trim().to_string();
        if name.contains("color") {
            tokens.colors.insert(name.to_string(), value);
        } else if spacing_words.iter().any(|w| name.contains(w)) {
            tokens.spacing.insert(name.to_string(), value);
        }
    }
}

fn extract_guidelines(content: &str, system: &str) -> Vec<Guideline> {
    let lower = content.to_lowercase();
    PRINCIPLES
        .iter()
        .filter_map(|principle| {
            let mentions = lower.matches(principle).count();
            (mentions > 0).then(|| Guideline {
                category: principle.to_string(),
                mentions,
                system: system.to_string(),
            })
        })
        .collect()
}
