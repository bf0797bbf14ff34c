// SPDX-License-Identifier: PMPL-1.0-or-later
//! Design element tree as exported from a Figma frame.
//!
//! Every field is optional on the wire, and an explicit `null` reads the same
//! as a missing field. Geometry defaults to zero, `visible` defaults to true,
//! and text attributes stay `None` when absent so checks that need them
//! simply do not fire.
//!
//! Exports can nest far deeper than any audit walks. [`from_json_bounded`]
//! parses a payload while keeping element trees only down to a given depth;
//! deeper children are skipped without being built.

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Deserializer, Serialize};
use std::cell::Cell;

/// Node type tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    Frame,
    Group,
    Text,
    Rectangle,
    Ellipse,
    Vector,
    Component,
    ComponentSet,
    Instance,
    Button,
    /// No type tag given
    #[default]
    Unknown,
    /// Any tag outside the known set, kept verbatim
    Other(String),
}

impl NodeType {
    pub fn as_str(&self) -> &str {
        match self {
            NodeType::Frame => "FRAME",
            NodeType::Group => "GROUP",
            NodeType::Text => "TEXT",
            NodeType::Rectangle => "RECTANGLE",
            NodeType::Ellipse => "ELLIPSE",
            NodeType::Vector => "VECTOR",
            NodeType::Component => "COMPONENT",
            NodeType::ComponentSet => "COMPONENT_SET",
            NodeType::Instance => "INSTANCE",
            NodeType::Button => "BUTTON",
            NodeType::Unknown => "",
            NodeType::Other(tag) => tag,
        }
    }

    /// Node kinds users interact with directly
    pub fn is_interactive(&self) -> bool {
        matches!(self, NodeType::Button | NodeType::Component | NodeType::Instance)
    }
}

impl From<String> for NodeType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "FRAME" => NodeType::Frame,
            "GROUP" => NodeType::Group,
            "TEXT" => NodeType::Text,
            "RECTANGLE" => NodeType::Rectangle,
            "ELLIPSE" => NodeType::Ellipse,
            "VECTOR" => NodeType::Vector,
            "COMPONENT" => NodeType::Component,
            "COMPONENT_SET" => NodeType::ComponentSet,
            "INSTANCE" => NodeType::Instance,
            "BUTTON" => NodeType::Button,
            "" => NodeType::Unknown,
            _ => NodeType::Other(tag),
        }
    }
}

impl From<NodeType> for String {
    fn from(kind: NodeType) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Paint kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaintType {
    Solid,
    Image,
    GradientLinear,
    GradientRadial,
    GradientAngular,
    GradientDiamond,
    Video,
    #[serde(other)]
    Other,
}

/// Figma color with channels in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PaintColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a: Option<f64>,
}

/// A single fill or background layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paint {
    #[serde(rename = "type")]
    pub paint_type: PaintType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<PaintColor>,
    #[serde(default = "default_true", deserialize_with = "null_as_true")]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl Paint {
    pub fn solid(r: f64, g: f64, b: f64) -> Self {
        Self {
            paint_type: PaintType::Solid,
            color: Some(PaintColor { r, g, b, a: None }),
            visible: true,
            opacity: None,
        }
    }

    pub fn image() -> Self {
        Self {
            paint_type: PaintType::Image,
            color: None,
            visible: true,
            opacity: None,
        }
    }
}

/// Typography attributes, present on TEXT nodes
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<f64>,
    /// Semantic role such as "body" or "heading"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_type: Option<String>,
}

/// A node in the design's element tree.
///
/// Children are kept in render order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "WireNode")]
pub struct ElementNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fills: Vec<Paint>,
    pub background: Vec<Paint>,
    #[serde(flatten)]
    pub text: TextStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    pub visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    pub children: Vec<ElementNode>,
}

/// Wire shape of a node: every attribute nullable, typography inline
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireNode {
    id: Option<String>,
    name: Option<String>,
    #[serde(rename = "type")]
    node_type: Option<NodeType>,
    x: Option<f64>,
    y: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,
    fills: Option<Vec<Paint>>,
    background: Option<Vec<Paint>>,
    font_size: Option<f64>,
    font_weight: Option<f64>,
    text_type: Option<String>,
    opacity: Option<f64>,
    visible: Option<bool>,
    description: Option<String>,
    corner_radius: Option<f64>,
    #[serde(default, deserialize_with = "bounded_children")]
    children: Vec<ElementNode>,
}

impl From<WireNode> for ElementNode {
    fn from(wire: WireNode) -> Self {
        Self {
            id: wire.id.unwrap_or_default(),
            name: wire.name.unwrap_or_default(),
            node_type: wire.node_type.unwrap_or_default(),
            x: wire.x.unwrap_or_default(),
            y: wire.y.unwrap_or_default(),
            width: wire.width.unwrap_or_default(),
            height: wire.height.unwrap_or_default(),
            fills: wire.fills.unwrap_or_default(),
            background: wire.background.unwrap_or_default(),
            text: TextStyle {
                font_size: wire.font_size,
                font_weight: wire.font_weight,
                text_type: wire.text_type,
            },
            opacity: wire.opacity,
            visible: wire.visible.unwrap_or(true),
            description: wire.description,
            corner_radius: wire.corner_radius,
            children: wire.children,
        }
    }
}

impl Default for ElementNode {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            node_type: NodeType::Unknown,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            fills: Vec::new(),
            background: Vec::new(),
            text: TextStyle::default(),
            opacity: None,
            visible: true,
            description: None,
            corner_radius: None,
            children: Vec::new(),
        }
    }
}

impl ElementNode {
    /// Create a node with an id, name and type
    pub fn new(id: &str, name: &str, node_type: NodeType) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            node_type,
            ..Self::default()
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_child(mut self, child: ElementNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    pub fn has_image_fill(&self) -> bool {
        self.fills.iter().any(|f| f.paint_type == PaintType::Image)
    }

    /// Description text, if it carries anything
    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.is_empty())
    }
}

fn default_true() -> bool {
    true
}

fn null_as_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

thread_local! {
    /// Child levels still kept by the parse running on this thread; `None` is unbounded
    static CHILD_LEVELS: Cell<Option<usize>> = const { Cell::new(None) };
}

/// Sets the child level budget, restoring the previous one on drop
struct LevelGuard(Option<usize>);

impl LevelGuard {
    fn set(levels: Option<usize>) -> Self {
        LevelGuard(CHILD_LEVELS.with(|c| c.replace(levels)))
    }
}

impl Drop for LevelGuard {
    fn drop(&mut self) {
        CHILD_LEVELS.with(|c| c.set(self.0));
    }
}

fn bounded_children<'de, D>(deserializer: D) -> Result<Vec<ElementNode>, D::Error>
where
    D: Deserializer<'de>,
{
    match CHILD_LEVELS.with(Cell::get) {
        Some(0) => {
            IgnoredAny::deserialize(deserializer)?;
            Ok(Vec::new())
        }
        levels => {
            let _guard = LevelGuard::set(levels.map(|n| n - 1));
            Ok(Option::<Vec<ElementNode>>::deserialize(deserializer)?.unwrap_or_default())
        }
    }
}

/// Parse a JSON payload whose element trees are cut off below `max_depth`.
///
/// The root sits at depth 0. Nodes at `max_depth` keep no children. The
/// recursion limit is lifted, since node nesting is bounded by `max_depth`
/// and skipped subtrees are consumed without recursion.
pub fn from_json_bounded<T: DeserializeOwned>(bytes: &[u8], max_depth: usize) -> serde_json::Result<T> {
    let _guard = LevelGuard::set(Some(max_depth));
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    deserializer.disable_recursion_limit();
    let value = T::deserialize(&mut deserializer)?;
    deserializer.end()?;
    Ok(value)
}
