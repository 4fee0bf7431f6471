//! Accessibility-tree observations.
//!
//! Chromium reports the accessibility tree as a flat list of nodes linked by
//! child ids. The environment renders it into one line per meaningful node:
//!
//! ```text
//! [164] textbox 'Search' focused: True required: False
//! 	[171] button 'Go'
//! ```
//!
//! The bracketed number is the element id accepted by id-based actions.

use std::{
    collections::{HashMap, HashSet},
    sync::OnceLock,
};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::ElementId;

/// Properties that add noise without helping anyone pick an element.
const IGNORED_PROPERTIES: &[&str] = &[
    "focusable",
    "editable",
    "readonly",
    "level",
    "settable",
    "multiline",
    "invalid",
];

/// Roles that carry no information on their own when they have no name.
const UNNAMED_NOISE_ROLES: &[&str] = &[
    "generic",
    "img",
    "list",
    "strong",
    "paragraph",
    "banner",
    "navigation",
    "Section",
    "LabelText",
    "Legend",
    "listitem",
];

fn element_line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"\[(\d+)\]\s+(\w+)\s+(?:'((?:\\.|[^'\\])*)'|"([^"]*)")"#)
            .expect("static element line pattern")
    })
}

/// One `[id] role 'label'` entry read back from a rendered tree line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementLine {
    pub id: ElementId,
    pub role: String,
    pub label: String,
}

/// Parses a rendered tree line, accepting both quoting styles the renderer
/// emits and undoing its backslash escapes.
pub fn parse_element_line(line: &str) -> Option<ElementLine> {
    let caps = element_line_pattern().captures(line)?;
    let id = caps[1].parse::<u64>().ok()?;
    let label = match (caps.get(3), caps.get(4)) {
        (Some(single), _) => unescape_label(single.as_str()),
        (None, Some(double)) => double.as_str().to_string(),
        (None, None) => return None,
    };
    Some(ElementLine {
        id: ElementId(id),
        role: caps[2].to_string(),
        label,
    })
}

fn unescape_label(raw: &str) -> String {
    let mut label = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                label.push(escaped);
                continue;
            }
        }
        label.push(c);
    }
    label
}

/// Subset of a CDP `Accessibility.AXNode` needed for rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxNodeSnapshot {
    pub node_id: String,
    #[serde(default)]
    pub ignored: bool,
    #[serde(default)]
    pub role: Option<AxValueSnapshot>,
    #[serde(default)]
    pub name: Option<AxValueSnapshot>,
    #[serde(default)]
    pub properties: Option<Vec<AxPropertySnapshot>>,
    #[serde(default)]
    pub child_ids: Option<Vec<String>>,
    #[serde(default, rename = "backendDOMNodeId")]
    pub backend_dom_node_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AxValueSnapshot {
    #[serde(rename = "type", default)]
    pub value_type: String,
    #[serde(default)]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxPropertySnapshot {
    pub name: String,
    pub value: AxValueSnapshot,
}

impl AxNodeSnapshot {
    fn role(&self) -> String {
        self.role
            .as_ref()
            .and_then(|v| v.value.as_ref())
            .map(value_text)
            .unwrap_or_default()
    }

    fn name(&self) -> String {
        self.name
            .as_ref()
            .and_then(|v| v.value.as_ref())
            .map(value_text)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabSummary {
    pub title: String,
    pub url: String,
}

/// Rendered tree text plus the DOM node behind every id printed in it.
#[derive(Debug, Clone, Default)]
pub struct RenderedTree {
    pub text: String,
    pub elements: HashMap<ElementId, i64>,
}

#[derive(Debug, Clone, Default)]
pub struct Observation {
    pub text: String,
    pub url: String,
    pub tabs: Vec<TabSummary>,
    pub active_tab: usize,
    pub elements: HashMap<ElementId, i64>,
}

impl Observation {
    pub fn new(tree: RenderedTree, url: String, tabs: Vec<TabSummary>, active_tab: usize) -> Self {
        Self {
            text: tree.text,
            url,
            tabs,
            active_tab,
            elements: tree.elements,
        }
    }

    /// Backend DOM node id for an element id printed in this observation.
    pub fn backend_node(&self, element: ElementId) -> Option<i64> {
        self.elements.get(&element).copied()
    }

    /// Tab strip in the same one-line-per-tab style as the tree.
    pub fn tab_listing(&self) -> String {
        self.tabs
            .iter()
            .enumerate()
            .map(|(index, tab)| {
                let marker = if index == self.active_tab { "*" } else { " " };
                format!("{marker}Tab {index}: {} ({})", tab.title, tab.url)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Renders a flat node list; the first node is the root.
///
/// Nodes in `hidden` are skipped but their children stay reachable, which is
/// how off-viewport containers get collapsed.
pub fn render_accessibility_tree(nodes: &[AxNodeSnapshot], hidden: &HashSet<String>) -> RenderedTree {
    let mut rendered = RenderedTree::default();
    let Some(root) = nodes.first() else {
        return rendered;
    };

    let index: HashMap<&str, &AxNodeSnapshot> =
        nodes.iter().map(|node| (node.node_id.as_str(), node)).collect();

    let mut lines = Vec::new();
    let mut visited = HashSet::new();
    // Explicit stack keeps deep pages from overflowing the thread stack.
    let mut stack = vec![(root, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        if !visited.insert(node.node_id.as_str()) {
            continue;
        }

        let keep = !hidden.contains(&node.node_id) && !node.ignored && is_meaningful(node);
        if keep {
            let line = render_node_line(node);
            lines.push(format!("{}{}", "\t".repeat(depth), line));
            if let (Ok(id), Some(backend)) = (node.node_id.parse::<u64>(), node.backend_dom_node_id)
            {
                rendered.elements.insert(ElementId(id), backend);
            }
        }

        let child_depth = if keep { depth + 1 } else { depth };
        if let Some(children) = &node.child_ids {
            for child_id in children.iter().rev() {
                if let Some(child) = index.get(child_id.as_str()) {
                    stack.push((*child, child_depth));
                }
            }
        }
    }

    rendered.text = drop_repeated_static_text(&lines);
    rendered
}

fn is_meaningful(node: &AxNodeSnapshot) -> bool {
    let role = node.role();
    if node.name().trim().is_empty() {
        if visible_properties(node).is_empty() {
            return !UNNAMED_NOISE_ROLES.contains(&role.as_str()) && !role.trim().is_empty();
        }
        return role != "listitem";
    }
    true
}

fn visible_properties(node: &AxNodeSnapshot) -> Vec<String> {
    node.properties
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter(|property| !IGNORED_PROPERTIES.contains(&property.name.as_str()))
        .map(|property| {
            let value = property
                .value
                .value
                .as_ref()
                .map(value_text)
                .unwrap_or_default();
            format!("{}: {}", property.name, value)
        })
        .collect()
}

fn render_node_line(node: &AxNodeSnapshot) -> String {
    let mut line = format!("[{}] {} {}", node.node_id, node.role(), quote_label(&node.name()));
    let properties = visible_properties(node);
    if !properties.is_empty() {
        line.push(' ');
        line.push_str(&properties.join(" "));
    }
    line
}

/// Booleans print as `True`/`False` to keep the established tree format.
fn value_text(value: &Value) -> String {
    match value {
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Single-quoted label; switches to double quotes when the label holds a `'`.
fn quote_label(label: &str) -> String {
    if label.contains('\'') && !label.contains('"') {
        format!("\"{label}\"")
    } else {
        format!("'{}'", label.replace('\\', "\\\\").replace('\'', "\\'"))
    }
}

/// Drops StaticText lines whose text already shows up in one of the three
/// preceding kept lines (usually the parent link or button label).
fn drop_repeated_static_text(lines: &[String]) -> String {
    let mut kept: Vec<&str> = Vec::with_capacity(lines.len());
    for line in lines {
        if line.to_ascii_lowercase().contains("statictext") {
            let Some(text) = static_text_label(line) else {
                continue;
            };
            let recent = &kept[kept.len().saturating_sub(3)..];
            if recent.iter().all(|prev| !prev.contains(text.as_str())) {
                kept.push(line.as_str());
            }
        } else {
            kept.push(line.as_str());
        }
    }
    kept.join("\n")
}

fn static_text_label(line: &str) -> Option<String> {
    parse_element_line(line)
        .filter(|element| element.role == "StaticText" && !element.label.is_empty())
        .map(|element| element.label)
}

#[cfg(test)]
#[path = "tests/observation_tests.rs"]
mod tests;
