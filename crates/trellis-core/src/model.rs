//! Screen document model
//!
//! The wire format is a versioned root object holding one component tree:
//!
//! ```json
//! { "version": 1, "component": { "id": "root", "type": "vstack", "children": [] } }
//! ```
//!
//! Components are plain owned trees. `children` and `itemView` own their
//! subtrees, so a decoded document can never contain a cycle. Depth is bounded
//! at render time by [`DEFAULT_MAX_DEPTH`] (or the binder's configured bound).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Version emitted by composers and accepted by default.
pub const SCREEN_FORMAT_VERSION: u32 = 1;

/// Default bound on component nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Versioned root document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screen {
    pub version: u32,
    pub component: Component,
}

impl Screen {
    pub fn new(version: u32, component: Component) -> Self {
        Self { version, component }
    }

    /// Decode a screen from JSON text.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Encode the screen as compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Minimal document shown in place of one that cannot be rendered.
    pub fn fallback(version: u32, message: impl Into<String>) -> Self {
        Self::new(
            version,
            Component::vstack(
                "fallback",
                vec![
                    Component::image("fallbackIcon", "exclamationmark.triangle")
                        .foreground("warning"),
                    Component::text("fallbackMessage", message)
                        .font("body")
                        .foreground("secondary"),
                ],
            )
            .spacing(12.0)
            .padding(24.0),
        )
    }

    /// Number of nested levels in the tree (a lone root has depth 1).
    pub fn depth(&self) -> usize {
        self.component.depth()
    }

    /// Check structural invariants the binder relies on.
    ///
    /// Problems are reported, never fixed up: the binder is fail-soft and
    /// renders the document regardless.
    pub fn validate(&self, max_depth: usize) -> ValidationReport {
        let mut report = ValidationReport::default();
        let mut seen = HashSet::new();
        validate_component(&self.component, 1, max_depth, &mut seen, &mut report);
        report
    }
}

fn validate_component<'a>(
    component: &'a Component,
    depth: usize,
    max_depth: usize,
    seen: &mut HashSet<&'a str>,
    report: &mut ValidationReport,
) {
    if depth > max_depth {
        report.issues.push(ValidationIssue::DepthExceeded {
            id: component.id.clone(),
            max_depth,
        });
        return;
    }

    if component.id.trim().is_empty() {
        report.issues.push(ValidationIssue::EmptyId {
            kind: component.kind,
        });
    } else if !seen.insert(component.id.as_str()) {
        report.issues.push(ValidationIssue::DuplicateId {
            id: component.id.clone(),
        });
    }

    match component.kind {
        ComponentKind::Conditional if component.condition_key.is_none() => {
            report.issues.push(ValidationIssue::ConditionWithoutKey {
                id: component.id.clone(),
            });
        }
        ComponentKind::List => {}
        _ if component.item_view.is_some() => {
            report.issues.push(ValidationIssue::ItemViewOutsideList {
                id: component.id.clone(),
            });
        }
        _ => {}
    }

    for child in &component.children {
        validate_component(child, depth + 1, max_depth, seen, report);
    }
    if let Some(template) = &component.item_view {
        validate_component(template, depth + 1, max_depth, seen, report);
    }
}

/// Closed set of component kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Text,
    Button,
    Image,
    VStack,
    HStack,
    List,
    Conditional,
    Spacer,
    Divider,
    Scroll,
}

impl ComponentKind {
    /// All kinds, in wire order.
    pub const ALL: [Self; 10] = [
        Self::Text,
        Self::Button,
        Self::Image,
        Self::VStack,
        Self::HStack,
        Self::List,
        Self::Conditional,
        Self::Spacer,
        Self::Divider,
        Self::Scroll,
    ];

    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Button => "button",
            Self::Image => "image",
            Self::VStack => "vstack",
            Self::HStack => "hstack",
            Self::List => "list",
            Self::Conditional => "conditional",
            Self::Spacer => "spacer",
            Self::Divider => "divider",
            Self::Scroll => "scroll",
        }
    }

    /// Whether this kind lays out `children`.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Self::Button | Self::VStack | Self::HStack | Self::List | Self::Conditional | Self::Scroll
        )
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of the declarative tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: ComponentKind,

    /// Literal text, may contain `{{token}}` placeholders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Binding resolved against the current scope item; for lists, the
    /// name of the bound collection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Component>,

    /// Row template, only meaningful on `list`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_view: Option<Box<Component>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreground_color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Component {
    /// Bare component of the given kind.
    pub fn new(id: impl Into<String>, kind: ComponentKind) -> Self {
        Self {
            id: id.into(),
            kind,
            text: None,
            key: None,
            action_id: None,
            children: Vec::new(),
            item_view: None,
            condition_key: None,
            font: None,
            foreground_color: None,
            background_color: None,
            corner_radius: None,
            padding: None,
            spacing: None,
            image_name: None,
            label: None,
        }
    }

    pub fn text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, ComponentKind::Text).with_text(text)
    }

    /// Text node whose content comes from the scope item.
    pub fn bound_text(id: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(id, ComponentKind::Text).key(key)
    }

    pub fn button(
        id: impl Into<String>,
        label: impl Into<String>,
        action_id: impl Into<String>,
    ) -> Self {
        Self::new(id, ComponentKind::Button)
            .label(label)
            .action(action_id)
    }

    pub fn image(id: impl Into<String>, name: impl Into<String>) -> Self {
        let mut component = Self::new(id, ComponentKind::Image);
        component.image_name = Some(name.into());
        component
    }

    pub fn vstack(id: impl Into<String>, children: Vec<Component>) -> Self {
        Self::new(id, ComponentKind::VStack).children(children)
    }

    pub fn hstack(id: impl Into<String>, children: Vec<Component>) -> Self {
        Self::new(id, ComponentKind::HStack).children(children)
    }

    pub fn scroll(id: impl Into<String>, children: Vec<Component>) -> Self {
        Self::new(id, ComponentKind::Scroll).children(children)
    }

    /// List bound to `collection`, instantiating `template` once per item.
    pub fn list(id: impl Into<String>, collection: impl Into<String>, template: Component) -> Self {
        let mut component = Self::new(id, ComponentKind::List).key(collection);
        component.item_view = Some(Box::new(template));
        component
    }

    /// List whose rows are emitted explicitly.
    pub fn unrolled_list(id: impl Into<String>, rows: Vec<Component>) -> Self {
        Self::new(id, ComponentKind::List).children(rows)
    }

    pub fn conditional(
        id: impl Into<String>,
        condition_key: impl Into<String>,
        children: Vec<Component>,
    ) -> Self {
        let mut component = Self::new(id, ComponentKind::Conditional).children(children);
        component.condition_key = Some(condition_key.into());
        component
    }

    pub fn spacer(id: impl Into<String>) -> Self {
        Self::new(id, ComponentKind::Spacer)
    }

    pub fn divider(id: impl Into<String>) -> Self {
        Self::new(id, ComponentKind::Divider)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn action(mut self, action_id: impl Into<String>) -> Self {
        self.action_id = Some(action_id.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn child(mut self, child: Component) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: Vec<Component>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn font(mut self, token: impl Into<String>) -> Self {
        self.font = Some(token.into());
        self
    }

    pub fn foreground(mut self, token: impl Into<String>) -> Self {
        self.foreground_color = Some(token.into());
        self
    }

    pub fn background(mut self, token: impl Into<String>) -> Self {
        self.background_color = Some(token.into());
        self
    }

    pub fn corner_radius(mut self, radius: f64) -> Self {
        self.corner_radius = Some(radius);
        self
    }

    pub fn padding(mut self, padding: f64) -> Self {
        self.padding = Some(padding);
        self
    }

    pub fn spacing(mut self, spacing: f64) -> Self {
        self.spacing = Some(spacing);
        self
    }

    /// Depth of the subtree rooted here, counting the item template.
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .chain(self.item_view.as_deref())
            .map(Component::depth)
            .max()
            .unwrap_or(0)
    }

    /// Number of components in the subtree, templates counted once.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .chain(self.item_view.as_deref())
            .map(Component::node_count)
            .sum::<usize>()
    }

    /// Depth-first search for a component by id.
    pub fn find(&self, id: &str) -> Option<&Component> {
        if self.id == id {
            return Some(self);
        }
        self.children
            .iter()
            .chain(self.item_view.as_deref())
            .find_map(|child| child.find(id))
    }
}

/// Structural problems found by [`Screen::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "camelCase")]
pub enum ValidationIssue {
    DepthExceeded { id: String, max_depth: usize },
    EmptyId { kind: ComponentKind },
    DuplicateId { id: String },
    ItemViewOutsideList { id: String },
    ConditionWithoutKey { id: String },
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DepthExceeded { id, max_depth } => {
                write!(f, "'{id}' is nested deeper than {max_depth} levels")
            }
            Self::EmptyId { kind } => write!(f, "a {kind} component has an empty id"),
            Self::DuplicateId { id } => write!(f, "id '{id}' is used more than once"),
            Self::ItemViewOutsideList { id } => {
                write!(f, "'{id}' has an itemView but is not a list; it will be ignored")
            }
            Self::ConditionWithoutKey { id } => {
                write!(f, "conditional '{id}' has no conditionKey and will never render")
            }
        }
    }
}

/// Result of [`Screen::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}
