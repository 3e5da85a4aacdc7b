//! Data binder: the screen interpreter
//!
//! Walks an admitted component tree top-down, depth-first, against one
//! [`ScreenContext`] snapshot and produces a [`ResolvedNode`] tree:
//!
//! - `key` fields resolve against the current scope (the row item inside a
//!   list, the context values elsewhere). A miss renders empty.
//! - `{{token}}` placeholders resolve against the context values. A miss is
//!   left literal.
//! - `conditional` nodes render their children only when `conditionKey` is
//!   truthy in scope. Otherwise the node and its subtree are omitted.
//! - `list` nodes with an `itemView` resolve the template once per item of the
//!   bound collection, with that item as the row scope. The template itself is
//!   never touched; rows differ only in their scope.
//! - `actionId` becomes a [`BoundAction`] carrying the row item in scope.
//!
//! Nothing in a render fails. Misses and bad style tokens become
//! [`Diagnostic`]s on the [`RenderOutput`].

use crate::cache::{CacheKey, CachedView, Fingerprint, ViewCache};
use crate::context::{Scope, ScreenContext};
use crate::error::Diagnostic;
use crate::model::{Component, ComponentKind, DEFAULT_MAX_DEPTH};
use crate::style::{Color, Font, StyleResolver};
use crate::template::{display_value, is_truthy, Interpolation};
use crate::version::AdmittedScreen;
use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;
use tracing::{debug, trace};

/// One node of interpreted output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedNode {
    pub id: String,
    #[serde(flatten)]
    pub content: Resolved,
    #[serde(skip_serializing_if = "ResolvedStyle::is_empty")]
    pub style: ResolvedStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<BoundAction>,
}

/// Interpreted content per component kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Resolved {
    Text {
        text: String,
    },
    Button {
        label: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        children: Vec<ResolvedNode>,
    },
    Image {
        name: String,
    },
    VStack {
        #[serde(skip_serializing_if = "Option::is_none")]
        spacing: Option<f64>,
        children: Vec<ResolvedNode>,
    },
    HStack {
        #[serde(skip_serializing_if = "Option::is_none")]
        spacing: Option<f64>,
        children: Vec<ResolvedNode>,
    },
    /// One entry per bound item (or per unrolled child), in order
    List {
        rows: Vec<ResolvedNode>,
    },
    /// Only present when the condition held
    Conditional {
        children: Vec<ResolvedNode>,
    },
    Spacer,
    Divider,
    Scroll {
        children: Vec<ResolvedNode>,
    },
}

/// Resolved presentation attributes. Absent fields use the host defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground: Option<Color>,
    /// `None` also for `clear`/`transparent`: no fill is applied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<f64>,
}

impl ResolvedStyle {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// An interaction wired to the dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundAction {
    pub action_id: String,
    /// Row item in scope when the node was resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<Value>,
}

impl ResolvedNode {
    /// Child nodes, list rows included.
    pub fn children(&self) -> &[ResolvedNode] {
        match &self.content {
            Resolved::Button { children, .. }
            | Resolved::VStack { children, .. }
            | Resolved::HStack { children, .. }
            | Resolved::Conditional { children }
            | Resolved::Scroll { children } => children,
            Resolved::List { rows } => rows,
            Resolved::Text { .. } | Resolved::Image { .. } | Resolved::Spacer | Resolved::Divider => {
                &[]
            }
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.content {
            Resolved::Text { text } => Some(text),
            _ => None,
        }
    }

    /// Depth-first search by component id.
    pub fn find(&self, id: &str) -> Option<&ResolvedNode> {
        if self.id == id {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(id))
    }

    /// Every node in the subtree, depth-first.
    pub fn walk(&self) -> Vec<&ResolvedNode> {
        let mut out = vec![self];
        for child in self.children() {
            out.extend(child.walk());
        }
        out
    }
}

/// Result of one render pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderOutput {
    /// `None` when the root itself was omitted (falsy conditional root)
    pub root: Option<ResolvedNode>,
    pub diagnostics: Vec<Diagnostic>,
}

impl RenderOutput {
    /// Text of every `text` node, depth-first.
    pub fn texts(&self) -> Vec<&str> {
        self.root
            .iter()
            .flat_map(|root| root.walk())
            .filter_map(ResolvedNode::text)
            .collect()
    }

    pub fn find(&self, id: &str) -> Option<&ResolvedNode> {
        self.root.as_ref().and_then(|root| root.find(id))
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Binder tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinderOptions {
    /// Deeper subtrees are dropped with a diagnostic
    pub max_depth: usize,
    /// Collection bound to a list that has no `key`
    pub default_collection: String,
}

impl BinderOptions {
    fn fingerprint(&self) -> Fingerprint {
        Fingerprint::builder()
            .bytes(&(self.max_depth as u64).to_le_bytes())
            .strs([&self.default_collection])
            .finish()
    }
}

impl Default for BinderOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            default_collection: "jobs".to_string(),
        }
    }
}

/// The interpreter for one context snapshot.
pub struct Binder<'a> {
    context: &'a dyn ScreenContext,
    styles: &'a StyleResolver,
    cache: Option<&'a ViewCache>,
    options: BinderOptions,
}

impl<'a> Binder<'a> {
    pub fn new(context: &'a dyn ScreenContext, styles: &'a StyleResolver) -> Self {
        Self {
            context,
            styles,
            cache: None,
            options: BinderOptions::default(),
        }
    }

    /// Reuse resolved rows across renders.
    pub fn with_cache(mut self, cache: &'a ViewCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_options(mut self, options: BinderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn render(&self, screen: &AdmittedScreen<'_>) -> RenderOutput {
        let mut diagnostics = Vec::new();
        let root = self.resolve(
            &screen.component,
            Scope::top(self.context),
            "",
            1,
            &mut diagnostics,
        );
        debug!(
            root = %screen.component.id,
            diagnostics = diagnostics.len(),
            "Rendered screen"
        );
        RenderOutput { root, diagnostics }
    }

    fn resolve(
        &self,
        component: &Component,
        scope: Scope<'a>,
        row_path: &str,
        depth: usize,
        sink: &mut Vec<Diagnostic>,
    ) -> Option<ResolvedNode> {
        if depth > self.options.max_depth {
            sink.push(Diagnostic::DepthExceeded {
                component_id: component.id.clone(),
                max_depth: self.options.max_depth,
            });
            return None;
        }

        let content = match component.kind {
            ComponentKind::Text => Resolved::Text {
                text: self.resolve_text(component, scope, sink),
            },
            ComponentKind::Button => Resolved::Button {
                label: self.resolve_label(component, scope, sink),
                children: self.resolve_children(component, scope, row_path, depth, sink),
            },
            ComponentKind::Image => Resolved::Image {
                name: self.resolve_image(component, scope, sink),
            },
            ComponentKind::VStack => Resolved::VStack {
                spacing: component.spacing,
                children: self.resolve_children(component, scope, row_path, depth, sink),
            },
            ComponentKind::HStack => Resolved::HStack {
                spacing: component.spacing,
                children: self.resolve_children(component, scope, row_path, depth, sink),
            },
            ComponentKind::Scroll => Resolved::Scroll {
                children: self.resolve_children(component, scope, row_path, depth, sink),
            },
            ComponentKind::List => Resolved::List {
                rows: self.resolve_list(component, scope, row_path, depth, sink),
            },
            ComponentKind::Conditional => {
                if !self.condition_holds(component, scope) {
                    trace!(id = %component.id, "Conditional omitted");
                    return None;
                }
                Resolved::Conditional {
                    children: self.resolve_children(component, scope, row_path, depth, sink),
                }
            }
            ComponentKind::Spacer => Resolved::Spacer,
            ComponentKind::Divider => Resolved::Divider,
        };

        Some(ResolvedNode {
            id: component.id.clone(),
            content,
            style: self.resolve_style(component, scope, sink),
            action: self.bind_action(component, scope, sink),
        })
    }

    fn resolve_children(
        &self,
        component: &Component,
        scope: Scope<'a>,
        row_path: &str,
        depth: usize,
        sink: &mut Vec<Diagnostic>,
    ) -> Vec<ResolvedNode> {
        component
            .children
            .iter()
            .filter_map(|child| self.resolve(child, scope, row_path, depth + 1, sink))
            .collect()
    }

    /// `key` first, then the literal/templated `text`.
    fn resolve_text(&self, component: &Component, scope: Scope<'a>, sink: &mut Vec<Diagnostic>) -> String {
        if let Some(key) = &component.key {
            if let Some(text) = self.scalar_key(component, key, scope, sink) {
                return text;
            }
        }
        component
            .text
            .as_deref()
            .map(|text| self.interpolate(component, text, scope, sink))
            .unwrap_or_default()
    }

    fn resolve_label(&self, component: &Component, scope: Scope<'a>, sink: &mut Vec<Diagnostic>) -> String {
        if let Some(key) = &component.key {
            if let Some(label) = self.scalar_key(component, key, scope, sink) {
                return label;
            }
        }
        component
            .label
            .as_deref()
            .or(component.text.as_deref())
            .map(|label| self.interpolate(component, label, scope, sink))
            .unwrap_or_default()
    }

    fn resolve_image(&self, component: &Component, scope: Scope<'a>, sink: &mut Vec<Diagnostic>) -> String {
        if let Some(key) = &component.key {
            if let Some(name) = self.scalar_key(component, key, scope, sink) {
                return name;
            }
        }
        component
            .image_name
            .as_deref()
            .map(|name| self.interpolate(component, name, scope, sink))
            .unwrap_or_default()
    }

    /// Resolve a `key` to display text, recording a miss.
    fn scalar_key(
        &self,
        component: &Component,
        key: &str,
        scope: Scope<'a>,
        sink: &mut Vec<Diagnostic>,
    ) -> Option<String> {
        let text = scope.resolve_key(key).and_then(|value| display_value(&value));
        if text.is_none() {
            sink.push(Diagnostic::BindingMiss {
                component_id: component.id.clone(),
                binding: key.to_string(),
            });
        }
        text
    }

    fn interpolate(
        &self,
        component: &Component,
        text: &str,
        scope: Scope<'a>,
        sink: &mut Vec<Diagnostic>,
    ) -> String {
        let Interpolation { text, misses } = scope.interpolate(text);
        sink.extend(misses.into_iter().map(|binding| Diagnostic::BindingMiss {
            component_id: component.id.clone(),
            binding,
        }));
        text
    }

    /// Absent or falsy keys omit the node silently; a conditional without a
    /// key never renders.
    fn condition_holds(&self, component: &Component, scope: Scope<'a>) -> bool {
        component
            .condition_key
            .as_deref()
            .and_then(|key| scope.resolve_key(key))
            .is_some_and(|value| is_truthy(&value))
    }

    fn resolve_list(
        &self,
        component: &Component,
        scope: Scope<'a>,
        row_path: &str,
        depth: usize,
        sink: &mut Vec<Diagnostic>,
    ) -> Vec<ResolvedNode> {
        let Some(template) = component.item_view.as_deref() else {
            // Unrolled by the composer: each child is already a row.
            return self.resolve_children(component, scope, row_path, depth, sink);
        };

        let name = component
            .key
            .as_deref()
            .unwrap_or(&self.options.default_collection);
        let Some(items) = self.collection(name, scope) else {
            sink.push(Diagnostic::BindingMiss {
                component_id: component.id.clone(),
                binding: name.to_string(),
            });
            return Vec::new();
        };

        // Rows depend on the template, the context, the palette, the binder
        // options and their depth, never on the enclosing scope.
        let template_fingerprint = self.cache.map(|_| {
            Fingerprint::combine(&[
                Fingerprint::of_json(template),
                self.context.fingerprint(),
                self.styles.fingerprint(),
                self.options.fingerprint(),
                Fingerprint::of_bytes(&(depth as u64).to_le_bytes()),
            ])
        });

        let mut rows = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let identity = format!("{row_path}{}[{index}]", component.id);
            let row_scope = scope.row(item);
            let resolve_row = |sink: &mut Vec<Diagnostic>| {
                self.resolve(template, row_scope, &format!("{identity}/"), depth + 1, sink)
            };

            let node = match (self.cache, template_fingerprint) {
                (Some(cache), Some(base)) => {
                    let key = CacheKey::new(
                        identity.as_str(),
                        Fingerprint::combine(&[base, Fingerprint::of_json(item)]),
                    );
                    match cache.get(&key) {
                        Some(view) => {
                            sink.extend(view.diagnostics);
                            view.node
                        }
                        None => {
                            let mut row_diagnostics = Vec::new();
                            let node = resolve_row(&mut row_diagnostics);
                            sink.extend(row_diagnostics.iter().cloned());
                            cache.put(
                                key,
                                CachedView {
                                    node: node.clone(),
                                    diagnostics: row_diagnostics,
                                },
                            );
                            node
                        }
                    }
                }
                _ => resolve_row(sink),
            };
            rows.extend(node);
        }
        rows
    }

    /// A row item's own array field wins over a context collection of the
    /// same name, so nested lists bind to the enclosing row.
    fn collection(&self, name: &str, scope: Scope<'a>) -> Option<&'a [Value]> {
        if let Some(item) = scope.item() {
            if let Some(Cow::Borrowed(Value::Array(items))) = crate::template::lookup(item, name) {
                return Some(items.as_slice());
            }
        }
        scope.context().bound_collection(name)
    }

    fn resolve_style(
        &self,
        component: &Component,
        scope: Scope<'a>,
        sink: &mut Vec<Diagnostic>,
    ) -> ResolvedStyle {
        let mut report = |error| {
            sink.push(Diagnostic::StyleParse {
                component_id: component.id.clone(),
                error,
            })
        };

        let font = component.font.as_deref().map(|token| {
            self.styles.parse_font(token).unwrap_or_else(|error| {
                report(error);
                self.styles.default_font()
            })
        });
        let mut color = |token: &str| {
            self.styles
                .try_resolve_color(token, &scope)
                .unwrap_or_else(|error| {
                    report(error);
                    self.styles.primary()
                })
        };
        let foreground = component.foreground_color.as_deref().map(&mut color);
        let background = component
            .background_color
            .as_deref()
            .map(&mut color)
            .filter(|fill| !fill.is_clear());

        ResolvedStyle {
            font,
            foreground,
            background,
            corner_radius: component.corner_radius,
            padding: component.padding,
        }
    }

    fn bind_action(
        &self,
        component: &Component,
        scope: Scope<'a>,
        sink: &mut Vec<Diagnostic>,
    ) -> Option<BoundAction> {
        let action_id = component.action_id.as_ref()?;
        if self.context.action(action_id).is_none() {
            sink.push(Diagnostic::ActionNotFound {
                component_id: component.id.clone(),
                action_id: action_id.clone(),
            });
        }
        Some(BoundAction {
            action_id: action_id.clone(),
            item: scope.item().cloned(),
        })
    }
}
