//! Render context: everything the binder may read during one pass
//!
//! [`ScreenContext`] is the only coupling between the interpreter and the
//! rest of the application. Profile, sync, weather and similar subsystems
//! feed it; the binder only ever asks for named values, bound collections and
//! action handlers.
//!
//! [`RenderContext`] is the stock implementation: an immutable snapshot built
//! with [`RenderContextBuilder`]. Rebuild it whenever application state
//! changes and render again.

use crate::actions::{ActionHandler, ActionRegistry, ActionRegistryBuilder};
use crate::cache::Fingerprint;
use crate::template::{self, display_value, Interpolation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Read-only view of application state for one render pass.
pub trait ScreenContext: Send + Sync {
    /// A named sequence of data items (e.g. the technician's jobs).
    fn bound_collection(&self, name: &str) -> Option<&[Value]>;

    /// A named value by dotted path (e.g. `user.name`).
    fn value(&self, path: &str) -> Option<Cow<'_, Value>>;

    /// Handler registered for an action id.
    fn action(&self, action_id: &str) -> Option<Arc<dyn ActionHandler>>;

    /// Auxiliary services handed to action handlers.
    fn services(&self) -> Services {
        Services::default()
    }

    /// Stable hash of the data this context exposes.
    ///
    /// Two contexts exposing the same values and collections must return
    /// the same fingerprint; the view cache relies on it.
    fn fingerprint(&self) -> Fingerprint;
}

/// Serializable data portion of a context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextData {
    /// Named values, addressed by dotted path
    #[serde(default)]
    pub values: Map<String, Value>,

    /// Bound collections by name
    #[serde(default)]
    pub collections: BTreeMap<String, Vec<Value>>,
}

impl ContextData {
    /// Set a value at a dotted path, creating intermediate objects.
    ///
    /// Intermediate non-object values are replaced.
    pub fn set(&mut self, path: &str, value: Value) {
        let mut segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
        let Some(last) = segments.pop() else {
            return;
        };
        let mut map = &mut self.values;
        for segment in segments {
            let entry = map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            let Value::Object(inner) = entry else {
                return;
            };
            map = inner;
        }
        map.insert(last.to_string(), value);
    }
}

/// Type map of auxiliary services (clock, geocoder, sync client...).
#[derive(Clone, Default)]
pub struct Services {
    entries: Arc<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl Services {
    pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|service| Arc::clone(service).downcast::<T>().ok())
    }

    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("count", &self.entries.len())
            .finish()
    }
}

/// Immutable context snapshot.
#[derive(Debug, Clone)]
pub struct RenderContext {
    data: ContextData,
    actions: ActionRegistry,
    services: Services,
    fingerprint: Fingerprint,
}

impl RenderContext {
    pub fn builder() -> RenderContextBuilder {
        RenderContextBuilder::default()
    }

    /// Context holding only data, with no actions or services.
    pub fn from_data(data: ContextData) -> Self {
        RenderContextBuilder {
            data,
            ..Default::default()
        }
        .build()
    }

    pub fn data(&self) -> &ContextData {
        &self.data
    }

    pub fn actions(&self) -> &ActionRegistry {
        &self.actions
    }

    /// Start a new builder seeded with this snapshot, for partial refreshes.
    pub fn to_builder(&self) -> RenderContextBuilder {
        RenderContextBuilder {
            data: self.data.clone(),
            actions: self.actions.to_builder(),
            services: (*self.services.entries).clone(),
        }
    }
}

impl ScreenContext for RenderContext {
    fn bound_collection(&self, name: &str) -> Option<&[Value]> {
        self.data.collections.get(name).map(Vec::as_slice)
    }

    fn value(&self, path: &str) -> Option<Cow<'_, Value>> {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };

        if let Some(root) = self.data.values.get(head) {
            return match rest {
                Some(rest) => template::lookup(root, rest),
                None => Some(Cow::Borrowed(root)),
            };
        }

        // `{{jobs.count}}` and friends address bound collections directly.
        let items = self.data.collections.get(head)?;
        match rest {
            Some(rest) => template::lookup_in_items(items, rest),
            None => None,
        }
    }

    fn action(&self, action_id: &str) -> Option<Arc<dyn ActionHandler>> {
        self.actions.handler(action_id)
    }

    fn services(&self) -> Services {
        self.services.clone()
    }

    fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }
}

/// Builder for [`RenderContext`].
#[derive(Default)]
pub struct RenderContextBuilder {
    data: ContextData,
    actions: ActionRegistryBuilder,
    services: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl RenderContextBuilder {
    /// Set a named value at a dotted path.
    pub fn value(mut self, path: &str, value: Value) -> Self {
        self.data.set(path, value);
        self
    }

    /// Merge a map of top-level values.
    pub fn values(mut self, values: Map<String, Value>) -> Self {
        self.data.values.extend(values);
        self
    }

    pub fn collection(mut self, name: impl Into<String>, items: Vec<Value>) -> Self {
        self.data.collections.insert(name.into(), items);
        self
    }

    pub fn action(mut self, action_id: impl Into<String>, handler: Arc<dyn ActionHandler>) -> Self {
        self.actions = self.actions.register(action_id, handler);
        self
    }

    pub fn service<T: Any + Send + Sync>(mut self, service: Arc<T>) -> Self {
        self.services.insert(TypeId::of::<T>(), service);
        self
    }

    pub fn build(self) -> RenderContext {
        let actions = self.actions.build();
        let fingerprint = Fingerprint::builder()
            .json(&self.data)
            .strs(actions.ids())
            .finish();
        RenderContext {
            data: self.data,
            actions,
            services: Services {
                entries: Arc::new(self.services),
            },
            fingerprint,
        }
    }
}

/// Where bindings are resolved during the walk: the context plus, inside a
/// list row, the row's data item.
#[derive(Clone, Copy)]
pub struct Scope<'a> {
    context: &'a dyn ScreenContext,
    item: Option<&'a Value>,
}

impl<'a> Scope<'a> {
    /// Top-level scope, outside any list.
    pub fn top(context: &'a dyn ScreenContext) -> Self {
        Self {
            context,
            item: None,
        }
    }

    /// Scope of one list row.
    pub fn row(&self, item: &'a Value) -> Self {
        Self {
            context: self.context,
            item: Some(item),
        }
    }

    pub fn context(&self) -> &'a dyn ScreenContext {
        self.context
    }

    /// The current row item, `None` at top level.
    pub fn item(&self) -> Option<&'a Value> {
        self.item
    }

    /// Resolve a `key` (or `conditionKey`) against the scoped item, or the
    /// context values outside a list.
    pub fn resolve_key(&self, path: &str) -> Option<Cow<'a, Value>> {
        match self.item {
            Some(item) => template::lookup(item, path),
            None => self.context.value(path),
        }
    }

    /// Interpolate `{{token}}` placeholders against context values.
    pub fn interpolate(&self, text: &str) -> Interpolation {
        template::interpolate(text, |path| {
            self.context.value(path).and_then(|v| display_value(&v))
        })
    }

    /// Interpolate placeholders against the row item first, then the
    /// context. Used for style tokens that vary per row.
    pub fn interpolate_scoped(&self, text: &str) -> Interpolation {
        template::interpolate(text, |path| {
            self.item
                .and_then(|item| template::lookup(item, path))
                .or_else(|| self.context.value(path))
                .and_then(|v| display_value(&v))
        })
    }
}

impl std::fmt::Debug for Scope<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope").field("item", &self.item).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::handler_fn;
    use serde_json::json;

    struct Clock {
        today: &'static str,
    }

    fn context() -> RenderContext {
        RenderContext::builder()
            .value("user.name", json!("Ava"))
            .value("user.role", json!("lead"))
            .value("weather.summary", json!("Sunny, 21°"))
            .collection("jobs", vec![json!({ "customerName": "A" }), json!({ "customerName": "B" })])
            .build()
    }

    #[test]
    fn values_resolve_by_dotted_path() {
        let ctx = context();
        assert_eq!(ctx.value("user.name").unwrap().as_ref(), &json!("Ava"));
        assert_eq!(
            ctx.value("user").unwrap().as_ref(),
            &json!({ "name": "Ava", "role": "lead" })
        );
        assert!(ctx.value("user.email").is_none());
        assert!(ctx.value("route.alertSummary").is_none());
    }

    #[test]
    fn collections_are_addressable_from_values() {
        let ctx = context();
        assert_eq!(ctx.value("jobs.count").unwrap().as_ref(), &json!(2));
        assert_eq!(ctx.value("jobs.1.customerName").unwrap().as_ref(), &json!("B"));
        assert!(ctx.value("jobs").is_none());
        assert_eq!(ctx.bound_collection("jobs").unwrap().len(), 2);
        assert!(ctx.bound_collection("routes").is_none());
    }

    #[test]
    fn set_replaces_scalar_intermediates() {
        let mut data = ContextData::default();
        data.set("route", json!("none"));
        data.set("route.name", json!("North"));
        assert_eq!(data.values["route"], json!({ "name": "North" }));

        data.set("", json!(1));
        assert_eq!(data.values.len(), 1);
    }

    #[test]
    fn fingerprint_tracks_data_not_identity() {
        let a = context();
        let b = context();
        assert_eq!(a.fingerprint(), b.fingerprint());

        let c = a.to_builder().value("user.name", json!("Bo")).build();
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn fingerprint_includes_registered_actions() {
        let plain = context();
        let with_action = plain
            .to_builder()
            .action("startJob", handler_fn(|_| async { Ok(()) }))
            .build();
        assert_ne!(plain.fingerprint(), with_action.fingerprint());
        assert!(with_action.action("startJob").is_some());
    }

    #[test]
    fn services_are_looked_up_by_type() {
        let ctx = RenderContext::builder()
            .service(Arc::new(Clock { today: "2026-10-19" }))
            .build();
        let services = ctx.services();
        assert_eq!(services.len(), 1);
        assert!(services.contains::<Clock>());
        assert_eq!(services.get::<Clock>().unwrap().today, "2026-10-19");
        assert!(services.get::<String>().is_none());
    }

    #[test]
    fn scope_prefers_row_item_for_keys() {
        let ctx = context();
        let top = Scope::top(&ctx);
        assert_eq!(top.resolve_key("user.name").unwrap().as_ref(), &json!("Ava"));

        let item = json!({ "customerName": "Acme", "user": { "name": "row user" } });
        let row = top.row(&item);
        assert_eq!(row.resolve_key("customerName").unwrap().as_ref(), &json!("Acme"));
        assert_eq!(row.resolve_key("user.name").unwrap().as_ref(), &json!("row user"));
        assert!(row.resolve_key("weather.summary").is_none());
    }

    #[test]
    fn tokens_ignore_row_scope() {
        let ctx = context();
        let item = json!({ "user": { "name": "row user" } });
        let row = Scope::top(&ctx).row(&item);
        assert_eq!(row.interpolate("Hi {{user.name}}").text, "Hi Ava");
        assert_eq!(row.interpolate_scoped("Hi {{user.name}}").text, "Hi row user");
    }
}
