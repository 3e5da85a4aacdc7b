//! Action handlers and dispatch
//!
//! Interactive components carry an `actionId`. The binder turns that into a
//! [`BoundAction`] holding the row item in scope, and the
//! [`ActionDispatcher`] routes it to the handler the context registered for
//! that id.
//!
//! Handlers are async and may touch shared application state (start a job,
//! queue a sync). They never mutate the rendered tree: when they finish they
//! bump the [`RenderTrigger`], and the app builds a fresh context and renders
//! again.
//!
//! Unknown action ids are logged and ignored. Dispatch never fails the
//! caller.

use crate::binder::BoundAction;
use crate::context::{ScreenContext, Services};
use crate::registry::{Registry, RegistryBuilder};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// What a handler receives when its action fires.
#[derive(Debug, Clone)]
pub struct ActionInvocation {
    pub action_id: String,
    /// Row item in scope when the action was bound, `None` at top level
    pub item: Option<Value>,
    pub services: Services,
}

/// Handler for one action id.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn handle(&self, invocation: ActionInvocation) -> anyhow::Result<()>;
}

/// Adapter turning an async closure into an [`ActionHandler`].
pub struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> ActionHandler for FnHandler<F>
where
    F: Fn(ActionInvocation) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn handle(&self, invocation: ActionInvocation) -> anyhow::Result<()> {
        (self.0)(invocation).await
    }
}

/// Wrap an async closure as a shareable handler.
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn ActionHandler>
where
    F: Fn(ActionInvocation) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(FnHandler(f))
}

/// Immutable table of action handlers by id.
#[derive(Clone, Default)]
pub struct ActionRegistry {
    handlers: Arc<HashMap<String, Arc<dyn ActionHandler>>>,
}

impl ActionRegistry {
    pub fn builder() -> ActionRegistryBuilder {
        ActionRegistryBuilder::default()
    }

    /// Shared handle to the handler for `action_id`.
    pub fn handler(&self, action_id: &str) -> Option<Arc<dyn ActionHandler>> {
        self.handlers.get(action_id).cloned()
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Builder seeded with these handlers.
    pub fn to_builder(&self) -> ActionRegistryBuilder {
        ActionRegistryBuilder {
            handlers: (*self.handlers).clone(),
        }
    }
}

impl Registry for ActionRegistry {
    type Key = String;
    type Value = Arc<dyn ActionHandler>;

    fn get<Q>(&self, key: &Q) -> Option<&Self::Value>
    where
        Self::Key: std::borrow::Borrow<Q>,
        Q: ?Sized + Eq + std::hash::Hash,
    {
        self.handlers.get(key)
    }

    fn keys(&self) -> Vec<&String> {
        let mut keys: Vec<&String> = self.handlers.keys().collect();
        keys.sort_unstable();
        keys
    }

    fn len(&self) -> usize {
        self.handlers.len()
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.ids())
            .finish()
    }
}

#[derive(Default)]
pub struct ActionRegistryBuilder {
    handlers: HashMap<String, Arc<dyn ActionHandler>>,
}

impl ActionRegistryBuilder {
    /// Register a handler. A later registration for the same id wins.
    pub fn register(mut self, action_id: impl Into<String>, handler: Arc<dyn ActionHandler>) -> Self {
        self.handlers.insert(action_id.into(), handler);
        self
    }

    pub fn build(self) -> ActionRegistry {
        ActionRegistry {
            handlers: Arc::new(self.handlers),
        }
    }
}

impl RegistryBuilder for ActionRegistryBuilder {
    type Registry = ActionRegistry;

    fn insert(self, key: String, value: Arc<dyn ActionHandler>) -> Self {
        self.register(key, value)
    }

    fn build(self) -> ActionRegistry {
        ActionRegistryBuilder::build(self)
    }
}

/// Re-render signal. Each completed action bumps the generation; render
/// loops wait on [`RenderTrigger::subscribe`].
#[derive(Debug, Clone)]
pub struct RenderTrigger {
    sender: Arc<watch::Sender<u64>>,
}

impl RenderTrigger {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(0);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn request_render(&self) {
        self.sender.send_modify(|generation| *generation += 1);
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.sender.subscribe()
    }

    pub fn generation(&self) -> u64 {
        *self.sender.borrow()
    }
}

impl Default for RenderTrigger {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of [`ActionDispatcher::dispatch`].
#[derive(Debug)]
pub enum Dispatch {
    /// Handler running on the current runtime
    Spawned(JoinHandle<InvokeOutcome>),
    /// No handler registered; logged and ignored
    NotFound,
    /// Called outside a tokio runtime; logged and ignored
    NoRuntime,
}

impl Dispatch {
    pub fn is_spawned(&self) -> bool {
        matches!(self, Self::Spawned(_))
    }
}

/// Result of running a handler to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeOutcome {
    Completed,
    HandlerFailed,
    NotFound,
}

/// Routes action ids to the handlers of one context snapshot.
pub struct ActionDispatcher {
    context: Arc<dyn ScreenContext>,
    trigger: Option<RenderTrigger>,
}

impl ActionDispatcher {
    pub fn new(context: Arc<dyn ScreenContext>) -> Self {
        Self {
            context,
            trigger: None,
        }
    }

    /// Bump `trigger` after every successful handler.
    pub fn with_trigger(mut self, trigger: RenderTrigger) -> Self {
        self.trigger = Some(trigger);
        self
    }

    /// Fire an action without waiting for it.
    ///
    /// The handler runs on the ambient tokio runtime so the caller (usually
    /// a UI event callback) never blocks on it.
    pub fn dispatch(&self, action_id: &str, item: Option<&Value>) -> Dispatch {
        let Some(handler) = self.lookup(action_id) else {
            return Dispatch::NotFound;
        };
        let Ok(runtime) = Handle::try_current() else {
            warn!(action_id, "Cannot dispatch action outside a tokio runtime");
            return Dispatch::NoRuntime;
        };
        let invocation = self.invocation(action_id, item);
        let trigger = self.trigger.clone();
        Dispatch::Spawned(runtime.spawn(run_handler(handler, invocation, trigger)))
    }

    /// Fire the action carried by a resolved node.
    pub fn dispatch_bound(&self, action: &BoundAction) -> Dispatch {
        self.dispatch(&action.action_id, action.item.as_ref())
    }

    /// Run an action to completion.
    pub async fn invoke(&self, action_id: &str, item: Option<&Value>) -> InvokeOutcome {
        let Some(handler) = self.lookup(action_id) else {
            return InvokeOutcome::NotFound;
        };
        let invocation = self.invocation(action_id, item);
        run_handler(handler, invocation, self.trigger.clone()).await
    }

    fn lookup(&self, action_id: &str) -> Option<Arc<dyn ActionHandler>> {
        let handler = self.context.action(action_id);
        if handler.is_none() {
            warn!(action_id, "No handler registered for action");
        }
        handler
    }

    fn invocation(&self, action_id: &str, item: Option<&Value>) -> ActionInvocation {
        ActionInvocation {
            action_id: action_id.to_string(),
            item: item.cloned(),
            services: self.context.services(),
        }
    }
}

impl fmt::Debug for ActionDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDispatcher")
            .field("trigger", &self.trigger)
            .finish_non_exhaustive()
    }
}

async fn run_handler(
    handler: Arc<dyn ActionHandler>,
    invocation: ActionInvocation,
    trigger: Option<RenderTrigger>,
) -> InvokeOutcome {
    let action_id = invocation.action_id.clone();
    match handler.handle(invocation).await {
        Ok(()) => {
            debug!(action_id = %action_id, "Action completed");
            if let Some(trigger) = trigger {
                trigger.request_render();
            }
            InvokeOutcome::Completed
        }
        Err(error) => {
            warn!(action_id = %action_id, error = %error, "Action handler failed");
            InvokeOutcome::HandlerFailed
        }
    }
}
