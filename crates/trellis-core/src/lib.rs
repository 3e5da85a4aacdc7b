//! # Trellis Core
//!
//! Document model and client-side interpreter for server-driven screens.
//!
//! A [`Screen`] is a versioned tree of [`Component`]s. Rendering one goes
//! through three steps:
//!
//! 1. the [`VersionGate`] admits (or rejects) the document,
//! 2. the [`Binder`] walks the admitted tree against a [`ScreenContext`]
//!    snapshot, resolving `key` bindings, `{{token}}` placeholders,
//!    conditionals, list templates and style tokens,
//! 3. interactive nodes come out carrying a [`BoundAction`] which the
//!    [`ActionDispatcher`] routes to registered handlers.
//!
//! Binding, style and action problems never fail a render. They are recorded
//! as [`Diagnostic`]s on the [`RenderOutput`] and the affected fragment
//! degrades on its own. Only fetch and version errors ([`ScreenError`]) reach
//! the caller.
//!
//! ```rust
//! use serde_json::json;
//! use trellis_core::{Binder, Component, RenderContext, Screen, StyleResolver, VersionGate};
//!
//! let screen = Screen::new(1, Component::text("greeting", "Good day, {{user.name}}"));
//! let context = RenderContext::builder().value("user.name", json!("Ava")).build();
//! let styles = StyleResolver::default();
//!
//! let admitted = VersionGate::new(1).admit(&screen).unwrap();
//! let output = Binder::new(&context, &styles).render(&admitted);
//! assert_eq!(output.texts(), vec!["Good day, Ava"]);
//! ```

pub mod actions;
pub mod binder;
pub mod cache;
pub mod client;
pub mod context;
pub mod error;
pub mod model;
pub mod registry;
pub mod request;
pub mod session;
pub mod style;
pub mod template;
pub mod version;

#[cfg(any(test, feature = "test-utils"))]
pub mod proptest_strategies;

#[cfg(test)]
mod properties;

pub use actions::{
    handler_fn, ActionDispatcher, ActionHandler, ActionInvocation, ActionRegistry,
    ActionRegistryBuilder, Dispatch, FnHandler, InvokeOutcome, RenderTrigger,
};
pub use binder::{
    Binder, BinderOptions, BoundAction, RenderOutput, Resolved, ResolvedNode, ResolvedStyle,
};
pub use cache::{
    CacheConfig, CacheKey, CacheStats, CachedView, Fingerprint, FingerprintBuilder, ViewCache,
};
pub use client::{ScreenClient, ScreenLoader, DEFAULT_TIMEOUT};
pub use context::{ContextData, RenderContext, RenderContextBuilder, Scope, ScreenContext, Services};
pub use error::{Diagnostic, FetchError, Result, ScreenError, StyleParseError};
pub use model::{
    Component, ComponentKind, Screen, ValidationIssue, ValidationReport, DEFAULT_MAX_DEPTH,
    SCREEN_FORMAT_VERSION,
};
pub use registry::{Registry, RegistryBuilder};
pub use request::ScreenRequest;
pub use session::{
    FetchOutcome, FetchTicket, RenderSession, RenderView, SessionOptions, UNSUPPORTED_MESSAGE,
};
pub use style::{Color, Font, FontWeight, Palette, StyleResolver, TextStyle};
pub use version::{AdmittedScreen, GateState, VersionGate};
