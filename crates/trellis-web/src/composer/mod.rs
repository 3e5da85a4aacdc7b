//! Screen composition
//!
//! A [`ScreenComposer`] turns a [`ScreenRequest`] into a [`Screen`]. Composers
//! are looked up by screen id in a [`ComposerRegistry`]. Both built-in
//! composers read the same [`Directory`] and degrade to generic content when a
//! lookup comes back empty.

mod dashboard;
mod route;
pub mod strings;

pub use dashboard::DashboardComposer;
pub use route::RouteComposer;
pub use strings::Strings;

use crate::directory::{Directory, Route, Technician};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use trellis_core::{Registry, RegistryBuilder, Screen, ScreenRequest};

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("No composer for screen '{0}'")]
    NotFound(String),

    #[error("Invalid screen request: {0}")]
    InvalidRequest(String),

    #[error("Directory lookup failed: {0}")]
    Directory(#[from] anyhow::Error),

    #[error("Composition timed out after {0:?}")]
    TimedOut(Duration),
}

pub type Result<T> = std::result::Result<T, ComposeError>;

/// Builds one kind of screen.
///
/// Output must depend only on the request and the backing data. Nothing may
/// read the wall clock.
#[async_trait]
pub trait ScreenComposer: Send + Sync {
    async fn compose(&self, request: &ScreenRequest) -> Result<Screen>;
}

/// Screen ids mapped to their composers
#[derive(Clone, Default)]
pub struct ComposerRegistry {
    composers: Arc<HashMap<String, Arc<dyn ScreenComposer>>>,
}

impl ComposerRegistry {
    pub fn builder() -> ComposerRegistryBuilder {
        ComposerRegistryBuilder::default()
    }

    /// `dashboard` and `route`, both backed by `directory`.
    pub fn with_defaults(directory: Arc<dyn Directory>) -> Self {
        Self::builder()
            .insert(
                "dashboard".to_string(),
                Arc::new(DashboardComposer::new(Arc::clone(&directory))),
            )
            .insert("route".to_string(), Arc::new(RouteComposer::new(directory)))
            .build()
    }

    /// Dispatch to the composer registered for `request.screen_id`.
    pub async fn compose(&self, request: &ScreenRequest) -> Result<Screen> {
        let screen_id = request.screen_id.trim();
        if screen_id.is_empty() {
            return Err(ComposeError::InvalidRequest("screenId is required".into()));
        }
        let composer = self
            .get(screen_id)
            .ok_or_else(|| ComposeError::NotFound(screen_id.to_string()))?;
        debug!(screen_id, user_id = ?request.user_id(), "Composing screen");
        composer.compose(request).await
    }

    pub fn screen_ids(&self) -> Vec<&str> {
        self.keys().into_iter().map(String::as_str).collect()
    }
}

impl Registry for ComposerRegistry {
    type Key = String;
    type Value = Arc<dyn ScreenComposer>;

    fn get<Q>(&self, key: &Q) -> Option<&Self::Value>
    where
        Self::Key: std::borrow::Borrow<Q>,
        Q: ?Sized + Eq + std::hash::Hash,
    {
        self.composers.get(key)
    }

    fn keys(&self) -> Vec<&String> {
        let mut keys: Vec<&String> = self.composers.keys().collect();
        keys.sort_unstable();
        keys
    }

    fn len(&self) -> usize {
        self.composers.len()
    }
}

impl fmt::Debug for ComposerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposerRegistry")
            .field("screens", &self.screen_ids())
            .finish()
    }
}

#[derive(Default)]
pub struct ComposerRegistryBuilder {
    composers: HashMap<String, Arc<dyn ScreenComposer>>,
}

impl RegistryBuilder for ComposerRegistryBuilder {
    type Registry = ComposerRegistry;

    fn insert(mut self, key: String, value: Arc<dyn ScreenComposer>) -> Self {
        self.composers.insert(key, value);
        self
    }

    fn build(self) -> ComposerRegistry {
        ComposerRegistry {
            composers: Arc::new(self.composers),
        }
    }
}

/// What the directory knows about the requester
pub(crate) struct Personalization {
    pub technician: Option<Technician>,
    pub route: Option<Route>,
    pub strings: &'static Strings,
}

impl Personalization {
    /// Look up the technician, then the requested route or the technician's
    /// own. Misses are `None`; only directory failures are errors.
    pub async fn lookup(directory: &dyn Directory, request: &ScreenRequest) -> Result<Self> {
        let technician = match request.user_id() {
            Some(user_id) => directory.find_technician(user_id).await?,
            None => None,
        };
        let route_id = request
            .route_id()
            .map(str::to_string)
            .or_else(|| technician.as_ref().and_then(|t| t.route_id.clone()));
        // Calendar day in the caller's offset, not in UTC.
        let service_date = request.service_date.map(|date| date.date_naive());
        let route = match route_id {
            Some(route_id) => directory.find_route(&route_id, service_date).await?,
            None => None,
        };
        if technician.is_none() || route.is_none() {
            debug!(
                screen_id = %request.screen_id,
                technician = technician.is_some(),
                route = route.is_some(),
                "Personalization incomplete, using defaults"
            );
        }
        let language = request.language();
        Ok(Self {
            technician,
            route,
            strings: strings::for_language(language.as_deref()),
        })
    }

    pub fn first_name(&self) -> Option<&str> {
        self.technician.as_ref().map(Technician::first_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::InMemoryDirectory;

    fn registry() -> ComposerRegistry {
        ComposerRegistry::with_defaults(Arc::new(InMemoryDirectory::sample()))
    }

    #[test]
    fn test_default_screens() {
        let registry = registry();
        assert_eq!(registry.screen_ids(), vec!["dashboard", "route"]);
        assert!(registry.contains("dashboard"));
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_screen() {
        let err = registry().compose(&ScreenRequest::new("settings")).await.unwrap_err();
        assert!(matches!(err, ComposeError::NotFound(id) if id == "settings"));
    }

    #[tokio::test]
    async fn test_blank_screen_id() {
        let err = registry().compose(&ScreenRequest::new("  ")).await.unwrap_err();
        assert!(matches!(err, ComposeError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_route_falls_back_to_technician_default() {
        let directory = InMemoryDirectory::sample();
        let request = ScreenRequest::new("dashboard").user("tech-7");
        let found = Personalization::lookup(&directory, &request).await.unwrap();
        assert_eq!(found.first_name(), Some("Ava"));
        assert_eq!(found.route.unwrap().id, "route-12");
    }

    #[tokio::test]
    async fn test_lookup_misses_are_not_errors() {
        let directory = InMemoryDirectory::sample();
        let request = ScreenRequest::new("dashboard").user("ghost").route("nowhere").locale("fr-CA");
        let found = Personalization::lookup(&directory, &request).await.unwrap();
        assert!(found.technician.is_none());
        assert!(found.route.is_none());
        assert_eq!(found.strings.language, "fr");
    }
}
