use crate::composer::ComposerRegistry;
use crate::directory::Directory;
use std::sync::Arc;
use std::time::Duration;

/// Shared state for the screen routes
#[derive(Clone, Debug)]
pub struct AppState {
    pub composers: ComposerRegistry,
    /// Upper bound on a single composition
    pub compose_timeout: Duration,
}

impl AppState {
    pub fn new(composers: ComposerRegistry) -> Self {
        Self {
            composers,
            compose_timeout: Duration::from_secs(30),
        }
    }

    /// Built-in composers over `directory`.
    pub fn with_directory(directory: Arc<dyn Directory>) -> Self {
        Self::new(ComposerRegistry::with_defaults(directory))
    }

    pub fn compose_timeout(mut self, timeout: Duration) -> Self {
        self.compose_timeout = timeout;
        self
    }
}
