//! Render session: one screen slot on the client
//!
//! A session owns everything a render pass needs besides the context: the
//! version gate, the style resolver and the view cache. They are injected per
//! session instead of living in process-wide singletons, so sessions (and
//! tests) never share state.
//!
//! Fetches are sequenced. [`RenderSession::begin_fetch`] hands out a ticket
//! with a monotonically increasing number; a completion whose ticket is not
//! the latest is discarded, so a slow response can never overwrite the
//! document of a newer request.

use crate::actions::{ActionDispatcher, RenderTrigger};
use crate::binder::{Binder, BinderOptions, RenderOutput};
use crate::cache::{CacheConfig, CacheStats, ViewCache};
use crate::context::ScreenContext;
use crate::error::{FetchError, ScreenError};
use crate::model::Screen;
use crate::style::StyleResolver;
use crate::version::VersionGate;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shown in place of a document the gate rejected.
pub const UNSUPPORTED_MESSAGE: &str = "This screen needs a newer version of the app.";

/// Session configuration.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub gate: VersionGate,
    pub binder: BinderOptions,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone)]
enum SessionState {
    Idle,
    Loading,
    Ready(Arc<Screen>),
    Unsupported(Arc<ScreenError>),
    Failed(Arc<ScreenError>),
}

/// Proof that a fetch was started; pass it back on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

/// What happened to a completed fetch.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// The document is now current
    Applied,
    /// The gate rejected the document; the fallback screen is shown
    Rejected(Arc<ScreenError>),
    /// Transport or decoding failed; the error state is shown
    Failed(Arc<ScreenError>),
    /// A newer fetch was started meanwhile; the response was dropped
    Stale,
}

impl FetchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    pub fn error(&self) -> Option<&ScreenError> {
        match self {
            Self::Rejected(error) | Self::Failed(error) => Some(error),
            Self::Applied | Self::Stale => None,
        }
    }
}

/// What the host should display.
#[derive(Debug, Clone)]
pub enum RenderView {
    /// No document yet; show a skeleton
    Loading,
    /// The current document, interpreted
    Screen(RenderOutput),
    /// The document was rejected; this is the substitute screen
    Fallback(RenderOutput),
    /// Fetch failed; show an error with retry
    Failed(Arc<ScreenError>),
}

pub struct RenderSession {
    options: SessionOptions,
    styles: StyleResolver,
    cache: ViewCache,
    trigger: RenderTrigger,
    sequence: AtomicU64,
    state: RwLock<SessionState>,
}

impl RenderSession {
    pub fn new(options: SessionOptions, styles: StyleResolver) -> Self {
        Self {
            cache: ViewCache::with_config(options.cache.clone()),
            options,
            styles,
            trigger: RenderTrigger::new(),
            sequence: AtomicU64::new(0),
            state: RwLock::new(SessionState::Idle),
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Start a fetch. Any fetch still in flight becomes stale.
    pub fn begin_fetch(&self) -> FetchTicket {
        let mut state = self.state.write();
        let ticket = FetchTicket(self.sequence.fetch_add(1, Ordering::SeqCst) + 1);
        *state = SessionState::Loading;
        debug!(sequence = ticket.0, "Screen fetch started");
        ticket
    }

    /// Apply the result of the fetch identified by `ticket`.
    pub fn complete_fetch(
        &self,
        ticket: FetchTicket,
        result: Result<Screen, FetchError>,
    ) -> FetchOutcome {
        let mut state = self.state.write();
        let latest = self.sequence.load(Ordering::SeqCst);
        if ticket.0 != latest {
            debug!(sequence = ticket.0, latest, "Discarding stale screen response");
            return FetchOutcome::Stale;
        }

        let outcome = match result {
            Ok(screen) => match self.options.gate.admit(&screen) {
                Ok(_) => {
                    info!(
                        root = %screen.component.id,
                        version = screen.version,
                        "Screen loaded"
                    );
                    self.cache.clear();
                    *state = SessionState::Ready(Arc::new(screen));
                    FetchOutcome::Applied
                }
                Err(error) => {
                    let error = Arc::new(error);
                    *state = SessionState::Unsupported(Arc::clone(&error));
                    FetchOutcome::Rejected(error)
                }
            },
            Err(error) => {
                warn!(error = %error, "Screen fetch failed");
                let error = Arc::new(ScreenError::Fetch(error));
                *state = SessionState::Failed(Arc::clone(&error));
                FetchOutcome::Failed(error)
            }
        };
        self.trigger.request_render();
        outcome
    }

    /// Install a document obtained without the network (bundled, tests).
    pub fn load_screen(&self, screen: Screen) -> FetchOutcome {
        let ticket = self.begin_fetch();
        self.complete_fetch(ticket, Ok(screen))
    }

    /// The current document, if one is loaded.
    pub fn screen(&self) -> Option<Arc<Screen>> {
        match &*self.state.read() {
            SessionState::Ready(screen) => Some(Arc::clone(screen)),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(*self.state.read(), SessionState::Loading)
    }

    /// Interpret the current document against a context snapshot.
    pub fn render(&self, context: &dyn ScreenContext) -> RenderView {
        let state = self.state.read().clone();
        match state {
            SessionState::Idle | SessionState::Loading => RenderView::Loading,
            SessionState::Failed(error) => RenderView::Failed(error),
            SessionState::Ready(screen) => {
                let admitted = match self.options.gate.admit(&screen) {
                    Ok(admitted) => admitted,
                    Err(error) => return RenderView::Failed(Arc::new(error)),
                };
                let output = self
                    .binder(context)
                    .with_cache(&self.cache)
                    .render(&admitted);
                RenderView::Screen(output)
            }
            SessionState::Unsupported(_) => {
                let fallback = Screen::fallback(self.options.gate.max(), UNSUPPORTED_MESSAGE);
                let output = match self.options.gate.admit(&fallback) {
                    Ok(admitted) => self.binder(context).render(&admitted),
                    Err(error) => return RenderView::Failed(Arc::new(error)),
                };
                RenderView::Fallback(output)
            }
        }
    }

    /// Dispatcher whose completed actions wake this session's render loop.
    pub fn dispatcher(&self, context: Arc<dyn ScreenContext>) -> ActionDispatcher {
        ActionDispatcher::new(context).with_trigger(self.trigger.clone())
    }

    pub fn trigger(&self) -> &RenderTrigger {
        &self.trigger
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn binder<'a>(&'a self, context: &'a dyn ScreenContext) -> Binder<'a> {
        Binder::new(context, &self.styles).with_options(self.options.binder.clone())
    }
}

impl Default for RenderSession {
    fn default() -> Self {
        Self::new(SessionOptions::default(), StyleResolver::default())
    }
}

impl std::fmt::Debug for RenderSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSession")
            .field("sequence", &self.sequence.load(Ordering::SeqCst))
            .field("state", &*self.state.read())
            .finish_non_exhaustive()
    }
}
