//! Trellis screen server
//!
//! Composes personalized screen documents and serves them at
//! `GET /screens/{screenId}`.

pub mod composer;
pub mod directory;
pub mod routes;
pub mod server;
pub mod state;

mod error;

pub use composer::{ComposeError, ComposerRegistry, ScreenComposer};
pub use directory::{Directory, InMemoryDirectory};
pub use error::{Result, WebError};
pub use server::{build_router, start_server};
pub use state::AppState;
