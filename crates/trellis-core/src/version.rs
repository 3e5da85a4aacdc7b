//! Version gate
//!
//! Every document passes the gate before interpretation. Rejection is
//! terminal for that document: the caller substitutes a fallback screen and
//! nothing of the rejected tree is rendered. The binder only accepts an
//! [`AdmittedScreen`], which can only be obtained through [`VersionGate::admit`].

use crate::error::{Result, ScreenError};
use crate::model::{Screen, SCREEN_FORMAT_VERSION};
use std::ops::Deref;
use tracing::warn;

/// Gate outcome for one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Unchecked,
    Accepted,
    Rejected,
}

/// Supported document version range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionGate {
    min: Option<u32>,
    max: u32,
}

impl VersionGate {
    /// Accept every version up to and including `max_supported`.
    pub fn new(max_supported: u32) -> Self {
        Self {
            min: None,
            max: max_supported,
        }
    }

    /// Also reject versions below `min_supported`.
    pub fn with_minimum(mut self, min_supported: u32) -> Self {
        self.min = Some(min_supported);
        self
    }

    pub fn min(&self) -> Option<u32> {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn supports(&self, version: u32) -> bool {
        version <= self.max && self.min.map_or(true, |min| version >= min)
    }

    pub fn evaluate(&self, screen: &Screen) -> GateState {
        if self.supports(screen.version) {
            GateState::Accepted
        } else {
            GateState::Rejected
        }
    }

    /// Admit a document for interpretation.
    pub fn admit<'s>(&self, screen: &'s Screen) -> Result<AdmittedScreen<'s>> {
        match self.evaluate(screen) {
            GateState::Accepted => Ok(AdmittedScreen { screen }),
            _ => {
                warn!(
                    version = screen.version,
                    min = ?self.min,
                    max = self.max,
                    "Rejected screen with unsupported version"
                );
                Err(ScreenError::UnsupportedVersion {
                    version: screen.version,
                    min: self.min,
                    max: self.max,
                })
            }
        }
    }
}

impl Default for VersionGate {
    fn default() -> Self {
        Self::new(SCREEN_FORMAT_VERSION)
    }
}

/// A document that passed the gate.
#[derive(Debug, Clone, Copy)]
pub struct AdmittedScreen<'s> {
    screen: &'s Screen,
}

impl<'s> AdmittedScreen<'s> {
    pub fn screen(&self) -> &'s Screen {
        self.screen
    }
}

impl Deref for AdmittedScreen<'_> {
    type Target = Screen;

    fn deref(&self) -> &Screen {
        self.screen
    }
}
