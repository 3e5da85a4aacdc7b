//! Palette overrides
//!
//! Entries map a semantic color name to a hex literal, e.g.
//! `accent = "#FF8800"`. Names are matched case-insensitively by the
//! style resolver; values are validated when the resolver is built.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub palette: BTreeMap<String, String>,
}
