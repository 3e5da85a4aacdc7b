//! Screen request parameters
//!
//! Everything the composer personalizes on. Serialized as the query string of
//! `GET /screens/{screenId}`.

use chrono::{DateTime, FixedOffset, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScreenRequest {
    /// Path parameter, not part of the query
    #[serde(skip)]
    pub screen_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_id: Option<String>,
    /// RFC 3339 on the wire. The offset is kept: the service day and the
    /// time of day are read in the caller's zone.
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none"
    )]
    pub service_date: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
    /// BCP 47 tag, e.g. `es-MX`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl ScreenRequest {
    pub fn new(screen_id: impl Into<String>) -> Self {
        Self {
            screen_id: screen_id.into(),
            ..Default::default()
        }
    }

    pub fn user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn route(mut self, route_id: impl Into<String>) -> Self {
        self.route_id = Some(route_id.into());
        self
    }

    pub fn service_date<Tz: TimeZone>(mut self, date: DateTime<Tz>) -> Self {
        self.service_date = Some(date.fixed_offset());
        self
    }

    pub fn device(mut self, model: impl Into<String>) -> Self {
        self.device_model = Some(model.into());
        self
    }

    pub fn app_version(mut self, version: impl Into<String>) -> Self {
        self.app_version = Some(version.into());
        self
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// `userId`, treating an empty query value as absent.
    pub fn user_id(&self) -> Option<&str> {
        non_blank(&self.user_id)
    }

    pub fn route_id(&self) -> Option<&str> {
        non_blank(&self.route_id)
    }

    /// Primary language subtag of the locale, lowercased (`es-MX` → `es`).
    pub fn language(&self) -> Option<String> {
        non_blank(&self.locale)
            .and_then(|locale| locale.split(|c: char| c == '-' || c == '_').next())
            .map(str::to_ascii_lowercase)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// An empty `serviceDate=` decodes as absent rather than failing.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<DateTime<FixedOffset>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match non_blank(&raw) {
        Some(text) => DateTime::parse_from_rfc3339(text)
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}
