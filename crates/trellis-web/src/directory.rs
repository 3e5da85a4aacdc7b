//! Backing data for the composer
//!
//! The composer only reads technicians and routes. Where they live is up to
//! the deployment; [`InMemoryDirectory`] serves a JSON snapshot.
//!
//! Lookups distinguish "not there" (`Ok(None)`, the composer degrades to a
//! generic screen) from "could not look" (`Err`, the request fails with 500).

use anyhow::Context as _;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[async_trait]
pub trait Directory: Send + Sync {
    async fn find_technician(&self, user_id: &str) -> anyhow::Result<Option<Technician>>;

    /// Route `route_id`, restricted to `service_date` when one is given.
    async fn find_route(
        &self,
        route_id: &str,
        service_date: Option<NaiveDate>,
    ) -> anyhow::Result<Option<Route>>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Technician {
    pub id: String,
    pub name: String,
    /// Route shown when the request names none
    #[serde(default)]
    pub route_id: Option<String>,
}

impl Technician {
    /// Given name for greetings
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: String,
    pub name: String,
    /// Day the route runs; `None` matches every day
    #[serde(default)]
    pub service_date: Option<NaiveDate>,
    #[serde(default)]
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub customer_name: String,
    pub address: String,
    #[serde(default)]
    pub window: Option<String>,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub priority: Priority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JobStatus {
    #[default]
    Scheduled,
    EnRoute,
    InProgress,
    Completed,
}

impl JobStatus {
    /// Semantic color token for status text
    pub fn color_token(&self) -> &'static str {
        match self {
            Self::Scheduled => "secondary",
            Self::EnRoute => "accent",
            Self::InProgress => "warning",
            Self::Completed => "success",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    Urgent,
}

/// JSON layout of a directory snapshot
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Snapshot {
    technicians: Vec<Technician>,
    routes: Vec<Route>,
}

/// Directory held in memory
#[derive(Debug, Default, Clone)]
pub struct InMemoryDirectory {
    technicians: HashMap<String, Technician>,
    routes: HashMap<String, Vec<Route>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_technician(mut self, technician: Technician) -> Self {
        self.technicians.insert(technician.id.clone(), technician);
        self
    }

    pub fn with_route(mut self, route: Route) -> Self {
        self.routes.entry(route.id.clone()).or_default().push(route);
        self
    }

    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(json).context("invalid directory JSON")?;
        let directory = snapshot
            .technicians
            .into_iter()
            .fold(Self::new(), Self::with_technician);
        Ok(snapshot.routes.into_iter().fold(directory, Self::with_route))
    }

    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read directory {}", path.display()))?;
        Self::from_json_str(&json)
    }

    /// Small built-in data set for demos and tests.
    pub fn sample() -> Self {
        let day = NaiveDate::from_ymd_opt(2026, 3, 2);
        Self::new()
            .with_technician(Technician {
                id: "tech-7".into(),
                name: "Ava Reyes".into(),
                route_id: Some("route-12".into()),
            })
            .with_technician(Technician {
                id: "tech-9".into(),
                name: "Malik Osei".into(),
                route_id: None,
            })
            .with_route(Route {
                id: "route-12".into(),
                name: "North Loop".into(),
                service_date: day,
                jobs: vec![
                    Job {
                        id: "job-101".into(),
                        customer_name: "Harbor Bakery".into(),
                        address: "14 Pier St".into(),
                        window: Some("8-10am".into()),
                        status: JobStatus::Completed,
                        priority: Priority::Normal,
                    },
                    Job {
                        id: "job-102".into(),
                        customer_name: "Lindqvist Dental".into(),
                        address: "220 Elm Ave".into(),
                        window: Some("10am-12pm".into()),
                        status: JobStatus::InProgress,
                        priority: Priority::Urgent,
                    },
                    Job {
                        id: "job-103".into(),
                        customer_name: "Copper Kettle Cafe".into(),
                        address: "9 Mill Rd".into(),
                        window: None,
                        status: JobStatus::Scheduled,
                        priority: Priority::Low,
                    },
                ],
            })
    }
}

#[async_trait]
impl Directory for InMemoryDirectory {
    async fn find_technician(&self, user_id: &str) -> anyhow::Result<Option<Technician>> {
        Ok(self.technicians.get(user_id).cloned())
    }

    async fn find_route(
        &self,
        route_id: &str,
        service_date: Option<NaiveDate>,
    ) -> anyhow::Result<Option<Route>> {
        let Some(candidates) = self.routes.get(route_id) else {
            return Ok(None);
        };
        let found = candidates.iter().find(|route| match (route.service_date, service_date) {
            (Some(runs_on), Some(requested)) => runs_on == requested,
            _ => true,
        });
        Ok(found.cloned())
    }
}
