//! Technician dashboard
//!
//! Rows are left to the client: the app already holds the day's jobs, so the
//! screen carries a single `jobs` list with an item template, plus
//! `{{token}}` placeholders for counts the client knows better.

use super::{Personalization, Result, ScreenComposer};
use crate::directory::Directory;
use async_trait::async_trait;
use std::sync::Arc;
use trellis_core::{Component, Screen, ScreenRequest, SCREEN_FORMAT_VERSION};

pub struct DashboardComposer {
    directory: Arc<dyn Directory>,
}

impl DashboardComposer {
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl ScreenComposer for DashboardComposer {
    async fn compose(&self, request: &ScreenRequest) -> Result<Screen> {
        let found = Personalization::lookup(self.directory.as_ref(), request).await?;
        let text = found.strings;

        let route_line = match &found.route {
            Some(route) => Component::text("routeName", route.name.as_str()),
            None => Component::text("routeName", text.no_route_title),
        }
        .font("subheadline")
        .foreground("secondary");

        let header = Component::vstack(
            "header",
            vec![
                Component::text("greeting", text.greeting(request.service_date, found.first_name()))
                    .font("title2"),
                route_line,
            ],
        )
        .spacing(4.0);

        let weather = Component::conditional(
            "weatherCard",
            "weather.summary",
            vec![Component::hstack(
                "weatherRow",
                vec![
                    Component::image("weatherIcon", "cloud.sun"),
                    Component::text("weatherSummary", "{{weather.summary}}"),
                ],
            )
            .spacing(8.0)
            .padding(12.0)
            .background("surface")
            .corner_radius(8.0)],
        );

        let sync_banner = Component::conditional(
            "syncBanner",
            "sync.pendingCount",
            vec![Component::text("syncPending", text.pending_sync)
                .font("footnote")
                .foreground("warning")],
        );

        let job_row = Component::hstack(
            "jobRow",
            vec![
                Component::vstack(
                    "jobInfo",
                    vec![
                        Component::bound_text("customer", "customerName").font("headline"),
                        Component::bound_text("address", "address")
                            .font("subheadline")
                            .foreground("secondary"),
                        Component::conditional(
                            "urgentBadge",
                            "urgent",
                            vec![Component::text("urgentLabel", text.urgent)
                                .font("caption.bold")
                                .foreground("critical")],
                        ),
                    ],
                )
                .spacing(2.0),
                Component::spacer("jobSpacer"),
                Component::button("startJob", text.start_job, "startJob").foreground("accent"),
            ],
        )
        .padding(8.0);

        let content = Component::vstack(
            "content",
            vec![
                header,
                Component::text("jobSummary", text.jobs_summary).font("headline"),
                weather,
                sync_banner,
                Component::divider("jobsDivider"),
                Component::list("jobList", "jobs", job_row),
            ],
        )
        .spacing(16.0)
        .padding(16.0);

        Ok(Screen::new(
            SCREEN_FORMAT_VERSION,
            Component::scroll("dashboard", vec![content]),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::InMemoryDirectory;
    use chrono::{FixedOffset, TimeZone, Utc};
    use trellis_core::{ComponentKind, DEFAULT_MAX_DEPTH};

    fn composer() -> DashboardComposer {
        DashboardComposer::new(Arc::new(InMemoryDirectory::sample()))
    }

    fn morning_request() -> ScreenRequest {
        ScreenRequest::new("dashboard")
            .user("tech-7")
            .service_date(Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn test_personalized_dashboard() {
        let screen = composer().compose(&morning_request()).await.unwrap();
        let greeting = screen.component.find("greeting").unwrap();
        assert_eq!(greeting.text.as_deref(), Some("Good morning, Ava"));
        let route = screen.component.find("routeName").unwrap();
        assert_eq!(route.text.as_deref(), Some("North Loop"));
        assert!(screen.validate(DEFAULT_MAX_DEPTH).is_clean());
    }

    #[tokio::test]
    async fn test_greeting_uses_request_offset() {
        let seattle = FixedOffset::west_opt(8 * 3600).unwrap();
        let request = ScreenRequest::new("dashboard")
            .user("tech-7")
            .service_date(seattle.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap());
        let screen = composer().compose(&request).await.unwrap();
        let greeting = screen.component.find("greeting").unwrap();
        assert_eq!(greeting.text.as_deref(), Some("Good morning, Ava"));
        assert_eq!(
            screen.component.find("routeName").unwrap().text.as_deref(),
            Some("North Loop")
        );
    }

    #[tokio::test]
    async fn test_jobs_are_an_item_template() {
        let screen = composer().compose(&morning_request()).await.unwrap();
        let list = screen.component.find("jobList").unwrap();
        assert_eq!(list.kind, ComponentKind::List);
        assert_eq!(list.key.as_deref(), Some("jobs"));
        assert!(list.children.is_empty());
        let template = list.item_view.as_deref().unwrap();
        assert_eq!(template.find("customer").unwrap().key.as_deref(), Some("customerName"));
        assert_eq!(template.find("startJob").unwrap().action_id.as_deref(), Some("startJob"));
    }

    #[tokio::test]
    async fn test_counts_are_deferred_tokens() {
        let screen = composer().compose(&morning_request()).await.unwrap();
        let summary = screen.component.find("jobSummary").unwrap();
        assert_eq!(summary.text.as_deref(), Some("{{jobs.count}} jobs today"));
        let pending = screen.component.find("syncPending").unwrap();
        assert!(pending.text.as_deref().unwrap().contains("{{sync.pendingCount}}"));
    }

    #[tokio::test]
    async fn test_unknown_user_gets_generic_screen() {
        let request = ScreenRequest::new("dashboard").user("ghost").locale("es-MX");
        let screen = composer().compose(&request).await.unwrap();
        assert_eq!(
            screen.component.find("greeting").unwrap().text.as_deref(),
            Some("Hola")
        );
        assert_eq!(
            screen.component.find("routeName").unwrap().text.as_deref(),
            Some("Sin ruta asignada")
        );
        assert!(screen.component.find("jobList").is_some());
    }

    #[tokio::test]
    async fn test_deterministic() {
        let composer = composer();
        let first = composer.compose(&morning_request()).await.unwrap();
        let second = composer.compose(&morning_request()).await.unwrap();
        assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    }
}
