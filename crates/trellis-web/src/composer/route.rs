//! Route sheet
//!
//! The server knows every stop on the route, so each one is emitted as an
//! explicit row. A missing route yields the "No route assigned" screen.

use super::{Personalization, Result, ScreenComposer, Strings};
use crate::directory::{Directory, Job, JobStatus, Priority, Route};
use async_trait::async_trait;
use std::sync::Arc;
use trellis_core::{Component, Screen, ScreenRequest, SCREEN_FORMAT_VERSION};

pub struct RouteComposer {
    directory: Arc<dyn Directory>,
}

impl RouteComposer {
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl ScreenComposer for RouteComposer {
    async fn compose(&self, request: &ScreenRequest) -> Result<Screen> {
        let found = Personalization::lookup(self.directory.as_ref(), request).await?;
        let component = match &found.route {
            Some(route) => route_sheet(route, found.strings),
            None => no_route(found.strings),
        };
        Ok(Screen::new(SCREEN_FORMAT_VERSION, component))
    }
}

fn route_sheet(route: &Route, text: &Strings) -> Component {
    let mut header = vec![Component::text("routeTitle", route.name.as_str()).font("title2")];
    if let Some(date) = route.service_date {
        header.push(
            Component::text("routeDate", date.format("%Y-%m-%d").to_string())
                .font("subheadline")
                .foreground("secondary"),
        );
    }
    header.push(
        Component::text("stopCount", format!("{} {}", route.jobs.len(), text.stops_label))
            .font("footnote")
            .foreground("secondary"),
    );

    let stops = route
        .jobs
        .iter()
        .enumerate()
        .map(|(index, job)| stop_row(index + 1, job, text))
        .collect();

    Component::scroll(
        "route",
        vec![Component::vstack(
            "content",
            vec![
                Component::vstack("header", header).spacing(4.0),
                Component::divider("stopsDivider"),
                Component::unrolled_list("stops", stops).spacing(12.0),
            ],
        )
        .spacing(16.0)
        .padding(16.0)],
    )
}

fn stop_row(number: usize, job: &Job, text: &Strings) -> Component {
    let id = &job.id;
    let mut details = vec![
        Component::text(format!("customer-{id}"), job.customer_name.as_str()).font("headline"),
        Component::text(format!("address-{id}"), job.address.as_str())
            .font("subheadline")
            .foreground("secondary"),
    ];
    if let Some(window) = &job.window {
        details.push(Component::text(format!("window-{id}"), window.as_str()).font("footnote"));
    }
    details.push(
        Component::text(format!("status-{id}"), status_label(job.status, text))
            .font("caption.semibold")
            .foreground(job.status.color_token()),
    );
    if job.priority == Priority::Urgent {
        details.push(
            Component::text(format!("urgent-{id}"), text.urgent)
                .font("caption.bold")
                .foreground("critical"),
        );
    }

    Component::hstack(
        format!("stop-{id}"),
        vec![
            Component::text(format!("stopNumber-{id}"), number.to_string())
                .font("title3")
                .foreground("accent"),
            Component::vstack(format!("details-{id}"), details).spacing(2.0),
            Component::spacer(format!("spacer-{id}")),
            Component::button(format!("navigate-{id}"), text.navigate, "navigateToStop"),
        ],
    )
    .spacing(12.0)
}

fn status_label(status: JobStatus, text: &Strings) -> &'static str {
    match status {
        JobStatus::Scheduled => text.status_scheduled,
        JobStatus::EnRoute => text.status_en_route,
        JobStatus::InProgress => text.status_in_progress,
        JobStatus::Completed => text.status_completed,
    }
}

fn no_route(text: &Strings) -> Component {
    Component::vstack(
        "noRoute",
        vec![
            Component::image("noRouteIcon", "map"),
            Component::text("noRouteTitle", text.no_route_title).font("headline"),
            Component::text("noRouteBody", text.no_route_body)
                .font("body")
                .foreground("secondary"),
        ],
    )
    .spacing(8.0)
    .padding(24.0)
}
