//! End-to-end rendering scenarios for a technician dashboard.

use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use trellis_core::{
    handler_fn, ActionDispatcher, Component, Diagnostic, Dispatch, FetchError, FetchOutcome,
    InvokeOutcome, RenderContext, RenderSession, RenderView, Screen, ScreenClient, ScreenError,
    ScreenLoader, ScreenRequest,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn dashboard() -> Screen {
    Screen::new(
        1,
        Component::vstack(
            "dashboard",
            vec![
                Component::text("header", "Good day, {{user.name}}").font("title2"),
                Component::text("summary", "{{jobs.count}} jobs today"),
                Component::conditional(
                    "weatherCard",
                    "weather.summary",
                    vec![Component::text("weather", "{{weather.summary}}")],
                ),
                Component::list(
                    "jobList",
                    "jobs",
                    Component::hstack(
                        "jobRow",
                        vec![
                            Component::bound_text("customer", "customerName").font("headline"),
                            Component::button("start", "Start", "startJob").foreground("accent"),
                        ],
                    ),
                ),
            ],
        ),
    )
}

fn jobs() -> Vec<Value> {
    vec![
        json!({ "id": "job-a", "customerName": "A" }),
        json!({ "id": "job-b", "customerName": "B" }),
    ]
}

#[test]
fn scenario_a_header_greets_user() {
    let session = RenderSession::default();
    session.load_screen(dashboard());
    let context = RenderContext::builder()
        .value("user.name", json!("Ava"))
        .collection("jobs", jobs())
        .build();

    let RenderView::Screen(output) = session.render(&context) else {
        panic!("dashboard should render");
    };
    assert_eq!(output.find("header").unwrap().text(), Some("Good day, Ava"));
    assert_eq!(output.find("summary").unwrap().text(), Some("2 jobs today"));
}

#[test]
fn scenario_b_rows_follow_collection_order() {
    let session = RenderSession::default();
    session.load_screen(dashboard());
    let context = RenderContext::builder().collection("jobs", jobs()).build();

    let RenderView::Screen(output) = session.render(&context) else {
        panic!("dashboard should render");
    };
    let rows = output.find("jobList").unwrap().children();
    assert_eq!(rows.len(), 2);
    let customers: Vec<_> = rows
        .iter()
        .map(|row| row.find("customer").unwrap().text().unwrap())
        .collect();
    assert_eq!(customers, vec!["A", "B"]);

    // Missing personalization degrades, it does not blank the screen.
    assert_eq!(output.find("header").unwrap().text(), Some("Good day, {{user.name}}"));
    assert!(output.find("weatherCard").is_none());
    assert!(output
        .diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::BindingMiss { binding, .. } if binding == "user.name")));
}

#[tokio::test]
async fn scenario_c_start_job_receives_row_item() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    let context = Arc::new(
        RenderContext::builder()
            .collection("jobs", jobs())
            .action(
                "startJob",
                handler_fn(move |invocation| {
                    let sink = Arc::clone(&sink);
                    async move {
                        sink.lock().push(invocation.item);
                        Ok(())
                    }
                }),
            )
            .build(),
    );

    let session = RenderSession::default();
    session.load_screen(dashboard());
    let RenderView::Screen(output) = session.render(context.as_ref()) else {
        panic!("dashboard should render");
    };
    let second_row = &output.find("jobList").unwrap().children()[1];
    let action = second_row.find("start").unwrap().action.clone().unwrap();

    let dispatcher = session.dispatcher(context.clone());
    let generation = session.trigger().generation();
    let Dispatch::Spawned(handle) = dispatcher.dispatch_bound(&action) else {
        panic!("startJob is registered");
    };
    assert_eq!(handle.await.unwrap(), InvokeOutcome::Completed);

    assert_eq!(
        *received.lock(),
        vec![Some(json!({ "id": "job-b", "customerName": "B" }))]
    );
    assert_eq!(session.trigger().generation(), generation + 1);
}

#[tokio::test]
async fn scenario_c_missing_handler_is_a_no_op() {
    let context = Arc::new(RenderContext::builder().collection("jobs", jobs()).build());
    let dispatcher = ActionDispatcher::new(context);
    assert!(matches!(
        dispatcher.dispatch("startJob", Some(&jobs()[0])),
        Dispatch::NotFound
    ));
    assert_eq!(
        dispatcher.invoke("startJob", None).await,
        InvokeOutcome::NotFound
    );
}

#[tokio::test]
async fn scenario_d_network_error_surfaces_fetch_error() {
    // Nothing listens on the discard port.
    let client = ScreenClient::new("http://127.0.0.1:9").unwrap();
    let session = Arc::new(RenderSession::default());
    let loader = ScreenLoader::new(client, Arc::clone(&session));

    let outcome = loader.load(&ScreenRequest::new("dashboard")).await;
    assert!(matches!(
        outcome.error(),
        Some(ScreenError::Fetch(FetchError::Transport(_)))
    ));
    assert!(session.screen().is_none());
    assert!(matches!(
        session.render(&RenderContext::builder().build()),
        RenderView::Failed(_)
    ));
}

#[tokio::test]
async fn scenario_d_malformed_response_renders_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/screens/dashboard"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"version": 1, "component": {"id": "x", "type": "carousel"}}"#),
        )
        .mount(&server)
        .await;

    let session = Arc::new(RenderSession::default());
    let loader = ScreenLoader::new(ScreenClient::new(server.uri()).unwrap(), Arc::clone(&session));
    let outcome = loader.load(&ScreenRequest::new("dashboard")).await;

    assert!(matches!(outcome, FetchOutcome::Failed(_)));
    assert!(matches!(
        outcome.error(),
        Some(ScreenError::Fetch(FetchError::Decode(_)))
    ));
    assert!(session.screen().is_none());
}
