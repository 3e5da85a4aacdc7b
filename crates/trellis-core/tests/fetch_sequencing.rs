//! A slow response must never overwrite the document of a newer request.

use std::sync::Arc;
use std::time::Duration;
use trellis_core::{
    FetchOutcome, RenderContext, RenderSession, RenderView, ScreenClient, ScreenError,
    ScreenLoader, ScreenRequest,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn screen_body(id: &str, version: u32) -> String {
    format!(r#"{{"version": {version}, "component": {{"id": "{id}", "type": "text", "text": "{id}"}}}}"#)
}

async fn server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/screens/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(screen_body("slow", 1))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/screens/fast"))
        .respond_with(ResponseTemplate::new(200).set_body_string(screen_body("fast", 1)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/screens/future"))
        .respond_with(ResponseTemplate::new(200).set_body_string(screen_body("future", 9)))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn overtaken_response_is_discarded() {
    let server = server().await;
    let session = Arc::new(RenderSession::default());
    let loader = ScreenLoader::new(ScreenClient::new(server.uri()).unwrap(), Arc::clone(&session));

    let slow_request = ScreenRequest::new("slow");
    let fast_request = ScreenRequest::new("fast");
    let (slow, fast) = tokio::join!(loader.load(&slow_request), async {
        // Make sure the slow fetch has taken its ticket first.
        tokio::time::sleep(Duration::from_millis(50)).await;
        loader.load(&fast_request).await
    });

    assert!(fast.is_applied());
    assert!(matches!(slow, FetchOutcome::Stale));
    assert_eq!(session.screen().unwrap().component.id, "fast");
}

#[tokio::test]
async fn sequential_loads_replace_document() {
    let server = server().await;
    let session = Arc::new(RenderSession::default());
    let loader = ScreenLoader::new(ScreenClient::new(server.uri()).unwrap(), Arc::clone(&session));

    assert!(loader.load(&ScreenRequest::new("fast")).await.is_applied());
    assert!(loader.load(&ScreenRequest::new("slow")).await.is_applied());
    assert_eq!(session.screen().unwrap().component.id, "slow");
}

#[tokio::test]
async fn future_version_falls_back() {
    let server = server().await;
    let session = Arc::new(RenderSession::default());
    let loader = ScreenLoader::new(ScreenClient::new(server.uri()).unwrap(), Arc::clone(&session));

    let outcome = loader.load(&ScreenRequest::new("future")).await;
    assert!(matches!(
        outcome.error(),
        Some(ScreenError::UnsupportedVersion { version: 9, max: 1, .. })
    ));
    let RenderView::Fallback(output) = session.render(&RenderContext::builder().build()) else {
        panic!("rejected document should show the fallback");
    };
    assert!(output.find("future").is_none());
}
