//! HTTP client for the screen composer

use crate::error::FetchError;
use crate::model::Screen;
use crate::request::ScreenRequest;
use crate::session::{FetchOutcome, RenderSession};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches screen documents from `GET {base}/screens/{screenId}`.
#[derive(Debug, Clone)]
pub struct ScreenClient {
    http: Client,
    base_url: String,
}

impl ScreenClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Use a preconfigured reqwest client.
    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch and decode one document. No version check happens here.
    pub async fn fetch(&self, request: &ScreenRequest) -> Result<Screen, FetchError> {
        if request.screen_id.trim().is_empty() {
            return Err(FetchError::InvalidRequest("screen id is empty".to_string()));
        }
        let url = format!(
            "{}/screens/{}",
            self.base_url,
            urlencoding::encode(&request.screen_id)
        );
        debug!(url = %url, "Fetching screen");

        let response = self.http.get(&url).query(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Feeds a [`RenderSession`] from a [`ScreenClient`], discarding responses
/// overtaken by a newer load.
#[derive(Debug, Clone)]
pub struct ScreenLoader {
    client: ScreenClient,
    session: Arc<RenderSession>,
}

impl ScreenLoader {
    pub fn new(client: ScreenClient, session: Arc<RenderSession>) -> Self {
        Self { client, session }
    }

    pub fn session(&self) -> &Arc<RenderSession> {
        &self.session
    }

    pub async fn load(&self, request: &ScreenRequest) -> FetchOutcome {
        let ticket = self.session.begin_fetch();
        let result = self.client.fetch(request).await;
        self.session.complete_fetch(ticket, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SCREEN_JSON: &str = r#"{
        "version": 1,
        "component": { "id": "greeting", "type": "text", "text": "Good day, {{user.name}}" }
    }"#;

    #[tokio::test]
    async fn fetch_sends_query_and_decodes_screen() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/screens/dashboard"))
            .and(query_param("userId", "tech-7"))
            .and(query_param("locale", "en-US"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SCREEN_JSON))
            .mount(&server)
            .await;

        let client = ScreenClient::new(format!("{}/", server.uri())).unwrap();
        let request = ScreenRequest::new("dashboard").user("tech-7").locale("en-US");
        let screen = client.fetch(&request).await.unwrap();
        assert_eq!(screen.version, 1);
        assert_eq!(screen.component.id, "greeting");
    }

    #[tokio::test]
    async fn server_errors_map_to_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = ScreenClient::new(server.uri()).unwrap();
        let err = client.fetch(&ScreenRequest::new("dashboard")).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 500, ref body } if body == "boom"));
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"version": 1}"#))
            .mount(&server)
            .await;

        let client = ScreenClient::new(server.uri()).unwrap();
        let err = client.fetch(&ScreenRequest::new("dashboard")).await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn empty_screen_id_is_rejected_locally() {
        let client = ScreenClient::new("http://127.0.0.1:9").unwrap();
        let err = client.fetch(&ScreenRequest::new(" ")).await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidRequest(_)));
    }
}
