//! HTTP client for the ClassMatch backend

use std::collections::BTreeMap;
use std::sync::Arc;

use classmatch_core::{KeyValueStore, AUTH_TOKEN_KEY};
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::{Error, Result, FALLBACK_MESSAGE};

/// Query-string filters, e.g. `{"course": "CS2201"}`
pub type Filters = BTreeMap<String, String>;

/// Error body shape returned by the backend
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Client handle for the REST API.
///
/// The bearer token is read from the shared key-value store on every call,
/// so a login through one handle is visible to all of them.
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    tokens: Arc<dyn KeyValueStore>,
}

impl ApiClient {
    pub fn new(base_url: &str, tokens: Arc<dyn KeyValueStore>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            tokens,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Stored bearer token, if any
    pub fn token(&self) -> Result<Option<String>> {
        Ok(self.tokens.get(AUTH_TOKEN_KEY)?)
    }

    pub(crate) fn store_token(&self, token: &str) -> Result<()> {
        Ok(self.tokens.set(AUTH_TOKEN_KEY, token)?)
    }

    pub(crate) fn clear_token(&self) -> Result<()> {
        Ok(self.tokens.remove(AUTH_TOKEN_KEY)?)
    }

    /// Issue a JSON request against `endpoint` (relative to the base URL)
    pub async fn request<T, B>(&self, method: Method, endpoint: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(method, endpoint, None, body).await
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.send::<T, ()>(Method::GET, endpoint, None, None).await
    }

    pub(crate) async fn get_filtered<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        filters: &Filters,
    ) -> Result<T> {
        self.send::<T, ()>(Method::GET, endpoint, Some(filters), None)
            .await
    }

    pub(crate) async fn post<T, B>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::POST, endpoint, None, Some(body)).await
    }

    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.send::<T, ()>(Method::POST, endpoint, None, None).await
    }

    pub(crate) async fn patch<T, B>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::PATCH, endpoint, None, Some(body)).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.send::<T, ()>(Method::DELETE, endpoint, None, None).await
    }

    #[instrument(skip(self, filters, body), fields(base = %self.base_url))]
    async fn send<T, B>(
        &self,
        method: Method,
        endpoint: &str,
        filters: Option<&Filters>,
        body: Option<&B>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut request = self.http.request(method, &url);

        if let Some(filters) = filters.filter(|f| !f.is_empty()) {
            request = request.query(filters);
        }
        if let Some(token) = self.token()? {
            request = request.bearer_auth(token);
        }
        request = match body {
            Some(body) => request.json(body),
            None => request.header(CONTENT_TYPE, "application/json"),
        };

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = error_message(&text);
            warn!(status = status.as_u16(), %message, "API request failed");
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!(status = status.as_u16(), len = text.len(), "API response");
        // Treat an empty success body as JSON null so `()` and `Value` decode
        let text = if text.trim().is_empty() { "null" } else { text.as_str() };
        Ok(serde_json::from_str(text)?)
    }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| FALLBACK_MESSAGE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::client_for;
    use classmatch_core::MemoryStore;
    use serde_json::{json, Value};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_error_message() {
        assert_eq!(error_message(r#"{"message":"Course is full"}"#), "Course is full");
        assert_eq!(error_message(r#"{"error":"x"}"#), FALLBACK_MESSAGE);
        assert_eq!(error_message("<html>502</html>"), FALLBACK_MESSAGE);
        assert_eq!(error_message(""), FALLBACK_MESSAGE);
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = ApiClient::new("http://localhost:5000/api/", Arc::new(MemoryStore::new()));
        assert_eq!(client.base_url(), "http://localhost:5000/api");
    }

    #[tokio::test]
    async fn test_bearer_header_when_token_stored() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .and(header("authorization", "Bearer tok-123"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let (store, client) = client_for(&server);
        store.set(AUTH_TOKEN_KEY, "tok-123").unwrap();

        let body: Value = client.get("/auth/me").await.unwrap();
        assert_eq!(body, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_no_bearer_header_without_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/courses"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let (_, client) = client_for(&server);
        let _: Value = client.get("/courses").await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_error_uses_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/groups"))
            .respond_with(
                ResponseTemplate::new(409).set_body_json(json!({"message": "Group name taken"})),
            )
            .mount(&server)
            .await;

        let (_, client) = client_for(&server);
        let err = client
            .post::<Value, _>("/groups", &json!({"name": "x"}))
            .await
            .unwrap_err();

        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "Group name taken");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_fallback_on_unparseable_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/matches"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&server)
            .await;

        let (_, client) = client_for(&server);
        let err = client.get::<Value>("/matches").await.unwrap_err();
        assert_eq!(err.to_string(), FALLBACK_MESSAGE);
    }

    #[tokio::test]
    async fn test_empty_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/groups/4"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let (_, client) = client_for(&server);
        let body: Value = client.delete("/groups/4").await.unwrap();
        assert_eq!(body, Value::Null);
    }
}
