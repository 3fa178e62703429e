//! HTTP client for the backend REST API.
//!
//! Attaches the session's bearer token, unwraps the response envelope, and
//! recovers from an expired token by refreshing it once and retrying.

use std::sync::Arc;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;
use url::Url;
use uuid::Uuid;

use super::{ApiError, Envelope, ErrorEnvelope, FieldError, SingleFlight};
use crate::config::ApiConfig;
use crate::session::{Epoch, SessionManager};

/// Path of the token refresh endpoint, relative to the base URL.
pub const REFRESH_PATH: &str = "auth/refresh";

/// Correlation header sent with every request.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

type RefreshOutcome = Result<SecretString, ErrorEnvelope>;

/// Backend REST API client.
///
/// Cheap to clone; all clones share one connection pool, one cookie jar,
/// and one refresh slot.
///
/// # Authentication
///
/// The bearer token is read from the [`SessionManager`] on every request.
/// When a request that carried a token is answered with 401, the client
/// refreshes the token (concurrent failures share a single refresh call)
/// and retries the request once with the new token. If the refresh fails,
/// the session is cleared and the original 401 is returned.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    transport: Transport,
    session: Arc<SessionManager>,
    refresh: SingleFlight<RefreshOutcome>,
}

/// What is needed to put one request on the wire.
#[derive(Clone)]
struct Transport {
    http: reqwest::Client,
    base_url: Url,
}

#[derive(Deserialize)]
struct RefreshData {
    token: String,
}

impl ApiClient {
    /// Create a client for the backend described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig, session: Arc<SessionManager>) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder().cookie_store(true);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                transport: Transport {
                    http,
                    base_url: config.base_url.clone(),
                },
                session,
                refresh: SingleFlight::new(),
            }),
        })
    }

    /// The session this client authenticates with.
    #[must_use]
    pub fn session(&self) -> &Arc<SessionManager> {
        &self.inner.session
    }

    /// Base address every path is joined onto.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.transport.base_url
    }

    // =========================================================================
    // Verbs
    // =========================================================================

    /// `GET path`.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Envelope<T>, ApiError> {
        self.execute(Method::GET, path, &[], None).await
    }

    /// `GET path?name=value...`.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Envelope<T>, ApiError> {
        self.execute(Method::GET, path, query, None).await
    }

    /// `POST path` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<Envelope<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, Some(body)).await
    }

    /// `PUT path` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<Envelope<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, path, Some(body)).await
    }

    /// `PATCH path` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<Envelope<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PATCH, path, Some(body)).await
    }

    /// `DELETE path`.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<Envelope<T>, ApiError> {
        self.execute(Method::DELETE, path, &[], None).await
    }

    /// Send a request and decode the envelope's `data` as `T`.
    ///
    /// # Errors
    ///
    /// - `ApiError::Unauthorized` on 401 after a failed or impossible refresh
    /// - `ApiError::Api` for any other non-2xx status, or a body with
    ///   `"status": "error"`
    /// - `ApiError::Transport` when no response arrives
    /// - `ApiError::Decode` when `data` does not match `T`
    pub async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Envelope<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = body.map(serde_json::to_vec).transpose()?;
        self.execute(method, path, &[], body).await
    }

    // =========================================================================
    // Token refresh
    // =========================================================================

    /// Exchange the refresh cookie for a new access token.
    ///
    /// Concurrent callers share one request. On success the new token is
    /// stored in the session; on failure the whole session is cleared.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` carrying the refresh failure.
    #[instrument(skip(self))]
    pub async fn refresh_token(&self) -> Result<SecretString, ApiError> {
        let epoch = self.inner.session.epoch().await;
        self.refresh_within(epoch).await
    }

    /// Refresh on behalf of the session identified by `epoch`. A refresh
    /// started for a session that has since been cleared never reaches the
    /// backend.
    async fn refresh_within(&self, epoch: Epoch) -> Result<SecretString, ApiError> {
        let transport = self.inner.transport.clone();
        let session = Arc::clone(&self.inner.session);

        self.inner
            .refresh
            .run(move || async move { perform_refresh(&transport, &session, epoch).await })
            .await
            .map_err(ApiError::Unauthorized)
    }

    /// Whether a refresh is currently pending.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.inner.refresh.is_in_flight()
    }

    // =========================================================================
    // Execution
    // =========================================================================

    #[instrument(skip(self, method, query, body), fields(method = %method))]
    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Vec<u8>>,
    ) -> Result<Envelope<T>, ApiError> {
        let url = self.inner.transport.endpoint(path, query)?;
        let (sent, epoch) = self.inner.session.credentials().await;

        let response = self
            .inner
            .transport
            .send(method.clone(), &url, body.as_deref(), sent.as_ref())
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return parse_response(response).await;
        }

        let rejected = read_error(response).await;
        let Some(sent) = sent else {
            return Err(ApiError::Unauthorized(rejected));
        };
        if is_refresh_path(path) {
            self.inner.session.clear_token_if(&sent).await;
            return Err(ApiError::Unauthorized(rejected));
        }

        let Some(fresh) = self.recover_token(&sent, epoch).await else {
            return Err(ApiError::Unauthorized(rejected));
        };

        tracing::debug!(path, "Retrying request with refreshed token");
        let retry = self
            .inner
            .transport
            .send(method, &url, body.as_deref(), Some(&fresh))
            .await?;

        if retry.status() == StatusCode::UNAUTHORIZED {
            self.inner.session.clear_token_if(&fresh).await;
            return Err(ApiError::Unauthorized(read_error(retry).await));
        }
        parse_response(retry).await
    }

    /// Obtain a usable token after `sent` was rejected.
    ///
    /// If another caller already replaced `sent`, that token is reused
    /// instead of refreshing again. If the session was cleared after the
    /// request went out, nothing is refreshed.
    async fn recover_token(&self, sent: &SecretString, epoch: Epoch) -> Option<SecretString> {
        let session = &self.inner.session;
        if !session.clear_token_if(sent).await {
            let (current, now) = session.credentials().await;
            if let Some(current) = current {
                return Some(current);
            }
            if now != epoch {
                tracing::debug!("Session ended while the request was in flight");
                return None;
            }
        }

        match self.refresh_within(epoch).await {
            Ok(token) => Some(token),
            Err(e) => {
                tracing::debug!(error = %e, "Token refresh did not recover the request");
                None
            }
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.transport.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl Transport {
    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, ApiError> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let mut url = Url::parse(&joined).map_err(|source| ApiError::Endpoint {
            path: path.to_string(),
            source,
        })?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        url: &Url,
        body: Option<&[u8]>,
        token: Option<&SecretString>,
    ) -> Result<reqwest::Response, ApiError> {
        let request_id = Uuid::new_v4().to_string();
        tracing::debug!(%method, url = %url, request_id, "Sending API request");

        let mut request = self
            .http
            .request(method, url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(REQUEST_ID_HEADER, request_id);
        if let Some(token) = token {
            request = request.bearer_auth(token.expose_secret());
        }
        if let Some(body) = body {
            request = request.body(body.to_vec());
        }

        Ok(request.send().await?)
    }
}

/// Call the refresh endpoint and store the outcome in the session.
///
/// Sent without a bearer token; the server identifies the session through
/// the refresh cookie held in the client's cookie store.
async fn perform_refresh(
    transport: &Transport,
    session: &SessionManager,
    epoch: Epoch,
) -> RefreshOutcome {
    if session.epoch().await != epoch {
        return Err(ErrorEnvelope {
            status: "error".to_string(),
            message: "Session ended".to_string(),
            code: Some(i64::from(StatusCode::UNAUTHORIZED.as_u16())),
            field_errors: Vec::new(),
        });
    }

    match request_refresh(transport).await {
        Ok(token) => {
            session.set_token(token.clone()).await;
            tracing::info!("Access token refreshed");
            Ok(token)
        }
        Err(envelope) => {
            tracing::warn!(message = %envelope.message, "Token refresh failed, clearing session");
            session.clear().await;
            Err(envelope)
        }
    }
}

async fn request_refresh(transport: &Transport) -> RefreshOutcome {
    let url = transport
        .endpoint(REFRESH_PATH, &[])
        .map_err(|e| transport_failure(&e))?;
    let response = transport
        .send(Method::POST, &url, Some(b"{}".as_slice()), None)
        .await
        .map_err(|e| transport_failure(&e))?;

    match parse_response::<RefreshData>(response).await {
        Ok(envelope) => Ok(SecretString::from(envelope.data.token)),
        Err(e) => Err(e.envelope().cloned().unwrap_or_else(|| transport_failure(&e))),
    }
}

fn transport_failure(error: &ApiError) -> ErrorEnvelope {
    ErrorEnvelope {
        status: "error".to_string(),
        message: error.to_string(),
        code: error.code(),
        field_errors: Vec::new(),
    }
}

fn is_refresh_path(path: &str) -> bool {
    path.trim_matches('/') == REFRESH_PATH
}

// =============================================================================
// Response parsing
// =============================================================================

/// Decode a response into an envelope, or the error it carries.
///
/// A body without a `data` member is taken as the payload itself.
async fn parse_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<Envelope<T>, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let envelope = read_error(response).await;
        return Err(if status == StatusCode::UNAUTHORIZED {
            ApiError::Unauthorized(envelope)
        } else {
            ApiError::Api(envelope)
        });
    }

    let bytes = response.bytes().await?;
    let body: Value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };

    if body.get("status").and_then(Value::as_str) == Some("error") {
        return Err(ApiError::Api(error_envelope(status, Some(body))));
    }

    let message = body
        .get("message")
        .and_then(Value::as_str)
        .map(ToOwned::to_owned);
    let payload = match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(data) if !data.is_null() => data,
            _ => Value::Object(map),
        },
        other => other,
    };

    Ok(Envelope {
        data: serde_json::from_value(payload)?,
        message,
    })
}

/// Read an error body, tolerating anything the server sends.
async fn read_error(response: reqwest::Response) -> ErrorEnvelope {
    let status = response.status();
    let body = match response.bytes().await {
        Ok(bytes) => serde_json::from_slice::<Value>(&bytes).ok(),
        Err(e) => {
            tracing::debug!(error = %e, "Failed to read error body");
            None
        }
    };
    error_envelope(status, body)
}

fn error_envelope(status: StatusCode, body: Option<Value>) -> ErrorEnvelope {
    let field = |name: &str| body.as_ref().and_then(|b| b.get(name));

    let message = field("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map_or_else(
            || {
                if status == StatusCode::UNAUTHORIZED {
                    "Unauthorized".to_string()
                } else {
                    format!("Request failed with status {}", status.as_u16())
                }
            },
            ToOwned::to_owned,
        );
    let code = field("code")
        .and_then(|c| c.as_i64().or_else(|| c.as_str().and_then(|s| s.parse().ok())))
        .unwrap_or_else(|| i64::from(status.as_u16()));
    let field_errors = field("errors")
        .cloned()
        .and_then(|errors| serde_json::from_value::<Vec<FieldError>>(errors).ok())
        .unwrap_or_default();

    ErrorEnvelope {
        status: field("status")
            .and_then(Value::as_str)
            .unwrap_or("error")
            .to_string(),
        message,
        code: Some(code),
        field_errors,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use httpmock::prelude::*;
    use petshop_core::{UserId, UserProfile};
    use serde_json::json;

    use super::*;

    fn client_for(server: &MockServer) -> ApiClient {
        let config = ApiConfig::new(&server.url("/api/v1")).unwrap();
        ApiClient::new(&config, Arc::new(SessionManager::in_memory())).unwrap()
    }

    async fn signed_in(client: &ApiClient, token: &str) {
        client
            .session()
            .set_session(
                SecretString::from(token),
                UserProfile::new(UserId::new(1), "A", "a@b.com"),
            )
            .await;
    }

    #[tokio::test]
    async fn test_envelope_data_is_unwrapped() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/products")
                .header("accept", "application/json")
                .header_exists("x-request-id");
            then.status(200)
                .json_body(json!({"status": "success", "data": [1, 2, 3], "message": "ok"}));
        });

        let client = client_for(&server);
        let envelope: Envelope<Vec<u32>> = client.get("products").await.unwrap();
        assert_eq!(envelope.data, vec![1, 2, 3]);
        assert_eq!(envelope.message.as_deref(), Some("ok"));
        mock.assert();
    }

    #[tokio::test]
    async fn test_bare_body_is_payload() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/store");
            then.status(200).json_body(json!({"name": "Pawsome"}));
        });

        let client = client_for(&server);
        let envelope: Envelope<Value> = client.get("store").await.unwrap();
        assert_eq!(envelope.data["name"], "Pawsome");
    }

    #[tokio::test]
    async fn test_bearer_token_is_attached() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/auth/me")
                .header("authorization", "Bearer T1");
            then.status(200).json_body(json!({"data": {"ok": true}}));
        });

        let client = client_for(&server);
        signed_in(&client, "T1").await;
        let _: Envelope<Value> = client.get("auth/me").await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn test_query_pairs_are_encoded() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/search")
                .query_param("query", "dog food");
            then.status(200).json_body(json!({"data": []}));
        });

        let client = client_for(&server);
        let _: Envelope<Vec<Value>> = client
            .get_with_query("search", &[("query", "dog food")])
            .await
            .unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn test_validation_error_keeps_field_messages() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/v1/product-categories");
            then.status(422).json_body(json!({
                "status": "error",
                "message": "Validation failed",
                "errors": [{"field": "name", "message": "required"}]
            }));
        });

        let client = client_for(&server);
        let err = client
            .post::<Value, _>("product-categories", &json!({"name": ""}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Validation failed");
        assert_eq!(err.code(), Some(422));
        assert_eq!(err.field_errors()["name"], "required");
    }

    #[tokio::test]
    async fn test_non_json_error_gets_default_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/products/9");
            then.status(500).body("<html>oops</html>");
        });

        let client = client_for(&server);
        let err = client.get::<Value>("products/9").await.unwrap_err();
        assert_eq!(err.to_string(), "Request failed with status 500");
        assert_eq!(err.code(), Some(500));
    }

    #[tokio::test]
    async fn test_success_status_with_error_body_is_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/store");
            then.status(200)
                .json_body(json!({"status": "error", "message": "Store closed"}));
        });

        let client = client_for(&server);
        let err = client.get::<Value>("store").await.unwrap_err();
        assert_eq!(err.to_string(), "Store closed");
        assert_eq!(err.code(), Some(200));
    }

    #[tokio::test]
    async fn test_401_without_token_does_not_refresh() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/v1/auth/login");
            then.status(401)
                .json_body(json!({"status": "error", "message": "Invalid credentials"}));
        });
        let refresh = server.mock(|when, then| {
            when.method(POST).path("/api/v1/auth/refresh");
            then.status(200).json_body(json!({"data": {"token": "T2"}}));
        });

        let client = client_for(&server);
        let err = client
            .post::<Value, _>("auth/login", &json!({"email": "a@b.com"}))
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "Unauthorized: Invalid credentials");
        assert_eq!(refresh.calls(), 0);
    }

    #[tokio::test]
    async fn test_401_refreshes_and_retries_once() {
        let server = MockServer::start();
        let stale = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/products")
                .header("authorization", "Bearer T1");
            then.status(401).json_body(json!({"message": "Token expired"}));
        });
        let fresh = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/products")
                .header("authorization", "Bearer T2");
            then.status(200).json_body(json!({"data": []}));
        });
        let refresh = server.mock(|when, then| {
            when.method(POST).path("/api/v1/auth/refresh");
            then.status(200).json_body(json!({"data": {"token": "T2"}}));
        });

        let client = client_for(&server);
        signed_in(&client, "T1").await;

        let envelope: Envelope<Vec<Value>> = client.get("products").await.unwrap();
        assert!(envelope.data.is_empty());
        assert_eq!(stale.calls(), 1);
        assert_eq!(fresh.calls(), 1);
        assert_eq!(refresh.calls(), 1);
        assert_eq!(
            client.session().token().await.unwrap().expose_secret(),
            "T2"
        );
    }

    #[tokio::test]
    async fn test_concurrent_401s_share_one_refresh() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).header("authorization", "Bearer T1");
            then.status(401).json_body(json!({"message": "Token expired"}));
        });
        let retried = server.mock(|when, then| {
            when.method(GET).header("authorization", "Bearer T2");
            then.status(200).json_body(json!({"data": {"ok": true}}));
        });
        let refresh = server.mock(|when, then| {
            when.method(POST).path("/api/v1/auth/refresh");
            then.status(200)
                .delay(Duration::from_millis(100))
                .json_body(json!({"data": {"token": "T2"}}));
        });

        let client = client_for(&server);
        signed_in(&client, "T1").await;

        let (a, b) = tokio::join!(
            client.get::<Value>("products"),
            client.get::<Value>("product-categories"),
        );
        assert!(a.is_ok());
        assert!(b.is_ok());
        assert_eq!(refresh.calls(), 1);
        assert_eq!(retried.calls(), 2);
        assert!(!client.is_refreshing());
    }

    #[tokio::test]
    async fn test_failed_refresh_clears_session_and_returns_original_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/products");
            then.status(401).json_body(json!({"message": "Token expired"}));
        });
        server.mock(|when, then| {
            when.method(POST).path("/api/v1/auth/refresh");
            then.status(401).json_body(json!({"message": "Refresh token revoked"}));
        });

        let client = client_for(&server);
        signed_in(&client, "T1").await;

        let err = client.get::<Value>("products").await.unwrap_err();
        assert_eq!(err.to_string(), "Unauthorized: Token expired");
        assert!(!client.session().has_token().await);
        assert!(client.session().user().await.is_none());
    }

    #[tokio::test]
    async fn test_late_401_after_failed_refresh_does_not_refresh_again() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/products");
            then.status(401).json_body(json!({"message": "Token expired"}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/product-categories");
            then.status(401)
                .delay(Duration::from_millis(300))
                .json_body(json!({"message": "Token expired"}));
        });
        let refresh = server.mock(|when, then| {
            when.method(POST).path("/api/v1/auth/refresh");
            then.status(401).json_body(json!({"message": "Refresh token revoked"}));
        });

        let client = client_for(&server);
        signed_in(&client, "T1").await;

        let (a, b) = tokio::join!(
            client.get::<Value>("products"),
            client.get::<Value>("product-categories"),
        );
        assert!(a.unwrap_err().is_unauthorized());
        assert!(b.unwrap_err().is_unauthorized());
        assert_eq!(refresh.calls(), 1);
        assert!(!client.session().has_token().await);
        assert!(client.session().user().await.is_none());
    }

    #[tokio::test]
    async fn test_refresh_for_ended_session_is_not_sent() {
        let server = MockServer::start();
        let refresh = server.mock(|when, then| {
            when.method(POST).path("/api/v1/auth/refresh");
            then.status(200).json_body(json!({"data": {"token": "T2"}}));
        });

        let client = client_for(&server);
        signed_in(&client, "T1").await;
        let epoch = client.session().epoch().await;
        client.session().clear().await;

        let err = client.refresh_within(epoch).await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(refresh.calls(), 0);
        assert!(!client.session().has_token().await);
    }

    #[tokio::test]
    async fn test_transport_failure_reports_code_zero() {
        let config = ApiConfig::new("http://127.0.0.1:9/api/v1").unwrap();
        let client = ApiClient::new(&config, Arc::new(SessionManager::in_memory())).unwrap();

        let err = client.get::<Value>("products").await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(err.code(), Some(crate::api::TRANSPORT_FAILURE_CODE));
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let transport = Transport {
            http: reqwest::Client::new(),
            base_url: Url::parse("http://localhost:3000/api/v1").unwrap(),
        };
        assert_eq!(
            transport.endpoint("/products/3", &[]).unwrap().as_str(),
            "http://localhost:3000/api/v1/products/3"
        );
        assert_eq!(
            transport
                .endpoint("search", &[("query", "cat toy")])
                .unwrap()
                .as_str(),
            "http://localhost:3000/api/v1/search?query=cat+toy"
        );
    }
}
