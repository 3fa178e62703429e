//! Dashboard authentication service.
//!
//! Email/password sign-in against the backend. The issued bearer token and
//! the user profile live in the shared [`SessionManager`]; this service only
//! orchestrates the calls that create, refresh, and destroy them.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use petshop_core::UserProfile;

use crate::api::{ApiClient, ApiError};
use crate::session::SessionManager;

/// Backend paths used by the service.
pub mod paths {
    pub const LOGIN: &str = "auth/login";
    pub const REGISTER: &str = "auth/register";
    pub const LOGOUT: &str = "auth/logout";
    pub const ME: &str = "auth/me";
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
    password_confirmation: &'a str,
}

/// `data` of a successful login or registration.
#[derive(Deserialize)]
struct AuthPayload {
    token: String,
    user: UserProfile,
}

/// `data` of `auth/me`: either `{ "user": {...} }` or the bare profile.
#[derive(Deserialize)]
#[serde(untagged)]
enum MePayload {
    Wrapped { user: UserProfile },
    Bare(UserProfile),
}

impl MePayload {
    fn into_user(self) -> UserProfile {
        match self {
            Self::Wrapped { user } | Self::Bare(user) => user,
        }
    }
}

/// Authentication service.
///
/// Cheap to clone; clones share the same client and session.
#[derive(Clone, Debug)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    /// Create an auth service over `client` and its session.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// The underlying API client.
    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    fn session(&self) -> &Arc<SessionManager> {
        self.client.session()
    }

    // =========================================================================
    // Sign in / out
    // =========================================================================

    /// Sign in with email and password.
    ///
    /// On success the token and profile are persisted and the profile is
    /// returned. On failure any partial session is cleared.
    ///
    /// # Errors
    ///
    /// Returns the `ApiError` reported by the backend or transport.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<UserProfile, ApiError> {
        let body = LoginRequest {
            email,
            password: password.expose_secret(),
        };
        let result = self.client.post::<AuthPayload, _>(paths::LOGIN, &body).await;
        self.start_session(result).await
    }

    /// Create an account and sign in with it.
    ///
    /// The password is also sent as `password_confirmation`.
    ///
    /// # Errors
    ///
    /// Returns the `ApiError` reported by the backend or transport.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<UserProfile, ApiError> {
        let body = RegisterRequest {
            name,
            email,
            password: password.expose_secret(),
            password_confirmation: password.expose_secret(),
        };
        let result = self.client.post::<AuthPayload, _>(paths::REGISTER, &body).await;
        self.start_session(result).await
    }

    async fn start_session(
        &self,
        result: Result<crate::api::Envelope<AuthPayload>, ApiError>,
    ) -> Result<UserProfile, ApiError> {
        match result {
            Ok(envelope) => {
                let AuthPayload { token, user } = envelope.data;
                self.session()
                    .set_session(SecretString::from(token), user.clone())
                    .await;
                tracing::info!(user_id = %user.id, "Signed in");
                Ok(user)
            }
            Err(e) => {
                self.session().clear().await;
                Err(e)
            }
        }
    }

    /// Sign out.
    ///
    /// The backend is told first, best effort; the local session is cleared
    /// whatever it answers.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Err(e) = self
            .client
            .post::<serde::de::IgnoredAny, _>(paths::LOGOUT, &serde_json::json!({}))
            .await
        {
            tracing::debug!(error = %e, "Logout notification failed");
        }
        self.session().clear().await;
        tracing::info!("Signed out");
    }

    // =========================================================================
    // Session state
    // =========================================================================

    /// The signed-in user's profile.
    ///
    /// Without a token this is `None`. Otherwise the cached profile is
    /// returned unless `force_refresh` is set, in which case it is fetched
    /// again; a failed fetch clears the session and yields `None`.
    #[instrument(skip(self))]
    pub async fn current_user(&self, force_refresh: bool) -> Option<UserProfile> {
        if !self.is_authenticated().await {
            return None;
        }
        if !force_refresh {
            return self.session().user().await;
        }

        match self.client.get::<MePayload>(paths::ME).await {
            Ok(envelope) => {
                let user = envelope.data.into_user();
                self.session().set_user(user.clone()).await;
                Some(user)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Profile refresh failed, clearing session");
                self.session().clear().await;
                None
            }
        }
    }

    /// Whether a token is held. Local only; the token may have expired.
    pub async fn is_authenticated(&self) -> bool {
        self.session().has_token().await
    }

    /// The cached profile, without any network call.
    pub async fn user(&self) -> Option<UserProfile> {
        self.session().user().await
    }

    /// Whether a token is held and the backend still accepts it.
    pub async fn ensure_authenticated(&self) -> bool {
        self.is_authenticated().await && self.current_user(true).await.is_some()
    }

    /// Obtain a new access token. Shares any refresh already in flight.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` if the backend refuses; the session
    /// has been cleared by then.
    pub async fn refresh_token(&self) -> Result<(), ApiError> {
        self.client.refresh_token().await.map(drop)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use httpmock::prelude::*;
    use petshop_core::UserId;
    use serde_json::json;

    use super::*;
    use crate::config::ApiConfig;

    fn service_for(server: &MockServer) -> AuthService {
        let config = ApiConfig::new(&server.url("/api/v1")).unwrap();
        let client = ApiClient::new(&config, Arc::new(SessionManager::in_memory())).unwrap();
        AuthService::new(client)
    }

    fn user_json() -> serde_json::Value {
        json!({"id": 1, "name": "A", "email": "a@b.com"})
    }

    #[tokio::test]
    async fn test_login_starts_session() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v1/auth/login")
                .json_body(json!({"email": "a@b.com", "password": "secret"}));
            then.status(200).json_body(json!({
                "status": "success",
                "data": {"token": "T1", "user": user_json()}
            }));
        });

        let auth = service_for(&server);
        let user = auth
            .login("a@b.com", &SecretString::from("secret"))
            .await
            .unwrap();

        mock.assert();
        assert_eq!(user.id, UserId::new(1));
        assert!(auth.is_authenticated().await);
        assert!(auth.is_authenticated().await);
        assert_eq!(
            auth.client().session().token().await.unwrap().expose_secret(),
            "T1"
        );
    }

    #[tokio::test]
    async fn test_failed_login_clears_session() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/v1/auth/login");
            then.status(422).json_body(json!({
                "status": "error",
                "message": "Invalid credentials"
            }));
        });

        let auth = service_for(&server);
        auth.client()
            .session()
            .set_session(
                SecretString::from("OLD"),
                UserProfile::new(UserId::new(9), "Old", "old@b.com"),
            )
            .await;

        let err = auth
            .login("a@b.com", &SecretString::from("wrong"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");
        assert!(!auth.is_authenticated().await);
        assert!(auth.user().await.is_none());
    }

    #[tokio::test]
    async fn test_register_sends_confirmation() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/api/v1/auth/register").json_body(json!({
                "name": "A",
                "email": "a@b.com",
                "password": "secret",
                "password_confirmation": "secret"
            }));
            then.status(201)
                .json_body(json!({"data": {"token": "T1", "user": user_json()}}));
        });

        let auth = service_for(&server);
        auth.register("A", "a@b.com", &SecretString::from("secret"))
            .await
            .unwrap();
        mock.assert();
        assert!(auth.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_backend_fails() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/api/v1/auth/logout");
            then.status(500);
        });

        let auth = service_for(&server);
        auth.client()
            .session()
            .set_session(
                SecretString::from("T1"),
                UserProfile::new(UserId::new(1), "A", "a@b.com"),
            )
            .await;

        auth.logout().await;
        mock.assert();
        assert!(!auth.is_authenticated().await);
        assert!(auth.user().await.is_none());
    }

    #[tokio::test]
    async fn test_current_user_without_token_skips_backend() {
        let server = MockServer::start();
        let me = server.mock(|when, then| {
            when.method(GET).path("/api/v1/auth/me");
            then.status(200).json_body(json!({"data": {"user": user_json()}}));
        });

        let auth = service_for(&server);
        assert!(auth.current_user(true).await.is_none());
        assert_eq!(me.calls(), 0);
    }

    #[tokio::test]
    async fn test_forced_current_user_replaces_profile() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/auth/me");
            then.status(200).json_body(json!({
                "data": {"user": {"id": 1, "name": "Renamed", "email": "a@b.com", "role": "admin"}}
            }));
        });

        let auth = service_for(&server);
        auth.client()
            .session()
            .set_session(
                SecretString::from("T1"),
                UserProfile::new(UserId::new(1), "A", "a@b.com"),
            )
            .await;

        assert_eq!(auth.current_user(false).await.unwrap().name, "A");
        let user = auth.current_user(true).await.unwrap();
        assert_eq!(user.name, "Renamed");
        assert_eq!(user.role.as_deref(), Some("admin"));
        assert_eq!(auth.user().await.unwrap().name, "Renamed");
        assert!(auth.ensure_authenticated().await);
    }

    #[tokio::test]
    async fn test_forced_current_user_failure_clears_session() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/auth/me");
            then.status(500);
        });

        let auth = service_for(&server);
        auth.client()
            .session()
            .set_session(
                SecretString::from("T1"),
                UserProfile::new(UserId::new(1), "A", "a@b.com"),
            )
            .await;

        assert!(auth.current_user(true).await.is_none());
        assert!(!auth.is_authenticated().await);
        assert!(!auth.ensure_authenticated().await);
    }
}
