//! Sign-in state for the dashboard shell.

use std::sync::{Arc, Mutex};

use secrecy::SecretString;

use petshop_core::UserProfile;

use super::{Notification, Notifier, OperationFailure, lock};
use crate::services::AuthService;

#[derive(Default)]
struct AuthState {
    user: Option<UserProfile>,
    initialized: bool,
}

/// Who is signed in, as the shell and route guard see it.
pub struct AuthViewModel {
    service: AuthService,
    notifier: Arc<dyn Notifier>,
    state: Mutex<AuthState>,
}

impl AuthViewModel {
    #[must_use]
    pub fn new(service: AuthService, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            service,
            notifier,
            state: Mutex::new(AuthState::default()),
        }
    }

    /// The wrapped service.
    #[must_use]
    pub const fn service(&self) -> &AuthService {
        &self.service
    }

    /// Restore the cached profile. No network call is made.
    pub async fn init(&self) -> Option<UserProfile> {
        let user = self.service.current_user(false).await;
        let mut state = lock(&self.state);
        state.user.clone_from(&user);
        state.initialized = true;
        user
    }

    /// Whether [`init`](Self::init) has completed.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        lock(&self.state).initialized
    }

    /// The profile this view model last saw.
    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        lock(&self.state).user.clone()
    }

    /// Whether a token is held.
    pub async fn is_authenticated(&self) -> bool {
        self.service.is_authenticated().await
    }

    /// # Errors
    ///
    /// Returns the recorded `OperationFailure`; the user is signed out.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<UserProfile, OperationFailure> {
        let result = self.service.login(email, password).await;
        self.settle(result, "Login failed")
    }

    /// # Errors
    ///
    /// Returns the recorded `OperationFailure`; the user is signed out.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<UserProfile, OperationFailure> {
        let result = self.service.register(name, email, password).await;
        self.settle(result, "Registration failed")
    }

    /// Sign out. Never fails.
    pub async fn logout(&self) {
        self.service.logout().await;
        lock(&self.state).user = None;
    }

    fn settle(
        &self,
        result: Result<UserProfile, crate::api::ApiError>,
        fallback: &str,
    ) -> Result<UserProfile, OperationFailure> {
        match result {
            Ok(user) => {
                lock(&self.state).user = Some(user.clone());
                Ok(user)
            }
            Err(e) => {
                let failure = OperationFailure::from_api(&e, fallback);
                lock(&self.state).user = None;
                self.notifier.notify(Notification::error(failure.message.clone()));
                Err(failure)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use httpmock::prelude::*;
    use petshop_core::UserId;
    use serde_json::json;

    use super::*;
    use crate::api::ApiClient;
    use crate::config::ApiConfig;
    use crate::session::{MemoryStorage, SessionManager};
    use crate::view_models::TracingNotifier;

    #[tokio::test]
    async fn test_init_restores_persisted_profile() {
        let storage = Arc::new(MemoryStorage::new());
        SessionManager::load(storage.clone())
            .set_session(
                SecretString::from("T1"),
                UserProfile::new(UserId::new(1), "A", "a@b.com"),
            )
            .await;

        let server = MockServer::start();
        let config = ApiConfig::new(&server.url("/api/v1")).unwrap();
        let client = ApiClient::new(&config, Arc::new(SessionManager::load(storage))).unwrap();
        let vm = AuthViewModel::new(AuthService::new(client), Arc::new(TracingNotifier));

        assert!(!vm.is_initialized());
        let user = vm.init().await.unwrap();
        assert_eq!(user.email, "a@b.com");
        assert!(vm.is_initialized());
        assert!(vm.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_failed_login_returns_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/v1/auth/login");
            then.status(401)
                .json_body(json!({"status": "error", "message": "Invalid credentials"}));
        });
        let config = ApiConfig::new(&server.url("/api/v1")).unwrap();
        let client = ApiClient::new(&config, Arc::new(SessionManager::in_memory())).unwrap();
        let vm = AuthViewModel::new(AuthService::new(client), Arc::new(TracingNotifier));

        let failure = vm
            .login("a@b.com", &SecretString::from("nope"))
            .await
            .unwrap_err();
        assert_eq!(failure.message, "Invalid credentials");
        assert_eq!(failure.code, Some(401));
        assert!(vm.user().is_none());
        assert!(!vm.is_authenticated().await);
    }
}
