//! End-to-end tests for the petshop admin dashboard.
//!
//! Each test drives a real [`Dashboard`] against an `httpmock` server that
//! plays the backend (and, where needed, the Google Maps web services).
//! Sessions live in a [`MemoryStorage`] shared across "reloads", so a test
//! can tear the dashboard down and build a new one over the same storage.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p petshop-integration-tests
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use httpmock::MockServer;
use serde_json::{Value, json};

use petshop_admin::Dashboard;
use petshop_admin::config::AdminConfig;
use petshop_admin::session::{MemoryStorage, keys};
use petshop_admin::view_models::{Notification, NotificationLevel, Notifier};

/// Key used whenever a test enables maps.
pub const MAPS_KEY: &str = "AIzaIntegrationKey";

/// Notifier that keeps every notification for later inspection.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn all(&self) -> Vec<Notification> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages at `level`, oldest first.
    #[must_use]
    pub fn messages(&self, level: NotificationLevel) -> Vec<String> {
        self.all()
            .into_iter()
            .filter(|n| n.level == level)
            .map(|n| n.message)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

/// A fake backend plus the storage and notifier a dashboard runs on.
pub struct TestBackend {
    pub server: MockServer,
    pub storage: Arc<MemoryStorage>,
    pub notifier: Arc<RecordingNotifier>,
    maps: bool,
}

impl Default for TestBackend {
    fn default() -> Self {
        Self::start()
    }
}

impl TestBackend {
    /// Start a backend with an empty session.
    #[must_use]
    pub fn start() -> Self {
        Self {
            server: MockServer::start(),
            storage: Arc::new(MemoryStorage::new()),
            notifier: Arc::new(RecordingNotifier::default()),
            maps: false,
        }
    }

    /// Also serve the Google Maps web services from the same mock server.
    #[must_use]
    pub const fn with_maps(mut self) -> Self {
        self.maps = true;
        self
    }

    /// Path on the mock server for a backend endpoint.
    #[must_use]
    pub fn api_path(path: &str) -> String {
        format!("/api/v1/{}", path.trim_start_matches('/'))
    }

    /// Build a dashboard over this backend's storage, as a fresh page load would.
    ///
    /// # Panics
    ///
    /// Panics if the configuration or HTTP client cannot be built.
    #[must_use]
    pub fn dashboard(&self) -> Dashboard {
        let mut vars = HashMap::from([("PETSHOP_API_BASE_URL", self.server.url("/api/v1"))]);
        if self.maps {
            vars.insert("GOOGLE_MAPS_API_KEY", MAPS_KEY.to_string());
            vars.insert("GOOGLE_MAPS_API_BASE", self.server.base_url());
        }
        let config = AdminConfig::from_lookup(|key| vars.get(key).cloned())
            .expect("test configuration is valid");
        Dashboard::with_storage(config, self.storage.clone(), self.notifier.clone())
            .expect("dashboard builds")
    }

    /// The token as persisted, if any.
    #[must_use]
    pub fn stored_token(&self) -> Option<String> {
        self.storage.peek(keys::AUTH_TOKEN)
    }

    /// The user profile as persisted, if any.
    #[must_use]
    pub fn stored_user(&self) -> Option<Value> {
        self.storage
            .peek(keys::USER)
            .and_then(|raw| serde_json::from_str(&raw).ok())
    }
}

/// A user profile as the backend returns it.
#[must_use]
pub fn user_json() -> Value {
    json!({"id": 1, "name": "Ayu", "email": "ayu@petshop.id", "role": "owner"})
}

/// The backend's store list with one store.
#[must_use]
pub fn store_json(is_open: bool) -> Value {
    json!({
        "id": 1,
        "name": "Pawsome",
        "address": "Jl. Sudirman 1, Jakarta",
        "mapsUrl": "https://www.google.com/maps/embed/v1/place?key=K&q=-6.2,106.8",
        "logo": "https://cdn.petshop.id/logo.png",
        "isOpen": is_open
    })
}
