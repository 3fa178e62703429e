//! Dashboard wiring shared by every page.
//!
//! One [`Dashboard`] is built per process from [`AdminConfig`]. It owns the
//! session, the HTTP client, and the maps loader, and hands out the
//! services, view models, and page controllers built on them.

use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::config::AdminConfig;
use crate::maps::MapsLoader;
use crate::pages::{CategoryPage, ProductPage, StoreSettingsPage};
use crate::routes::{Route, guard};
use crate::services::{AuthService, CategoryApi, ProductApi, ResourceApi, StoreApi};
use crate::session::{FileStorage, KeyValueStorage, SessionManager};
use crate::view_models::{AuthViewModel, ListViewModel, Notifier, StoreViewModel};

/// Shared dashboard state. Cheap to clone.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<DashboardInner>,
}

struct DashboardInner {
    config: AdminConfig,
    client: ApiClient,
    auth: AuthService,
    notifier: Arc<dyn Notifier>,
    maps: MapsLoader,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl Dashboard {
    /// Build the dashboard with the session persisted in the configured file.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the HTTP client cannot be built.
    pub fn from_config(config: AdminConfig, notifier: Arc<dyn Notifier>) -> Result<Self, ApiError> {
        let storage = Arc::new(FileStorage::new(config.session_file.clone()));
        Self::with_storage(config, storage, notifier)
    }

    /// Build the dashboard over an arbitrary session storage.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the HTTP client cannot be built.
    pub fn with_storage(
        config: AdminConfig,
        storage: Arc<dyn KeyValueStorage>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ApiError> {
        let session = Arc::new(SessionManager::load(storage));
        let client = ApiClient::new(&config.api, session)?;
        let maps = MapsLoader::new(config.maps.clone());

        tracing::debug!(
            base_url = %config.api.base_url,
            maps = maps.is_configured(),
            "Dashboard initialized"
        );

        Ok(Self {
            inner: Arc::new(DashboardInner {
                auth: AuthService::new(client.clone()),
                config,
                client,
                notifier,
                maps,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionManager> {
        self.inner.client.session()
    }

    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.inner.client
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    #[must_use]
    pub fn notifier(&self) -> Arc<dyn Notifier> {
        Arc::clone(&self.inner.notifier)
    }

    #[must_use]
    pub fn maps(&self) -> &MapsLoader {
        &self.inner.maps
    }

    // =========================================================================
    // Resource clients
    // =========================================================================

    #[must_use]
    pub fn products(&self) -> ProductApi {
        ResourceApi::new(self.inner.client.clone())
    }

    #[must_use]
    pub fn categories(&self) -> CategoryApi {
        ResourceApi::new(self.inner.client.clone())
    }

    #[must_use]
    pub fn store(&self) -> StoreApi {
        StoreApi::new(self.inner.client.clone())
    }

    // =========================================================================
    // Pages
    // =========================================================================

    #[must_use]
    pub fn auth_view_model(&self) -> AuthViewModel {
        AuthViewModel::new(self.inner.auth.clone(), self.notifier())
    }

    #[must_use]
    pub fn product_page(&self) -> ProductPage {
        ProductPage::new(ListViewModel::new(self.products(), self.notifier()))
    }

    #[must_use]
    pub fn category_page(&self) -> CategoryPage {
        CategoryPage::new(ListViewModel::new(self.categories(), self.notifier()))
    }

    #[must_use]
    pub fn store_page(&self) -> StoreSettingsPage {
        StoreSettingsPage::new(StoreViewModel::new(self.store(), self.notifier()))
    }

    /// Resolve a location path to the route that will be shown, or `None`
    /// when nothing lives there.
    pub async fn navigate(&self, path: &str) -> Option<Route> {
        let route = Route::from_path(path)?;
        Some(guard(route, &self.inner.auth).await)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::session::MemoryStorage;
    use crate::view_models::TracingNotifier;

    fn dashboard() -> Dashboard {
        let vars: HashMap<&str, &str> = HashMap::new();
        let config = AdminConfig::from_lookup(|key| vars.get(key).map(ToString::to_string)).unwrap();
        Dashboard::with_storage(config, Arc::new(MemoryStorage::new()), Arc::new(TracingNotifier))
            .unwrap()
    }

    #[tokio::test]
    async fn test_signed_out_navigation() {
        let dashboard = dashboard();
        assert_eq!(dashboard.navigate("/product").await, Some(Route::Auth));
        assert_eq!(dashboard.navigate("/").await, Some(Route::Home));
        assert_eq!(dashboard.navigate("/missing").await, None);
    }

    #[tokio::test]
    async fn test_pages_share_the_session() {
        let dashboard = dashboard();
        let page = dashboard.product_page();
        assert!(!page.modal().is_open());
        assert!(Arc::ptr_eq(dashboard.session(), dashboard.auth().client().session()));
        assert!(!dashboard.maps().is_configured());
    }
}
