//! Store profile endpoints.

use serde::Deserialize;
use tracing::instrument;

use petshop_core::{Store, StorePatch};

use crate::api::{ApiClient, ApiError};

/// Path of the store resource.
pub const STORE_PATH: &str = "store";

/// `data` as the store endpoint returns it: normally a list, sometimes the
/// bare store object.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> From<OneOrMany<T>> for Vec<T> {
    fn from(value: OneOrMany<T>) -> Self {
        match value {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

/// Client for the singleton store profile.
#[derive(Clone, Debug)]
pub struct StoreApi {
    client: ApiClient,
}

impl StoreApi {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// The store list as the backend returns it (normally one element). A
    /// single store object is treated as a one-element list.
    ///
    /// # Errors
    ///
    /// Propagates the `ApiError` unchanged.
    #[instrument(skip(self))]
    pub async fn get_all(&self) -> Result<Vec<Store>, ApiError> {
        let stores: OneOrMany<Store> = self.client.get(STORE_PATH).await?.into_data();
        Ok(stores.into())
    }

    /// "The" store: the first element of the list, if any.
    ///
    /// # Errors
    ///
    /// Propagates the `ApiError` unchanged.
    pub async fn current(&self) -> Result<Option<Store>, ApiError> {
        Ok(self.get_all().await?.into_iter().next())
    }

    /// Merge `patch` into the store server-side (`PATCH`).
    ///
    /// # Errors
    ///
    /// Propagates the `ApiError` unchanged.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, patch: &StorePatch) -> Result<Store, ApiError> {
        Ok(self.client.patch(STORE_PATH, patch).await?.into_data())
    }
}
