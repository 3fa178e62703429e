//! Store profile view model.

use std::sync::{Arc, Mutex};

use petshop_core::{Store, StorePatch};

use super::{InFlight, LoadStatus, Notification, Notifier, OperationFailure, Pending, lock};
use crate::api::FieldErrors;
use crate::services::StoreApi;

#[derive(Default)]
struct StoreState {
    store: Option<Store>,
    in_flight: usize,
    error: Option<String>,
    field_errors: FieldErrors,
    loaded: bool,
}

impl Pending for StoreState {
    fn pending(&mut self) -> &mut usize {
        &mut self.in_flight
    }
}

/// Point-in-time copy of the store view model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub store: Option<Store>,
    pub status: LoadStatus,
    pub field_errors: FieldErrors,
}

/// State container for the singleton store profile.
pub struct StoreViewModel {
    api: StoreApi,
    notifier: Arc<dyn Notifier>,
    state: Mutex<StoreState>,
}

impl StoreViewModel {
    #[must_use]
    pub fn new(api: StoreApi, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            state: Mutex::new(StoreState::default()),
        }
    }

    /// The store as last confirmed by the backend.
    #[must_use]
    pub fn store(&self) -> Option<Store> {
        lock(&self.state).store.clone()
    }

    #[must_use]
    pub fn status(&self) -> LoadStatus {
        let state = lock(&self.state);
        LoadStatus::derive(state.in_flight, state.error.as_deref(), state.loaded)
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        lock(&self.state).error.clone()
    }

    /// Per-field messages from the last rejected update.
    #[must_use]
    pub fn field_errors(&self) -> FieldErrors {
        lock(&self.state).field_errors.clone()
    }

    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        let state = lock(&self.state);
        StoreSnapshot {
            store: state.store.clone(),
            status: LoadStatus::derive(state.in_flight, state.error.as_deref(), state.loaded),
            field_errors: state.field_errors.clone(),
        }
    }

    /// Fetch the store list and keep its first element.
    ///
    /// # Errors
    ///
    /// Returns the recorded `OperationFailure`.
    pub async fn load(&self) -> Result<Option<Store>, OperationFailure> {
        lock(&self.state).error = None;
        let result = {
            let _guard = InFlight::begin(&self.state);
            self.api.current().await
        };

        match result {
            Ok(store) => {
                let mut state = lock(&self.state);
                state.store.clone_from(&store);
                state.loaded = true;
                Ok(store)
            }
            Err(e) => {
                let failure = OperationFailure::from_api(&e, "Failed to load store");
                lock(&self.state).error = Some(failure.message.clone());
                self.notifier.notify(Notification::error(failure.message.clone()));
                Err(failure)
            }
        }
    }

    /// Send `patch`; the shown store changes only once the backend accepts it.
    ///
    /// Backend validation messages land in [`field_errors`](Self::field_errors)
    /// rather than the general error.
    ///
    /// # Errors
    ///
    /// Returns the recorded `OperationFailure`.
    pub async fn update(&self, patch: &StorePatch) -> Result<Store, OperationFailure> {
        {
            let mut state = lock(&self.state);
            state.error = None;
            state.field_errors.clear();
        }
        let result = {
            let _guard = InFlight::begin(&self.state);
            self.api.update(patch).await
        };

        match result {
            Ok(store) => {
                let mut state = lock(&self.state);
                state.store = Some(store.clone());
                state.loaded = true;
                drop(state);
                self.notifier
                    .notify(Notification::success("Store updated successfully"));
                Ok(store)
            }
            Err(e) => {
                let failure = OperationFailure::from_api(&e, "Update failed");
                let mut state = lock(&self.state);
                if failure.has_field_errors() {
                    state.field_errors.clone_from(&failure.field_errors);
                } else {
                    state.error = Some(failure.message.clone());
                }
                drop(state);
                self.notifier.notify(Notification::error(failure.message.clone()));
                Err(failure)
            }
        }
    }
}
