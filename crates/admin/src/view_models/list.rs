//! List view model for products and categories.

use std::sync::{Arc, Mutex};

use petshop_core::Identified;

use super::{InFlight, LoadStatus, Notification, Notifier, OperationFailure, Pending, lock};
use crate::api::ApiError;
use crate::services::{Categories, IdOf, Products, Resource, ResourceApi};

struct ListState<T> {
    items: Vec<T>,
    in_flight: usize,
    error: Option<String>,
    loaded: bool,
    /// Bumped by every load or search; only the newest may replace `items`.
    generation: u64,
}

impl<T> Pending for ListState<T> {
    fn pending(&mut self) -> &mut usize {
        &mut self.in_flight
    }
}

/// Point-in-time copy of a list view model.
#[derive(Debug, Clone, PartialEq)]
pub struct ListSnapshot<T> {
    pub items: Vec<T>,
    pub status: LoadStatus,
    pub error: Option<String>,
}

/// State container for one resource list.
///
/// Writes patch the list in place once the backend confirms them: create
/// appends, update replaces by id, delete removes by id. Because each write
/// touches only its own id, concurrent writes commute. Whole-list
/// replacements (load, search) are stamped, and a response that arrives
/// after a newer load or search was started is dropped.
pub struct ListViewModel<R: Resource> {
    api: ResourceApi<R>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<ListState<R::Item>>,
}

/// Product list.
pub type ProductsViewModel = ListViewModel<Products>;

/// Category list.
pub type CategoriesViewModel = ListViewModel<Categories>;

enum Replace {
    Load,
    Search,
}

impl<R: Resource> ListViewModel<R> {
    #[must_use]
    pub fn new(api: ResourceApi<R>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            state: Mutex::new(ListState {
                items: Vec::new(),
                in_flight: 0,
                error: None,
                loaded: false,
                generation: 0,
            }),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Current items.
    #[must_use]
    pub fn items(&self) -> Vec<R::Item> {
        lock(&self.state).items.clone()
    }

    /// What the screen should show.
    #[must_use]
    pub fn status(&self) -> LoadStatus {
        let state = lock(&self.state);
        LoadStatus::derive(state.in_flight, state.error.as_deref(), state.loaded)
    }

    /// Message of the last failure, cleared when the next operation starts.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        lock(&self.state).error.clone()
    }

    /// Whether any operation is pending.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        lock(&self.state).in_flight > 0
    }

    /// Consistent copy of items, status, and error.
    #[must_use]
    pub fn snapshot(&self) -> ListSnapshot<R::Item> {
        let state = lock(&self.state);
        ListSnapshot {
            items: state.items.clone(),
            status: LoadStatus::derive(state.in_flight, state.error.as_deref(), state.loaded),
            error: state.error.clone(),
        }
    }

    // =========================================================================
    // Whole-list operations
    // =========================================================================

    /// Fetch the full list, replacing what is shown.
    ///
    /// # Errors
    ///
    /// Returns the recorded `OperationFailure`.
    pub async fn load(&self) -> Result<(), OperationFailure> {
        self.replace(Replace::Load, self.api.get_all()).await
    }

    /// Show only the items matching `query`.
    ///
    /// # Errors
    ///
    /// Returns the recorded `OperationFailure`.
    pub async fn search(&self, query: &str) -> Result<(), OperationFailure> {
        self.replace(Replace::Search, self.api.search(query)).await
    }

    async fn replace(
        &self,
        kind: Replace,
        fetch: impl Future<Output = Result<Vec<R::Item>, ApiError>>,
    ) -> Result<(), OperationFailure> {
        let generation = {
            let mut state = lock(&self.state);
            state.generation += 1;
            state.error = None;
            state.generation
        };
        let guard = InFlight::begin(&self.state);
        let result = fetch.await;
        drop(guard);

        let mut state = lock(&self.state);
        let current = state.generation == generation;
        match result {
            Ok(items) if current => {
                tracing::debug!(resource = R::PATH, count = items.len(), "List replaced");
                state.items = items;
                state.loaded = true;
                Ok(())
            }
            Ok(_) => {
                tracing::debug!(resource = R::PATH, generation, "Dropping stale list response");
                Ok(())
            }
            Err(e) => {
                let fallback = match kind {
                    Replace::Load => format!("Failed to load {}", R::PLURAL),
                    Replace::Search => format!("Failed to search {}", R::PLURAL),
                };
                let failure = OperationFailure::from_api(&e, &fallback);
                if current {
                    state.error = Some(failure.message.clone());
                }
                drop(state);
                Err(self.report(failure))
            }
        }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Create an item and append the backend's copy to the list.
    ///
    /// # Errors
    ///
    /// Returns the recorded `OperationFailure`; the list is unchanged.
    pub async fn create(&self, draft: &R::Draft) -> Result<R::Item, OperationFailure> {
        let result = self.write(self.api.create(draft)).await;
        self.settle(result, "created", "create", |items, created: &R::Item| {
            items.push(created.clone());
        })
    }

    /// Update an item and replace it in the list by id.
    ///
    /// # Errors
    ///
    /// Returns the recorded `OperationFailure`; the list is unchanged.
    pub async fn update(&self, id: IdOf<R>, patch: &R::Patch) -> Result<R::Item, OperationFailure> {
        let result = self.write(self.api.update(id, patch)).await;
        self.settle(result, "updated", "update", |items, updated: &R::Item| {
            for item in items.iter_mut().filter(|item| item.id() == id) {
                *item = updated.clone();
            }
        })
    }

    /// Delete an item and remove it from the list by id.
    ///
    /// # Errors
    ///
    /// Returns the recorded `OperationFailure`; the list is unchanged.
    pub async fn delete(&self, id: IdOf<R>) -> Result<(), OperationFailure> {
        let result = self.write(self.api.delete(id)).await;
        self.settle(result, "deleted", "delete", |items, _: &()| {
            items.retain(|item| item.id() != id);
        })
    }

    async fn write<T>(&self, call: impl Future<Output = Result<T, ApiError>>) -> Result<T, ApiError> {
        lock(&self.state).error = None;
        let _guard = InFlight::begin(&self.state);
        call.await
    }

    fn settle<T>(
        &self,
        result: Result<T, ApiError>,
        done: &str,
        verb: &str,
        apply: impl FnOnce(&mut Vec<R::Item>, &T),
    ) -> Result<T, OperationFailure> {
        match result {
            Ok(value) => {
                apply(&mut lock(&self.state).items, &value);
                self.notifier
                    .notify(Notification::success(format!("{} {done} successfully", R::NAME)));
                Ok(value)
            }
            Err(e) => {
                let failure = OperationFailure::from_api(
                    &e,
                    &format!("Failed to {verb} {}", R::NAME.to_lowercase()),
                );
                lock(&self.state).error = Some(failure.message.clone());
                Err(self.report(failure))
            }
        }
    }

    fn report(&self, failure: OperationFailure) -> OperationFailure {
        tracing::debug!(resource = R::PATH, error = %failure, "Operation failed");
        self.notifier.notify(Notification::error(failure.message.clone()));
        failure
    }
}
