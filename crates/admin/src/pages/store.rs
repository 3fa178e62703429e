//! Store settings page.

use std::sync::{Arc, Mutex};

use tracing::warn;

use petshop_core::{Store, StoreField, StorePatch};

use super::PageError;
use crate::api::FieldErrors;
use crate::forms::validate_store;
use crate::view_models::{OperationFailure, StoreViewModel, lock};

/// Callback through which components outside the page (the map picker)
/// write store form fields.
pub type FieldChangeHandler = Arc<dyn Fn(StoreField, String) + Send + Sync>;

/// The editable copy of the store. Clones share the same form.
#[derive(Clone, Default)]
pub struct StoreForm {
    inner: Arc<Mutex<Option<Store>>>,
}

impl std::fmt::Debug for StoreForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StoreForm").field(&*lock(&self.inner)).finish()
    }
}

impl StoreForm {
    /// The form as currently edited.
    #[must_use]
    pub fn snapshot(&self) -> Option<Store> {
        lock(&self.inner).clone()
    }

    fn replace(&self, store: Option<Store>) {
        *lock(&self.inner) = store;
    }

    /// Write one field from its text value.
    ///
    /// # Errors
    ///
    /// - `PageError::NotLoaded` before the store has been loaded
    /// - `PageError::Field` when `isOpen` is not `true`/`false`
    pub fn set_field(&self, field: StoreField, value: impl Into<String>) -> Result<(), PageError> {
        let mut form = lock(&self.inner);
        let current = form.as_ref().ok_or(PageError::NotLoaded)?;
        let mut patch = StorePatch::default();
        patch.set(field, value)?;
        *form = Some(patch.applied_to(current));
        Ok(())
    }

    /// A handler that writes into this form. Rejected values are logged.
    #[must_use]
    pub fn change_handler(&self) -> FieldChangeHandler {
        let form = self.clone();
        Arc::new(move |field, value| {
            if let Err(e) = form.set_field(field, value) {
                warn!(field = %field, error = %e, "Ignoring store field change");
            }
        })
    }
}

/// Store settings: the confirmed store plus the form being edited.
pub struct StoreSettingsPage {
    vm: StoreViewModel,
    form: StoreForm,
}

impl StoreSettingsPage {
    #[must_use]
    pub fn new(vm: StoreViewModel) -> Self {
        Self {
            vm,
            form: StoreForm::default(),
        }
    }

    #[must_use]
    pub const fn view_model(&self) -> &StoreViewModel {
        &self.vm
    }

    #[must_use]
    pub const fn form(&self) -> &StoreForm {
        &self.form
    }

    /// Backend validation messages from the last save.
    #[must_use]
    pub fn field_errors(&self) -> FieldErrors {
        self.vm.field_errors()
    }

    /// Load the store and reset the form to it.
    ///
    /// # Errors
    ///
    /// Returns the failure also recorded in the view model; the form is
    /// left as it was.
    pub async fn load(&self) -> Result<Option<Store>, OperationFailure> {
        let store = self.vm.load().await?;
        self.form.replace(store.clone());
        Ok(store)
    }

    /// # Errors
    ///
    /// See [`StoreForm::set_field`].
    pub fn set_field(&self, field: StoreField, value: impl Into<String>) -> Result<(), PageError> {
        self.form.set_field(field, value)
    }

    /// Send the fields that differ from the confirmed store.
    ///
    /// With nothing changed no request is made. On failure the form keeps
    /// what the user typed.
    ///
    /// # Errors
    ///
    /// - `PageError::NotLoaded` before the store has been loaded
    /// - `PageError::Form` when a required field is blank
    /// - `PageError::Operation` when the backend rejects the update
    pub async fn save(&self) -> Result<Store, PageError> {
        let edited = self.form.snapshot().ok_or(PageError::NotLoaded)?;
        let current = self.vm.store().ok_or(PageError::NotLoaded)?;
        validate_store(&edited)?;

        let patch = StorePatch::diff(&current, &edited);
        if patch.is_empty() {
            return Ok(current);
        }

        let saved = self.vm.update(&patch).await?;
        self.form.replace(Some(saved.clone()));
        Ok(saved)
    }
}
