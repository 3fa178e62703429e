//! Page controllers.
//!
//! A page owns the view model it renders and the state of its dialogs. The
//! dialog state belongs to the page alone: it is never persisted and closing
//! a dialog discards everything in it.

pub mod crud;
pub mod store;

pub use crud::{CategoryPage, CrudPage, ProductPage, Submission};
pub use store::{FieldChangeHandler, StoreForm, StoreSettingsPage};

use thiserror::Error;

use petshop_core::{Identified, Record, StoreFieldError};

use crate::api::FieldErrors;
use crate::forms::FormError;
use crate::view_models::OperationFailure;

/// What a dialog was opened for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalMode {
    Create,
    Edit,
    Delete,
}

/// Dialog state for one page.
#[derive(Debug, Clone, PartialEq)]
pub enum ModalState<T, D> {
    Closed,
    Open {
        mode: ModalMode,
        /// A fresh draft when creating; the selected record otherwise.
        subject: Record<T, D>,
        /// Backend messages from the last failed submit.
        field_errors: FieldErrors,
    },
}

impl<T, D> Default for ModalState<T, D> {
    fn default() -> Self {
        Self::Closed
    }
}

impl<T: Identified, D> ModalState<T, D> {
    /// Open the create dialog on `draft`.
    pub fn open_create(&mut self, draft: D) {
        self.open(ModalMode::Create, Record::Draft(draft));
    }

    /// Open the edit dialog on `item`.
    pub fn open_edit(&mut self, item: T) {
        self.open(ModalMode::Edit, Record::Existing(item));
    }

    /// Open the delete confirmation for `item`.
    pub fn open_delete(&mut self, item: T) {
        self.open(ModalMode::Delete, Record::Existing(item));
    }

    fn open(&mut self, mode: ModalMode, subject: Record<T, D>) {
        *self = Self::Open {
            mode,
            subject,
            field_errors: FieldErrors::new(),
        };
    }

    /// Close the dialog, dropping its subject and errors.
    pub fn close(&mut self) {
        *self = Self::Closed;
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }

    #[must_use]
    pub const fn mode(&self) -> Option<ModalMode> {
        match self {
            Self::Open { mode, .. } => Some(*mode),
            Self::Closed => None,
        }
    }

    #[must_use]
    pub const fn subject(&self) -> Option<&Record<T, D>> {
        match self {
            Self::Open { subject, .. } => Some(subject),
            Self::Closed => None,
        }
    }

    /// Id of the selected record; `None` when closed or creating.
    #[must_use]
    pub fn selected_id(&self) -> Option<T::Id> {
        self.subject().and_then(Record::id)
    }

    #[must_use]
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Open { field_errors, .. } => Some(field_errors),
            Self::Closed => None,
        }
    }

    /// Record backend field errors on the open dialog.
    fn set_field_errors(&mut self, errors: FieldErrors) {
        if let Self::Open { field_errors, .. } = self {
            *field_errors = errors;
        }
    }
}

/// Errors surfaced by page actions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    /// Input rejected before sending.
    #[error(transparent)]
    Form(#[from] FormError),

    /// The backend refused or could not be reached.
    #[error(transparent)]
    Operation(#[from] OperationFailure),

    /// Submit was called with no dialog open.
    #[error("no dialog is open")]
    NotOpen,

    /// The submission does not match the open dialog.
    #[error("a {submitted} submission does not fit the open {open:?} dialog")]
    WrongMode {
        open: ModalMode,
        submitted: &'static str,
    },

    /// A field value the form cannot hold.
    #[error(transparent)]
    Field(#[from] StoreFieldError),

    /// Nothing has been loaded to edit yet.
    #[error("the store has not been loaded")]
    NotLoaded,
}
