//! Product and category management pages.

use petshop_core::{Identified, Record};

use super::{ModalMode, ModalState, PageError};
use crate::api::FieldErrors;
use crate::forms::{FormError, Validate};
use crate::services::{Categories, Products, Resource};
use crate::view_models::{ListViewModel, OperationFailure};

/// What the open dialog's form submitted.
pub enum Submission<R: Resource> {
    Create(R::Draft),
    Update(R::Patch),
    Delete,
}

impl<R: Resource> Submission<R> {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Update(_) => "update",
            Self::Delete => "delete",
        }
    }

    fn validate(&self) -> Result<(), FormError> {
        match self {
            Self::Create(draft) => draft.validate(),
            Self::Update(patch) => patch.validate(),
            Self::Delete => Ok(()),
        }
    }

    fn fits(&self, mode: ModalMode) -> bool {
        matches!(
            (self, mode),
            (Self::Create(_), ModalMode::Create)
                | (Self::Update(_), ModalMode::Edit)
                | (Self::Delete, ModalMode::Delete)
        )
    }
}

impl<R: Resource> Clone for Submission<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Create(draft) => Self::Create(draft.clone()),
            Self::Update(patch) => Self::Update(patch.clone()),
            Self::Delete => Self::Delete,
        }
    }
}

/// A list of records with create, edit, and delete dialogs.
pub struct CrudPage<R: Resource> {
    list: ListViewModel<R>,
    modal: ModalState<R::Item, R::Draft>,
    /// What the user entered before the last failed submit.
    retained: Option<Submission<R>>,
}

/// Product Management.
pub type ProductPage = CrudPage<Products>;

/// Category Management.
pub type CategoryPage = CrudPage<Categories>;

impl<R: Resource> CrudPage<R> {
    #[must_use]
    pub fn new(list: ListViewModel<R>) -> Self {
        Self {
            list,
            modal: ModalState::Closed,
            retained: None,
        }
    }

    #[must_use]
    pub const fn list(&self) -> &ListViewModel<R> {
        &self.list
    }

    #[must_use]
    pub const fn modal(&self) -> &ModalState<R::Item, R::Draft> {
        &self.modal
    }

    /// Input kept from the last failed submit, to refill the form.
    #[must_use]
    pub const fn retained_input(&self) -> Option<&Submission<R>> {
        self.retained.as_ref()
    }

    /// Initial load.
    ///
    /// # Errors
    ///
    /// Returns the failure also recorded in the list's state.
    pub async fn mount(&self) -> Result<(), OperationFailure> {
        self.list.load().await
    }

    /// Reload after a failed load.
    ///
    /// # Errors
    ///
    /// Returns the failure also recorded in the list's state.
    pub async fn retry(&self) -> Result<(), OperationFailure> {
        self.list.load().await
    }

    pub fn open_create(&mut self) {
        self.retained = None;
        self.modal.open_create(R::Draft::default());
    }

    pub fn open_edit(&mut self, item: R::Item) {
        self.retained = None;
        self.modal.open_edit(item);
    }

    pub fn open_delete(&mut self, item: R::Item) {
        self.retained = None;
        self.modal.open_delete(item);
    }

    pub fn close(&mut self) {
        self.retained = None;
        self.modal.close();
    }

    /// Send the open dialog's form.
    ///
    /// The submission is validated first; invalid input never reaches the
    /// backend. Success closes the dialog. Failure keeps it open with the
    /// field errors and the submitted input.
    ///
    /// # Errors
    ///
    /// - `PageError::NotOpen` / `PageError::WrongMode` when the submission
    ///   does not fit the dialog
    /// - `PageError::Form` when the submission fails validation
    /// - `PageError::Operation` when the backend call fails
    pub async fn submit(&mut self, submission: Submission<R>) -> Result<(), PageError> {
        let Some(mode) = self.modal.mode() else {
            return Err(PageError::NotOpen);
        };
        if !submission.fits(mode) {
            return Err(PageError::WrongMode {
                open: mode,
                submitted: submission.kind(),
            });
        }
        if let Err(invalid) = submission.validate() {
            self.keep_open(submission, mode, invalid.field_errors.clone());
            return Err(PageError::Form(invalid));
        }

        let result = match (&submission, self.modal.subject()) {
            (Submission::Create(draft), _) => self.list.create(draft).await.map(drop),
            (Submission::Update(patch), Some(Record::Existing(item))) => {
                self.list.update(item.id(), patch).await.map(drop)
            }
            (Submission::Delete, Some(Record::Existing(item))) => self.list.delete(item.id()).await,
            _ => return Err(PageError::NotOpen),
        };

        match result {
            Ok(()) => {
                self.close();
                Ok(())
            }
            Err(failure) => {
                self.keep_open(submission, mode, failure.field_errors.clone());
                Err(PageError::Operation(failure))
            }
        }
    }

    /// Leave the dialog open after a rejected submit, showing `errors` and
    /// keeping what was entered.
    fn keep_open(&mut self, submission: Submission<R>, mode: ModalMode, errors: FieldErrors) {
        self.modal.set_field_errors(errors);
        if let (Submission::Create(draft), ModalMode::Create) = (&submission, mode) {
            self.modal.open_create_keeping_errors(draft.clone());
        }
        self.retained = Some(submission);
    }
}

impl<T: Identified, D> ModalState<T, D> {
    /// Replace the draft in an open create dialog, keeping its errors.
    fn open_create_keeping_errors(&mut self, draft: D) {
        if let Self::Open {
            mode: ModalMode::Create,
            subject,
            ..
        } = self
        {
            *subject = Record::Draft(draft);
        }
    }
}
