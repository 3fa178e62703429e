//! Per-resource state containers.
//!
//! A view model owns what a screen shows for one resource: the data, whether
//! an operation is pending, and the last error. It is the error boundary of
//! the dashboard: every failure is recorded in state, announced through a
//! [`Notifier`], and handed back as an [`OperationFailure`] value. Nothing
//! past a view model ever sees an [`ApiError`](crate::api::ApiError).
//!
//! State changes only once the backend has confirmed an operation; there is
//! no optimistic mutation and therefore nothing to roll back.

pub mod auth;
pub mod list;
pub mod store;

pub use auth::AuthViewModel;
pub use list::{CategoriesViewModel, ListSnapshot, ListViewModel, ProductsViewModel};
pub use store::{StoreSnapshot, StoreViewModel};

use std::sync::{Mutex, PoisonError};

use thiserror::Error;

use crate::api::{ApiError, FieldErrors};

/// What a screen should render for a view model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// Nothing requested yet.
    Idle,
    /// At least one operation is pending.
    Loading,
    /// Data is present and the last operation succeeded.
    Ready,
    /// The last operation failed with this message.
    Error(String),
}

impl LoadStatus {
    fn derive(in_flight: usize, error: Option<&str>, loaded: bool) -> Self {
        if in_flight > 0 {
            Self::Loading
        } else if let Some(message) = error {
            Self::Error(message.to_string())
        } else if loaded {
            Self::Ready
        } else {
            Self::Idle
        }
    }
}

/// A failed view-model operation, already recorded and announced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct OperationFailure {
    pub message: String,
    /// Backend validation messages keyed by field; empty when none.
    pub field_errors: FieldErrors,
    /// Backend code (HTTP status, or 0 for transport failures).
    pub code: Option<i64>,
}

impl OperationFailure {
    /// Convert an API error, using `fallback` when the backend gave no message.
    #[must_use]
    pub fn from_api(error: &ApiError, fallback: &str) -> Self {
        let message = error
            .envelope()
            .map(|e| e.message.clone())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_string());
        Self {
            message,
            field_errors: error.field_errors(),
            code: error.code(),
        }
    }

    /// A failure that never reached the backend.
    #[must_use]
    pub fn local(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field_errors: FieldErrors::new(),
            code: None,
        }
    }

    /// Returns `true` when the backend rejected specific fields.
    #[must_use]
    pub fn has_field_errors(&self) -> bool {
        !self.field_errors.is_empty()
    }
}

// =============================================================================
// Notifications
// =============================================================================

/// Severity of a transient notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A transient, user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// Displays notifications to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log: successes at `info`, failures at `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => tracing::info!(message = %notification.message, "Notification"),
            NotificationLevel::Error => tracing::warn!(message = %notification.message, "Notification"),
        }
    }
}

// =============================================================================
// Shared helpers
// =============================================================================

/// Lock a view-model state mutex. The lock is never held across an await.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// State that counts pending operations.
trait Pending {
    fn pending(&mut self) -> &mut usize;
}

/// Marks one operation as pending until dropped, so an abandoned future
/// does not leave the view model loading forever.
struct InFlight<'a, S: Pending> {
    state: &'a Mutex<S>,
}

impl<'a, S: Pending> InFlight<'a, S> {
    fn begin(state: &'a Mutex<S>) -> Self {
        *lock(state).pending() += 1;
        Self { state }
    }
}

impl<S: Pending> Drop for InFlight<'_, S> {
    fn drop(&mut self) {
        let mut state = lock(self.state);
        let pending = state.pending();
        *pending = pending.saturating_sub(1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::{ErrorEnvelope, FieldError};

    #[test]
    fn test_status_precedence() {
        assert_eq!(LoadStatus::derive(0, None, false), LoadStatus::Idle);
        assert_eq!(LoadStatus::derive(0, None, true), LoadStatus::Ready);
        assert_eq!(
            LoadStatus::derive(0, Some("boom"), true),
            LoadStatus::Error("boom".to_string())
        );
        assert_eq!(LoadStatus::derive(2, Some("boom"), true), LoadStatus::Loading);
    }

    #[test]
    fn test_failure_prefers_backend_message() {
        let error = ApiError::Api(ErrorEnvelope {
            status: "error".to_string(),
            message: "Validation failed".to_string(),
            code: Some(422),
            field_errors: vec![FieldError {
                field: "name".to_string(),
                message: "required".to_string(),
            }],
        });
        let failure = OperationFailure::from_api(&error, "Failed to create category");
        assert_eq!(failure.message, "Validation failed");
        assert_eq!(failure.code, Some(422));
        assert!(failure.has_field_errors());
    }

    #[test]
    fn test_failure_falls_back_without_envelope() {
        let error = ApiError::from(serde_json::from_str::<u8>("[]").unwrap_err());
        let failure = OperationFailure::from_api(&error, "Failed to load products");
        assert_eq!(failure.message, "Failed to load products");
        assert!(!failure.has_field_errors());
    }

    #[test]
    fn test_in_flight_guard_releases_on_drop() {
        struct Counter(usize);
        impl Pending for Counter {
            fn pending(&mut self) -> &mut usize {
                &mut self.0
            }
        }

        let state = Mutex::new(Counter(0));
        {
            let _a = InFlight::begin(&state);
            let _b = InFlight::begin(&state);
            assert_eq!(lock(&state).0, 2);
        }
        assert_eq!(lock(&state).0, 0);
    }
}
