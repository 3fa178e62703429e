//! Single-flight execution: concurrent callers share one in-flight operation.

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

/// A guarded slot holding at most one in-flight operation.
///
/// The first caller of [`run`](Self::run) starts the operation; anyone
/// arriving while it is pending attaches to it and receives a clone of the
/// same result. The slot is emptied as soon as the operation settles,
/// whatever the outcome, so the next call starts afresh.
pub struct SingleFlight<T> {
    slot: Mutex<Option<Shared<BoxFuture<'static, T>>>>,
}

impl<T> Default for SingleFlight<T> {
    fn default() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }
}

impl<T> SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `start()` unless an operation is already in flight, in which
    /// case wait for that one instead. `start` is only called by the
    /// caller that actually begins a new operation.
    pub async fn run<F, Fut>(&self, start: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let flight = {
            let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
            match slot.as_ref() {
                Some(pending) => {
                    tracing::debug!("Joining in-flight operation");
                    pending.clone()
                }
                None => {
                    let fresh = start().boxed().shared();
                    *slot = Some(fresh.clone());
                    fresh
                }
            }
        };

        let result = flight.clone().await;

        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|current| current.ptr_eq(&flight)) {
            *slot = None;
        }
        result
    }

    /// Whether an operation is currently pending.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
