//! Persisted session: the bearer token and the last known user profile.
//!
//! The session is an explicit object, constructed once and shared through
//! an `Arc` with the HTTP client and the auth service. It mirrors its
//! state into a [`KeyValueStorage`] under the keys in [`keys`]; the
//! storage is a side channel, so write failures are logged and never fail
//! the in-memory update.
//!
//! No expiry is tracked here. A token is considered valid until the
//! backend says otherwise.

pub mod storage;

pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};

use std::sync::Arc;

use petshop_core::UserProfile;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::RwLock;

/// Storage keys for session data.
pub mod keys {
    /// Raw bearer token string.
    pub const AUTH_TOKEN: &str = "authToken";

    /// JSON-serialized [`UserProfile`](petshop_core::UserProfile).
    pub const USER: &str = "user";
}

/// Marker that changes every time the session is cleared.
///
/// A request remembers the epoch it was sent under; a different epoch
/// later means the session it belonged to has ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Epoch(u64);

#[derive(Default)]
struct SessionState {
    token: Option<SecretString>,
    user: Option<UserProfile>,
    epoch: Epoch,
}

/// Holder of the current session.
pub struct SessionManager {
    storage: Arc<dyn KeyValueStorage>,
    state: RwLock<SessionState>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Restore the session persisted in `storage`.
    ///
    /// A user profile that fails to parse invalidates the whole session:
    /// both keys are removed and the manager starts signed out.
    #[must_use]
    pub fn load(storage: Arc<dyn KeyValueStorage>) -> Self {
        let token = read_key(storage.as_ref(), keys::AUTH_TOKEN)
            .filter(|t| !t.is_empty())
            .map(SecretString::from);

        let user = match read_key(storage.as_ref(), keys::USER) {
            None => Some(None),
            Some(raw) => match serde_json::from_str::<UserProfile>(&raw) {
                Ok(user) => Some(Some(user)),
                Err(e) => {
                    tracing::warn!(error = %e, "Stored user profile is malformed, clearing session");
                    None
                }
            },
        };

        let state = match user {
            Some(user) => SessionState {
                token,
                user,
                epoch: Epoch::default(),
            },
            None => {
                remove_key(storage.as_ref(), keys::AUTH_TOKEN);
                remove_key(storage.as_ref(), keys::USER);
                SessionState::default()
            }
        };

        Self {
            storage,
            state: RwLock::new(state),
        }
    }

    /// A signed-out session over fresh in-memory storage.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::load(Arc::new(MemoryStorage::new()))
    }

    /// The current bearer token, if any.
    pub async fn token(&self) -> Option<SecretString> {
        self.state.read().await.token.clone()
    }

    /// The current token together with the epoch it belongs to.
    pub async fn credentials(&self) -> (Option<SecretString>, Epoch) {
        let state = self.state.read().await;
        (state.token.clone(), state.epoch)
    }

    pub async fn epoch(&self) -> Epoch {
        self.state.read().await.epoch
    }

    /// Whether a token is held. Purely local; freshness is not checked.
    pub async fn has_token(&self) -> bool {
        self.state.read().await.token.is_some()
    }

    /// The cached user profile, if any.
    pub async fn user(&self) -> Option<UserProfile> {
        self.state.read().await.user.clone()
    }

    /// Store a freshly issued token and the profile it belongs to.
    pub async fn set_session(&self, token: SecretString, user: UserProfile) {
        let mut state = self.state.write().await;
        self.persist(keys::AUTH_TOKEN, token.expose_secret());
        self.persist_user(&user);
        state.token = Some(token);
        state.user = Some(user);
    }

    /// Replace the token, keeping the profile (used after a refresh).
    pub async fn set_token(&self, token: SecretString) {
        let mut state = self.state.write().await;
        self.persist(keys::AUTH_TOKEN, token.expose_secret());
        state.token = Some(token);
    }

    /// Replace the cached profile.
    pub async fn set_user(&self, user: UserProfile) {
        let mut state = self.state.write().await;
        self.persist_user(&user);
        state.user = Some(user);
    }

    /// Drop the token but keep the profile.
    pub async fn clear_token(&self) {
        let mut state = self.state.write().await;
        remove_key(self.storage.as_ref(), keys::AUTH_TOKEN);
        state.token = None;
    }

    /// Drop the token only if it is still `sent`.
    ///
    /// A request that fails with 401 must not wipe a token another caller
    /// has refreshed in the meantime. Returns `true` if the token was cleared.
    pub async fn clear_token_if(&self, sent: &SecretString) -> bool {
        let mut state = self.state.write().await;
        let matches = state
            .token
            .as_ref()
            .is_some_and(|current| current.expose_secret() == sent.expose_secret());
        if matches {
            remove_key(self.storage.as_ref(), keys::AUTH_TOKEN);
            state.token = None;
        }
        matches
    }

    /// Forget everything: token, profile, and their persisted copies.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        remove_key(self.storage.as_ref(), keys::AUTH_TOKEN);
        remove_key(self.storage.as_ref(), keys::USER);
        let next = Epoch(state.epoch.0.wrapping_add(1));
        *state = SessionState {
            epoch: next,
            ..SessionState::default()
        };
    }

    fn persist(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.set(key, value) {
            tracing::warn!(key, error = %e, "Failed to persist session value");
        }
    }

    fn persist_user(&self, user: &UserProfile) {
        match serde_json::to_string(user) {
            Ok(json) => self.persist(keys::USER, &json),
            Err(e) => tracing::warn!(error = %e, "Failed to serialize user profile"),
        }
    }
}

fn read_key(storage: &dyn KeyValueStorage, key: &str) -> Option<String> {
    storage.get(key).unwrap_or_else(|e| {
        tracing::warn!(key, error = %e, "Failed to read session value");
        None
    })
}

fn remove_key(storage: &dyn KeyValueStorage, key: &str) {
    if let Err(e) = storage.remove(key) {
        tracing::warn!(key, error = %e, "Failed to remove session value");
    }
}
