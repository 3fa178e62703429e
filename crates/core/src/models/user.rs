//! Signed-in user profile.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::UserId;

/// Profile of the signed-in dashboard user.
///
/// Treated as an opaque pass-through from the backend: fields this crate
/// does not know about are kept in `extra` and written back unchanged when
/// the profile is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    #[must_use]
    pub fn new(id: UserId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            role: None,
            extra: Map::new(),
        }
    }
}
