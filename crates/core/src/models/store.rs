//! Store profile (one per tenant).

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Identified, StoreId};

/// The tenant's store profile.
///
/// There is exactly one logical store; the backend still lists it as an
/// array and the first element is "the" store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub maps_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiktok: Option<String>,
    #[serde(default)]
    pub is_open: bool,
}

impl Identified for Store {
    type Id = StoreId;

    fn id(&self) -> StoreId {
        self.id
    }
}

/// Partial store update sent with PATCH; the merge happens server-side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maps_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiktok: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_open: Option<bool>,
}

impl StorePatch {
    /// Returns `true` when the patch would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Set one field from its textual form value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreFieldError::NotABoolean`] when `is_open` receives
    /// something other than `true`/`false`.
    pub fn set(&mut self, field: StoreField, value: impl Into<String>) -> Result<(), StoreFieldError> {
        let value = value.into();
        match field {
            StoreField::Name => self.name = Some(value),
            StoreField::Address => self.address = Some(value),
            StoreField::MapsUrl => self.maps_url = Some(value),
            StoreField::Logo => self.logo = Some(value),
            StoreField::Whatsapp => self.whatsapp = Some(value),
            StoreField::Facebook => self.facebook = Some(value),
            StoreField::Instagram => self.instagram = Some(value),
            StoreField::Tiktok => self.tiktok = Some(value),
            StoreField::IsOpen => {
                let open = value
                    .trim()
                    .parse::<bool>()
                    .map_err(|_| StoreFieldError::NotABoolean(value.clone()))?;
                self.is_open = Some(open);
            }
        }
        Ok(())
    }

    /// The fields of `edited` that differ from `current`.
    #[must_use]
    pub fn diff(current: &Store, edited: &Store) -> Self {
        let changed = |before: &String, after: &String| (before != after).then(|| after.clone());
        let changed_opt = |before: &Option<String>, after: &Option<String>| {
            if before == after {
                None
            } else {
                Some(after.clone().unwrap_or_default())
            }
        };
        Self {
            name: changed(&current.name, &edited.name),
            address: changed(&current.address, &edited.address),
            maps_url: changed(&current.maps_url, &edited.maps_url),
            logo: changed_opt(&current.logo, &edited.logo),
            whatsapp: changed_opt(&current.whatsapp, &edited.whatsapp),
            facebook: changed_opt(&current.facebook, &edited.facebook),
            instagram: changed_opt(&current.instagram, &edited.instagram),
            tiktok: changed_opt(&current.tiktok, &edited.tiktok),
            is_open: (current.is_open != edited.is_open).then_some(edited.is_open),
        }
    }

    /// Apply this patch on top of `store`, the way the backend merges it.
    #[must_use]
    pub fn applied_to(&self, store: &Store) -> Store {
        let pick = |patched: &Option<String>, current: &Option<String>| {
            patched.clone().or_else(|| current.clone())
        };
        Store {
            id: store.id,
            name: self.name.clone().unwrap_or_else(|| store.name.clone()),
            address: self.address.clone().unwrap_or_else(|| store.address.clone()),
            maps_url: self.maps_url.clone().unwrap_or_else(|| store.maps_url.clone()),
            logo: pick(&self.logo, &store.logo),
            whatsapp: pick(&self.whatsapp, &store.whatsapp),
            facebook: pick(&self.facebook, &store.facebook),
            instagram: pick(&self.instagram, &store.instagram),
            tiktok: pick(&self.tiktok, &store.tiktok),
            is_open: self.is_open.unwrap_or(store.is_open),
        }
    }
}

/// Names of the editable store form fields, as the backend spells them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreField {
    Name,
    Address,
    MapsUrl,
    Logo,
    Whatsapp,
    Facebook,
    Instagram,
    Tiktok,
    IsOpen,
}

impl StoreField {
    pub const ALL: [Self; 9] = [
        Self::Name,
        Self::Address,
        Self::MapsUrl,
        Self::Logo,
        Self::Whatsapp,
        Self::Facebook,
        Self::Instagram,
        Self::Tiktok,
        Self::IsOpen,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Address => "address",
            Self::MapsUrl => "mapsUrl",
            Self::Logo => "logo",
            Self::Whatsapp => "whatsapp",
            Self::Facebook => "facebook",
            Self::Instagram => "instagram",
            Self::Tiktok => "tiktok",
            Self::IsOpen => "isOpen",
        }
    }
}

impl fmt::Display for StoreField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreField {
    type Err = StoreFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| StoreFieldError::Unknown(s.to_owned()))
    }
}

/// Errors raised while editing store fields.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreFieldError {
    #[error("unknown store field: {0}")]
    Unknown(String),
    #[error("expected true or false, got {0:?}")]
    NotABoolean(String),
}
