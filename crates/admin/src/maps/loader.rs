//! Lazy, at-most-once construction of the maps client.

use tokio::sync::OnceCell;
use tracing::info;

use super::{GoogleMaps, MapsError};
use crate::config::MapsConfig;

/// Hands out one shared [`GoogleMaps`] client, built on first use.
#[derive(Debug, Default)]
pub struct MapsLoader {
    config: Option<MapsConfig>,
    maps: OnceCell<GoogleMaps>,
}

impl MapsLoader {
    /// A loader for `config`; `None` means maps are not configured.
    #[must_use]
    pub fn new(config: Option<MapsConfig>) -> Self {
        Self {
            config,
            maps: OnceCell::new(),
        }
    }

    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// Whether the client has been built.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.maps.initialized()
    }

    /// The client, building it on the first call.
    ///
    /// # Errors
    ///
    /// - `MapsError::NotLoaded` when no API key is configured
    /// - `MapsError::Http` when the HTTP client cannot be built
    pub async fn load(&self) -> Result<&GoogleMaps, MapsError> {
        let config = self.config.as_ref().ok_or(MapsError::NotLoaded)?;
        self.maps
            .get_or_try_init(|| async {
                info!(api_base = %config.api_base, "Loading Google Maps client");
                GoogleMaps::new(config)
            })
            .await
    }
}
