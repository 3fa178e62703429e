//! Store location picker.
//!
//! Turns a point chosen on a map (marker drag, click, or place search) into
//! the store's `mapsUrl` and `address` form fields. The Google Maps web
//! services do the geocoding; [`MapSession`] owns the marker and routes map
//! events to the form's field-change handler.
//!
//! # Modules
//!
//! - [`google`] - Geocoding and Places Text Search client
//! - [`loader`] - Constructs that client at most once
//! - [`session`] - Marker state and event handling for one mounted map

pub mod google;
pub mod loader;
pub mod session;

pub use google::GoogleMaps;
pub use loader::MapsLoader;
pub use session::{MapEvent, MapSession};

use async_trait::async_trait;
use thiserror::Error;
use url::{Url, form_urlencoded};

use petshop_core::LatLng;

/// Map center when the stored URL carries no position (Jakarta).
pub const FALLBACK_POSITION: LatLng = LatLng::new(-6.2088, 106.8456);

/// Zoom when a position was found in the stored URL.
pub const PLACE_ZOOM: u8 = 16;

/// Zoom over [`FALLBACK_POSITION`].
pub const CITY_ZOOM: u8 = 12;

const EMBED_BASE: &str = "https://www.google.com/maps/embed/v1/place";

/// Errors from the maps services.
#[derive(Debug, Error)]
pub enum MapsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a status other than `OK`/`ZERO_RESULTS`.
    #[error("Maps API returned {status}: {message}")]
    Status { status: String, message: String },

    /// No API key is configured.
    #[error("Google Maps is not configured")]
    NotLoaded,

    /// The map session has been released.
    #[error("map session has been released")]
    Detached,
}

/// A place search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub name: String,
    pub formatted_address: Option<String>,
    pub location: Option<LatLng>,
}

/// Address lookup used by the picker.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Human-readable address for `position`; `None` when nothing is there.
    async fn reverse_geocode(&self, position: LatLng) -> Result<Option<String>, MapsError>;

    /// Places matching a free-text query, best match first.
    async fn search_places(&self, query: &str) -> Result<Vec<Place>, MapsError>;
}

/// Read a position from a stored maps URL.
///
/// Looks at the `q` parameter, then `center`, each as `lat,lng`. Anything
/// that is not a URL or lacks both yields `None`.
#[must_use]
pub fn position_from_url(maps_url: &str) -> Option<LatLng> {
    let url = Url::parse(maps_url.trim()).ok()?;
    ["q", "center"].into_iter().find_map(|key| {
        url.query_pairs()
            .find(|(name, _)| name == key)
            .and_then(|(_, value)| LatLng::parse_pair(&value).ok())
    })
}

/// Where the map opens: the stored position at street zoom, or the
/// fallback at city zoom.
#[must_use]
pub fn initial_position(maps_url: &str) -> (LatLng, u8) {
    position_from_url(maps_url).map_or((FALLBACK_POSITION, CITY_ZOOM), |pos| (pos, PLACE_ZOOM))
}

/// Embeddable map URL for `position`, as stored in `mapsUrl`.
///
/// The key is percent-encoded; the position is written as plain `lat,lng`.
#[must_use]
pub fn embed_url(api_key: &str, position: LatLng) -> String {
    let key: String = form_urlencoded::byte_serialize(api_key.as_bytes()).collect();
    format!("{EMBED_BASE}?key={key}&q={position}")
}
