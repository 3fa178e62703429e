//! Geographic coordinates.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`LatLng`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LatLngError {
    /// The input is not two comma-separated values.
    #[error("expected \"lat,lng\"")]
    Format,
    /// One of the components is not a finite number.
    #[error("coordinate is not a number")]
    NotANumber,
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Parse a `"lat,lng"` pair as found in map URL query parameters.
    ///
    /// # Errors
    ///
    /// Returns [`LatLngError`] if the input is not two finite numbers
    /// separated by a comma.
    pub fn parse_pair(input: &str) -> Result<Self, LatLngError> {
        let (lat, lng) = input.split_once(',').ok_or(LatLngError::Format)?;
        let lat = parse_component(lat)?;
        let lng = parse_component(lng)?;
        Ok(Self { lat, lng })
    }
}

fn parse_component(raw: &str) -> Result<f64, LatLngError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(LatLngError::NotANumber)
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}
