//! Google Geocoding and Places Text Search client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;
use url::Url;

use petshop_core::LatLng;

use super::{Geocoder, MapsError, Place};
use crate::config::MapsConfig;

const GEOCODE_PATH: [&str; 4] = ["maps", "api", "geocode", "json"];
const TEXT_SEARCH_PATH: [&str; 5] = ["maps", "api", "place", "textsearch", "json"];

/// Google Maps web services client.
#[derive(Clone)]
pub struct GoogleMaps {
    inner: Arc<GoogleMapsInner>,
}

struct GoogleMapsInner {
    client: reqwest::Client,
    api_key: SecretString,
    api_base: Url,
}

impl std::fmt::Debug for GoogleMaps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleMaps")
            .field("api_base", &self.inner.api_base.as_str())
            .finish_non_exhaustive()
    }
}

/// Response body shared by both services.
#[derive(Debug, Deserialize)]
struct ServiceResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<ServiceResult>,
}

#[derive(Debug, Deserialize)]
struct ServiceResult {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    formatted_address: Option<String>,
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

impl ServiceResponse {
    /// Results for `OK`, nothing for `ZERO_RESULTS`, an error otherwise.
    fn into_results(self) -> Result<Vec<ServiceResult>, MapsError> {
        match self.status.as_str() {
            "OK" => Ok(self.results),
            "ZERO_RESULTS" => Ok(Vec::new()),
            _ => Err(MapsError::Status {
                message: self.error_message.unwrap_or_else(|| self.status.clone()),
                status: self.status,
            }),
        }
    }
}

impl GoogleMaps {
    /// # Errors
    ///
    /// Returns `MapsError::Http` if the HTTP client cannot be built.
    pub fn new(config: &MapsConfig) -> Result<Self, MapsError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            inner: Arc::new(GoogleMapsInner {
                client,
                api_key: config.api_key.clone(),
                api_base: config.api_base.clone(),
            }),
        })
    }

    /// The key, also needed to build embed URLs.
    #[must_use]
    pub fn api_key(&self) -> &SecretString {
        &self.inner.api_key
    }

    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Url {
        let mut url = self.inner.api_base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.query_pairs_mut()
            .extend_pairs(query)
            .append_pair("key", self.inner.api_key.expose_secret());
        url
    }

    async fn call(&self, url: Url) -> Result<Vec<ServiceResult>, MapsError> {
        let response = self
            .inner
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?;
        let body: ServiceResponse = response.json().await?;
        body.into_results()
    }
}

#[async_trait]
impl Geocoder for GoogleMaps {
    #[instrument(skip(self))]
    async fn reverse_geocode(&self, position: LatLng) -> Result<Option<String>, MapsError> {
        let latlng = position.to_string();
        let url = self.endpoint(&GEOCODE_PATH, &[("latlng", &latlng)]);
        let results = self.call(url).await?;
        Ok(results.into_iter().find_map(|r| r.formatted_address))
    }

    #[instrument(skip(self))]
    async fn search_places(&self, query: &str) -> Result<Vec<Place>, MapsError> {
        let url = self.endpoint(&TEXT_SEARCH_PATH, &[("query", query)]);
        let results = self.call(url).await?;
        Ok(results
            .into_iter()
            .map(|r| Place {
                name: r.name.unwrap_or_default(),
                formatted_address: r.formatted_address,
                location: r.geometry.map(|g| g.location),
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;

    fn maps(server: &MockServer) -> GoogleMaps {
        GoogleMaps::new(&MapsConfig {
            api_key: SecretString::from("K"),
            api_base: Url::parse(&server.base_url()).unwrap(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_reverse_geocode_takes_first_address() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/maps/api/geocode/json")
                .query_param("latlng", "-6.2,106.8")
                .query_param("key", "K");
            then.status(200).json_body(json!({
                "status": "OK",
                "results": [
                    {"formatted_address": "Jl. Sudirman 1, Jakarta"},
                    {"formatted_address": "Jakarta"}
                ]
            }));
        });

        let address = maps(&server)
            .reverse_geocode(LatLng::new(-6.2, 106.8))
            .await
            .unwrap();
        mock.assert();
        assert_eq!(address.as_deref(), Some("Jl. Sudirman 1, Jakarta"));
    }

    #[tokio::test]
    async fn test_zero_results_is_none() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/maps/api/geocode/json");
            then.status(200)
                .json_body(json!({"status": "ZERO_RESULTS", "results": []}));
        });

        let address = maps(&server)
            .reverse_geocode(LatLng::new(0.0, 0.0))
            .await
            .unwrap();
        assert_eq!(address, None);
    }

    #[tokio::test]
    async fn test_denied_request_is_status_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/maps/api/place/textsearch/json");
            then.status(200).json_body(json!({
                "status": "REQUEST_DENIED",
                "error_message": "The provided API key is invalid."
            }));
        });

        let err = maps(&server).search_places("petshop").await.unwrap_err();
        match err {
            MapsError::Status { status, message } => {
                assert_eq!(status, "REQUEST_DENIED");
                assert_eq!(message, "The provided API key is invalid.");
            }
            other => panic!("expected a status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_search_places_reads_geometry() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/maps/api/place/textsearch/json")
                .query_param("query", "pet shop bandung");
            then.status(200).json_body(json!({
                "status": "OK",
                "results": [{
                    "name": "Pawsome",
                    "formatted_address": "Jl. Braga 5, Bandung",
                    "geometry": {"location": {"lat": -6.9, "lng": 107.6}}
                }]
            }));
        });

        let places = maps(&server).search_places("pet shop bandung").await.unwrap();
        assert_eq!(
            places,
            vec![Place {
                name: "Pawsome".to_string(),
                formatted_address: Some("Jl. Braga 5, Bandung".to_string()),
                location: Some(LatLng::new(-6.9, 107.6)),
            }]
        );
    }
}
