//! Location lookup backed by the Google Geocoding API.
//!
//! The geocoder is set up lazily on first use. Concurrent first callers all
//! wait on the same initialisation, which runs at most once per process.

use log::{debug, info, warn};
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::OnceCell;
use url::Url;

use crate::errors::BookingError;
use crate::models::search::{Coordinates, LocationSelection};

const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    geometry: GeocodeGeometry,
}

#[derive(Debug, Deserialize)]
struct GeocodeGeometry {
    location: Coordinates,
}

/// Ready-to-use geocoder, built once by `PlacesService::ensure_loaded`.
#[derive(Debug)]
pub struct Geocoder {
    endpoint: Url,
    api_key: String,
}

impl Geocoder {
    fn request_url(&self, input: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("address", input)
            .append_pair("key", &self.api_key);
        url
    }
}

pub struct PlacesService {
    api_key: Option<String>,
    endpoint: String,
    http: reqwest::Client,
    geocoder: OnceCell<Geocoder>,
    loads: AtomicUsize,
}

impl PlacesService {
    pub fn new(api_key: Option<String>, http: reqwest::Client) -> Self {
        Self {
            api_key,
            endpoint: GEOCODE_URL.to_string(),
            http,
            geocoder: OnceCell::new(),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// How many times initialisation actually ran.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Memoised initialiser. A failed attempt is not cached, so a later
    /// call tries again.
    pub async fn ensure_loaded(&self) -> Result<&Geocoder, BookingError> {
        self.geocoder
            .get_or_try_init(|| async {
                self.loads.fetch_add(1, Ordering::SeqCst);
                let api_key = self.api_key.clone().ok_or_else(|| {
                    BookingError::Configuration("GOOGLE_MAPS_API_KEY not configured".to_string())
                })?;
                let endpoint = Url::parse(&self.endpoint).map_err(|e| {
                    BookingError::Configuration(format!("Invalid geocoding endpoint: {}", e))
                })?;
                info!("Places lookup initialised against {}", endpoint);
                Ok::<_, BookingError>(Geocoder { endpoint, api_key })
            })
            .await
    }

    /// Resolve free text to a location. When nothing matches, the typed
    /// text comes back without coordinates and search validation rejects it.
    pub async fn resolve(&self, input: &str) -> Result<LocationSelection, BookingError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(BookingError::Validation(vec!["input".to_string()]));
        }

        let geocoder = self.ensure_loaded().await?;
        debug!("Geocoding '{}'", input);

        let response = self.http.get(geocoder.request_url(input)).send().await?;
        if !response.status().is_success() {
            return Err(BookingError::Server {
                status: response.status().as_u16(),
                message: format!("HTTP {}", response.status()),
            });
        }
        let body: GeocodeResponse = response.json().await?;

        match body.status.as_str() {
            "OK" => match body.results.into_iter().next() {
                Some(result) => Ok(LocationSelection {
                    name: result.formatted_address,
                    coordinates: Some(result.geometry.location),
                }),
                None => Ok(unmatched(input)),
            },
            "ZERO_RESULTS" => {
                debug!("No geocoding match for '{}'", input);
                Ok(unmatched(input))
            }
            status => {
                let message = body
                    .error_message
                    .unwrap_or_else(|| format!("Google Maps API error: {}", status));
                warn!("Geocoding failed for '{}': {}", input, message);
                Err(BookingError::Server {
                    status: 502,
                    message,
                })
            }
        }
    }
}

fn unmatched(input: &str) -> LocationSelection {
    LocationSelection {
        name: input.to_string(),
        coordinates: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_rt::test]
    async fn test_concurrent_loads_run_once() {
        let service = PlacesService::new(Some("key".to_string()), reqwest::Client::new());
        let results = futures::future::join_all((0..8).map(|_| service.ensure_loaded())).await;
        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(service.load_count(), 1);

        service.ensure_loaded().await.unwrap();
        assert_eq!(service.load_count(), 1);
    }

    #[actix_rt::test]
    async fn test_missing_key_is_not_memoised() {
        let service = PlacesService::new(None, reqwest::Client::new());
        assert!(matches!(
            service.ensure_loaded().await,
            Err(BookingError::Configuration(_))
        ));
        assert!(service.ensure_loaded().await.is_err());
        assert_eq!(service.load_count(), 2);
    }

    #[actix_rt::test]
    async fn test_request_url_encodes_input() {
        let service = PlacesService::new(Some("k1".to_string()), reqwest::Client::new());
        let geocoder = service.ensure_loaded().await.unwrap();
        let url = geocoder.request_url("Malta Airport, Luqa");
        assert_eq!(
            url.as_str(),
            "https://maps.googleapis.com/maps/api/geocode/json?address=Malta+Airport%2C+Luqa&key=k1"
        );
    }

    #[actix_rt::test]
    async fn test_blank_input_is_rejected_without_loading() {
        let service = PlacesService::new(Some("k1".to_string()), reqwest::Client::new());
        assert!(matches!(
            service.resolve("  ").await,
            Err(BookingError::Validation(_))
        ));
        assert_eq!(service.load_count(), 0);
    }
}
