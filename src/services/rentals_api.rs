//! Client for the remote rentals REST API.
//!
//! Every method issues exactly one request. There is no retry and no cache:
//! repeating an identical search fetches again.

use log::{debug, info, warn};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

use crate::errors::BookingError;
use crate::models::booking::{BookingConfirmation, BookingRequest, BookingResponse};
use crate::models::content::VendorTerms;
use crate::models::extras::ExtraOption;
use crate::models::offer::Offer;
use crate::models::search::SearchCriteria;

pub struct RentalsApiClient {
    base_url: String,
    http: reqwest::Client,
}

/// Pull a human readable message out of an error body.
fn api_message(body: &Value) -> Option<String> {
    for key in ["message", "error"] {
        if let Some(msg) = body.get(key).and_then(Value::as_str) {
            if !msg.trim().is_empty() {
                return Some(msg.to_string());
            }
        }
    }
    body.get("errors")
        .filter(|errors| !errors.is_null())
        .map(|errors| errors.to_string())
}

fn parse_body(text: &str) -> Result<Value, BookingError> {
    serde_json::from_str(text)
        .map_err(|_| BookingError::Parse("Invalid JSON response from server".to_string()))
}

fn server_error(status: StatusCode, body: Option<&Value>) -> BookingError {
    let message = body
        .and_then(api_message)
        .unwrap_or_else(|| format!("HTTP {}", status));
    BookingError::Server {
        status: status.as_u16(),
        message,
    }
}

fn explicit_failure(body: &Value) -> bool {
    body.get("success").and_then(Value::as_bool) == Some(false)
}

impl RentalsApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BookingError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BookingError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Read a JSON body, turning non-2xx and `success: false` into
    /// `BookingError::Server`.
    async fn read_json(&self, response: reqwest::Response) -> Result<Value, BookingError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let body = serde_json::from_str::<Value>(&text).ok();
            return Err(server_error(status, body.as_ref()));
        }

        let body = parse_body(&text)?;
        if explicit_failure(&body) {
            return Err(server_error(status, Some(&body)));
        }
        Ok(body)
    }

    async fn get_json(&self, url: &str) -> Result<Value, BookingError> {
        let response = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;
        self.read_json(response).await
    }

    /// `POST /api/search-car`, form encoded.
    pub async fn search_cars(&self, criteria: &SearchCriteria) -> Result<Vec<Offer>, BookingError> {
        let form = [
            ("pickup_location", criteria.pickup.coordinates.to_payload()),
            ("dropoff_location", criteria.dropoff.coordinates.to_payload()),
            ("pickup_date", criteria.pickup_date.clone()),
            ("dropoff_date", criteria.dropoff_date.clone()),
            ("driver_age", criteria.driver_age.clone()),
            ("country", criteria.country.clone()),
        ];

        info!(
            "Searching cars at {} from {} to {}",
            criteria.pickup.name, criteria.pickup_date, criteria.dropoff_date
        );

        let response = self
            .http
            .post(self.url("/api/search-car"))
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                warn!("Search request failed: {}", e);
                BookingError::from(e)
            })?;
        let body = self.read_json(response).await?;

        let data = body
            .get("data")
            .filter(|d| d.is_object())
            .ok_or_else(|| BookingError::Parse("Search response has no data object".to_string()))?;

        let offers: Vec<Offer> = match data.get("cars") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(cars)) => cars.iter().cloned().filter_map(Offer::from_value).collect(),
            Some(_) => {
                return Err(BookingError::Parse("Search response cars is not a list".to_string()))
            }
        };

        info!("Search returned {} offers", offers.len());
        Ok(offers)
    }

    /// `GET /api/get-car-detail/{id}`; the car sits under `data.car`,
    /// `data`, or at the top level depending on the deployment.
    pub async fn car_detail(&self, car_id: u64) -> Result<Offer, BookingError> {
        debug!("Fetching car details for ID: {}", car_id);
        let body = self
            .get_json(&self.url(&format!("/api/get-car-detail/{}", car_id)))
            .await?;

        let car = match body.get("data") {
            Some(data) if data.get("car").is_some_and(Value::is_object) => data["car"].clone(),
            Some(data) if data.is_object() => data.clone(),
            _ => body,
        };

        Offer::from_value(car)
            .ok_or_else(|| BookingError::Parse("No car data found in response".to_string()))
    }

    /// `GET /api/get-car-extras/{id}?rental_days=N`
    pub async fn car_extras(&self, car_id: u64, rental_days: u32) -> Result<Vec<ExtraOption>, BookingError> {
        let response = self
            .http
            .get(self.url(&format!("/api/get-car-extras/{}", car_id)))
            .query(&[("rental_days", rental_days)])
            .send()
            .await?;
        let body = self.read_json(response).await?;

        if body.get("success").and_then(Value::as_bool) != Some(true) {
            return Err(BookingError::Parse("Extras response is not marked successful".to_string()));
        }
        let extras = body
            .pointer("/data/extras")
            .cloned()
            .ok_or_else(|| BookingError::Parse("Extras response has no extras list".to_string()))?;

        serde_json::from_value(extras)
            .map_err(|e| BookingError::Parse(format!("Malformed extras list: {}", e)))
    }

    /// `GET /api/get-terms-conditions`; `None` when the API has no terms.
    pub async fn terms_and_conditions(&self) -> Result<Option<String>, BookingError> {
        let body = self.get_json(&self.url("/api/get-terms-conditions")).await?;
        Ok(body
            .pointer("/data/terms")
            .and_then(Value::as_str)
            .filter(|t| !t.trim().is_empty())
            .map(str::to_string))
    }

    /// `GET /api/get-privacy-policy`
    pub async fn privacy_policy(&self) -> Result<Option<String>, BookingError> {
        let body = self.get_json(&self.url("/api/get-privacy-policy")).await?;
        Ok(body
            .pointer("/data/privacy_policy")
            .and_then(Value::as_str)
            .filter(|t| !t.trim().is_empty())
            .map(str::to_string))
    }

    /// `GET /api/get-vendor-terms/{vendorId}`
    pub async fn vendor_terms(&self, vendor_id: u64) -> Result<VendorTerms, BookingError> {
        let body = self
            .get_json(&self.url(&format!("/api/get-vendor-terms/{}", vendor_id)))
            .await?;
        let data = body
            .get("data")
            .cloned()
            .filter(|d| d.is_object())
            .ok_or_else(|| BookingError::Parse("Vendor terms response has no data".to_string()))?;
        serde_json::from_value(data)
            .map_err(|e| BookingError::Parse(format!("Malformed vendor terms: {}", e)))
    }

    /// `POST /api/book-car`, JSON encoded.
    pub async fn book_car(&self, request: &BookingRequest) -> Result<BookingConfirmation, BookingError> {
        let response = self
            .http
            .post(self.url("/api/book-car"))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let body = parse_body(&text)?;
        let parsed: BookingResponse = serde_json::from_value(body)
            .map_err(|e| BookingError::Parse(format!("Unexpected booking response: {}", e)))?;

        if status.is_success() && parsed.is_success() {
            let confirmation_id = parsed.confirmation_id();
            info!("Booking accepted with reservation {}", confirmation_id);
            return Ok(BookingConfirmation { confirmation_id });
        }

        let reason = parsed.failure_reason();
        warn!("Booking rejected ({}): {}", status, reason);
        Err(BookingError::Server {
            status: status.as_u16(),
            message: reason,
        })
    }
}
