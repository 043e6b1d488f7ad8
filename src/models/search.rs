use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Text the location inputs show before anything is picked.
pub const LOCATION_PLACEHOLDER: &str = "Location";
pub const DEFAULT_COUNTRY: &str = "PK";
pub const DEFAULT_DRIVER_AGE: &str = "25";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// JSON text sent as `pickup_location` / `dropoff_location`.
    pub fn to_payload(&self) -> String {
        serde_json::json!({ "lat": self.lat, "lng": self.lng }).to_string()
    }
}

/// A location as picked in the search form, before validation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LocationSelection {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

impl LocationSelection {
    pub fn is_blank(&self) -> bool {
        let name = self.name.trim();
        name.is_empty() || name == LOCATION_PLACEHOLDER
    }

    /// Both a name and a geocoded coordinate pair are present.
    pub fn resolved(&self) -> Option<ResolvedLocation> {
        if self.is_blank() {
            return None;
        }
        self.coordinates.map(|coordinates| ResolvedLocation {
            name: self.name.trim().to_string(),
            coordinates,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub name: String,
    pub coordinates: Coordinates,
}

fn default_true() -> bool {
    true
}

fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}

fn default_driver_age() -> String {
    DEFAULT_DRIVER_AGE.to_string()
}

/// Raw search form as submitted by the browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub pickup: LocationSelection,
    #[serde(default = "default_true")]
    pub same_as_pickup: bool,
    #[serde(default)]
    pub dropoff: Option<LocationSelection>,
    #[serde(default)]
    pub pickup_date: Option<NaiveDate>,
    #[serde(default)]
    pub pickup_time: Option<String>,
    #[serde(default)]
    pub dropoff_date: Option<NaiveDate>,
    #[serde(default)]
    pub dropoff_time: Option<String>,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_driver_age")]
    pub driver_age: String,
}

/// Validated search input. Only built by the input normalizer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchCriteria {
    pub pickup: ResolvedLocation,
    pub dropoff: ResolvedLocation,
    pub same_as_pickup: bool,
    pub pickup_at: NaiveDateTime,
    pub dropoff_at: NaiveDateTime,
    /// `Wed, Aug 20, 2025 10:00`
    pub pickup_date: String,
    pub dropoff_date: String,
    pub country: String,
    pub driver_age: String,
    pub rental_days: u32,
}
