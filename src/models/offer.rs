use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr, PickFirst};

const DEFAULT_SUPPLIER: &str = "Local supplier";

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawVendor {
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub id: Option<u64>,
    pub first_name: Option<String>,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLocation {
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub id: Option<u64>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub currency: Option<String>,
}

/// Car record exactly as the rentals API returns it. Numeric fields arrive
/// either as numbers or as strings depending on the endpoint.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCar {
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub id: Option<u64>,
    pub model_type: Option<String>,
    pub name: Option<String>,
    pub model: Option<String>,
    pub category: Option<String>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub seats: Option<u32>,
    pub transmission_type: Option<String>,
    pub transmission: Option<String>,
    #[serde(default)]
    pub air_conditioning: Value,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub small_suitcase: Option<u32>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub large_suitcase: Option<u32>,
    pub car_image: Option<String>,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    pub price: Option<Decimal>,
    pub original_price: Option<Decimal>,
    pub deposit: Option<Decimal>,
    #[serde(default)]
    pub features: Vec<Value>,
    pub vendor: Option<RawVendor>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub vendor_id: Option<u64>,
    pub location: Option<RawLocation>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub location_id: Option<u64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub guaranteed_model: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorRef {
    pub id: Option<u64>,
    pub first_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRef {
    pub id: Option<u64>,
    pub name: Option<String>,
}

/// A vehicle listing as shown on a result card. Read-only after fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub id: u64,
    pub model: String,
    pub category: String,
    pub seats: u32,
    pub transmission: String,
    pub air_conditioning: bool,
    pub bags: u32,
    pub image_url: Option<String>,
    /// Daily rate.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub original_price: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub deposit: Option<Decimal>,
    pub currency: String,
    #[serde(default)]
    pub features: Vec<String>,
    pub supplier: String,
    #[serde(default)]
    pub guaranteed_model: bool,
    #[serde(default)]
    pub vendor: Option<VendorRef>,
    #[serde(default)]
    pub location: Option<LocationRef>,
    #[serde(default)]
    pub location_id: Option<u64>,
    #[serde(default)]
    pub vendor_id: Option<u64>,
    #[serde(default)]
    pub user_id: Option<u64>,
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn feature_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(map) => map
            .get("name")
            .and_then(Value::as_str)
            .map(|s| s.to_string()),
        _ => None,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl Offer {
    /// Normalise a raw car. Cars without an id or a price cannot be booked
    /// and yield `None`.
    pub fn from_raw(raw: RawCar) -> Option<Offer> {
        let id = raw.id?;
        let price = raw.price?;

        let model = non_blank(raw.model_type)
            .or_else(|| non_blank(raw.name))
            .or_else(|| non_blank(raw.model))
            .unwrap_or_else(|| "Car".to_string());

        let currency = raw
            .location
            .as_ref()
            .and_then(|l| non_blank(l.currency.clone()))
            .unwrap_or_else(|| "EUR".to_string());

        let supplier = raw
            .vendor
            .as_ref()
            .and_then(|v| non_blank(v.first_name.clone()))
            .unwrap_or_else(|| DEFAULT_SUPPLIER.to_string());

        let location = raw.location.map(|l| LocationRef {
            id: l.id,
            name: non_blank(l.name).or_else(|| non_blank(l.location)),
        });

        Some(Offer {
            id,
            model,
            category: non_blank(raw.category).unwrap_or_else(|| "Standard".to_string()),
            seats: raw.seats.filter(|s| *s > 0).unwrap_or(4),
            transmission: non_blank(raw.transmission_type)
                .or_else(|| non_blank(raw.transmission))
                .unwrap_or_else(|| "Automatic".to_string()),
            air_conditioning: truthy(&raw.air_conditioning),
            bags: raw
                .small_suitcase
                .unwrap_or(0)
                .saturating_add(raw.large_suitcase.unwrap_or(0)),
            image_url: non_blank(raw.car_image).or_else(|| non_blank(raw.image_url)),
            price,
            original_price: raw.original_price,
            deposit: raw.deposit,
            currency,
            features: raw.features.iter().filter_map(feature_label).collect(),
            supplier,
            guaranteed_model: truthy(&raw.guaranteed_model),
            vendor: raw.vendor.map(|v| VendorRef {
                id: v.id,
                first_name: v.first_name,
            }),
            location,
            location_id: raw.location_id,
            vendor_id: raw.vendor_id,
            user_id: raw.user_id,
        })
    }

    /// Parse a single car object, logging and skipping malformed entries.
    pub fn from_value(value: Value) -> Option<Offer> {
        match serde_json::from_value::<RawCar>(value) {
            Ok(raw) => {
                let id = raw.id;
                let offer = Offer::from_raw(raw);
                if offer.is_none() {
                    warn!("Skipping car {:?}: missing id or price", id);
                }
                offer
            }
            Err(err) => {
                warn!("Skipping malformed car record: {}", err);
                None
            }
        }
    }

    pub fn similar_text(&self) -> &'static str {
        if self.guaranteed_model {
            "Guaranteed Model"
        } else {
            "Or similar"
        }
    }

    pub fn location_name(&self) -> Option<&str> {
        self.location.as_ref().and_then(|l| l.name.as_deref())
    }

    /// Location id embedded in the offer, if the API sent one.
    pub fn embedded_location_id(&self) -> Option<u64> {
        self.location
            .as_ref()
            .and_then(|l| l.id)
            .or(self.location_id)
    }

    pub fn embedded_vendor_id(&self) -> Option<u64> {
        self.vendor.as_ref().and_then(|v| v.id).or(self.vendor_id)
    }
}
