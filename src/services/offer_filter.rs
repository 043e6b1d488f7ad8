use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::errors::BookingError;
use crate::models::offer::Offer;

/// Transmission value that switches the transmission facet off.
pub const ALL_TRANSMISSIONS: &str = "All";

pub const CAR_TYPES: &[&str] = &["Mini", "Economy", "Compact", "SUV", "Premium"];
pub const PASSENGER_OPTIONS: &[&str] = &["2 Passengers", "4 Passengers", "5 Passengers", "7 Passengers"];

static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DepositBracket {
    UpTo500,
    From501To1000,
    From1001To1500,
    From1501To2000,
    Over2000,
}

impl DepositBracket {
    pub const ALL: [DepositBracket; 5] = [
        DepositBracket::UpTo500,
        DepositBracket::From501To1000,
        DepositBracket::From1001To1500,
        DepositBracket::From1501To2000,
        DepositBracket::Over2000,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DepositBracket::UpTo500 => "€ 0 - € 500",
            DepositBracket::From501To1000 => "€ 501 - € 1,000",
            DepositBracket::From1001To1500 => "€ 1,001 - € 1,500",
            DepositBracket::From1501To2000 => "€ 1,501 - € 2,000",
            DepositBracket::Over2000 => "€ 2,000 +",
        }
    }

    pub fn from_label(label: &str) -> Option<DepositBracket> {
        Self::ALL.into_iter().find(|b| b.label() == label.trim())
    }

    /// Each bracket owns everything above the previous upper bound, so
    /// fractional deposits such as 500.50 still land in exactly one bracket.
    pub fn contains(&self, deposit: Decimal) -> bool {
        let bound = |v: i64| Decimal::new(v, 0);
        match self {
            DepositBracket::UpTo500 => deposit >= Decimal::ZERO && deposit <= bound(500),
            DepositBracket::From501To1000 => deposit > bound(500) && deposit <= bound(1000),
            DepositBracket::From1001To1500 => deposit > bound(1000) && deposit <= bound(1500),
            DepositBracket::From1501To2000 => deposit > bound(1500) && deposit <= bound(2000),
            DepositBracket::Over2000 => deposit > bound(2000),
        }
    }
}

impl TryFrom<String> for DepositBracket {
    type Error = String;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        DepositBracket::from_label(&label).ok_or_else(|| format!("unknown deposit range: {}", label))
    }
}

impl From<DepositBracket> for String {
    fn from(bracket: DepositBracket) -> Self {
        bracket.label().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    CarType,
    Passengers,
    Transmission,
    Deposit,
    Companies,
}

/// Sidebar filter state. Empty facets impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacetSelection {
    pub car_type: Option<String>,
    pub passengers: Option<String>,
    pub transmission: Vec<String>,
    pub deposit: Vec<DepositBracket>,
    pub companies: Vec<String>,
}

fn toggle_value(values: &mut Vec<String>, value: &str) {
    if let Some(pos) = values.iter().position(|v| v == value) {
        values.remove(pos);
    } else {
        values.push(value.to_string());
    }
}

/// `"4 Passengers"` -> 4
pub fn parse_passenger_count(label: &str) -> Option<u32> {
    LEADING_NUMBER
        .captures(label)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

impl FacetSelection {
    /// Car type and passengers are single-select; the other facets toggle
    /// the value in or out of the selection.
    pub fn toggle(&mut self, facet: Facet, value: &str) -> Result<(), BookingError> {
        match facet {
            Facet::CarType => self.car_type = Some(value.to_string()),
            Facet::Passengers => self.passengers = Some(value.to_string()),
            Facet::Transmission => toggle_value(&mut self.transmission, value),
            Facet::Companies => toggle_value(&mut self.companies, value),
            Facet::Deposit => {
                let bracket = DepositBracket::from_label(value)
                    .ok_or_else(|| BookingError::Validation(vec!["deposit".to_string()]))?;
                if let Some(pos) = self.deposit.iter().position(|b| *b == bracket) {
                    self.deposit.remove(pos);
                } else {
                    self.deposit.push(bracket);
                }
            }
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        *self = FacetSelection::default();
    }

    pub fn is_empty(&self) -> bool {
        self.car_type_filter().is_none()
            && self.passenger_filter().is_none()
            && self.transmission_filter().is_none()
            && self.deposit.is_empty()
            && self.companies.is_empty()
    }

    fn car_type_filter(&self) -> Option<&str> {
        self.car_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    fn passenger_filter(&self) -> Option<u32> {
        self.passengers.as_deref().and_then(parse_passenger_count)
    }

    fn transmission_filter(&self) -> Option<&[String]> {
        if self.transmission.is_empty()
            || self
                .transmission
                .iter()
                .any(|t| t.eq_ignore_ascii_case(ALL_TRANSMISSIONS))
        {
            None
        } else {
            Some(&self.transmission)
        }
    }

    pub fn matches(&self, offer: &Offer) -> bool {
        if let Some(car_type) = self.car_type_filter() {
            if !offer.category.eq_ignore_ascii_case(car_type) {
                return false;
            }
        }
        if let Some(seats) = self.passenger_filter() {
            if offer.seats != seats {
                return false;
            }
        }
        if let Some(transmissions) = self.transmission_filter() {
            if !transmissions
                .iter()
                .any(|t| offer.transmission.eq_ignore_ascii_case(t.trim()))
            {
                return false;
            }
        }
        if !self.deposit.is_empty() {
            match offer.deposit {
                Some(deposit) if self.deposit.iter().any(|b| b.contains(deposit)) => {}
                _ => return false,
            }
        }
        if !self.companies.is_empty()
            && !self
                .companies
                .iter()
                .any(|c| offer.supplier.eq_ignore_ascii_case(c.trim()))
        {
            return false;
        }
        true
    }
}

/// Narrow an offer list to the active facets. The input is untouched and
/// the result keeps the original order.
pub fn filter_offers(offers: &[Offer], facets: &FacetSelection) -> Vec<Offer> {
    offers
        .iter()
        .filter(|offer| facets.matches(offer))
        .cloned()
        .collect()
}
