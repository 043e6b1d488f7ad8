use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use std::collections::BTreeMap;

/// An optional paid add-on for a rental, e.g. GPS or a child seat.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraOption {
    pub name: String,
    /// Fee for the whole rental period. Accepted as a number or a string.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub fee: Decimal,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[serde(default)]
    pub quantity: u32,
}

/// Which extras the user has toggled on, keyed by extra name. Kept apart
/// from the option list so a refetch of extras keeps the user's choices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtraSelection(BTreeMap<String, bool>);

impl ExtraSelection {
    pub fn toggle(&mut self, name: &str) -> bool {
        let entry = self.0.entry(name.to_string()).or_insert(false);
        *entry = !*entry;
        *entry
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.0.get(name).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_toggle_flips_selection() {
        let mut selection = ExtraSelection::default();
        assert!(!selection.is_selected("GPS"));
        assert!(selection.toggle("GPS"));
        assert!(selection.is_selected("GPS"));
        assert!(!selection.toggle("GPS"));
        assert!(!selection.is_selected("GPS"));
    }

    #[test]
    fn test_extra_accepts_string_numbers() {
        let extra: ExtraOption =
            serde_json::from_value(json!({"name": "GPS", "fee": "10.00", "quantity": "2"}))
                .unwrap();
        assert_eq!(extra.fee, Decimal::new(10, 0));
        assert_eq!(extra.quantity, 2);
    }
}
