use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, NoneAsEmptyString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverField {
    FirstName,
    LastName,
    DateOfBirth,
    PhoneNumber,
    Email,
    Address,
}

impl DriverField {
    pub const REQUIRED: [DriverField; 6] = [
        DriverField::FirstName,
        DriverField::LastName,
        DriverField::DateOfBirth,
        DriverField::PhoneNumber,
        DriverField::Email,
        DriverField::Address,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DriverField::FirstName => "first_name",
            DriverField::LastName => "last_name",
            DriverField::DateOfBirth => "date_of_birth",
            DriverField::PhoneNumber => "phone_number",
            DriverField::Email => "email",
            DriverField::Address => "address",
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverDetails {
    pub first_name: String,
    pub last_name: String,
    #[serde_as(as = "NoneAsEmptyString")]
    pub date_of_birth: Option<NaiveDate>,
    pub phone_number: String,
    pub email: String,
    pub address: String,
    pub country: String,
    pub state: String,
    pub city: String,
    pub zipcode: String,
    pub booking_comments: String,
    pub agree_to_marketing: bool,
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl DriverDetails {
    pub fn is_present(&self, field: DriverField) -> bool {
        match field {
            DriverField::FirstName => !blank(&self.first_name),
            DriverField::LastName => !blank(&self.last_name),
            DriverField::DateOfBirth => self.date_of_birth.is_some(),
            DriverField::PhoneNumber => !blank(&self.phone_number),
            DriverField::Email => !blank(&self.email),
            DriverField::Address => !blank(&self.address),
        }
    }

    /// Required fields that are still empty, in form order.
    pub fn missing_fields(&self) -> Vec<DriverField> {
        DriverField::REQUIRED
            .into_iter()
            .filter(|field| !self.is_present(*field))
            .collect()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }

    pub fn optional_address(&self) -> Option<String> {
        optional(&self.address)
    }

    pub fn optional_city(&self) -> Option<String> {
        optional(&self.city)
    }

    pub fn optional_state(&self) -> Option<String> {
        optional(&self.state)
    }

    pub fn optional_zipcode(&self) -> Option<String> {
        optional(&self.zipcode)
    }

    pub fn optional_country(&self) -> Option<String> {
        optional(&self.country)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_form_misses_every_required_field() {
        let details = DriverDetails::default();
        assert_eq!(details.missing_fields(), DriverField::REQUIRED.to_vec());
    }

    #[test]
    fn test_blank_date_of_birth_deserializes_to_none() {
        let details: DriverDetails = serde_json::from_value(json!({
            "first_name": "Maria",
            "date_of_birth": ""
        }))
        .unwrap();
        assert_eq!(details.date_of_birth, None);
        assert!(details.missing_fields().contains(&DriverField::DateOfBirth));

        let details: DriverDetails =
            serde_json::from_value(json!({"date_of_birth": "1990-05-17"})).unwrap();
        assert_eq!(details.date_of_birth, NaiveDate::from_ymd_opt(1990, 5, 17));
    }

    #[test]
    fn test_whitespace_counts_as_missing() {
        let details = DriverDetails {
            email: "   ".to_string(),
            ..Default::default()
        };
        assert!(!details.is_present(DriverField::Email));
    }
}
