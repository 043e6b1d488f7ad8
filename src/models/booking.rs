use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /api/book-car`. Built once, right before submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingRequest {
    pub car_id: u64,
    pub location_id: u64,
    /// `YYYY-MM-DD HH:MM`
    pub pickup_date: String,
    pub dropoff_date: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_age: Option<u32>,
    pub country: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub extras: Vec<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub confirmation_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct BookingResponseData {
    pub booking_id: Option<Value>,
}

/// Response of `POST /api/book-car`, which comes in two shapes:
/// `{success, reservation_no}` or `{data: {booking_id}}`.
#[derive(Debug, Default, Deserialize)]
pub struct BookingResponse {
    pub success: Option<bool>,
    pub reservation_no: Option<Value>,
    pub message: Option<String>,
    pub errors: Option<Value>,
    pub data: Option<BookingResponseData>,
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl BookingResponse {
    fn booking_id(&self) -> Option<String> {
        self.data
            .as_ref()
            .and_then(|d| d.booking_id.as_ref())
            .and_then(id_text)
    }

    pub fn is_success(&self) -> bool {
        match self.success {
            Some(success) => success,
            None => self.booking_id().is_some(),
        }
    }

    pub fn confirmation_id(&self) -> String {
        self.reservation_no
            .as_ref()
            .and_then(id_text)
            .or_else(|| self.booking_id())
            .unwrap_or_else(|| "N/A".to_string())
    }

    pub fn failure_reason(&self) -> String {
        if let Some(message) = self.message.as_ref().filter(|m| !m.trim().is_empty()) {
            return message.clone();
        }
        match &self.errors {
            Some(errors) if !errors.is_null() => errors.to_string(),
            _ => "Booking failed".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> BookingResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_reservation_number_wins_over_booking_id() {
        let response = parse(json!({"success": true, "reservation_no": 1001, "data": {"booking_id": 7}}));
        assert!(response.is_success());
        assert_eq!(response.confirmation_id(), "1001");
    }

    #[test]
    fn test_booking_id_shape_counts_as_success() {
        let response = parse(json!({"data": {"booking_id": "B-77"}}));
        assert!(response.is_success());
        assert_eq!(response.confirmation_id(), "B-77");
    }

    #[test]
    fn test_failure_reason_fallbacks() {
        let message = parse(json!({"success": false, "message": "Car no longer available"}));
        assert!(!message.is_success());
        assert_eq!(message.failure_reason(), "Car no longer available");

        let errors = parse(json!({"success": false, "errors": {"email": ["invalid"]}}));
        assert_eq!(errors.failure_reason(), r#"{"email":["invalid"]}"#);

        let bare = parse(json!({"success": false}));
        assert_eq!(bare.failure_reason(), "Booking failed");
    }

    #[test]
    fn test_missing_driver_age_is_omitted() {
        let request = BookingRequest {
            car_id: 1,
            location_id: 2,
            pickup_date: "2030-08-20 10:00".to_string(),
            dropoff_date: "2030-08-23 10:00".to_string(),
            pickup_location: "Malta Airport".to_string(),
            dropoff_location: "Malta Airport".to_string(),
            driver_age: None,
            country: None,
            first_name: "Maria".to_string(),
            last_name: "Borg".to_string(),
            email: "maria@example.com".to_string(),
            phone: "+356 2123 4567".to_string(),
            address: None,
            city: None,
            state: None,
            zipcode: None,
            extras: vec![],
            total_price: Decimal::new(8925, 2),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("driver_age").is_none());
        assert_eq!(value["total_price"], json!(89.25));
        assert!(value["address"].is_null());
    }
}
