use actix_web::{http::StatusCode, HttpResponse};
use serde::Serialize;

/// Every failure the search-to-booking pipeline can surface.
#[derive(Debug, Clone, PartialEq)]
pub enum BookingError {
    /// Required search or driver fields are missing or malformed.
    Validation(Vec<String>),
    /// The request could not be sent or no response arrived.
    Network(String),
    /// Non-2xx status or a `success: false` body.
    Server { status: u16, message: String },
    /// The body was not JSON or lacked the expected shape.
    Parse(String),
    /// The payment gateway declined or returned an error object.
    Payment(String),
    /// No location id could be resolved for the booking.
    MissingReference(String),
    SessionNotFound,
    InvalidTransition(String),
    Configuration(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

impl BookingError {
    pub fn code(&self) -> &'static str {
        match self {
            BookingError::Validation(_) => "validation_error",
            BookingError::Network(_) => "network_error",
            BookingError::Server { .. } => "server_error",
            BookingError::Parse(_) => "parse_error",
            BookingError::Payment(_) => "payment_error",
            BookingError::MissingReference(_) => "missing_reference",
            BookingError::SessionNotFound => "session_not_found",
            BookingError::InvalidTransition(_) => "invalid_transition",
            BookingError::Configuration(_) => "configuration_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            BookingError::Validation(_) => StatusCode::BAD_REQUEST,
            BookingError::MissingReference(_) => StatusCode::UNPROCESSABLE_ENTITY,
            BookingError::Network(_) | BookingError::Server { .. } | BookingError::Parse(_) => {
                StatusCode::BAD_GATEWAY
            }
            BookingError::Payment(_) => StatusCode::PAYMENT_REQUIRED,
            BookingError::SessionNotFound => StatusCode::NOT_FOUND,
            BookingError::InvalidTransition(_) => StatusCode::CONFLICT,
            BookingError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// The bare reason, without a category prefix. Used for alerts such as
    /// `Booking failed: <reason>`.
    pub fn user_message(&self) -> String {
        match self {
            BookingError::Validation(fields) => {
                format!("Please fill in all required fields: {}", fields.join(", "))
            }
            BookingError::Network(msg) => msg.clone(),
            BookingError::Server { message, .. } => message.clone(),
            BookingError::Parse(msg) => msg.clone(),
            BookingError::Payment(msg) => msg.clone(),
            BookingError::MissingReference(msg) => msg.clone(),
            BookingError::SessionNotFound => "Booking session not found".to_string(),
            BookingError::InvalidTransition(msg) => msg.clone(),
            BookingError::Configuration(msg) => msg.clone(),
        }
    }

    pub fn fields(&self) -> Option<Vec<String>> {
        match self {
            BookingError::Validation(fields) => Some(fields.clone()),
            _ => None,
        }
    }

    pub fn to_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.code().to_string(),
            message: self.user_message(),
            fields: self.fields(),
        })
    }
}

impl std::fmt::Display for BookingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingError::Validation(fields) => {
                write!(f, "Validation error: missing or invalid {}", fields.join(", "))
            }
            BookingError::Network(err) => write!(f, "Network error: {}", err),
            BookingError::Server { status, message } => {
                write!(f, "Server error ({}): {}", status, message)
            }
            BookingError::Parse(err) => write!(f, "Parse error: {}", err),
            BookingError::Payment(err) => write!(f, "Payment error: {}", err),
            BookingError::MissingReference(err) => write!(f, "Missing reference: {}", err),
            BookingError::SessionNotFound => write!(f, "Booking session not found"),
            BookingError::InvalidTransition(err) => write!(f, "Invalid transition: {}", err),
            BookingError::Configuration(err) => write!(f, "Configuration error: {}", err),
        }
    }
}

impl std::error::Error for BookingError {}

impl From<reqwest::Error> for BookingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BookingError::Network("Request timed out".to_string())
        } else if err.is_decode() {
            BookingError::Parse(err.to_string())
        } else {
            BookingError::Network(err.to_string())
        }
    }
}
