use async_trait::async_trait;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::EmailJsConfig;

const EMAILJS_SEND_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";

/// Template parameters of the booking confirmation email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingConfirmationEmail {
    pub to_email: String,
    pub to_name: String,
    pub car_model: String,
    pub pickup_location: String,
    pub pickup_date: String,
    pub return_date: String,
    pub total_price: String,
    pub reservation_no: String,
}

#[derive(Debug, Serialize)]
struct EmailJsRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    access_token: Option<&'a str>,
    template_params: &'a BookingConfirmationEmail,
}

#[derive(Debug)]
pub enum EmailError {
    RequestError(String),
    ApiError(String),
}

impl std::fmt::Display for EmailError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmailError::RequestError(err) => write!(f, "Request error: {}", err),
            EmailError::ApiError(err) => write!(f, "API error: {}", err),
        }
    }
}

impl std::error::Error for EmailError {}

/// Sends the confirmation email after a booking is accepted. Failures are
/// reported to the caller, which only logs them.
#[async_trait]
pub trait EmailDispatcher: Send + Sync {
    async fn send_booking_confirmation(&self, email: &BookingConfirmationEmail) -> Result<(), EmailError>;
}

pub struct EmailJsDispatcher {
    config: EmailJsConfig,
    client: reqwest::Client,
    endpoint: String,
}

impl EmailJsDispatcher {
    pub fn new(config: EmailJsConfig, client: reqwest::Client) -> Self {
        Self {
            config,
            client,
            endpoint: EMAILJS_SEND_URL.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl EmailDispatcher for EmailJsDispatcher {
    async fn send_booking_confirmation(&self, email: &BookingConfirmationEmail) -> Result<(), EmailError> {
        let request = EmailJsRequest {
            service_id: &self.config.service_id,
            template_id: &self.config.template_id,
            user_id: &self.config.public_key,
            access_token: self.config.private_key.as_deref(),
            template_params: email,
        };

        debug!("Sending booking confirmation for {}", email.reservation_no);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| EmailError::RequestError(e.to_string()))?;

        if response.status().is_success() {
            info!("Confirmation email sent for reservation {}", email.reservation_no);
            Ok(())
        } else {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(EmailError::ApiError(format!(
                "Status: {}, Body: {}",
                status, body
            )))
        }
    }
}
