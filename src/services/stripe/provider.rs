use async_trait::async_trait;
use log::{error, info, warn};
use std::str::FromStr;
use stripe::{Currency, PaymentIntent, PaymentIntentId, PaymentIntentStatus};

use crate::errors::BookingError;
use crate::models::payment::{PaymentConfirmation, PaymentIntentSecret};
use crate::services::payment::interface::PaymentGateway;

pub struct StripeGateway {
    client: stripe::Client,
    currency: Currency,
}

/// `"eur"` -> `Currency::EUR`. Stripe currency codes are lowercase on the wire.
pub fn parse_currency(code: &str) -> Result<Currency, BookingError> {
    serde_json::from_value(serde_json::Value::String(code.trim().to_lowercase()))
        .map_err(|_| BookingError::Configuration(format!("Unsupported payment currency: {}", code)))
}

impl StripeGateway {
    pub fn new(api_key: impl Into<String>, currency: &str) -> Result<Self, BookingError> {
        Ok(Self {
            client: stripe::Client::new(api_key.into()),
            currency: parse_currency(currency)?,
        })
    }
}

/// Statuses after which funds are held or captured.
fn is_authorized(status: &PaymentIntentStatus) -> bool {
    matches!(
        status,
        PaymentIntentStatus::Succeeded | PaymentIntentStatus::RequiresCapture
    )
}

fn check_currency(charged: Currency, expected: Currency) -> Result<(), BookingError> {
    if charged != expected {
        return Err(BookingError::Payment(format!(
            "Payment was made in {} but bookings are charged in {}",
            charged.to_string().to_uppercase(),
            expected.to_string().to_uppercase()
        )));
    }
    Ok(())
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(&self, amount_minor: i64) -> Result<PaymentIntentSecret, BookingError> {
        if amount_minor <= 0 {
            return Err(BookingError::Validation(vec!["amount".to_string()]));
        }

        let params = stripe::CreatePaymentIntent::new(amount_minor, self.currency);
        let intent = PaymentIntent::create(&self.client, params).await.map_err(|e| {
            error!("Error creating payment intent: {}", e);
            BookingError::Payment(format!("Failed to create payment intent: {}", e))
        })?;

        let client_secret = intent.client_secret.ok_or_else(|| {
            BookingError::Payment("Payment intent has no client secret".to_string())
        })?;

        info!("Created payment intent {} for {} minor units", intent.id, amount_minor);
        Ok(PaymentIntentSecret {
            payment_intent_id: intent.id.to_string(),
            client_secret,
        })
    }

    async fn verify(&self, payment_intent_id: &str) -> Result<PaymentConfirmation, BookingError> {
        let id = PaymentIntentId::from_str(payment_intent_id)
            .map_err(|_| BookingError::Payment("Invalid payment intent ID".to_string()))?;

        let intent = PaymentIntent::retrieve(&self.client, &id, &[])
            .await
            .map_err(|e| {
                error!("Error retrieving payment intent {}: {}", payment_intent_id, e);
                BookingError::Payment(format!("Failed to retrieve payment intent: {}", e))
            })?;

        if !is_authorized(&intent.status) {
            let message = intent
                .last_payment_error
                .as_ref()
                .and_then(|err| err.message.clone())
                .unwrap_or_else(|| format!("Payment was not completed (status: {:?})", intent.status));
            warn!("Payment intent {} not authorized: {}", payment_intent_id, message);
            return Err(BookingError::Payment(message));
        }

        check_currency(intent.currency, self.currency)?;

        Ok(PaymentConfirmation {
            payment_intent_id: intent.id.to_string(),
            amount_minor: intent.amount,
        })
    }

    fn name(&self) -> &'static str {
        "stripe"
    }
}
