use async_trait::async_trait;

use crate::errors::BookingError;
use crate::models::payment::{PaymentConfirmation, PaymentIntentSecret};

/// Card payment provider seen by the booking flow.
///
/// The browser confirms the card itself with the client secret; the server
/// only creates intents and checks the outcome before booking.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an intent for `amount_minor` cents in the configured currency.
    async fn create_intent(&self, amount_minor: i64) -> Result<PaymentIntentSecret, BookingError>;

    /// Check that a confirmed intent actually holds the funds, in the
    /// configured currency, and report the amount held.
    async fn verify(&self, payment_intent_id: &str) -> Result<PaymentConfirmation, BookingError>;

    fn name(&self) -> &'static str;
}
