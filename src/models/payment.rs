use serde::{Deserialize, Serialize};

/// Proof from the gateway that funds were authorized for a booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub payment_intent_id: String,
    /// Amount held, in minor currency units.
    pub amount_minor: i64,
}

/// Intent created for one booking session and not yet verified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingPayment {
    pub payment_intent_id: String,
    pub amount_minor: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntentSecret {
    pub payment_intent_id: String,
    pub client_secret: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatePaymentIntentInput {
    /// Minor currency units.
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmPaymentInput {
    /// May be empty when resubmitting with a payment that is already held.
    #[serde(default)]
    pub payment_intent_id: String,
}
