//! Payment and submission steps of the booking flow.
//!
//! Funds are authorized before `POST /api/book-car` is sent. Only the intent
//! opened for the session is accepted, and only for the booking total. When
//! the API then rejects the booking, the authorized intent stays on the
//! wizard and a second submission reuses it instead of charging again.

use chrono::{NaiveDate, NaiveDateTime};
use log::{error, info, warn};
use std::sync::Arc;

use crate::errors::BookingError;
use crate::models::booking::{BookingConfirmation, BookingRequest};
use crate::models::offer::Offer;
use crate::models::payment::{PaymentConfirmation, PaymentIntentSecret, PendingPayment};
use crate::services::booking_wizard::{BookingWizard, WizardStep};
use crate::services::email_service::{BookingConfirmationEmail, EmailDispatcher};
use crate::services::payment::interface::PaymentGateway;
use crate::services::pricing_service::PricingService;
use crate::services::rentals_api::RentalsApiClient;

pub const MISSING_LOCATION: &str =
    "Location information is missing. Please try selecting the car again.";
pub const FOREIGN_PAYMENT: &str = "This payment does not belong to this booking.";
pub const AMOUNT_MISMATCH: &str = "The payment amount does not match the booking total.";
pub const HELD_AMOUNT_CHANGED: &str =
    "The booking total changed after your payment was authorized. Please contact support.";

const DAYS_PER_YEAR: f64 = 365.25;

/// Whole years between birth and today. `None` for a birth date in the future.
pub fn driver_age(date_of_birth: Option<NaiveDate>, today: NaiveDate) -> Option<u32> {
    let days = (today - date_of_birth?).num_days();
    if days < 0 {
        return None;
    }
    Some((days as f64 / DAYS_PER_YEAR).floor() as u32)
}

/// Location id for the booking, first match wins: the id carried by the
/// search, the offer's location, then the vendor id.
pub fn resolve_location_id(search_location_id: Option<u64>, offer: &Offer) -> Result<u64, BookingError> {
    if let Some(id) = search_location_id {
        return Ok(id);
    }
    if let Some(id) = offer.embedded_location_id() {
        return Ok(id);
    }
    if let Some(id) = offer.embedded_vendor_id() {
        warn!("Using vendor ID {} as fallback location ID for car {}", id, offer.id);
        return Ok(id);
    }
    error!("Location ID missing from search and car {}", offer.id);
    Err(BookingError::MissingReference(MISSING_LOCATION.to_string()))
}

/// `2030-08-20 10:00`
pub fn format_api_booking_date(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

pub fn build_request(wizard: &BookingWizard, today: NaiveDate) -> Result<BookingRequest, BookingError> {
    let offer = wizard.offer();
    let criteria = wizard.criteria();
    let driver = wizard.driver();
    let location_id = resolve_location_id(wizard.search_location_id(), offer)?;

    Ok(BookingRequest {
        car_id: offer.id,
        location_id,
        pickup_date: format_api_booking_date(criteria.pickup_at),
        dropoff_date: format_api_booking_date(criteria.dropoff_at),
        pickup_location: criteria.pickup.name.clone(),
        dropoff_location: criteria.dropoff.name.clone(),
        driver_age: driver_age(driver.date_of_birth, today),
        country: driver
            .optional_country()
            .or_else(|| Some(criteria.country.clone())),
        first_name: driver.first_name.trim().to_string(),
        last_name: driver.last_name.trim().to_string(),
        email: driver.email.trim().to_string(),
        phone: driver.phone_number.trim().to_string(),
        address: driver.optional_address(),
        city: driver.optional_city(),
        state: driver.optional_state(),
        zipcode: driver.optional_zipcode(),
        extras: wizard.selected_extra_names(),
        total_price: PricingService::rounded(wizard.total()),
    })
}

fn confirmation_email(wizard: &BookingWizard, confirmation_id: &str) -> BookingConfirmationEmail {
    let criteria = wizard.criteria();
    BookingConfirmationEmail {
        to_email: wizard.driver().email.trim().to_string(),
        to_name: wizard.driver().full_name(),
        car_model: wizard.offer().model.clone(),
        pickup_location: criteria.pickup.name.clone(),
        pickup_date: criteria.pickup_date.clone(),
        return_date: criteria.dropoff_date.clone(),
        total_price: PricingService::display_price(wizard.total()),
        reservation_no: confirmation_id.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaymentStart {
    /// A new intent; the browser confirms the card with its client secret.
    Pending(PaymentIntentSecret),
    /// Funds from an earlier attempt are still held for this booking.
    AlreadyAuthorized(PaymentConfirmation),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Confirmed(BookingConfirmation),
    Rejected { reason: String },
    PaymentDeclined { message: String },
}

pub struct BookingService {
    api: Arc<RentalsApiClient>,
    gateway: Arc<dyn PaymentGateway>,
    email: Option<Arc<dyn EmailDispatcher>>,
}

impl BookingService {
    pub fn new(
        api: Arc<RentalsApiClient>,
        gateway: Arc<dyn PaymentGateway>,
        email: Option<Arc<dyn EmailDispatcher>>,
    ) -> Self {
        Self { api, gateway, email }
    }

    pub fn gateway(&self) -> &Arc<dyn PaymentGateway> {
        &self.gateway
    }

    /// Open the payment modal. The location id is resolved up front so no
    /// card is charged for a booking that could never be submitted.
    pub async fn open_payment(&self, wizard: &mut BookingWizard) -> Result<PaymentStart, BookingError> {
        wizard.open_payment()?;

        let ready = resolve_location_id(wizard.search_location_id(), wizard.offer()).and_then(|_| {
            wizard
                .amount_minor()
                .ok_or_else(|| BookingError::Validation(vec!["total_price".to_string()]))
        });
        let amount = match ready {
            Ok(amount) => amount,
            Err(err) => {
                wizard.close_payment()?;
                wizard.set_alert(err.user_message());
                return Err(err);
            }
        };

        if let Some(existing) = wizard.authorized_payment().cloned() {
            if existing.amount_minor != amount {
                error!(
                    "Payment {} holds {} but the booking for car {} now totals {}",
                    existing.payment_intent_id,
                    existing.amount_minor,
                    wizard.offer().id,
                    amount
                );
                let err = BookingError::Payment(HELD_AMOUNT_CHANGED.to_string());
                wizard.close_payment()?;
                wizard.set_alert(err.user_message());
                return Err(err);
            }
            info!(
                "Reusing authorized payment {} for car {}",
                existing.payment_intent_id,
                wizard.offer().id
            );
            return Ok(PaymentStart::AlreadyAuthorized(existing));
        }

        match self.gateway.create_intent(amount).await {
            Ok(secret) => {
                wizard.payment_requested(PendingPayment {
                    payment_intent_id: secret.payment_intent_id.clone(),
                    amount_minor: amount,
                })?;
                Ok(PaymentStart::Pending(secret))
            }
            Err(err) => {
                wizard.payment_failed(err.user_message())?;
                Err(err)
            }
        }
    }

    /// Verify the payment, then submit the booking.
    pub async fn confirm(
        &self,
        wizard: &mut BookingWizard,
        payment_intent_id: &str,
        today: NaiveDate,
    ) -> Result<SubmissionOutcome, BookingError> {
        if wizard.step() != &WizardStep::PaymentModalOpen {
            return Err(BookingError::InvalidTransition(format!(
                "cannot submit the booking while in step {}",
                wizard.step().name()
            )));
        }

        let amount = wizard
            .amount_minor()
            .ok_or_else(|| BookingError::Validation(vec!["total_price".to_string()]))?;

        let held = wizard
            .authorized_payment()
            .filter(|p| payment_intent_id.is_empty() || p.payment_intent_id == payment_intent_id)
            .cloned();

        let payment = match held {
            Some(payment) if payment.amount_minor == amount => payment,
            Some(payment) => {
                error!(
                    "Payment {} holds {} but the booking totals {}",
                    payment.payment_intent_id, payment.amount_minor, amount
                );
                return Err(BookingError::Payment(HELD_AMOUNT_CHANGED.to_string()));
            }
            None if payment_intent_id.is_empty() => {
                return Err(BookingError::Validation(vec!["payment_intent_id".to_string()]))
            }
            None => {
                let Some(pending) = wizard
                    .pending_payment()
                    .filter(|p| p.payment_intent_id == payment_intent_id)
                    .cloned()
                else {
                    warn!(
                        "Payment {} was not opened for the booking of car {}",
                        payment_intent_id,
                        wizard.offer().id
                    );
                    return Err(BookingError::Payment(FOREIGN_PAYMENT.to_string()));
                };

                match self.gateway.verify(payment_intent_id).await {
                    Ok(payment)
                        if payment.amount_minor == pending.amount_minor
                            && payment.amount_minor == amount =>
                    {
                        payment
                    }
                    Ok(payment) => {
                        error!(
                            "Payment {} holds {} but the booking totals {}",
                            payment.payment_intent_id, payment.amount_minor, amount
                        );
                        wizard.payment_failed(AMOUNT_MISMATCH)?;
                        return Ok(SubmissionOutcome::PaymentDeclined {
                            message: AMOUNT_MISMATCH.to_string(),
                        });
                    }
                    Err(err) => {
                        let message = err.user_message();
                        wizard.payment_failed(message.clone())?;
                        return Ok(SubmissionOutcome::PaymentDeclined { message });
                    }
                }
            }
        };

        wizard.payment_authorized(payment.clone())?;
        let request = build_request(wizard, today)?;

        match self.api.book_car(&request).await {
            Ok(confirmation) => {
                wizard.booking_confirmed(confirmation.confirmation_id.clone())?;
                info!(
                    "Booking {} confirmed for car {}",
                    confirmation.confirmation_id, request.car_id
                );
                self.send_confirmation(wizard, &confirmation.confirmation_id)
                    .await;
                Ok(SubmissionOutcome::Confirmed(confirmation))
            }
            Err(err) => {
                let reason = err.user_message();
                error!(
                    "Payment {} authorized but booking for car {} failed: {}",
                    payment.payment_intent_id, request.car_id, err
                );
                wizard.booking_rejected(&reason)?;
                Ok(SubmissionOutcome::Rejected { reason })
            }
        }
    }

    async fn send_confirmation(&self, wizard: &BookingWizard, confirmation_id: &str) {
        let Some(dispatcher) = &self.email else {
            warn!("Email is not configured; skipping confirmation for {}", confirmation_id);
            return;
        };
        let email = confirmation_email(wizard, confirmation_id);
        if let Err(e) = dispatcher.send_booking_confirmation(&email).await {
            error!("EmailJS error for reservation {}: {}", confirmation_id, e);
        }
    }
}
