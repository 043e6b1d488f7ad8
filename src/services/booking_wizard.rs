//! Two-step booking flow with a payment sub-flow.
//!
//! ```text
//! SelectionAndAddons -> DriverDetails -> PaymentModalOpen -> Submitted
//!                                         |          ^
//!                                         v          |
//!                                        PaymentFailed
//! ```
//!
//! The wizard never talks to the network. `BookingService` drives the
//! payment and submission steps and reports the outcome back through
//! `payment_authorized`, `payment_failed`, `booking_confirmed` and
//! `booking_rejected`.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::errors::BookingError;
use crate::models::driver::{DriverDetails, DriverField};
use crate::models::extras::{ExtraOption, ExtraSelection};
use crate::models::offer::Offer;
use crate::models::payment::{PaymentConfirmation, PendingPayment};
use crate::models::search::SearchCriteria;
use crate::services::input_normalizer::format_display_datetime;
use crate::services::pricing_service::PricingService;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum WizardStep {
    SelectionAndAddons,
    DriverDetails,
    PaymentModalOpen,
    PaymentFailed { message: String },
    Submitted { confirmation_id: String },
}

impl WizardStep {
    pub fn name(&self) -> &'static str {
        match self {
            WizardStep::SelectionAndAddons => "selection_and_addons",
            WizardStep::DriverDetails => "driver_details",
            WizardStep::PaymentModalOpen => "payment_modal_open",
            WizardStep::PaymentFailed { .. } => "payment_failed",
            WizardStep::Submitted { .. } => "submitted",
        }
    }

    /// Steps where the user can still edit extras and driver fields.
    fn is_editable(&self) -> bool {
        matches!(self, WizardStep::SelectionAndAddons | WizardStep::DriverDetails)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtraView {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub fee: Decimal,
    pub quantity: u32,
    pub selected: bool,
}

/// Serialisable snapshot handed to the browser.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WizardView {
    #[serde(flatten)]
    pub step: WizardStep,
    pub offer: Offer,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub pickup: String,
    pub dropoff: String,
    pub days: u32,
    pub extras: Vec<ExtraView>,
    pub driver: DriverDetails,
    pub field_errors: Vec<DriverField>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub display_total: String,
    pub payment_authorized: bool,
    pub alert: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BookingWizard {
    offer: Offer,
    criteria: SearchCriteria,
    search_location_id: Option<u64>,
    extras: Vec<ExtraOption>,
    selection: ExtraSelection,
    driver: DriverDetails,
    field_errors: BTreeSet<DriverField>,
    step: WizardStep,
    pending: Option<PendingPayment>,
    payment: Option<PaymentConfirmation>,
    alert: Option<String>,
}

impl BookingWizard {
    pub fn new(offer: Offer, criteria: SearchCriteria, search_location_id: Option<u64>) -> Self {
        Self {
            offer,
            criteria,
            search_location_id,
            extras: Vec::new(),
            selection: ExtraSelection::default(),
            driver: DriverDetails::default(),
            field_errors: BTreeSet::new(),
            step: WizardStep::SelectionAndAddons,
            pending: None,
            payment: None,
            alert: None,
        }
    }

    fn invalid(&self, action: &str) -> BookingError {
        BookingError::InvalidTransition(format!(
            "cannot {} while in step {}",
            action,
            self.step.name()
        ))
    }

    pub fn step(&self) -> &WizardStep {
        &self.step
    }

    pub fn offer(&self) -> &Offer {
        &self.offer
    }

    pub fn criteria(&self) -> &SearchCriteria {
        &self.criteria
    }

    pub fn search_location_id(&self) -> Option<u64> {
        self.search_location_id
    }

    pub fn driver(&self) -> &DriverDetails {
        &self.driver
    }

    pub fn extras(&self) -> &[ExtraOption] {
        &self.extras
    }

    pub fn days(&self) -> u32 {
        self.criteria.rental_days.max(1)
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn field_errors(&self) -> Vec<DriverField> {
        self.field_errors.iter().copied().collect()
    }

    /// Confirmation kept from a payment whose booking was not yet accepted.
    pub fn authorized_payment(&self) -> Option<&PaymentConfirmation> {
        self.payment.as_ref()
    }

    /// The intent opened for this session, the only one `confirm` accepts.
    pub fn pending_payment(&self) -> Option<&PendingPayment> {
        self.pending.as_ref()
    }

    pub fn set_alert(&mut self, message: impl Into<String>) {
        self.alert = Some(message.into());
    }

    /// Replace the extras offered for this car; the user's toggles survive.
    pub fn set_extras(&mut self, extras: Vec<ExtraOption>) {
        self.extras = extras;
    }

    pub fn toggle_extra(&mut self, name: &str) -> Result<bool, BookingError> {
        if !self.step.is_editable() {
            return Err(self.invalid("change extras"));
        }
        if self.payment.is_some() {
            return Err(BookingError::InvalidTransition(
                "cannot change extras once payment is authorized".to_string(),
            ));
        }
        if !self.extras.iter().any(|extra| extra.name == name) {
            return Err(BookingError::Validation(vec!["extras".to_string()]));
        }
        Ok(self.selection.toggle(name))
    }

    /// Names of toggled extras, in the order the API listed them.
    pub fn selected_extra_names(&self) -> Vec<String> {
        self.extras
            .iter()
            .filter(|extra| self.selection.is_selected(&extra.name))
            .map(|extra| extra.name.clone())
            .collect()
    }

    pub fn total(&self) -> Decimal {
        PricingService::aggregate(self.offer.price, self.days(), &self.extras, &self.selection)
    }

    /// Total in cents, the amount every payment for this booking must match.
    pub fn amount_minor(&self) -> Option<i64> {
        PricingService::to_minor_units(self.total()).filter(|amount| *amount > 0)
    }

    pub fn continue_to_driver(&mut self) -> Result<(), BookingError> {
        match self.step {
            WizardStep::SelectionAndAddons | WizardStep::DriverDetails => {
                self.step = WizardStep::DriverDetails;
                Ok(())
            }
            _ => Err(self.invalid("continue to driver details")),
        }
    }

    /// Going back keeps driver fields and toggled extras.
    pub fn back_to_selection(&mut self) -> Result<(), BookingError> {
        match self.step {
            WizardStep::SelectionAndAddons | WizardStep::DriverDetails => {
                self.step = WizardStep::SelectionAndAddons;
                Ok(())
            }
            _ => Err(self.invalid("go back to selection")),
        }
    }

    pub fn update_driver(&mut self, details: DriverDetails) -> Result<(), BookingError> {
        if !self.step.is_editable() {
            return Err(self.invalid("edit driver details"));
        }
        self.field_errors.retain(|field| !details.is_present(*field));
        self.driver = details;
        Ok(())
    }

    /// Guarded transition into the payment modal. On failure the wizard
    /// stays in `DriverDetails` with every missing field flagged.
    pub fn open_payment(&mut self) -> Result<(), BookingError> {
        if self.step != WizardStep::DriverDetails {
            return Err(self.invalid("open payment"));
        }
        let missing = self.driver.missing_fields();
        if !missing.is_empty() {
            self.field_errors = missing.iter().copied().collect();
            return Err(BookingError::Validation(
                missing.iter().map(|f| f.as_str().to_string()).collect(),
            ));
        }
        self.field_errors.clear();
        self.alert = None;
        self.step = WizardStep::PaymentModalOpen;
        Ok(())
    }

    pub fn close_payment(&mut self) -> Result<(), BookingError> {
        match self.step {
            WizardStep::PaymentModalOpen | WizardStep::PaymentFailed { .. } => {
                self.step = WizardStep::DriverDetails;
                Ok(())
            }
            _ => Err(self.invalid("close payment")),
        }
    }

    pub fn payment_failed(&mut self, message: impl Into<String>) -> Result<(), BookingError> {
        if self.step != WizardStep::PaymentModalOpen {
            return Err(self.invalid("record a payment failure"));
        }
        let message = message.into();
        self.alert = Some(message.clone());
        self.step = WizardStep::PaymentFailed { message };
        Ok(())
    }

    pub fn retry_payment(&mut self) -> Result<(), BookingError> {
        match self.step {
            WizardStep::PaymentFailed { .. } => {
                self.alert = None;
                self.step = WizardStep::PaymentModalOpen;
                Ok(())
            }
            _ => Err(self.invalid("retry payment")),
        }
    }

    pub fn payment_requested(&mut self, pending: PendingPayment) -> Result<(), BookingError> {
        if self.step != WizardStep::PaymentModalOpen {
            return Err(self.invalid("request a payment"));
        }
        self.pending = Some(pending);
        Ok(())
    }

    pub fn payment_authorized(&mut self, confirmation: PaymentConfirmation) -> Result<(), BookingError> {
        if self.step != WizardStep::PaymentModalOpen {
            return Err(self.invalid("record a payment"));
        }
        self.pending = None;
        self.payment = Some(confirmation);
        Ok(())
    }

    pub fn booking_confirmed(&mut self, confirmation_id: impl Into<String>) -> Result<(), BookingError> {
        if self.step != WizardStep::PaymentModalOpen || self.payment.is_none() {
            return Err(self.invalid("confirm the booking"));
        }
        self.alert = None;
        self.step = WizardStep::Submitted {
            confirmation_id: confirmation_id.into(),
        };
        Ok(())
    }

    /// The payment modal closes and a blocking alert names the reason. The
    /// payment confirmation is kept so a retry does not charge again.
    pub fn booking_rejected(&mut self, reason: &str) -> Result<(), BookingError> {
        if self.step != WizardStep::PaymentModalOpen {
            return Err(self.invalid("reject the booking"));
        }
        self.alert = Some(format!("Booking failed: {}", reason));
        self.step = WizardStep::DriverDetails;
        Ok(())
    }

    pub fn view(&self) -> WizardView {
        let total = self.total();
        WizardView {
            step: self.step.clone(),
            offer: self.offer.clone(),
            pickup_location: self.criteria.pickup.name.clone(),
            dropoff_location: self.criteria.dropoff.name.clone(),
            pickup: format_display_datetime(self.criteria.pickup_at),
            dropoff: format_display_datetime(self.criteria.dropoff_at),
            days: self.days(),
            extras: self
                .extras
                .iter()
                .map(|extra| ExtraView {
                    name: extra.name.clone(),
                    fee: extra.fee,
                    quantity: extra.quantity,
                    selected: self.selection.is_selected(&extra.name),
                })
                .collect(),
            driver: self.driver.clone(),
            field_errors: self.field_errors(),
            total,
            display_total: PricingService::display_price(total),
            payment_authorized: self.payment.is_some(),
            alert: self.alert.clone(),
        }
    }
}
