use actix_web::{web, HttpResponse, Responder};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::errors::BookingError;
use crate::models::driver::DriverDetails;
use crate::models::offer::Offer;
use crate::models::payment::ConfirmPaymentInput;
use crate::models::search::SearchForm;
use crate::services::booking_service::{PaymentStart, SubmissionOutcome};
use crate::services::booking_wizard::{BookingWizard, WizardView};
use crate::services::input_normalizer::normalize;
use crate::services::rentals_api::RentalsApiClient;
use crate::services::session_store::{apply_if_current, BookingSession};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateBookingInput {
    pub form: SearchForm,
    /// The offer as shown on the result card.
    pub offer: Option<Offer>,
    pub car_id: Option<u64>,
    /// Location id carried over from the search, when known.
    pub location_id: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub extras_loading: bool,
    #[serde(flatten)]
    pub view: WizardView,
}

fn session_view(session_id: Uuid, session: &BookingSession) -> SessionView {
    SessionView {
        session_id,
        extras_loading: session.extras_loading,
        view: session.wizard.view(),
    }
}

async fn render(state: &AppState, session_id: Uuid) -> Result<SessionView, BookingError> {
    let handle = state.sessions.get(&session_id).await?;
    let session = handle.lock().await;
    Ok(session_view(session_id, &session))
}

/// Fetch the extras for the session's current offer. Only a weak handle is
/// held across the request, so a session closed meanwhile is not kept alive.
/// Starting a load invalidates every earlier one, so a slow response cannot
/// overwrite the result of a later reload.
async fn load_extras(api: &RentalsApiClient, session: Weak<Mutex<BookingSession>>) {
    let Some(handle) = session.upgrade() else {
        return;
    };
    let (car_id, days, revision) = {
        let mut guard = handle.lock().await;
        let revision = guard.begin_extras_load();
        (guard.wizard.offer().id, guard.wizard.days(), revision)
    };
    drop(handle);

    let result = api.car_extras(car_id, days).await;

    apply_if_current(&session, revision, |s| {
        s.extras_loading = false;
        match result {
            Ok(extras) => s.wizard.set_extras(extras),
            Err(e) => {
                warn!("Error fetching extras for car {}: {}", car_id, e);
                s.wizard.set_extras(Vec::new());
            }
        }
    })
    .await;
}

/// The price always comes from fresh car details. The result card only
/// fills in location and vendor ids the detail lacks.
async fn resolve_offer(state: &AppState, input: &CreateBookingInput) -> Result<Offer, BookingError> {
    let car_id = input
        .offer
        .as_ref()
        .map(|o| o.id)
        .or(input.car_id)
        .ok_or_else(|| BookingError::Validation(vec!["car_id".to_string()]))?;

    let mut detail = state.api.car_detail(car_id).await.map_err(|e| {
        warn!("Car {} could not be loaded: {}", car_id, e);
        e
    })?;
    if let Some(card) = &input.offer {
        if detail.embedded_location_id().is_none() {
            detail.location_id = card.embedded_location_id();
        }
        if detail.embedded_vendor_id().is_none() {
            detail.vendor_id = card.embedded_vendor_id();
        }
    }
    Ok(detail)
}

pub async fn create(state: web::Data<AppState>, input: web::Json<CreateBookingInput>) -> impl Responder {
    let input = input.into_inner();

    let criteria = match normalize(&input.form, state.today()) {
        Ok(criteria) => criteria,
        Err(e) => return e.to_response(),
    };
    let offer = match resolve_offer(&state, &input).await {
        Ok(offer) => offer,
        Err(e) => return e.to_response(),
    };

    info!("Opening booking for car {} ({})", offer.id, offer.model);
    let wizard = BookingWizard::new(offer, criteria, input.location_id);
    let (session_id, handle) = state.sessions.insert(wizard).await;
    let weak = Arc::downgrade(&handle);
    drop(handle);

    load_extras(&state.api, weak).await;

    match render(&state, session_id).await {
        Ok(view) => HttpResponse::Created().json(view),
        Err(e) => e.to_response(),
    }
}

pub async fn get(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    match render(&state, path.into_inner()).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => e.to_response(),
    }
}

pub async fn close(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    match state.sessions.remove(&path.into_inner()).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => e.to_response(),
    }
}

/// Apply a synchronous wizard transition and return the new view.
async fn transition<F>(state: &AppState, session_id: Uuid, apply: F) -> HttpResponse
where
    F: FnOnce(&mut BookingWizard) -> Result<(), BookingError>,
{
    let handle = match state.sessions.get(&session_id).await {
        Ok(handle) => handle,
        Err(e) => return e.to_response(),
    };
    let mut session = handle.lock().await;
    match apply(&mut session.wizard) {
        Ok(()) => HttpResponse::Ok().json(session_view(session_id, &session)),
        Err(e) => e.to_response(),
    }
}

pub async fn continue_to_driver(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    transition(&state, path.into_inner(), |w| w.continue_to_driver()).await
}

pub async fn back(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    transition(&state, path.into_inner(), |w| w.back_to_selection()).await
}

pub async fn toggle_extra(state: web::Data<AppState>, path: web::Path<(Uuid, String)>) -> impl Responder {
    let (session_id, name) = path.into_inner();
    transition(&state, session_id, |w| w.toggle_extra(&name).map(|_| ())).await
}

pub async fn update_driver(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    input: web::Json<DriverDetails>,
) -> impl Responder {
    let details = input.into_inner();
    transition(&state, path.into_inner(), |w| w.update_driver(details)).await
}

pub async fn close_payment(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    transition(&state, path.into_inner(), |w| w.close_payment()).await
}

pub async fn retry_payment(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    transition(&state, path.into_inner(), |w| w.retry_payment()).await
}

pub async fn reload_extras(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let session_id = path.into_inner();
    let handle = match state.sessions.get(&session_id).await {
        Ok(handle) => handle,
        Err(e) => return e.to_response(),
    };
    let weak = Arc::downgrade(&handle);
    drop(handle);

    load_extras(&state.api, weak).await;

    match render(&state, session_id).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => e.to_response(),
    }
}

#[derive(Debug, Serialize)]
struct PaymentStarted {
    #[serde(skip_serializing_if = "Option::is_none")]
    client_secret: Option<String>,
    payment_intent_id: String,
    already_authorized: bool,
    session: SessionView,
}

pub async fn open_payment(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let session_id = path.into_inner();
    let handle = match state.sessions.get(&session_id).await {
        Ok(handle) => handle,
        Err(e) => return e.to_response(),
    };
    let mut session = handle.lock().await;

    match state.bookings.open_payment(&mut session.wizard).await {
        Ok(PaymentStart::Pending(secret)) => HttpResponse::Ok().json(PaymentStarted {
            client_secret: Some(secret.client_secret),
            payment_intent_id: secret.payment_intent_id,
            already_authorized: false,
            session: session_view(session_id, &session),
        }),
        Ok(PaymentStart::AlreadyAuthorized(payment)) => HttpResponse::Ok().json(PaymentStarted {
            client_secret: None,
            payment_intent_id: payment.payment_intent_id,
            already_authorized: true,
            session: session_view(session_id, &session),
        }),
        Err(e) => e.to_response(),
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
enum ConfirmOutput {
    Confirmed { confirmation_id: String, session: SessionView },
    Rejected { reason: String, session: SessionView },
    PaymentDeclined { message: String, session: SessionView },
}

pub async fn confirm(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    input: web::Json<ConfirmPaymentInput>,
) -> impl Responder {
    let session_id = path.into_inner();
    let handle = match state.sessions.get(&session_id).await {
        Ok(handle) => handle,
        Err(e) => return e.to_response(),
    };
    let mut session = handle.lock().await;

    let outcome = state
        .bookings
        .confirm(&mut session.wizard, &input.payment_intent_id, state.today())
        .await;
    let view = session_view(session_id, &session);

    match outcome {
        Ok(SubmissionOutcome::Confirmed(confirmation)) => HttpResponse::Ok().json(ConfirmOutput::Confirmed {
            confirmation_id: confirmation.confirmation_id,
            session: view,
        }),
        Ok(SubmissionOutcome::Rejected { reason }) => {
            HttpResponse::Ok().json(ConfirmOutput::Rejected { reason, session: view })
        }
        Ok(SubmissionOutcome::PaymentDeclined { message }) => {
            HttpResponse::Ok().json(ConfirmOutput::PaymentDeclined { message, session: view })
        }
        Err(e) => e.to_response(),
    }
}
