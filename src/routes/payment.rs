use actix_web::{web, HttpResponse, Responder};
use log::{error, info};
use serde::Serialize;
use serde_json::json;

use crate::models::payment::CreatePaymentIntentInput;
use crate::state::AppState;

#[derive(Serialize)]
struct ClientSecret {
    #[serde(rename = "clientSecret")]
    client_secret: String,
}

/// Standalone intent creation for clients that collect the amount
/// themselves. Booking sessions go through `/api/bookings/{id}/payment`.
pub async fn create_payment_intent(
    state: web::Data<AppState>,
    input: web::Json<CreatePaymentIntentInput>,
) -> impl Responder {
    info!("Creating payment intent via {}", state.gateway.name());

    match state.gateway.create_intent(input.amount).await {
        Ok(intent) => HttpResponse::Ok().json(ClientSecret {
            client_secret: intent.client_secret,
        }),
        Err(e) => {
            error!("Error creating payment intent: {}", e);
            HttpResponse::InternalServerError().json(json!({ "error": e.user_message() }))
        }
    }
}
