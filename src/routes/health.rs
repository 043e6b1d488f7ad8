use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use std::collections::HashMap;
use std::env;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: HashMap<String, ServiceStatus>,
    environment: String,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

impl ServiceStatus {
    fn ok(details: String) -> Self {
        Self {
            status: "ok".to_string(),
            details: Some(details),
        }
    }

    fn error(details: String) -> Self {
        Self {
            status: "error".to_string(),
            details: Some(details),
        }
    }
}

pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let mut health = HealthStatus {
        status: "ok".to_string(),
        services: HashMap::new(),
        environment: env::var("RUST_ENV").unwrap_or("development".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    health.services.insert(
        "rentals_api".to_string(),
        ServiceStatus::ok(format!("Base URL {}", state.api.base_url())),
    );
    health
        .services
        .insert("stripe".to_string(), check_stripe(&state));
    health
        .services
        .insert("emailjs".to_string(), check_emailjs(&state));
    health
        .services
        .insert("google_maps".to_string(), check_google_maps(&state));

    // Any unconfigured integration degrades the overall status
    if health.services.values().any(|s| s.status != "ok") {
        health.status = "degraded".to_string();
    }

    HttpResponse::Ok().json(health)
}

fn mask(key: &str) -> String {
    if key.len() > 8 && key.is_ascii() {
        format!("{}***{}", &key[0..4], &key[key.len() - 4..])
    } else {
        "***".to_string()
    }
}

fn check_stripe(state: &AppState) -> ServiceStatus {
    match &state.config.stripe_secret_key {
        Some(key) => ServiceStatus::ok(format!(
            "Stripe API key configured ({}), currency {}",
            mask(key),
            state.config.payment_currency
        )),
        None => ServiceStatus::error("STRIPE_SECRET_KEY not configured".to_string()),
    }
}

fn check_emailjs(state: &AppState) -> ServiceStatus {
    if state.email_enabled {
        ServiceStatus::ok("EmailJS configured".to_string())
    } else {
        ServiceStatus::error(
            "Missing configuration: EMAILJS_SERVICE_ID, EMAILJS_TEMPLATE_ID, EMAILJS_PUBLIC_KEY"
                .to_string(),
        )
    }
}

fn check_google_maps(state: &AppState) -> ServiceStatus {
    if state.places.is_configured() {
        ServiceStatus::ok(format!("Places lookup initialised: {}", state.places.load_count() > 0))
    } else {
        ServiceStatus::error("GOOGLE_MAPS_API_KEY not configured".to_string())
    }
}
