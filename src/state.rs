use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use log::{info, warn};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::errors::BookingError;
use crate::models::payment::{PaymentConfirmation, PaymentIntentSecret};
use crate::services::booking_service::BookingService;
use crate::services::email_service::{EmailDispatcher, EmailJsDispatcher};
use crate::services::payment::PaymentGateway;
use crate::services::places_service::PlacesService;
use crate::services::rentals_api::RentalsApiClient;
use crate::services::session_store::SessionStore;
use crate::services::stripe::StripeGateway;

/// Stand-in used when no Stripe key is configured; every call fails with a
/// configuration error instead of the server refusing to start.
pub struct DisabledGateway;

#[async_trait]
impl PaymentGateway for DisabledGateway {
    async fn create_intent(&self, _amount_minor: i64) -> Result<PaymentIntentSecret, BookingError> {
        Err(BookingError::Configuration("STRIPE_SECRET_KEY not configured".to_string()))
    }

    async fn verify(&self, _payment_intent_id: &str) -> Result<PaymentConfirmation, BookingError> {
        Err(BookingError::Configuration("STRIPE_SECRET_KEY not configured".to_string()))
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Everything the handlers share, registered once as `web::Data<AppState>`.
pub struct AppState {
    pub config: AppConfig,
    pub api: Arc<RentalsApiClient>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub bookings: BookingService,
    pub sessions: SessionStore,
    pub places: PlacesService,
    pub email_enabled: bool,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        gateway: Arc<dyn PaymentGateway>,
        email: Option<Arc<dyn EmailDispatcher>>,
        places: PlacesService,
    ) -> Result<Self, BookingError> {
        let api = Arc::new(RentalsApiClient::new(
            config.rentals_api_base_url.clone(),
            config.http_timeout(),
        )?);
        let email_enabled = email.is_some();

        Ok(Self {
            bookings: BookingService::new(api.clone(), gateway.clone(), email),
            api,
            gateway,
            sessions: SessionStore::new(config.session_ttl()),
            places,
            email_enabled,
            config,
        })
    }

    /// Wire the real integrations from configuration. Missing optional
    /// integrations are logged and disabled.
    pub fn from_config(config: AppConfig) -> Result<Self, BookingError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()
            .map_err(|e| BookingError::Configuration(format!("HTTP client: {}", e)))?;

        let gateway: Arc<dyn PaymentGateway> = match &config.stripe_secret_key {
            Some(key) => Arc::new(StripeGateway::new(key.clone(), &config.payment_currency)?),
            None => {
                warn!("STRIPE_SECRET_KEY not set, payments are disabled");
                Arc::new(DisabledGateway)
            }
        };

        let email: Option<Arc<dyn EmailDispatcher>> = match &config.emailjs {
            Some(emailjs) => Some(Arc::new(EmailJsDispatcher::new(emailjs.clone(), http.clone()))),
            None => {
                warn!("EmailJS not configured, confirmation emails are disabled");
                None
            }
        };

        if config.google_maps_api_key.is_none() {
            warn!("GOOGLE_MAPS_API_KEY not set, place lookup is disabled");
        }
        let places = PlacesService::new(config.google_maps_api_key.clone(), http);

        info!("Using rentals API at {}", config.rentals_api_base_url);
        Self::new(config, gateway, email, places)
    }

    pub fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}
