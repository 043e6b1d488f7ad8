#![allow(dead_code)]

use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rentnrides_api::config::AppConfig;
use rentnrides_api::errors::BookingError;
use rentnrides_api::models::payment::{PaymentConfirmation, PaymentIntentSecret};
use rentnrides_api::routes;
use rentnrides_api::services::email_service::{BookingConfirmationEmail, EmailDispatcher, EmailError};
use rentnrides_api::services::payment::PaymentGateway;
use rentnrides_api::services::places_service::PlacesService;
use rentnrides_api::state::AppState;

/// Recorded traffic and canned responses of the fake rentals API.
pub struct FakeApiState {
    pub search_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
    pub extras_calls: AtomicUsize,
    pub book_calls: AtomicUsize,
    pub last_search: Mutex<Option<HashMap<String, String>>>,
    pub last_extras_query: Mutex<Option<String>>,
    pub last_booking: Mutex<Option<Value>>,
    pub search_response: Mutex<(u16, Value)>,
    pub booking_response: Mutex<(u16, Value)>,
}

pub fn panda_json() -> Value {
    json!({
        "id": 42,
        "model_type": "Fiat Panda",
        "category": "Economy",
        "seats": "4",
        "transmission_type": "Automatic",
        "air_conditioning": 1,
        "price": "29.75",
        "deposit": "750.00",
        "vendor": {"id": 3, "first_name": "Island Cars"},
        "location": {"id": 7, "name": "Malta Airport", "currency": "EUR"}
    })
}

pub fn duster_json() -> Value {
    json!({
        "id": 43,
        "model_type": "Dacia Duster",
        "category": "SUV",
        "seats": 5,
        "transmission_type": "Manual",
        "price": 45,
        "deposit": 1800,
        "vendor": {"id": 4, "first_name": "Gozo Rent"},
        "location": {"id": 7, "name": "Malta Airport"}
    })
}

/// A car the API knows nothing about the location of.
pub fn orphan_json() -> Value {
    json!({"id": 44, "model_type": "Kia Picanto", "price": 20})
}

impl Default for FakeApiState {
    fn default() -> Self {
        Self {
            search_calls: AtomicUsize::new(0),
            detail_calls: AtomicUsize::new(0),
            extras_calls: AtomicUsize::new(0),
            book_calls: AtomicUsize::new(0),
            last_search: Mutex::new(None),
            last_extras_query: Mutex::new(None),
            last_booking: Mutex::new(None),
            search_response: Mutex::new((
                200,
                json!({"success": true, "data": {"cars": [panda_json(), duster_json()]}}),
            )),
            booking_response: Mutex::new((
                200,
                json!({"success": true, "reservation_no": "RNR-1001"}),
            )),
        }
    }
}

impl FakeApiState {
    pub fn set_search_response(&self, status: u16, body: Value) {
        *self.search_response.lock().unwrap() = (status, body);
    }

    pub fn set_booking_response(&self, status: u16, body: Value) {
        *self.booking_response.lock().unwrap() = (status, body);
    }

    pub fn last_booking(&self) -> Option<Value> {
        self.last_booking.lock().unwrap().clone()
    }

    pub fn last_search(&self) -> Option<HashMap<String, String>> {
        self.last_search.lock().unwrap().clone()
    }
}

fn respond(status: u16, body: Value) -> HttpResponse {
    let status = actix_web::http::StatusCode::from_u16(status)
        .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status).json(body)
}

async fn fake_search(
    state: web::Data<Arc<FakeApiState>>,
    form: web::Form<HashMap<String, String>>,
) -> impl Responder {
    state.search_calls.fetch_add(1, Ordering::SeqCst);
    *state.last_search.lock().unwrap() = Some(form.into_inner());
    let (status, body) = state.search_response.lock().unwrap().clone();
    respond(status, body)
}

async fn fake_detail(state: web::Data<Arc<FakeApiState>>, path: web::Path<u64>) -> impl Responder {
    state.detail_calls.fetch_add(1, Ordering::SeqCst);
    match path.into_inner() {
        42 => HttpResponse::Ok().json(json!({"success": true, "data": {"car": panda_json()}})),
        43 => HttpResponse::Ok().json(json!({"success": true, "data": duster_json()})),
        44 => HttpResponse::Ok().json(orphan_json()),
        _ => HttpResponse::NotFound().json(json!({"success": false, "message": "Car not found"})),
    }
}

async fn fake_extras(
    state: web::Data<Arc<FakeApiState>>,
    path: web::Path<u64>,
    req: actix_web::HttpRequest,
) -> impl Responder {
    state.extras_calls.fetch_add(1, Ordering::SeqCst);
    *state.last_extras_query.lock().unwrap() = Some(req.query_string().to_string());
    match path.into_inner() {
        43 => HttpResponse::InternalServerError().json(json!({"message": "Extras unavailable"})),
        _ => HttpResponse::Ok().json(json!({
            "success": true,
            "data": {"extras": [
                {"name": "GPS", "fee": "10.00", "quantity": 1},
                {"name": "Child Seat", "fee": 15, "quantity": 1}
            ]}
        })),
    }
}

async fn fake_book(state: web::Data<Arc<FakeApiState>>, body: web::Json<Value>) -> impl Responder {
    state.book_calls.fetch_add(1, Ordering::SeqCst);
    *state.last_booking.lock().unwrap() = Some(body.into_inner());
    let (status, body) = state.booking_response.lock().unwrap().clone();
    respond(status, body)
}

async fn fake_terms() -> impl Responder {
    HttpResponse::Ok().json(json!({"success": true, "data": {"terms": "<p>Drive safely.</p>"}}))
}

async fn fake_privacy() -> impl Responder {
    HttpResponse::Ok().json(json!({"success": true, "data": {"privacy_policy": ""}}))
}

async fn fake_vendor_terms(path: web::Path<u64>) -> impl Responder {
    match path.into_inner() {
        3 => HttpResponse::Ok().json(json!({
            "success": true,
            "data": {
                "vendor": {"id": 3, "first_name": "Island Cars"},
                "rules": {"fuel_policy": "Full to full", "min_age": 21}
            }
        })),
        _ => HttpResponse::NotFound().json(json!({"message": "Vendor not found"})),
    }
}

/// The remote rentals API, served for real on a random local port.
pub struct FakeRentalsApi {
    pub state: Arc<FakeApiState>,
    pub base_url: String,
}

impl FakeRentalsApi {
    pub async fn start() -> Self {
        let state = Arc::new(FakeApiState::default());
        let data = web::Data::new(state.clone());

        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .route("/api/search-car", web::post().to(fake_search))
                .route("/api/get-car-detail/{id}", web::get().to(fake_detail))
                .route("/api/get-car-extras/{id}", web::get().to(fake_extras))
                .route("/api/book-car", web::post().to(fake_book))
                .route("/api/get-terms-conditions", web::get().to(fake_terms))
                .route("/api/get-privacy-policy", web::get().to(fake_privacy))
                .route("/api/get-vendor-terms/{id}", web::get().to(fake_vendor_terms))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("bind fake rentals api");

        let addr = server.addrs()[0];
        actix_rt::spawn(server.run());

        Self {
            state,
            base_url: format!("http://{}", addr),
        }
    }
}

#[derive(Default)]
pub struct FakePaymentGateway {
    pub create_calls: AtomicUsize,
    pub verify_calls: AtomicUsize,
    pub amounts: Mutex<Vec<i64>>,
    pub intents: Mutex<HashMap<String, i64>>,
    pub decline_with: Mutex<Option<String>>,
}

impl FakePaymentGateway {
    pub fn decline(&self, message: &str) {
        *self.decline_with.lock().unwrap() = Some(message.to_string());
    }

    pub fn accept(&self) {
        *self.decline_with.lock().unwrap() = None;
    }
}

#[async_trait]
impl PaymentGateway for FakePaymentGateway {
    async fn create_intent(&self, amount_minor: i64) -> Result<PaymentIntentSecret, BookingError> {
        if amount_minor <= 0 {
            return Err(BookingError::Validation(vec!["amount".to_string()]));
        }
        let n = self.create_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.amounts.lock().unwrap().push(amount_minor);
        let payment_intent_id = format!("pi_test_{}", n);
        self.intents
            .lock()
            .unwrap()
            .insert(payment_intent_id.clone(), amount_minor);
        Ok(PaymentIntentSecret {
            payment_intent_id,
            client_secret: format!("pi_test_{}_secret", n),
        })
    }

    async fn verify(&self, payment_intent_id: &str) -> Result<PaymentConfirmation, BookingError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.decline_with.lock().unwrap().clone() {
            return Err(BookingError::Payment(message));
        }
        let amount_minor = self
            .intents
            .lock()
            .unwrap()
            .get(payment_intent_id)
            .copied()
            .ok_or_else(|| BookingError::Payment(format!("No such payment_intent: '{}'", payment_intent_id)))?;
        Ok(PaymentConfirmation {
            payment_intent_id: payment_intent_id.to_string(),
            amount_minor,
        })
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

#[derive(Default)]
pub struct RecordingEmailDispatcher {
    pub sent: Mutex<Vec<BookingConfirmationEmail>>,
}

impl RecordingEmailDispatcher {
    pub fn sent(&self) -> Vec<BookingConfirmationEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailDispatcher for RecordingEmailDispatcher {
    async fn send_booking_confirmation(&self, email: &BookingConfirmationEmail) -> Result<(), EmailError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

pub struct TestApp {
    pub api: FakeRentalsApi,
    pub gateway: Arc<FakePaymentGateway>,
    pub email: Arc<RecordingEmailDispatcher>,
    pub state: web::Data<AppState>,
}

impl TestApp {
    pub async fn new() -> Self {
        let api = FakeRentalsApi::start().await;
        let gateway = Arc::new(FakePaymentGateway::default());
        let email = Arc::new(RecordingEmailDispatcher::default());

        let config = AppConfig {
            rentals_api_base_url: api.base_url.clone(),
            http_timeout_secs: 5,
            ..AppConfig::default()
        };
        let state = AppState::new(
            config,
            gateway.clone(),
            Some(email.clone() as Arc<dyn EmailDispatcher>),
            PlacesService::new(None, reqwest::Client::new()),
        )
        .expect("app state");

        Self {
            api,
            gateway,
            email,
            state: web::Data::new(state),
        }
    }

    pub fn create_app(&self) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(self.state.clone())
            .configure(routes::configure)
    }
}

/// Search form for Malta Airport, 20 to 23 August 2030.
pub fn malta_form() -> Value {
    json!({
        "pickup": {"name": "Malta Airport", "coordinates": {"lat": 35.85, "lng": 14.49}},
        "same_as_pickup": true,
        "pickup_date": "2030-08-20",
        "dropoff_date": "2030-08-23",
        "country": "MT",
        "driver_age": "26-30"
    })
}

pub fn complete_driver() -> Value {
    json!({
        "first_name": "Maria",
        "last_name": "Borg",
        "date_of_birth": "1990-05-17",
        "phone_number": "+356 2123 4567",
        "email": "maria@example.com",
        "address": "12 Triq il-Kbira",
        "city": "Mosta"
    })
}
