mod common;

use actix_web::test;
use serde_json::{json, Value};
use serial_test::serial;
use std::sync::atomic::Ordering;

use common::TestApp;

#[actix_rt::test]
#[serial]
async fn test_create_payment_intent_returns_client_secret() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/create-payment-intent")
        .set_json(&json!({ "amount": 1000 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["clientSecret"], "pi_test_1_secret");
    assert_eq!(*test_app.gateway.amounts.lock().unwrap(), vec![1000]);
}

#[actix_rt::test]
#[serial]
async fn test_create_payment_intent_rejected_by_gateway() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/create-payment-intent")
        .set_json(&json!({ "amount": 0 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 500);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("amount"));
    assert_eq!(test_app.gateway.create_calls.load(Ordering::SeqCst), 0);
}

#[actix_rt::test]
#[serial]
async fn test_create_payment_intent_requires_amount() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/create-payment-intent")
        .set_json(&json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}
