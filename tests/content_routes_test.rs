mod common;

use actix_web::test;
use serde_json::Value;
use serial_test::serial;

use common::TestApp;

#[actix_rt::test]
#[serial]
async fn test_terms_and_privacy() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/api/content/terms").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["content"], "<p>Drive safely.</p>");
    assert_eq!(body["loaded"], true);

    let req = test::TestRequest::get().uri("/api/content/privacy").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["content"], "No privacy policy found.");
    assert_eq!(body["loaded"], true);
}

#[actix_rt::test]
#[serial]
async fn test_vendor_terms() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/content/vendor-terms/3")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["rules"]["fuel_policy"], "Full to full");
    assert_eq!(body["vendor"]["first_name"], "Island Cars");

    let req = test::TestRequest::get()
        .uri("/api/content/vendor-terms/99")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Failed to load supplier rental terms.");
}

#[actix_rt::test]
#[serial]
async fn test_health_reports_unconfigured_integrations() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["services"]["rentals_api"]["status"], "ok");
    assert_eq!(body["services"]["stripe"]["status"], "error");
    assert_eq!(body["services"]["google_maps"]["status"], "error");
}

#[actix_rt::test]
#[serial]
async fn test_place_lookup_without_key() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/places/resolve?input=Valletta")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 503);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "configuration_error");

    let req = test::TestRequest::get()
        .uri("/api/places/resolve?input=")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}
