mod common;

use actix_web::test;
use serde_json::{json, Value};
use serial_test::serial;
use std::sync::atomic::Ordering;

use common::{malta_form, TestApp};

#[actix_rt::test]
#[serial]
async fn test_invalid_search_never_reaches_upstream() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let mut form = malta_form();
    form["pickup"]["coordinates"] = Value::Null;
    form["dropoff_date"] = Value::Null;

    let req = test::TestRequest::post()
        .uri("/api/search")
        .set_json(&json!({ "form": form }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["fields"], json!(["pickup_location", "dropoff_date"]));
    assert_eq!(test_app.api.state.search_calls.load(Ordering::SeqCst), 0);
}

#[actix_rt::test]
#[serial]
async fn test_valid_search_issues_exactly_one_request() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/search")
        .set_json(&json!({ "form": malta_form() }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["offers"][0]["model"], "Fiat Panda");
    assert_eq!(body["offers"][0]["price"], json!(29.75));
    assert_eq!(body["offers"][0]["supplier"], "Island Cars");
    assert_eq!(body["criteria"]["rental_days"], 3);
    assert_eq!(body["retryable"], false);
    assert_eq!(test_app.api.state.search_calls.load(Ordering::SeqCst), 1);

    let sent = test_app.api.state.last_search().unwrap();
    assert_eq!(sent["pickup_location"], r#"{"lat":35.85,"lng":14.49}"#);
    assert_eq!(sent["dropoff_location"], sent["pickup_location"]);
    assert_eq!(sent["pickup_date"], "Tue, Aug 20, 2030 10:00");
    assert_eq!(sent["dropoff_date"], "Fri, Aug 23, 2030 10:00");
    assert_eq!(sent["country"], "MT");
    assert_eq!(sent["driver_age"], "26-30");
}

#[actix_rt::test]
#[serial]
async fn test_repeated_search_is_not_cached() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/search")
            .set_json(&json!({ "form": malta_form() }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }
    assert_eq!(test_app.api.state.search_calls.load(Ordering::SeqCst), 2);
}

#[actix_rt::test]
#[serial]
async fn test_upstream_failure_degrades_to_empty_results() {
    let test_app = TestApp::new().await;
    test_app
        .api
        .state
        .set_search_response(500, json!({"message": "Search service down"}));
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/search")
        .set_json(&json!({ "form": malta_form() }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["offers"], json!([]));
    assert_eq!(body["error"], "Search service down");
    assert_eq!(body["retryable"], true);
}

#[actix_rt::test]
#[serial]
async fn test_missing_cars_is_an_empty_success() {
    let test_app = TestApp::new().await;
    test_app
        .api
        .state
        .set_search_response(200, json!({"success": true, "data": {}}));
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/search")
        .set_json(&json!({ "form": malta_form() }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["offers"], json!([]));
    assert!(body.get("error").is_none());
}

#[actix_rt::test]
#[serial]
async fn test_search_applies_facets_after_fetch() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/search")
        .set_json(&json!({
            "form": malta_form(),
            "facets": {"deposit": ["€ 501 - € 1,000"]}
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["offers"].as_array().unwrap().len(), 1);
    assert_eq!(body["offers"][0]["id"], 42);
}

#[actix_rt::test]
#[serial]
async fn test_filter_endpoint() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/search")
        .set_json(&json!({ "form": malta_form() }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let offers = body["offers"].clone();

    let req = test::TestRequest::post()
        .uri("/api/offers/filter")
        .set_json(&json!({ "offers": offers, "facets": {} }))
        .to_request();
    let unfiltered: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(unfiltered, offers);

    let req = test::TestRequest::post()
        .uri("/api/offers/filter")
        .set_json(&json!({
            "offers": offers,
            "facets": {"transmission": ["Manual"], "companies": ["Gozo Rent"]}
        }))
        .to_request();
    let filtered: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(filtered.as_array().unwrap().len(), 1);
    assert_eq!(filtered[0]["model"], "Dacia Duster");
    assert_eq!(test_app.api.state.search_calls.load(Ordering::SeqCst), 1);
}

#[actix_rt::test]
#[serial]
async fn test_search_options() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/api/search/options").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["deposits"][4], "€ 2,000 +");
    assert_eq!(body["transmissions"][0], "All");
    assert_eq!(body["countries"][0]["code"], "PK");
}
