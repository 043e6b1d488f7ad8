pub mod booking_service;
pub mod booking_wizard;
pub mod email_service;
pub mod input_normalizer;
pub mod offer_filter;
pub mod payment;
pub mod places_service;
pub mod pricing_service;
pub mod rentals_api;
pub mod session_store;
pub mod stripe;
