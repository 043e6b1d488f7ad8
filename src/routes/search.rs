use actix_web::{web, HttpResponse, Responder};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::models::offer::Offer;
use crate::models::search::{SearchCriteria, SearchForm};
use crate::services::input_normalizer::{normalize, AGE_BRACKETS, SUPPORTED_COUNTRIES};
use crate::services::offer_filter::{
    filter_offers, DepositBracket, FacetSelection, ALL_TRANSMISSIONS, CAR_TYPES, PASSENGER_OPTIONS,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchInput {
    pub form: SearchForm,
    #[serde(default)]
    pub facets: FacetSelection,
}

#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub criteria: SearchCriteria,
    pub offers: Vec<Offer>,
    /// Offers returned upstream, before facets.
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub retryable: bool,
}

/// Validate, then issue exactly one upstream search. Upstream failures come
/// back as an empty result with an error message the client can retry on.
pub async fn search(state: web::Data<AppState>, input: web::Json<SearchInput>) -> impl Responder {
    let input = input.into_inner();

    let criteria = match normalize(&input.form, state.today()) {
        Ok(criteria) => criteria,
        Err(e) => {
            warn!("Search rejected: {}", e);
            return e.to_response();
        }
    };

    match state.api.search_cars(&criteria).await {
        Ok(offers) => {
            let total = offers.len();
            let offers = filter_offers(&offers, &input.facets);
            info!("Search matched {} of {} offers", offers.len(), total);
            HttpResponse::Ok().json(SearchOutput {
                criteria,
                offers,
                total,
                error: None,
                retryable: false,
            })
        }
        Err(e) => {
            error!("Error fetching search results: {}", e);
            HttpResponse::Ok().json(SearchOutput {
                criteria,
                offers: Vec::new(),
                total: 0,
                error: Some(e.user_message()),
                retryable: true,
            })
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FilterInput {
    pub offers: Vec<Offer>,
    #[serde(default)]
    pub facets: FacetSelection,
}

pub async fn filter(input: web::Json<FilterInput>) -> impl Responder {
    let input = input.into_inner();
    HttpResponse::Ok().json(filter_offers(&input.offers, &input.facets))
}

#[derive(Debug, Serialize)]
struct FacetOptions {
    car_types: &'static [&'static str],
    passengers: &'static [&'static str],
    transmissions: [&'static str; 3],
    deposits: Vec<&'static str>,
    countries: Vec<CountryOption>,
    age_brackets: &'static [&'static str],
}

#[derive(Debug, Serialize)]
struct CountryOption {
    code: &'static str,
    name: &'static str,
}

/// Option lists for the search form and the filter sidebar.
pub async fn options() -> impl Responder {
    HttpResponse::Ok().json(FacetOptions {
        car_types: CAR_TYPES,
        passengers: PASSENGER_OPTIONS,
        transmissions: [ALL_TRANSMISSIONS, "Automatic", "Manual"],
        deposits: DepositBracket::ALL.iter().map(|b| b.label()).collect(),
        countries: SUPPORTED_COUNTRIES
            .iter()
            .map(|&(code, name)| CountryOption { code, name })
            .collect(),
        age_brackets: AGE_BRACKETS,
    })
}
