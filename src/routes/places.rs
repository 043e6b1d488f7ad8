use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    #[serde(default)]
    pub input: String,
}

pub async fn resolve(state: web::Data<AppState>, query: web::Query<ResolveQuery>) -> impl Responder {
    match state.places.resolve(&query.input).await {
        Ok(location) => HttpResponse::Ok().json(location),
        Err(e) => e.to_response(),
    }
}
