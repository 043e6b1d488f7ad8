use actix_web::{web, HttpResponse, Responder};
use log::error;
use serde::Serialize;

use crate::errors::BookingError;
use crate::models::content::{
    LegalDocument, VendorTerms, NO_PRIVACY_POLICY, NO_TERMS, PRIVACY_FAILED, TERMS_FAILED,
    VENDOR_TERMS_FAILED,
};
use crate::state::AppState;

fn document(result: Result<Option<String>, BookingError>, empty: &str, failed: &str) -> LegalDocument {
    match result {
        Ok(Some(content)) => LegalDocument {
            content,
            loaded: true,
        },
        Ok(None) => LegalDocument {
            content: empty.to_string(),
            loaded: true,
        },
        Err(e) => {
            error!("{} ({})", failed, e);
            LegalDocument {
                content: failed.to_string(),
                loaded: false,
            }
        }
    }
}

/// Always 200: the modal shows either the document or a fallback line.
pub async fn terms(state: web::Data<AppState>) -> impl Responder {
    let result = state.api.terms_and_conditions().await;
    HttpResponse::Ok().json(document(result, NO_TERMS, TERMS_FAILED))
}

pub async fn privacy(state: web::Data<AppState>) -> impl Responder {
    let result = state.api.privacy_policy().await;
    HttpResponse::Ok().json(document(result, NO_PRIVACY_POLICY, PRIVACY_FAILED))
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum VendorTermsOutput {
    Loaded(VendorTerms),
    Failed { error: &'static str },
}

pub async fn vendor_terms(state: web::Data<AppState>, path: web::Path<u64>) -> impl Responder {
    let vendor_id = path.into_inner();
    match state.api.vendor_terms(vendor_id).await {
        Ok(terms) => HttpResponse::Ok().json(VendorTermsOutput::Loaded(terms)),
        Err(e) => {
            error!("Vendor terms for {} failed: {}", vendor_id, e);
            HttpResponse::Ok().json(VendorTermsOutput::Failed {
                error: VENDOR_TERMS_FAILED,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_fallbacks() {
        let doc = document(Ok(None), NO_TERMS, TERMS_FAILED);
        assert_eq!(doc.content, "No terms found.");

        let doc = document(
            Err(BookingError::Network("Request timed out".to_string())),
            NO_TERMS,
            TERMS_FAILED,
        );
        assert_eq!(doc.content, "Failed to load terms & conditions.");
        assert!(!doc.loaded);

        let doc = document(Ok(Some("<p>Terms</p>".to_string())), NO_TERMS, TERMS_FAILED);
        assert!(doc.loaded);
    }
}
