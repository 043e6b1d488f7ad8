use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const NO_TERMS: &str = "No terms found.";
pub const TERMS_FAILED: &str = "Failed to load terms & conditions.";
pub const NO_PRIVACY_POLICY: &str = "No privacy policy found.";
pub const PRIVACY_FAILED: &str = "Failed to load privacy policy.";
pub const VENDOR_TERMS_FAILED: &str = "Failed to load supplier rental terms.";

/// Supplier-specific rental rules, separate from the platform terms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VendorTerms {
    #[serde(default)]
    pub vendor: Value,
    #[serde(default)]
    pub rules: Map<String, Value>,
}

/// HTML document shown in the terms / privacy modals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegalDocument {
    pub content: String,
    pub loaded: bool,
}
