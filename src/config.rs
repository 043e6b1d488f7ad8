use std::time::Duration;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 5000;
const RENTALS_API_BASE_URL: &str = "https://api.rentnrides.com";
const HTTP_TIMEOUT_SECS: u64 = 15;
const PAYMENT_CURRENCY: &str = "eur";
const SESSION_TTL_SECS: u64 = 2 * 60 * 60;

#[derive(Debug, Clone, PartialEq)]
pub struct EmailJsConfig {
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
    /// Optional access token for accounts that enforce private-key calls.
    pub private_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub rentals_api_base_url: String,
    pub http_timeout_secs: u64,
    /// Idle time after which a booking session is forgotten.
    pub session_ttl_secs: u64,
    pub stripe_secret_key: Option<String>,
    pub payment_currency: String,
    pub emailjs: Option<EmailJsConfig>,
    pub google_maps_api_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: HOST.to_string(),
            port: PORT,
            rentals_api_base_url: RENTALS_API_BASE_URL.to_string(),
            http_timeout_secs: HTTP_TIMEOUT_SECS,
            session_ttl_secs: SESSION_TTL_SECS,
            stripe_secret_key: None,
            payment_currency: PAYMENT_CURRENCY.to_string(),
            emailjs: None,
            google_maps_api_key: None,
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let emailjs = match (
            non_empty("EMAILJS_SERVICE_ID"),
            non_empty("EMAILJS_TEMPLATE_ID"),
            non_empty("EMAILJS_PUBLIC_KEY"),
        ) {
            (Some(service_id), Some(template_id), Some(public_key)) => Some(EmailJsConfig {
                service_id,
                template_id,
                public_key,
                private_key: non_empty("EMAILJS_PRIVATE_KEY"),
            }),
            _ => None,
        };

        Self {
            host: non_empty("HOST").unwrap_or(defaults.host),
            port: non_empty("PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            rentals_api_base_url: non_empty("RENTALS_API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.rentals_api_base_url),
            http_timeout_secs: non_empty("HTTP_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.http_timeout_secs),
            session_ttl_secs: non_empty("SESSION_TTL_SECS")
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.session_ttl_secs),
            stripe_secret_key: non_empty("STRIPE_SECRET_KEY"),
            payment_currency: non_empty("PAYMENT_CURRENCY")
                .map(|c| c.to_lowercase())
                .unwrap_or(defaults.payment_currency),
            emailjs,
            google_maps_api_key: non_empty("GOOGLE_MAPS_API_KEY"),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}
