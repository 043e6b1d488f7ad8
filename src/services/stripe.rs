pub mod provider;

pub use provider::StripeGateway;
