pub mod interface;

pub use interface::PaymentGateway;
