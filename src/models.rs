pub mod booking;
pub mod content;
pub mod driver;
pub mod extras;
pub mod offer;
pub mod payment;
pub mod search;
