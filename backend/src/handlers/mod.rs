//! HTTP handlers

pub mod auth;
pub mod basket;
pub mod dashboard;
pub mod delivery;
pub mod family;
pub mod health;
pub mod organization;
pub mod product;
pub mod reporting;
pub mod stock;

pub use auth::*;
pub use basket::*;
pub use dashboard::*;
pub use delivery::*;
pub use family::*;
pub use health::*;
pub use organization::*;
pub use product::*;
pub use reporting::*;
pub use stock::*;
