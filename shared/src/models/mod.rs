//! Domain models for the Basket Stock platform

mod basket;
mod delivery;
mod family;
mod organization;
mod product;
mod stock;

pub use basket::*;
pub use delivery::*;
pub use family::*;
pub use organization::*;
pub use product::*;
pub use stock::*;

/// Trim a required text field
pub(crate) fn trimmed(value: &str) -> String {
    value.trim().to_string()
}

/// Trim an optional text field, dropping it when blank
pub(crate) fn trimmed_opt(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
