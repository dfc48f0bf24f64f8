//! Shared types and models for the Basket Stock platform
//!
//! This crate contains the domain models and the pure computations (basket
//! availability, delivery planning, validation) shared between the backend,
//! the browser front-end (via WASM), and the tests.

pub mod availability;
pub mod delivery;
pub mod models;
pub mod types;
pub mod validation;

pub use availability::*;
pub use delivery::*;
pub use models::*;
pub use types::*;
pub use validation::*;
