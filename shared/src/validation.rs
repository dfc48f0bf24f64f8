//! Validation utilities for Basket Stock
//!
//! The `validate_*` functions taking `&str` plug into `#[validate(custom = ...)]`
//! on the input models; the quantity checks are called directly by services.

use std::borrow::Cow;

use validator::ValidationError;

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

// ============================================================================
// Field Validations
// ============================================================================

/// Required text field: rejects empty or whitespace-only values
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("blank", "Field is required"));
    }
    Ok(())
}

/// Phone number as typed by staff, e.g. `11999998888` or `(11) 99999-8888`
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    validate_not_blank(phone)?;

    let allowed = |c: char| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')');
    if !phone.trim().chars().all(allowed) {
        return Err(error("phone", "Phone may only contain digits, spaces and + - ( )"));
    }

    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if !(8..=15).contains(&digits) {
        return Err(error("phone", "Phone must have between 8 and 15 digits"));
    }
    Ok(())
}

// ============================================================================
// Quantity Validations
// ============================================================================

/// Required quantity of a product per basket
pub fn validate_required_quantity(quantity: f64) -> Result<(), &'static str> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err("Required quantity must be greater than zero");
    }
    Ok(())
}

/// Stock entry delta; negative values are adjustments out
pub fn validate_stock_delta(quantity: f64) -> Result<(), &'static str> {
    if !quantity.is_finite() {
        return Err("Quantity must be a finite number");
    }
    if quantity == 0.0 {
        return Err("Quantity must be different from zero");
    }
    Ok(())
}

/// Number of baskets delivered or checked out
pub fn validate_basket_count(count: i32) -> Result<(), &'static str> {
    if count < 1 {
        return Err("Basket count must be at least 1");
    }
    Ok(())
}
