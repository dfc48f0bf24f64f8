//! Input validation tests

use proptest::prelude::*;
use shared::{
    validate_basket_count, validate_not_blank, validate_phone, validate_required_quantity,
    validate_stock_delta,
};

/// Brazilian mobile numbers in a few common layouts
fn phone_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[1-9]{2}9[0-9]{8}",
        "\\([1-9]{2}\\) 9[0-9]{4}-[0-9]{4}",
        "\\+55 [1-9]{2} 9[0-9]{8}",
    ]
}

proptest! {
    #[test]
    fn prop_formatted_phones_accepted(phone in phone_strategy()) {
        prop_assert!(validate_phone(&phone).is_ok());
    }

    #[test]
    fn prop_phones_with_letters_rejected(phone in "[0-9]{5}[a-z]{1,3}[0-9]{5}") {
        prop_assert!(validate_phone(&phone).is_err());
    }

    #[test]
    fn prop_positive_quantities_accepted(q in 0.001f64..10_000.0) {
        prop_assert!(validate_required_quantity(q).is_ok());
        prop_assert!(validate_stock_delta(q).is_ok());
        prop_assert!(validate_stock_delta(-q).is_ok());
    }

    #[test]
    fn prop_basket_count_must_be_positive(n in -100i32..=0) {
        prop_assert!(validate_basket_count(n).is_err());
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_blank_text_rejected() {
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("Arroz").is_ok());
    }

    #[test]
    fn test_zero_quantities_rejected() {
        assert!(validate_required_quantity(0.0).is_err());
        assert!(validate_required_quantity(-1.0).is_err());
        assert!(validate_required_quantity(f64::NAN).is_err());
        assert!(validate_stock_delta(0.0).is_err());
    }

    #[test]
    fn test_short_phone_rejected() {
        assert!(validate_phone("1234").is_err());
        assert!(validate_phone("").is_err());
    }
}
