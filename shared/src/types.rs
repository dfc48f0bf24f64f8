//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Unit of measure for a product
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum MeasureUnit {
    #[default]
    Unit,
    Kg,
    Liter,
    Package,
    Box,
    Sack,
}

impl MeasureUnit {
    pub const ALL: [MeasureUnit; 6] = [
        MeasureUnit::Unit,
        MeasureUnit::Kg,
        MeasureUnit::Liter,
        MeasureUnit::Package,
        MeasureUnit::Box,
        MeasureUnit::Sack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MeasureUnit::Unit => "unit",
            MeasureUnit::Kg => "kg",
            MeasureUnit::Liter => "liter",
            MeasureUnit::Package => "package",
            MeasureUnit::Box => "box",
            MeasureUnit::Sack => "sack",
        }
    }
}

impl std::fmt::Display for MeasureUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of stock movement recorded in the ledger
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Donations and purchases coming in
    #[default]
    Inbound,
    Adjustment,
    Correction,
    /// Stock consumed by assembling baskets
    BasketOutflow,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Inbound => "inbound",
            MovementKind::Adjustment => "adjustment",
            MovementKind::Correction => "correction",
            MovementKind::BasketOutflow => "basket_outflow",
        }
    }
}

impl std::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Date range for queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: chrono::NaiveDate,
    pub end: chrono::NaiveDate,
}

impl DateRange {
    /// Both ends are inclusive
    pub fn contains(&self, date: chrono::NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// From `days` days before `today` through `today`, both inclusive
    /// (`days + 1` calendar dates)
    pub fn last_days(today: chrono::NaiveDate, days: i64) -> Self {
        Self {
            start: today - chrono::Duration::days(days),
            end: today,
        }
    }
}

/// Case-insensitive substring search over several fields.
///
/// A blank needle matches everything.
pub fn text_matches(fields: &[&str], needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    fields.iter().any(|f| f.to_lowercase().contains(&needle))
}

/// Round a quantity for display
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_text_matches() {
        assert!(text_matches(&["Maria Silva", "11999998888"], "maria"));
        assert!(text_matches(&["Maria Silva", "11999998888"], "9999"));
        assert!(text_matches(&["Maria Silva"], "   "));
        assert!(!text_matches(&["Maria Silva", "11999998888"], "joao"));
    }

    #[test]
    fn test_date_range_inclusive() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let range = DateRange::last_days(today, 30);
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert!(range.contains(range.start));
        assert!(range.contains(today));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()));
        assert_eq!((range.end - range.start).num_days() + 1, 31);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.005_1, 2), 1.01);
        assert_eq!(round_to(0.333_333, 2), 0.33);
        assert_eq!(round_to(2.0, 2), 2.0);
    }

    #[test]
    fn test_movement_kind_serialization() {
        let json = serde_json::to_string(&MovementKind::BasketOutflow).unwrap();
        assert_eq!(json, "\"basket_outflow\"");
        for kind in [
            MovementKind::Inbound,
            MovementKind::Adjustment,
            MovementKind::Correction,
            MovementKind::BasketOutflow,
        ] {
            assert_eq!(serde_json::to_string(&kind).unwrap(), format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_measure_units() {
        assert_eq!(MeasureUnit::ALL.len(), 6);
        assert_eq!(MeasureUnit::default(), MeasureUnit::Unit);
        let parsed: MeasureUnit = serde_json::from_str("\"sack\"").unwrap();
        assert_eq!(parsed, MeasureUnit::Sack);
    }
}
