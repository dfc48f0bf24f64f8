//! Basket availability engine
//!
//! Answers two questions for a basket recipe against current stock: how many
//! complete baskets can be assembled right now, and what (and how much)
//! blocks assembling one more.
//!
//! Everything here is pure; callers load the recipe and the stock snapshots
//! and pass them in. A product with no snapshot counts as zero stock.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::round_to;

/// Current stock per product
pub type StockMap = HashMap<Uuid, f64>;

/// One recipe entry as seen by the engine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RecipeLine {
    pub product_id: Uuid,
    /// Quantity of the product in a single basket
    pub required: f64,
}

/// What a product lacks for the next basket
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Shortfall {
    pub product_id: Uuid,
    pub missing: f64,
}

/// Per-item status of a recipe against stock
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ChecklistItem {
    pub product_id: Uuid,
    pub required: f64,
    pub stock: f64,
    /// Consumed by the complete baskets
    pub used_for_full: f64,
    /// Left over after assembling the complete baskets
    pub remaining: f64,
    pub ok_for_next: bool,
    pub missing_for_next: f64,
}

/// Full analysis of a basket recipe
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BasketAnalysis {
    /// Complete baskets that can be assembled now
    pub complete: u64,
    /// Products short for the next basket, in recipe order
    pub shortfalls: Vec<Shortfall>,
    pub checklist: Vec<ChecklistItem>,
}

impl BasketAnalysis {
    /// The product blocking the next basket: largest shortfall, first one on ties
    pub fn limiting(&self) -> Option<Shortfall> {
        let mut limiting: Option<Shortfall> = None;
        for shortfall in &self.shortfalls {
            let current = limiting.map(|l| l.missing).unwrap_or(0.0);
            if shortfall.missing > current {
                limiting = Some(*shortfall);
            }
        }
        limiting
    }
}

/// Dashboard view of a basket type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BasketSummary {
    pub complete: u64,
    /// Name of the limiting product, `-` when none
    pub limiting_product: String,
    /// Shortfall of the limiting product, rounded to 2 decimals
    pub missing_for_next: f64,
}

/// Complete baskets plus the product with the smallest stock/required ratio
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Mountable {
    pub count: u64,
    pub limiting_product_id: Option<Uuid>,
}

/// Placeholder shown when there is no limiting product
pub const NO_PRODUCT: &str = "-";

fn stock_of(stock: &StockMap, product_id: &Uuid) -> f64 {
    stock.get(product_id).copied().unwrap_or(0.0)
}

/// Number of complete baskets: floor of the smallest stock/required ratio.
///
/// Lines with a non-positive required quantity are left out of the ratio set;
/// an empty ratio set yields 0. Negative stock clamps to 0.
pub fn complete_baskets(recipe: &[RecipeLine], stock: &StockMap) -> u64 {
    let min_ratio = recipe
        .iter()
        .filter(|line| line.required > 0.0)
        .map(|line| stock_of(stock, &line.product_id) / line.required)
        .fold(None, |min: Option<f64>, ratio| match min {
            Some(m) if m <= ratio => Some(m),
            _ => Some(ratio),
        });

    match min_ratio {
        Some(ratio) if ratio.is_finite() && ratio > 0.0 => ratio.floor() as u64,
        _ => 0,
    }
}

/// Analyse a recipe: complete baskets, shortfalls for one more, and a checklist
pub fn analyze(recipe: &[RecipeLine], stock: &StockMap) -> BasketAnalysis {
    if recipe.is_empty() {
        return BasketAnalysis::default();
    }

    let complete = complete_baskets(recipe, stock);
    let mut shortfalls = Vec::new();
    let mut checklist = Vec::with_capacity(recipe.len());

    for line in recipe {
        let on_hand = stock_of(stock, &line.product_id);
        let used = complete as f64 * line.required;
        let remaining = on_hand - used;

        if remaining < line.required {
            shortfalls.push(Shortfall {
                product_id: line.product_id,
                missing: line.required - remaining,
            });
        }

        checklist.push(ChecklistItem {
            product_id: line.product_id,
            required: line.required,
            stock: on_hand,
            used_for_full: used,
            remaining,
            ok_for_next: remaining >= line.required,
            missing_for_next: (line.required - remaining).max(0.0),
        });
    }

    BasketAnalysis {
        complete,
        shortfalls,
        checklist,
    }
}

/// Summarise a recipe for the dashboard, resolving the limiting product name
pub fn summarize<F>(recipe: &[RecipeLine], stock: &StockMap, product_name: F) -> BasketSummary
where
    F: Fn(&Uuid) -> Option<String>,
{
    let analysis = analyze(recipe, stock);
    match analysis.limiting() {
        Some(limiting) => BasketSummary {
            complete: analysis.complete,
            limiting_product: product_name(&limiting.product_id)
                .unwrap_or_else(|| NO_PRODUCT.to_string()),
            missing_for_next: round_to(limiting.missing, 2),
        },
        None => BasketSummary {
            complete: analysis.complete,
            limiting_product: NO_PRODUCT.to_string(),
            missing_for_next: 0.0,
        },
    }
}

/// Complete baskets and the product with the smallest ratio (first on ties)
pub fn mountable(recipe: &[RecipeLine], stock: &StockMap) -> Mountable {
    let mut limiting: Option<(Uuid, f64)> = None;
    for line in recipe.iter().filter(|line| line.required > 0.0) {
        let ratio = stock_of(stock, &line.product_id) / line.required;
        match limiting {
            Some((_, smallest)) if ratio >= smallest => {}
            _ => limiting = Some((line.product_id, ratio)),
        }
    }

    Mountable {
        count: complete_baskets(recipe, stock),
        limiting_product_id: limiting.map(|(id, _)| id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: Uuid, required: f64) -> RecipeLine {
        RecipeLine {
            product_id,
            required,
        }
    }

    #[test]
    fn test_rice_and_beans() {
        let rice = Uuid::new_v4();
        let beans = Uuid::new_v4();
        let recipe = vec![line(rice, 2.0), line(beans, 1.0)];
        let stock = StockMap::from([(rice, 5.0), (beans, 3.0)]);

        let analysis = analyze(&recipe, &stock);
        assert_eq!(analysis.complete, 2);
        assert_eq!(
            analysis.shortfalls,
            vec![Shortfall {
                product_id: rice,
                missing: 1.0
            }]
        );
        assert_eq!(analysis.limiting().map(|l| l.product_id), Some(rice));

        let beans_item = analysis.checklist[1];
        assert_eq!(beans_item.used_for_full, 2.0);
        assert_eq!(beans_item.remaining, 1.0);
        assert!(beans_item.ok_for_next);
        assert_eq!(beans_item.missing_for_next, 0.0);
    }

    #[test]
    fn test_empty_recipe() {
        let analysis = analyze(&[], &StockMap::new());
        assert_eq!(analysis.complete, 0);
        assert!(analysis.shortfalls.is_empty());
        assert!(analysis.checklist.is_empty());
        assert!(analysis.limiting().is_none());

        let summary = summarize(&[], &StockMap::new(), |_| None);
        assert_eq!(summary.limiting_product, NO_PRODUCT);
        assert_eq!(summary.missing_for_next, 0.0);

        assert_eq!(mountable(&[], &StockMap::new()).limiting_product_id, None);
    }

    #[test]
    fn test_zero_required_only() {
        let sugar = Uuid::new_v4();
        let stock = StockMap::from([(sugar, 10.0)]);
        assert_eq!(complete_baskets(&[line(sugar, 0.0)], &stock), 0);
        assert_eq!(mountable(&[line(sugar, 0.0)], &stock).limiting_product_id, None);
    }

    #[test]
    fn test_missing_snapshot_counts_as_zero() {
        let oil = Uuid::new_v4();
        let analysis = analyze(&[line(oil, 1.0)], &StockMap::new());
        assert_eq!(analysis.complete, 0);
        assert_eq!(analysis.checklist[0].stock, 0.0);
        assert_eq!(analysis.checklist[0].missing_for_next, 1.0);
    }

    #[test]
    fn test_negative_stock_clamps_to_zero() {
        let flour = Uuid::new_v4();
        let stock = StockMap::from([(flour, -4.0)]);
        let analysis = analyze(&[line(flour, 2.0)], &stock);
        assert_eq!(analysis.complete, 0);
        assert_eq!(analysis.shortfalls[0].missing, 6.0);
    }

    #[test]
    fn test_limiting_tie_keeps_first() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let recipe = vec![line(a, 1.0), line(b, 1.0)];
        let stock = StockMap::from([(a, 0.0), (b, 0.0)]);
        assert_eq!(analyze(&recipe, &stock).limiting().map(|l| l.product_id), Some(a));
        assert_eq!(mountable(&recipe, &stock).limiting_product_id, Some(a));
    }

    #[test]
    fn test_summary_rounds_and_names() {
        let milk = Uuid::new_v4();
        let recipe = vec![line(milk, 1.0 / 3.0)];
        let stock = StockMap::from([(milk, 0.0)]);
        let summary = summarize(&recipe, &stock, |id| {
            (*id == milk).then(|| "Leite".to_string())
        });
        assert_eq!(summary.complete, 0);
        assert_eq!(summary.limiting_product, "Leite");
        assert_eq!(summary.missing_for_next, 0.33);
    }

    #[test]
    fn test_mountable_smallest_ratio() {
        let rice = Uuid::new_v4();
        let beans = Uuid::new_v4();
        let recipe = vec![line(rice, 2.0), line(beans, 1.0)];
        let stock = StockMap::from([(rice, 10.0), (beans, 3.0)]);
        let result = mountable(&recipe, &stock);
        assert_eq!(result.count, 3);
        assert_eq!(result.limiting_product_id, Some(beans));
    }
}
