//! WebAssembly module for Basket Stock
//!
//! Lets the browser recompute availability while staff edit a recipe or a
//! custom delivery, without a round trip. Inputs and outputs are JSON:
//! - recipe: `[{ "product_id": "...", "required": 2.0 }, ...]`
//! - stock: `{ "<product_id>": 7.0, ... }`
//! - names: `{ "<product_id>": "Arroz", ... }`

use std::collections::HashMap;

use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::availability::*;
pub use shared::delivery::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("basket-stock-wasm loaded"));
}

fn js_error(message: String) -> JsValue {
    js_sys::Error::new(&message).into()
}

fn parse<T: DeserializeOwned>(json: &str, what: &str) -> Result<T, JsValue> {
    serde_json::from_str(json).map_err(|e| js_error(format!("Invalid {} JSON: {}", what, e)))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| js_error(format!("Serialization failed: {}", e)))
}

/// Complete baskets, shortfalls and checklist
#[wasm_bindgen]
pub fn analyze_basket(recipe_json: &str, stock_json: &str) -> Result<String, JsValue> {
    let recipe: Vec<RecipeLine> = parse(recipe_json, "recipe")?;
    let stock: StockMap = parse(stock_json, "stock")?;
    to_json(&analyze(&recipe, &stock))
}

/// Complete baskets, limiting product name and what it is missing
#[wasm_bindgen]
pub fn basket_summary(recipe_json: &str, stock_json: &str, names_json: &str) -> Result<String, JsValue> {
    let recipe: Vec<RecipeLine> = parse(recipe_json, "recipe")?;
    let stock: StockMap = parse(stock_json, "stock")?;
    let names: HashMap<Uuid, String> = parse(names_json, "names")?;
    to_json(&summarize(&recipe, &stock, |id| names.get(id).cloned()))
}

/// Number of complete baskets only
#[wasm_bindgen]
pub fn count_complete_baskets(recipe_json: &str, stock_json: &str) -> Result<u32, JsValue> {
    let recipe: Vec<RecipeLine> = parse(recipe_json, "recipe")?;
    let stock: StockMap = parse(stock_json, "stock")?;
    Ok(u32::try_from(complete_baskets(&recipe, &stock)).unwrap_or(u32::MAX))
}

/// Per-product quantities a delivery of `baskets` baskets would remove
#[wasm_bindgen]
pub fn plan_delivery(recipe_json: &str, baskets: i32) -> Result<String, JsValue> {
    validate_basket_count(baskets).map_err(|msg| js_error(msg.to_string()))?;
    let recipe: Vec<RecipeLine> = parse(recipe_json, "recipe")?;
    to_json(&plan_recipe_delivery(&recipe, baskets))
}

/// Custom delivery lines after merging duplicates and dropping zeros
#[wasm_bindgen]
pub fn plan_custom(entries_json: &str) -> Result<String, JsValue> {
    let entries: Vec<DeliveryLine> = parse(entries_json, "entries")?;
    to_json(&plan_custom_delivery(&entries))
}

/// Phone check used by the family and organisation forms
#[wasm_bindgen]
pub fn is_valid_phone(phone: &str) -> bool {
    validate_phone(phone).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RICE: &str = "6f1c2b52-8d7e-4a55-9f61-3a2b1c0d9e8f";
    const BEANS: &str = "0b7e4a1d-2c3f-4e5a-8b9c-1d2e3f4a5b6c";

    fn recipe() -> String {
        format!(
            r#"[{{"product_id":"{RICE}","required":2.0}},{{"product_id":"{BEANS}","required":1.0}}]"#
        )
    }

    fn stock() -> String {
        format!(r#"{{"{RICE}":7.0,"{BEANS}":5.0}}"#)
    }

    #[test]
    fn test_summary_names_limiting_product() {
        let names = format!(r#"{{"{RICE}":"Arroz","{BEANS}":"Feijão"}}"#);
        let json = basket_summary(&recipe(), &stock(), &names).unwrap();
        let summary: BasketSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(summary.complete, 3);
        assert_eq!(summary.limiting_product, "Arroz");
        assert_eq!(summary.missing_for_next, 1.0);
    }

    #[test]
    fn test_count_and_analysis_agree() {
        assert_eq!(count_complete_baskets(&recipe(), &stock()).unwrap(), 3);
        let analysis: BasketAnalysis =
            serde_json::from_str(&analyze_basket(&recipe(), &stock()).unwrap()).unwrap();
        assert_eq!(analysis.complete, 3);
        assert_eq!(analysis.checklist.len(), 2);
    }

    #[test]
    fn test_plan_delivery_scales_recipe() {
        let lines: Vec<DeliveryLine> =
            serde_json::from_str(&plan_delivery(&recipe(), 2).unwrap()).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].quantity, 4.0);
        assert_eq!(lines[1].quantity, 2.0);
    }

    #[test]
    fn test_plan_custom_drops_zero() {
        let entries = format!(
            r#"[{{"product_id":"{RICE}","quantity":1.5}},{{"product_id":"{BEANS}","quantity":0}}]"#
        );
        let lines: Vec<DeliveryLine> =
            serde_json::from_str(&plan_custom(&entries).unwrap()).unwrap();
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_phone_check() {
        assert!(is_valid_phone("(11) 99999-8888"));
        assert!(!is_valid_phone("abc"));
    }
}
