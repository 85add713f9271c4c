//! # Store Snapshot
//!
//! The products and rules a store prices with, loaded once per run.
//!
//! ## File Format
//! Field names match the JSON shape of the domain types. Dates are RFC 3339
//! strings (quoted), not TOML datetimes.
//!
//! ```toml
//! [[products]]
//! sku = "atv"
//! name = "Apple TV"
//! priceCents = 10950
//!
//! [[rules]]
//! id = "6f1c2f1e-8c1a-4d0e-9a57-2b7f0c5d9e11"
//! name = "Apple TV 3 for 2"
//! skus = ["atv"]
//! discountType = "BUY_X_GET_Y"
//! priority = 10
//! startDate = "2026-01-01T00:00:00Z"
//! endDate = "2026-12-31T23:59:59Z"
//! conditions = { minQuantity = 3, payQuantity = 2 }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use till_core::validation::{validate_pricing_rule, validate_product};
use till_core::{Money, PricingRule, Product, ValidationError};
use tracing::info;

use crate::error::OrderResult;

/// Products and rules for one store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub products: Vec<Product>,

    #[serde(default)]
    pub rules: Vec<PricingRule>,
}

impl StoreSnapshot {
    /// The built-in demo catalog. Carries no rules.
    pub fn demo() -> Self {
        StoreSnapshot {
            products: vec![
                Product::new("ipd", "Super iPad", Money::from_cents(54999)),
                Product::new("mbp", "MacBook Pro", Money::from_cents(139999)),
                Product::new("atv", "Apple TV", Money::from_cents(10950)),
                Product::new("vga", "VGA adapter", Money::from_cents(3000)),
            ],
            rules: Vec::new(),
        }
    }

    /// Reads and validates a snapshot file.
    pub fn load(path: &Path) -> OrderResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let snapshot = Self::from_toml_str(&text)?;
        info!(
            ?path,
            products = snapshot.products.len(),
            rules = snapshot.rules.len(),
            "Store snapshot loaded"
        );
        Ok(snapshot)
    }

    /// Parses and validates snapshot TOML.
    pub fn from_toml_str(text: &str) -> OrderResult<Self> {
        let snapshot: StoreSnapshot = toml::from_str(text)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Checks every product and rule, and rejects duplicate SKUs or rule ids.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut skus = HashSet::new();
        for product in &self.products {
            validate_product(product)?;
            if !skus.insert(product.sku.as_str()) {
                return Err(ValidationError::Duplicate {
                    field: "sku".to_string(),
                    value: product.sku.clone(),
                });
            }
        }

        let mut ids = HashSet::new();
        for rule in &self.rules {
            validate_pricing_rule(rule)?;
            if !ids.insert(rule.id.as_str()) {
                return Err(ValidationError::Duplicate {
                    field: "id".to_string(),
                    value: rule.id.clone(),
                });
            }
        }

        Ok(())
    }

    pub fn product(&self, sku: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.sku == sku)
    }

    /// Distinct scanned SKUs missing from the catalog, in first-seen order.
    pub fn unknown_skus(&self, items: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        items
            .iter()
            .filter(|sku| self.product(sku).is_none())
            .filter(|sku| seen.insert(sku.as_str()))
            .cloned()
            .collect()
    }
}
