//! # Input Validation
//!
//! Checks for catalog data, pricing rules and order requests.
//!
//! ## Where Each Check Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Loading (till-order)                                         │
//! │  ├── Snapshot products/rules deserialized                              │
//! │  └── THIS MODULE: product + rule checks before a checkout exists       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Order intake (till-order)                                    │
//! │  ├── THIS MODULE: customer name, item list                             │
//! │  └── Unknown SKUs rejected (configurable)                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Checkout (till-core)                                         │
//! │  ├── Trusts rules; fails fast on a missing condition                   │
//! │  └── Tolerates unknown SKUs (logged no-op)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use till_core::validation::{validate_order_items, validate_sku};
//!
//! validate_sku("atv").unwrap();
//! assert!(validate_order_items(&[]).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{DiscountType, PricingRule, Product};
use crate::{MAX_ORDER_ITEMS, MAX_RULE_PRIORITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Catalog Validators
// =============================================================================

/// Longest SKU accepted.
const MAX_SKU_LEN: usize = 50;

/// Longest product, rule or customer name accepted.
const MAX_NAME_LEN: usize = 200;

/// SKUs are short codes: ASCII letters, digits, `-` and `_`, at most 50 chars.
///
/// ```rust
/// use till_core::validation::validate_sku;
///
/// assert!(validate_sku("ipd").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("has space").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = required_text("sku", sku, MAX_SKU_LEN)?;

    match sku.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_')) {
        Some(bad) => Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: format!("character '{}' not allowed", bad),
        }),
        None => Ok(()),
    }
}

/// Trimmed `value`, rejected when blank or longer than `max` characters.
fn required_text<'a>(field: &str, value: &'a str, max: usize) -> ValidationResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(value)
}

/// Validates a catalog product: SKU format, non-empty name, non-negative price.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_sku(&product.sku)?;

    required_text("name", &product.name, MAX_NAME_LEN)?;
    validate_price_cents("price", product.price_cents)
}

/// Validates a price in cents. Zero is allowed (free items).
fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

// =============================================================================
// Rule Validators
// =============================================================================

/// Validates a pricing rule before it may reach a checkout.
///
/// ## Rules
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Every rule                                                            │
/// │  ├── name non-empty, id a UUID                                         │
/// │  ├── skus: None, or a non-empty list of valid SKUs                     │
/// │  ├── priority 0..=100                                                  │
/// │  ├── minQuantity >= 1                                                  │
/// │  └── endDate strictly after startDate                                  │
/// │                                                                         │
/// │  Per discount type                                                     │
/// │  ├── BUY_X_GET_Y     payQuantity >= 1                                  │
/// │  ├── BULK_DISCOUNT   discountedPriceCents >= 0                         │
/// │  ├── FIXED_PRICE     discountedPriceCents >= 0                         │
/// │  └── PERCENTAGE_OFF  percentageOff in 0..=100                          │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_pricing_rule(rule: &PricingRule) -> ValidationResult<()> {
    required_text("name", &rule.name, MAX_NAME_LEN)?;

    validate_uuid(&rule.id)?;

    if let Some(skus) = &rule.skus {
        if skus.is_empty() {
            return Err(ValidationError::InvalidFormat {
                field: "skus".to_string(),
                reason: "must be null (all products) or a non-empty list".to_string(),
            });
        }
        for sku in skus {
            validate_sku(sku)?;
        }
    }

    if rule.priority > MAX_RULE_PRIORITY {
        return Err(ValidationError::OutOfRange {
            field: "priority".to_string(),
            min: 0,
            max: MAX_RULE_PRIORITY as i64,
        });
    }

    let conditions = &rule.conditions;
    if conditions.min_quantity < 1 {
        return Err(ValidationError::OutOfRange {
            field: "minQuantity".to_string(),
            min: 1,
            max: i64::MAX,
        });
    }

    if rule.end_date <= rule.start_date {
        return Err(ValidationError::InvalidWindow);
    }

    if let Some(max) = conditions.max_quantity {
        if max < conditions.min_quantity {
            return Err(ValidationError::OutOfRange {
                field: "maxQuantity".to_string(),
                min: conditions.min_quantity,
                max: i64::MAX,
            });
        }
    }

    if let Some(cap) = conditions.max_discount_cents {
        validate_price_cents("maxDiscountCents", cap)?;
    }

    match rule.discount_type {
        DiscountType::BuyXGetY => match conditions.pay_quantity {
            None => Err(missing(rule, "payQuantity")),
            Some(pay) if pay < 1 => Err(ValidationError::OutOfRange {
                field: "payQuantity".to_string(),
                min: 1,
                max: i64::MAX,
            }),
            Some(_) => Ok(()),
        },
        DiscountType::BulkDiscount | DiscountType::FixedPrice => {
            match conditions.discounted_price_cents {
                None => Err(missing(rule, "discountedPriceCents")),
                Some(price) => validate_price_cents("discountedPriceCents", price),
            }
        }
        DiscountType::PercentageOff => match conditions.percentage_off {
            None => Err(missing(rule, "percentageOff")),
            Some(pct) if !(0.0..=100.0).contains(&pct) => Err(ValidationError::OutOfRange {
                field: "percentageOff".to_string(),
                min: 0,
                max: 100,
            }),
            Some(_) => Ok(()),
        },
    }
}

fn missing(rule: &PricingRule, field: &str) -> ValidationError {
    ValidationError::MissingCondition {
        discount_type: rule.discount_type,
        field: field.to_string(),
    }
}

/// Rule ids are UUIDs (any version).
///
/// ```rust
/// use till_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("rule-1").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    let id = required_text("id", id, 36)?;
    uuid::Uuid::parse_str(id)
        .map(|_| ())
        .map_err(|e| ValidationError::InvalidFormat {
            field: "id".to_string(),
            reason: e.to_string(),
        })
}

// =============================================================================
// Order Validators
// =============================================================================

/// Validates the customer name on an order.
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    required_text("customerName", name, MAX_NAME_LEN).map(|_| ())
}

/// Validates the raw scanned item list of an order.
///
/// ## Rules
/// - At least one item
/// - At most MAX_ORDER_ITEMS scans
/// - Every entry non-empty
pub fn validate_order_items(items: &[String]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if items.len() > MAX_ORDER_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_ORDER_ITEMS as i64,
        });
    }

    if items.iter().any(|sku| sku.trim().is_empty()) {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
