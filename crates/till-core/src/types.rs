//! # Domain Types
//!
//! Core domain types used throughout Till.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────────┐   ┌─────────────────┐  │
//! │  │    Product      │   │    PricingRule       │   │  ScannedLine    │  │
//! │  │  ─────────────  │   │  ──────────────────  │   │  ─────────────  │  │
//! │  │  sku            │   │  skus (None = all)   │   │  sku, name      │  │
//! │  │  name           │   │  discount_type       │   │  unit_price     │  │
//! │  │  price_cents    │   │  conditions          │   │  quantity       │  │
//! │  └─────────────────┘   │  priority, window    │   │  rules_applied  │  │
//! │                        └──────────────────────┘   │  total / unit   │  │
//! │                                                   │  overrides      │  │
//! │                                                   └─────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Products and rules are reference data owned by the caller; scanned lines
//! are produced by [`Checkout`](crate::checkout::Checkout).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::{DiscountRate, Money};

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Display name shown on receipts.
    pub name: String,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,
}

impl Product {
    /// Creates a product from its catalog fields.
    pub fn new(sku: impl Into<String>, name: impl Into<String>, price: Money) -> Self {
        Product {
            sku: sku.into(),
            name: name.into(),
            price_cents: price.cents(),
        }
    }

    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Discount Type
// =============================================================================

/// How a matched rule reprices its group of units.
///
/// ## Pricing Formulas
/// ```text
/// ┌──────────────────┬────────────────────────────────────────────────────┐
/// │ BUY_X_GET_Y      │ group total  = payQuantity × price                 │
/// │ BULK_DISCOUNT    │ unit price   = discountedPrice                     │
/// │ PERCENTAGE_OFF   │ group total  = minQuantity × price × (1 - pct/100) │
/// │ FIXED_PRICE      │ unit price   = discountedPrice                     │
/// └──────────────────┴────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum DiscountType {
    #[serde(rename = "BUY_X_GET_Y")]
    BuyXGetY,
    #[serde(rename = "BULK_DISCOUNT")]
    BulkDiscount,
    #[serde(rename = "PERCENTAGE_OFF")]
    PercentageOff,
    #[serde(rename = "FIXED_PRICE")]
    FixedPrice,
}

impl std::fmt::Display for DiscountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscountType::BuyXGetY => write!(f, "BUY_X_GET_Y"),
            DiscountType::BulkDiscount => write!(f, "BULK_DISCOUNT"),
            DiscountType::PercentageOff => write!(f, "PERCENTAGE_OFF"),
            DiscountType::FixedPrice => write!(f, "FIXED_PRICE"),
        }
    }
}

// =============================================================================
// Rule Conditions
// =============================================================================

/// Trigger and parameters of a pricing rule.
///
/// Which optional fields are required depends on the rule's [`DiscountType`];
/// see [`validate_pricing_rule`](crate::validation::validate_pricing_rule).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RuleConditions {
    /// Group quantity at which the rule fires (exact match, >= 1).
    pub min_quantity: i64,

    /// Units charged out of the group (BUY_X_GET_Y).
    #[serde(default)]
    pub pay_quantity: Option<i64>,

    /// Replacement unit price in cents (BULK_DISCOUNT, FIXED_PRICE).
    #[serde(default)]
    pub discounted_price_cents: Option<i64>,

    /// Percentage taken off, 0..=100 (PERCENTAGE_OFF).
    #[serde(default)]
    pub percentage_off: Option<f64>,

    /// Rule stops firing once the SKU's scanned quantity exceeds this.
    #[serde(default)]
    pub max_quantity: Option<i64>,

    /// Upper bound on the discount one application may grant, in cents.
    #[serde(default)]
    pub max_discount_cents: Option<i64>,
}

impl RuleConditions {
    /// Conditions that fire at `min_quantity` with no parameters set yet.
    pub fn at_quantity(min_quantity: i64) -> Self {
        RuleConditions {
            min_quantity,
            pay_quantity: None,
            discounted_price_cents: None,
            percentage_off: None,
            max_quantity: None,
            max_discount_cents: None,
        }
    }

    pub fn pay_for(mut self, pay_quantity: i64) -> Self {
        self.pay_quantity = Some(pay_quantity);
        self
    }

    pub fn discounted_price(mut self, price: Money) -> Self {
        self.discounted_price_cents = Some(price.cents());
        self
    }

    pub fn percentage_off(mut self, pct: f64) -> Self {
        self.percentage_off = Some(pct);
        self
    }

    pub fn max_quantity(mut self, max: i64) -> Self {
        self.max_quantity = Some(max);
        self
    }

    pub fn max_discount(mut self, cap: Money) -> Self {
        self.max_discount_cents = Some(cap.cents());
        self
    }
}

// =============================================================================
// Pricing Rule
// =============================================================================

/// A time-bounded, prioritized pricing rule.
///
/// ## Effectiveness
/// A rule is *in effect* at instant `t` iff `is_active` and
/// `start_date <= t <= end_date`. The engine trusts the rules it is handed;
/// filtering by date happens before a checkout is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricingRule {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    /// SKUs the rule covers. `None` covers every SKU.
    #[serde(default)]
    pub skus: Option<Vec<String>>,

    pub discount_type: DiscountType,

    pub conditions: RuleConditions,

    /// 0..=100, higher wins.
    #[serde(default)]
    pub priority: u8,

    /// Declared for combining rules on one line. Not enforced: a line carries
    /// at most one rule.
    #[serde(default)]
    pub stackable: bool,

    #[ts(as = "String")]
    pub start_date: DateTime<Utc>,

    #[ts(as = "String")]
    pub end_date: DateTime<Utc>,

    #[serde(default = "default_active")]
    pub is_active: bool,

    #[serde(default = "default_created_at")]
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

fn default_created_at() -> DateTime<Utc> {
    DateTime::<Utc>::MIN_UTC
}

impl PricingRule {
    /// Creates an active rule with a fresh id, valid for all time, covering
    /// every SKU at priority 0.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::{DiscountType, PricingRule, RuleConditions};
    ///
    /// let rule = PricingRule::new(
    ///     "Apple TV 3 for 2",
    ///     DiscountType::BuyXGetY,
    ///     RuleConditions::at_quantity(3).pay_for(2),
    /// )
    /// .for_skus(["atv"])
    /// .with_priority(10);
    ///
    /// assert!(rule.applies_to("atv"));
    /// assert!(!rule.applies_to("vga"));
    /// ```
    pub fn new(
        name: impl Into<String>,
        discount_type: DiscountType,
        conditions: RuleConditions,
    ) -> Self {
        PricingRule {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: String::new(),
            skus: None,
            discount_type,
            conditions,
            priority: 0,
            stackable: false,
            start_date: DateTime::<Utc>::MIN_UTC,
            end_date: DateTime::<Utc>::MAX_UTC,
            is_active: true,
            created_at: default_created_at(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Restricts the rule to the given SKUs.
    pub fn for_skus<I, S>(mut self, skus: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skus = Some(skus.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn stackable(mut self, stackable: bool) -> Self {
        self.stackable = stackable;
        self
    }

    pub fn valid_between(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn created(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Checks whether the rule covers `sku`.
    pub fn applies_to(&self, sku: &str) -> bool {
        match &self.skus {
            None => true,
            Some(skus) => skus.iter().any(|s| s == sku),
        }
    }

    /// Checks whether the rule is active and `at` falls inside its window.
    pub fn is_in_effect(&self, at: DateTime<Utc>) -> bool {
        self.is_active && self.start_date <= at && at <= self.end_date
    }

    /// Percentage condition as a rate, if set.
    pub fn discount_rate(&self) -> Option<DiscountRate> {
        self.conditions.percentage_off.map(DiscountRate::from_percentage)
    }

    /// Discounted unit price condition, if set.
    pub fn discounted_price(&self) -> Option<Money> {
        self.conditions.discounted_price_cents.map(Money::from_cents)
    }
}

// =============================================================================
// Scanned Line
// =============================================================================

/// An aggregated per-SKU-group entry in a checkout.
///
/// ## Price Resolution
/// ```text
/// total_price set?           ──yes──► total_price
///        │no
/// modified_unit_price set?   ──yes──► modified_unit_price × quantity
///        │no
///        └──────────────────────────► unit_price × quantity
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ScannedLine {
    pub sku: String,

    /// Product name at time of scan (frozen).
    pub name: String,

    /// Catalog unit price in cents at time of scan (frozen).
    pub unit_price_cents: i64,

    pub quantity: i64,

    /// Rule currently pricing this line (zero or one entry).
    pub rules_applied: Vec<PricingRule>,

    /// Whole-line price set by a rule, in cents.
    pub total_price_cents: Option<i64>,

    /// Per-unit price set by a rule, in cents.
    pub modified_unit_price_cents: Option<i64>,

    /// Discount each rule contributed, one entry per rule. A folded line
    /// keeps the credits of every part.
    #[serde(default)]
    pub credits: Vec<RuleCredit>,
}

/// The share of a line's discount earned by one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RuleCredit {
    pub rule_id: String,
    pub rule_name: String,
    pub discount_type: DiscountType,
    pub discount_cents: i64,
}

impl RuleCredit {
    pub fn new(rule: &PricingRule, discount: Money) -> Self {
        RuleCredit {
            rule_id: rule.id.clone(),
            rule_name: rule.name.clone(),
            discount_type: rule.discount_type,
            discount_cents: discount.cents(),
        }
    }
}

impl ScannedLine {
    /// Starts a line for one unit of `product`, no rule applied.
    pub fn for_product(product: &Product) -> Self {
        ScannedLine {
            sku: product.sku.clone(),
            name: product.name.clone(),
            unit_price_cents: product.price_cents,
            quantity: 1,
            rules_applied: Vec::new(),
            total_price_cents: None,
            modified_unit_price_cents: None,
            credits: Vec::new(),
        }
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// What the customer pays for this line.
    pub fn line_total(&self) -> Money {
        if let Some(total) = self.total_price_cents {
            return Money::from_cents(total);
        }
        if let Some(unit) = self.modified_unit_price_cents {
            return Money::from_cents(unit).multiply_quantity(self.quantity);
        }
        self.undiscounted_total()
    }

    /// Catalog price × quantity, ignoring any rule.
    pub fn undiscounted_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }

    /// Amount taken off by the applied rule (negative if a rule raised the price).
    pub fn discount(&self) -> Money {
        self.undiscounted_total() - self.line_total()
    }

    /// The rule currently pricing this line.
    pub fn applied_rule(&self) -> Option<&PricingRule> {
        self.rules_applied.first()
    }

    #[inline]
    pub fn has_rule(&self) -> bool {
        !self.rules_applied.is_empty()
    }

    /// Drops any rule pricing, returning the line to catalog price.
    pub(crate) fn clear_pricing(&mut self) {
        self.rules_applied.clear();
        self.total_price_cents = None;
        self.modified_unit_price_cents = None;
        self.credits.clear();
    }

    /// Adds `other`'s credits, summing entries of the same rule.
    pub(crate) fn absorb_credits(&mut self, other: Vec<RuleCredit>) {
        for credit in other {
            match self.credits.iter_mut().find(|c| c.rule_id == credit.rule_id) {
                Some(existing) => existing.discount_cents += credit.discount_cents,
                None => self.credits.push(credit),
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
