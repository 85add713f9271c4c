//! # Order Intake
//!
//! Prices a customer's scan list and assembles the order record.
//!
//! ## Order Creation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  OrderRequest { customerName, items }                                  │
//! │     │                                                                   │
//! │     ├── validate name + item list ──────────────► Validation error     │
//! │     ├── unknown SKUs? ── reject_unknown_skus ───► UnknownSkus error    │
//! │     │                └── otherwise ─────────────► warn!, skipped       │
//! │     ├── effective_rules(order date, scanned SKUs)                      │
//! │     ├── Checkout::scan each item in request order                      │
//! │     └── lines ──► items + applied rule summary ──► OrderRecord         │
//! │                                                    (status: pending)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use till_core::validation::{validate_customer_name, validate_order_items};
use till_core::{Checkout, DiscountType, PricingRule, RuleCatalog, ScannedLine};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::OrderConfig;
use crate::error::{OrderError, OrderResult};
use crate::rules::{effective_rules, opening_rules};
use crate::snapshot::StoreSnapshot;

// =============================================================================
// Order Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Confirmed => write!(f, "confirmed"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            other => Err(OrderError::Validation(till_core::ValidationError::InvalidFormat {
                field: "status".to_string(),
                reason: format!("'{}' is not one of pending, confirmed, cancelled", other),
            })),
        }
    }
}

// =============================================================================
// Request / Record Types
// =============================================================================

/// A customer's basket as scanned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub customer_name: String,

    /// SKUs in scan order, one entry per physical unit.
    pub items: Vec<String>,
}

impl OrderRequest {
    pub fn new<I, S>(customer_name: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        OrderRequest {
            customer_name: customer_name.into(),
            items: items.into_iter().map(Into::into).collect(),
        }
    }
}

/// One priced line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub sku: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,

    /// Catalog price of the line before rules.
    pub original_price_cents: i64,

    /// What the customer pays for the line.
    pub final_price_cents: i64,

    /// Ids of every rule that priced units of this line.
    pub rules_applied: Vec<String>,
}

impl From<&ScannedLine> for OrderItem {
    fn from(line: &ScannedLine) -> Self {
        OrderItem {
            sku: line.sku.clone(),
            name: line.name.clone(),
            quantity: line.quantity,
            unit_price_cents: line.unit_price_cents,
            original_price_cents: line.undiscounted_total().cents(),
            final_price_cents: line.line_total().cents(),
            rules_applied: line.credits.iter().map(|c| c.rule_id.clone()).collect(),
        }
    }
}

/// How much one rule saved across the order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedRule {
    pub rule_id: String,
    pub rule_name: String,
    pub discount_type: DiscountType,
    pub discount_amount_cents: i64,

    /// SKUs of the lines the rule priced.
    pub applied_to_items: Vec<String>,
}

/// A priced order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: String,
    pub customer_name: String,

    /// The request's items, unknown SKUs included.
    pub scanned_items: Vec<String>,

    pub items: Vec<OrderItem>,
    pub applied_rules: Vec<AppliedRule>,
    pub subtotal_cents: i64,
    pub total_discount_cents: i64,
    pub total_cents: i64,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
}

impl OrderRecord {
    pub fn update_status(&mut self, status: OrderStatus) {
        info!(order_id = %self.id, from = %self.status, to = %status, "Order status updated");
        self.status = status;
    }
}

// =============================================================================
// Order Service
// =============================================================================

/// Prices orders against one store snapshot.
#[derive(Debug, Clone)]
pub struct OrderService {
    config: OrderConfig,
    snapshot: StoreSnapshot,
    rules: Vec<PricingRule>,
}

impl OrderService {
    /// Creates the service. When the snapshot has no rules and the config
    /// asks for it, the opening promotions starting at `opened_at` are used.
    pub fn new(config: OrderConfig, snapshot: StoreSnapshot, opened_at: DateTime<Utc>) -> Self {
        let rules = if snapshot.rules.is_empty() && config.checkout.seed_opening_rules {
            info!(
                months = config.checkout.opening_rules_months,
                "Seeding store-opening pricing rules"
            );
            opening_rules(opened_at, config.checkout.opening_rules_months)
        } else {
            snapshot.rules.clone()
        };

        OrderService {
            config,
            snapshot,
            rules,
        }
    }

    pub fn config(&self) -> &OrderConfig {
        &self.config
    }

    pub fn snapshot(&self) -> &StoreSnapshot {
        &self.snapshot
    }

    /// Every rule known to the service, in effect or not.
    pub fn rules(&self) -> &[PricingRule] {
        &self.rules
    }

    /// Prices `request` as of `at` and returns a pending order.
    ///
    /// ## Errors
    /// - [`OrderError::Validation`]: blank customer name, empty or oversized
    ///   item list, blank SKU
    /// - [`OrderError::UnknownSkus`]: unknown SKUs while `reject_unknown_skus`
    /// - [`OrderError::Core`]: the engine could not price a scan
    pub fn create_order(&self, request: OrderRequest, at: DateTime<Utc>) -> OrderResult<OrderRecord> {
        validate_customer_name(&request.customer_name)?;
        validate_order_items(&request.items)?;

        let unknown = self.snapshot.unknown_skus(&request.items);
        if !unknown.is_empty() {
            if self.config.checkout.reject_unknown_skus {
                return Err(OrderError::UnknownSkus(unknown));
            }
            warn!(skus = ?unknown, "Skipping unknown SKUs in order");
        }

        let rules = effective_rules(&self.rules, at, &request.items);
        let mut checkout = Checkout::new(self.snapshot.products.iter().cloned(), RuleCatalog::new(rules));
        checkout.scan_all(&request.items)?;

        let subtotal = checkout.subtotal();
        let total = checkout.total();
        let lines = checkout.into_lines();

        let record = OrderRecord {
            id: Uuid::new_v4().to_string(),
            customer_name: request.customer_name.trim().to_string(),
            scanned_items: request.items,
            items: lines.iter().map(OrderItem::from).collect(),
            applied_rules: summarize_rules(&lines),
            subtotal_cents: subtotal.cents(),
            total_discount_cents: (subtotal - total).cents(),
            total_cents: total.cents(),
            order_date: at,
            status: OrderStatus::Pending,
        };

        info!(
            order_id = %record.id,
            customer = %record.customer_name,
            items = record.scanned_items.len(),
            total = %self.config.format_money(total),
            "Order created"
        );
        Ok(record)
    }
}

/// Totals each rule's credits across lines, in the order rules first appear.
fn summarize_rules(lines: &[ScannedLine]) -> Vec<AppliedRule> {
    let mut summary: Vec<AppliedRule> = Vec::new();

    for line in lines {
        for credit in &line.credits {
            match summary.iter_mut().find(|a| a.rule_id == credit.rule_id) {
                Some(applied) => {
                    applied.discount_amount_cents += credit.discount_cents;
                    if !applied.applied_to_items.contains(&line.sku) {
                        applied.applied_to_items.push(line.sku.clone());
                    }
                }
                None => summary.push(AppliedRule {
                    rule_id: credit.rule_id.clone(),
                    rule_name: credit.rule_name.clone(),
                    discount_type: credit.discount_type,
                    discount_amount_cents: credit.discount_cents,
                    applied_to_items: vec![line.sku.clone()],
                }),
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use till_core::{Money, RuleConditions};

    fn opening_day() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn three_for_two() -> PricingRule {
        PricingRule::new(
            "3 for 2 on Apple TV",
            DiscountType::BuyXGetY,
            RuleConditions::at_quantity(3).pay_for(2),
        )
        .for_skus(["atv"])
        .with_priority(10)
    }

    fn service_with(rules: Vec<PricingRule>, config: OrderConfig) -> OrderService {
        let mut snapshot = StoreSnapshot::demo();
        snapshot.rules = rules;
        OrderService::new(config, snapshot, opening_day())
    }

    fn no_seed() -> OrderConfig {
        let mut config = OrderConfig::default();
        config.checkout.seed_opening_rules = false;
        config
    }

    #[test]
    fn test_three_for_two_order() {
        let service = service_with(vec![three_for_two()], no_seed());
        let order = service
            .create_order(
                OrderRequest::new("Ada", ["atv", "atv", "atv", "vga"]),
                opening_day(),
            )
            .unwrap();

        assert_eq!(order.total_cents, 24900);
        assert_eq!(order.subtotal_cents, 3 * 10950 + 3000);
        assert_eq!(order.total_discount_cents, 10950);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.scanned_items.len(), 4);

        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].final_price_cents, 21900);
        assert_eq!(order.items[0].original_price_cents, 32850);

        assert_eq!(order.applied_rules.len(), 1);
        let applied = &order.applied_rules[0];
        assert_eq!(applied.rule_name, "3 for 2 on Apple TV");
        assert_eq!(applied.discount_amount_cents, 10950);
        assert_eq!(applied.applied_to_items, ["atv"]);
    }

    #[test]
    fn test_no_rules_order() {
        let service = service_with(vec![], no_seed());
        let order = service
            .create_order(OrderRequest::new("Ada", ["ipd", "ipd"]), opening_day())
            .unwrap();

        assert_eq!(order.total_cents, 109998);
        assert_eq!(order.total_discount_cents, 0);
        assert!(order.applied_rules.is_empty());
    }

    #[test]
    fn test_unknown_skus_rejected_by_default() {
        let service = service_with(vec![], no_seed());
        let err = service
            .create_order(OrderRequest::new("Ada", ["atv", "nope"]), opening_day())
            .unwrap_err();
        assert!(matches!(err, OrderError::UnknownSkus(ref skus) if skus == &["nope"]));
    }

    #[test]
    fn test_unknown_skus_skipped_when_allowed() {
        let mut config = no_seed();
        config.checkout.reject_unknown_skus = false;
        let service = service_with(vec![three_for_two()], config);

        let order = service
            .create_order(
                OrderRequest::new("Ada", ["atv", "nope", "atv", "atv"]),
                opening_day(),
            )
            .unwrap();
        assert_eq!(order.total_cents, 21900);
        assert_eq!(order.scanned_items.len(), 4);
        assert_eq!(order.items.len(), 1);
    }

    #[test]
    fn test_request_validation() {
        let service = service_with(vec![], no_seed());

        let blank = service.create_order(OrderRequest::new("  ", ["atv"]), opening_day());
        assert!(matches!(blank, Err(OrderError::Validation(_))));

        let empty = service.create_order(
            OrderRequest::new("Ada", Vec::<String>::new()),
            opening_day(),
        );
        assert!(matches!(empty, Err(OrderError::Validation(_))));
    }

    #[test]
    fn test_opening_rules_seeded_when_snapshot_has_none() {
        let service = service_with(vec![], OrderConfig::default());
        assert_eq!(service.rules().len(), 4);

        // Bundle 10% prices the first unit until the 3-for-2 deal takes over
        let two = service
            .create_order(OrderRequest::new("Ada", ["atv", "atv"]), opening_day())
            .unwrap();
        assert_eq!(two.total_cents, 9855 + 10950);

        let three = service
            .create_order(OrderRequest::new("Ada", ["atv", "atv", "atv"]), opening_day())
            .unwrap();
        assert_eq!(three.total_cents, 21900);
        assert_eq!(three.applied_rules[0].rule_name, "Apple TV 3 for 2 Deal");

        // Store-wide 5% is the only rule covering vga
        let vga = service
            .create_order(OrderRequest::new("Ada", ["vga"]), opening_day())
            .unwrap();
        assert_eq!(vga.total_cents, 2850);
    }

    #[test]
    fn test_opening_deal_repeats_up_to_three_sets() {
        let service = service_with(vec![], OrderConfig::default());

        for (units, sets) in [(6usize, 2i64), (9, 3)] {
            let order = service
                .create_order(OrderRequest::new("Ada", vec!["atv"; units]), opening_day())
                .unwrap();
            assert_eq!(order.total_cents, sets * 21900);
            assert_eq!(order.items.len(), 1);

            assert_eq!(order.applied_rules.len(), 1);
            let applied = &order.applied_rules[0];
            assert_eq!(applied.rule_name, "Apple TV 3 for 2 Deal");
            assert_eq!(applied.discount_amount_cents, sets * 10950);
        }

        // A tenth unit is past the deal's limit
        let ten = service
            .create_order(OrderRequest::new("Ada", vec!["atv"; 10]), opening_day())
            .unwrap();
        assert_eq!(ten.total_cents, 3 * 21900 + 10950);
    }

    #[test]
    fn test_expired_rules_not_applied() {
        let service = service_with(vec![], OrderConfig::default());
        let later = opening_day() + Duration::days(200);
        let order = service
            .create_order(OrderRequest::new("Ada", ["atv", "atv", "atv"]), later)
            .unwrap();
        assert_eq!(order.total_cents, 3 * 10950);
        assert_eq!(order.order_date, later);
    }

    #[test]
    fn test_snapshot_rules_take_precedence_over_seed() {
        let service = service_with(vec![three_for_two()], OrderConfig::default());
        assert_eq!(service.rules().len(), 1);
    }

    #[test]
    fn test_summary_merges_lines_of_one_rule() {
        let bulk = PricingRule::new(
            "vga pair",
            DiscountType::BulkDiscount,
            RuleConditions::at_quantity(2).discounted_price(Money::from_cents(2500)),
        );
        let service = service_with(vec![bulk], no_seed());
        let order = service
            .create_order(OrderRequest::new("Ada", ["vga", "atv", "vga", "atv"]), opening_day())
            .unwrap();

        assert_eq!(order.applied_rules.len(), 1);
        let applied = &order.applied_rules[0];
        assert_eq!(applied.applied_to_items, ["vga", "atv"]);
        assert_eq!(applied.discount_amount_cents, 2 * 500 + 2 * 8450);
        assert_eq!(order.total_cents, 4 * 2500);
    }

    #[test]
    fn test_summary_credits_each_rule_on_folded_line() {
        let pair = PricingRule::new(
            "Apple TV pair price",
            DiscountType::FixedPrice,
            RuleConditions::at_quantity(2).discounted_price(Money::from_cents(10000)),
        )
        .for_skus(["atv"])
        .with_priority(5);
        let deal = three_for_two();
        let service = service_with(vec![pair.clone(), deal.clone()], no_seed());

        let order = service
            .create_order(OrderRequest::new("Ada", vec!["atv"; 5]), opening_day())
            .unwrap();
        assert_eq!(order.total_cents, 21900 + 20000);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].rules_applied, [deal.id.clone(), pair.id.clone()]);

        let summary: Vec<(&str, i64)> = order
            .applied_rules
            .iter()
            .map(|a| (a.rule_name.as_str(), a.discount_amount_cents))
            .collect();
        assert_eq!(summary, [("3 for 2 on Apple TV", 10950), ("Apple TV pair price", 1900)]);
        assert_eq!(order.total_discount_cents, 10950 + 1900);
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let service = service_with(vec![three_for_two()], no_seed());
        let mut order = service
            .create_order(OrderRequest::new("Ada", ["atv"]), opening_day())
            .unwrap();
        order.update_status(OrderStatus::Confirmed);

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["customerName"], "Ada");
        assert_eq!(json["totalCents"], 10950);
        assert_eq!(json["status"], "confirmed");
        assert!(json["appliedRules"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("pending".parse::<OrderStatus>().unwrap(), OrderStatus::Pending);
        assert_eq!("CANCELED".parse::<OrderStatus>().unwrap(), OrderStatus::Cancelled);
        assert!("shipped".parse::<OrderStatus>().is_err());
    }
}
