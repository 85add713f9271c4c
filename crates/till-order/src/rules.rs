//! # Rule Selection
//!
//! Picks the rules a checkout prices against and provides the store-opening
//! promotion set.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  all rules ──► active? ──► in window at order date? ──► covers a       │
//! │                                                         scanned SKU?   │
//! │                                                              │          │
//! │            sort: priority desc, then newest created first ◄──┘          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Months, Utc};
use till_core::{DiscountType, Money, PricingRule, RuleConditions};
use tracing::debug;

/// Rules in effect at `at` that could touch any of `skus`.
///
/// Global rules (no SKU list) are always kept. The result is ordered by
/// priority (highest first), then by creation time (newest first), so
/// among otherwise equal rules the most recently created one wins.
pub fn effective_rules(rules: &[PricingRule], at: DateTime<Utc>, skus: &[String]) -> Vec<PricingRule> {
    let mut selected: Vec<PricingRule> = rules
        .iter()
        .filter(|r| r.is_in_effect(at))
        .filter(|r| match &r.skus {
            None => true,
            Some(covered) => covered.iter().any(|c| skus.contains(c)),
        })
        .cloned()
        .collect();

    selected.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });

    debug!(
        available = rules.len(),
        effective = selected.len(),
        at = %at,
        "Selected effective pricing rules"
    );
    selected
}

/// The promotions a new store opens with, valid for `months` from `start`.
///
/// | Rule                         | SKUs     | Deal                                  | Priority |
/// |------------------------------|----------|---------------------------------------|----------|
/// | Apple TV 3 for 2 Deal        | atv      | 3 for the price of 2, up to 9 units   | 10       |
/// | Super iPad Bulk Discount     | ipd      | $499.99 each from 5 units             | 20       |
/// | Holiday Season Bundle        | atv, ipd | 10% off, at most $200 per application | 5        |
/// | Store-wide Opening Special   | all      | 5% off                                | 1        |
pub fn opening_rules(start: DateTime<Utc>, months: u32) -> Vec<PricingRule> {
    let end = start
        .checked_add_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    let rules = vec![
        PricingRule::new(
            "Apple TV 3 for 2 Deal",
            DiscountType::BuyXGetY,
            RuleConditions::at_quantity(3).pay_for(2).max_quantity(9),
        )
        .described("Buy 3 Apple TVs, pay for 2 only")
        .for_skus(["atv"])
        .with_priority(10),
        PricingRule::new(
            "Super iPad Bulk Discount",
            DiscountType::FixedPrice,
            RuleConditions::at_quantity(5).discounted_price(Money::from_cents(49999)),
        )
        .described("Buy more than 4 iPads, get each for $499.99")
        .for_skus(["ipd"])
        .with_priority(20),
        PricingRule::new(
            "Holiday Season Bundle Discount",
            DiscountType::PercentageOff,
            RuleConditions::at_quantity(1)
                .percentage_off(10.0)
                .max_discount(Money::from_cents(20000)),
        )
        .described("10% off Apple TV and iPad")
        .for_skus(["atv", "ipd"])
        .with_priority(5)
        .stackable(true),
        PricingRule::new(
            "Store-wide Opening Special",
            DiscountType::PercentageOff,
            RuleConditions::at_quantity(1).percentage_off(5.0),
        )
        .described("5% off all products")
        .with_priority(1)
        .stackable(true),
    ];

    rules
        .into_iter()
        .map(|r| r.valid_between(start, end).created(start))
        .collect()
}
