//! # Rule Pricing
//!
//! Reprices a [`ScannedLine`] for the rule that just matched it.
//!
//! Prices are always computed from the line's frozen catalog unit price,
//! never from whatever a previous rule left on the line.
//!
//! ## Known Defect: PERCENTAGE_OFF
//! The percentage formula charges `minQuantity × price × (1 - pct/100)`
//! regardless of how many units the line holds. Rules only fire when the
//! group quantity equals `minQuantity`, so the two agree at the moment of
//! application, but a caller repricing a larger line with this function gets
//! the `minQuantity` figure, not a per-unit percentage.

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{DiscountType, PricingRule, RuleCredit, ScannedLine};

/// Attaches `rule` to `line` and sets the rule's price on it.
///
/// ## Errors
/// [`CoreError::MalformedRule`] if the condition the discount type needs is
/// missing. The line is left untouched in that case.
///
/// ## Example
/// ```rust
/// use till_core::pricing::apply_rule;
/// use till_core::{DiscountType, Money, PricingRule, Product, RuleConditions, ScannedLine};
///
/// let atv = Product::new("atv", "Apple TV", Money::from_cents(10950));
/// let mut line = ScannedLine::for_product(&atv);
/// line.quantity = 3;
///
/// let rule = PricingRule::new("3 for 2", DiscountType::BuyXGetY,
///     RuleConditions::at_quantity(3).pay_for(2));
/// apply_rule(&mut line, &rule).unwrap();
///
/// assert_eq!(line.line_total().cents(), 21900);
/// ```
pub fn apply_rule(line: &mut ScannedLine, rule: &PricingRule) -> CoreResult<()> {
    let price = line.unit_price();
    let conditions = &rule.conditions;

    let (total, unit) = match rule.discount_type {
        DiscountType::BuyXGetY => {
            let pay = required(rule, conditions.pay_quantity, "payQuantity")?;
            (Some(price.multiply_quantity(pay)), None)
        }
        DiscountType::BulkDiscount | DiscountType::FixedPrice => {
            let unit = required(rule, rule.discounted_price(), "discountedPriceCents")?;
            (None, Some(unit))
        }
        DiscountType::PercentageOff => {
            let rate = required(rule, rule.discount_rate(), "percentageOff")?;
            let charged = price
                .multiply_quantity(conditions.min_quantity)
                .apply_discount(rate);
            (Some(charged), None)
        }
    };

    line.clear_pricing();
    line.total_price_cents = total.map(|m| m.cents());
    line.modified_unit_price_cents = unit.map(|m| m.cents());
    line.rules_applied = vec![rule.clone()];

    if let Some(cap) = conditions.max_discount_cents {
        cap_discount(line, Money::from_cents(cap));
    }
    line.credits = vec![RuleCredit::new(rule, line.discount())];

    Ok(())
}

/// Raises the line's price so its discount does not exceed `cap`.
fn cap_discount(line: &mut ScannedLine, cap: Money) {
    let floor = line.undiscounted_total() - cap;
    if line.line_total() < floor {
        line.total_price_cents = Some(floor.cents());
        line.modified_unit_price_cents = None;
    }
}

fn required<T>(rule: &PricingRule, value: Option<T>, field: &str) -> CoreResult<T> {
    value.ok_or_else(|| CoreError::MalformedRule {
        rule_id: rule.id.clone(),
        field: field.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Product, RuleConditions};

    fn line_of(price_cents: i64, quantity: i64) -> ScannedLine {
        let product = Product::new("p", "Product", Money::from_cents(price_cents));
        let mut line = ScannedLine::for_product(&product);
        line.quantity = quantity;
        line
    }

    #[test]
    fn test_buy_x_get_y_charges_pay_quantity() {
        let mut line = line_of(10950, 3);
        let rule = PricingRule::new(
            "3 for 2",
            DiscountType::BuyXGetY,
            RuleConditions::at_quantity(3).pay_for(2),
        );
        apply_rule(&mut line, &rule).unwrap();

        assert_eq!(line.total_price_cents, Some(21900));
        assert_eq!(line.modified_unit_price_cents, None);
        assert_eq!(line.applied_rule().map(|r| r.id.as_str()), Some(rule.id.as_str()));
    }

    #[test]
    fn test_bulk_and_fixed_set_unit_price() {
        for discount_type in [DiscountType::BulkDiscount, DiscountType::FixedPrice] {
            let mut line = line_of(54999, 5);
            let rule = PricingRule::new(
                "ipd bulk",
                discount_type,
                RuleConditions::at_quantity(5).discounted_price(Money::from_cents(49999)),
            );
            apply_rule(&mut line, &rule).unwrap();

            assert_eq!(line.modified_unit_price_cents, Some(49999));
            assert_eq!(line.total_price_cents, None);
            assert_eq!(line.line_total().cents(), 5 * 49999);
        }
    }

    #[test]
    fn test_percentage_off_uses_min_quantity_not_line_quantity() {
        let rule = PricingRule::new(
            "10% off",
            DiscountType::PercentageOff,
            RuleConditions::at_quantity(1).percentage_off(10.0),
        );

        let mut single = line_of(10000, 1);
        apply_rule(&mut single, &rule).unwrap();
        assert_eq!(single.line_total().cents(), 9000);

        let mut larger = line_of(10000, 4);
        apply_rule(&mut larger, &rule).unwrap();
        assert_eq!(larger.line_total().cents(), 9000);
    }

    #[test]
    fn test_reprice_replaces_previous_rule() {
        let mut line = line_of(54999, 5);
        let fixed = PricingRule::new(
            "fixed",
            DiscountType::FixedPrice,
            RuleConditions::at_quantity(5).discounted_price(Money::from_cents(49999)),
        );
        let bogo = PricingRule::new(
            "5 for 4",
            DiscountType::BuyXGetY,
            RuleConditions::at_quantity(5).pay_for(4),
        );
        apply_rule(&mut line, &fixed).unwrap();
        apply_rule(&mut line, &bogo).unwrap();

        assert_eq!(line.modified_unit_price_cents, None);
        assert_eq!(line.line_total().cents(), 4 * 54999);
        assert_eq!(line.rules_applied.len(), 1);
        assert_eq!(line.rules_applied[0].name, "5 for 4");
        assert_eq!(line.credits.len(), 1);
        assert_eq!(line.credits[0].rule_id, bogo.id);
        assert_eq!(line.credits[0].discount_cents, 54999);
    }

    #[test]
    fn test_max_discount_caps_reduction() {
        let mut line = line_of(54999, 5);
        let rule = PricingRule::new(
            "bundle",
            DiscountType::PercentageOff,
            RuleConditions::at_quantity(5)
                .percentage_off(10.0)
                .max_discount(Money::from_cents(20000)),
        );
        apply_rule(&mut line, &rule).unwrap();

        // 10% of $2749.95 is $275.00; capped at $200.00 off
        assert_eq!(line.line_total().cents(), 5 * 54999 - 20000);
        assert_eq!(line.discount().cents(), 20000);
        assert_eq!(line.credits.len(), 1);
        assert_eq!(line.credits[0].discount_cents, 20000);
    }

    #[test]
    fn test_max_discount_not_reached_leaves_price() {
        let mut line = line_of(10950, 3);
        let rule = PricingRule::new(
            "3 for 2",
            DiscountType::BuyXGetY,
            RuleConditions::at_quantity(3)
                .pay_for(2)
                .max_discount(Money::from_cents(50000)),
        );
        apply_rule(&mut line, &rule).unwrap();
        assert_eq!(line.line_total().cents(), 21900);
    }

    #[test]
    fn test_malformed_rule_fails_without_touching_line() {
        let mut line = line_of(10950, 3);
        let before = line.clone();
        let rule = PricingRule::new(
            "broken",
            DiscountType::BuyXGetY,
            RuleConditions::at_quantity(3),
        )
        .with_id("broken-rule");

        let err = apply_rule(&mut line, &rule).unwrap_err();
        assert!(matches!(
            err,
            CoreError::MalformedRule { ref rule_id, ref field }
                if rule_id == "broken-rule" && field == "payQuantity"
        ));
        assert_eq!(line, before);
    }
}
