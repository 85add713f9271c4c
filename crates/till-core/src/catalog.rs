//! # Rule Catalog
//!
//! The rule set a single checkout prices against.
//!
//! Rules arrive already filtered to the ones in effect for the order date
//! (see `till_order::rules::effective_rules`). The catalog drops anything
//! flagged inactive at construction and answers two questions:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  rules_for("atv")        → every rule covering atv, in supplied order  │
//! │  highest_priority(rules) → the single winner among candidates          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::debug;

use crate::types::PricingRule;

/// Priority-ordered lookup over a checkout's pricing rules.
#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    rules: Vec<PricingRule>,
}

impl RuleCatalog {
    /// Builds a catalog, keeping only rules flagged active.
    pub fn new(rules: impl IntoIterator<Item = PricingRule>) -> Self {
        let rules: Vec<PricingRule> = rules.into_iter().filter(|r| r.is_active).collect();
        debug!(count = rules.len(), "Rule catalog built");
        RuleCatalog { rules }
    }

    /// Every rule covering `sku` (global rules included), in supplied order.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::{DiscountType, PricingRule, RuleCatalog, RuleConditions};
    ///
    /// let catalog = RuleCatalog::new([
    ///     PricingRule::new("atv deal", DiscountType::BuyXGetY,
    ///         RuleConditions::at_quantity(3).pay_for(2)).for_skus(["atv"]),
    ///     PricingRule::new("store-wide", DiscountType::PercentageOff,
    ///         RuleConditions::at_quantity(1).percentage_off(5.0)),
    /// ]);
    ///
    /// assert_eq!(catalog.rules_for("atv").len(), 2);
    /// assert_eq!(catalog.rules_for("vga").len(), 1);
    /// ```
    pub fn rules_for(&self, sku: &str) -> Vec<&PricingRule> {
        self.rules.iter().filter(|r| r.applies_to(sku)).collect()
    }

    /// Picks the preferred rule among `candidates`.
    ///
    /// ## Tie-Breaking
    /// 1. Highest `priority`
    /// 2. Earliest `start_date`
    /// 3. Earliest position in `candidates`
    ///
    /// Returns `None` for an empty slice.
    pub fn highest_priority<'a>(candidates: &[&'a PricingRule]) -> Option<&'a PricingRule> {
        let mut best: Option<&'a PricingRule> = None;
        for &rule in candidates {
            best = match best {
                None => Some(rule),
                Some(current) => {
                    let outranks = rule.priority > current.priority
                        || (rule.priority == current.priority
                            && rule.start_date < current.start_date);
                    if outranks {
                        Some(rule)
                    } else {
                        Some(current)
                    }
                }
            };
        }
        best
    }

    /// Number of active rules held.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
