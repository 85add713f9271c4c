//! # Checkout (Scan Engine)
//!
//! Per-order scan state and the incremental rule-matching algorithm.
//!
//! ## Line Arena
//! Lines live in an append-only arena of slots. Each SKU owns at most two
//! slots: one line priced by a rule and one line still at catalog price.
//! Merging vacates a slot; slots are never reused, so receipt order follows
//! the first scan of each group.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  lines:  [ Some(atv ×3, 3-for-2) | Some(vga ×1) | None | Some(atv ×1) ] │
//! │                    ▲                    ▲                     ▲         │
//! │  groups: atv ─ ruled ┘       vga ─ unruled        atv ─ unruled ┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Scan State Machine (per SKU)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  scan(sku)                                                              │
//! │     │                                                                   │
//! │     ├── unknown SKU ─────────────────────────► warn!, no-op             │
//! │     │                                                                   │
//! │     ├── first unit ──► new unruled line (qty 1) ──► threshold check ─┐  │
//! │     │                                                                │  │
//! │     ├── no rules for SKU ──► unruled line qty += 1                   │  │
//! │     │                                                                │  │
//! │     ├── rule with minQuantity == SKU total + 1                       │  │
//! │     │      └── merge ALL lines into one ruled line, reprice          │  │
//! │     │                                                                │  │
//! │     ├── otherwise, unruled line exists ──► qty += 1 ──► threshold    │  │
//! │     │                                                  check ◄──────┘   │
//! │     └── otherwise ──► new unruled line (qty 1), no check                │
//! │                                                                         │
//! │  threshold check: rule with minQuantity == unruled line qty?            │
//! │     └── yes: reprice the unruled line, fold it into the ruled line      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ordering
//! Scans must be applied in the order the units were scanned: threshold
//! checks depend on the quantity accumulated so far. Different SKUs never
//! influence each other.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::catalog::RuleCatalog;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::apply_rule;
use crate::types::{PricingRule, Product, ScannedLine};

// =============================================================================
// Scan Outcome
// =============================================================================

/// What a single scan did to the checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// SKU not in the catalog; nothing changed.
    UnknownSku,

    /// Unit added at its current price, no rule fired.
    Added,

    /// The unit completed a threshold and `rule_id` now prices its group.
    RuleApplied { rule_id: String },
}

// =============================================================================
// SKU Group Index
// =============================================================================

/// Arena slots holding one SKU's lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct SkuGroup {
    ruled: Option<usize>,
    unruled: Option<usize>,
}

impl SkuGroup {
    fn slots(&self) -> impl Iterator<Item = usize> {
        self.ruled.into_iter().chain(self.unruled)
    }
}

// =============================================================================
// Checkout
// =============================================================================

/// One order's checkout: catalog snapshot, rules, and scanned lines.
///
/// ## Example
/// ```rust
/// use till_core::{Checkout, DiscountType, Money, PricingRule, Product, RuleCatalog, RuleConditions};
///
/// let products = [
///     Product::new("atv", "Apple TV", Money::from_cents(10950)),
///     Product::new("vga", "VGA adapter", Money::from_cents(3000)),
/// ];
/// let rules = RuleCatalog::new([PricingRule::new(
///     "3 for 2 on Apple TV",
///     DiscountType::BuyXGetY,
///     RuleConditions::at_quantity(3).pay_for(2),
/// )
/// .for_skus(["atv"])
/// .with_priority(10)]);
///
/// let mut checkout = Checkout::new(products, rules);
/// for sku in ["atv", "atv", "atv", "vga"] {
///     checkout.scan(sku).unwrap();
/// }
/// assert_eq!(checkout.total(), Money::from_cents(24900));
/// ```
#[derive(Debug, Clone)]
pub struct Checkout {
    products: HashMap<String, Product>,
    rules: RuleCatalog,
    lines: Vec<Option<ScannedLine>>,
    groups: HashMap<String, SkuGroup>,
}

impl Checkout {
    /// Creates an empty checkout over a product snapshot and rule set.
    pub fn new(products: impl IntoIterator<Item = Product>, rules: RuleCatalog) -> Self {
        let products: HashMap<String, Product> = products
            .into_iter()
            .map(|p| (p.sku.clone(), p))
            .collect();

        debug!(
            products = products.len(),
            rules = rules.len(),
            "Checkout created"
        );

        Checkout {
            products,
            rules,
            lines: Vec::new(),
            groups: HashMap::new(),
        }
    }

    /// Scans one physical unit of `sku`.
    ///
    /// ## Errors
    /// Only for states the engine cannot price: a rule missing the condition
    /// its discount type needs ([`CoreError::MalformedRule`]) or a corrupted
    /// line arena ([`CoreError::CorruptedLines`]). Unknown SKUs are reported
    /// through [`ScanOutcome::UnknownSku`].
    pub fn scan(&mut self, sku: &str) -> CoreResult<ScanOutcome> {
        let Some(product) = self.products.get(sku).cloned() else {
            warn!(sku = %sku, "Unknown SKU scanned, unit ignored");
            return Ok(ScanOutcome::UnknownSku);
        };

        let rules: Vec<PricingRule> = self.rules.rules_for(sku).into_iter().cloned().collect();
        let group = self.groups.get(sku).copied().unwrap_or_default();

        if group.slots().next().is_none() {
            let slot = self.push_line(ScannedLine::for_product(&product));
            self.groups.insert(
                sku.to_string(),
                SkuGroup {
                    ruled: None,
                    unruled: Some(slot),
                },
            );
            debug!(sku = %sku, slot, "New line");
            return self.promote_unruled(sku, &rules, 1);
        }

        if rules.is_empty() {
            let slot = group
                .unruled
                .or(group.ruled)
                .ok_or_else(|| corrupted(sku, "group has no lines"))?;
            self.line_mut(sku, slot)?.quantity += 1;
            return Ok(ScanOutcome::Added);
        }

        let sku_total = self.group_quantity(sku, group)? + 1;
        let matched = threshold_rules(&rules, sku_total, sku_total);
        if let Some(winner) = RuleCatalog::highest_priority(&matched) {
            return self.merge_group(sku, group, &product, sku_total, winner);
        }

        match group.unruled {
            Some(slot) => {
                self.line_mut(sku, slot)?.quantity += 1;
                self.promote_unruled(sku, &rules, sku_total)
            }
            None => {
                // Not threshold-checked until it grows past one unit.
                let slot = self.push_line(ScannedLine::for_product(&product));
                self.groups.insert(
                    sku.to_string(),
                    SkuGroup {
                        ruled: group.ruled,
                        unruled: Some(slot),
                    },
                );
                debug!(sku = %sku, slot, "New unruled line beside ruled line");
                Ok(ScanOutcome::Added)
            }
        }
    }

    /// Scans every SKU in order, returning one outcome per item.
    pub fn scan_all<I, S>(&mut self, items: I) -> CoreResult<Vec<ScanOutcome>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        items
            .into_iter()
            .map(|sku| self.scan(sku.as_ref()))
            .collect()
    }

    /// Amount due. Zero for an empty checkout.
    pub fn total(&self) -> Money {
        self.lines().map(ScannedLine::line_total).sum()
    }

    /// Catalog price of everything scanned, before rules.
    pub fn subtotal(&self) -> Money {
        self.lines().map(ScannedLine::undiscounted_total).sum()
    }

    /// `subtotal() - total()`.
    pub fn total_discount(&self) -> Money {
        self.subtotal() - self.total()
    }

    /// Current lines in receipt order.
    pub fn lines(&self) -> impl Iterator<Item = &ScannedLine> {
        self.lines.iter().flatten()
    }

    /// Consumes the checkout, returning its lines in receipt order.
    pub fn into_lines(self) -> Vec<ScannedLine> {
        self.lines.into_iter().flatten().collect()
    }

    /// Units scanned so far for `sku` (unknown scans are not counted).
    pub fn quantity_of(&self, sku: &str) -> i64 {
        self.lines()
            .filter(|l| l.sku == sku)
            .map(|l| l.quantity)
            .sum()
    }

    /// True until a known SKU has been scanned.
    pub fn is_empty(&self) -> bool {
        self.lines().next().is_none()
    }

    /// Catalog entry for `sku`, if this checkout can price it.
    pub fn product(&self, sku: &str) -> Option<&Product> {
        self.products.get(sku)
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Collapses every line of `sku` into one line of `quantity` priced by
    /// `rule`, kept in the group's earliest slot.
    fn merge_group(
        &mut self,
        sku: &str,
        group: SkuGroup,
        product: &Product,
        quantity: i64,
        rule: &PricingRule,
    ) -> CoreResult<ScanOutcome> {
        let mut merged = ScannedLine::for_product(product);
        merged.quantity = quantity;
        apply_rule(&mut merged, rule)?;

        let keep = group
            .slots()
            .min()
            .ok_or_else(|| corrupted(sku, "group has no lines"))?;
        for slot in group.slots().filter(|&s| s != keep) {
            self.vacate(sku, slot)?;
        }
        *self.line_mut(sku, keep)? = merged;

        self.groups.insert(
            sku.to_string(),
            SkuGroup {
                ruled: Some(keep),
                unruled: None,
            },
        );

        info!(
            sku = %sku,
            rule_id = %rule.id,
            rule = %rule.name,
            quantity,
            "Pricing rule applied to merged group"
        );
        Ok(ScanOutcome::RuleApplied {
            rule_id: rule.id.clone(),
        })
    }

    /// Reprices the unruled line if its own quantity hits a threshold, then
    /// folds it into the SKU's ruled line.
    fn promote_unruled(
        &mut self,
        sku: &str,
        rules: &[PricingRule],
        sku_total: i64,
    ) -> CoreResult<ScanOutcome> {
        let group = self
            .groups
            .get(sku)
            .copied()
            .ok_or_else(|| corrupted(sku, "group missing after scan"))?;
        let Some(slot) = group.unruled else {
            return Ok(ScanOutcome::Added);
        };

        let quantity = self.line(sku, slot)?.quantity;
        let matched = threshold_rules(rules, quantity, sku_total);
        let Some(rule) = RuleCatalog::highest_priority(&matched) else {
            return Ok(ScanOutcome::Added);
        };

        let mut promoted = self.line(sku, slot)?.clone();
        apply_rule(&mut promoted, rule)?;

        let ruled = match group.ruled {
            None => {
                *self.line_mut(sku, slot)? = promoted;
                slot
            }
            Some(ruled_slot) => {
                fold_into(self.line_mut(sku, ruled_slot)?, promoted);
                self.vacate(sku, slot)?;
                ruled_slot
            }
        };

        self.groups.insert(
            sku.to_string(),
            SkuGroup {
                ruled: Some(ruled),
                unruled: None,
            },
        );

        info!(
            sku = %sku,
            rule_id = %rule.id,
            rule = %rule.name,
            quantity,
            "Pricing rule applied to unruled units"
        );
        Ok(ScanOutcome::RuleApplied {
            rule_id: rule.id.clone(),
        })
    }

    // =========================================================================
    // Arena Access
    // =========================================================================

    fn push_line(&mut self, line: ScannedLine) -> usize {
        self.lines.push(Some(line));
        self.lines.len() - 1
    }

    fn line(&self, sku: &str, slot: usize) -> CoreResult<&ScannedLine> {
        self.lines
            .get(slot)
            .and_then(Option::as_ref)
            .ok_or_else(|| corrupted(sku, format!("slot {slot} is vacant")))
    }

    fn line_mut(&mut self, sku: &str, slot: usize) -> CoreResult<&mut ScannedLine> {
        self.lines
            .get_mut(slot)
            .and_then(Option::as_mut)
            .ok_or_else(|| corrupted(sku, format!("slot {slot} is vacant")))
    }

    fn vacate(&mut self, sku: &str, slot: usize) -> CoreResult<ScannedLine> {
        self.lines
            .get_mut(slot)
            .and_then(Option::take)
            .ok_or_else(|| corrupted(sku, format!("slot {slot} is vacant")))
    }

    fn group_quantity(&self, sku: &str, group: SkuGroup) -> CoreResult<i64> {
        group
            .slots()
            .map(|slot| self.line(sku, slot).map(|l| l.quantity))
            .sum()
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Rules firing at exactly `quantity`, still under their `maxQuantity` given
/// the SKU's `sku_total` scanned units.
fn threshold_rules(rules: &[PricingRule], quantity: i64, sku_total: i64) -> Vec<&PricingRule> {
    rules
        .iter()
        .filter(|r| r.conditions.min_quantity == quantity)
        .filter(|r| r.conditions.max_quantity.map_or(true, |max| sku_total <= max))
        .collect()
}

/// Adds a freshly promoted line to the SKU's ruled line.
///
/// The ruled line keeps its slot. Both parts keep the price they were given;
/// if they don't share a plain per-unit price, the sum becomes a line total.
/// `rules_applied` names the newest rule; `credits` keeps every rule's share.
fn fold_into(ruled: &mut ScannedLine, promoted: ScannedLine) {
    let shares_unit_price = ruled.total_price_cents.is_none()
        && promoted.total_price_cents.is_none()
        && ruled.modified_unit_price_cents == promoted.modified_unit_price_cents;
    let combined = ruled.line_total() + promoted.line_total();

    ruled.quantity += promoted.quantity;
    ruled.rules_applied = promoted.rules_applied;
    ruled.absorb_credits(promoted.credits);
    if !shares_unit_price {
        ruled.total_price_cents = Some(combined.cents());
        ruled.modified_unit_price_cents = None;
    }
}

fn corrupted(sku: &str, reason: impl Into<String>) -> CoreError {
    CoreError::CorruptedLines {
        sku: sku.to_string(),
        reason: reason.into(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
