//! # till-core: Checkout Pricing for Till
//!
//! Everything needed to price a basket scanned one unit at a time: money,
//! products, pricing rules, and the scan engine. No I/O happens here; the
//! caller supplies the product snapshot and the rules in effect.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Till Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    till-order (order intake)                    │   │
//! │  │   config ──► snapshot ──► effective rules ──► OrderRecord       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ products + rules + SKUs               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ till-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  catalog  │  │ checkout  │  │  pricing  │  │   │
//! │  │   │  Product  │  │ rules_for │  │   scan    │  │apply_rule │  │   │
//! │  │   │   Rule    │  │ priority  │  │   total   │  │   caps    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CLOCK • INTEGER CENTS • TYPED ERRORS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Product, PricingRule, ScannedLine
//! - [`money`] - Integer-cents money and basis-point discount rates
//! - [`catalog`] - Rule lookup and priority tie-breaking
//! - [`pricing`] - Repricing a line for a matched rule
//! - [`checkout`] - The scan engine
//! - [`error`] - Domain error types
//! - [`validation`] - Input checks for products, rules, and orders
//!
//! ## Example Usage
//!
//! ```rust
//! use till_core::{Checkout, DiscountType, Money, PricingRule, Product, RuleCatalog, RuleConditions};
//!
//! let ipd = Product::new("ipd", "Super iPad", Money::from_cents(54999));
//! let bulk = PricingRule::new(
//!     "Bulk iPad",
//!     DiscountType::BulkDiscount,
//!     RuleConditions::at_quantity(5).discounted_price(Money::from_cents(49999)),
//! )
//! .for_skus(["ipd"]);
//!
//! let mut checkout = Checkout::new([ipd], RuleCatalog::new([bulk]));
//! for _ in 0..5 {
//!     checkout.scan("ipd").unwrap();
//! }
//!
//! assert_eq!(checkout.total().to_string(), "$2499.95");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod checkout;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::RuleCatalog;
pub use checkout::{Checkout, ScanOutcome};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{DiscountRate, Money};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Highest `priority` a pricing rule may carry.
pub const MAX_RULE_PRIORITY: u8 = 100;

/// Maximum SKUs accepted in a single order request.
///
/// ## Business Reason
/// Guards against runaway baskets from a misbehaving client.
pub const MAX_ORDER_ITEMS: usize = 500;
