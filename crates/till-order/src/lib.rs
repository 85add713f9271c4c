//! # till-order: Order Intake for Till
//!
//! Everything around the pricing engine that touches the outside world:
//! configuration, catalog snapshot files, rule windows against the clock,
//! and the order record handed back to callers.
//!
//! ## Module Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  config    OrderConfig: defaults → till.toml → TILL_* env              │
//! │  snapshot  StoreSnapshot: products + rules from TOML, or demo data     │
//! │  rules     effective_rules (date/SKU filter), opening_rules            │
//! │  order     OrderService::create_order → OrderRecord                    │
//! │  error     OrderError                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use chrono::Utc;
//! use till_order::{OrderConfig, OrderRequest, OrderService, StoreSnapshot};
//!
//! let mut config = OrderConfig::default();
//! config.checkout.seed_opening_rules = false;
//!
//! let service = OrderService::new(config, StoreSnapshot::demo(), Utc::now());
//! let order = service
//!     .create_order(OrderRequest::new("Ada", ["ipd", "ipd"]), Utc::now())
//!     .unwrap();
//!
//! assert_eq!(order.total_cents, 109998);
//! ```

pub mod config;
pub mod error;
pub mod order;
pub mod rules;
pub mod snapshot;

pub use config::OrderConfig;
pub use error::{OrderError, OrderResult};
pub use order::{AppliedRule, OrderItem, OrderRecord, OrderRequest, OrderService, OrderStatus};
pub use snapshot::StoreSnapshot;
