//! # Error Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ValidationError  bad product / rule / order input, caught at load     │
//! │        │                                                               │
//! │        ▼ #[from]                                                       │
//! │  CoreError        a checkout could not be priced                       │
//! │        │                                                               │
//! │        ▼ #[from]                                                       │
//! │  OrderError       (till-order) intake, config and snapshot failures    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Scanning an unknown SKU, or a SKU no rule matches, is not an error. The
//! engine logs it and reports it through
//! [`ScanOutcome`](crate::checkout::ScanOutcome).

use thiserror::Error;

use crate::types::DiscountType;

pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Core Error
// =============================================================================

/// Failures of the pricing engine itself.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A rule reached the engine without the condition its discount type needs.
    ///
    /// ## When This Occurs
    /// - `BUY_X_GET_Y` without `payQuantity`
    /// - `BULK_DISCOUNT` / `FIXED_PRICE` without `discountedPriceCents`
    /// - `PERCENTAGE_OFF` without `percentageOff`
    ///
    /// Snapshot loading runs
    /// [`validate_pricing_rule`](crate::validation::validate_pricing_rule),
    /// so this only shows up for rules built in code.
    #[error("Pricing rule {rule_id} is missing required condition '{field}'")]
    MalformedRule { rule_id: String, field: String },

    /// The checkout's line arena no longer matches its SKU index.
    #[error("Checkout line state corrupted for {sku}: {reason}")]
    CorruptedLines { sku: String, reason: String },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input rejected before any pricing runs.
///
/// Field names use the camelCase wire names so messages match what the
/// author of a snapshot file wrote.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// A rule lacks the condition its discount type prices with.
    #[error("{discount_type} rules require {field}")]
    MissingCondition {
        discount_type: DiscountType,
        field: String,
    },

    /// A rule's validity window is empty or inverted.
    #[error("endDate must be after startDate")]
    InvalidWindow,
}
