//! # Order Error Types
//!
//! Errors raised while turning a scan list into an order record.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │    Snapshot     │  │        Order            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Io             │  │  UnknownSkus            │ │
//! │  │  ConfigLoad     │  │  TomlDecode     │  │  Core (engine errors)   │ │
//! │  │                 │  │  Validation     │  │  Validation             │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use till_core::{CoreError, ValidationError};

/// Result type alias for order intake.
pub type OrderResult<T> = Result<T, OrderError>;

/// Order intake error type.
#[derive(Debug, Error)]
pub enum OrderError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A config file existed but could not be used.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    // =========================================================================
    // Order Errors
    // =========================================================================
    /// The order scanned SKUs missing from the store snapshot.
    ///
    /// ## When This Occurs
    /// Only when `reject_unknown_skus` is enabled; otherwise such scans are
    /// logged and skipped.
    #[error("Unknown SKUs in order: {}", .0.join(", "))]
    UnknownSkus(Vec<String>),

    /// The pricing engine rejected a scan.
    #[error("Pricing failed: {0}")]
    Core(#[from] CoreError),

    /// Request, product or rule failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    // =========================================================================
    // File Errors
    // =========================================================================
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlDecode(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OrderError {
    /// True for errors caused by the request rather than the environment.
    ///
    /// The CLI maps these to exit code 2.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            OrderError::UnknownSkus(_)
                | OrderError::Validation(_)
                | OrderError::Core(CoreError::Validation(_))
        )
    }
}
