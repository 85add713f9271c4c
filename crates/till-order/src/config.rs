//! # Order Configuration
//!
//! Settings for order intake and the `till-checkout` driver.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TILL_STORE_NAME="Downtown"                                         │
//! │     TILL_REJECT_UNKNOWN_SKUS=false                                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config PATH, or                                                  │
//! │     ~/.config/till/till.toml (Linux)                                   │
//! │     ~/Library/Application Support/com.till.checkout/till.toml (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! name = "Downtown Branch"
//! currency_symbol = "$"
//!
//! [checkout]
//! reject_unknown_skus = true
//! seed_opening_rules = true
//! opening_rules_months = 3
//! snapshot_path = "/srv/till/catalog.toml"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use till_core::Money;
use tracing::{debug, info, warn};

use crate::error::{OrderError, OrderResult};

/// Longest opening promotion window accepted, in months.
const MAX_OPENING_MONTHS: u32 = 24;

// =============================================================================
// Store Settings
// =============================================================================

/// Store identity used on order output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_store_name")]
    pub name: String,

    /// Prefix for rendered amounts (e.g. "$", "€").
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_store_name() -> String {
    "Till Demo Store".to_string()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: default_store_name(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

// =============================================================================
// Checkout Settings
// =============================================================================

/// How orders are priced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSettings {
    /// Fail the whole order when a scanned SKU is not in the catalog.
    /// When false, unknown scans are logged and skipped.
    #[serde(default = "default_true")]
    pub reject_unknown_skus: bool,

    /// Use the store-opening promotions when the snapshot carries no rules.
    #[serde(default = "default_true")]
    pub seed_opening_rules: bool,

    /// Length of the opening promotion window.
    #[serde(default = "default_opening_months")]
    pub opening_rules_months: u32,

    /// Catalog snapshot file. The built-in demo catalog is used when unset.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_opening_months() -> u32 {
    3
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        CheckoutSettings {
            reject_unknown_skus: true,
            seed_opening_rules: true,
            opening_rules_months: default_opening_months(),
            snapshot_path: None,
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete order intake configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub checkout: CheckoutSettings,
}

impl OrderConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (explicit path, else `till.toml` in the config dir)
    /// 3. Environment variables
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file is not.
    pub fn load(config_path: Option<PathBuf>) -> OrderResult<Self> {
        let mut config = Self::default();

        match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(OrderError::ConfigLoadFailed(format!(
                        "{} does not exist",
                        path.display()
                    )));
                }
                config = Self::read_file(&path)?;
            }
            None => {
                if let Some(path) = Self::default_config_path() {
                    if path.exists() {
                        config = Self::read_file(&path)?;
                    } else {
                        debug!(?path, "Config file not found, using defaults");
                    }
                }
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Writes the configuration as TOML.
    pub fn save(&self, config_path: Option<PathBuf>) -> OrderResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| OrderError::ConfigLoadFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Order config saved");
        Ok(())
    }

    pub fn validate(&self) -> OrderResult<()> {
        if self.store.name.trim().is_empty() {
            return Err(OrderError::InvalidConfig("store.name must not be empty".into()));
        }

        if self.store.currency_symbol.is_empty() || self.store.currency_symbol.chars().count() > 3
        {
            return Err(OrderError::InvalidConfig(format!(
                "store.currency_symbol must be 1-3 characters, got '{}'",
                self.store.currency_symbol
            )));
        }

        let months = self.checkout.opening_rules_months;
        if months == 0 || months > MAX_OPENING_MONTHS {
            return Err(OrderError::InvalidConfig(format!(
                "checkout.opening_rules_months must be between 1 and {}, got {}",
                MAX_OPENING_MONTHS, months
            )));
        }

        Ok(())
    }

    /// Renders an amount with the configured currency symbol.
    pub fn format_money(&self, amount: Money) -> String {
        let sign = if amount.cents() < 0 { "-" } else { "" };
        format!(
            "{}{}{}.{:02}",
            sign,
            self.store.currency_symbol,
            amount.dollars().abs(),
            amount.cents_part()
        )
    }

    fn read_file(path: &std::path::Path) -> OrderResult<Self> {
        info!(?path, "Loading order config from file");
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `TILL_*` overrides read through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(name) = lookup("TILL_STORE_NAME") {
            debug!(store = %name, "Overriding store name from environment");
            self.store.name = name;
        }

        if let Some(symbol) = lookup("TILL_CURRENCY_SYMBOL") {
            self.store.currency_symbol = symbol;
        }

        if let Some(value) = lookup("TILL_REJECT_UNKNOWN_SKUS") {
            match parse_flag(&value) {
                Some(flag) => self.checkout.reject_unknown_skus = flag,
                None => warn!(value = %value, "Ignoring non-boolean TILL_REJECT_UNKNOWN_SKUS"),
            }
        }

        if let Some(value) = lookup("TILL_SEED_OPENING_RULES") {
            match parse_flag(&value) {
                Some(flag) => self.checkout.seed_opening_rules = flag,
                None => warn!(value = %value, "Ignoring non-boolean TILL_SEED_OPENING_RULES"),
            }
        }

        if let Some(value) = lookup("TILL_OPENING_RULES_MONTHS") {
            match value.parse::<u32>() {
                Ok(months) => self.checkout.opening_rules_months = months,
                Err(_) => warn!(value = %value, "Ignoring non-numeric TILL_OPENING_RULES_MONTHS"),
            }
        }

        if let Some(path) = lookup("TILL_SNAPSHOT_PATH") {
            debug!(path = %path, "Overriding snapshot path from environment");
            self.checkout.snapshot_path = Some(PathBuf::from(path));
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "till", "checkout")
            .map(|dirs| dirs.config_dir().join("till.toml"))
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn overrides(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = OrderConfig::default();
        assert!(config.checkout.reject_unknown_skus);
        assert!(config.checkout.seed_opening_rules);
        assert_eq!(config.checkout.opening_rules_months, 3);
        assert!(config.checkout.snapshot_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: OrderConfig = toml::from_str(
            r#"
            [store]
            name = "Downtown"
            "#,
        )
        .unwrap();
        assert_eq!(config.store.name, "Downtown");
        assert_eq!(config.store.currency_symbol, "$");
        assert_eq!(config.checkout.opening_rules_months, 3);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = OrderConfig::default();
        config.apply_overrides(overrides(&[
            ("TILL_STORE_NAME", "Airport"),
            ("TILL_REJECT_UNKNOWN_SKUS", "false"),
            ("TILL_OPENING_RULES_MONTHS", "6"),
            ("TILL_SNAPSHOT_PATH", "/tmp/catalog.toml"),
        ]));

        assert_eq!(config.store.name, "Airport");
        assert!(!config.checkout.reject_unknown_skus);
        assert_eq!(config.checkout.opening_rules_months, 6);
        assert_eq!(
            config.checkout.snapshot_path,
            Some(PathBuf::from("/tmp/catalog.toml"))
        );
    }

    #[test]
    fn test_bad_env_values_are_ignored() {
        let mut config = OrderConfig::default();
        config.apply_overrides(overrides(&[
            ("TILL_SEED_OPENING_RULES", "maybe"),
            ("TILL_OPENING_RULES_MONTHS", "lots"),
        ]));
        assert!(config.checkout.seed_opening_rules);
        assert_eq!(config.checkout.opening_rules_months, 3);
    }

    #[test]
    fn test_config_validation() {
        let mut config = OrderConfig::default();

        config.store.name = "  ".into();
        assert!(config.validate().is_err());

        config.store.name = "Store".into();
        config.store.currency_symbol = "EURO".into();
        assert!(config.validate().is_err());

        config.store.currency_symbol = "€".into();
        config.checkout.opening_rules_months = 0;
        assert!(config.validate().is_err());

        config.checkout.opening_rules_months = 12;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_format_money() {
        let mut config = OrderConfig::default();
        assert_eq!(config.format_money(Money::from_cents(24900)), "$249.00");
        config.store.currency_symbol = "€".into();
        assert_eq!(config.format_money(Money::from_cents(-5)), "-€0.05");
    }

    #[test]
    fn test_explicit_missing_path_fails() {
        let path = std::env::temp_dir().join(format!("till-missing-{}.toml", uuid::Uuid::new_v4()));
        assert!(matches!(
            OrderConfig::load(Some(path)),
            Err(OrderError::ConfigLoadFailed(_))
        ));
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("till-config-{}.toml", uuid::Uuid::new_v4()));
        let mut config = OrderConfig::default();
        config.store.name = "Saved Store".into();
        config.checkout.opening_rules_months = 5;
        config.save(Some(path.clone())).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("[store]"));
        assert!(text.contains("[checkout]"));

        let loaded: OrderConfig = toml::from_str(&text).unwrap();
        assert_eq!(loaded.store.name, "Saved Store");
        assert_eq!(loaded.checkout.opening_rules_months, 5);

        std::fs::remove_file(&path).ok();
    }
}
