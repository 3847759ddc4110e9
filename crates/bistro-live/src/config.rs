//! # Bistro Configuration
//!
//! Pricing, rate limiting and realtime settings for a restaurant instance.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BISTRO_VAT_RATE=0.075                                              │
//! │     BISTRO_DELIVERY_FEE=60                                             │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/bistro/bistro.toml (Linux)                               │
//! │     ~/Library/Application Support/com.bistro.bistro/bistro.toml (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     5% VAT, fee 5, free delivery from 875, 60 requests / minute        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [restaurant]
//! name = "Bistro Dhanmondi"
//! currency_symbol = "৳"
//!
//! [pricing]
//! discount_rate = 0.0
//! vat_rate = 0.05
//! delivery_fee = 5.0
//! free_delivery_threshold = 875.0
//! payment_method = "delivery"
//!
//! [rate_limit]
//! max_requests = 60
//! window_secs = 60
//!
//! [realtime]
//! channel_capacity = 256
//! ```

use std::path::PathBuf;

use bistro_core::validation::validate_rate;
use bistro_core::{Money, RateConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{LiveError, LiveResult};

// =============================================================================
// Restaurant Settings
// =============================================================================

/// Display settings for the restaurant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantSettings {
    #[serde(default = "default_restaurant_name")]
    pub name: String,

    /// Prefix used when formatting amounts.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_restaurant_name() -> String {
    "Bistro".to_string()
}

fn default_currency_symbol() -> String {
    "৳".to_string()
}

impl Default for RestaurantSettings {
    fn default() -> Self {
        RestaurantSettings {
            name: default_restaurant_name(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

// =============================================================================
// Rate Limit Settings
// =============================================================================

/// Fixed request budget per client key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Requests allowed per window.
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

fn default_max_requests() -> u32 {
    60
}

fn default_window_secs() -> u64 {
    60
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        RateLimitSettings {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
        }
    }
}

// =============================================================================
// Realtime Settings
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealtimeSettings {
    /// Buffered change events per feed before slow subscribers lag.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_channel_capacity() -> usize {
    256
}

impl Default for RealtimeSettings {
    fn default() -> Self {
        RealtimeSettings {
            channel_capacity: default_channel_capacity(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BistroConfig {
    #[serde(default)]
    pub restaurant: RestaurantSettings,

    /// Default rates for new orders.
    #[serde(default)]
    pub pricing: RateConfig,

    #[serde(default)]
    pub rate_limit: RateLimitSettings,

    #[serde(default)]
    pub realtime: RealtimeSettings,
}

impl BistroConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (bistro.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> LiveResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> LiveResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| LiveError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| LiveError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| LiveError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Validates the configuration.
    ///
    /// Values are checked as written; the calculator would silently clamp
    /// them, which is the wrong outcome for a typo in a config file.
    pub fn validate(&self) -> LiveResult<()> {
        let pricing = &self.pricing;

        validate_rate("discount_rate", pricing.discount_rate)
            .and_then(|_| validate_rate("vat_rate", pricing.vat_rate))
            .map_err(|e| LiveError::InvalidConfig(e.to_string()))?;

        for (field, value) in [
            ("delivery_fee", pricing.delivery_fee),
            ("free_delivery_threshold", pricing.free_delivery_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(LiveError::InvalidConfig(format!(
                    "{} must be a non-negative number, got {}",
                    field, value
                )));
            }
        }

        if self.rate_limit.max_requests == 0 || self.rate_limit.window_secs == 0 {
            return Err(LiveError::InvalidConfig(
                "rate_limit.max_requests and rate_limit.window_secs must be greater than 0".into(),
            ));
        }

        if self.realtime.channel_capacity == 0 {
            return Err(LiveError::InvalidConfig(
                "realtime.channel_capacity must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup.
    ///
    /// Unparseable values are logged and skipped.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse_f64 = |key: &str| -> Option<f64> {
            let raw = lookup(key)?;
            match raw.trim().parse::<f64>() {
                Ok(v) => {
                    debug!(key, value = v, "Overriding from environment");
                    Some(v)
                }
                Err(_) => {
                    warn!(key, value = %raw, "Ignoring unparseable override");
                    None
                }
            }
        };

        if let Some(v) = parse_f64("BISTRO_DISCOUNT_RATE") {
            self.pricing.discount_rate = v;
        }
        if let Some(v) = parse_f64("BISTRO_VAT_RATE") {
            self.pricing.vat_rate = v;
        }
        if let Some(v) = parse_f64("BISTRO_DELIVERY_FEE") {
            self.pricing.delivery_fee = v;
        }
        if let Some(v) = parse_f64("BISTRO_FREE_DELIVERY_THRESHOLD") {
            self.pricing.free_delivery_threshold = v;
        }

        if let Some(raw) = lookup("BISTRO_RATE_LIMIT_MAX") {
            match raw.trim().parse::<u32>() {
                Ok(v) => self.rate_limit.max_requests = v,
                Err(_) => warn!(value = %raw, "Ignoring unparseable BISTRO_RATE_LIMIT_MAX"),
            }
        }

        if let Some(raw) = lookup("BISTRO_RATE_LIMIT_WINDOW_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(v) => self.rate_limit.window_secs = v,
                Err(_) => warn!(value = %raw, "Ignoring unparseable BISTRO_RATE_LIMIT_WINDOW_SECS"),
            }
        }

        if let Some(symbol) = lookup("BISTRO_CURRENCY_SYMBOL") {
            self.restaurant.currency_symbol = symbol;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "bistro", "bistro")
            .map(|dirs| dirs.config_dir().join("bistro.toml"))
    }

    /// Formats an amount with the restaurant's currency symbol.
    ///
    /// ```rust
    /// use bistro_live::BistroConfig;
    ///
    /// let config = BistroConfig::default();
    /// assert_eq!(config.format_currency(183.5), "৳183.50");
    /// ```
    pub fn format_currency(&self, amount: f64) -> String {
        format!(
            "{}{}",
            self.restaurant.currency_symbol,
            Money::from_amount(amount)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bistro_core::PaymentMethod;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = BistroConfig::default();
        assert_eq!(config.pricing, RateConfig::default());
        assert_eq!(config.rate_limit.max_requests, 60);
        assert_eq!(config.realtime.channel_capacity, 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: BistroConfig = toml::from_str(
            r#"
            [restaurant]
            name = "Bistro Gulshan"

            [pricing]
            vat_rate = 0.075
            payment_method = "pickup"
            "#,
        )
        .unwrap();

        assert_eq!(config.restaurant.name, "Bistro Gulshan");
        assert_eq!(config.restaurant.currency_symbol, "৳");
        assert_eq!(config.pricing.vat_rate, 0.075);
        assert_eq!(config.pricing.delivery_fee, 5.0);
        assert_eq!(config.pricing.payment_method, PaymentMethod::Pickup);
        assert_eq!(config.rate_limit, RateLimitSettings::default());
    }

    #[test]
    fn test_config_validation() {
        let mut config = BistroConfig::default();

        config.pricing.vat_rate = 1.5;
        assert!(config.validate().is_err());

        config.pricing.vat_rate = 0.05;
        config.pricing.delivery_fee = -1.0;
        assert!(config.validate().is_err());

        config.pricing.delivery_fee = 5.0;
        config.rate_limit.window_secs = 0;
        assert!(config.validate().is_err());

        config.rate_limit.window_secs = 60;
        config.realtime.channel_capacity = 0;
        assert!(matches!(config.validate(), Err(LiveError::InvalidConfig(_))));
    }

    #[test]
    fn test_overrides() {
        let mut config = BistroConfig::default();
        config.apply_overrides(lookup_from(&[
            ("BISTRO_VAT_RATE", "0.1"),
            ("BISTRO_DELIVERY_FEE", " 60 "),
            ("BISTRO_FREE_DELIVERY_THRESHOLD", "lots"),
            ("BISTRO_RATE_LIMIT_MAX", "5"),
            ("BISTRO_CURRENCY_SYMBOL", "Tk "),
        ]));

        assert_eq!(config.pricing.vat_rate, 0.1);
        assert_eq!(config.pricing.delivery_fee, 60.0);
        assert_eq!(config.pricing.free_delivery_threshold, 875.0);
        assert_eq!(config.rate_limit.max_requests, 5);
        assert_eq!(config.format_currency(12.0), "Tk 12.00");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join(format!("bistro-missing-{}.toml", std::process::id()));
        let config = BistroConfig::load(Some(path)).unwrap();
        assert_eq!(config.restaurant.name, "Bistro");
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir()
            .join(format!("bistro-config-{}", std::process::id()))
            .join("bistro.toml");

        let mut config = BistroConfig::default();
        config.restaurant.name = "Bistro Banani".to_string();
        config.pricing.discount_rate = 0.1;
        config.save(Some(path.clone())).unwrap();

        let loaded = BistroConfig::load(Some(path.clone())).unwrap();
        assert_eq!(loaded.restaurant.name, "Bistro Banani");
        assert_eq!(loaded.pricing.discount_rate, 0.1);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let path = std::env::temp_dir().join(format!("bistro-broken-{}.toml", std::process::id()));
        std::fs::write(&path, "[pricing]\nvat_rate = \"high\"").unwrap();

        assert!(BistroConfig::load(Some(path.clone())).is_err());
        assert_eq!(BistroConfig::load_or_default(Some(path.clone())), BistroConfig::default());

        let _ = std::fs::remove_file(&path);
    }
}
