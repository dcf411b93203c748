//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `FLAWLESS_DATA_DIR` - Directory for device storage and document collections (default: `.flawless`)
//! - `FLAWLESS_BRAND_NAME` - Brand shown in order messages (default: Flawless)
//! - `FLAWLESS_WHATSAPP_NUMBER` - Number orders are handed off to (default: +233200591693)
//! - `FLAWLESS_CURRENCY` - ISO currency code prices are shown in (default: GHS)

use std::path::PathBuf;

use thiserror::Error;

use flawless_core::CurrencyCode;

const DEFAULT_DATA_DIR: &str = ".flawless";
const DEFAULT_BRAND_NAME: &str = "Flawless";
const DEFAULT_WHATSAPP_NUMBER: &str = "+233200591693";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Root directory for local storage
    pub data_dir: PathBuf,
    /// Brand and order hand-off settings
    pub brand: BrandConfig,
}

/// Brand identity used when composing orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandConfig {
    /// Brand name (e.g., "Flawless")
    pub name: String,
    /// WhatsApp number in international format (e.g., +233200591693)
    pub whatsapp_number: String,
    /// Display currency
    pub currency: CurrencyCode,
}

impl Default for BrandConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_BRAND_NAME.to_owned(),
            whatsapp_number: DEFAULT_WHATSAPP_NUMBER.to_owned(),
            currency: CurrencyCode::GHS,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get_or_default = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_owned())
        };

        let data_dir = PathBuf::from(get_or_default("FLAWLESS_DATA_DIR", DEFAULT_DATA_DIR));
        let name = get_or_default("FLAWLESS_BRAND_NAME", DEFAULT_BRAND_NAME);

        let whatsapp_number = get_or_default("FLAWLESS_WHATSAPP_NUMBER", DEFAULT_WHATSAPP_NUMBER);
        validate_phone(&whatsapp_number, "FLAWLESS_WHATSAPP_NUMBER")?;

        let currency = get_or_default("FLAWLESS_CURRENCY", CurrencyCode::GHS.code())
            .parse::<CurrencyCode>()
            .map_err(|e| ConfigError::InvalidEnvVar("FLAWLESS_CURRENCY".to_string(), e.to_string()))?;

        Ok(Self {
            data_dir,
            brand: BrandConfig {
                name,
                whatsapp_number,
                currency,
            },
        })
    }

    /// Directory holding device-local key-value storage (cart, session).
    #[must_use]
    pub fn device_dir(&self) -> PathBuf {
        self.data_dir.join("device")
    }
}

/// A hand-off number is an optional `+` followed by digits.
fn validate_phone(value: &str, var_name: &str) -> Result<(), ConfigError> {
    let digits = value.strip_prefix('+').unwrap_or(value);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("expected international phone number, got {value:?}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.data_dir, PathBuf::from(".flawless"));
        assert_eq!(config.brand, BrandConfig::default());
        assert_eq!(config.brand.whatsapp_number, "+233200591693");
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("FLAWLESS_DATA_DIR", "/var/lib/flawless"),
            ("FLAWLESS_BRAND_NAME", "FLWS"),
            ("FLAWLESS_WHATSAPP_NUMBER", "233500000000"),
            ("FLAWLESS_CURRENCY", "usd"),
        ])
        .unwrap();

        assert_eq!(config.device_dir(), PathBuf::from("/var/lib/flawless/device"));
        assert_eq!(config.brand.name, "FLWS");
        assert_eq!(config.brand.currency, CurrencyCode::USD);
    }

    #[test]
    fn test_blank_values_fall_back() {
        let config = config_from(&[("FLAWLESS_BRAND_NAME", "   ")]).unwrap();
        assert_eq!(config.brand.name, "Flawless");
    }

    #[test]
    fn test_invalid_currency() {
        let err = config_from(&[("FLAWLESS_CURRENCY", "XYZ")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(var, _) if var == "FLAWLESS_CURRENCY"));
    }

    #[test]
    fn test_invalid_phone() {
        assert!(config_from(&[("FLAWLESS_WHATSAPP_NUMBER", "+233 20 059")]).is_err());
        assert!(config_from(&[("FLAWLESS_WHATSAPP_NUMBER", "+")]).is_err());
    }
}
