//! Storefront cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `STOREFRONT_API_BASE_URL` - Base URL of the `/api/*` endpoints (default: `http://127.0.0.1:3000`)
//! - `STOREFRONT_API_TOKEN` - Bearer token for the notification endpoints
//! - `STOREFRONT_CHECKOUT_URL` - Link sent in WhatsApp reminders (default: `{base}/checkout`)
//! - `STOREFRONT_CURRENCY` - Display currency (default: BRL)
//! - `STOREFRONT_FREE_SHIPPING_THRESHOLD` - Free-shipping threshold (default: 199.00)
//! - `STOREFRONT_ABANDONMENT_EMAIL_DELAY_SECS` - Email tier delay (default: 900)
//! - `STOREFRONT_ABANDONMENT_WHATSAPP_DELAY_SECS` - WhatsApp tier delay (default: 1800)
//! - `STOREFRONT_NOTIFY_TIMEOUT_SECS` - HTTP timeout for notifications (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::time::Duration;

use aurora_core::CurrencyCode;
use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::signals::DEFAULT_FREE_SHIPPING_THRESHOLD;

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3000";
const DEFAULT_EMAIL_DELAY_SECS: u64 = 15 * 60;
const DEFAULT_WHATSAPP_DELAY_SECS: u64 = 30 * 60;
const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 10;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Cart core configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Notification endpoint configuration
    pub notify: NotifyConfig,
    /// Checkout page linked from reminders
    pub checkout_url: Url,
    /// Display currency for prices
    pub currency: CurrencyCode,
    /// Cart total at which shipping becomes free
    pub free_shipping_threshold: Decimal,
    /// Abandonment tier delays
    pub abandonment: AbandonmentConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Notification endpoint configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct NotifyConfig {
    /// Base URL; `/api/email` and `/api/whatsapp` are resolved against it
    pub base_url: Url,
    /// Optional bearer token
    pub api_token: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for NotifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyConfig")
            .field("base_url", &self.base_url.as_str())
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// How long a cart must sit untouched before each tier fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbandonmentConfig {
    pub email_delay: Duration,
    pub whatsapp_delay: Duration,
}

impl Default for AbandonmentConfig {
    fn default() -> Self {
        Self {
            email_delay: Duration::from_secs(DEFAULT_EMAIL_DELAY_SECS),
            whatsapp_delay: Duration::from_secs(DEFAULT_WHATSAPP_DELAY_SECS),
        }
    }
}

impl AbandonmentConfig {
    /// Divide both delays by `factor`, for accelerated replays.
    #[must_use]
    pub fn accelerated(self, factor: u32) -> Self {
        let factor = factor.max(1);
        Self {
            email_delay: self.email_delay / factor,
            whatsapp_delay: self.whatsapp_delay / factor,
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
    /// Returns `ConfigError` if a variable is present but invalid, or if the
    /// API token fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(&lookup);

        let base_url = vars.parse_or(
            "STOREFRONT_API_BASE_URL",
            || Url::parse(DEFAULT_API_BASE_URL),
            Url::parse,
        )?;
        let api_token = vars
            .get("STOREFRONT_API_TOKEN")
            .map(|token| validated_secret(token, "STOREFRONT_API_TOKEN"))
            .transpose()?;
        let timeout = Duration::from_secs(vars.parse_or(
            "STOREFRONT_NOTIFY_TIMEOUT_SECS",
            || Ok::<_, std::num::ParseIntError>(DEFAULT_NOTIFY_TIMEOUT_SECS),
            str::parse,
        )?);

        let checkout_url = vars.parse_or(
            "STOREFRONT_CHECKOUT_URL",
            || base_url.join("checkout"),
            Url::parse,
        )?;
        let currency = vars.parse_or(
            "STOREFRONT_CURRENCY",
            || Ok::<_, String>(CurrencyCode::default()),
            str::parse,
        )?;
        let free_shipping_threshold = vars.parse_or(
            "STOREFRONT_FREE_SHIPPING_THRESHOLD",
            || Ok::<_, rust_decimal::Error>(DEFAULT_FREE_SHIPPING_THRESHOLD),
            str::parse,
        )?;

        let abandonment = AbandonmentConfig {
            email_delay: vars.delay(
                "STOREFRONT_ABANDONMENT_EMAIL_DELAY_SECS",
                DEFAULT_EMAIL_DELAY_SECS,
            )?,
            whatsapp_delay: vars.delay(
                "STOREFRONT_ABANDONMENT_WHATSAPP_DELAY_SECS",
                DEFAULT_WHATSAPP_DELAY_SECS,
            )?,
        };

        Ok(Self {
            notify: NotifyConfig {
                base_url,
                api_token,
                timeout,
            },
            checkout_url,
            currency,
            free_shipping_threshold,
            abandonment,
            sentry_dsn: vars.get("SENTRY_DSN"),
            sentry_environment: vars.get("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Vars<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Vars<'_, F> {
    /// Get a variable, treating blank values as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Parse a variable, or compute the default when it is unset.
    fn parse_or<T, E: std::fmt::Display>(
        &self,
        key: &str,
        default: impl FnOnce() -> Result<T, E>,
        parse: impl FnOnce(&str) -> Result<T, E>,
    ) -> Result<T, ConfigError> {
        let result = match self.get(key) {
            Some(value) => parse(value.trim()),
            None => default(),
        };
        result.map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }

    /// Parse a positive number of seconds.
    fn delay(&self, key: &str, default_secs: u64) -> Result<Duration, ConfigError> {
        let secs = self.parse_or(
            key,
            || Ok::<_, std::num::ParseIntError>(default_secs),
            str::parse,
        )?;
        if secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        Ok(Duration::from_secs(secs))
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // Token length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Reject placeholder or low-entropy tokens.
fn validated_secret(secret: String, var_name: &str) -> Result<SecretString, ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(&secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated token."
            ),
        ));
    }

    Ok(SecretString::from(secret))
}
