//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `SOUNDSYNC_HOST` - Bind address (default: 127.0.0.1)
//! - `SOUNDSYNC_PORT` - Listen port (default: 3000)
//! - `SOUNDSYNC_DATA_DIR` - Profile directory; unset keeps the profile in memory
//! - `SOUNDSYNC_UPLOAD_DELAY_MS` - Simulated upload time (default: 1500)
//! - `SOUNDSYNC_PAYMENT_DELAY_MS` - Simulated payment setup time (default: 2000)
//! - `SOUNDSYNC_CHECKOUT_DELAY_MS` - Simulated checkout processing time (default: 1000)
//! - `SOUNDSYNC_APPROVAL_TICK_MS` - Mock approver tick interval (default: 5000)
//! - `SOUNDSYNC_APPROVAL_PROBABILITY` - Chance per tick that a pending seller
//!   is approved, 0.0-1.0 (default: 0.3, 0 disables the mock approver)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Profile directory for the file-backed store
    pub data_dir: Option<PathBuf>,
    /// Simulated latencies
    pub delays: SimulatedDelays,
    /// Mock seller approval
    pub approval: ApprovalConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Fixed delays standing in for network round trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedDelays {
    pub upload: Duration,
    pub payment: Duration,
    pub checkout: Duration,
}

impl SimulatedDelays {
    /// No delays at all, for tests.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            upload: Duration::ZERO,
            payment: Duration::ZERO,
            checkout: Duration::ZERO,
        }
    }
}

impl Default for SimulatedDelays {
    fn default() -> Self {
        Self {
            upload: Duration::from_millis(1500),
            payment: Duration::from_millis(2000),
            checkout: Duration::from_millis(1000),
        }
    }
}

/// Mock approver settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApprovalConfig {
    /// How often the approver looks at the pending application
    pub tick: Duration,
    /// Chance per tick of approving, in `0.0..=1.0`
    pub probability: f64,
}

impl ApprovalConfig {
    /// Whether the mock approver should run at all.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.probability > 0.0 && !self.tick.is_zero()
    }
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(5000),
            probability: 0.3,
        }
    }
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            data_dir: None,
            delays: SimulatedDelays::default(),
            approval: ApprovalConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
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
    /// Returns `ConfigError` if a variable is set to an unparseable or
    /// out-of-range value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let defaults = Self::default();

        let host = parse_env_or("SOUNDSYNC_HOST", defaults.host)?;
        let port = parse_env_or("SOUNDSYNC_PORT", defaults.port)?;
        let data_dir = get_optional_env("SOUNDSYNC_DATA_DIR").map(PathBuf::from);

        let delays = SimulatedDelays {
            upload: millis_env_or("SOUNDSYNC_UPLOAD_DELAY_MS", defaults.delays.upload)?,
            payment: millis_env_or("SOUNDSYNC_PAYMENT_DELAY_MS", defaults.delays.payment)?,
            checkout: millis_env_or("SOUNDSYNC_CHECKOUT_DELAY_MS", defaults.delays.checkout)?,
        };

        let approval = ApprovalConfig {
            tick: millis_env_or("SOUNDSYNC_APPROVAL_TICK_MS", defaults.approval.tick)?,
            probability: parse_probability(
                "SOUNDSYNC_APPROVAL_PROBABILITY",
                get_optional_env("SOUNDSYNC_APPROVAL_PROBABILITY"),
                defaults.approval.probability,
            )?,
        };

        Ok(Self {
            host,
            port,
            data_dir,
            delays,
            approval,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

/// Parse an environment variable, falling back to a default when unset.
fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |value| parse_value(key, &value))
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a millisecond duration variable.
fn millis_env_or(key: &str, default: Duration) -> Result<Duration, ConfigError> {
    get_optional_env(key).map_or(Ok(default), |value| {
        parse_value::<u64>(key, &value).map(Duration::from_millis)
    })
}

/// Parse a probability in `0.0..=1.0`.
fn parse_probability(key: &str, value: Option<String>, default: f64) -> Result<f64, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };
    let probability = parse_value::<f64>(key, &value)?;
    if !(0.0..=1.0).contains(&probability) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0 and 1 (got {probability})"),
        ));
    }
    Ok(probability)
}
