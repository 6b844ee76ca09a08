//! # Configuration - Thresholds, Cooldowns, and Delivery Settings
//!
//! The whole tunable surface of the pipeline in one struct. Defaults are
//! production values; deployments override them through `SENTINEL_`
//! prefixed environment variables or an optional `sentinel.toml` file,
//! with a `.env` file picked up first when present.
//!
//! An empty webhook URL disables outbound delivery entirely. That is the
//! supported shape for local runs and unit tests, not an error.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{Result, SentinelError};

/// Fallback disk cooldown applied when the configured value is zero.
/// Disk saturation evolves slowly, so repeats are spaced further apart
/// than the default cooldown.
const DISK_COOLDOWN_FALLBACK: Duration = Duration::from_secs(15 * 60);

/// Pipeline configuration: rule thresholds, spacing, and webhook delivery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentinelConfig {
    /// CPU utilization threshold in percent; strict comparison
    pub cpu_threshold: f64,
    /// Memory utilization threshold in percent; strict comparison
    pub mem_threshold: f64,
    /// Disk utilization threshold in percent; strict comparison
    pub disk_threshold: f64,
    /// Minimum spacing between repeat alerts for one (rule, subject) key
    pub default_cooldown: Duration,
    /// Spacing for disk alerts; zero substitutes the 15-minute fallback
    pub disk_cooldown: Duration,
    /// Error count that constitutes a burst within the window
    pub burst_threshold: usize,
    /// Sliding-window horizon for burst counting
    pub burst_window: Duration,
    /// Outbound webhook URL; empty disables delivery
    pub webhook_url: String,
    /// Bound on each webhook POST
    pub webhook_timeout: Duration,
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            cpu_threshold: 90.0,
            mem_threshold: 85.0,
            disk_threshold: 90.0,
            default_cooldown: Duration::from_secs(300), // 5 minutes
            disk_cooldown: Duration::from_secs(900),    // 15 minutes
            burst_threshold: 5,
            burst_window: Duration::from_secs(30),
            webhook_url: String::new(),
            webhook_timeout: Duration::from_secs(10),
        }
    }
}

/// Raw environment/file settings before duration conversion
#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    cpu_threshold: Option<f64>,
    mem_threshold: Option<f64>,
    disk_threshold: Option<f64>,
    default_cooldown_secs: Option<u64>,
    disk_cooldown_secs: Option<u64>,
    burst_threshold: Option<usize>,
    burst_window_secs: Option<u64>,
    webhook_url: Option<String>,
    webhook_timeout_secs: Option<u64>,
}

impl SentinelConfig {
    /// Load configuration from the environment
    ///
    /// Sources, later ones winning: built-in defaults, an optional
    /// `sentinel.toml` in the working directory, then `SENTINEL_` prefixed
    /// environment variables (for example `SENTINEL_CPU_THRESHOLD=80`).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let raw: RawSettings = config::Config::builder()
            .add_source(config::File::with_name("sentinel").required(false))
            .add_source(config::Environment::with_prefix("SENTINEL").try_parsing(true))
            .build()
            .map_err(|e| SentinelError::Configuration(e.to_string()))?
            .try_deserialize()
            .map_err(|e| SentinelError::Configuration(e.to_string()))?;

        let defaults = Self::default();
        let config = Self {
            cpu_threshold: raw.cpu_threshold.unwrap_or(defaults.cpu_threshold),
            mem_threshold: raw.mem_threshold.unwrap_or(defaults.mem_threshold),
            disk_threshold: raw.disk_threshold.unwrap_or(defaults.disk_threshold),
            default_cooldown: raw
                .default_cooldown_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.default_cooldown),
            disk_cooldown: raw
                .disk_cooldown_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.disk_cooldown),
            burst_threshold: raw.burst_threshold.unwrap_or(defaults.burst_threshold),
            burst_window: raw
                .burst_window_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.burst_window),
            webhook_url: raw.webhook_url.unwrap_or(defaults.webhook_url),
            webhook_timeout: raw
                .webhook_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.webhook_timeout),
        };

        config.validate()?;
        Ok(config)
    }

    /// Disk alert spacing with the zero-substitution rule applied
    pub fn effective_disk_cooldown(&self) -> Duration {
        if self.disk_cooldown.is_zero() {
            DISK_COOLDOWN_FALLBACK
        } else {
            self.disk_cooldown
        }
    }

    /// Reject configurations the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("cpu_threshold", self.cpu_threshold),
            ("mem_threshold", self.mem_threshold),
            ("disk_threshold", self.disk_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SentinelError::Configuration(format!(
                    "{name} must be a non-negative finite percentage, got {value}"
                )));
            }
        }
        if self.burst_threshold == 0 {
            return Err(SentinelError::Configuration(
                "burst_threshold must be at least 1".to_string(),
            ));
        }
        if self.burst_window.is_zero() {
            return Err(SentinelError::Configuration(
                "burst_window must be non-zero".to_string(),
            ));
        }
        if self.webhook_timeout.is_zero() {
            return Err(SentinelError::Configuration(
                "webhook_timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_production_values() {
        let config = SentinelConfig::default();
        assert_eq!(config.cpu_threshold, 90.0);
        assert_eq!(config.mem_threshold, 85.0);
        assert_eq!(config.disk_threshold, 90.0);
        assert_eq!(config.default_cooldown, Duration::from_secs(300));
        assert_eq!(config.disk_cooldown, Duration::from_secs(900));
        assert_eq!(config.burst_threshold, 5);
        assert_eq!(config.burst_window, Duration::from_secs(30));
        assert!(config.webhook_url.is_empty());
        config.validate().unwrap();
    }

    #[test]
    fn test_zero_disk_cooldown_substitutes_fallback() {
        let config = SentinelConfig {
            disk_cooldown: Duration::ZERO,
            ..SentinelConfig::default()
        };
        assert_eq!(
            config.effective_disk_cooldown(),
            Duration::from_secs(15 * 60)
        );
    }

    #[test]
    fn test_nonzero_disk_cooldown_used_as_is() {
        let config = SentinelConfig {
            disk_cooldown: Duration::from_secs(60),
            ..SentinelConfig::default()
        };
        assert_eq!(config.effective_disk_cooldown(), Duration::from_secs(60));
    }

    #[test]
    fn test_validation_rejects_nan_threshold() {
        let config = SentinelConfig {
            cpu_threshold: f64::NAN,
            ..SentinelConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_burst_threshold() {
        let config = SentinelConfig {
            burst_threshold: 0,
            ..SentinelConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SentinelError::Configuration(_))
        ));
    }
}
