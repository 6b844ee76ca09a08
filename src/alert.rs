//! # Alert Model - Severity Levels and Webhook Payload Shape
//!
//! The alert value type emitted by every rule in the pipeline, the
//! severity scale attached to it, and the rich-embed payload the webhook
//! sink serializes it into.
//!
//! Alerts are immutable once constructed. Every alert carries a unique id
//! for audit trails, a short title naming the subject, a longer message
//! with the measured value or transition, a severity level, and the UTC
//! wall-clock time at emission.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Severity scale for emitted alerts
///
/// The pipeline currently emits only `Warning` and `Critical`. `Info` is
/// reserved so downstream consumers do not need a schema change when an
/// informational tier is introduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Informational, no operator action expected
    Info,
    /// Potentially harmful situation, operator should take a look
    Warning,
    /// Immediate operator attention required
    Critical,
}

impl Severity {
    /// Embed color for this severity, as a 24-bit RGB integer
    pub fn color(&self) -> u32 {
        match self {
            Severity::Info => 0x80_80_80,
            Severity::Warning => 0xFF_A5_00,
            Severity::Critical => 0xFF_00_00,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// A single deduplicated alert produced by the evaluation pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Unique alert identifier for audit trails
    pub id: String,
    /// Short human label, includes the subject (node, pod, or source)
    pub title: String,
    /// Longer description with the measured value and threshold or transition
    pub message: String,
    /// Alert severity
    pub severity: Severity,
    /// Wall-clock emission time (UTC)
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    /// Create a new alert stamped with the current UTC time
    pub fn new(severity: Severity, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            message: message.into(),
            severity,
            timestamp: Utc::now(),
        }
    }

    /// Shorthand for a warning-level alert
    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, title, message)
    }

    /// Shorthand for a critical-level alert
    pub fn critical(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Critical, title, message)
    }

    /// Emission timestamp in the `YYYY-MM-DDTHH:MM:SSZ` form the webhook expects
    pub fn rfc3339_timestamp(&self) -> String {
        self.timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

/// Callback through which evaluators hand off fired alerts
///
/// Evaluators stay pure with respect to delivery. Production wiring points
/// this at the webhook sink via a spawned task; tests collect alerts into
/// a buffer instead.
pub type AlertCallback = Arc<dyn Fn(Alert) + Send + Sync>;

/// One rich embed inside the webhook payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEmbed {
    /// Embed title, taken from the alert title
    pub title: String,
    /// Embed body, taken from the alert message
    pub description: String,
    /// Severity color as a 24-bit RGB integer
    pub color: u32,
    /// RFC3339 UTC timestamp
    pub timestamp: String,
}

/// Webhook payload: a single embed wrapped in the envelope the endpoint expects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub embeds: Vec<WebhookEmbed>,
}

impl WebhookPayload {
    /// Build the wire payload for one alert
    pub fn for_alert(alert: &Alert) -> Self {
        Self {
            embeds: vec![WebhookEmbed {
                title: alert.title.clone(),
                description: alert.message.clone(),
                color: alert.severity.color(),
                timestamp: alert.rfc3339_timestamp(),
            }],
        }
    }
}
