//! # Alert Sink - Outbound Delivery Contract and Webhook Implementation
//!
//! The pipeline hands finished alerts to an [`AlertSink`]. The production
//! implementation serializes each alert into a single rich-embed JSON
//! payload and POSTs it to the configured webhook URL with a bounded
//! timeout.
//!
//! Delivery failures are reported to the caller and never retried here.
//! The caller logs and drops them; by then the cooldown slot is already
//! consumed because emission was attempted.
//!
//! An empty webhook URL turns the sink into a silent no-op. Local runs
//! and disabled deployments exercise the full pipeline that way without
//! any mocking.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;

use crate::alert::{Alert, WebhookPayload};
use crate::{Result, SentinelError};

/// Outbound delivery contract for finished alerts
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Deliver one alert; failures are reported, never propagated upstream
    async fn send(&self, alert: &Alert) -> Result<()>;
}

/// Webhook sink POSTing rich-embed payloads to a chat endpoint
pub struct WebhookSink {
    /// Destination URL; empty disables delivery
    url: String,
    /// HTTP client with the configured request timeout baked in
    client: reqwest::Client,
}

impl WebhookSink {
    /// Build a sink for `url` with `timeout` bounding every POST
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SentinelError::Configuration(format!("webhook client: {e}")))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Whether this sink actually delivers anywhere
    pub fn is_enabled(&self) -> bool {
        !self.url.is_empty()
    }
}

#[async_trait]
impl AlertSink for WebhookSink {
    async fn send(&self, alert: &Alert) -> Result<()> {
        if self.url.is_empty() {
            return Ok(());
        }

        let payload = serde_json::to_value(WebhookPayload::for_alert(alert))
            .map_err(|e| SentinelError::Serialization(e.to_string()))?;

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| SentinelError::WebhookTransport(e.to_string()))?;

        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(SentinelError::WebhookRejected {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

/// In-memory sink collecting alerts for tests and local inspection
#[derive(Default)]
pub struct RecordingSink {
    alerts: Mutex<Vec<Alert>>,
}

impl RecordingSink {
    /// Create an empty recording sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far, in arrival order
    pub fn recorded(&self) -> Vec<Alert> {
        self.alerts.lock().clone()
    }

    /// Number of alerts recorded so far
    pub fn len(&self) -> usize {
        self.alerts.lock().len()
    }

    /// True when nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.alerts.lock().is_empty()
    }
}

#[async_trait]
impl AlertSink for RecordingSink {
    async fn send(&self, alert: &Alert) -> Result<()> {
        self.alerts.lock().push(alert.clone());
        Ok(())
    }
}
