//! # Cluster Sentinel v1.0.0
//!
//! A production-ready alerting core that sits between a cluster monitor,
//! a structured log service, and a chat webhook. Three inbound telemetry
//! streams are turned into deduplicated, severity-tagged alerts through a
//! stateful evaluation pipeline.
//!
//! ## 🏗️ Architecture Overview
//!
//! The pipeline is built from three independent evaluators sharing one
//! outbound path:
//!
//! ### Cluster Evaluator
//! - **Threshold rules**: CPU, memory, and disk utilization per node
//! - **Sustained-CPU detection**: two consecutive offending samples before firing
//! - **Condition alerts**: one alert per asserted node condition label
//!
//! ### Pod Evaluator
//! - **OOM edge detection**: last-termination OOM signal without repeat alerts
//! - **Restart transitions**: counter increases against a per-pod baseline
//! - **Silent baselines**: the first sighting of a pod never alerts
//!
//! ### Log Burst Detector
//! - **Sliding windows**: per-source timestamp windows pruned on every call
//! - **Threshold crossings**: a burst fires when the window fills within the horizon
//!
//! ### Shared Outbound Path
//! - **Cooldown tracker**: per-key minimum spacing between emissions
//! - **Webhook sink**: rich-embed JSON payloads over HTTP POST with bounded timeout
//! - **Failure isolation**: delivery errors are logged and dropped, never retried
//!
//! ## Concurrency Model
//!
//! Each evaluator guards its own state with a single exclusive lock held
//! for the duration of one evaluation call. The cooldown tracker performs
//! its check-and-update inside its own critical section. Outbound sends
//! run on spawned tasks so no evaluator lock ever spans network I/O.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cluster_sentinel::{AlertingService, SentinelConfig};
//! use cluster_sentinel::telemetry::{ClusterSnapshot, NodeSnapshot};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SentinelConfig::default();
//!     let service = AlertingService::new(config)?;
//!
//!     let snapshot = ClusterSnapshot {
//!         nodes: vec![NodeSnapshot {
//!             name: "s0".to_string(),
//!             cpu_percent: 95.0,
//!             mem_percent: 50.0,
//!             disk_percent: 30.0,
//!             conditions: vec![],
//!         }],
//!     };
//!     service.on_cluster_snapshot(&snapshot);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Technology Stack
//!
//! - **Async Runtime**: Tokio with spawned outbound delivery tasks
//! - **Delivery**: reqwest JSON POST to a configured webhook URL
//! - **Observability**: structured tracing logs and metrics counters
//! - **Configuration**: environment-based config with validation

/// Architecture version for compatibility tracking and upgrade management
pub const ARCHITECTURE_VERSION: &str = "1.0.0-streamlined";

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Production hardening modules - operational capabilities shared by the pipeline
pub mod config;  // Threshold, cooldown, burst, and webhook configuration surface
pub mod logging; // Structured logging, category counters, tracing initialization

// Core pipeline modules - evaluators, shared gating, and outbound delivery
pub mod alert;        // Alert value type, severity levels, webhook payload shape
pub mod cluster_eval; // Node threshold rules and sustained-CPU state
pub mod cooldown;     // Per-key minimum-spacing gate shared by every rule
pub mod log_burst;    // Per-source sliding-window burst detection
pub mod orchestrator; // Service wiring, inbound entry points, outbound fan-out
pub mod pod_eval;     // OOM edge and restart-counter transition detection
pub mod sink;         // Alert sink contract and webhook implementation
pub mod telemetry;    // Inbound snapshot and log record types

// Re-export the service API for convenient access
pub use crate::config::SentinelConfig;
pub use alert::{Alert, AlertCallback, Severity};
pub use orchestrator::AlertingService;

/// Error type covering the failure modes the alerting core can observe
///
/// Evaluation itself has no failure mode. Errors surface only at the edges
/// of the pipeline, when building or delivering a webhook payload and when
/// validating configuration at startup.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum SentinelError {
    /// Network-level delivery failures - connection refused, DNS, timeout
    ///
    /// Examples: webhook host unreachable, TLS handshake failure, POST timeout
    #[error("Webhook transport error: {0}")]
    WebhookTransport(String),

    /// The webhook endpoint accepted the connection but rejected the payload
    ///
    /// Any HTTP status of 400 or above is a rejection; 2xx and 3xx succeed.
    #[error("Webhook rejected delivery with status {status}")]
    WebhookRejected { status: u16 },

    /// Payload construction failures - treated as an internal bug, logged and dropped
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration and setup errors - invalid thresholds, malformed URLs, bad durations
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for all alerting core operations
///
/// Provides a consistent error handling interface across the crate. Public
/// API functions that can fail return this alias.
pub type Result<T> = std::result::Result<T, SentinelError>;
