//! # Alerting Service - Pipeline Wiring and Outbound Fan-Out
//!
//! Binds the three evaluators and the shared cooldown tracker to the
//! three inbound snapshot callbacks, and fans every fired alert out
//! through one delivery path.
//!
//! The service owns no background work of its own. The inbound entry
//! points run synchronously on the caller's task and are individually
//! lock-protected inside each evaluator, so the three subscriber streams
//! may call in concurrently. Outbound delivery is the only suspension
//! point in the system and runs on spawned tasks; a slow or failing
//! webhook never stalls evaluation.
//!
//! Delivery failures are terminal: the failure is logged with the alert
//! title, counted, and dropped. The cooldown slot stays consumed because
//! emission was attempted, so a flapping webhook does not turn into an
//! alert storm once it recovers.

use metrics::{counter, gauge};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::alert::{Alert, AlertCallback};
use crate::cluster_eval::ClusterEvaluator;
use crate::config::SentinelConfig;
use crate::cooldown::CooldownTracker;
use crate::log_burst::LogBurstDetector;
use crate::logging::{log_error_with_data, log_info, LogCategory};
use crate::pod_eval::PodEvaluator;
use crate::sink::{AlertSink, WebhookSink};
use crate::telemetry::{ClusterSnapshot, LogRecord, PodSnapshot};
use crate::Result;

/// Main alerting pipeline: three evaluators, one shared outbound path
pub struct AlertingService {
    /// Configuration the pipeline was built from
    config: SentinelConfig,
    /// Node threshold rules and sustained-CPU state
    cluster: ClusterEvaluator,
    /// OOM edge and restart transition detection
    pods: PodEvaluator,
    /// Per-source burst windows
    log_bursts: LogBurstDetector,
    /// Shared per-key emission gate
    cooldowns: Arc<CooldownTracker>,
    /// Total alerts handed to the delivery path
    alerts_emitted: Arc<AtomicU64>,
    /// Delivery attempts that failed and were dropped
    delivery_failures: Arc<AtomicU64>,
    /// Service start time for uptime reporting
    start_time: Instant,
}

impl AlertingService {
    /// Build the full pipeline with webhook delivery from `config`
    pub fn new(config: SentinelConfig) -> Result<Self> {
        config.validate()?;
        let sink = Arc::new(WebhookSink::new(
            config.webhook_url.clone(),
            config.webhook_timeout,
        )?);
        Self::with_sink(config, sink)
    }

    /// Build the pipeline around a caller-supplied sink
    ///
    /// Tests and embedded deployments inject a [`crate::sink::RecordingSink`]
    /// or their own delivery here; everything upstream of the sink behaves
    /// identically.
    pub fn with_sink(config: SentinelConfig, sink: Arc<dyn AlertSink>) -> Result<Self> {
        config.validate()?;

        let cooldowns = Arc::new(CooldownTracker::new());
        let alerts_emitted = Arc::new(AtomicU64::new(0));
        let delivery_failures = Arc::new(AtomicU64::new(0));

        let on_alert = Self::delivery_callback(
            sink,
            Arc::clone(&alerts_emitted),
            Arc::clone(&delivery_failures),
        );

        let service = Self {
            cluster: ClusterEvaluator::new(&config, Arc::clone(&cooldowns), Arc::clone(&on_alert)),
            pods: PodEvaluator::new(&config, Arc::clone(&cooldowns), Arc::clone(&on_alert)),
            log_bursts: LogBurstDetector::new(&config, Arc::clone(&cooldowns), on_alert),
            cooldowns,
            alerts_emitted,
            delivery_failures,
            start_time: Instant::now(),
            config,
        };

        log_info(
            LogCategory::System,
            &format!(
                "alerting service initialized (webhook {})",
                if service.config.webhook_url.is_empty() {
                    "disabled"
                } else {
                    "enabled"
                }
            ),
        );

        Ok(service)
    }

    /// Wrap the sink in the callback the evaluators emit through
    ///
    /// The callback itself never blocks: each send is dispatched onto its
    /// own tokio task, so no evaluator lock spans outbound I/O. Failures
    /// are logged with the alert title and dropped.
    fn delivery_callback(
        sink: Arc<dyn AlertSink>,
        alerts_emitted: Arc<AtomicU64>,
        delivery_failures: Arc<AtomicU64>,
    ) -> AlertCallback {
        Arc::new(move |alert: Alert| {
            alerts_emitted.fetch_add(1, Ordering::Relaxed);
            counter!("sentinel_alerts_emitted_total", 1,
                "severity" => alert.severity.to_string());

            let sink = Arc::clone(&sink);
            let delivery_failures = Arc::clone(&delivery_failures);
            tokio::spawn(async move {
                if let Err(e) = sink.send(&alert).await {
                    delivery_failures.fetch_add(1, Ordering::Relaxed);
                    counter!("sentinel_alert_delivery_failures_total", 1);
                    log_error_with_data(
                        LogCategory::Delivery,
                        &format!("failed to deliver alert '{}': {e}", alert.title),
                        serde_json::json!({
                            "alert_id": alert.id,
                            "severity": alert.severity.to_string(),
                        }),
                    );
                }
            });
        })
    }

    /// Inbound entry point for cluster metric snapshots
    pub fn on_cluster_snapshot(&self, snapshot: &ClusterSnapshot) {
        counter!("sentinel_snapshots_processed_total", 1, "pipeline" => "cluster");
        self.cluster.evaluate(snapshot);
    }

    /// Inbound entry point for pod status snapshots
    pub fn on_pod_snapshot(&self, snapshot: &PodSnapshot) {
        counter!("sentinel_snapshots_processed_total", 1, "pipeline" => "pods");
        self.pods.evaluate(snapshot);
    }

    /// Inbound entry point for error log records
    pub fn on_log_record(&self, record: &LogRecord) {
        counter!("sentinel_snapshots_processed_total", 1, "pipeline" => "logs");
        self.log_bursts.handle(record);
    }

    /// Total alerts handed to the delivery path so far
    pub fn alerts_emitted(&self) -> u64 {
        self.alerts_emitted.load(Ordering::Relaxed)
    }

    /// Delivery attempts that failed and were dropped
    pub fn delivery_failures(&self) -> u64 {
        self.delivery_failures.load(Ordering::Relaxed)
    }

    /// Configuration the pipeline was built from
    pub fn config(&self) -> &SentinelConfig {
        &self.config
    }

    /// In-process status snapshot for inspection and reporting
    pub fn status_report(&self) -> serde_json::Value {
        let tracked = self.cooldowns.tracked_keys();
        gauge!("sentinel_cooldown_keys", tracked as f64);

        serde_json::json!({
            "status": "operational",
            "version": crate::ARCHITECTURE_VERSION,
            "uptime_seconds": self.start_time.elapsed().as_secs(),
            "alerts_emitted": self.alerts_emitted(),
            "delivery_failures": self.delivery_failures(),
            "cooldown_keys": tracked,
            "webhook_enabled": !self.config.webhook_url.is_empty(),
        })
    }
}
