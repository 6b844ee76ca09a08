//! # Cluster Evaluator - Node Threshold Rules
//!
//! Evaluates each node in a cluster snapshot against utilization
//! thresholds and asserted condition labels.
//!
//! ## Rules
//!
//! - **High CPU** (critical): fires only when the current sample and the
//!   immediately previous sample are both above the threshold. A single
//!   offending sample is recorded silently; transient spikes never page.
//! - **High memory** (warning): fires on a single offending sample.
//! - **High disk** (warning): fires on a single offending sample, spaced
//!   by the longer disk cooldown.
//! - **Node condition** (critical): one alert per asserted condition
//!   label, each with its own cooldown key.
//!
//! All comparisons are strict. A sample exactly at the threshold does not
//! trigger, and NaN percentages compare false everywhere, so malformed
//! samples are silently non-triggering.
//!
//! The previous-CPU map is rebuilt from every snapshot after all rules
//! have run. A node missing from a snapshot loses its sustained-high
//! memory; one absent scrape restarts the two-sample requirement.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::alert::{Alert, AlertCallback};
use crate::config::SentinelConfig;
use crate::cooldown::CooldownTracker;
use crate::logging::{log_info, LogCategory};
use crate::telemetry::ClusterSnapshot;

/// Stateful evaluator for node-level telemetry
pub struct ClusterEvaluator {
    cpu_threshold: f64,
    mem_threshold: f64,
    disk_threshold: f64,
    default_cooldown: Duration,
    disk_cooldown: Duration,
    /// Shared per-key emission gate
    cooldowns: Arc<CooldownTracker>,
    /// Whether each node's previous sample exceeded the CPU threshold
    prev_cpu_high: Mutex<HashMap<String, bool>>,
    /// Delivery hand-off for fired alerts
    on_alert: AlertCallback,
}

impl ClusterEvaluator {
    /// Build an evaluator from the configured thresholds
    pub fn new(
        config: &SentinelConfig,
        cooldowns: Arc<CooldownTracker>,
        on_alert: AlertCallback,
    ) -> Self {
        Self {
            cpu_threshold: config.cpu_threshold,
            mem_threshold: config.mem_threshold,
            disk_threshold: config.disk_threshold,
            default_cooldown: config.default_cooldown,
            disk_cooldown: config.effective_disk_cooldown(),
            cooldowns,
            prev_cpu_high: Mutex::new(HashMap::new()),
            on_alert,
        }
    }

    /// Evaluate one cluster snapshot, emitting zero or more alerts
    ///
    /// The state lock is held for the whole evaluation and released before
    /// any alert is handed to the callback.
    pub fn evaluate(&self, snapshot: &ClusterSnapshot) {
        let mut alerts = Vec::new();

        {
            let mut prev_cpu_high = self.prev_cpu_high.lock();
            let mut current_cpu_high = HashMap::with_capacity(snapshot.nodes.len());

            for node in &snapshot.nodes {
                let cpu_high = node.cpu_percent > self.cpu_threshold;
                let was_high = prev_cpu_high.get(&node.name).copied().unwrap_or(false);

                if cpu_high
                    && was_high
                    && self
                        .cooldowns
                        .allow(&format!("cpu:{}", node.name), self.default_cooldown)
                {
                    alerts.push(Alert::critical(
                        format!("Node {} high CPU", node.name),
                        format!(
                            "Node {} CPU at {:.1}% (threshold: {:.0}%)",
                            node.name, node.cpu_percent, self.cpu_threshold
                        ),
                    ));
                }

                if node.mem_percent > self.mem_threshold
                    && self
                        .cooldowns
                        .allow(&format!("mem:{}", node.name), self.default_cooldown)
                {
                    alerts.push(Alert::warning(
                        format!("Node {} high memory", node.name),
                        format!(
                            "Node {} memory at {:.1}% (threshold: {:.0}%)",
                            node.name, node.mem_percent, self.mem_threshold
                        ),
                    ));
                }

                if node.disk_percent > self.disk_threshold
                    && self
                        .cooldowns
                        .allow(&format!("disk:{}", node.name), self.disk_cooldown)
                {
                    alerts.push(Alert::warning(
                        format!("Node {} high disk usage", node.name),
                        format!(
                            "Node {} disk at {:.1}% (threshold: {:.0}%)",
                            node.name, node.disk_percent, self.disk_threshold
                        ),
                    ));
                }

                for condition in &node.conditions {
                    if self.cooldowns.allow(
                        &format!("condition:{}:{}", node.name, condition),
                        self.default_cooldown,
                    ) {
                        alerts.push(Alert::critical(
                            format!("Node {} condition {}", node.name, condition),
                            format!("Node {} reports condition {} as active", node.name, condition),
                        ));
                    }
                }

                current_cpu_high.insert(node.name.clone(), cpu_high);
            }

            // Nodes absent from this snapshot drop out of the map here.
            *prev_cpu_high = current_cpu_high;
        }

        if !alerts.is_empty() {
            log_info(
                LogCategory::Cluster,
                &format!(
                    "cluster snapshot of {} node(s) fired {} alert(s)",
                    snapshot.nodes.len(),
                    alerts.len()
                ),
            );
        }

        for alert in alerts {
            (self.on_alert)(alert);
        }
    }
}
