//! # Pod Evaluator - OOM Edges and Restart Transitions
//!
//! Evaluates pod snapshots for two signals that persist across scrapes
//! and therefore need dedup-aware handling:
//!
//! - **OOM kills** (critical): the last-termination OOM flag stays set on
//!   every subsequent snapshot after a single kill. The cooldown on the
//!   pod's OOM key keeps that one event from paging repeatedly.
//! - **Restart increases** (warning): the restart counter is compared
//!   against a per-pod baseline. The first snapshot that mentions a pod
//!   records its baseline silently, so a freshly observed pod (or a
//!   freshly restarted alerting process) never fires against a counter
//!   it has no history for.
//!
//! The OOM rule runs before the restart rule for each pod. A crash loop
//! that produces a fresh OOM and a counter increment in one snapshot
//! emits both alerts, each gated by its own cooldown key. The baseline is
//! updated unconditionally after both rules, for every pod present in the
//! snapshot; absent pods keep their baseline.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::alert::{Alert, AlertCallback};
use crate::config::SentinelConfig;
use crate::cooldown::CooldownTracker;
use crate::logging::{log_info, LogCategory};
use crate::telemetry::PodSnapshot;

/// Stateful evaluator for pod-level telemetry
pub struct PodEvaluator {
    default_cooldown: Duration,
    /// Shared per-key emission gate
    cooldowns: Arc<CooldownTracker>,
    /// Last observed restart counter per pod key
    restart_baselines: Mutex<HashMap<String, u32>>,
    /// Delivery hand-off for fired alerts
    on_alert: AlertCallback,
}

impl PodEvaluator {
    /// Build an evaluator sharing the pipeline-wide cooldown tracker
    pub fn new(
        config: &SentinelConfig,
        cooldowns: Arc<CooldownTracker>,
        on_alert: AlertCallback,
    ) -> Self {
        Self {
            default_cooldown: config.default_cooldown,
            cooldowns,
            restart_baselines: Mutex::new(HashMap::new()),
            on_alert,
        }
    }

    /// Evaluate one pod snapshot, emitting zero or more alerts
    ///
    /// The baseline lock is held for the whole evaluation and released
    /// before any alert is handed to the callback.
    pub fn evaluate(&self, snapshot: &PodSnapshot) {
        let mut alerts = Vec::new();

        {
            let mut baselines = self.restart_baselines.lock();

            for pod in &snapshot.pods {
                let pod_key = pod.key();

                if pod.oom_killed
                    && self
                        .cooldowns
                        .allow(&format!("oom:{pod_key}"), self.default_cooldown)
                {
                    alerts.push(Alert::critical(
                        format!("Pod {pod_key} OOM killed"),
                        format!(
                            "Pod {pod_key} was terminated by the OOM killer (restart count {})",
                            pod.restart_count
                        ),
                    ));
                }

                if let Some(&baseline) = baselines.get(&pod_key) {
                    if pod.restart_count > baseline
                        && self
                            .cooldowns
                            .allow(&format!("restart:{pod_key}"), self.default_cooldown)
                    {
                        alerts.push(Alert::warning(
                            format!("Pod {pod_key} restarting"),
                            format!(
                                "Pod {pod_key} restart count rose from {} to {}",
                                baseline, pod.restart_count
                            ),
                        ));
                    }
                }

                baselines.insert(pod_key, pod.restart_count);
            }
        }

        if !alerts.is_empty() {
            log_info(
                LogCategory::Pods,
                &format!(
                    "pod snapshot of {} pod(s) fired {} alert(s)",
                    snapshot.pods.len(),
                    alerts.len()
                ),
            );
        }

        for alert in alerts {
            (self.on_alert)(alert);
        }
    }
}
