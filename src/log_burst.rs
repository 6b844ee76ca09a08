//! # Log Burst Detector - Per-Source Sliding Windows
//!
//! Counts error-level log records per source inside a sliding time
//! window and raises a warning when one source crosses the burst
//! threshold. Windows are plain timestamp sequences pruned on every
//! call; there is no background timer, so an idle source costs nothing
//! and its stale entries fall off the next time it speaks.
//!
//! Each source gets its own window. Sources never interact, and the
//! steady-state memory bound is the burst threshold times the number of
//! active sources. The emitted alert carries the source, the count, the
//! window horizon, and a capped snippet of the latest raw message so the
//! operator sees what the burst looks like without the payload growing
//! unbounded.

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::alert::{Alert, AlertCallback};
use crate::config::SentinelConfig;
use crate::cooldown::CooldownTracker;
use crate::logging::{log_info, LogCategory};
use crate::telemetry::LogRecord;

/// Ceiling on raw log content embedded in an alert message
const SNIPPET_CEILING: usize = 200;

/// Sliding-window burst detector over error log records
pub struct LogBurstDetector {
    burst_threshold: usize,
    burst_window: Duration,
    default_cooldown: Duration,
    /// Shared per-key emission gate
    cooldowns: Arc<CooldownTracker>,
    /// Time-ordered error timestamps per source, pruned to the window
    windows: Mutex<HashMap<String, VecDeque<Instant>>>,
    /// Delivery hand-off for fired alerts
    on_alert: AlertCallback,
}

impl LogBurstDetector {
    /// Build a detector sharing the pipeline-wide cooldown tracker
    pub fn new(
        config: &SentinelConfig,
        cooldowns: Arc<CooldownTracker>,
        on_alert: AlertCallback,
    ) -> Self {
        Self {
            burst_threshold: config.burst_threshold,
            burst_window: config.burst_window,
            default_cooldown: config.default_cooldown,
            cooldowns,
            windows: Mutex::new(HashMap::new()),
            on_alert,
        }
    }

    /// Account one error record, emitting at most one alert
    ///
    /// The window lock is held for the whole call and released before any
    /// alert is handed to the callback.
    pub fn handle(&self, record: &LogRecord) {
        let mut fired = None;

        {
            let mut windows = self.windows.lock();
            let window = windows.entry(record.source.clone()).or_default();
            let now = Instant::now();

            // Drop everything at or beyond the window horizon.
            while window
                .front()
                .map_or(false, |t| now.duration_since(*t) >= self.burst_window)
            {
                window.pop_front();
            }
            window.push_back(now);

            if window.len() >= self.burst_threshold
                && self.cooldowns.allow(
                    &format!("log-burst:{}", record.source),
                    self.default_cooldown,
                )
            {
                fired = Some(Alert::warning(
                    format!("Log burst: {}", record.source),
                    format!(
                        "{} error log entries from {} within {}s; latest: {}",
                        window.len(),
                        record.source,
                        self.burst_window.as_secs(),
                        snippet(&record.message)
                    ),
                ));
            }
        }

        if let Some(alert) = fired {
            log_info(
                LogCategory::LogBurst,
                &format!("burst detected for source {}", record.source),
            );
            (self.on_alert)(alert);
        }
    }

    #[cfg(test)]
    fn window_len(&self, source: &str) -> usize {
        self.windows
            .lock()
            .get(source)
            .map(VecDeque::len)
            .unwrap_or(0)
    }
}

/// Cap raw log content so webhook payloads stay bounded
fn snippet(message: &str) -> String {
    if message.chars().count() <= SNIPPET_CEILING {
        message.to_string()
    } else {
        let mut capped: String = message.chars().take(SNIPPET_CEILING).collect();
        capped.push_str("...");
        capped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::Severity;
    use std::thread;

    fn collector() -> (AlertCallback, Arc<Mutex<Vec<Alert>>>) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let writer = Arc::clone(&buffer);
        let callback: AlertCallback = Arc::new(move |alert| writer.lock().push(alert));
        (callback, buffer)
    }

    fn record(source: &str, message: &str) -> LogRecord {
        LogRecord {
            source: source.to_string(),
            message: message.to_string(),
            level: "error".to_string(),
        }
    }

    fn detector(config: &SentinelConfig) -> (LogBurstDetector, Arc<Mutex<Vec<Alert>>>) {
        let (callback, buffer) = collector();
        let det = LogBurstDetector::new(config, Arc::new(CooldownTracker::new()), callback);
        (det, buffer)
    }

    #[test]
    fn test_burst_fires_once_per_cooldown() {
        let (det, alerts) = detector(&SentinelConfig::default());
        for i in 0..6 {
            det.handle(&record("auth-service", &format!("token rejected #{i}")));
        }

        let fired = alerts.lock();
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].severity, Severity::Warning);
        assert!(fired[0].message.contains("auth-service"));
        assert!(fired[0].message.contains("5 error log entries"));
        assert!(fired[0].message.contains("30s"));
    }

    #[test]
    fn test_below_threshold_is_silent() {
        let (det, alerts) = detector(&SentinelConfig::default());
        for _ in 0..4 {
            det.handle(&record("auth-service", "boom"));
        }
        assert!(alerts.lock().is_empty());
    }

    #[test]
    fn test_sources_do_not_interact() {
        let (det, alerts) = detector(&SentinelConfig::default());
        for _ in 0..6 {
            det.handle(&record("auth-service", "boom"));
            det.handle(&record("billing-service", "boom"));
        }

        let fired = alerts.lock();
        assert_eq!(fired.len(), 2);
        assert!(fired.iter().any(|a| a.message.contains("auth-service")));
        assert!(fired.iter().any(|a| a.message.contains("billing-service")));
    }

    #[test]
    fn test_slow_trickle_never_bursts() {
        let config = SentinelConfig {
            burst_threshold: 3,
            burst_window: Duration::from_millis(30),
            ..SentinelConfig::default()
        };
        let (det, alerts) = detector(&config);
        for _ in 0..6 {
            det.handle(&record("api", "boom"));
            thread::sleep(Duration::from_millis(40));
        }
        assert!(alerts.lock().is_empty());
        // Stale entries were pruned on each call.
        assert_eq!(det.window_len("api"), 1);
    }

    #[test]
    fn test_burst_fires_again_after_cooldown() {
        let config = SentinelConfig {
            burst_threshold: 3,
            burst_window: Duration::from_secs(30),
            default_cooldown: Duration::from_millis(20),
            ..SentinelConfig::default()
        };
        let (det, alerts) = detector(&config);
        for _ in 0..3 {
            det.handle(&record("api", "boom"));
        }
        assert_eq!(alerts.lock().len(), 1);

        thread::sleep(Duration::from_millis(30));
        det.handle(&record("api", "boom"));
        assert_eq!(alerts.lock().len(), 2);
    }

    #[test]
    fn test_snippet_caps_long_messages() {
        let long = "x".repeat(500);
        let capped = snippet(&long);
        assert_eq!(capped.chars().count(), SNIPPET_CEILING + 3);
        assert!(capped.ends_with("..."));

        let short = "connection reset by peer";
        assert_eq!(snippet(short), short);
    }

    #[test]
    fn test_alert_carries_latest_message_snippet() {
        let config = SentinelConfig {
            burst_threshold: 2,
            ..SentinelConfig::default()
        };
        let (det, alerts) = detector(&config);
        det.handle(&record("api", "first failure"));
        det.handle(&record("api", "second failure"));

        let fired = alerts.lock();
        assert_eq!(fired.len(), 1);
        assert!(fired[0].message.contains("second failure"));
    }
}
