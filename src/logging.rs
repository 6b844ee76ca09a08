//! # Production Logging System - Pipeline Observability
//!
//! Structured logging for the alerting pipeline with per-category
//! counters, an audit buffer for delivery outcomes, and tracing-based
//! console and file output. Every module logs through the free helper
//! functions here so the subscriber is initialized exactly once no
//! matter which entry point touches the pipeline first.

use dashmap::DashMap;
use metrics::{counter, histogram};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace, warn, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::{Result, SentinelError};

/// Global flag to track if tracing has been initialized
static TRACING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Global logger instance with safe initialization
pub static LOGGER: Lazy<Arc<SentinelLogger>> = Lazy::new(|| {
    // Console output belongs to the embedding process in production.
    let config = LoggingConfig {
        console_enabled: false,
        file_enabled: true,
        ..LoggingConfig::default()
    };

    match SentinelLogger::with_config(config) {
        Ok(logger) => Arc::new(logger),
        Err(_) => Arc::new(SentinelLogger::new_minimal()),
    }
});

/// Log levels for structured logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    /// Trace level - very detailed debugging
    Trace,
    /// Debug level - debugging information
    Debug,
    /// Info level - general information
    Info,
    /// Warning level - potentially harmful situations
    Warn,
    /// Error level - error events
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// Log categories for structured logging
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogCategory {
    /// Cluster pipeline events - node snapshots and threshold rules
    Cluster,
    /// Pod pipeline events - OOM edges and restart transitions
    Pods,
    /// Log burst pipeline events - window crossings
    LogBurst,
    /// Outbound delivery events - webhook sends and failures
    Delivery,
    /// Service startup, shutdown, configuration
    System,
    /// Audit trail events
    Audit,
}

impl std::fmt::Display for LogCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogCategory::Cluster => write!(f, "cluster"),
            LogCategory::Pods => write!(f, "pods"),
            LogCategory::LogBurst => write!(f, "log_burst"),
            LogCategory::Delivery => write!(f, "delivery"),
            LogCategory::System => write!(f, "system"),
            LogCategory::Audit => write!(f, "audit"),
        }
    }
}

/// Structured log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    /// Timestamp when the entry was created
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Log level
    pub level: LogLevel,
    /// Log category
    pub category: LogCategory,
    /// Main log message
    pub message: String,
    /// Additional structured data
    pub data: serde_json::Value,
}

/// Logging performance metrics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingMetrics {
    /// Total log entries processed
    pub total_entries: u64,
    /// Entries by level
    pub entries_by_level: std::collections::HashMap<String, u64>,
    /// Entries by category
    pub entries_by_category: std::collections::HashMap<String, u64>,
    /// Average processing time per entry
    pub avg_processing_time_ms: f64,
    /// Error rate
    pub error_rate: f64,
}

/// Log file rotation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogRotation {
    /// No rotation
    Never,
    /// Rotate hourly
    Hourly,
    /// Rotate daily
    Daily,
}

/// Configuration for pipeline logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level
    pub min_level: LogLevel,
    /// Enable console output
    pub console_enabled: bool,
    /// Enable file logging
    pub file_enabled: bool,
    /// Log file directory
    pub log_dir: String,
    /// Log file rotation
    pub rotation: LogRotation,
    /// Enable structured JSON logging
    pub json_format: bool,
    /// Enable log processing metrics
    pub performance_monitoring: bool,
    /// Enable the audit buffer
    pub audit_enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            console_enabled: true,
            file_enabled: true,
            log_dir: "./logs".to_string(),
            rotation: LogRotation::Daily,
            json_format: true,
            performance_monitoring: true,
            audit_enabled: true,
        }
    }
}

/// Structured logger shared by every module of the pipeline
pub struct SentinelLogger {
    /// Configuration
    config: LoggingConfig,
    /// Aggregated metrics
    metrics: Arc<RwLock<LoggingMetrics>>,
    /// Entry counters by category
    category_counters: Arc<DashMap<LogCategory, u64>>,
    /// Recent processing timings
    recent_timings: Arc<RwLock<Vec<Duration>>>,
    /// Audit trail buffer for delivery and audit events
    audit_buffer: Arc<RwLock<Vec<LogEvent>>>,
}

impl SentinelLogger {
    /// Create a logger with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(LoggingConfig::default())
    }

    /// Create a minimal logger that does not initialize tracing (fallback)
    pub fn new_minimal() -> Self {
        Self {
            config: LoggingConfig {
                console_enabled: false,
                file_enabled: false,
                ..LoggingConfig::default()
            },
            metrics: Arc::new(RwLock::new(LoggingMetrics::default())),
            category_counters: Arc::new(DashMap::new()),
            recent_timings: Arc::new(RwLock::new(Vec::with_capacity(1000))),
            audit_buffer: Arc::new(RwLock::new(Vec::with_capacity(10000))),
        }
    }

    /// Create a logger with custom configuration
    pub fn with_config(config: LoggingConfig) -> Result<Self> {
        if config.file_enabled {
            fs::create_dir_all(&config.log_dir).map_err(|e| {
                SentinelError::Configuration(format!("Failed to create log directory: {e}"))
            })?;
        }

        Self::init_tracing(&config)?;

        Ok(Self {
            config,
            metrics: Arc::new(RwLock::new(LoggingMetrics::default())),
            category_counters: Arc::new(DashMap::new()),
            recent_timings: Arc::new(RwLock::new(Vec::with_capacity(1000))),
            audit_buffer: Arc::new(RwLock::new(Vec::with_capacity(10000))),
        })
    }

    /// Initialize tracing subscriber (thread-safe, can be called multiple times)
    fn init_tracing(config: &LoggingConfig) -> Result<()> {
        if TRACING_INITIALIZED
            .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
            .is_err()
        {
            return Ok(());
        }

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(Self::level_to_string(config.min_level)));

        let mut layers = Vec::new();

        if config.console_enabled {
            let console_layer = fmt::layer().with_target(true).with_line_number(true);
            if config.json_format {
                layers.push(console_layer.json().boxed());
            } else {
                layers.push(console_layer.pretty().boxed());
            }
        }

        if config.file_enabled {
            let file_appender = match config.rotation {
                LogRotation::Daily => rolling::daily(&config.log_dir, "sentinel.log"),
                LogRotation::Hourly => rolling::hourly(&config.log_dir, "sentinel.log"),
                LogRotation::Never => rolling::never(&config.log_dir, "sentinel.log"),
            };

            let (non_blocking, _guard) = non_blocking(file_appender);
            let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

            if config.json_format {
                layers.push(file_layer.json().boxed());
            } else {
                layers.push(file_layer.boxed());
            }
        }

        match tracing_subscriber::registry()
            .with(env_filter)
            .with(layers)
            .try_init()
        {
            Ok(()) => Ok(()),
            Err(_) => {
                // Another subscriber won the race; keep logging through it.
                TRACING_INITIALIZED.store(false, Ordering::Relaxed);
                Ok(())
            }
        }
    }

    /// Convert log level to the string form env filters understand
    fn level_to_string(level: LogLevel) -> &'static str {
        match level {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Log a structured event
    pub fn log(&self, event: LogEvent) {
        let start_time = Instant::now();

        if !self.should_log_level(&event.level) {
            return;
        }

        self.update_metrics(&event);

        if self.config.audit_enabled
            && matches!(event.category, LogCategory::Audit | LogCategory::Delivery)
        {
            let mut audit_buffer = self.audit_buffer.write();
            audit_buffer.push(event.clone());

            // Keep buffer size manageable
            if audit_buffer.len() > 10000 {
                audit_buffer.drain(0..1000);
            }
        }

        let level: Level = event.level.into();
        let category = event.category.to_string();

        match level {
            Level::TRACE => trace!(category = %category, data = ?event.data, "{}", event.message),
            Level::DEBUG => debug!(category = %category, data = ?event.data, "{}", event.message),
            Level::INFO => info!(category = %category, data = ?event.data, "{}", event.message),
            Level::WARN => warn!(category = %category, data = ?event.data, "{}", event.message),
            Level::ERROR => error!(category = %category, data = ?event.data, "{}", event.message),
        }

        let processing_time = start_time.elapsed();
        let mut timings = self.recent_timings.write();
        timings.push(processing_time);
        if timings.len() > 1000 {
            timings.drain(0..100);
        }
        drop(timings);

        if self.config.performance_monitoring {
            histogram!("sentinel_log_processing_time_ms", processing_time.as_millis() as f64);
            counter!("sentinel_log_entries_total", 1,
                "category" => category,
                "level" => Self::level_to_string(event.level));
        }
    }

    /// Update internal metrics
    fn update_metrics(&self, event: &LogEvent) {
        let mut metrics = self.metrics.write();
        metrics.total_entries += 1;

        let level_key = Self::level_to_string(event.level).to_string();
        *metrics.entries_by_level.entry(level_key).or_insert(0) += 1;

        let category_key = event.category.to_string();
        *metrics.entries_by_category.entry(category_key).or_insert(0) += 1;

        *self
            .category_counters
            .entry(event.category.clone())
            .or_insert(0) += 1;

        let error_count = metrics.entries_by_level.get("error").copied().unwrap_or(0);
        metrics.error_rate = if metrics.total_entries > 0 {
            (error_count as f64 / metrics.total_entries as f64) * 100.0
        } else {
            0.0
        };

        let timings = self.recent_timings.read();
        if !timings.is_empty() {
            let total_time: Duration = timings.iter().sum();
            metrics.avg_processing_time_ms = total_time.as_millis() as f64 / timings.len() as f64;
        }
    }

    /// Get current metrics
    pub fn get_metrics(&self) -> LoggingMetrics {
        self.metrics.read().clone()
    }

    /// Get the audit trail
    pub fn get_audit_trail(&self) -> Vec<LogEvent> {
        self.audit_buffer.read().clone()
    }

    /// Clear the audit trail
    pub fn clear_audit_trail(&self) {
        self.audit_buffer.write().clear();
    }

    /// Check if a level passes the configured minimum
    fn should_log_level(&self, level: &LogLevel) -> bool {
        level.ge(&self.config.min_level)
    }
}

/// Log an info-level event through the global logger
pub fn log_info(category: LogCategory, message: &str) {
    LOGGER.log(LogEvent {
        timestamp: chrono::Utc::now(),
        level: LogLevel::Info,
        category,
        message: message.to_string(),
        data: serde_json::Value::Null,
    });
}

/// Log a warn-level event through the global logger
pub fn log_warn(category: LogCategory, message: &str) {
    LOGGER.log(LogEvent {
        timestamp: chrono::Utc::now(),
        level: LogLevel::Warn,
        category,
        message: message.to_string(),
        data: serde_json::Value::Null,
    });
}

/// Log an error-level event through the global logger
pub fn log_error(category: LogCategory, message: &str) {
    LOGGER.log(LogEvent {
        timestamp: chrono::Utc::now(),
        level: LogLevel::Error,
        category,
        message: message.to_string(),
        data: serde_json::Value::Null,
    });
}

/// Log an error-level event carrying structured data
pub fn log_error_with_data(category: LogCategory, message: &str, data: serde_json::Value) {
    LOGGER.log(LogEvent {
        timestamp: chrono::Utc::now(),
        level: LogLevel::Error,
        category,
        message: message.to_string(),
        data,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn event(level: LogLevel, category: LogCategory, message: &str) -> LogEvent {
        LogEvent {
            timestamp: chrono::Utc::now(),
            level,
            category,
            message: message.to_string(),
            data: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_minimal_logger_counts_entries() {
        let logger = SentinelLogger::new_minimal();
        logger.log(event(LogLevel::Info, LogCategory::System, "starting"));
        logger.log(event(LogLevel::Error, LogCategory::Delivery, "send failed"));

        let metrics = logger.get_metrics();
        assert_eq!(metrics.total_entries, 2);
        assert_eq!(metrics.entries_by_level.get("error"), Some(&1));
        assert_eq!(metrics.entries_by_category.get("delivery"), Some(&1));
    }

    #[test]
    fn test_below_min_level_is_dropped() {
        let logger = SentinelLogger::new_minimal();
        logger.log(event(LogLevel::Debug, LogCategory::System, "noise"));
        assert_eq!(logger.get_metrics().total_entries, 0);
    }

    #[test]
    fn test_delivery_events_reach_audit_trail() {
        let logger = SentinelLogger::new_minimal();
        logger.log(event(LogLevel::Error, LogCategory::Delivery, "webhook 503"));
        logger.log(event(LogLevel::Info, LogCategory::Cluster, "snapshot"));

        let trail = logger.get_audit_trail();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].message, "webhook 503");

        logger.clear_audit_trail();
        assert!(logger.get_audit_trail().is_empty());
    }

    #[test]
    fn test_file_logging_creates_directory() {
        let dir = TempDir::new().unwrap();
        let log_dir = dir.path().join("logs");
        let config = LoggingConfig {
            console_enabled: false,
            file_enabled: true,
            log_dir: log_dir.to_string_lossy().to_string(),
            ..LoggingConfig::default()
        };
        let _logger = SentinelLogger::with_config(config).unwrap();
        assert!(log_dir.exists());
    }

    #[test]
    fn test_category_display() {
        assert_eq!(LogCategory::LogBurst.to_string(), "log_burst");
        assert_eq!(LogCategory::Delivery.to_string(), "delivery");
    }

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Error > LogLevel::Warn);
        assert!(LogLevel::Warn > LogLevel::Info);
        assert!(LogLevel::Info > LogLevel::Debug);
    }
}
