//! # Telemetry Types - Inbound Snapshots and Log Records
//!
//! The already-decoded domain structs the pipeline consumes. Subscribers
//! on the broker side handle wire decoding and hand these over by method
//! call once per scrape interval (snapshots) or per published error log
//! (records).

use serde::{Deserialize, Serialize};

/// One node's sample within a cluster snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSnapshot {
    /// Node name, unique within the cluster
    pub name: String,
    /// CPU utilization percentage, nominally in [0, 100]
    pub cpu_percent: f64,
    /// Memory utilization percentage, nominally in [0, 100]
    pub mem_percent: f64,
    /// Disk utilization percentage, nominally in [0, 100]
    pub disk_percent: f64,
    /// Condition labels currently asserted "True" for this node,
    /// for example "MemoryPressure" or "DiskPressure"
    pub conditions: Vec<String>,
}

/// All node samples for one scrape interval
///
/// Node order carries no meaning. Each node name should appear at most
/// once per snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterSnapshot {
    pub nodes: Vec<NodeSnapshot>,
}

/// One container's sample within a pod snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodStatus {
    /// Pod namespace
    pub namespace: String,
    /// Pod name; (namespace, name) identifies the pod
    pub name: String,
    /// Monotone non-negative restart counter
    pub restart_count: u32,
    /// True iff the container's last termination reason indicates OOM
    pub oom_killed: bool,
}

impl PodStatus {
    /// Stable pod key used for baselines and cooldown bookkeeping
    pub fn key(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

/// All pod samples for one scrape interval
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PodSnapshot {
    pub pods: Vec<PodStatus>,
}

/// A single error-level log record published by a service
///
/// The ingestion layer filters to error level before delivery; `level` is
/// carried for completeness but not consulted by any rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    /// Service identifier the record originated from
    pub source: String,
    /// Raw log message
    pub message: String,
    /// Log level as published
    pub level: String,
}
