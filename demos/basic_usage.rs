//! Basic usage walkthrough: build the pipeline with an in-memory sink,
//! feed all three telemetry streams, and print what fired.
//!
//! Run with: cargo run --example basic_usage

use cluster_sentinel::sink::RecordingSink;
use cluster_sentinel::telemetry::{
    ClusterSnapshot, LogRecord, NodeSnapshot, PodSnapshot, PodStatus,
};
use cluster_sentinel::{AlertingService, SentinelConfig};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🚨 Cluster Sentinel - Basic Usage");
    println!("==================================\n");

    // An empty webhook URL would silently discard deliveries; for the demo
    // we inject a recording sink instead so alerts stay inspectable.
    let sink = Arc::new(RecordingSink::new());
    let service = AlertingService::with_sink(SentinelConfig::default(), Arc::clone(&sink) as _)?;

    println!("📡 Feeding two cluster scrapes with sustained high CPU on s0...");
    for cpu in [95.0, 93.5] {
        service.on_cluster_snapshot(&ClusterSnapshot {
            nodes: vec![NodeSnapshot {
                name: "s0".to_string(),
                cpu_percent: cpu,
                mem_percent: 52.0,
                disk_percent: 41.0,
                conditions: vec![],
            }],
        });
    }

    println!("📦 Feeding a pod scrape with an OOM-killed container...");
    service.on_pod_snapshot(&PodSnapshot {
        pods: vec![PodStatus {
            namespace: "default".to_string(),
            name: "gfs-master".to_string(),
            restart_count: 1,
            oom_killed: true,
        }],
    });

    println!("📜 Feeding an error log burst from auth-service...");
    for i in 0..6 {
        service.on_log_record(&LogRecord {
            source: "auth-service".to_string(),
            message: format!("token validation failed (attempt {i})"),
            level: "error".to_string(),
        });
    }

    // Let the spawned delivery tasks drain.
    tokio::time::sleep(Duration::from_millis(100)).await;

    println!("\n🔔 Alerts fired:");
    for alert in sink.recorded() {
        println!("   [{}] {} - {}", alert.severity, alert.title, alert.message);
    }

    println!("\n📊 Status report:");
    println!("{}", serde_json::to_string_pretty(&service.status_report())?);

    Ok(())
}
