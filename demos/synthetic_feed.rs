//! Concurrent synthetic feed: three tasks drive the three inbound
//! streams against one shared service, the way the broker subscribers
//! do in a deployment.
//!
//! Run with: cargo run --example synthetic_feed

use cluster_sentinel::sink::RecordingSink;
use cluster_sentinel::telemetry::{
    ClusterSnapshot, LogRecord, NodeSnapshot, PodSnapshot, PodStatus,
};
use cluster_sentinel::{AlertingService, SentinelConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🚨 Cluster Sentinel - Concurrent Synthetic Feed");
    println!("================================================\n");

    let config = SentinelConfig {
        burst_threshold: 4,
        burst_window: Duration::from_secs(5),
        ..SentinelConfig::default()
    };
    let sink = Arc::new(RecordingSink::new());
    let service = Arc::new(AlertingService::with_sink(config, Arc::clone(&sink) as _)?);

    let cluster_feed = {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            for round in 0..5u32 {
                let cpu = if round >= 2 { 96.0 } else { 40.0 };
                service.on_cluster_snapshot(&ClusterSnapshot {
                    nodes: vec![
                        NodeSnapshot {
                            name: "worker-1".to_string(),
                            cpu_percent: cpu,
                            mem_percent: 55.0,
                            disk_percent: 62.0,
                            conditions: vec![],
                        },
                        NodeSnapshot {
                            name: "worker-2".to_string(),
                            cpu_percent: 35.0,
                            mem_percent: 91.0,
                            disk_percent: 20.0,
                            conditions: vec![],
                        },
                    ],
                });
                sleep(Duration::from_millis(50)).await;
            }
        })
    };

    let pod_feed = {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            for round in 0..5u32 {
                service.on_pod_snapshot(&PodSnapshot {
                    pods: vec![PodStatus {
                        namespace: "payments".to_string(),
                        name: "checkout".to_string(),
                        restart_count: round / 2,
                        oom_killed: false,
                    }],
                });
                sleep(Duration::from_millis(50)).await;
            }
        })
    };

    let log_feed = {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            for i in 0..8u32 {
                service.on_log_record(&LogRecord {
                    source: "search-indexer".to_string(),
                    message: format!("shard flush failed ({i})"),
                    level: "error".to_string(),
                });
                sleep(Duration::from_millis(20)).await;
            }
        })
    };

    cluster_feed.await?;
    pod_feed.await?;
    log_feed.await?;
    sleep(Duration::from_millis(100)).await;

    println!("🔔 {} alert(s) fired:", sink.len());
    for alert in sink.recorded() {
        println!("   [{}] {}", alert.severity, alert.title);
    }

    println!("\n📊 Status report:");
    println!("{}", serde_json::to_string_pretty(&service.status_report())?);

    Ok(())
}
