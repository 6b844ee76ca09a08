use cluster_sentinel::alert::Alert;
use cluster_sentinel::sink::{AlertSink, WebhookSink};
use cluster_sentinel::telemetry::{ClusterSnapshot, NodeSnapshot};
use cluster_sentinel::{AlertingService, SentinelConfig, SentinelError};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Webhook delivery tests against a one-shot TCP responder.
///
/// The responder accepts a single connection, reads one full HTTP
/// request, answers with a canned status line, and hands the raw request
/// back for inspection.

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

async fn read_request(stream: &mut TcpStream) -> Vec<u8> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = stream.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);

        if let Some(header_end) = find_subsequence(&data, b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&data[..header_end]).to_ascii_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if data.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    data
}

/// Serve exactly one request with `response`, returning the URL to hit
/// and a handle resolving to the raw request bytes.
async fn one_shot_responder(
    response: &'static str,
) -> (String, tokio::task::JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_request(&mut stream).await;
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.flush().await.unwrap();
        request
    });

    (format!("http://{addr}/hook"), handle)
}

fn request_body(raw: &[u8]) -> serde_json::Value {
    let header_end = find_subsequence(raw, b"\r\n\r\n").unwrap();
    serde_json::from_slice(&raw[header_end + 4..]).unwrap()
}

#[tokio::test]
async fn test_successful_delivery_posts_embed_payload() {
    println!("🧪 Delivering one critical alert to a live endpoint");
    let (url, server) =
        one_shot_responder("HTTP/1.1 204 No Content\r\ncontent-length: 0\r\n\r\n").await;

    let sink = WebhookSink::new(url, Duration::from_secs(2)).unwrap();
    let alert = Alert::critical("Node s0 high CPU", "Node s0 CPU at 95.2% (threshold: 90%)");
    sink.send(&alert).await.unwrap();

    let raw = server.await.unwrap();
    let head = String::from_utf8_lossy(&raw).to_string();
    assert!(head.starts_with("POST /hook"));
    assert!(head.to_ascii_lowercase().contains("content-type: application/json"));

    let body = request_body(&raw);
    let embed = &body["embeds"][0];
    assert_eq!(embed["title"], "Node s0 high CPU");
    assert_eq!(embed["description"], "Node s0 CPU at 95.2% (threshold: 90%)");
    assert_eq!(embed["color"], 0xFF0000);
    let timestamp = embed["timestamp"].as_str().unwrap();
    assert_eq!(timestamp.len(), 20);
    assert!(timestamp.ends_with('Z'));
    println!("✅ Payload carried the expected embed");
}

#[tokio::test]
async fn test_http_error_status_is_rejection() {
    println!("🧪 Endpoint rejects with 500");
    let (url, server) = one_shot_responder(
        "HTTP/1.1 500 Internal Server Error\r\ncontent-length: 0\r\n\r\n",
    )
    .await;

    let sink = WebhookSink::new(url, Duration::from_secs(2)).unwrap();
    match sink.send(&Alert::warning("t", "m")).await {
        Err(SentinelError::WebhookRejected { status }) => assert_eq!(status, 500),
        other => panic!("expected rejection, got {other:?}"),
    }
    server.await.unwrap();
    println!("✅ Status 500 surfaced as a rejection error");
}

#[tokio::test]
async fn test_pipeline_delivers_to_live_webhook() {
    println!("🧪 Full pipeline against a live endpoint");
    let (url, server) =
        one_shot_responder("HTTP/1.1 200 OK\r\ncontent-length: 0\r\n\r\n").await;

    let config = SentinelConfig {
        webhook_url: url,
        ..SentinelConfig::default()
    };
    let service = AlertingService::new(config).unwrap();

    service.on_cluster_snapshot(&ClusterSnapshot {
        nodes: vec![NodeSnapshot {
            name: "s0".to_string(),
            cpu_percent: 10.0,
            mem_percent: 92.0,
            disk_percent: 30.0,
            conditions: vec![],
        }],
    });

    let raw = server.await.unwrap();
    let body = request_body(&raw);
    let embed = &body["embeds"][0];
    assert!(embed["title"].as_str().unwrap().contains("memory"));
    assert_eq!(embed["color"], 0xFFA500);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(service.alerts_emitted(), 1);
    assert_eq!(service.delivery_failures(), 0);
    println!("✅ Evaluator output arrived on the wire");
}

#[tokio::test]
async fn test_failed_delivery_is_counted_and_dropped() {
    println!("🧪 Unreachable endpoint never stalls the pipeline");
    // Reserved TEST-NET address, nothing listens there.
    let config = SentinelConfig {
        webhook_url: "http://192.0.2.1:9/hook".to_string(),
        webhook_timeout: Duration::from_millis(200),
        ..SentinelConfig::default()
    };
    let service = AlertingService::new(config).unwrap();

    service.on_cluster_snapshot(&ClusterSnapshot {
        nodes: vec![NodeSnapshot {
            name: "s0".to_string(),
            cpu_percent: 10.0,
            mem_percent: 92.0,
            disk_percent: 30.0,
            conditions: vec![],
        }],
    });

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(service.alerts_emitted(), 1);
    assert_eq!(service.delivery_failures(), 1);

    // The cooldown slot stays consumed even though delivery failed.
    service.on_cluster_snapshot(&ClusterSnapshot {
        nodes: vec![NodeSnapshot {
            name: "s0".to_string(),
            cpu_percent: 10.0,
            mem_percent: 93.0,
            disk_percent: 30.0,
            conditions: vec![],
        }],
    });
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(service.alerts_emitted(), 1);
    println!("✅ Failure logged, dropped, cooldown intact");
}
