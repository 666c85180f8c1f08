//! Load test for the ballpit server.
//!
//! Spawns multiple passive WebSocket observers that connect to the server
//! and count snapshot broadcasts.
//!
//! Usage: cargo run --bin loadtest -- [OPTIONS]
//!
//! Options:
//!   --observers N    Number of observers to spawn (default: 100)
//!   --duration S     Test duration in seconds (default: 30)
//!   --tick-ms T      Server tick period, for the expected rate (default: 10)
//!   --url URL        Server URL (default: ws://127.0.0.1:2345/ws)

use ballpit_shared::protocol::ServerMsg;
use futures_util::StreamExt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_tungstenite::{connect_async, tungstenite::Message};

// === Metrics ===

#[derive(Default)]
struct Metrics {
    connected: AtomicU64,
    welcomes_received: AtomicU64,
    snapshots_received: AtomicU64,
    decode_errors: AtomicU64,
    errors: AtomicU64,
    total_balls_seen: AtomicU64,
    latency_sum_ms: AtomicU64,
    latency_count: AtomicU64,
}

// === Observer task ===

async fn run_observer(observer_id: u32, url: String, duration: Duration, metrics: Arc<Metrics>) {
    let connect_start = Instant::now();

    let (mut ws, _) = match connect_async(&url).await {
        Ok(conn) => conn,
        Err(e) => {
            if observer_id < 5 {
                eprintln!("Observer {} failed to connect: {}", observer_id, e);
            }
            metrics.errors.fetch_add(1, Ordering::Relaxed);
            return;
        }
    };

    metrics
        .latency_sum_ms
        .fetch_add(connect_start.elapsed().as_millis() as u64, Ordering::Relaxed);
    metrics.latency_count.fetch_add(1, Ordering::Relaxed);
    metrics.connected.fetch_add(1, Ordering::Relaxed);

    let test_end = tokio::time::Instant::now() + duration;

    loop {
        let msg = match tokio::time::timeout_at(test_end, ws.next()).await {
            Ok(msg) => msg,
            Err(_) => break,
        };
        match msg {
            Some(Ok(Message::Text(text))) => match serde_json::from_str::<ServerMsg>(&text) {
                Ok(ServerMsg::Welcome(_)) => {
                    metrics.welcomes_received.fetch_add(1, Ordering::Relaxed);
                }
                Ok(ServerMsg::Snapshot(snapshot)) => {
                    metrics.snapshots_received.fetch_add(1, Ordering::Relaxed);
                    metrics
                        .total_balls_seen
                        .fetch_add(snapshot.balls.len() as u64, Ordering::Relaxed);
                }
                Err(_) => {
                    metrics.decode_errors.fetch_add(1, Ordering::Relaxed);
                }
            },
            Some(Ok(Message::Close(_))) | None => {
                if observer_id < 3 {
                    eprintln!("Observer {} stream ended", observer_id);
                }
                break;
            }
            Some(Err(e)) => {
                if observer_id < 3 {
                    eprintln!("Observer {} error: {}", observer_id, e);
                }
                metrics.errors.fetch_add(1, Ordering::Relaxed);
                break;
            }
            Some(Ok(_)) => {}
        }
    }

    let _ = ws.close(None).await;
    metrics.connected.fetch_sub(1, Ordering::Relaxed);
}

// === Main ===

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut num_observers: u32 = 100;
    let mut duration_secs: u64 = 30;
    let mut tick_ms: u64 = 10;
    let mut url = "ws://127.0.0.1:2345/ws".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--observers" => {
                i += 1;
                num_observers = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(100);
            }
            "--duration" => {
                i += 1;
                duration_secs = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(30);
            }
            "--tick-ms" => {
                i += 1;
                tick_ms = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(10).max(1);
            }
            "--url" => {
                i += 1;
                url = args.get(i).cloned().unwrap_or(url);
            }
            _ => {}
        }
        i += 1;
    }

    println!("=== Ballpit Server Load Test ===");
    println!("Observers: {}", num_observers);
    println!("Duration: {}s", duration_secs);
    println!("URL: {}", url);
    println!();

    let metrics = Arc::new(Metrics::default());
    let duration = Duration::from_secs(duration_secs);

    let mut handles = Vec::with_capacity(num_observers as usize);
    let spawn_start = Instant::now();

    for observer_id in 0..num_observers {
        let url = url.clone();
        let metrics = Arc::clone(&metrics);
        handles.push(tokio::spawn(run_observer(observer_id, url, duration, metrics)));

        // Stagger spawns slightly to avoid thundering herd
        if observer_id % 50 == 49 {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    println!("All observers spawned in {:?}", spawn_start.elapsed());
    println!();

    let metrics_clone = Arc::clone(&metrics);
    let stats_handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(5));
        let start = Instant::now();
        loop {
            interval.tick().await;
            println!(
                "[{:3}s] connected={}, snapshots={}, errors={}",
                start.elapsed().as_secs(),
                metrics_clone.connected.load(Ordering::Relaxed),
                metrics_clone.snapshots_received.load(Ordering::Relaxed),
                metrics_clone.errors.load(Ordering::Relaxed),
            );
        }
    });

    for handle in handles {
        let _ = handle.await;
    }
    stats_handle.abort();

    println!();
    println!("=== Final Results ===");
    let welcomes = metrics.welcomes_received.load(Ordering::Relaxed);
    let snapshots = metrics.snapshots_received.load(Ordering::Relaxed);
    let decode_errors = metrics.decode_errors.load(Ordering::Relaxed);
    let errors = metrics.errors.load(Ordering::Relaxed);
    let balls = metrics.total_balls_seen.load(Ordering::Relaxed);
    let latency_sum = metrics.latency_sum_ms.load(Ordering::Relaxed);
    let latency_count = metrics.latency_count.load(Ordering::Relaxed);

    println!("Welcomes received: {}", welcomes);
    println!("Snapshots received: {}", snapshots);
    println!("Decode errors: {}", decode_errors);
    println!("Transport errors: {}", errors);
    if snapshots > 0 {
        println!("Average balls per snapshot: {}", balls / snapshots);
    }
    if latency_count > 0 {
        println!("Average connect latency: {}ms", latency_sum / latency_count);
    }

    let per_observer = snapshots as f64 / num_observers.max(1) as f64;
    let expected = duration_secs as f64 * 1000.0 / tick_ms as f64;
    println!();
    println!("Snapshots per observer: {:.1}", per_observer);
    println!("Expected per observer: {:.1}", expected);
    if expected > 0.0 {
        println!("Delivery rate: {:.1}%", per_observer / expected * 100.0);
    }
}
