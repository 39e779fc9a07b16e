//! Health monitor behaviour against live mock backends.

mod common;

use common::*;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use http_balancer::config::HealthCheckConfig;
use http_balancer::health::{CycleOutcome, HealthMonitor, ProbeOutcome};
use http_balancer::load_balancer::BackendRegistry;
use http_balancer::Shutdown;

fn check_config(timeout_secs: u64) -> HealthCheckConfig {
    HealthCheckConfig {
        enabled: true,
        interval_secs: 1,
        timeout_secs,
    }
}

/// In-memory sink for formatted tracing output.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    fn lines_containing(&self, needle: &str) -> Vec<String> {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes)
            .lines()
            .filter(|line| line.contains(needle))
            .map(str::to_string)
            .collect()
    }
}

#[tokio::test]
async fn test_cycle_classifies_each_backend() {
    let ok = start_json_backend("ok").await;
    let broken = start_programmable_backend(|_| async {
        MockResponse::new(500, "text/plain", "boom")
    })
    .await;
    let dead = unused_addr().await;

    let registry = Arc::new(BackendRegistry::new(&[
        backend_config(ok),
        backend_config(broken),
        backend_config(dead),
    ]));
    let monitor = HealthMonitor::new(registry.clone(), check_config(1));
    let shutdown = Shutdown::new();
    let mut listener = shutdown.subscribe();

    assert_eq!(monitor.run_cycle(&mut listener).await, CycleOutcome::Completed);

    let healthy: Vec<u16> = registry.list_healthy().iter().map(|b| b.port).collect();
    assert_eq!(healthy, vec![ok.port()]);
    assert!(registry.list_all().iter().all(|b| b.last_check.is_some()));
}

#[tokio::test]
async fn test_probe_uses_health_path() {
    let backend = start_programmable_backend(|req| async move {
        if req.path == "/status" {
            MockResponse::new(204, "text/plain", "")
        } else {
            MockResponse::new(404, "text/plain", "not here")
        }
    })
    .await;

    let mut config = backend_config(backend);
    config.health_path = "/status".to_string();
    let registry = Arc::new(BackendRegistry::new(&[config]));
    let monitor = HealthMonitor::new(registry.clone(), check_config(1));

    let view = registry.list_all().remove(0);
    assert!(monitor.probe(&view).await.is_healthy());
}

#[tokio::test]
async fn test_probe_times_out() {
    let backend = start_programmable_backend(|_| async {
        tokio::time::sleep(Duration::from_secs(3)).await;
        MockResponse::json("{}")
    })
    .await;

    let registry = Arc::new(BackendRegistry::new(&[backend_config(backend)]));
    let monitor = HealthMonitor::new(registry.clone(), check_config(1));

    let view = registry.list_all().remove(0);
    let started = std::time::Instant::now();
    assert_eq!(monitor.probe(&view).await, ProbeOutcome::TimedOut);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_backend_recovers() {
    let up = Arc::new(AtomicBool::new(false));
    let flag = up.clone();
    let backend = start_programmable_backend(move |_| {
        let up = flag.load(Ordering::SeqCst);
        async move {
            if up {
                MockResponse::json(r#"{"status":"healthy"}"#)
            } else {
                MockResponse::new(503, "text/plain", "starting")
            }
        }
    })
    .await;

    let registry = Arc::new(BackendRegistry::new(&[backend_config(backend)]));
    let monitor = HealthMonitor::new(registry.clone(), check_config(1));
    let shutdown = Shutdown::new();
    let mut listener = shutdown.subscribe();

    monitor.run_cycle(&mut listener).await;
    assert!(registry.list_healthy().is_empty());

    up.store(true, Ordering::SeqCst);
    monitor.run_cycle(&mut listener).await;
    assert_eq!(registry.list_healthy().len(), 1);
}

#[tokio::test]
async fn test_cycle_stops_before_probing_after_shutdown() {
    let backend = start_json_backend("ok").await;

    let registry = Arc::new(BackendRegistry::new(&[backend_config(backend)]));
    let monitor = HealthMonitor::new(registry.clone(), check_config(1));
    let shutdown = Shutdown::new();
    let mut listener = shutdown.subscribe();
    shutdown.trigger();

    assert_eq!(monitor.run_cycle(&mut listener).await, CycleOutcome::Stopped);
    assert!(registry.list_all()[0].last_check.is_none());
}

#[tokio::test]
async fn test_shutdown_interrupts_in_flight_probe() {
    let backend = start_programmable_backend(|_| async {
        tokio::time::sleep(Duration::from_secs(10)).await;
        MockResponse::json("{}")
    })
    .await;

    let registry = Arc::new(BackendRegistry::new(&[backend_config(backend)]));
    let monitor = HealthMonitor::new(registry.clone(), check_config(30));
    let shutdown = Shutdown::new();
    let handle = monitor.spawn(shutdown.subscribe());

    tokio::time::sleep(Duration::from_millis(200)).await;
    shutdown.trigger();

    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("monitor stops promptly")
        .unwrap();
    assert!(registry.list_all()[0].last_check.is_none());
}

#[tokio::test]
async fn test_disabled_monitor_returns_immediately() {
    let backend = start_json_backend("ok").await;
    let registry = Arc::new(BackendRegistry::new(&[backend_config(backend)]));

    let mut config = check_config(1);
    config.enabled = false;
    let shutdown = Shutdown::new();

    tokio::time::timeout(
        Duration::from_secs(1),
        HealthMonitor::new(registry.clone(), config).run(shutdown.subscribe()),
    )
    .await
    .unwrap();
    assert!(registry.list_all()[0].last_check.is_none());
}

#[tokio::test]
async fn test_only_state_changes_are_announced() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer({
            let logs = logs.clone();
            move || logs.clone()
        })
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let probes = Arc::new(AtomicUsize::new(0));
    let counter = probes.clone();
    let backend = start_programmable_backend(move |_| {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        async move {
            if n == 0 {
                MockResponse::json(r#"{"status":"healthy"}"#)
            } else {
                MockResponse::new(500, "text/plain", "down")
            }
        }
    })
    .await;

    let registry = Arc::new(BackendRegistry::new(&[backend_config(backend)]));
    let monitor = HealthMonitor::new(registry.clone(), check_config(1));
    let shutdown = Shutdown::new();
    let mut listener = shutdown.subscribe();

    for _ in 0..3 {
        assert_eq!(monitor.run_cycle(&mut listener).await, CycleOutcome::Completed);
    }

    assert_eq!(probes.load(Ordering::SeqCst), 3);
    assert_eq!(logs.lines_containing("Health check").len(), 3);

    let transitions = logs.lines_containing("Backend state changed");
    assert_eq!(transitions.len(), 1, "{transitions:?}");
    assert!(transitions[0].contains("from=HEALTHY"));
    assert!(transitions[0].contains("to=UNHEALTHY"));
}
