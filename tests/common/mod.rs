#![allow(dead_code)]

use rask_log_relay::app::Relay;
use rask_log_relay::config::Settings;
use rask_log_relay::error::RelayError;
use rask_log_relay::pipeline::QueueStats;
use rask_log_relay::port::LogSink;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const WAIT: Duration = Duration::from_secs(5);

/// `alice:wonderland`
pub const ALICE_DIGEST: &str = "50becea50aa4ad0810518ae279143087";

/// Relay serving on an ephemeral loopback port.
pub struct RunningRelay {
    pub addr: SocketAddr,
    pub shutdown: CancellationToken,
    pub stats: Arc<QueueStats>,
    pub handle: JoinHandle<Result<(), RelayError>>,
}

impl RunningRelay {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn ws_url(&self, path: &str) -> String {
        format!("ws://{}{path}", self.addr)
    }

    /// Cancel the relay and wait until the workers have drained.
    pub async fn stop(self) {
        self.shutdown.cancel();
        let result = tokio::time::timeout(WAIT, self.handle)
            .await
            .expect("relay did not stop in time")
            .expect("relay task panicked");
        assert!(result.is_ok(), "relay failed: {result:?}");
    }
}

/// Settings with one user (`alice`) and the given queue shape.
pub fn settings(workers: usize, queue_capacity: usize, outputs: &str) -> Settings {
    let yaml = format!(
        r#"
port: 9600
users:
  - username: alice
    password: wonderland
workers: {workers}
queue_capacity: {queue_capacity}
outputs: {outputs}
"#
    );
    let settings = Settings::from_yaml(&yaml).unwrap();
    settings.validate().unwrap();
    settings
}

pub async fn start(settings: &Settings, sinks: Vec<Arc<dyn LogSink>>) -> RunningRelay {
    let shutdown = CancellationToken::new();
    let relay = Relay::build(settings, sinks, shutdown.clone()).unwrap();
    let stats = relay.queue_stats();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(relay.serve_on(listener));
    RunningRelay {
        addr,
        shutdown,
        stats,
        handle,
    }
}
