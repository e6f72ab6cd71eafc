use crate::application::ports::ConnectivityProbe;
use crate::application::services::ConnectivityMonitor;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

/// Reports online when a TCP connection to `address` opens within the timeout.
pub struct TcpConnectivityProbe {
    address: String,
    timeout: Duration,
}

impl TcpConnectivityProbe {
    pub fn new(address: impl Into<String>, timeout: Duration) -> Self {
        Self {
            address: address.into(),
            timeout,
        }
    }
}

#[async_trait]
impl ConnectivityProbe for TcpConnectivityProbe {
    async fn probe(&self) -> bool {
        match tokio::time::timeout(self.timeout, TcpStream::connect(&self.address)).await {
            Ok(Ok(_)) => true,
            Ok(Err(err)) => {
                tracing::trace!(target: "connectivity", address = %self.address, error = %err, "probe refused");
                false
            }
            Err(_) => {
                tracing::trace!(target: "connectivity", address = %self.address, "probe timed out");
                false
            }
        }
    }
}

/// Polls `probe` every `interval` and feeds the result into `monitor`.
pub fn spawn_probe_loop(
    probe: Arc<dyn ConnectivityProbe>,
    monitor: Arc<ConnectivityMonitor>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let online = probe.probe().await;
            monitor.set_online(online);
        }
    })
}
