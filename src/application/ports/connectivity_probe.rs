use async_trait::async_trait;

/// Platform signal for network reachability.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn probe(&self) -> bool;
}
