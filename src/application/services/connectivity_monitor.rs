use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};

const EVENT_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityEvent {
    WentOnline,
    WentOffline,
}

/// Current online state plus edge-triggered transition events.
pub struct ConnectivityMonitor {
    state: watch::Sender<bool>,
    events: broadcast::Sender<ConnectivityEvent>,
}

impl ConnectivityMonitor {
    pub fn new(initially_online: bool) -> Self {
        let (state, _) = watch::channel(initially_online);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { state, events }
    }

    pub fn is_online(&self) -> bool {
        *self.state.borrow()
    }

    /// Records the platform signal. Emits an event only when the state flips.
    pub fn set_online(&self, online: bool) -> Option<ConnectivityEvent> {
        let changed = self.state.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
        if !changed {
            return None;
        }

        let event = if online {
            ConnectivityEvent::WentOnline
        } else {
            ConnectivityEvent::WentOffline
        };
        tracing::info!(target: "connectivity", ?event, "connectivity changed");
        // No subscribers is fine, the state above is still authoritative.
        let _ = self.events.send(event);
        Some(event)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConnectivityEvent> {
        self.events.subscribe()
    }

    pub fn watch(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_from_platform_signal() {
        assert!(ConnectivityMonitor::new(true).is_online());
        assert!(!ConnectivityMonitor::new(false).is_online());
    }

    #[tokio::test]
    async fn transitions_are_edge_triggered() {
        let monitor = ConnectivityMonitor::new(false);
        let mut events = monitor.subscribe();

        assert_eq!(monitor.set_online(true), Some(ConnectivityEvent::WentOnline));
        assert_eq!(monitor.set_online(true), None);
        assert_eq!(monitor.set_online(false), Some(ConnectivityEvent::WentOffline));
        assert_eq!(monitor.set_online(false), None);

        assert_eq!(events.recv().await.unwrap(), ConnectivityEvent::WentOnline);
        assert_eq!(events.recv().await.unwrap(), ConnectivityEvent::WentOffline);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn watchers_see_latest_state() {
        let monitor = ConnectivityMonitor::new(true);
        let mut watcher = monitor.watch();

        monitor.set_online(false);
        watcher.changed().await.unwrap();
        assert!(!*watcher.borrow());
    }
}
