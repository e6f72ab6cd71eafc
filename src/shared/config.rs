use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub sync: SyncConfig,
    pub connectivity: ConnectivityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    pub queue_key: String,
    pub blob_dir: String,
    pub public_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub auto_sync: bool,
    /// Seconds between periodic drains, `0` disables the periodic trigger.
    pub sync_interval: u64,
    pub cooldown_ms: u64,
    pub settle_delay_ms: u64,
    /// Per-call bound on uploads and inserts, `0` disables it.
    pub remote_call_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectivityConfig {
    pub initial_online: bool,
    /// `host:port` probed over TCP, `None` leaves the state to explicit updates.
    #[serde(default)]
    pub probe_address: Option<String>,
    pub probe_interval_ms: u64,
    pub probe_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .map(|dir| dir.join("valve-inspection"))
            .unwrap_or_else(|| PathBuf::from("./data"));
        let data_dir = data_dir.to_string_lossy().into_owned();

        Self {
            database: DatabaseConfig {
                url: format!("sqlite:{data_dir}/inspections.db?mode=rwc"),
                max_connections: 5,
                connection_timeout: 30,
            },
            storage: StorageConfig {
                blob_dir: format!("{data_dir}/blobs"),
                data_dir,
                queue_key: "pending_inspections".to_string(),
                public_base_url: "http://localhost:8080/storage/inspection-photos".to_string(),
            },
            sync: SyncConfig {
                auto_sync: true,
                sync_interval: 300, // 5 minutes
                cooldown_ms: 2_000,
                settle_delay_ms: 1_000,
                remote_call_timeout_ms: 30_000,
            },
            connectivity: ConnectivityConfig {
                initial_online: true,
                probe_address: None,
                probe_interval_ms: 5_000,
                probe_timeout_ms: 2_000,
            },
        }
    }
}

impl SyncConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn remote_call_timeout(&self) -> Option<Duration> {
        if self.remote_call_timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.remote_call_timeout_ms))
        }
    }

    pub fn periodic_interval(&self) -> Option<Duration> {
        if self.auto_sync && self.sync_interval > 0 {
            Some(Duration::from_secs(self.sync_interval))
        } else {
            None
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("VALVE_DATA_DIR") {
            let dir = v.trim().trim_end_matches('/').to_string();
            if !dir.is_empty() {
                cfg.database.url = format!("sqlite:{dir}/inspections.db?mode=rwc");
                cfg.storage.blob_dir = format!("{dir}/blobs");
                cfg.storage.data_dir = dir;
            }
        }
        if let Ok(v) = std::env::var("VALVE_DATABASE_URL")
            && !v.trim().is_empty()
        {
            cfg.database.url = v.trim().to_string();
        }
        if let Ok(v) = std::env::var("VALVE_PUBLIC_BASE_URL")
            && !v.trim().is_empty()
        {
            cfg.storage.public_base_url = v.trim().trim_end_matches('/').to_string();
        }
        if let Ok(v) = std::env::var("VALVE_AUTO_SYNC") {
            cfg.sync.auto_sync = parse_bool(&v, cfg.sync.auto_sync);
        }
        if let Ok(v) = std::env::var("VALVE_SYNC_INTERVAL_SECS")
            && let Some(value) = parse_u64(&v)
        {
            cfg.sync.sync_interval = value;
        }
        if let Ok(v) = std::env::var("VALVE_SYNC_COOLDOWN_MS")
            && let Some(value) = parse_u64(&v)
        {
            cfg.sync.cooldown_ms = value;
        }
        if let Ok(v) = std::env::var("VALVE_SETTLE_DELAY_MS")
            && let Some(value) = parse_u64(&v)
        {
            cfg.sync.settle_delay_ms = value;
        }
        if let Ok(v) = std::env::var("VALVE_REMOTE_TIMEOUT_MS")
            && let Some(value) = parse_u64(&v)
        {
            cfg.sync.remote_call_timeout_ms = value;
        }
        if let Ok(v) = std::env::var("VALVE_INITIAL_ONLINE") {
            cfg.connectivity.initial_online = parse_bool(&v, cfg.connectivity.initial_online);
        }
        if let Ok(v) = std::env::var("VALVE_PROBE_ADDRESS") {
            let address = v.trim();
            cfg.connectivity.probe_address = if address.is_empty() {
                None
            } else {
                Some(address.to_string())
            };
        }
        if let Ok(v) = std::env::var("VALVE_PROBE_INTERVAL_MS")
            && let Some(value) = parse_u64(&v)
        {
            cfg.connectivity.probe_interval_ms = value.max(100);
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if self.storage.queue_key.trim().is_empty() {
            return Err("Storage queue_key cannot be empty".to_string());
        }
        if self.storage.public_base_url.trim().is_empty() {
            return Err("Storage public_base_url cannot be empty".to_string());
        }
        if let Some(address) = &self.connectivity.probe_address
            && !address.contains(':')
        {
            return Err("Connectivity probe_address must be host:port".to_string());
        }
        if self.connectivity.probe_interval_ms == 0 {
            return Err("Connectivity probe_interval_ms must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}
