use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://mode-sync-worker.sauswaritsway.workers.dev";
pub const DEFAULT_REQUEST_TIMEOUT: &str = "10s";

const MODES_FILE: &str = "modes.json";
const DEVICE_FILE: &str = "device.json";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub user: String,
    pub data_dir: PathBuf,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    /// Enables push registration after notifications are allowed.
    pub vapid_public_key: Option<String>,
    pub push_endpoint: Option<String>,
    pub notifications_supported: bool,
}

impl ClientConfig {
    pub fn modes_path(&self) -> PathBuf {
        self.data_dir.join(MODES_FILE)
    }

    pub fn device_path(&self) -> PathBuf {
        self.data_dir.join(DEVICE_FILE)
    }
}

#[cfg(test)]
impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user: "Swarit".to_string(),
            data_dir: ".modesync".into(),
            poll_interval: Duration::from_secs(2),
            request_timeout: Duration::from_secs(10),
            vapid_public_key: None,
            push_endpoint: None,
            notifications_supported: true,
        }
    }
}
