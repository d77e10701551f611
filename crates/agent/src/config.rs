//! Agent configuration.
//!
//! Priority: environment variables > config file > defaults. The file
//! path comes from `AGENT_CONFIG_FILE` and falls back to
//! `/etc/gantry/agent.toml`.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Stable node identity; generated once when left blank.
    pub node_id: String,
    pub node_name: String,
    /// Empty means the platform default socket.
    pub docker_socket: String,
    /// Interval between full status snapshots.
    pub heartbeat_secs: u64,
    /// Interval between drift checks that publish early on change.
    pub monitor_secs: u64,
    /// Reported with every snapshot so the orchestrator can match the
    /// organization key in use.
    pub org_key_hash: String,
    /// Optional manifest deployed at boot, for offline provisioning.
    pub manifest_path: Option<String>,
    /// Log every outbound snapshot payload at info level instead of
    /// debug.
    pub debug_status_log: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            node_id: String::new(),
            node_name: "edge-node".to_string(),
            docker_socket: String::new(),
            heartbeat_secs: 30,
            monitor_secs: 5,
            org_key_hash: String::new(),
            manifest_path: None,
            debug_status_log: false,
        }
    }
}

impl AgentConfig {
    /// Load configuration from file or environment variables.
    /// Environment variables always override file settings.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = std::env::var("AGENT_CONFIG_FILE")
            .unwrap_or_else(|_| "/etc/gantry/agent.toml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            tracing::info!("loading configuration from {}", config_path);
            Self::from_file(&config_path)?
        } else {
            tracing::info!(
                "config file not found at {}, using environment variables",
                config_path
            );
            Self::default()
        };

        if let Ok(node_id) = std::env::var("AGENT_NODE_ID") {
            config.node_id = node_id;
        }
        if let Ok(node_name) = std::env::var("AGENT_NODE_NAME") {
            config.node_name = node_name;
        }
        if let Ok(socket) = std::env::var("DOCKER_SOCKET") {
            config.docker_socket = socket;
        }
        if let Ok(heartbeat) = std::env::var("AGENT_HEARTBEAT_SECS") {
            if let Ok(heartbeat) = heartbeat.parse() {
                config.heartbeat_secs = heartbeat;
            }
        }
        if let Ok(monitor) = std::env::var("AGENT_MONITOR_SECS") {
            if let Ok(monitor) = monitor.parse() {
                config.monitor_secs = monitor;
            }
        }
        if let Ok(debug_status_log) = std::env::var("AGENT_DEBUG_STATUS_LOG") {
            if let Ok(debug_status_log) = debug_status_log.parse() {
                config.debug_status_log = debug_status_log;
            }
        }
        if let Ok(hash) = std::env::var("AGENT_ORG_KEY_HASH") {
            config.org_key_hash = hash;
        }
        if let Ok(path) = std::env::var("AGENT_MANIFEST_PATH") {
            config.manifest_path = Some(path);
        }

        if config.node_id.is_empty() {
            config.node_id = uuid::Uuid::new_v4().to_string();
            tracing::info!(node_id = %config.node_id, "generated node id");
        }

        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: AgentConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.node_name.trim().is_empty() {
            return Err("node_name must not be empty".to_string());
        }
        if self.heartbeat_secs == 0 {
            return Err("heartbeat_secs must be at least 1".to_string());
        }
        if self.monitor_secs == 0 {
            return Err("monitor_secs must be at least 1".to_string());
        }
        if let Some(path) = &self.manifest_path {
            if !Path::new(path).exists() {
                return Err(format!("manifest file does not exist: {path}"));
            }
        }
        Ok(())
    }
}
