//! Core identifiers and status enums shared across the agent.

use serde::{Deserialize, Serialize};

/// Agent version reported in every outbound status snapshot.
pub const AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Orchestrator-assigned manifest identifier. Equality on this id defines
/// manifest identity; every other manifest field is metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ManifestUniqueID(String);

impl ManifestUniqueID {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ManifestUniqueID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ManifestUniqueID {
    fn from(id: String) -> Self {
        ManifestUniqueID(id)
    }
}

impl From<&str> for ManifestUniqueID {
    fn from(id: &str) -> Self {
        ManifestUniqueID(id.to_string())
    }
}

/// Lifecycle status of an edge application as recorded in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeAppStatus {
    Initiated,
    Executing,
    Running,
    Stopped,
    Undeployed,
    Error,
}

impl EdgeAppStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeAppStatus::Initiated => "Initiated",
            EdgeAppStatus::Executing => "Executing",
            EdgeAppStatus::Running => "Running",
            EdgeAppStatus::Stopped => "Stopped",
            EdgeAppStatus::Undeployed => "Undeployed",
            EdgeAppStatus::Error => "Error",
        }
    }
}

impl std::fmt::Display for EdgeAppStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall node status attached to outbound snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeStatus {
    Connected,
    Disconnected,
    Deleted,
}

impl std::fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NodeStatus::Connected => "Connected",
            NodeStatus::Disconnected => "Disconnected",
            NodeStatus::Deleted => "Deleted",
        };
        f.write_str(s)
    }
}

/// Identity of this node, injected into every module's environment.
#[derive(Debug, Clone)]
pub struct NodeInfo {
    pub id: String,
    pub name: String,
}
