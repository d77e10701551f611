//! Runtime-agnostic views over Docker's list and inspect responses,
//! trimmed to the fields the lifecycle engine and aggregator read.

use std::collections::HashMap;

use bollard::models::{ContainerInspectResponse, ContainerSummary};

/// Basic container information derived from Docker's list API.
#[derive(Debug, Clone)]
pub struct ContainerInfo {
    pub id: String,
    /// All names, without the leading slash.
    pub names: Vec<String>,
    pub image: String,
    /// Image id, used to count live references during image GC.
    pub image_id: String,
    /// "running", "paused", "exited", ...
    pub state: String,
    pub labels: HashMap<String, String>,
}

impl ContainerInfo {
    pub fn display_name(&self) -> String {
        self.names.join(", ")
    }
}

impl From<ContainerSummary> for ContainerInfo {
    fn from(s: ContainerSummary) -> Self {
        Self {
            id: s.id.unwrap_or_default(),
            names: s
                .names
                .unwrap_or_default()
                .into_iter()
                .map(|n| n.trim_start_matches('/').to_string())
                .collect(),
            image: s.image.unwrap_or_default(),
            image_id: s.image_id.unwrap_or_default(),
            state: s
                .state
                .map(|state| state.to_string())
                .unwrap_or_else(|| "unknown".into()),
            labels: s.labels.unwrap_or_default(),
        }
    }
}

/// Detailed state from docker inspect; enough to apply the exit-code
/// policy for stopped applications.
#[derive(Debug, Clone)]
pub struct ContainerStateInfo {
    pub state: String,
    pub exit_code: i64,
}

impl From<ContainerInspectResponse> for ContainerStateInfo {
    fn from(details: ContainerInspectResponse) -> Self {
        let state = details.state.as_ref();
        Self {
            state: state
                .and_then(|s| s.status.as_ref())
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unknown".into()),
            exit_code: state.and_then(|s| s.exit_code).unwrap_or(0),
        }
    }
}

/// An image present on the host.
#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_summary_conversion_trims_name_slashes() {
        let summary = ContainerSummary {
            id: Some("abc".into()),
            names: Some(vec!["/net.a_1.0".into()]),
            image: Some("a:1".into()),
            image_id: Some("sha256:123".into()),
            ..Default::default()
        };
        let info = ContainerInfo::from(summary);
        assert_eq!(info.names, vec!["net.a_1.0".to_string()]);
        assert_eq!(info.display_name(), "net.a_1.0");
        assert_eq!(info.state, "unknown");
    }

    #[test]
    fn inspect_conversion_defaults_exit_code_to_zero() {
        let info = ContainerStateInfo::from(ContainerInspectResponse::default());
        assert_eq!(info.exit_code, 0);
        assert_eq!(info.state, "unknown");
    }
}
