use std::sync::Arc;

use crate::config::AgentConfig;
use crate::docker::DockerClient;
use crate::manifest::registry::ManifestRegistry;

pub struct AgentState {
    pub docker: DockerClient,
    pub registry: Arc<ManifestRegistry>,
    pub config: AgentConfig,
}

impl AgentState {
    pub fn new(docker: DockerClient, config: AgentConfig) -> Self {
        Self {
            docker,
            registry: Arc::new(ManifestRegistry::new()),
            config,
        }
    }
}

pub type SharedState = Arc<AgentState>;
