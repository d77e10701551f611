//! Boot — logging init, config load, Docker connection, state creation.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AgentConfig;
use crate::docker::DockerClient;
use crate::model::AGENT_VERSION;
use crate::state::{AgentState, SharedState};

/// Initialise the tracing / logging subsystem.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agent=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Load config, connect to Docker, and build shared state.
pub async fn boot() -> Result<SharedState, Box<dyn std::error::Error>> {
    info!("starting gantry agent v{}", AGENT_VERSION);

    let config = AgentConfig::load()?;
    config.validate()?;
    info!(
        node_id = %config.node_id,
        node_name = %config.node_name,
        heartbeat_secs = config.heartbeat_secs,
        "loaded configuration"
    );

    info!(
        "connecting to Docker daemon at: {}",
        if config.docker_socket.is_empty() {
            "default socket"
        } else {
            &config.docker_socket
        }
    );

    let docker = DockerClient::new(&config.docker_socket).map_err(|e| {
        error!("failed to connect to Docker: {}", e);
        e
    })?;

    info!("connected to Docker daemon");

    Ok(Arc::new(AgentState::new(docker, config)))
}
