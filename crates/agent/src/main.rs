use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use agent::edgeapp::status::{self, EdgeAppMsg};
use agent::edgeapp::EdgeAppEngine;
use agent::handler::Dispatcher;
use agent::model::{NodeInfo, NodeStatus};
use agent::runtime::boot;
use agent::secret::PlaintextSecretStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    boot::init_logging();
    let state = boot::boot().await?;

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
    let engine = Arc::new(EdgeAppEngine::new(
        Arc::new(state.docker.clone()),
        state.registry.clone(),
        outbound_tx,
        state.config.org_key_hash.clone(),
    ));
    let secrets = Arc::new(PlaintextSecretStore::new(state.config.org_key_hash.clone()));
    let node = NodeInfo {
        id: state.config.node_id.clone(),
        name: state.config.node_name.clone(),
    };
    let dispatcher = Arc::new(Dispatcher::new(engine.clone(), secrets, node));

    // Publisher: drains snapshots for the message-bus client. Until one
    // is wired in, each snapshot is emitted as a JSON log line.
    let debug_status_log = state.config.debug_status_log;
    tokio::spawn(async move {
        while let Some(snapshot) = outbound_rx.recv().await {
            match serde_json::to_string(&snapshot) {
                Ok(payload) if debug_status_log => {
                    info!(target: "outbound", %payload, "status snapshot")
                }
                Ok(payload) => debug!(target: "outbound", %payload, "status snapshot"),
                Err(err) => error!(error = %err, "failed to serialize status snapshot"),
            }
        }
    });

    engine.set_node_status(NodeStatus::Connected);
    engine.send_status().await;

    // Offline provisioning: deploy a local manifest when configured.
    if let Some(path) = &state.config.manifest_path {
        info!(path = %path, "deploying local manifest");
        let payload = tokio::fs::read(path).await?;
        if let Err(err) = dispatcher.process_orchestration_message(&payload).await {
            error!(error = %err, "local manifest deployment failed");
        }
    }

    // Heartbeat: a full snapshot on a fixed interval.
    let heartbeat_engine = engine.clone();
    let heartbeat_secs = state.config.heartbeat_secs;
    tokio::spawn(async move {
        let mut interval = time::interval(Duration::from_secs(heartbeat_secs));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            heartbeat_engine.send_status().await;
        }
    });

    // Monitor: publish early when the per-app statuses drift between
    // heartbeats.
    let monitor_engine = engine.clone();
    let monitor_secs = state.config.monitor_secs;
    tokio::spawn(async move {
        let mut interval = time::interval(Duration::from_secs(monitor_secs));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut previous: Vec<EdgeAppMsg> = Vec::new();
        loop {
            interval.tick().await;
            match status::statuses_changed(
                monitor_engine.docker(),
                monitor_engine.registry(),
                &previous,
            )
            .await
            {
                Ok((latest, changed)) => {
                    if changed {
                        monitor_engine.send_status().await;
                    }
                    previous = latest;
                }
                Err(err) => warn!(error = %err, "status comparison failed"),
            }
        }
    });

    shutdown_signal().await;

    info!("shutting down");
    engine.set_node_status(NodeStatus::Disconnected);
    engine.send_status().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
