//! Orchestration message handling.
//!
//! Pure demultiplexer: classifies an inbound payload as a full manifest
//! (DEPLOY only) or a bare `{_id, command}` message, invokes the
//! lifecycle engine, and pushes a fresh snapshot afterwards regardless
//! of the outcome. Also carries the node-delete trigger.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::docker::ContainerRuntime;
use crate::edgeapp::{Command, EdgeAppEngine, EdgeAppError};
use crate::manifest::{CommandMsg, Manifest, ManifestMsg};
use crate::model::{ManifestUniqueID, NodeInfo, NodeStatus};
use crate::secret::SecretStore;

pub struct Dispatcher<D, S> {
    engine: Arc<EdgeAppEngine<D>>,
    secrets: Arc<S>,
    node: NodeInfo,
}

impl<D: ContainerRuntime, S: SecretStore> Dispatcher<D, S> {
    pub fn new(engine: Arc<EdgeAppEngine<D>>, secrets: Arc<S>, node: NodeInfo) -> Self {
        Self {
            engine,
            secrets,
            node,
        }
    }

    /// Process one inbound orchestration payload. A fresh status
    /// snapshot is pushed after the engine returns, success or failure.
    pub async fn process_orchestration_message(
        &self,
        payload: &[u8],
    ) -> Result<(), EdgeAppError> {
        debug!(bytes = payload.len(), "processing orchestration message");

        let result = self.route(payload).await;
        if let Err(err) = &result {
            error!(error = %err, "orchestration command failed");
        }

        self.engine.send_status().await;

        result
    }

    async fn route(&self, payload: &[u8]) -> Result<(), EdgeAppError> {
        // A manifest-shaped payload carries the modules array; anything
        // else falls through to the bare command form.
        if let Ok(msg) = serde_json::from_slice::<ManifestMsg>(payload) {
            if msg.command != Command::Deploy.as_str() {
                return Err(EdgeAppError::RejectedManifestCommand(msg.command));
            }
            let manifest = Manifest::from_msg(msg, self.secrets.as_ref(), &self.node)?;
            return self.engine.deploy(manifest).await;
        }

        let msg = CommandMsg::parse(payload)?;
        let unique_id = ManifestUniqueID::from(msg.id);
        info!(%unique_id, command = %msg.command, "received command");

        match msg.command.parse::<Command>()? {
            Command::Deploy => Err(EdgeAppError::DeployWithoutManifest),
            Command::Stop => self.engine.stop(&unique_id).await,
            Command::Resume => self.engine.resume(&unique_id).await,
            Command::Undeploy => self.engine.undeploy(&unique_id).await,
            Command::Remove => self.engine.remove(&unique_id, &[]).await,
        }
    }

    /// Node deletion: remove every edge app best-effort, mark the node
    /// deleted, report.
    pub async fn process_node_delete(&self) {
        info!("deleting node");

        if let Err(err) = self.engine.remove_all().await {
            error!(error = %err, "node deletion failed");
        }

        self.engine.set_node_status(NodeStatus::Deleted);
        self.engine.send_status().await;
    }
}
