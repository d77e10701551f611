//! Edge application lifecycle engine.
//!
//! Orchestrates DEPLOY / STOP / RESUME / UNDEPLOY / REMOVE / REMOVE_ALL
//! against the container runtime, enforces the status state machine,
//! rolls back partial deployments, and pushes a status snapshot after
//! every transition.

pub mod status;

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::docker::{ContainerRuntime, DockerError};
use crate::manifest::registry::{ManifestRegistry, UnknownManifest};
use crate::manifest::{Manifest, ManifestError};
use crate::model::{EdgeAppStatus, ManifestUniqueID, NodeStatus};
use self::status::StatusMsg;

/// Container state words as reported by the runtime's list API.
pub const MODULE_RUNNING: &str = "running";
pub const MODULE_EXITED: &str = "exited";

#[derive(Error, Debug)]
pub enum EdgeAppError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error("can't {action} edge application {id} with status {status}")]
    Precondition {
        action: &'static str,
        id: ManifestUniqueID,
        status: EdgeAppStatus,
    },
    #[error("edge application {0} already exists")]
    AlreadyExists(ManifestUniqueID),
    #[error("edge application {0} does not exist")]
    NotFound(ManifestUniqueID),
    #[error("no containers found for edge application {0}")]
    NoContainers(ManifestUniqueID),
    #[error("no valid containers in manifest")]
    EmptyManifest,
    #[error("unable to pull image {image}: {source}")]
    ImagePull { image: String, source: DockerError },
    #[error("container runtime error: {0}")]
    Driver(#[from] DockerError),
    #[error("edge application could not be {} completely. Cause(s): {}", .action, .causes.join(", "))]
    Accumulated {
        action: &'static str,
        causes: Vec<String>,
    },
    #[error("unknown command {0:?}")]
    UnknownCommand(String),
    #[error("command {0:?} is not valid on a full manifest payload")]
    RejectedManifestCommand(String),
    #[error("DEPLOY requires a full manifest payload")]
    DeployWithoutManifest,
}

impl From<UnknownManifest> for EdgeAppError {
    fn from(err: UnknownManifest) -> Self {
        EdgeAppError::NotFound(err.0)
    }
}

/// Orchestration verbs accepted from the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Deploy,
    Stop,
    Resume,
    Undeploy,
    Remove,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Deploy => "DEPLOY",
            Command::Stop => "STOP",
            Command::Resume => "RESUME",
            Command::Undeploy => "UNDEPLOY",
            Command::Remove => "REMOVE",
        }
    }
}

impl FromStr for Command {
    type Err = EdgeAppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEPLOY" => Ok(Command::Deploy),
            "STOP" => Ok(Command::Stop),
            "RESUME" => Ok(Command::Resume),
            "UNDEPLOY" => Ok(Command::Undeploy),
            "REMOVE" => Ok(Command::Remove),
            other => Err(EdgeAppError::UnknownCommand(other.to_string())),
        }
    }
}

pub struct EdgeAppEngine<D> {
    docker: Arc<D>,
    registry: Arc<ManifestRegistry>,
    outbound: mpsc::UnboundedSender<StatusMsg>,
    node_status: Mutex<NodeStatus>,
    org_key_hash: String,
}

impl<D: ContainerRuntime> EdgeAppEngine<D> {
    pub fn new(
        docker: Arc<D>,
        registry: Arc<ManifestRegistry>,
        outbound: mpsc::UnboundedSender<StatusMsg>,
        org_key_hash: String,
    ) -> Self {
        Self {
            docker,
            registry,
            outbound,
            node_status: Mutex::new(NodeStatus::Disconnected),
            org_key_hash,
        }
    }

    pub fn docker(&self) -> &D {
        &self.docker
    }

    pub fn registry(&self) -> &ManifestRegistry {
        &self.registry
    }

    pub fn node_status(&self) -> NodeStatus {
        *self.node_status.lock().unwrap()
    }

    pub fn set_node_status(&self, status: NodeStatus) {
        *self.node_status.lock().unwrap() = status;
    }

    /// DEPLOY: version check, register, pull, network, wire, start in
    /// reverse module order, commit. Every phase after registration rolls
    /// back through REMOVE on failure.
    pub async fn deploy(&self, manifest: Manifest) -> Result<(), EdgeAppError> {
        let unique_id = manifest.unique_id.clone();
        info!(%unique_id, "deploying edge app");

        if let Some(existing) = self.registry.get(&unique_id) {
            if existing.status != EdgeAppStatus::Undeployed {
                if existing.manifest.updated_at < manifest.updated_at {
                    // Replace the older version, keeping the images the
                    // new one is about to use.
                    let keep = manifest.image_names();
                    if let Err(err) = self.remove(&unique_id, &keep).await {
                        warn!(%unique_id, error = %err, "removal of previous version was incomplete");
                    }
                } else {
                    return Err(EdgeAppError::AlreadyExists(unique_id));
                }
            }
        }

        self.registry.add(manifest.clone());
        self.set_and_send_status(&unique_id, EdgeAppStatus::Executing)
            .await;

        for module in &manifest.modules {
            if self.docker.image_exists(&module.image_name_full).await? {
                info!(image = %module.image_name_full, "image already exists on host");
                continue;
            }
            info!(image = %module.image_name_full, "pulling image");
            if let Err(source) = self
                .docker
                .pull_image(&module.auth, &module.image_name_full)
                .await
            {
                error!(image = %module.image_name_full, error = %source, "unable to pull image");
                self.set_and_send_status(&unique_id, EdgeAppStatus::Error)
                    .await;
                self.roll_back(&unique_id).await;
                return Err(EdgeAppError::ImagePull {
                    image: module.image_name_full.clone(),
                    source,
                });
            }
        }

        info!(%unique_id, "creating network");
        let network_name = match self
            .docker
            .create_network(&manifest.manifest_name, &manifest.labels)
            .await
        {
            Ok(name) => name,
            Err(err) => {
                error!(%unique_id, error = %err, "network creation failed");
                self.set_and_send_status(&unique_id, EdgeAppStatus::Error)
                    .await;
                self.roll_back(&unique_id).await;
                return Err(err.into());
            }
        };
        info!(%unique_id, network = %network_name, "created network");

        let modules = self.registry.apply_network(&unique_id, &network_name)?;
        if modules.is_empty() {
            error!(%unique_id, "no valid containers in manifest");
            self.set_and_send_status(&unique_id, EdgeAppStatus::Error)
                .await;
            self.roll_back(&unique_id).await;
            return Err(EdgeAppError::EmptyManifest);
        }

        // Final stage first, so upstream modules only ever connect to
        // already-listening downstream endpoints.
        for config in modules.iter().rev() {
            info!(container = %config.container_name, image = %config.image_name_full, "creating container");
            match self.docker.create_and_start_container(config).await {
                Ok(container_id) => {
                    info!(container = %config.container_name, id = %container_id, "container started");
                }
                Err(err) => {
                    error!(container = %config.container_name, error = %err, "failed to create and start container");
                    self.set_and_send_status(&unique_id, EdgeAppStatus::Error)
                        .await;
                    self.roll_back(&unique_id).await;
                    return Err(err.into());
                }
            }
        }

        self.set_and_send_status(&unique_id, EdgeAppStatus::Running)
            .await;

        Ok(())
    }

    /// STOP: only valid on a Running app; stops every running container,
    /// skipping the rest. No rollback on failure.
    pub async fn stop(&self, unique_id: &ManifestUniqueID) -> Result<(), EdgeAppError> {
        info!(%unique_id, "stopping edge app");

        let current = self
            .registry
            .status(unique_id)
            .ok_or_else(|| EdgeAppError::NotFound(unique_id.clone()))?;
        if current != EdgeAppStatus::Running {
            return Err(EdgeAppError::Precondition {
                action: "stop",
                id: unique_id.clone(),
                status: current,
            });
        }

        let containers = self.docker.edge_app_containers(unique_id).await?;
        if containers.is_empty() {
            self.set_and_send_status(unique_id, EdgeAppStatus::Error)
                .await;
            return Err(EdgeAppError::NoContainers(unique_id.clone()));
        }

        self.set_and_send_status(unique_id, EdgeAppStatus::Executing)
            .await;

        for container in &containers {
            if container.state == MODULE_RUNNING {
                info!(container = %container.display_name(), "stopping container");
                if let Err(err) = self.docker.stop_container(&container.id).await {
                    error!(container = %container.display_name(), error = %err, "could not stop container");
                    self.set_and_send_status(unique_id, EdgeAppStatus::Error)
                        .await;
                    return Err(err.into());
                }
            } else {
                debug!(container = %container.display_name(), state = %container.state, "container not running, skipping");
            }
        }

        self.set_and_send_status(unique_id, EdgeAppStatus::Stopped)
            .await;

        Ok(())
    }

    /// RESUME: only valid on a Stopped app; starts every non-running
    /// container in reverse order. No rollback on failure.
    pub async fn resume(&self, unique_id: &ManifestUniqueID) -> Result<(), EdgeAppError> {
        info!(%unique_id, "resuming edge app");

        let current = self
            .registry
            .status(unique_id)
            .ok_or_else(|| EdgeAppError::NotFound(unique_id.clone()))?;
        if current != EdgeAppStatus::Stopped {
            return Err(EdgeAppError::Precondition {
                action: "resume",
                id: unique_id.clone(),
                status: current,
            });
        }

        let containers = match self.docker.edge_app_containers(unique_id).await {
            Ok(containers) => containers,
            Err(err) => {
                error!(%unique_id, error = %err, "failed to read edge app containers");
                self.set_and_send_status(unique_id, EdgeAppStatus::Error)
                    .await;
                return Err(err.into());
            }
        };
        if containers.is_empty() {
            self.set_and_send_status(unique_id, EdgeAppStatus::Error)
                .await;
            return Err(EdgeAppError::NoContainers(unique_id.clone()));
        }

        self.set_and_send_status(unique_id, EdgeAppStatus::Executing)
            .await;

        for container in containers.iter().rev() {
            if container.state != MODULE_RUNNING {
                info!(container = %container.display_name(), "starting container");
                if let Err(err) = self.docker.start_container(&container.id).await {
                    error!(container = %container.display_name(), error = %err, "could not start container");
                    self.set_and_send_status(unique_id, EdgeAppStatus::Error)
                        .await;
                    return Err(err.into());
                }
            } else {
                debug!(container = %container.display_name(), state = %container.state, "container already running, skipping");
            }
        }

        self.set_and_send_status(unique_id, EdgeAppStatus::Running)
            .await;

        Ok(())
    }

    /// UNDEPLOY: valid on any known app. Stop-and-remove every container,
    /// prune the network; errors are accumulated rather than fail-fast.
    pub async fn undeploy(&self, unique_id: &ManifestUniqueID) -> Result<(), EdgeAppError> {
        info!(%unique_id, "undeploying edge app");

        if self.registry.get(unique_id).is_none() {
            return Err(EdgeAppError::NotFound(unique_id.clone()));
        }

        self.set_and_send_status(unique_id, EdgeAppStatus::Executing)
            .await;

        let containers = match self.docker.edge_app_containers(unique_id).await {
            Ok(containers) => containers,
            Err(err) => {
                error!(%unique_id, error = %err, "failed to read edge app containers");
                self.set_and_send_status(unique_id, EdgeAppStatus::Error)
                    .await;
                return Err(err.into());
            }
        };

        let mut causes = Vec::new();

        for container in &containers {
            if let Err(err) = self.docker.stop_and_remove_container(&container.id).await {
                error!(container = %container.display_name(), error = %err, "failed to remove container");
                causes.push(err.to_string());
            }
        }

        info!(%unique_id, "pruning networks");
        if let Err(err) = self.docker.prune_networks(unique_id).await {
            error!(%unique_id, error = %err, "failed to prune networks");
            causes.push(err.to_string());
        }

        if !causes.is_empty() {
            self.set_and_send_status(unique_id, EdgeAppStatus::Error)
                .await;
            return Err(EdgeAppError::Accumulated {
                action: "undeployed",
                causes,
            });
        }

        self.set_and_send_status(unique_id, EdgeAppStatus::Undeployed)
            .await;

        Ok(())
    }

    /// REMOVE: UNDEPLOY, then garbage-collect the app's images (minus
    /// `keep_images` and anything still referenced by a live container),
    /// then forget the manifest.
    pub async fn remove(
        &self,
        unique_id: &ManifestUniqueID,
        keep_images: &[String],
    ) -> Result<(), EdgeAppError> {
        info!(%unique_id, "removing edge app");

        self.undeploy(unique_id).await?;

        // Modules may share an image, so the per-module name list must
        // be deduplicated before removal.
        let used_images = self.registry.used_images(unique_id)?;
        let mut seen_names = HashSet::new();
        let remove_names: Vec<String> = used_images
            .into_iter()
            .filter(|name| !keep_images.contains(name))
            .filter(|name| seen_names.insert(name.clone()))
            .collect();

        if !remove_names.is_empty() {
            let images = match self.docker.images_by_name(&remove_names).await {
                Ok(images) => images,
                Err(err) => {
                    error!(%unique_id, error = %err, "failed to look up images");
                    self.set_and_send_status(unique_id, EdgeAppStatus::Error)
                        .await;
                    return Err(err.into());
                }
            };
            let containers = match self.docker.all_containers().await {
                Ok(containers) => containers,
                Err(err) => {
                    error!(%unique_id, error = %err, "failed to read containers");
                    self.set_and_send_status(unique_id, EdgeAppStatus::Error)
                        .await;
                    return Err(err.into());
                }
            };

            // Distinct tags can alias one image id; each id is removed
            // at most once.
            let mut seen_ids = HashSet::new();
            let images: Vec<_> = images
                .into_iter()
                .filter(|image| seen_ids.insert(image.id.clone()))
                .collect();

            let mut causes = Vec::new();
            for image in &images {
                let references = containers
                    .iter()
                    .filter(|c| c.image_id == image.id)
                    .count();
                if references == 0 {
                    info!(image = %image.name, "removing image");
                    if let Err(err) = self.docker.remove_image(&image.id).await {
                        error!(image = %image.name, error = %err, "failed to remove image");
                        causes.push(err.to_string());
                    }
                } else {
                    debug!(image = %image.name, references, "image still in use, keeping");
                }
            }

            if !causes.is_empty() {
                self.set_and_send_status(unique_id, EdgeAppStatus::Error)
                    .await;
                return Err(EdgeAppError::Accumulated {
                    action: "removed",
                    causes,
                });
            }
        }

        self.registry.delete(unique_id);
        self.send_status().await;

        Ok(())
    }

    /// REMOVE_ALL: best-effort removal of every known app; the first
    /// failure is returned after all apps have been attempted.
    pub async fn remove_all(&self) -> Result<(), EdgeAppError> {
        info!("removing all edge apps");

        let mut first_error = None;
        for unique_id in self.registry.ids() {
            if let Err(err) = self.remove(&unique_id, &[]).await {
                error!(%unique_id, error = %err, "removal failed");
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Build a fresh consolidated snapshot and hand it to the outbound
    /// channel. Failures are logged, never propagated.
    pub async fn send_status(&self) {
        let snapshot = status::status_message(
            self.docker.as_ref(),
            &self.registry,
            self.node_status(),
            &self.org_key_hash,
        )
        .await;

        match snapshot {
            Ok(snapshot) => {
                if self.outbound.send(snapshot).is_err() {
                    warn!("status channel closed, dropping snapshot");
                }
            }
            Err(err) => error!(error = %err, "failed to build status snapshot"),
        }
    }

    async fn set_and_send_status(&self, unique_id: &ManifestUniqueID, status: EdgeAppStatus) {
        debug!(%unique_id, status = %status, "setting edge app status");
        if let Err(err) = self.registry.set_status(unique_id, status) {
            error!(error = %err, "failed to set edge app status");
            return;
        }
        self.send_status().await;
    }

    async fn roll_back(&self, unique_id: &ManifestUniqueID) {
        info!(%unique_id, "initiating rollback");
        if let Err(err) = self.remove(unique_id, &[]).await {
            warn!(%unique_id, error = %err, "rollback was incomplete");
        }
    }
}

#[cfg(test)]
mod tests;
