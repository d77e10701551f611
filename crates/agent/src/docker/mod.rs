//! Container runtime — the narrow capability set the lifecycle engine
//! consumes, plus the bollard-backed client that implements it.
//!
//! Domain methods live in sibling modules (`container`, `image`,
//! `network`) which add `impl DockerClient` blocks; [`ContainerRuntime`]
//! delegates to them.

pub mod client;
pub mod container;
pub mod image;
pub mod inventory;
pub mod network;

pub use self::client::{DockerClient, DockerError};
pub use self::inventory::{ContainerInfo, ContainerStateInfo, ImageInfo};

use std::collections::HashMap;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::manifest::{ContainerConfig, RegistryAuth};
use crate::model::ManifestUniqueID;

/// Everything the lifecycle engine is allowed to ask of the runtime.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    async fn image_exists(&self, name: &str) -> Result<bool, DockerError>;
    async fn pull_image(&self, auth: &RegistryAuth, name: &str) -> Result<(), DockerError>;
    async fn remove_image(&self, image_id: &str) -> Result<(), DockerError>;
    async fn images_by_name(&self, names: &[String]) -> Result<Vec<ImageInfo>, DockerError>;
    async fn create_network(
        &self,
        name: &str,
        labels: &HashMap<String, String>,
    ) -> Result<String, DockerError>;
    async fn prune_networks(&self, unique_id: &ManifestUniqueID) -> Result<(), DockerError>;
    async fn create_and_start_container(
        &self,
        config: &ContainerConfig,
    ) -> Result<String, DockerError>;
    async fn start_container(&self, container_id: &str) -> Result<(), DockerError>;
    async fn stop_container(&self, container_id: &str) -> Result<(), DockerError>;
    async fn stop_and_remove_container(&self, container_id: &str) -> Result<(), DockerError>;
    async fn edge_app_containers(
        &self,
        unique_id: &ManifestUniqueID,
    ) -> Result<Vec<ContainerInfo>, DockerError>;
    async fn all_containers(&self) -> Result<Vec<ContainerInfo>, DockerError>;
    async fn inspect_container(
        &self,
        container_id: &str,
    ) -> Result<ContainerStateInfo, DockerError>;
}

#[async_trait]
impl ContainerRuntime for DockerClient {
    async fn image_exists(&self, name: &str) -> Result<bool, DockerError> {
        DockerClient::image_exists(self, name).await
    }

    async fn pull_image(&self, auth: &RegistryAuth, name: &str) -> Result<(), DockerError> {
        DockerClient::pull_image(self, auth, name).await
    }

    async fn remove_image(&self, image_id: &str) -> Result<(), DockerError> {
        DockerClient::remove_image(self, image_id).await
    }

    async fn images_by_name(&self, names: &[String]) -> Result<Vec<ImageInfo>, DockerError> {
        DockerClient::images_by_name(self, names).await
    }

    async fn create_network(
        &self,
        name: &str,
        labels: &HashMap<String, String>,
    ) -> Result<String, DockerError> {
        DockerClient::create_network(self, name, labels).await
    }

    async fn prune_networks(&self, unique_id: &ManifestUniqueID) -> Result<(), DockerError> {
        DockerClient::prune_networks(self, unique_id).await
    }

    async fn create_and_start_container(
        &self,
        config: &ContainerConfig,
    ) -> Result<String, DockerError> {
        DockerClient::create_and_start_container(self, config).await
    }

    async fn start_container(&self, container_id: &str) -> Result<(), DockerError> {
        DockerClient::start_container(self, container_id).await
    }

    async fn stop_container(&self, container_id: &str) -> Result<(), DockerError> {
        DockerClient::stop_container(self, container_id).await
    }

    async fn stop_and_remove_container(&self, container_id: &str) -> Result<(), DockerError> {
        DockerClient::stop_and_remove_container(self, container_id).await
    }

    async fn edge_app_containers(
        &self,
        unique_id: &ManifestUniqueID,
    ) -> Result<Vec<ContainerInfo>, DockerError> {
        DockerClient::edge_app_containers(self, unique_id).await
    }

    async fn all_containers(&self) -> Result<Vec<ContainerInfo>, DockerError> {
        DockerClient::all_containers(self).await
    }

    async fn inspect_container(
        &self,
        container_id: &str,
    ) -> Result<ContainerStateInfo, DockerError> {
        DockerClient::inspect_container(self, container_id).await
    }
}
