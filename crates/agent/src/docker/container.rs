//! Container domain — create-and-start, lifecycle, listings, inspect.

use std::collections::HashMap;

use bollard::models::{
    ContainerCreateBody, DeviceMapping, HostConfig, Mount, MountBindOptions,
    MountBindOptionsPropagationEnum, MountTypeEnum, PortBinding,
};
use bollard::query_parameters::{
    CreateContainerOptions, InspectContainerOptions, ListContainersOptions,
    RemoveContainerOptions, StartContainerOptions, StopContainerOptions,
};
use tracing::warn;

use super::client::{DockerClient, DockerError};
use super::inventory::{ContainerInfo, ContainerStateInfo};
use crate::manifest::{ContainerConfig, LABEL_MANIFEST_UNIQUE_ID};
use crate::model::ManifestUniqueID;

impl DockerClient {
    /// Create a container from a wired module config, attach it to the
    /// deployment network and start it. Returns the container id.
    pub async fn create_and_start_container(
        &self,
        config: &ContainerConfig,
    ) -> Result<String, DockerError> {
        let exposed_ports: Vec<String> = config
            .exposed_ports
            .iter()
            .map(|port| port_key(port))
            .collect();

        let mut port_bindings: HashMap<String, Option<Vec<PortBinding>>> = HashMap::new();
        for binding in &config.port_bindings {
            port_bindings.insert(
                port_key(&binding.container),
                Some(vec![PortBinding {
                    host_ip: None,
                    host_port: Some(binding.host.clone()),
                }]),
            );
        }

        let mounts: Vec<Mount> = config
            .mounts
            .iter()
            .map(|m| Mount {
                target: Some(m.container.clone()),
                source: Some(m.host.clone()),
                typ: Some(MountTypeEnum::BIND),
                read_only: Some(false),
                consistency: Some("default".to_string()),
                bind_options: Some(MountBindOptions {
                    propagation: Some(MountBindOptionsPropagationEnum::RPRIVATE),
                    non_recursive: Some(true),
                    ..Default::default()
                }),
                ..Default::default()
            })
            .collect();

        let devices: Vec<DeviceMapping> = config
            .devices
            .iter()
            .map(|d| DeviceMapping {
                path_on_host: Some(d.host.clone()),
                path_in_container: Some(d.container.clone()),
                cgroup_permissions: Some("rw".to_string()),
            })
            .collect();

        let host_config = HostConfig {
            port_bindings: (!port_bindings.is_empty()).then_some(port_bindings),
            mounts: (!mounts.is_empty()).then_some(mounts),
            devices: (!devices.is_empty()).then_some(devices),
            network_mode: Some(config.network_name.clone()),
            ..Default::default()
        };

        let body = ContainerCreateBody {
            image: Some(config.image_name_full.clone()),
            env: Some(config.env_args.clone()),
            labels: Some(config.labels.clone()),
            exposed_ports: (!exposed_ports.is_empty()).then_some(exposed_ports),
            host_config: Some(host_config),
            ..Default::default()
        };

        let options = CreateContainerOptions {
            name: Some(config.container_name.clone()),
            ..Default::default()
        };

        let response = self.client.create_container(Some(options), body).await?;
        self.start_container(&response.id).await?;

        Ok(response.id)
    }

    /// Start a stopped container.
    pub async fn start_container(&self, container_id: &str) -> Result<(), DockerError> {
        self.client
            .start_container(container_id, None::<StartContainerOptions>)
            .await
            .map_err(|e| match e {
                bollard::errors::Error::DockerResponseServerError {
                    status_code: 404, ..
                } => DockerError::ContainerNotFound(container_id.to_string()),
                other => DockerError::BollardError(other),
            })
    }

    /// Stop a running container with the daemon's default grace period
    /// (SIGKILL after grace, surfacing exit code 137).
    pub async fn stop_container(&self, container_id: &str) -> Result<(), DockerError> {
        self.client
            .stop_container(container_id, None::<StopContainerOptions>)
            .await
            .map_err(|e| match e {
                bollard::errors::Error::DockerResponseServerError {
                    status_code: 404, ..
                } => DockerError::ContainerNotFound(container_id.to_string()),
                other => DockerError::BollardError(other),
            })
    }

    /// Force-remove a container including its anonymous volumes. A failed
    /// stop is tolerated; the forced remove covers it.
    pub async fn stop_and_remove_container(&self, container_id: &str) -> Result<(), DockerError> {
        if let Err(e) = self.stop_container(container_id).await {
            warn!(container_id = %container_id, error = %e, "unable to stop container, removing anyway");
        }

        let options = Some(RemoveContainerOptions {
            force: true,
            v: true,
            ..Default::default()
        });

        self.client
            .remove_container(container_id, options)
            .await
            .map_err(|e| match e {
                bollard::errors::Error::DockerResponseServerError {
                    status_code: 404, ..
                } => DockerError::ContainerNotFound(container_id.to_string()),
                other => DockerError::BollardError(other),
            })
    }

    /// All containers labeled with this manifest id, in any state.
    pub async fn edge_app_containers(
        &self,
        unique_id: &ManifestUniqueID,
    ) -> Result<Vec<ContainerInfo>, DockerError> {
        let filters = HashMap::from([(
            "label".to_string(),
            vec![format!("{LABEL_MANIFEST_UNIQUE_ID}={unique_id}")],
        )]);

        let options = Some(ListContainersOptions {
            all: true,
            filters: Some(filters),
            ..Default::default()
        });

        let containers = self.client.list_containers(options).await?;
        Ok(containers.into_iter().map(ContainerInfo::from).collect())
    }

    /// Every container on the host, in any state. Used during image GC.
    pub async fn all_containers(&self) -> Result<Vec<ContainerInfo>, DockerError> {
        let options = Some(ListContainersOptions {
            all: true,
            ..Default::default()
        });

        let containers = self.client.list_containers(options).await?;
        Ok(containers.into_iter().map(ContainerInfo::from).collect())
    }

    pub async fn inspect_container(
        &self,
        container_id: &str,
    ) -> Result<ContainerStateInfo, DockerError> {
        let details = self
            .client
            .inspect_container(container_id, None::<InspectContainerOptions>)
            .await
            .map_err(|e| match e {
                bollard::errors::Error::DockerResponseServerError {
                    status_code: 404, ..
                } => DockerError::ContainerNotFound(container_id.to_string()),
                other => DockerError::BollardError(other),
            })?;
        Ok(ContainerStateInfo::from(details))
    }
}

/// Docker port keys are `<port>/<proto>`; default the protocol to tcp.
fn port_key(port: &str) -> String {
    if port.contains('/') {
        port.to_string()
    } else {
        format!("{port}/tcp")
    }
}
