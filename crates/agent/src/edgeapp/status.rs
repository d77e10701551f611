//! Status aggregation — combines the registry's intended state with live
//! container inspection, flags drift, and composes the outbound snapshot
//! together with device telemetry.

use serde::Serialize;
use sysinfo::{Disks, System};

use super::{EdgeAppError, MODULE_EXITED, MODULE_RUNNING};
use crate::docker::ContainerRuntime;
use crate::manifest::registry::ManifestRegistry;
use crate::model::{EdgeAppStatus, NodeStatus, AGENT_VERSION};

/// Exit codes accepted for a cleanly stopped container: normal exit, or
/// SIGKILL after the stop grace period.
const CLEAN_EXIT_CODES: [i64; 2] = [0, 137];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerMsg {
    pub name: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EdgeAppMsg {
    #[serde(rename = "manifestID")]
    pub manifest_id: String,
    pub status: EdgeAppStatus,
    pub containers: Vec<ContainerMsg>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceParamsMsg {
    #[serde(rename = "systemUpTime")]
    pub system_up_time: u64,
    #[serde(rename = "systemLoad")]
    pub system_load: f64,
    #[serde(rename = "storageFree")]
    pub storage_free: f64,
    #[serde(rename = "ramFree")]
    pub ram_free: f64,
}

/// The consolidated snapshot published on every state transition and on
/// heartbeat.
#[derive(Debug, Clone, Serialize)]
pub struct StatusMsg {
    pub status: NodeStatus,
    #[serde(rename = "edgeApplications")]
    pub edge_applications: Vec<EdgeAppMsg>,
    #[serde(rename = "deviceParams")]
    pub device_params: DeviceParamsMsg,
    #[serde(rename = "agentVersion")]
    pub agent_version: String,
    #[serde(rename = "orgKeyHash")]
    pub org_key_hash: String,
}

/// One entry per known manifest: registry status reconciled against the
/// containers observed under the manifest's label. Observation never
/// mutates the registry; drift is reported as `Error` in the message
/// only.
pub async fn edge_app_statuses<D: ContainerRuntime>(
    docker: &D,
    registry: &ManifestRegistry,
) -> Result<Vec<EdgeAppMsg>, EdgeAppError> {
    let mut edge_apps = Vec::new();

    for record in registry.all() {
        let mut app = EdgeAppMsg {
            manifest_id: record.manifest.id.clone(),
            status: record.status,
            containers: Vec::new(),
        };

        if record.status == EdgeAppStatus::Undeployed {
            edge_apps.push(app);
            continue;
        }

        let containers = docker
            .edge_app_containers(&record.manifest.unique_id)
            .await?;

        let intended_settled = matches!(
            record.status,
            EdgeAppStatus::Running | EdgeAppStatus::Stopped
        );
        if intended_settled && containers.len() != record.manifest.modules.len() {
            app.status = EdgeAppStatus::Error;
        }

        for container in &containers {
            let details = docker.inspect_container(&container.id).await?;

            app.containers.push(ContainerMsg {
                name: container.display_name(),
                status: first_to_upper(&container.state),
            });

            let in_transition = matches!(
                record.status,
                EdgeAppStatus::Initiated | EdgeAppStatus::Executing
            );
            if !in_transition && app.status != EdgeAppStatus::Error {
                if record.status == EdgeAppStatus::Running && container.state != MODULE_RUNNING {
                    app.status = EdgeAppStatus::Error;
                }
                if record.status == EdgeAppStatus::Stopped
                    && (container.state != MODULE_EXITED
                        || !CLEAN_EXIT_CODES.contains(&details.exit_code))
                {
                    app.status = EdgeAppStatus::Error;
                }
            }
        }

        edge_apps.push(app);
    }

    Ok(edge_apps)
}

/// Full outbound snapshot: edge app statuses plus device telemetry and
/// node identity.
pub async fn status_message<D: ContainerRuntime>(
    docker: &D,
    registry: &ManifestRegistry,
    node_status: NodeStatus,
    org_key_hash: &str,
) -> Result<StatusMsg, EdgeAppError> {
    let edge_applications = edge_app_statuses(docker, registry).await?;
    let device_params = device_params().await;

    Ok(StatusMsg {
        status: node_status,
        edge_applications,
        device_params,
        agent_version: AGENT_VERSION.to_string(),
        org_key_hash: org_key_hash.to_string(),
    })
}

/// Re-aggregate and report whether the per-app statuses drifted from a
/// previous aggregation. Drives the early-publish monitor loop.
pub async fn statuses_changed<D: ContainerRuntime>(
    docker: &D,
    registry: &ManifestRegistry,
    previous: &[EdgeAppMsg],
) -> Result<(Vec<EdgeAppMsg>, bool), EdgeAppError> {
    let latest = edge_app_statuses(docker, registry).await?;
    let changed = latest.len() != previous.len()
        || latest
            .iter()
            .zip(previous)
            .any(|(now, before)| now.status != before.status);
    Ok((latest, changed))
}

/// Host telemetry attached to every snapshot.
pub async fn device_params() -> DeviceParamsMsg {
    let mut sys = System::new();
    sys.refresh_cpu_usage();
    // CPU usage is a delta; sample twice with the minimum interval.
    tokio::time::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL).await;
    sys.refresh_cpu_usage();
    sys.refresh_memory();

    let disks = Disks::new_with_refreshed_list();
    let (total, available) = disks
        .list()
        .iter()
        .fold((0u64, 0u64), |(total, available), disk| {
            (total + disk.total_space(), available + disk.available_space())
        });

    let storage_free = if total == 0 {
        0.0
    } else {
        available as f64 / total as f64 * 100.0
    };
    let ram_free = if sys.total_memory() == 0 {
        0.0
    } else {
        sys.available_memory() as f64 / sys.total_memory() as f64 * 100.0
    };

    DeviceParamsMsg {
        system_up_time: System::uptime(),
        system_load: sys.global_cpu_usage() as f64,
        storage_free,
        ram_free,
    }
}

fn first_to_upper(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
