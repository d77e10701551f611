//! Manifest model and parser.
//!
//! Translates the orchestrator's declarative JSON manifest into the
//! internal [`Manifest`]: one [`ContainerConfig`] per module, a directed
//! connections graph, and the label set used to tag every container and
//! network belonging to the deployment. Secret-marked env values are
//! decrypted exactly once, here.

pub mod registry;

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::model::{ManifestUniqueID, NodeInfo};
use crate::secret::{SecretError, SecretStore};

/// Label key carried by every container and network of an edge app.
pub const LABEL_MANIFEST_UNIQUE_ID: &str = "manifestUniqueID";

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("invalid manifest json: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("manifest validation failed: {0}")]
    Validation(String),
    #[error("failed to decrypt secret value for env {key}: {source}")]
    SecretDecrypt { key: String, source: SecretError },
    #[error("invalid connections entry: {0}")]
    ConnectionParse(String),
}

// ── Wire format ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ManifestMsg {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "manifestName")]
    pub manifest_name: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
    #[serde(default)]
    pub command: String,
    #[serde(rename = "debugMode", default)]
    pub debug_mode: bool,
    pub modules: Vec<ModuleMsg>,
    #[serde(default)]
    pub connections: HashMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ModuleMsg {
    pub image: ImageMsg,
    #[serde(default)]
    pub envs: Vec<EnvMsg>,
    #[serde(default)]
    pub mounts: Vec<MountMsg>,
    #[serde(default)]
    pub devices: Vec<DeviceMsg>,
    #[serde(default)]
    pub ports: Vec<PortMsg>,
    #[serde(rename = "type", default)]
    pub module_type: String,
}

#[derive(Debug, Deserialize)]
pub struct ImageMsg {
    pub name: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub registry: RegistryMsg,
}

#[derive(Debug, Deserialize, Default)]
pub struct RegistryMsg {
    #[serde(default)]
    pub url: String,
    #[serde(rename = "userName", default)]
    pub user_name: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct EnvMsg {
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub secret: bool,
}

#[derive(Debug, Deserialize)]
pub struct MountMsg {
    pub host: String,
    pub container: String,
}

#[derive(Debug, Deserialize)]
pub struct DeviceMsg {
    pub host: String,
    pub container: String,
}

#[derive(Debug, Deserialize)]
pub struct PortMsg {
    pub host: String,
    pub container: String,
}

/// Bare `{_id, command}` payload form.
#[derive(Debug, Deserialize)]
pub struct CommandMsg {
    #[serde(rename = "_id")]
    pub id: String,
    pub command: String,
}

impl CommandMsg {
    pub fn parse(payload: &[u8]) -> Result<Self, ManifestError> {
        Ok(serde_json::from_slice(payload)?)
    }
}

// ── Internal model ────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Manifest {
    pub unique_id: ManifestUniqueID,
    pub id: String,
    pub manifest_name: String,
    pub updated_at: DateTime<Utc>,
    pub modules: Vec<ContainerConfig>,
    pub labels: HashMap<String, String>,
    pub connections: BTreeMap<usize, Vec<usize>>,
}

/// Everything needed to create and start one module's container. Runtime
/// agnostic; the driver translates it to its own wire types.
/// `network_name` and `container_name` stay empty until
/// [`Manifest::apply_network`] runs after network creation.
#[derive(Debug, Clone, Default)]
pub struct ContainerConfig {
    pub container_name: String,
    pub image_name_full: String,
    pub env_args: Vec<String>,
    pub network_name: String,
    pub exposed_ports: Vec<String>,
    pub port_bindings: Vec<PortMap>,
    pub mounts: Vec<MountConfig>,
    pub devices: Vec<DeviceMapping>,
    pub labels: HashMap<String, String>,
    pub auth: RegistryAuth,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortMap {
    pub container: String,
    pub host: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountConfig {
    pub host: String,
    pub container: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceMapping {
    pub host: String,
    pub container: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryAuth {
    pub server: String,
    pub username: String,
    pub password: String,
}

impl RegistryAuth {
    pub fn is_empty(&self) -> bool {
        self.username.is_empty() && self.password.is_empty()
    }
}

impl Manifest {
    /// Parse and validate an orchestration payload into a [`Manifest`].
    pub fn parse(
        payload: &[u8],
        secrets: &dyn SecretStore,
        node: &NodeInfo,
    ) -> Result<Manifest, ManifestError> {
        let msg: ManifestMsg = serde_json::from_slice(payload)?;
        Manifest::from_msg(msg, secrets, node)
    }

    pub fn from_msg(
        msg: ManifestMsg,
        secrets: &dyn SecretStore,
        node: &NodeInfo,
    ) -> Result<Manifest, ManifestError> {
        if msg.id.trim().is_empty() {
            return Err(ManifestError::Validation("_id must not be blank".into()));
        }

        let updated_at = DateTime::parse_from_rfc3339(&msg.updated_at)
            .map_err(|e| ManifestError::Validation(format!("updatedAt: {e}")))?
            .with_timezone(&Utc);

        let unique_id = ManifestUniqueID::from(msg.id.clone());
        let labels = HashMap::from([(
            LABEL_MANIFEST_UNIQUE_ID.to_string(),
            unique_id.to_string(),
        )]);

        let mut modules = Vec::with_capacity(msg.modules.len());
        for (index, module) in msg.modules.iter().enumerate() {
            if module.image.name.trim().is_empty() {
                return Err(ManifestError::Validation(format!(
                    "module {index}: image name must not be blank"
                )));
            }

            let image_name_full = if module.image.tag.is_empty() {
                module.image.name.clone()
            } else {
                format!("{}:{}", module.image.name, module.image.tag)
            };

            let mut env_args = parse_env_args(&module.envs, secrets)?;
            let log_level = if msg.debug_mode { "DEBUG" } else { "INFO" };
            env_args.push(format!("LOG_LEVEL={log_level}"));
            env_args.push(format!("MANIFEST_ID={}", msg.id));
            env_args.push(format!("MODULE_NAME={image_name_full}"));
            env_args.push("INGRESS_PORT=80".to_string());
            env_args.push("INGRESS_PATH=/".to_string());
            env_args.push(format!("MODULE_TYPE={}", module.module_type));
            env_args.push(format!("NODE_ID={}", node.id));
            env_args.push(format!("NODE_NAME={}", node.name));

            modules.push(ContainerConfig {
                container_name: String::new(),
                image_name_full,
                env_args,
                network_name: String::new(),
                exposed_ports: module.ports.iter().map(|p| p.container.clone()).collect(),
                port_bindings: module
                    .ports
                    .iter()
                    .map(|p| PortMap {
                        container: p.container.clone(),
                        host: p.host.clone(),
                    })
                    .collect(),
                mounts: parse_mounts(index, &module.mounts)?,
                devices: module
                    .devices
                    .iter()
                    .map(|d| DeviceMapping {
                        host: d.host.clone(),
                        container: d.container.clone(),
                    })
                    .collect(),
                labels: labels.clone(),
                auth: RegistryAuth {
                    server: module.image.registry.url.clone(),
                    username: module.image.registry.user_name.clone(),
                    password: module.image.registry.password.clone(),
                },
            });
        }

        let connections = parse_connections(&msg.connections)?;

        Ok(Manifest {
            unique_id,
            id: msg.id,
            manifest_name: msg.manifest_name,
            updated_at,
            modules,
            labels,
            connections,
        })
    }

    /// Wire the deployment into the freshly created network: assign
    /// network and container names, expose each module's own ingress
    /// host, and inject the egress URLs of its downstream peers.
    pub fn apply_network(&mut self, network_name: &str) {
        for (index, module) in self.modules.iter_mut().enumerate() {
            module.network_name = network_name.to_string();
            module.container_name =
                container_name(network_name, &module.image_name_full, index);
            module
                .env_args
                .push(format!("INGRESS_HOST={}", module.container_name));
        }

        for (start, ends) in &self.connections {
            if *start >= self.modules.len() {
                continue;
            }
            let urls: Vec<String> = ends
                .iter()
                .filter(|&&end| end < self.modules.len())
                .map(|&end| format!("http://{}:80/", self.modules[end].container_name))
                .collect();
            if urls.is_empty() {
                continue;
            }
            self.modules[*start]
                .env_args
                .push(format!("EGRESS_URLS={}", urls.join(",")));
        }
    }

    /// Image names of every module, in module order.
    pub fn image_names(&self) -> Vec<String> {
        self.modules
            .iter()
            .map(|m| m.image_name_full.clone())
            .collect()
    }

    /// Deep copy with env args and registry passwords cleared. Every copy
    /// handed out for status reporting goes through this.
    pub fn redacted(&self) -> Manifest {
        let mut copy = self.clone();
        for module in &mut copy.modules {
            module.env_args.clear();
            module.auth.password.clear();
        }
        copy
    }
}

/// Standard container name: `<network>.<image>.<index>`, sanitized to
/// `[A-Za-z0-9_.-]+` (whitespace stripped, `:` becomes `_`).
pub fn container_name(network_name: &str, image_name: &str, index: usize) -> String {
    sanitize_name(&format!("{network_name}.{image_name}.{index}"))
}

fn sanitize_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            ':' => '_',
            c if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') => c,
            _ => '_',
        })
        .collect()
}

fn parse_env_args(
    envs: &[EnvMsg],
    secrets: &dyn SecretStore,
) -> Result<Vec<String>, ManifestError> {
    let mut args = Vec::with_capacity(envs.len());
    for env in envs {
        let value = if env.secret {
            secrets
                .decrypt_env(&env.value)
                .map_err(|source| ManifestError::SecretDecrypt {
                    key: env.key.clone(),
                    source,
                })?
        } else {
            env.value.clone()
        };
        args.push(format!("{}={}", env.key, value));
    }
    Ok(args)
}

fn parse_mounts(index: usize, mounts: &[MountMsg]) -> Result<Vec<MountConfig>, ManifestError> {
    mounts
        .iter()
        .map(|m| {
            if m.host.trim().is_empty() || m.container.trim().is_empty() {
                return Err(ManifestError::Validation(format!(
                    "module {index}: mount host and container paths must not be blank"
                )));
            }
            Ok(MountConfig {
                host: m.host.clone(),
                container: m.container.clone(),
            })
        })
        .collect()
}

/// `map<string, string[]>` → `map<usize, usize[]>`. Negative indices and
/// empty lists are dropped silently; non-integer keys or values are hard
/// errors.
fn parse_connections(
    raw: &HashMap<String, Vec<String>>,
) -> Result<BTreeMap<usize, Vec<usize>>, ManifestError> {
    debug!("parsing module connections");

    let mut connections = BTreeMap::new();
    for (key, values) in raw {
        if values.is_empty() {
            continue;
        }

        let mut ends = Vec::with_capacity(values.len());
        for value in values {
            let end: i64 = value.trim().parse().map_err(|_| {
                ManifestError::ConnectionParse(format!(
                    "endpoint index {value:?} is not an integer"
                ))
            })?;
            if end < 0 {
                continue;
            }
            ends.push(end as usize);
        }
        if ends.is_empty() {
            continue;
        }

        let start: i64 = key.trim().parse().map_err(|_| {
            ManifestError::ConnectionParse(format!("module index {key:?} is not an integer"))
        })?;
        if start < 0 {
            continue;
        }

        connections.insert(start as usize, ends);
    }

    Ok(connections)
}
