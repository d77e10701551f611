//! Lifecycle engine scenarios against an in-memory fake runtime.
//!
//! The fake keeps a world model (images, containers, networks) so tests
//! can assert rollback completeness and image-GC safety, not just call
//! counts.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use super::status::StatusMsg;
use super::{Command, EdgeAppEngine, EdgeAppError};
use crate::docker::{
    ContainerInfo, ContainerRuntime, ContainerStateInfo, DockerError, ImageInfo,
};
use crate::manifest::registry::ManifestRegistry;
use crate::manifest::{ContainerConfig, Manifest, LABEL_MANIFEST_UNIQUE_ID};
use crate::model::{EdgeAppStatus, ManifestUniqueID};

#[derive(Debug, Clone)]
struct FakeContainer {
    id: String,
    name: String,
    image_id: String,
    state: String,
    exit_code: i64,
    labels: HashMap<String, String>,
}

#[derive(Debug, Clone)]
struct FakeNetwork {
    labels: HashMap<String, String>,
}

#[derive(Default)]
struct FakeWorld {
    images: HashSet<String>,
    containers: Vec<FakeContainer>,
    networks: Vec<FakeNetwork>,
    /// Container names in the order they were created or started.
    started_order: Vec<String>,
    fail_pull: HashSet<String>,
    fail_create: HashSet<String>,
    fail_prune: HashSet<String>,
    fail_stop: bool,
    fail_remove_container: bool,
    next_id: u32,
}

#[derive(Default)]
struct FakeRuntime {
    world: Mutex<FakeWorld>,
}

impl FakeRuntime {
    fn with<R>(&self, f: impl FnOnce(&mut FakeWorld) -> R) -> R {
        f(&mut self.world.lock().unwrap())
    }

    fn image_id(name: &str) -> String {
        format!("sha256:{name}")
    }

    /// Like Docker's list API, newest containers come first.
    fn labeled_containers(&self, id: &str) -> Vec<FakeContainer> {
        self.with(|w| {
            w.containers
                .iter()
                .rev()
                .filter(|c| {
                    c.labels.get(LABEL_MANIFEST_UNIQUE_ID).map(String::as_str) == Some(id)
                })
                .cloned()
                .collect()
        })
    }

    fn labeled_network_count(&self, id: &str) -> usize {
        self.with(|w| {
            w.networks
                .iter()
                .filter(|n| {
                    n.labels.get(LABEL_MANIFEST_UNIQUE_ID).map(String::as_str) == Some(id)
                })
                .count()
        })
    }

    fn has_image(&self, name: &str) -> bool {
        self.with(|w| w.images.contains(name))
    }

    /// Plant a container owned by someone else, referencing `image`.
    fn seed_foreign_container(&self, image: &str) {
        self.with(|w| {
            w.next_id += 1;
            w.containers.push(FakeContainer {
                id: format!("c{}", w.next_id),
                name: "foreign".into(),
                image_id: Self::image_id(image),
                state: "running".into(),
                exit_code: 0,
                labels: HashMap::new(),
            });
        });
    }
}

fn info(c: &FakeContainer) -> ContainerInfo {
    ContainerInfo {
        id: c.id.clone(),
        names: vec![c.name.clone()],
        image: String::new(),
        image_id: c.image_id.clone(),
        state: c.state.clone(),
        labels: c.labels.clone(),
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn image_exists(&self, name: &str) -> Result<bool, DockerError> {
        Ok(self.with(|w| w.images.contains(name)))
    }

    async fn pull_image(
        &self,
        _auth: &crate::manifest::RegistryAuth,
        name: &str,
    ) -> Result<(), DockerError> {
        self.with(|w| {
            if w.fail_pull.contains(name) {
                return Err(DockerError::ConnectionFailed(format!("no such image {name}")));
            }
            w.images.insert(name.to_string());
            Ok(())
        })
    }

    async fn remove_image(&self, image_id: &str) -> Result<(), DockerError> {
        self.with(|w| {
            let before = w.images.len();
            w.images.retain(|name| FakeRuntime::image_id(name) != image_id);
            if w.images.len() == before {
                return Err(DockerError::ImageNotFound(image_id.to_string()));
            }
            Ok(())
        })
    }

    async fn images_by_name(&self, names: &[String]) -> Result<Vec<ImageInfo>, DockerError> {
        Ok(self.with(|w| {
            names
                .iter()
                .filter(|name| w.images.contains(*name))
                .map(|name| ImageInfo {
                    id: FakeRuntime::image_id(name),
                    name: name.clone(),
                })
                .collect()
        }))
    }

    async fn create_network(
        &self,
        name: &str,
        labels: &HashMap<String, String>,
    ) -> Result<String, DockerError> {
        let network_name = name.to_lowercase().replace(' ', "-");
        self.with(|w| {
            w.networks.push(FakeNetwork {
                labels: labels.clone(),
            })
        });
        Ok(network_name)
    }

    async fn prune_networks(&self, unique_id: &ManifestUniqueID) -> Result<(), DockerError> {
        self.with(|w| {
            if w.fail_prune.contains(unique_id.as_str()) {
                return Err(DockerError::ConnectionFailed("prune refused".into()));
            }
            w.networks.retain(|n| {
                n.labels.get(LABEL_MANIFEST_UNIQUE_ID) != Some(&unique_id.to_string())
            });
            Ok(())
        })
    }

    async fn create_and_start_container(
        &self,
        config: &ContainerConfig,
    ) -> Result<String, DockerError> {
        self.with(|w| {
            if w.fail_create.contains(&config.container_name) {
                return Err(DockerError::ConnectionFailed(format!(
                    "cannot create {}",
                    config.container_name
                )));
            }
            w.next_id += 1;
            let id = format!("c{}", w.next_id);
            w.containers.push(FakeContainer {
                id: id.clone(),
                name: config.container_name.clone(),
                image_id: FakeRuntime::image_id(&config.image_name_full),
                state: "running".into(),
                exit_code: 0,
                labels: config.labels.clone(),
            });
            w.started_order.push(config.container_name.clone());
            Ok(id)
        })
    }

    async fn start_container(&self, container_id: &str) -> Result<(), DockerError> {
        self.with(|w| {
            let container = w
                .containers
                .iter_mut()
                .find(|c| c.id == container_id)
                .ok_or_else(|| DockerError::ContainerNotFound(container_id.to_string()))?;
            container.state = "running".into();
            container.exit_code = 0;
            let name = container.name.clone();
            w.started_order.push(name);
            Ok(())
        })
    }

    async fn stop_container(&self, container_id: &str) -> Result<(), DockerError> {
        self.with(|w| {
            if w.fail_stop {
                return Err(DockerError::ConnectionFailed("stop refused".into()));
            }
            let container = w
                .containers
                .iter_mut()
                .find(|c| c.id == container_id)
                .ok_or_else(|| DockerError::ContainerNotFound(container_id.to_string()))?;
            container.state = "exited".into();
            container.exit_code = 0;
            Ok(())
        })
    }

    async fn stop_and_remove_container(&self, container_id: &str) -> Result<(), DockerError> {
        self.with(|w| {
            if w.fail_remove_container {
                return Err(DockerError::ConnectionFailed("remove refused".into()));
            }
            w.containers.retain(|c| c.id != container_id);
            Ok(())
        })
    }

    async fn edge_app_containers(
        &self,
        unique_id: &ManifestUniqueID,
    ) -> Result<Vec<ContainerInfo>, DockerError> {
        Ok(self
            .labeled_containers(unique_id.as_str())
            .iter()
            .map(info)
            .collect())
    }

    async fn all_containers(&self) -> Result<Vec<ContainerInfo>, DockerError> {
        Ok(self.with(|w| w.containers.iter().rev().map(info).collect()))
    }

    async fn inspect_container(
        &self,
        container_id: &str,
    ) -> Result<ContainerStateInfo, DockerError> {
        self.with(|w| {
            w.containers
                .iter()
                .find(|c| c.id == container_id)
                .map(|c| ContainerStateInfo {
                    state: c.state.clone(),
                    exit_code: c.exit_code,
                })
                .ok_or_else(|| DockerError::ContainerNotFound(container_id.to_string()))
        })
    }
}

fn manifest(id: &str, updated_at: &str, images: &[&str]) -> Manifest {
    let labels = HashMap::from([(LABEL_MANIFEST_UNIQUE_ID.to_string(), id.to_string())]);
    let connections = if images.len() >= 2 {
        BTreeMap::from([(0, vec![1])])
    } else {
        BTreeMap::new()
    };
    Manifest {
        unique_id: ManifestUniqueID::from(id),
        id: id.to_string(),
        manifest_name: format!("{id} app"),
        updated_at: DateTime::parse_from_rfc3339(updated_at)
            .unwrap()
            .with_timezone(&Utc),
        modules: images
            .iter()
            .map(|image| ContainerConfig {
                image_name_full: image.to_string(),
                labels: labels.clone(),
                ..Default::default()
            })
            .collect(),
        labels,
        connections,
    }
}

struct Harness {
    docker: Arc<FakeRuntime>,
    engine: EdgeAppEngine<FakeRuntime>,
    #[allow(dead_code)]
    outbound: mpsc::UnboundedReceiver<StatusMsg>,
}

fn harness() -> Harness {
    let docker = Arc::new(FakeRuntime::default());
    let (tx, rx) = mpsc::unbounded_channel();
    let engine = EdgeAppEngine::new(
        docker.clone(),
        Arc::new(ManifestRegistry::new()),
        tx,
        "hash".into(),
    );
    Harness {
        docker,
        engine,
        outbound: rx,
    }
}

#[tokio::test(start_paused = true)]
async fn deploy_starts_containers_in_reverse_order() {
    let mut h = harness();
    h.engine.deploy(manifest("app1", "2024-05-01T00:00:00Z", &["a:1", "b:2"]))
        .await
        .unwrap();

    let id = ManifestUniqueID::from("app1");
    assert_eq!(
        h.engine.registry().status(&id),
        Some(EdgeAppStatus::Running)
    );
    assert!(h.docker.has_image("a:1"));
    assert!(h.docker.has_image("b:2"));
    assert_eq!(h.docker.labeled_network_count("app1"), 1);

    let containers = h.docker.labeled_containers("app1");
    assert_eq!(containers.len(), 2);
    assert!(containers.iter().all(|c| c.state == "running"));

    // final stage first
    let order = h.docker.with(|w| w.started_order.clone());
    assert_eq!(order, vec!["app1-app.b_2.1", "app1-app.a_1.0"]);

    // pipeline wiring on the stored manifest
    let stored = h.engine.registry().get(&id).unwrap();
    assert!(stored.manifest.modules[0]
        .env_args
        .contains(&"EGRESS_URLS=http://app1-app.b_2.1:80/".to_string()));

    // the last snapshot emitted describes the committed state
    let mut last = None;
    while let Ok(snapshot) = h.outbound.try_recv() {
        last = Some(snapshot);
    }
    let last = last.expect("snapshots were emitted");
    assert_eq!(last.edge_applications.len(), 1);
    assert_eq!(last.edge_applications[0].status, EdgeAppStatus::Running);
    assert_eq!(last.edge_applications[0].containers.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn second_identical_deploy_is_rejected_without_side_effects() {
    let mut h = harness();
    let man = manifest("app1", "2024-05-01T00:00:00Z", &["a:1", "b:2"]);
    h.engine.deploy(man.clone()).await.unwrap();

    let before: Vec<String> = h
        .docker
        .labeled_containers("app1")
        .iter()
        .map(|c| c.id.clone())
        .collect();

    let err = h.engine.deploy(man).await.unwrap_err();
    assert!(matches!(err, EdgeAppError::AlreadyExists(_)));
    assert_eq!(err.to_string(), "edge application app1 already exists");

    let after: Vec<String> = h
        .docker
        .labeled_containers("app1")
        .iter()
        .map(|c| c.id.clone())
        .collect();
    assert_eq!(before, after);
    assert_eq!(
        h.engine.registry().status(&ManifestUniqueID::from("app1")),
        Some(EdgeAppStatus::Running)
    );
    h.outbound.close();
}

#[tokio::test(start_paused = true)]
async fn deploy_rolls_back_on_pull_failure() {
    let h = harness();
    h.docker.with(|w| {
        w.fail_pull.insert("b:2".to_string());
    });

    let err = h
        .engine
        .deploy(manifest("app1", "2024-05-01T00:00:00Z", &["a:1", "b:2"]))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("unable to pull"));
    assert!(h.docker.labeled_containers("app1").is_empty());
    assert_eq!(h.docker.labeled_network_count("app1"), 0);
    // rollback forgets the manifest entirely
    assert!(h
        .engine
        .registry()
        .get(&ManifestUniqueID::from("app1"))
        .is_none());
}

#[tokio::test(start_paused = true)]
async fn deploy_rolls_back_on_container_failure() {
    let h = harness();
    // module 0 starts last; its failure must undo module 1's container
    h.docker.with(|w| {
        w.fail_create.insert("app1-app.a_1.0".to_string());
    });

    let err = h
        .engine
        .deploy(manifest("app1", "2024-05-01T00:00:00Z", &["a:1", "b:2"]))
        .await
        .unwrap_err();

    assert!(matches!(err, EdgeAppError::Driver(_)));
    assert!(h.docker.labeled_containers("app1").is_empty());
    assert_eq!(h.docker.labeled_network_count("app1"), 0);
}

#[tokio::test(start_paused = true)]
async fn redeploy_with_newer_timestamp_replaces_and_keeps_shared_images() {
    let h = harness();
    h.engine
        .deploy(manifest("app1", "2024-05-01T00:00:00Z", &["x:1", "shared:1"]))
        .await
        .unwrap();
    let old_ids: Vec<String> = h
        .docker
        .labeled_containers("app1")
        .iter()
        .map(|c| c.id.clone())
        .collect();

    h.engine
        .deploy(manifest("app1", "2024-06-01T00:00:00Z", &["shared:1", "x:2"]))
        .await
        .unwrap();

    assert_eq!(
        h.engine.registry().status(&ManifestUniqueID::from("app1")),
        Some(EdgeAppStatus::Running)
    );
    assert!(!h.docker.has_image("x:1"), "unused old image is collected");
    assert!(h.docker.has_image("shared:1"), "keep-list image survives");
    assert!(h.docker.has_image("x:2"));

    let new_ids: Vec<String> = h
        .docker
        .labeled_containers("app1")
        .iter()
        .map(|c| c.id.clone())
        .collect();
    assert_eq!(new_ids.len(), 2);
    assert!(new_ids.iter().all(|id| !old_ids.contains(id)));
}

#[tokio::test(start_paused = true)]
async fn redeploy_with_older_timestamp_is_rejected() {
    let h = harness();
    h.engine
        .deploy(manifest("app1", "2024-06-01T00:00:00Z", &["x:1"]))
        .await
        .unwrap();

    let err = h
        .engine
        .deploy(manifest("app1", "2024-05-01T00:00:00Z", &["x:2"]))
        .await
        .unwrap_err();
    assert!(matches!(err, EdgeAppError::AlreadyExists(_)));
}

#[tokio::test(start_paused = true)]
async fn deploy_over_undeployed_app_ignores_timestamps() {
    let h = harness();
    let id = ManifestUniqueID::from("app1");
    h.engine
        .deploy(manifest("app1", "2024-06-01T00:00:00Z", &["x:1"]))
        .await
        .unwrap();
    h.engine.undeploy(&id).await.unwrap();

    h.engine
        .deploy(manifest("app1", "2024-05-01T00:00:00Z", &["x:1"]))
        .await
        .unwrap();
    assert_eq!(h.engine.registry().status(&id), Some(EdgeAppStatus::Running));
}

#[tokio::test(start_paused = true)]
async fn stop_then_resume_keeps_the_same_containers() {
    let h = harness();
    let id = ManifestUniqueID::from("app1");
    h.engine
        .deploy(manifest("app1", "2024-05-01T00:00:00Z", &["a:1", "b:2"]))
        .await
        .unwrap();
    let ids_before: HashSet<String> = h
        .docker
        .labeled_containers("app1")
        .iter()
        .map(|c| c.id.clone())
        .collect();

    h.engine.stop(&id).await.unwrap();
    assert_eq!(h.engine.registry().status(&id), Some(EdgeAppStatus::Stopped));
    assert!(h
        .docker
        .labeled_containers("app1")
        .iter()
        .all(|c| c.state == "exited" && c.exit_code == 0));

    h.docker.with(|w| w.started_order.clear());
    h.engine.resume(&id).await.unwrap();
    assert_eq!(h.engine.registry().status(&id), Some(EdgeAppStatus::Running));

    let containers = h.docker.labeled_containers("app1");
    assert!(containers.iter().all(|c| c.state == "running"));
    let ids_after: HashSet<String> = containers.iter().map(|c| c.id.clone()).collect();
    assert_eq!(ids_before, ids_after, "no containers were re-created");

    // resume also walks modules in reverse order
    let order = h.docker.with(|w| w.started_order.clone());
    assert_eq!(order, vec!["app1-app.b_2.1", "app1-app.a_1.0"]);
}

#[tokio::test(start_paused = true)]
async fn resume_on_running_app_violates_precondition() {
    let h = harness();
    let id = ManifestUniqueID::from("app1");
    h.engine
        .deploy(manifest("app1", "2024-05-01T00:00:00Z", &["a:1"]))
        .await
        .unwrap();

    let err = h.engine.resume(&id).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "can't resume edge application app1 with status Running"
    );
    // status untouched
    assert_eq!(h.engine.registry().status(&id), Some(EdgeAppStatus::Running));
}

#[tokio::test(start_paused = true)]
async fn stop_on_stopped_app_violates_precondition() {
    let h = harness();
    let id = ManifestUniqueID::from("app1");
    h.engine
        .deploy(manifest("app1", "2024-05-01T00:00:00Z", &["a:1"]))
        .await
        .unwrap();
    h.engine.stop(&id).await.unwrap();

    let err = h.engine.stop(&id).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "can't stop edge application app1 with status Stopped"
    );
    assert_eq!(h.engine.registry().status(&id), Some(EdgeAppStatus::Stopped));
}

#[tokio::test(start_paused = true)]
async fn stop_with_no_containers_reports_error() {
    let h = harness();
    let id = ManifestUniqueID::from("app1");
    h.engine
        .registry()
        .add(manifest("app1", "2024-05-01T00:00:00Z", &["a:1"]));
    h.engine
        .registry()
        .set_status(&id, EdgeAppStatus::Running)
        .unwrap();

    let err = h.engine.stop(&id).await.unwrap_err();
    assert!(matches!(err, EdgeAppError::NoContainers(_)));
    assert_eq!(h.engine.registry().status(&id), Some(EdgeAppStatus::Error));
}

#[tokio::test(start_paused = true)]
async fn stop_failure_leaves_partial_state() {
    let h = harness();
    let id = ManifestUniqueID::from("app1");
    h.engine
        .deploy(manifest("app1", "2024-05-01T00:00:00Z", &["a:1", "b:2"]))
        .await
        .unwrap();
    h.docker.with(|w| w.fail_stop = true);

    let err = h.engine.stop(&id).await.unwrap_err();
    assert!(matches!(err, EdgeAppError::Driver(_)));
    assert_eq!(h.engine.registry().status(&id), Some(EdgeAppStatus::Error));
    // containers left as they are for diagnosis
    assert_eq!(h.docker.labeled_containers("app1").len(), 2);
}

#[tokio::test(start_paused = true)]
async fn undeploy_clears_runtime_state_but_keeps_images() {
    let h = harness();
    let id = ManifestUniqueID::from("app1");
    h.engine
        .deploy(manifest("app1", "2024-05-01T00:00:00Z", &["a:1", "b:2"]))
        .await
        .unwrap();

    h.engine.undeploy(&id).await.unwrap();

    assert_eq!(
        h.engine.registry().status(&id),
        Some(EdgeAppStatus::Undeployed)
    );
    assert!(h.docker.labeled_containers("app1").is_empty());
    assert_eq!(h.docker.labeled_network_count("app1"), 0);
    assert!(h.docker.has_image("a:1"));
    assert!(h.docker.has_image("b:2"));
}

#[tokio::test(start_paused = true)]
async fn remove_also_collects_images_and_forgets_the_manifest() {
    let h = harness();
    let id = ManifestUniqueID::from("app1");
    h.engine
        .deploy(manifest("app1", "2024-05-01T00:00:00Z", &["a:1", "b:2"]))
        .await
        .unwrap();

    h.engine.remove(&id, &[]).await.unwrap();

    assert!(!h.docker.has_image("a:1"));
    assert!(!h.docker.has_image("b:2"));
    assert!(h.engine.registry().get(&id).is_none());
}

#[tokio::test(start_paused = true)]
async fn remove_handles_modules_sharing_an_image() {
    let h = harness();
    let id = ManifestUniqueID::from("app1");
    h.engine
        .deploy(manifest("app1", "2024-05-01T00:00:00Z", &["x:1", "x:1"]))
        .await
        .unwrap();

    h.engine.remove(&id, &[]).await.unwrap();

    assert!(!h.docker.has_image("x:1"));
    assert!(h.engine.registry().get(&id).is_none());
}

#[tokio::test(start_paused = true)]
async fn remove_spares_images_with_live_containers() {
    let h = harness();
    let id = ManifestUniqueID::from("app1");
    h.engine
        .deploy(manifest("app1", "2024-05-01T00:00:00Z", &["x:1"]))
        .await
        .unwrap();
    h.docker.seed_foreign_container("x:1");

    h.engine.remove(&id, &[]).await.unwrap();

    assert!(h.docker.has_image("x:1"), "image with a live container survives");
    assert!(h.engine.registry().get(&id).is_none());
}

#[tokio::test(start_paused = true)]
async fn undeploy_accumulates_errors() {
    let h = harness();
    let id = ManifestUniqueID::from("app1");
    h.engine
        .deploy(manifest("app1", "2024-05-01T00:00:00Z", &["a:1", "b:2"]))
        .await
        .unwrap();
    h.docker.with(|w| {
        w.fail_remove_container = true;
        w.fail_prune.insert("app1".to_string());
    });

    let err = h.engine.undeploy(&id).await.unwrap_err();
    match &err {
        EdgeAppError::Accumulated { causes, .. } => assert_eq!(causes.len(), 3),
        other => panic!("expected accumulated error, got {other:?}"),
    }
    assert!(err
        .to_string()
        .contains("could not be undeployed completely"));
    assert_eq!(h.engine.registry().status(&id), Some(EdgeAppStatus::Error));
}

#[tokio::test(start_paused = true)]
async fn remove_all_continues_past_failures() {
    let h = harness();
    h.engine
        .deploy(manifest("app1", "2024-05-01T00:00:00Z", &["a:1"]))
        .await
        .unwrap();
    h.engine
        .deploy(manifest("app2", "2024-05-01T00:00:00Z", &["b:1"]))
        .await
        .unwrap();
    h.docker.with(|w| {
        w.fail_prune.insert("app1".to_string());
    });

    let err = h.engine.remove_all().await.unwrap_err();
    assert!(err.to_string().contains("prune refused"));

    // app2 was still removed
    assert!(h
        .engine
        .registry()
        .get(&ManifestUniqueID::from("app2"))
        .is_none());
    // app1 survives in Error for diagnosis
    assert_eq!(
        h.engine.registry().status(&ManifestUniqueID::from("app1")),
        Some(EdgeAppStatus::Error)
    );
}

#[tokio::test(start_paused = true)]
async fn commands_on_unknown_apps_fail_cleanly() {
    let h = harness();
    let id = ManifestUniqueID::from("ghost");

    assert!(matches!(
        h.engine.stop(&id).await.unwrap_err(),
        EdgeAppError::NotFound(_)
    ));
    assert!(matches!(
        h.engine.resume(&id).await.unwrap_err(),
        EdgeAppError::NotFound(_)
    ));
    assert!(matches!(
        h.engine.undeploy(&id).await.unwrap_err(),
        EdgeAppError::NotFound(_)
    ));
    assert!(matches!(
        h.engine.remove(&id, &[]).await.unwrap_err(),
        EdgeAppError::NotFound(_)
    ));
}

#[test]
fn commands_parse_and_render() {
    assert_eq!("DEPLOY".parse::<Command>().unwrap(), Command::Deploy);
    assert_eq!("REMOVE".parse::<Command>().unwrap(), Command::Remove);
    assert_eq!(Command::Undeploy.as_str(), "UNDEPLOY");
    assert!(matches!(
        "RESTART".parse::<Command>().unwrap_err(),
        EdgeAppError::UnknownCommand(_)
    ));
}
