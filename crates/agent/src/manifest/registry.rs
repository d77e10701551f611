//! In-memory manifest registry — the authoritative record of intended
//! state and last-reported status, keyed by [`ManifestUniqueID`].
//!
//! A single coarse lock guards the map; no lock is ever held across a
//! container-runtime call.

use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error;

use crate::manifest::{ContainerConfig, Manifest};
use crate::model::{EdgeAppStatus, ManifestUniqueID};

#[derive(Error, Debug)]
#[error("edge application {0} does not exist")]
pub struct UnknownManifest(pub ManifestUniqueID);

#[derive(Debug, Clone)]
pub struct ManifestRecord {
    pub manifest: Manifest,
    pub status: EdgeAppStatus,
}

#[derive(Default)]
pub struct ManifestRegistry {
    known: Mutex<HashMap<ManifestUniqueID, ManifestRecord>>,
}

impl ManifestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. A fresh entry starts as `Initiated`.
    pub fn add(&self, manifest: Manifest) {
        let mut known = self.known.lock().unwrap();
        known.insert(
            manifest.unique_id.clone(),
            ManifestRecord {
                manifest,
                status: EdgeAppStatus::Initiated,
            },
        );
    }

    pub fn get(&self, unique_id: &ManifestUniqueID) -> Option<ManifestRecord> {
        self.known.lock().unwrap().get(unique_id).cloned()
    }

    pub fn status(&self, unique_id: &ManifestUniqueID) -> Option<EdgeAppStatus> {
        self.known.lock().unwrap().get(unique_id).map(|r| r.status)
    }

    pub fn set_status(
        &self,
        unique_id: &ManifestUniqueID,
        status: EdgeAppStatus,
    ) -> Result<(), UnknownManifest> {
        let mut known = self.known.lock().unwrap();
        let record = known
            .get_mut(unique_id)
            .ok_or_else(|| UnknownManifest(unique_id.clone()))?;
        record.status = status;
        Ok(())
    }

    pub fn delete(&self, unique_id: &ManifestUniqueID) -> Option<ManifestRecord> {
        self.known.lock().unwrap().remove(unique_id)
    }

    /// Redacted snapshot of every record, ordered by id so status
    /// reports are stable.
    pub fn all(&self) -> Vec<ManifestRecord> {
        let known = self.known.lock().unwrap();
        let mut records: Vec<ManifestRecord> = known
            .values()
            .map(|r| ManifestRecord {
                manifest: r.manifest.redacted(),
                status: r.status,
            })
            .collect();
        records.sort_by(|a, b| a.manifest.unique_id.cmp(&b.manifest.unique_id));
        records
    }

    pub fn ids(&self) -> Vec<ManifestUniqueID> {
        let known = self.known.lock().unwrap();
        let mut ids: Vec<ManifestUniqueID> = known.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Full image-name list of a known manifest. Re-deployments use it to
    /// decide which images survive the old version's removal.
    pub fn used_images(
        &self,
        unique_id: &ManifestUniqueID,
    ) -> Result<Vec<String>, UnknownManifest> {
        let known = self.known.lock().unwrap();
        known
            .get(unique_id)
            .map(|r| r.manifest.image_names())
            .ok_or_else(|| UnknownManifest(unique_id.clone()))
    }

    /// Mutate the stored manifest with the effective network name (names,
    /// ingress host, egress URLs) and return the wired module configs.
    pub fn apply_network(
        &self,
        unique_id: &ManifestUniqueID,
        network_name: &str,
    ) -> Result<Vec<ContainerConfig>, UnknownManifest> {
        let mut known = self.known.lock().unwrap();
        let record = known
            .get_mut(unique_id)
            .ok_or_else(|| UnknownManifest(unique_id.clone()))?;
        record.manifest.apply_network(network_name);
        Ok(record.manifest.modules.clone())
    }
}
