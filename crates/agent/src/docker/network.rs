//! Network domain — labeled create and label-scoped prune.

use std::collections::HashMap;

use bollard::models::NetworkCreateRequest;
use bollard::query_parameters::PruneNetworksOptions;

use super::client::{DockerClient, DockerError};
use crate::manifest::LABEL_MANIFEST_UNIQUE_ID;
use crate::model::ManifestUniqueID;

impl DockerClient {
    /// Create a bridge network carrying the manifest labels. The name is
    /// sanitized for the daemon; the effective name is returned.
    pub async fn create_network(
        &self,
        name: &str,
        labels: &HashMap<String, String>,
    ) -> Result<String, DockerError> {
        let network_name = sanitize_network_name(name);

        let config = NetworkCreateRequest {
            name: network_name.clone(),
            driver: Some("bridge".to_string()),
            labels: Some(labels.clone()),
            ..Default::default()
        };

        self.client.create_network(config).await?;

        Ok(network_name)
    }

    /// Remove only the networks labeled with this manifest id.
    pub async fn prune_networks(&self, unique_id: &ManifestUniqueID) -> Result<(), DockerError> {
        let filters = HashMap::from([(
            "label".to_string(),
            vec![format!("{LABEL_MANIFEST_UNIQUE_ID}={unique_id}")],
        )]);

        self.client
            .prune_networks(Some(PruneNetworksOptions {
                filters: Some(filters),
            }))
            .await?;

        Ok(())
    }
}

fn sanitize_network_name(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .map(|c| match c {
            c if c.is_whitespace() => '-',
            c if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') => c,
            _ => '-',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_names_are_lowercased_and_cleaned() {
        assert_eq!(sanitize_network_name("Demo Pipeline"), "demo-pipeline");
        assert_eq!(sanitize_network_name("edge_app.v2"), "edge_app.v2");
        assert_eq!(sanitize_network_name("weird/name!"), "weird-name-");
    }
}
