//! Image domain — existence check, authenticated pull, lookup, remove.

use bollard::auth::DockerCredentials;
use bollard::query_parameters::{CreateImageOptions, RemoveImageOptions};
use futures_util::stream::StreamExt;

use super::client::{DockerClient, DockerError};
use super::inventory::ImageInfo;
use crate::manifest::RegistryAuth;

impl DockerClient {
    /// Whether an image is already present on the host. No side effects.
    pub async fn image_exists(&self, name: &str) -> Result<bool, DockerError> {
        match self.client.inspect_image(name).await {
            Ok(_) => Ok(true),
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => Ok(false),
            Err(e) => Err(DockerError::from(e)),
        }
    }

    /// Pull an image from a registry. Returns when the pull is complete.
    pub async fn pull_image(&self, auth: &RegistryAuth, name: &str) -> Result<(), DockerError> {
        let (image, tag) = split_image_tag(name);

        let options = Some(CreateImageOptions {
            from_image: Some(image.to_string()),
            tag: Some(tag.to_string()),
            ..Default::default()
        });

        let credentials = (!auth.is_empty()).then(|| DockerCredentials {
            username: Some(auth.username.clone()),
            password: Some(auth.password.clone()),
            serveraddress: Some(auth.server.clone()),
            ..Default::default()
        });

        let mut stream = self.client.create_image(options, None, credentials);

        while let Some(result) = stream.next().await {
            match result {
                Ok(info) => {
                    tracing::debug!(status = ?info.status, "image pull progress");
                }
                Err(e) => return Err(DockerError::from(e)),
            }
        }

        Ok(())
    }

    /// Remove an image by id.
    pub async fn remove_image(&self, image_id: &str) -> Result<(), DockerError> {
        let options = Some(RemoveImageOptions {
            force: false,
            noprune: false,
            ..Default::default()
        });

        self.client
            .remove_image(image_id, options, None)
            .await
            .map_err(|e| match e {
                bollard::errors::Error::DockerResponseServerError {
                    status_code: 404, ..
                } => DockerError::ImageNotFound(image_id.to_string()),
                other => DockerError::BollardError(other),
            })?;

        Ok(())
    }

    /// Image ids of the currently-present images matching `names`.
    /// Missing names are skipped, not errors.
    pub async fn images_by_name(&self, names: &[String]) -> Result<Vec<ImageInfo>, DockerError> {
        let mut images = Vec::with_capacity(names.len());
        for name in names {
            match self.client.inspect_image(name).await {
                Ok(details) => images.push(ImageInfo {
                    id: details.id.unwrap_or_default(),
                    name: name.clone(),
                }),
                Err(bollard::errors::Error::DockerResponseServerError {
                    status_code: 404, ..
                }) => continue,
                Err(e) => return Err(DockerError::from(e)),
            }
        }
        Ok(images)
    }
}

/// Split `name[:tag]` into image and tag, leaving registry ports alone.
/// A missing tag defaults to `latest`.
fn split_image_tag(name: &str) -> (&str, &str) {
    match name.rfind(':') {
        Some(idx) if !name[idx + 1..].contains('/') => (&name[..idx], &name[idx + 1..]),
        _ => (name, "latest"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_plain_tag() {
        assert_eq!(split_image_tag("nginx:1.25"), ("nginx", "1.25"));
    }

    #[test]
    fn missing_tag_defaults_to_latest() {
        assert_eq!(split_image_tag("nginx"), ("nginx", "latest"));
    }

    #[test]
    fn registry_port_is_not_a_tag() {
        assert_eq!(
            split_image_tag("registry.example.com:5000/app"),
            ("registry.example.com:5000/app", "latest")
        );
        assert_eq!(
            split_image_tag("registry.example.com:5000/app:v2"),
            ("registry.example.com:5000/app", "v2")
        );
    }
}
