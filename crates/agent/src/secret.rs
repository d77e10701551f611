//! Secret store seam.
//!
//! The platform's key-exchange service decrypts secret-marked manifest
//! values; the agent only consumes it through [`SecretStore`]. The default
//! [`PlaintextSecretStore`] is used when no such service is wired in.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SecretError {
    #[error("no organization key available")]
    MissingKey,
    #[error("malformed secret payload: {0}")]
    Malformed(String),
}

/// Decrypts individual secret-marked values and identifies the
/// organization key used for them.
pub trait SecretStore: Send + Sync {
    fn decrypt_env(&self, value: &str) -> Result<String, SecretError>;
    fn org_key_hash(&self) -> &str;
}

/// Pass-through store: values arrive unencrypted and are used as-is.
#[derive(Debug, Clone, Default)]
pub struct PlaintextSecretStore {
    org_key_hash: String,
}

impl PlaintextSecretStore {
    pub fn new(org_key_hash: impl Into<String>) -> Self {
        Self {
            org_key_hash: org_key_hash.into(),
        }
    }
}

impl SecretStore for PlaintextSecretStore {
    fn decrypt_env(&self, value: &str) -> Result<String, SecretError> {
        Ok(value.to_string())
    }

    fn org_key_hash(&self) -> &str {
        &self.org_key_hash
    }
}
