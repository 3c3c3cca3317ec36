// JSON-file implementation of the credential persistence hook.
//
// The credential blob is opaque to the bot; whatever the client library
// hands over on a credential-update event is written out verbatim so the
// session survives a restart.

use crate::core::client::{CredentialError, CredentialStore};
use async_trait::async_trait;
use std::path::PathBuf;

pub struct JsonCredentialStore {
    path: PathBuf,
}

impl JsonCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CredentialStore for JsonCredentialStore {
    async fn save(&self, creds: &serde_json::Value) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = std::fs::File::create(&self.path)?;
        serde_json::to_writer_pretty(file, creds)?;
        Ok(())
    }
}
