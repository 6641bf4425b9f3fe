use std::fs;
use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::error::CredentialError;

use super::bundle::PartialCredentials;
use super::resolver::CredentialProvider;

/// Secrets document provisioned by the hosting platform.
///
/// ```toml
/// [aws]
/// access_key_id = "AKIA..."
/// secret_access_key = "..."
/// region = "eu-north-1"
/// ```
///
/// A missing file or a missing namespace table means "not hosted".
pub struct PlatformSecretsProvider {
    path: PathBuf,
    namespace: String,
}

impl PlatformSecretsProvider {
    pub fn new(path: PathBuf, namespace: String) -> Self {
        Self { path, namespace }
    }

    fn malformed(&self, reason: impl Into<String>) -> CredentialError {
        CredentialError::Malformed {
            provider: self.name().to_string(),
            reason: format!("{}: {}", self.path.display(), reason.into()),
        }
    }
}

#[async_trait]
impl CredentialProvider for PlatformSecretsProvider {
    fn name(&self) -> &str {
        "platform-secrets"
    }

    async fn try_resolve(&self) -> Result<Option<PartialCredentials>, CredentialError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no platform secrets file");
                return Ok(None);
            }
            Err(e) => return Err(self.malformed(e.to_string())),
        };

        let doc: toml::Table = raw.parse().map_err(|e: toml::de::Error| self.malformed(e.message()))?;

        let Some(section) = doc.get(&self.namespace) else {
            debug!(namespace = %self.namespace, "platform secrets have no credential table");
            return Ok(None);
        };
        let table = section
            .as_table()
            .ok_or_else(|| self.malformed(format!("`{}` is not a table", self.namespace)))?;

        let field = |key: &str| table.get(key).and_then(|v| v.as_str()).map(str::to_string);

        Ok(Some(
            PartialCredentials::new(
                field("access_key_id"),
                field("secret_access_key"),
                field("region"),
            )
            .with_session_token(field("session_token")),
        ))
    }
}
