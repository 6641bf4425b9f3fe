use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::CredentialError;

use super::bundle::{CredentialBundle, PartialCredentials};
use super::environment::EnvironmentProvider;
use super::platform::PlatformSecretsProvider;
use super::shared_file::SharedCredentialsFileProvider;
use super::sources::CredentialSources;

/// A single place credentials may come from.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Short stable name used in logs and errors.
    fn name(&self) -> &str;

    /// `Ok(None)` when the source is absent. `Err` only when the source exists
    /// but cannot be read.
    async fn try_resolve(&self) -> Result<Option<PartialCredentials>, CredentialError>;
}

/// A bundle plus the provider that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCredentials {
    pub bundle: CredentialBundle,
    pub provider: String,
}

/// Priority-ordered provider chain; the first complete bundle wins.
pub struct CredentialResolver {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl CredentialResolver {
    pub fn new(providers: Vec<Box<dyn CredentialProvider>>) -> Self {
        Self { providers }
    }

    /// Platform secrets, then environment, then the shared AWS files.
    pub fn standard(sources: &CredentialSources) -> Self {
        Self::new(vec![
            Box::new(PlatformSecretsProvider::new(
                sources.secrets_file.clone(),
                sources.secrets_namespace.clone(),
            )),
            Box::new(EnvironmentProvider::new(sources.profile.clone())),
            Box::new(SharedCredentialsFileProvider::new(
                sources.credentials_file.clone(),
                sources.config_file.clone(),
                sources.aws_profile.clone(),
            )),
        ])
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Walk the chain.
    ///
    /// An incomplete source does not stop the walk; it is only reported when
    /// no later source yields a complete bundle. A malformed source aborts.
    pub async fn resolve(&self) -> Result<ResolvedCredentials, CredentialError> {
        let mut first_incomplete: Option<(String, Vec<&'static str>)> = None;

        for provider in &self.providers {
            let partial = match provider.try_resolve().await? {
                Some(p) if !p.is_empty() => p,
                _ => {
                    debug!(provider = provider.name(), "credential source unavailable");
                    continue;
                }
            };

            match partial.into_bundle() {
                Ok(bundle) => {
                    info!(
                        provider = provider.name(),
                        access_key = %bundle.masked_access_key(),
                        region = %bundle.region,
                        "resolved AWS credentials"
                    );
                    return Ok(ResolvedCredentials {
                        bundle,
                        provider: provider.name().to_string(),
                    });
                }
                Err(missing) => {
                    warn!(
                        provider = provider.name(),
                        missing = ?missing,
                        "credential source is incomplete, trying next"
                    );
                    first_incomplete.get_or_insert((provider.name().to_string(), missing));
                }
            }
        }

        match first_incomplete {
            Some((provider, missing)) => Err(CredentialError::Incomplete { provider, missing }),
            None => Err(CredentialError::Missing {
                tried: self.provider_names().into_iter().map(String::from).collect(),
            }),
        }
    }
}
