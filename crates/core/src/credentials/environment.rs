use async_trait::async_trait;

use crate::config::profiled_env_opt;
use crate::error::CredentialError;

use super::bundle::PartialCredentials;
use super::resolver::CredentialProvider;

/// `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` / `AWS_SESSION_TOKEN`, region
/// from `AWS_REGION` then `AWS_DEFAULT_REGION`. Each key honours the profile
/// prefix.
pub struct EnvironmentProvider {
    profile: String,
}

impl EnvironmentProvider {
    pub fn new(profile: String) -> Self {
        Self { profile }
    }
}

#[async_trait]
impl CredentialProvider for EnvironmentProvider {
    fn name(&self) -> &str {
        "environment"
    }

    async fn try_resolve(&self) -> Result<Option<PartialCredentials>, CredentialError> {
        let get = |key: &str| profiled_env_opt(&self.profile, key);

        let partial = PartialCredentials::new(
            get("AWS_ACCESS_KEY_ID"),
            get("AWS_SECRET_ACCESS_KEY"),
            get("AWS_REGION").or_else(|| get("AWS_DEFAULT_REGION")),
        )
        .with_session_token(get("AWS_SESSION_TOKEN"));

        Ok((!partial.is_empty()).then_some(partial))
    }
}
