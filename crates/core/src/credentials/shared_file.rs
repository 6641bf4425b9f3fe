use std::borrow::Cow;
use std::error::Error as _;
use std::path::PathBuf;

use async_trait::async_trait;
use aws_config::profile::{self, ProfileFileLoadError};
use aws_runtime::env_config::file::{EnvConfigFileKind, EnvConfigFiles};
use aws_types::os_shim_internal::{Env, Fs};
use tracing::debug;

use crate::error::CredentialError;

use super::bundle::PartialCredentials;
use super::resolver::CredentialProvider;

const CREDENTIAL_KEYS: [&str; 3] = [
    "aws_access_key_id",
    "aws_secret_access_key",
    "aws_session_token",
];

/// The per-user AWS files, parsed by the SDK's own profile loader.
///
/// Both files are merged into one profile; on a clash the credentials file
/// wins. The profile only counts as "present" when it carries at least one
/// credential key, so a config file with just a region does not make this
/// source partially available.
pub struct SharedCredentialsFileProvider {
    credentials_file: Option<PathBuf>,
    config_file: Option<PathBuf>,
    profile: String,
}

impl SharedCredentialsFileProvider {
    pub fn new(
        credentials_file: Option<PathBuf>,
        config_file: Option<PathBuf>,
        profile: String,
    ) -> Self {
        Self {
            credentials_file,
            config_file,
            profile,
        }
    }

    fn malformed(&self, err: ProfileFileLoadError) -> CredentialError {
        let reason = match err.source() {
            Some(cause) => format!("{err}: {cause}"),
            None => err.to_string(),
        };
        CredentialError::Malformed {
            provider: self.name().to_string(),
            reason,
        }
    }
}

#[async_trait]
impl CredentialProvider for SharedCredentialsFileProvider {
    fn name(&self) -> &str {
        "shared-credentials-file"
    }

    async fn try_resolve(&self) -> Result<Option<PartialCredentials>, CredentialError> {
        let Some(credentials) = self.credentials_file.as_ref().filter(|p| p.is_file()) else {
            debug!(path = ?self.credentials_file, "no shared credentials file");
            return Ok(None);
        };

        // Config goes first so the credentials file overrides it on merge.
        let mut files = EnvConfigFiles::builder();
        if let Some(config) = self.config_file.as_ref().filter(|p| p.is_file()) {
            files = files.with_file(EnvConfigFileKind::Config, config);
        }
        let files = files
            .with_file(EnvConfigFileKind::Credentials, credentials)
            .build();

        let profiles = profile::load(
            &Fs::real(),
            &Env::real(),
            &files,
            Some(Cow::Owned(self.profile.clone())),
        )
        .await
        .map_err(|e| self.malformed(e))?;

        let Some(section) = profiles.get_profile(&self.profile) else {
            debug!(profile = %self.profile, "shared credentials file has no such profile");
            return Ok(None);
        };
        if CREDENTIAL_KEYS.iter().all(|key| section.get(key).is_none()) {
            debug!(profile = %self.profile, "profile carries no credential keys");
            return Ok(None);
        }

        let get = |key: &str| section.get(key).map(str::to_string);
        Ok(Some(
            PartialCredentials::new(
                get("aws_access_key_id"),
                get("aws_secret_access_key"),
                get("region"),
            )
            .with_session_token(get("aws_session_token")),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn provider_for(
        credentials: &str,
        config: Option<&str>,
        profile: &str,
    ) -> (tempfile::TempDir, SharedCredentialsFileProvider) {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("credentials"), credentials).unwrap();
        if let Some(config) = config {
            fs::write(tmp.path().join("config"), config).unwrap();
        }
        let provider = SharedCredentialsFileProvider::new(
            Some(tmp.path().join("credentials")),
            Some(tmp.path().join("config")),
            profile.to_string(),
        );
        (tmp, provider)
    }

    #[tokio::test]
    async fn header_with_trailing_comment_is_recognised() {
        let (_tmp, provider) = provider_for(
            "[default] # main\n\
             aws_access_key_id = AKIADEFAULT\n\
             aws_secret_access_key = shh\n\
             region = eu-north-1\n",
            None,
            "default",
        );

        let bundle = provider.try_resolve().await.unwrap().unwrap().into_bundle().unwrap();
        assert_eq!(bundle.access_key_id, "AKIADEFAULT");
        assert_eq!(bundle.secret_access_key, "shh");
        assert_eq!(bundle.region, "eu-north-1");
    }

    #[tokio::test]
    async fn indented_sub_properties_do_not_override_top_level_keys() {
        let (_tmp, provider) = provider_for(
            "[default]\n\
             aws_access_key_id = AKIADEFAULT\n\
             aws_secret_access_key = shh\n\
             region = eu-west-1\n\
             s3 =\n  region = us-east-1\n",
            None,
            "default",
        );

        let bundle = provider.try_resolve().await.unwrap().unwrap().into_bundle().unwrap();
        assert_eq!(bundle.region, "eu-west-1");
    }

    #[tokio::test]
    async fn values_keep_inner_equals_signs() {
        let (_tmp, provider) = provider_for(
            "[default]\naws_access_key_id = AKIA\naws_secret_access_key = abc=def==\n",
            Some("[default]\nregion = eu-north-1\n"),
            "default",
        );

        let bundle = provider.try_resolve().await.unwrap().unwrap().into_bundle().unwrap();
        assert_eq!(bundle.secret_access_key, "abc=def==");
    }

    #[tokio::test]
    async fn credentials_file_region_beats_config_region() {
        let (_tmp, provider) = provider_for(
            "[default]\naws_access_key_id = AKIA\naws_secret_access_key = s\nregion = eu-west-1\n",
            Some("[default]\nregion = us-east-1\n"),
            "default",
        );

        let bundle = provider.try_resolve().await.unwrap().unwrap().into_bundle().unwrap();
        assert_eq!(bundle.region, "eu-west-1");
    }

    #[tokio::test]
    async fn partial_profile_is_reported_as_partial() {
        let (_tmp, provider) =
            provider_for("[default]\naws_access_key_id = AKIAHALF\n", None, "default");

        let missing = provider
            .try_resolve()
            .await
            .unwrap()
            .unwrap()
            .into_bundle()
            .unwrap_err();
        assert_eq!(missing, vec!["secret_access_key", "region"]);
    }
}
