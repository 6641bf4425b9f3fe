use std::path::PathBuf;

use crate::config::{active_profile, profiled_env_opt, profiled_env_or};

const DEFAULT_SECRETS_FILE: &str = ".secrets/secrets.toml";
const DEFAULT_SECRETS_NAMESPACE: &str = "aws";
const DEFAULT_AWS_PROFILE: &str = "default";

/// Where the standard providers look, passed explicitly into the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialSources {
    /// Config profile used as the env var prefix (empty = none).
    pub profile: String,
    /// Platform secrets document.
    pub secrets_file: PathBuf,
    /// Table inside the secrets document holding the credential keys.
    pub secrets_namespace: String,
    /// AWS shared credentials file; `None` when no home directory is known.
    pub credentials_file: Option<PathBuf>,
    /// AWS shared config file (region lookup).
    pub config_file: Option<PathBuf>,
    /// Section name inside the shared files.
    pub aws_profile: String,
}

impl CredentialSources {
    pub fn from_env() -> Self {
        Self::from_env_profiled(&active_profile())
    }

    /// Reads `MATCHDAY_SECRETS_FILE`, `MATCHDAY_SECRETS_NAMESPACE`,
    /// `AWS_SHARED_CREDENTIALS_FILE`, `AWS_CONFIG_FILE` and `AWS_PROFILE`,
    /// each with the usual `{PROFILE}_` prefix lookup.
    pub fn from_env_profiled(profile: &str) -> Self {
        let aws_dir = dirs::home_dir().map(|home| home.join(".aws"));

        Self {
            profile: profile.to_string(),
            secrets_file: PathBuf::from(profiled_env_or(
                profile,
                "MATCHDAY_SECRETS_FILE",
                DEFAULT_SECRETS_FILE,
            )),
            secrets_namespace: profiled_env_or(
                profile,
                "MATCHDAY_SECRETS_NAMESPACE",
                DEFAULT_SECRETS_NAMESPACE,
            ),
            credentials_file: profiled_env_opt(profile, "AWS_SHARED_CREDENTIALS_FILE")
                .map(PathBuf::from)
                .or_else(|| aws_dir.as_ref().map(|d| d.join("credentials"))),
            config_file: profiled_env_opt(profile, "AWS_CONFIG_FILE")
                .map(PathBuf::from)
                .or_else(|| aws_dir.as_ref().map(|d| d.join("config"))),
            aws_profile: profiled_env_or(profile, "AWS_PROFILE", DEFAULT_AWS_PROFILE),
        }
    }
}
