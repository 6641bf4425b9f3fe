pub mod config;
pub mod credentials;
pub mod error;
pub mod row;

pub use config::{active_profile, load_dotenv, load_dotenv_from, profile_label};
pub use credentials::{
    CredentialBundle, CredentialProvider, CredentialResolver, CredentialSources,
    EnvironmentProvider, PartialCredentials, PlatformSecretsProvider, ResolvedCredentials,
    SharedCredentialsFileProvider,
};
pub use error::CredentialError;
pub use row::{last_updated, parse_timestamp, FieldValue, SnapshotRow};

// Env-mutating tests across modules must run serially.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
