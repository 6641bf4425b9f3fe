//! Credential bundle resolution.
//!
//! A [`CredentialResolver`] walks a priority-ordered list of
//! [`CredentialProvider`]s and returns the first complete
//! [`CredentialBundle`]. The standard chain is:
//!
//! 1. [`PlatformSecretsProvider`]: secrets document injected by the hosting platform
//! 2. [`EnvironmentProvider`]: `AWS_*` variables
//! 3. [`SharedCredentialsFileProvider`]: `~/.aws/credentials` + `~/.aws/config`

mod bundle;
mod environment;
mod platform;
mod resolver;
mod shared_file;
mod sources;

pub use bundle::{CredentialBundle, PartialCredentials};
pub use environment::EnvironmentProvider;
pub use platform::PlatformSecretsProvider;
pub use resolver::{CredentialProvider, CredentialResolver, ResolvedCredentials};
pub use shared_file::SharedCredentialsFileProvider;
pub use sources::CredentialSources;
