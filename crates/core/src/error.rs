use thiserror::Error;

/// Failures while resolving a credential bundle.
#[derive(Error, Debug)]
pub enum CredentialError {
    /// No source provided any credential field.
    #[error("no AWS credentials found (tried: {})", tried.join(", "))]
    Missing { tried: Vec<String> },

    /// A source provided some fields but not all of them, and no other
    /// source produced a complete bundle.
    #[error("incomplete AWS credentials from {provider}: missing {}", missing.join(", "))]
    Incomplete {
        provider: String,
        missing: Vec<&'static str>,
    },

    /// A source exists but could not be read or parsed.
    #[error("malformed credential source {provider}: {reason}")]
    Malformed { provider: String, reason: String },
}
