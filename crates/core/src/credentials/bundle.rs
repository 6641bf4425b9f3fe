use std::fmt;

/// Access key, secret key and region needed to talk to the query service.
///
/// Every required field is non-empty. `Debug` and `Display` never print the
/// secret and only show the last four characters of the access key.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialBundle {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    pub session_token: Option<String>,
}

impl CredentialBundle {
    pub fn masked_access_key(&self) -> String {
        mask(&self.access_key_id)
    }
}

impl fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialBundle")
            .field("access_key_id", &self.masked_access_key())
            .field("secret_access_key", &"****")
            .field("region", &self.region)
            .field("session_token", &self.session_token.as_ref().map(|_| "****"))
            .finish()
    }
}

impl fmt::Display for CredentialBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.masked_access_key(), self.region)
    }
}

/// Whatever a single source yielded. Blank values are normalised to `None`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PartialCredentials {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub region: Option<String>,
    pub session_token: Option<String>,
}

impl PartialCredentials {
    pub fn new(
        access_key_id: Option<String>,
        secret_access_key: Option<String>,
        region: Option<String>,
    ) -> Self {
        Self {
            access_key_id: normalize(access_key_id),
            secret_access_key: normalize(secret_access_key),
            region: normalize(region),
            session_token: None,
        }
    }

    pub fn with_session_token(mut self, token: Option<String>) -> Self {
        self.session_token = normalize(token);
        self
    }

    /// True when none of the three required fields is present.
    pub fn is_empty(&self) -> bool {
        self.access_key_id.is_none() && self.secret_access_key.is_none() && self.region.is_none()
    }

    /// Names of the required fields that are absent, in declaration order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.access_key_id.is_none() {
            missing.push("access_key_id");
        }
        if self.secret_access_key.is_none() {
            missing.push("secret_access_key");
        }
        if self.region.is_none() {
            missing.push("region");
        }
        missing
    }

    /// Promote to a full bundle, or return the missing field names.
    pub fn into_bundle(self) -> Result<CredentialBundle, Vec<&'static str>> {
        match (self.access_key_id, self.secret_access_key, self.region) {
            (Some(access_key_id), Some(secret_access_key), Some(region)) => Ok(CredentialBundle {
                access_key_id,
                secret_access_key,
                region,
                session_token: self.session_token,
            }),
            (a, s, r) => Err(PartialCredentials::new(a, s, r).missing_fields()),
        }
    }
}

impl fmt::Debug for PartialCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartialCredentials")
            .field("access_key_id", &self.access_key_id.as_deref().map(mask))
            .field("secret_access_key", &self.secret_access_key.as_ref().map(|_| "****"))
            .field("region", &self.region)
            .field("session_token", &self.session_token.as_ref().map(|_| "****"))
            .finish()
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn mask(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let visible = chars.len().min(4);
    let tail: String = chars[chars.len() - visible..].iter().collect();
    format!("****{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    #[test]
    fn blank_fields_are_missing() {
        let partial = PartialCredentials::new(s("AKIA1234"), s("   "), None);
        assert!(!partial.is_empty());
        assert_eq!(partial.missing_fields(), vec!["secret_access_key", "region"]);
        assert_eq!(
            partial.into_bundle().unwrap_err(),
            vec!["secret_access_key", "region"]
        );
    }

    #[test]
    fn session_token_alone_is_empty() {
        let partial = PartialCredentials::default().with_session_token(s("tok"));
        assert!(partial.is_empty());
    }

    #[test]
    fn complete_partial_becomes_bundle() {
        let bundle = PartialCredentials::new(s(" AKIAEXAMPLE9876 "), s("secret"), s("eu-north-1"))
            .with_session_token(s(""))
            .into_bundle()
            .unwrap();
        assert_eq!(bundle.access_key_id, "AKIAEXAMPLE9876");
        assert_eq!(bundle.region, "eu-north-1");
        assert_eq!(bundle.session_token, None);
    }

    #[test]
    fn debug_and_display_hide_secrets() {
        let bundle = CredentialBundle {
            access_key_id: "AKIAEXAMPLE9876".into(),
            secret_access_key: "super-secret-value".into(),
            region: "eu-north-1".into(),
            session_token: Some("session-secret".into()),
        };

        let debug = format!("{bundle:?}");
        assert!(!debug.contains("super-secret-value"));
        assert!(!debug.contains("session-secret"));
        assert!(!debug.contains("AKIAEXAMPLE"));
        assert!(debug.contains("****9876"));

        assert_eq!(bundle.to_string(), "****9876 @ eu-north-1");
    }

    #[test]
    fn short_keys_mask_whole_value() {
        assert_eq!(mask("ab"), "****ab");
        assert_eq!(mask(""), "****");
    }
}
