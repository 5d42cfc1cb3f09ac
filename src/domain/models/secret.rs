//! Credential secrets.

use std::collections::BTreeMap;

use base64::Engine;
use serde::{Deserialize, Serialize};

use super::meta::ObjectMeta;
use crate::domain::errors::{DomainError, DomainResult};

/// Secret holding credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Secret {
    pub metadata: ObjectMeta,
    /// Plain-text values; take precedence over `data`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub string_data: BTreeMap<String, String>,
    /// Base64-encoded values.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
}

impl Secret {
    /// Looks up `key`, decoding it from `data` when `stringData` lacks it.
    pub fn get(&self, key: &str) -> DomainResult<Option<String>> {
        if let Some(value) = self.string_data.get(key) {
            return Ok(Some(value.clone()));
        }
        let Some(encoded) = self.data.get(key) else {
            return Ok(None);
        };
        let invalid = |reason: String| {
            DomainError::Validation(format!(
                "Secret {} key '{key}' is not valid base64-encoded UTF-8: {reason}",
                self.metadata.name
            ))
        };
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| invalid(e.to_string()))?;
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| invalid(e.to_string()))
    }
}

/// Username/password pair resolved from a [`Secret`].
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Read `username` and `password` from `secret`.
    pub fn from_secret(secret: &Secret) -> DomainResult<Self> {
        let field = |key: &str| {
            secret.get(key)?.ok_or_else(|| DomainError::MissingSecretKey {
                secret: secret.metadata.name.clone(),
                key: key.to_string(),
            })
        };
        Ok(Self {
            username: field("username")?,
            password: field("password")?,
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(pairs: &[(&str, &str)]) -> Secret {
        Secret {
            metadata: ObjectMeta::new("ns", "creds"),
            string_data: pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            ..Secret::default()
        }
    }

    #[test]
    fn test_credentials_from_secret() {
        let creds = Credentials::from_secret(&secret(&[("username", "u"), ("password", "p")]))
            .expect("credentials should resolve");
        assert_eq!(creds.username, "u");
        assert_eq!(creds.password, "p");
        assert!(!format!("{creds:?}").contains("\"p\""));
    }

    #[test]
    fn test_missing_password_is_error() {
        let err = Credentials::from_secret(&secret(&[("username", "u")])).unwrap_err();
        assert!(matches!(err, DomainError::MissingSecretKey { ref key, .. } if key == "password"));
    }

    #[test]
    fn test_credentials_from_base64_data() {
        let mut secret = secret(&[]);
        secret.data.insert("username".to_string(), "YWRtaW4=".to_string());
        secret.data.insert("password".to_string(), "c2VjcmV0".to_string());

        let creds = Credentials::from_secret(&secret).expect("credentials should decode");
        assert_eq!(creds.username, "admin");
        assert_eq!(creds.password, "secret");
    }

    #[test]
    fn test_string_data_wins_over_data() {
        let mut secret = secret(&[("username", "plain")]);
        secret.data.insert("username".to_string(), "ZW5jb2RlZA==".to_string());

        assert_eq!(secret.get("username").unwrap().as_deref(), Some("plain"));
    }

    #[test]
    fn test_invalid_base64_is_validation_error() {
        let mut secret = secret(&[("username", "u")]);
        secret.data.insert("password".to_string(), "not base64!".to_string());

        let err = Credentials::from_secret(&secret).unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref msg) if msg.contains("password")));
    }
}
