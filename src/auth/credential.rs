//! Credential types.

use std::fmt;
#[cfg(feature = "azure")]
use std::sync::Arc;

#[cfg(feature = "azure")]
use azure_identity::DeveloperToolsCredential;
use secrecy::SecretString;

use crate::config::ConfigError;

/// Credential presented to the search service.
#[derive(Clone)]
pub enum SearchCredential {
    /// Admin or query key, sent as the `api-key` header.
    ApiKey(SecretString),
    /// Entra ID token from the local developer tool chain (Azure CLI, azd).
    #[cfg(feature = "azure")]
    DeveloperTools(Arc<DeveloperToolsCredential>),
}

impl SearchCredential {
    pub fn api_key(key: impl Into<String>) -> Self {
        Self::ApiKey(SecretString::from(key.into()))
    }

    /// Build the developer tool credential chain.
    #[cfg(feature = "azure")]
    pub fn developer_tools() -> Result<Self, ConfigError> {
        let credential = DeveloperToolsCredential::new(None)
            .map_err(|e| ConfigError::Credential(format!("Failed to create Azure credential: {e}")))?;
        Ok(Self::DeveloperTools(credential))
    }

    #[cfg(not(feature = "azure"))]
    pub fn developer_tools() -> Result<Self, ConfigError> {
        Err(ConfigError::FeatureDisabled {
            setting: crate::config::DEVELOPER_CREDENTIAL_VAR,
            feature: "azure",
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SearchCredential::ApiKey(_) => "api_key",
            #[cfg(feature = "azure")]
            SearchCredential::DeveloperTools(_) => "developer_tools",
        }
    }
}

impl fmt::Debug for SearchCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SearchCredential").field(&self.kind()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_credential() {
        let cred = SearchCredential::api_key("super-secret");
        assert_eq!(cred.kind(), "api_key");
        assert!(!format!("{cred:?}").contains("super-secret"));
    }

    #[cfg(not(feature = "azure"))]
    #[test]
    fn test_developer_tools_without_feature() {
        let err = SearchCredential::developer_tools().unwrap_err();
        assert!(err.to_string().contains("azure"));
        assert!(err.to_string().contains(crate::config::DEVELOPER_CREDENTIAL_VAR));
    }
}
