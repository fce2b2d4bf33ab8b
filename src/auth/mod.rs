//! Authentication for the search service.
//!
//! - **API key**: `api-key` header, the default.
//! - **Developer tools** (`azure` feature): Entra ID bearer token for the
//!   `https://search.azure.com/.default` scope, cached until shortly before
//!   expiry.

mod credential;
#[cfg(feature = "azure")]
mod token_cache;

pub use credential::SearchCredential;

#[cfg(feature = "azure")]
use std::sync::Arc;

use secrecy::ExposeSecret;

use crate::Result;

#[cfg(feature = "azure")]
const SEARCH_SCOPE: &str = "https://search.azure.com/.default";

/// Resolves request headers from a [`SearchCredential`].
///
/// Cheap to clone; clones share the token cache.
#[derive(Clone, Debug)]
pub struct SearchAuth {
    credential: SearchCredential,
    #[cfg(feature = "azure")]
    token_cache: Arc<token_cache::TokenCache>,
}

impl SearchAuth {
    pub fn new(credential: SearchCredential) -> Self {
        Self {
            credential,
            #[cfg(feature = "azure")]
            token_cache: Arc::new(tokio::sync::RwLock::new(None)),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.credential.kind()
    }

    /// Lowercase header name and value authorizing one request.
    pub async fn header(&self) -> Result<(&'static str, String)> {
        match &self.credential {
            SearchCredential::ApiKey(key) => Ok(("api-key", key.expose_secret().to_string())),
            #[cfg(feature = "azure")]
            SearchCredential::DeveloperTools(credential) => {
                let token = self.bearer_token(credential.as_ref()).await?;
                Ok(("authorization", format!("Bearer {token}")))
            }
        }
    }

    #[cfg(feature = "azure")]
    async fn bearer_token(
        &self,
        credential: &azure_identity::DeveloperToolsCredential,
    ) -> Result<String> {
        use azure_core::credentials::TokenCredential;

        {
            let cache = self.token_cache.read().await;
            if let Some(ref cached) = *cache
                && !cached.is_stale()
            {
                return Ok(cached.token().to_string());
            }
        }

        tracing::debug!("Requesting Azure Search token from developer tools");
        let access = credential
            .get_token(&[SEARCH_SCOPE], None)
            .await
            .map_err(|e| crate::Error::auth(format!("Failed to get Azure token: {e}")))?;

        let token = access.token.secret().to_string();
        *self.token_cache.write().await = Some(token_cache::CachedToken::new(
            token.clone(),
            token_cache::DEFAULT_TOKEN_TTL,
        ));
        Ok(token)
    }
}
