//! Search service configuration.

use std::fmt;

use secrecy::SecretString;
use url::Url;

use super::env::{env_bool, env_list, env_opt, env_parse};
use super::{ConfigError, EnvSource, ProcessEnv};
use crate::auth::SearchCredential;
use crate::client::DEFAULT_API_VERSION;
use crate::types::SearchMode;

pub const ENDPOINT_VAR: &str = "AZURE_SEARCH_SERVICE_ENDPOINT";
pub const INDEX_NAME_VAR: &str = "AZURE_SEARCH_INDEX_NAME";
pub const API_KEY_VAR: &str = "AZURE_SEARCH_API_KEY";
pub const DEVELOPER_CREDENTIAL_VAR: &str = "AZURE_SEARCH_USE_DEVELOPER_CREDENTIAL";

pub const DEFAULT_VECTOR_K: u32 = 60;
pub const DEFAULT_VECTOR_WEIGHT: f64 = 1.0;

/// Immutable connection settings for one search index.
///
/// Built once at startup and moved into [`SearchClient`](crate::SearchClient).
#[derive(Clone)]
pub struct SearchConfig {
    pub endpoint: Url,
    pub index_name: String,
    pub credential: SearchCredential,
    pub api_version: String,
    pub hybrid: HybridDefaults,
}

impl fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("index_name", &self.index_name)
            .field("credential", &self.credential.kind())
            .field("api_version", &self.api_version)
            .field("hybrid", &self.hybrid)
            .finish()
    }
}

impl SearchConfig {
    /// Create with an explicit endpoint, index and API key.
    pub fn new(
        endpoint: &str,
        index_name: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            endpoint: parse_endpoint(endpoint)?,
            index_name: index_name.into(),
            credential: SearchCredential::ApiKey(SecretString::from(api_key.into())),
            api_version: DEFAULT_API_VERSION.to_string(),
            hybrid: HybridDefaults::default(),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&ProcessEnv)
    }

    /// Resolve the configuration, failing if any required value is missing.
    ///
    /// Every missing variable is reported in one error.
    pub fn from_source(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        let endpoint = env_opt(env, ENDPOINT_VAR);
        let index_name = env_opt(env, INDEX_NAME_VAR);
        let api_key = env_opt(env, API_KEY_VAR);
        let use_developer_credential = env_bool(env, DEVELOPER_CREDENTIAL_VAR);

        let mut missing = Vec::new();
        if endpoint.is_none() {
            missing.push(ENDPOINT_VAR.to_string());
        }
        if index_name.is_none() {
            missing.push(INDEX_NAME_VAR.to_string());
        }
        if api_key.is_none() && !use_developer_credential {
            missing.push(API_KEY_VAR.to_string());
        }

        let (Some(endpoint), Some(index_name)) = (endpoint, index_name) else {
            return Err(ConfigError::MissingVars(missing));
        };
        if !missing.is_empty() {
            return Err(ConfigError::MissingVars(missing));
        }

        let credential = match api_key {
            Some(key) => SearchCredential::ApiKey(SecretString::from(key)),
            None => SearchCredential::developer_tools()?,
        };

        Ok(Self {
            endpoint: parse_endpoint(&endpoint)?,
            index_name,
            credential,
            api_version: env_opt(env, "AZURE_SEARCH_API_VERSION")
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            hybrid: HybridDefaults::from_source(env)?,
        })
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_hybrid_defaults(mut self, hybrid: HybridDefaults) -> Self {
        self.hybrid = hybrid;
        self
    }

    pub fn with_credential(mut self, credential: SearchCredential) -> Self {
        self.credential = credential;
        self
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidValue {
        key: ENDPOINT_VAR.to_string(),
        message: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            key: ENDPOINT_VAR.to_string(),
            message: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}

/// Server-side defaults applied to `hybrid_search` when a call omits them.
#[derive(Clone, Debug, PartialEq)]
pub struct HybridDefaults {
    pub semantic_configuration: Option<String>,
    pub search_fields: Vec<String>,
    pub vector_fields: Vec<String>,
    pub select_fields: Vec<String>,
    pub query_type: Option<String>,
    pub search_mode: SearchMode,
    pub query_language: Option<String>,
    pub query_rewrites: Option<String>,
    pub vector_k: u32,
    pub vector_weight: f64,
}

impl Default for HybridDefaults {
    fn default() -> Self {
        Self {
            semantic_configuration: None,
            search_fields: Vec::new(),
            vector_fields: Vec::new(),
            select_fields: Vec::new(),
            query_type: None,
            search_mode: SearchMode::All,
            query_language: None,
            query_rewrites: None,
            vector_k: DEFAULT_VECTOR_K,
            vector_weight: DEFAULT_VECTOR_WEIGHT,
        }
    }
}

impl HybridDefaults {
    pub fn from_source(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        let search_mode = match env_opt(env, "AZURE_SEARCH_SEARCH_MODE") {
            Some(raw) => raw.parse::<SearchMode>().map_err(|message| ConfigError::InvalidValue {
                key: "AZURE_SEARCH_SEARCH_MODE".to_string(),
                message,
            })?,
            None => SearchMode::All,
        };

        Ok(Self {
            semantic_configuration: env_opt(env, "AZURE_SEARCH_SEMANTIC_CONFIGURATION"),
            search_fields: env_list(env, "AZURE_SEARCH_SEARCH_FIELDS"),
            vector_fields: env_list(env, "AZURE_SEARCH_VECTOR_FIELDS"),
            select_fields: env_list(env, "AZURE_SEARCH_SELECT_FIELDS"),
            query_type: env_opt(env, "AZURE_SEARCH_QUERY_TYPE"),
            search_mode,
            query_language: env_opt(env, "AZURE_SEARCH_QUERY_LANGUAGE"),
            query_rewrites: env_opt(env, "AZURE_SEARCH_QUERY_REWRITES"),
            vector_k: env_parse::<u32>(env, "AZURE_SEARCH_VECTOR_DEFAULT_K")
                .filter(|k| *k > 0)
                .unwrap_or(DEFAULT_VECTOR_K),
            vector_weight: env_parse::<f64>(env, "AZURE_SEARCH_VECTOR_DEFAULT_WEIGHT")
                .filter(|w| *w > 0.0)
                .unwrap_or(DEFAULT_VECTOR_WEIGHT),
        })
    }

    /// Vector fields to target, falling back to `text_vector`.
    pub fn vector_field_selector(&self) -> String {
        if self.vector_fields.is_empty() {
            crate::client::DEFAULT_VECTOR_FIELD.to_string()
        } else {
            self.vector_fields.join(",")
        }
    }
}
