//! Startup configuration.
//!
//! - [`SearchConfig`]: required endpoint, index and credential, plus optional
//!   hybrid-search defaults. Missing required values are fatal.
//! - [`ServerConfig`]: transport selection, every field defaulted.

pub mod env;
mod search;
mod server;

pub use env::{EnvSource, ProcessEnv, split_list};
pub use search::{
    API_KEY_VAR, DEFAULT_VECTOR_K, DEFAULT_VECTOR_WEIGHT, DEVELOPER_CREDENTIAL_VAR, ENDPOINT_VAR,
    HybridDefaults, INDEX_NAME_VAR, SearchConfig,
};
pub use server::{DEFAULT_HOST, DEFAULT_PATH, DEFAULT_PORT, ServerConfig, Transport};

use thiserror::Error;

/// Configuration errors. All of them stop the process before serving.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variables: {}", .0.join(", "))]
    MissingVars(Vec<String>),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("{setting} requires the '{feature}' feature")]
    FeatureDisabled {
        setting: &'static str,
        feature: &'static str,
    },

    #[error("Credential setup failed: {0}")]
    Credential(String),
}
