//! # azure-search-mcp
//!
//! Model Context Protocol server that exposes Azure AI Search as three tools:
//! `keyword_search`, `vector_search` and `hybrid_search`.
//!
//! Ranking, vectorization and fusion all happen inside the managed search
//! service. This crate resolves configuration, keeps one HTTP client to the
//! index, forwards queries and renders the ranked results as text.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use azure_search_mcp::{SearchClient, SearchConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), azure_search_mcp::Error> {
//!     let config = SearchConfig::from_env()?;
//!     let client = SearchClient::new(config)?;
//!
//!     let page = client.keyword_search("quarterly report", Some(3)).await?;
//!     for hit in &page.hits {
//!         println!("{}. {} ({:.2})", hit.rank, hit.title().unwrap_or("Untitled"), hit.score);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Serving tools
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use azure_search_mcp::{AzureSearchServer, SearchClient, SearchConfig, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), azure_search_mcp::Error> {
//!     let client = Arc::new(SearchClient::new(SearchConfig::from_env()?)?);
//!     let server = ServerConfig::from_env()?;
//!     azure_search_mcp::server::run(server.transport, AzureSearchServer::new(client)).await
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod auth;
pub mod client;
pub mod config;
pub mod format;
pub mod observability;
pub mod server;
pub mod tools;
pub mod types;

pub use auth::{SearchAuth, SearchCredential};
pub use client::{DEFAULT_API_VERSION, SearchClient};
pub use config::{
    ConfigError, EnvSource, HybridDefaults, ProcessEnv, SearchConfig, ServerConfig, Transport,
};
pub use server::AzureSearchServer;
pub use types::{
    AppliedParameters, HybridOptions, SearchHit, SearchKind, SearchMode, SearchPage, SemanticAnswer,
};

/// Error type for azure-search-mcp operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Invalid or missing startup configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Search service returned a non-success response.
    #[error("Azure Search API error (HTTP {status}){}: {message}", code.as_deref().map(|c| format!(" [{c}]")).unwrap_or_default())]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Credential could not be obtained or was rejected before sending.
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    /// Network connectivity or request failed.
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization or deserialization failed.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Request parameters are invalid.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Transport could not be started or failed while serving.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Socket or stream operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error category for unified error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Authentication or authorization failures (401, 403)
    Authorization,
    /// Configuration or request validation errors
    Configuration,
    /// Network, throttling or server-side errors that may succeed later
    Transient,
    /// Listener or stream failures
    Transport,
    /// Malformed responses and other unexpected states
    Internal,
}

impl Error {
    pub fn auth(message: impl Into<String>) -> Self {
        Error::Auth {
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Error::InvalidRequest(message.into())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Auth { .. } | Error::Api { status: 401 | 403, .. } => {
                ErrorCategory::Authorization
            }

            Error::Config(_) | Error::InvalidRequest(_) => ErrorCategory::Configuration,
            Error::Api { status: 400 | 404, .. } => ErrorCategory::Configuration,

            Error::Network(_) => ErrorCategory::Transient,
            Error::Api {
                status: 429 | 500..=599,
                ..
            } => ErrorCategory::Transient,

            Error::Transport(_) | Error::Io(_) => ErrorCategory::Transport,

            Error::Json(_) | Error::Api { .. } => ErrorCategory::Internal,
        }
    }

    pub fn is_configuration_error(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }

    pub fn is_authorization_error(&self) -> bool {
        self.category() == ErrorCategory::Authorization
    }

    /// Whether a caller could reasonably try the same request again.
    ///
    /// This crate never retries on its own.
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Transient
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
