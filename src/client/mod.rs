//! Azure AI Search REST client.

mod executor;
pub mod request;
mod response;

use std::sync::Arc;

use tracing::{debug, info};
use url::Url;

use crate::auth::SearchAuth;
use crate::config::{ConfigError, ENDPOINT_VAR, SearchConfig};
use crate::types::{HybridOptions, SearchKind, SearchPage};
use crate::Result;

use executor::RequestExecutor;
use request::SearchRequest;

pub const DEFAULT_API_VERSION: &str = "2024-07-01";
pub const DEFAULT_VECTOR_FIELD: &str = "text_vector";
pub const DEFAULT_TOP: u32 = 5;
pub const DEFAULT_HYBRID_TOP: u32 = 20;
pub const MAX_TOP: u32 = 1000;
/// Nearest neighbours requested for plain vector search (raised to `top` when larger).
pub const VECTOR_K: u32 = 50;

/// Long-lived client for one search index.
///
/// Clones share the connection pool and token cache.
#[derive(Clone, Debug)]
pub struct SearchClient {
    http: reqwest::Client,
    auth: SearchAuth,
    config: Arc<SearchConfig>,
    search_url: Url,
}

impl SearchClient {
    pub fn new(config: SearchConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_http(config, http)
    }

    /// Use a preconfigured `reqwest::Client` (proxies, custom TLS).
    pub fn with_http(config: SearchConfig, http: reqwest::Client) -> Result<Self> {
        let search_url = search_url(&config)?;
        info!(
            endpoint = %config.endpoint,
            index = %config.index_name,
            credential = config.credential.kind(),
            "Search client initialized"
        );
        Ok(Self {
            http,
            auth: SearchAuth::new(config.credential.clone()),
            config: Arc::new(config),
            search_url,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Full URL of the documents search endpoint, including `api-version`.
    pub fn search_url(&self) -> &Url {
        &self.search_url
    }

    /// Lexical query. `top` absent or non-positive means [`DEFAULT_TOP`].
    pub async fn keyword_search(&self, text: &str, top: Option<i64>) -> Result<SearchPage> {
        let top = request::resolve_top(top, DEFAULT_TOP);
        self.execute(SearchKind::Keyword, &request::keyword(text, top))
            .await
    }

    /// Vector similarity using the index's integrated vectorizer.
    pub async fn vector_search(&self, text: &str, top: Option<i64>) -> Result<SearchPage> {
        let top = request::resolve_top(top, DEFAULT_TOP);
        let fields = self.config.hybrid.vector_field_selector();
        self.execute(SearchKind::Vector, &request::vector(text, top, &fields))
            .await
    }

    /// Lexical and vector queries fused by the service in one call.
    pub async fn hybrid_search(
        &self,
        text: &str,
        top: Option<i64>,
        options: HybridOptions,
    ) -> Result<SearchPage> {
        let top = request::resolve_top(top, DEFAULT_HYBRID_TOP);
        let (body, applied) = request::hybrid(
            text,
            top,
            &options,
            &self.config.hybrid,
            &self.config.api_version,
        )?;
        let mut page = self.execute(SearchKind::Hybrid, &body).await?;
        page.applied = Some(applied);
        Ok(page)
    }

    async fn execute(&self, kind: SearchKind, body: &SearchRequest) -> Result<SearchPage> {
        debug!(kind = %kind, top = body.top, vectors = body.vector_queries.len(), "Sending search request");

        let auth = self.auth.header().await?;
        let bytes = RequestExecutor::post(&self.http, &self.search_url, body, auth).await?;
        let mut page = response::parse_page(kind, &bytes)?;
        page.hits.truncate(body.top as usize);

        debug!(kind = %kind, hits = page.len(), count = ?page.count, "Search completed");
        Ok(page)
    }
}

fn search_url(config: &SearchConfig) -> Result<Url> {
    let mut url = config.endpoint.clone();
    url.path_segments_mut()
        .map_err(|_| ConfigError::InvalidValue {
            key: ENDPOINT_VAR.to_string(),
            message: "endpoint cannot be used as a base URL".to_string(),
        })?
        .pop_if_empty()
        .extend(["indexes", config.index_name.as_str(), "docs", "search"]);
    url.set_query(None);
    url.query_pairs_mut()
        .append_pair("api-version", &config.api_version);
    Ok(url)
}
