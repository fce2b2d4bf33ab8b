//! MCP server exposing the search tools.

mod transport;

pub use transport::{
    router, run, runtime_for, serve_http, serve_io, serve_stdio, shutdown_signal,
};

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use rmcp::ServerHandler;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, ErrorData, Implementation, JsonObject,
    ListToolsResult, PaginatedRequestParams, ServerCapabilities, ServerInfo,
};
use rmcp::service::{RequestContext, RoleServer};
use tokio::sync::Mutex;
use tracing::Instrument;

use crate::client::SearchClient;
use crate::format;
use crate::observability::SpanContext;
use crate::tools::{self, HybridSearch, KeywordSearch, SearchTool, VectorSearch};
use crate::types::{SearchKind, SearchPage};

const INSTRUCTIONS: &str = "Search an Azure AI Search index. Use keyword_search for exact terms, \
     vector_search for meaning, and hybrid_search to combine both with optional semantic ranking.";

/// Tool handler shared by every session.
///
/// Clones share the search client. A serialized handler (stdio) runs one
/// tool call at a time. Calls queue on a fair lock, so they run in arrival
/// order when driven from a current-thread runtime (see [`runtime_for`]).
#[derive(Clone)]
pub struct AzureSearchServer {
    client: Arc<SearchClient>,
    serial: Option<Arc<Mutex<()>>>,
    spans: Arc<SpanContext>,
}

impl AzureSearchServer {
    pub fn new(client: Arc<SearchClient>) -> Self {
        Self {
            client,
            serial: None,
            spans: Arc::new(SpanContext::new()),
        }
    }

    /// Process tool calls strictly one at a time.
    pub fn serialized(mut self) -> Self {
        self.serial = Some(Arc::new(Mutex::new(())));
        self
    }

    pub fn is_serialized(&self) -> bool {
        self.serial.is_some()
    }

    pub fn client(&self) -> &SearchClient {
        &self.client
    }

    /// Run one tool call by name.
    ///
    /// Unknown tools and malformed arguments are protocol errors. Search
    /// failures become an error result so the session keeps going.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, ErrorData> {
        let kind = SearchKind::from_tool_name(name)
            .ok_or_else(|| ErrorData::invalid_params(format!("Unknown tool: {name}"), None))?;

        let span = self.spans.tool_call_span(kind);
        self.dispatch_kind(kind, arguments)
            .instrument(span)
            .await
    }

    async fn dispatch_kind(
        &self,
        kind: SearchKind,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, ErrorData> {
        let call = self.prepare(kind, arguments)?;

        let _turn = match &self.serial {
            Some(lock) => Some(lock.lock().await),
            None => None,
        };

        let started = Instant::now();
        let outcome = match call {
            Call::Keyword { query, top } => self.client.keyword_search(&query, top).await,
            Call::Vector { query, top } => self.client.vector_search(&query, top).await,
            Call::Hybrid { query, top, options } => {
                self.client.hybrid_search(&query, top, *options).await
            }
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        Ok(match outcome {
            Ok(page) => success(&page, elapsed_ms),
            Err(e) => {
                tracing::Span::current().record("is_error", true);
                tracing::warn!(
                    error = %e,
                    category = ?e.category(),
                    status = e.status_code(),
                    elapsed_ms,
                    "Search failed"
                );
                CallToolResult::error(vec![Content::text(format::error_text(kind, &e))])
            }
        })
    }

    fn prepare(&self, kind: SearchKind, arguments: Option<JsonObject>) -> Result<Call, ErrorData> {
        Ok(match kind {
            SearchKind::Keyword => {
                let input = KeywordSearch::parse(arguments)?;
                Call::Keyword {
                    query: input.query,
                    top: input.top,
                }
            }
            SearchKind::Vector => {
                let input = VectorSearch::parse(arguments)?;
                Call::Vector {
                    query: input.query,
                    top: input.top,
                }
            }
            SearchKind::Hybrid => {
                let (query, top, options) = HybridSearch::parse(arguments)?
                    .into_options()
                    .map_err(|message| ErrorData::invalid_params(message, None))?;
                Call::Hybrid {
                    query,
                    top,
                    options: Box::new(options),
                }
            }
        })
    }
}

enum Call {
    Keyword {
        query: String,
        top: Option<i64>,
    },
    Vector {
        query: String,
        top: Option<i64>,
    },
    Hybrid {
        query: String,
        top: Option<i64>,
        options: Box<crate::types::HybridOptions>,
    },
}

fn success(page: &SearchPage, elapsed_ms: u64) -> CallToolResult {
    tracing::Span::current().record("hits", page.len());
    tracing::info!(hits = page.len(), count = ?page.count, elapsed_ms, "Search completed");
    CallToolResult::success(vec![Content::text(format::render(page))])
}

impl ServerHandler for AzureSearchServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.into()),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, ErrorData>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult::with_all_items(tools::definitions())))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, ErrorData>> + Send + '_ {
        async move { self.dispatch(&request.name, request.arguments).await }
    }
}
