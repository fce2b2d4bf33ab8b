//! Tool dispatch and transport tests.
//!
//! Run: cargo nextest run --test server_tests

use std::sync::Arc;
use std::time::{Duration, Instant};

use azure_search_mcp::{AzureSearchServer, SearchClient, SearchConfig};
use rmcp::model::{CallToolResult, ErrorCode, JsonObject};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn server_for(mock: &MockServer) -> AzureSearchServer {
    let config = SearchConfig::new(&mock.uri(), "test-index", "test-key").unwrap();
    AzureSearchServer::new(Arc::new(SearchClient::new(config).unwrap()))
}

fn args(value: Value) -> Option<JsonObject> {
    value.as_object().cloned()
}

fn text(result: &CallToolResult) -> String {
    let value = serde_json::to_value(result).unwrap();
    value["content"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["text"].as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn one_document(title: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "value": [{"@search.score": 1.5, "title": title, "chunk": format!("{title} body")}]
    }))
}

// =============================================================================
// Dispatch
// =============================================================================

mod dispatch_tests {
    use super::*;

    #[tokio::test]
    async fn test_keyword_dispatch_renders_markdown() {
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(one_document("Annual Report"))
            .mount(&mock)
            .await;

        let result = server_for(&mock)
            .dispatch("keyword_search", args(json!({"query": "report", "top": 3})))
            .await
            .unwrap();

        assert_ne!(result.is_error, Some(true));
        let body = text(&result);
        assert!(body.starts_with("## Keyword Search Results"));
        assert!(body.contains("### 1. Annual Report"));
        assert!(body.contains("Score: 1.50"));
        assert!(body.contains("Annual Report body"));
    }

    #[tokio::test]
    async fn test_empty_results_message() {
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": []})))
            .mount(&mock)
            .await;

        let result = server_for(&mock)
            .dispatch("vector_search", args(json!({"query": "nothing"})))
            .await
            .unwrap();
        assert_eq!(
            text(&result),
            "No results found for your query using Vector Search."
        );
    }

    #[tokio::test]
    async fn test_hybrid_dispatch_reports_applied_parameters() {
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"top": 4, "searchFields": "chunk,title"})))
            .respond_with(one_document("Hybrid Hit"))
            .expect(1)
            .mount(&mock)
            .await;

        let result = server_for(&mock)
            .dispatch(
                "hybrid_search",
                args(json!({
                    "query": "rust",
                    "top": 4,
                    "search_fields": "chunk, title",
                    "vector_texts": ["systems programming"]
                })),
            )
            .await
            .unwrap();

        let body = text(&result);
        assert!(body.starts_with("## Hybrid Search Results"));
        assert!(body.contains("### Applied search parameters"));
        assert!(body.contains("- search_fields: chunk,title"));
    }

    #[tokio::test]
    async fn test_hybrid_renders_selected_fields_of_custom_index() {
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"select": "DomainUserLogin,Summary"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{
                    "@search.score": 2.0,
                    "DomainUserLogin": "jdoe",
                    "Summary": "Embedded C firmware engineer"
                }]
            })))
            .expect(1)
            .mount(&mock)
            .await;

        let result = server_for(&mock)
            .dispatch(
                "hybrid_search",
                args(json!({"query": "c++", "select": ["DomainUserLogin", "Summary"]})),
            )
            .await
            .unwrap();

        let body = text(&result);
        assert!(body.contains("DomainUserLogin: jdoe"));
        assert!(body.contains("Summary: Embedded C firmware engineer"));
    }

    #[tokio::test]
    async fn test_hybrid_without_query_text() {
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "search": "",
                "vectorQueries": [{"text": "firmware developer"}]
            })))
            .respond_with(one_document("Vector Only"))
            .expect(1)
            .mount(&mock)
            .await;

        let result = server_for(&mock)
            .dispatch(
                "hybrid_search",
                args(json!({"vector_texts": "firmware developer"})),
            )
            .await
            .unwrap();
        assert_ne!(result.is_error, Some(true));
        assert!(text(&result).contains("Vector Only"));
    }

    #[tokio::test]
    async fn test_keyword_lists_fields_when_no_title_or_body() {
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{"@search.score": 1.0, "HotelId": "17", "Rating": 4.5}]
            })))
            .mount(&mock)
            .await;

        let result = server_for(&mock)
            .dispatch("keyword_search", args(json!({"query": "hotel"})))
            .await
            .unwrap();

        let body = text(&result);
        assert!(body.contains("HotelId: 17"));
        assert!(body.contains("Rating: 4.5"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_invalid_params() {
        let mock = MockServer::start().await;
        let err = server_for(&mock)
            .dispatch("semantic_search", args(json!({"query": "x"})))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(err.message.contains("semantic_search"));
    }

    #[tokio::test]
    async fn test_malformed_arguments_are_invalid_params() {
        let mock = MockServer::start().await;
        let server = server_for(&mock);

        let err = server
            .dispatch("keyword_search", args(json!({"top": 3})))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);

        let err = server
            .dispatch(
                "hybrid_search",
                args(json!({"query": "q", "vector_weights": "heavy"})),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(mock.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remote_failure_is_error_result_then_recovers() {
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"code": "Forbidden", "message": "Invalid api-key"}
            })))
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&mock)
            .await;
        Mock::given(method("POST"))
            .respond_with(one_document("Recovered"))
            .mount(&mock)
            .await;

        let server = server_for(&mock);
        let failed = server
            .dispatch("keyword_search", args(json!({"query": "q"})))
            .await
            .unwrap();
        assert_eq!(failed.is_error, Some(true));
        let message = text(&failed);
        assert!(message.starts_with("Error performing keyword search:"));
        assert!(message.contains("403"));

        let ok = server
            .dispatch("keyword_search", args(json!({"query": "q"})))
            .await
            .unwrap();
        assert_ne!(ok.is_error, Some(true));
        assert!(text(&ok).contains("Recovered"));
    }

    #[tokio::test]
    async fn test_hybrid_validation_error_is_error_result() {
        let mock = MockServer::start().await;
        let result = server_for(&mock)
            .dispatch(
                "hybrid_search",
                args(json!({"query": "q", "query_type": "semantic"})),
            )
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
        assert!(text(&result).starts_with("Error performing hybrid search:"));
    }
}

// =============================================================================
// Concurrency
// =============================================================================

mod concurrency_tests {
    use super::*;

    #[tokio::test]
    async fn test_concurrent_calls_do_not_mix_results() {
        let mock = MockServer::start().await;
        for topic in ["alpha", "beta"] {
            Mock::given(method("POST"))
                .and(body_partial_json(json!({"search": topic})))
                .respond_with(
                    one_document(&format!("{topic} result"))
                        .set_delay(Duration::from_millis(50)),
                )
                .mount(&mock)
                .await;
        }

        let server = server_for(&mock);
        let (a, b) = tokio::join!(
            server.dispatch("keyword_search", args(json!({"query": "alpha"}))),
            server.dispatch("keyword_search", args(json!({"query": "beta"}))),
        );

        let (a, b) = (text(&a.unwrap()), text(&b.unwrap()));
        assert!(a.contains("alpha result") && !a.contains("beta result"));
        assert!(b.contains("beta result") && !b.contains("alpha result"));
    }

    #[tokio::test]
    async fn test_serialized_server_runs_one_call_at_a_time() {
        let delay = Duration::from_millis(150);
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(one_document("slow").set_delay(delay))
            .mount(&mock)
            .await;

        let server = server_for(&mock).serialized();
        assert!(server.is_serialized());

        let started = Instant::now();
        let (a, b) = tokio::join!(
            server.dispatch("keyword_search", args(json!({"query": "first"}))),
            server.dispatch("keyword_search", args(json!({"query": "second"}))),
        );
        assert!(a.is_ok() && b.is_ok());
        assert!(started.elapsed() >= delay * 2);

        let requests = mock.received_requests().await.unwrap();
        let order: Vec<String> = requests
            .iter()
            .map(|r| r.body_json::<Value>().unwrap()["search"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(order, vec!["first", "second"]);
    }
}

// =============================================================================
// Stdio transport
// =============================================================================

mod stdio_tests {
    use super::*;
    use azure_search_mcp::Transport;
    use azure_search_mcp::server::{runtime_for, serve_io};
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

    fn call(id: u64, query: &str) -> String {
        let message = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "tools/call",
            "params": {"name": "keyword_search", "arguments": {"query": query}}
        });
        format!("{message}\n")
    }

    #[test]
    fn test_stdio_calls_run_one_at_a_time_in_arrival_order() {
        let runtime = runtime_for(&Transport::Stdio).unwrap();
        runtime.block_on(async {
            let delay = Duration::from_millis(150);
            let mock = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(one_document("slow").set_delay(delay))
                .mount(&mock)
                .await;

            let (client_io, server_io) = tokio::io::duplex(64 * 1024);
            let (server_read, server_write) = tokio::io::split(server_io);
            tokio::spawn(serve_io(
                server_for(&mock).serialized(),
                server_read,
                server_write,
            ));

            let (client_read, mut client_write) = tokio::io::split(client_io);
            let mut lines = BufReader::new(client_read).lines();

            let initialize = json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "initialize",
                "params": {
                    "protocolVersion": "2025-03-26",
                    "capabilities": {},
                    "clientInfo": {"name": "server-tests", "version": "0.0.0"}
                }
            });
            client_write
                .write_all(format!("{initialize}\n").as_bytes())
                .await
                .unwrap();
            let reply = lines.next_line().await.unwrap().unwrap();
            assert!(reply.contains("serverInfo"));
            client_write
                .write_all(b"{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n")
                .await
                .unwrap();

            let started = Instant::now();
            let batch = ["first", "second", "third"]
                .iter()
                .enumerate()
                .map(|(i, q)| call(i as u64 + 2, q))
                .collect::<String>();
            client_write.write_all(batch.as_bytes()).await.unwrap();

            let mut answered = Vec::new();
            while answered.len() < 3 {
                let line = tokio::time::timeout(Duration::from_secs(10), lines.next_line())
                    .await
                    .unwrap()
                    .unwrap()
                    .unwrap();
                let message: Value = serde_json::from_str(&line).unwrap();
                if let Some(id) = message["id"].as_u64() {
                    answered.push(id);
                }
            }
            assert_eq!(answered, vec![2, 3, 4]);
            assert!(started.elapsed() >= delay * 3);

            let order: Vec<String> = mock
                .received_requests()
                .await
                .unwrap()
                .iter()
                .map(|r| r.body_json::<Value>().unwrap()["search"].as_str().unwrap().to_string())
                .collect();
            assert_eq!(order, vec!["first", "second", "third"]);
        });
    }
}

// =============================================================================
// HTTP transport
// =============================================================================

mod http_tests {
    use super::*;
    use azure_search_mcp::server::serve_http;
    use tokio::net::TcpListener;
    use tokio_util::sync::CancellationToken;

    async fn start(server: AzureSearchServer, path: &str) -> (String, CancellationToken) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let ct = CancellationToken::new();
        let path_owned = path.to_string();
        tokio::spawn({
            let ct = ct.clone();
            async move {
                serve_http(listener, &path_owned, server, ct).await.unwrap();
            }
        });
        (format!("http://{addr}"), ct)
    }

    fn initialize_request() -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "protocolVersion": "2025-03-26",
                "capabilities": {},
                "clientInfo": {"name": "server-tests", "version": "0.0.0"}
            }
        })
    }

    #[tokio::test]
    async fn test_initialize_over_event_stream() {
        let mock = MockServer::start().await;
        let (base, ct) = start(server_for(&mock), "/mcp").await;

        let http = reqwest::Client::new();
        let mut response = http
            .post(format!("{base}/mcp"))
            .header("Accept", "application/json, text/event-stream")
            .json(&initialize_request())
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
        assert!(response.headers().contains_key("mcp-session-id"));

        let mut body = String::new();
        let read = tokio::time::timeout(Duration::from_secs(5), async {
            while let Some(chunk) = response.chunk().await.unwrap() {
                body.push_str(&String::from_utf8_lossy(&chunk));
                if body.contains("serverInfo") {
                    break;
                }
            }
        })
        .await;
        assert!(read.is_ok(), "timed out waiting for initialize result");
        assert!(body.contains("azure-search-mcp"));
        assert!(body.contains("\"tools\""));

        ct.cancel();
    }

    #[tokio::test]
    async fn test_other_paths_are_not_served() {
        let mock = MockServer::start().await;
        let (base, ct) = start(server_for(&mock), "/mcp").await;

        let response = reqwest::Client::new()
            .post(format!("{base}/elsewhere"))
            .header("Accept", "application/json, text/event-stream")
            .json(&initialize_request())
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

        ct.cancel();
    }
}
