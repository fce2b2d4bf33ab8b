//! Tool definitions for the MCP surface.

mod input;

pub use input::{HybridSearchInput, KeywordSearchInput, ListArg, Scalar, VectorSearchInput};

use std::sync::Arc;

use rmcp::model::{ErrorData, JsonObject, Tool};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;

use crate::types::SearchKind;

/// A search operation exposed as a tool, with a schema derived from its input.
pub trait SearchTool {
    type Input: JsonSchema + DeserializeOwned;
    const KIND: SearchKind;
    const DESCRIPTION: &'static str;

    fn input_schema() -> Arc<JsonObject> {
        let schema = schemars::schema_for!(Self::Input);
        let mut object = serde_json::to_value(schema)
            .ok()
            .and_then(|value| value.as_object().cloned())
            .unwrap_or_default();
        object
            .entry("type")
            .or_insert_with(|| serde_json::Value::String("object".into()));
        object
            .entry("properties")
            .or_insert_with(|| serde_json::Value::Object(JsonObject::new()));
        Arc::new(object)
    }

    fn definition() -> Tool {
        Tool {
            name: Self::KIND.tool_name().into(),
            title: Some(format!("{} Search", Self::KIND).into()),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: Self::input_schema(),
            output_schema: None,
            annotations: None,
            execution: None,
            icons: None,
            meta: None,
        }
    }

    /// Deserialize call arguments, mapping failures to `invalid_params`.
    fn parse(arguments: Option<JsonObject>) -> Result<Self::Input, ErrorData> {
        let value = serde_json::Value::Object(arguments.unwrap_or_default());
        serde_json::from_value(value).map_err(|e| {
            ErrorData::invalid_params(
                format!("Invalid arguments for {}: {e}", Self::KIND.tool_name()),
                None,
            )
        })
    }
}

pub struct KeywordSearch;

impl SearchTool for KeywordSearch {
    type Input = KeywordSearchInput;
    const KIND: SearchKind = SearchKind::Keyword;
    const DESCRIPTION: &'static str =
        "Perform a keyword-based search on the Azure AI Search index. Returns up to `top` ranked documents.";
}

pub struct VectorSearch;

impl SearchTool for VectorSearch {
    type Input = VectorSearchInput;
    const KIND: SearchKind = SearchKind::Vector;
    const DESCRIPTION: &'static str = "Perform a vector similarity search on the Azure AI Search index. \
         The query text is embedded by the index's vectorizer.";
}

pub struct HybridSearch;

impl SearchTool for HybridSearch {
    type Input = HybridSearchInput;
    const KIND: SearchKind = SearchKind::Hybrid;
    const DESCRIPTION: &'static str = "Run a hybrid (lexical + vector) query on the Azure AI Search index, \
         fused by the service. Supports semantic ranking, per-vector k and weights, filters, facets \
         and field selection.";
}

/// All tools, in listing order.
pub fn definitions() -> Vec<Tool> {
    vec![
        KeywordSearch::definition(),
        VectorSearch::definition(),
        HybridSearch::definition(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_definitions() {
        let tools = definitions();
        let names: Vec<&str> = tools.iter().map(|t| &*t.name).collect();
        assert_eq!(names, vec!["keyword_search", "vector_search", "hybrid_search"]);

        for tool in &tools {
            assert_eq!(tool.input_schema.get("type"), Some(&json!("object")));
            assert!(tool.input_schema["properties"].get("query").is_some());
        }
    }

    #[test]
    fn test_parse_rejects_missing_query() {
        let err = KeywordSearch::parse(Some(JsonObject::new())).unwrap_err();
        assert!(err.message.contains("keyword_search"));

        let err = VectorSearch::parse(None).unwrap_err();
        assert!(err.message.contains("vector_search"));
    }

    #[test]
    fn test_parse_rejects_wrong_types() {
        let args = json!({"query": "x", "top": "three"});
        let err = KeywordSearch::parse(args.as_object().cloned()).unwrap_err();
        assert_eq!(err.code, rmcp::model::ErrorCode::INVALID_PARAMS);
    }

    #[test]
    fn test_parse_hybrid() {
        let args = json!({"query": "x", "vector_texts": ["a", "b"]});
        let input = HybridSearch::parse(args.as_object().cloned()).unwrap();
        assert_eq!(input.query, "x");
    }
}
