//! Hybrid query options and the parameters actually sent.

use serde::Serialize;

use super::SearchMode;

/// Optional knobs for `hybrid_search`.
///
/// Unset values fall back to [`HybridDefaults`](crate::HybridDefaults) and
/// then to built-in defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HybridOptions {
    /// Descriptions to embed, one vector query each. Empty means the query text.
    pub vector_texts: Vec<String>,
    pub select: Vec<String>,
    /// `simple`, `full` or `semantic`.
    pub query_type: Option<String>,
    pub query_language: Option<String>,
    pub query_rewrites: Option<String>,
    pub semantic_configuration: Option<String>,
    /// e.g. `extractive|highlight-true`
    pub captions: Option<String>,
    /// e.g. `extractive|count-3`
    pub answers: Option<String>,
    pub search_mode: Option<String>,
    pub search_fields: Vec<String>,
    pub vector_fields: Vec<String>,
    pub vector_ks: Vec<i64>,
    pub vector_weights: Vec<f64>,
    pub vector_default_k: Option<i64>,
    pub vector_default_weight: Option<f64>,
    /// OData filter expression.
    pub filter: Option<String>,
    pub order_by: Vec<String>,
    pub facets: Vec<String>,
    /// `preFilter` or `postFilter`.
    pub vector_filter_mode: Option<String>,
    pub skip: Option<i64>,
    pub count: bool,
    /// Render scores in the tool output. Defaults to true.
    pub include_scores: Option<bool>,
}

/// Resolved hybrid parameters, reported back with the results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedParameters {
    pub top: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    pub search_mode: SearchMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_rewrites: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_configuration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_fields: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select: Option<String>,
    pub vector_fields: String,
    pub vector_default_k: u32,
    pub vector_default_weight: f64,
    pub vector_ks: Vec<u32>,
    pub vector_weights: Vec<f64>,
    pub count: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answers: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub facets: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_filter_mode: Option<String>,
    pub include_scores: bool,
}

impl AppliedParameters {
    /// Name/value pairs for display, skipping anything unset.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let mut out = vec![("top", self.top.to_string())];
        let optional = [
            ("skip", self.skip.map(|s| s.to_string())),
            ("search_mode", Some(self.search_mode.to_string())),
            ("query_type", self.query_type.clone()),
            ("query_language", self.query_language.clone()),
            ("query_rewrites", self.query_rewrites.clone()),
            ("semantic_configuration", self.semantic_configuration.clone()),
            ("search_fields", self.search_fields.clone()),
            ("select", self.select.clone()),
            ("vector_fields", Some(self.vector_fields.clone())),
            ("vector_default_k", Some(self.vector_default_k.to_string())),
            ("vector_default_weight", Some(self.vector_default_weight.to_string())),
            ("vector_ks", Some(join_display(&self.vector_ks))),
            ("vector_weights", Some(join_display(&self.vector_weights))),
            ("count", Some(self.count.to_string())),
            ("captions", self.captions.clone()),
            ("answers", self.answers.clone()),
            ("filter", self.filter.clone()),
            ("order_by", self.order_by.clone()),
            ("facets", (!self.facets.is_empty()).then(|| self.facets.join("; "))),
            ("vector_filter_mode", self.vector_filter_mode.clone()),
            ("include_scores", Some(self.include_scores.to_string())),
        ];
        out.extend(
            optional
                .into_iter()
                .filter_map(|(name, value)| value.map(|v| (name, v))),
        );
        out
    }
}

fn join_display<T: ToString>(values: &[T]) -> String {
    let items: Vec<String> = values.iter().map(ToString::to_string).collect();
    format!("[{}]", items.join(", "))
}
