//! Tool argument types.
//!
//! List-valued arguments are lenient: an array, a single value, or a string
//! holding comma/newline separated items (or a JSON array) are all accepted.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::config::split_list;
use crate::types::HybridOptions;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct KeywordSearchInput {
    /// The search query text.
    pub query: String,
    /// Maximum number of results to return (default: 5).
    #[serde(default)]
    pub top: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct VectorSearchInput {
    /// Natural-language text; the index's vectorizer embeds it.
    pub query: String,
    /// Maximum number of results to return (default: 5).
    #[serde(default)]
    pub top: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct HybridSearchInput {
    /// Lexical search expression (simple syntax: phrases, `+`, `-`, OR).
    /// May be omitted for vector-only queries when `vector_texts` is given.
    #[serde(alias = "search", default)]
    pub query: String,
    /// Maximum number of results to return (default: 20).
    #[serde(default)]
    pub top: Option<i64>,
    /// Semantic descriptions for vector search, one vector query each.
    /// Defaults to the query text.
    #[serde(default)]
    pub vector_texts: Option<ListArg>,
    /// Fields to include in the response.
    #[serde(default)]
    pub select: Option<ListArg>,
    /// `simple`, `full` or `semantic`.
    #[serde(default)]
    pub query_type: Option<String>,
    /// Language for semantic ranking, e.g. `en-us`.
    #[serde(default)]
    pub query_language: Option<String>,
    /// Query rewriting for semantic queries, e.g. `generative|count-5`.
    #[serde(default)]
    pub query_rewrites: Option<String>,
    /// Semantic configuration name. Required for semantic queries unless
    /// AZURE_SEARCH_SEMANTIC_CONFIGURATION is set.
    #[serde(default)]
    pub semantic_configuration: Option<String>,
    /// Captions behaviour, e.g. `extractive|highlight-true`.
    #[serde(default)]
    pub captions: Option<String>,
    /// Answers behaviour, e.g. `extractive|count-3`.
    #[serde(default)]
    pub answers: Option<String>,
    /// `all` requires every term, `any` matches on any term.
    #[serde(default)]
    pub search_mode: Option<String>,
    /// Fields targeted by the lexical query.
    #[serde(default)]
    pub search_fields: Option<ListArg>,
    /// Vector fields to compare against (default: `text_vector`).
    #[serde(default)]
    pub vector_fields: Option<ListArg>,
    /// Per-vector nearest-neighbour counts. The last value is reused.
    #[serde(default)]
    pub vector_ks: Option<ListArg>,
    /// Per-vector weights (> 0). The last value is reused.
    #[serde(default)]
    pub vector_weights: Option<ListArg>,
    /// Fallback `k` when per-vector values are omitted.
    #[serde(default)]
    pub vector_default_k: Option<i64>,
    /// Fallback weight when per-vector values are omitted.
    #[serde(default)]
    pub vector_default_weight: Option<f64>,
    /// OData filter expression.
    #[serde(default)]
    pub filter: Option<String>,
    /// Sort expressions, e.g. `Rating desc`.
    #[serde(default)]
    pub order_by: Option<ListArg>,
    /// Facet expressions such as `Category,count:5`. In a string, separate
    /// expressions with newlines or semicolons.
    #[serde(default)]
    pub facets: Option<ListArg>,
    /// `preFilter` or `postFilter`.
    #[serde(default)]
    pub vector_filter_mode: Option<String>,
    /// Number of results to skip.
    #[serde(default)]
    pub skip: Option<i64>,
    /// Request the total match count.
    #[serde(default)]
    pub count: bool,
    /// Show scores in the output (default: true).
    #[serde(default)]
    pub include_scores: Option<bool>,
}

impl HybridSearchInput {
    /// Normalize lenient arguments into typed options.
    pub fn into_options(self) -> Result<(String, Option<i64>, HybridOptions), String> {
        let options = HybridOptions {
            vector_texts: strings(self.vector_texts),
            select: strings(self.select),
            query_type: self.query_type,
            query_language: self.query_language,
            query_rewrites: self.query_rewrites,
            semantic_configuration: self.semantic_configuration,
            captions: self.captions,
            answers: self.answers,
            search_mode: self.search_mode,
            search_fields: strings(self.search_fields),
            vector_fields: strings(self.vector_fields),
            vector_ks: integers(self.vector_ks, "vector_ks")?,
            vector_weights: floats(self.vector_weights, "vector_weights")?,
            vector_default_k: self.vector_default_k,
            vector_default_weight: self.vector_default_weight,
            filter: self.filter,
            order_by: strings(self.order_by),
            facets: facet_list(self.facets),
            vector_filter_mode: self.vector_filter_mode,
            skip: self.skip,
            count: self.count,
            include_scores: self.include_scores,
        };
        Ok((self.query, self.top, options))
    }
}

/// A list argument: an array, or one value.
#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ListArg {
    Many(Vec<Scalar>),
    One(Scalar),
}

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Text(s) => s.trim().to_string(),
        }
    }
}

/// Flatten to items, splitting strings with `split`.
fn items(arg: Option<ListArg>, split: fn(&str) -> Vec<String>) -> Vec<Scalar> {
    match arg {
        None => Vec::new(),
        Some(ListArg::Many(items)) => items
            .into_iter()
            .filter(|item| !matches!(item, Scalar::Text(s) if s.trim().is_empty()))
            .collect(),
        Some(ListArg::One(Scalar::Text(text))) => {
            split(&text).into_iter().map(Scalar::Text).collect()
        }
        Some(ListArg::One(value)) => vec![value],
    }
}

pub fn strings(arg: Option<ListArg>) -> Vec<String> {
    items(arg, split_list)
        .into_iter()
        .map(Scalar::into_text)
        .collect()
}

pub fn integers(arg: Option<ListArg>, name: &str) -> Result<Vec<i64>, String> {
    items(arg, split_list)
        .into_iter()
        .map(|item| match item {
            Scalar::Int(i) => Ok(i),
            Scalar::Float(f) if f.fract() == 0.0 => Ok(f as i64),
            Scalar::Text(ref s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("{name} must contain integers, got '{s}'")),
            Scalar::Float(f) => Err(format!("{name} must contain integers, got {f}")),
        })
        .collect()
}

pub fn floats(arg: Option<ListArg>, name: &str) -> Result<Vec<f64>, String> {
    items(arg, split_list)
        .into_iter()
        .map(|item| match item {
            Scalar::Int(i) => Ok(i as f64),
            Scalar::Float(f) => Ok(f),
            Scalar::Text(ref s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("{name} must contain numbers, got '{s}'")),
        })
        .collect()
}

/// Facet expressions contain commas, so strings split on newlines and `;`.
fn facet_list(arg: Option<ListArg>) -> Vec<String> {
    fn split_facets(raw: &str) -> Vec<String> {
        let trimmed = raw.trim();
        if trimmed.starts_with('[') {
            return split_list(trimmed);
        }
        trimmed
            .split(['\n', ';'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    items(arg, split_facets)
        .into_iter()
        .map(Scalar::into_text)
        .collect()
}
