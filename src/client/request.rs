//! Request bodies for `POST /indexes/{index}/docs/search`.

use serde::Serialize;

use crate::config::HybridDefaults;
use crate::types::{AppliedParameters, HybridOptions, SearchMode};
use crate::{Error, Result};

use super::{DEFAULT_VECTOR_FIELD, MAX_TOP, VECTOR_K};

const QUERY_TYPES: &[&str] = &["simple", "full", "semantic"];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    pub top: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_mode: Option<SearchMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_fields: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_rewrites: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_configuration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answers: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(rename = "orderby", skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub facets: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub vector_queries: Vec<VectorQuery>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_filter_mode: Option<String>,
}

/// A vectorizable text query; the service embeds `text` itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorQuery {
    pub kind: &'static str,
    pub text: String,
    pub k: u32,
    pub fields: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_rewrites: Option<String>,
}

impl VectorQuery {
    fn text(text: impl Into<String>, k: u32, fields: impl Into<String>) -> Self {
        Self {
            kind: "text",
            text: text.into(),
            k,
            fields: fields.into(),
            weight: None,
            query_rewrites: None,
        }
    }
}

/// Clamp a caller-supplied result count: absent or non-positive becomes
/// `default`, anything above [`MAX_TOP`] becomes `MAX_TOP`.
pub fn resolve_top(top: Option<i64>, default: u32) -> u32 {
    match top {
        Some(n) if n > 0 => n.min(i64::from(MAX_TOP)) as u32,
        _ => default,
    }
}

pub fn keyword(text: &str, top: u32) -> SearchRequest {
    SearchRequest {
        search: Some(text.to_string()),
        top,
        ..Default::default()
    }
}

pub fn vector(text: &str, top: u32, fields: &str) -> SearchRequest {
    SearchRequest {
        top,
        vector_queries: vec![VectorQuery::text(text, VECTOR_K.max(top), fields)],
        ..Default::default()
    }
}

/// Whether `api_version` accepts `queryRewrites`.
pub fn supports_query_rewrites(api_version: &str) -> bool {
    api_version.trim().to_ascii_lowercase().ends_with("-preview")
}

/// Merge request options with server defaults into one request body.
///
/// Fails before any network traffic when an option is out of range or
/// not accepted by `api_version`.
pub fn hybrid(
    text: &str,
    top: u32,
    options: &HybridOptions,
    defaults: &HybridDefaults,
    api_version: &str,
) -> Result<(SearchRequest, AppliedParameters)> {
    let mut search_mode = match non_blank(&options.search_mode) {
        Some(raw) => raw.parse::<SearchMode>().map_err(Error::InvalidRequest)?,
        None => defaults.search_mode,
    };

    let query_type = non_blank(&options.query_type)
        .or(defaults.query_type.as_deref())
        .map(str::to_ascii_lowercase);
    if let Some(ref qt) = query_type
        && !QUERY_TYPES.contains(&qt.as_str())
    {
        return Err(Error::invalid_request(format!(
            "query_type must be one of {}, got '{qt}'",
            QUERY_TYPES.join(", ")
        )));
    }
    let semantic = query_type.as_deref() == Some("semantic");

    let semantic_configuration = owned(non_blank(&options.semantic_configuration))
        .or_else(|| defaults.semantic_configuration.clone());
    if semantic && semantic_configuration.is_none() {
        return Err(Error::invalid_request(
            "Semantic configuration name is required for semantic queries. Provide \
             `semantic_configuration` or set AZURE_SEARCH_SEMANTIC_CONFIGURATION.",
        ));
    }

    let query_language =
        owned(non_blank(&options.query_language)).or_else(|| defaults.query_language.clone());
    if semantic && query_language.is_none() {
        return Err(Error::invalid_request(
            "Query language is required for semantic queries. Provide `query_language` or set \
             AZURE_SEARCH_QUERY_LANGUAGE.",
        ));
    }

    let rewrites_allowed = supports_query_rewrites(api_version);
    let requested_rewrites = owned(non_blank(&options.query_rewrites));
    if requested_rewrites.is_some() && !rewrites_allowed {
        return Err(Error::invalid_request(format!(
            "query_rewrites requires a preview api-version, got '{api_version}'. Set \
             AZURE_SEARCH_API_VERSION to a -preview version."
        )));
    }
    let query_rewrites = match (requested_rewrites, &defaults.query_rewrites) {
        (Some(requested), _) => Some(requested),
        (None, Some(default)) if semantic && rewrites_allowed => Some(default.clone()),
        (None, Some(_)) if semantic => {
            tracing::warn!(
                api_version,
                "Ignoring AZURE_SEARCH_QUERY_REWRITES: it requires a preview api-version"
            );
            None
        }
        (None, _) => None,
    };
    // Query rewriting only applies to `any` matching.
    if semantic && query_rewrites.is_some() {
        search_mode = SearchMode::Any;
    }

    let vector_default_k = match options.vector_default_k {
        Some(k) => positive_k(k, "vector_default_k")?,
        None => defaults.vector_k,
    };
    let vector_default_weight = match options.vector_default_weight {
        Some(w) => positive_weight(w, "vector_default_weight")?,
        None => defaults.vector_weight,
    };

    let mut vector_texts: Vec<String> = options
        .vector_texts
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    if vector_texts.is_empty() {
        if text.trim().is_empty() {
            return Err(Error::invalid_request(
                "hybrid search needs `query` text or at least one entry in `vector_texts`",
            ));
        }
        vector_texts.push(text.to_string());
    }

    let vector_ks = vector_texts
        .iter()
        .enumerate()
        .map(|(i, _)| match pick(&options.vector_ks, i) {
            Some(k) => positive_k(k, "vector_ks"),
            None => Ok(vector_default_k),
        })
        .collect::<Result<Vec<u32>>>()?;
    let vector_weights = vector_texts
        .iter()
        .enumerate()
        .map(|(i, _)| match pick(&options.vector_weights, i) {
            Some(w) => positive_weight(w, "vector_weights"),
            None => Ok(vector_default_weight),
        })
        .collect::<Result<Vec<f64>>>()?;

    let vector_fields = if options.vector_fields.is_empty() {
        defaults.vector_field_selector()
    } else {
        options.vector_fields.join(",")
    };
    let vector_fields = if vector_fields.is_empty() {
        DEFAULT_VECTOR_FIELD.to_string()
    } else {
        vector_fields
    };

    let vector_queries = vector_texts
        .iter()
        .zip(vector_ks.iter().zip(&vector_weights))
        .map(|(vector_text, (k, weight))| {
            let mut query = VectorQuery::text(vector_text.as_str(), *k, vector_fields.as_str());
            query.weight = Some(*weight);
            if semantic && vector_text.eq_ignore_ascii_case(text.trim()) {
                query.query_rewrites = query_rewrites.clone();
            }
            query
        })
        .collect();

    let search_fields = join_fields(&options.search_fields, &defaults.search_fields);
    let select = join_fields(&options.select, &defaults.select_fields);
    let order_by = (!options.order_by.is_empty()).then(|| options.order_by.join(","));
    let skip = match options.skip {
        Some(s) if s < 0 => {
            return Err(Error::invalid_request(format!(
                "skip must not be negative, got {s}"
            )));
        }
        Some(0) | None => None,
        Some(s) => Some(u32::try_from(s).map_err(|_| {
            Error::invalid_request(format!("skip is too large: {s}"))
        })?),
    };

    let request = SearchRequest {
        search: Some(text.to_string()),
        top,
        skip,
        count: options.count.then_some(true),
        search_mode: Some(search_mode),
        search_fields: search_fields.clone(),
        select: select.clone(),
        query_type: query_type.clone(),
        query_language: query_language.clone().filter(|_| semantic || options.query_language.is_some()),
        query_rewrites: query_rewrites.clone(),
        semantic_configuration: semantic_configuration.clone(),
        captions: owned(non_blank(&options.captions)),
        answers: owned(non_blank(&options.answers)),
        filter: owned(non_blank(&options.filter)),
        order_by: order_by.clone(),
        facets: options.facets.clone(),
        vector_queries,
        vector_filter_mode: owned(non_blank(&options.vector_filter_mode)),
    };

    let applied = AppliedParameters {
        top,
        skip,
        search_mode,
        query_type,
        query_language: request.query_language.clone(),
        query_rewrites,
        semantic_configuration,
        search_fields,
        select,
        vector_fields,
        vector_default_k,
        vector_default_weight,
        vector_ks,
        vector_weights,
        count: options.count,
        captions: request.captions.clone(),
        answers: request.answers.clone(),
        filter: request.filter.clone(),
        order_by,
        facets: request.facets.clone(),
        vector_filter_mode: request.vector_filter_mode.clone(),
        include_scores: options.include_scores.unwrap_or(true),
    };

    Ok((request, applied))
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn owned(value: Option<&str>) -> Option<String> {
    value.map(str::to_string)
}

/// The i-th value, else the last one supplied.
fn pick<T: Copy>(values: &[T], index: usize) -> Option<T> {
    values.get(index).or_else(|| values.last()).copied()
}

fn positive_k(k: i64, name: &str) -> Result<u32> {
    if k < 1 {
        return Err(Error::invalid_request(format!(
            "{name} must be at least 1, got {k}"
        )));
    }
    Ok(u32::try_from(k).unwrap_or(u32::MAX))
}

fn positive_weight(weight: f64, name: &str) -> Result<f64> {
    if !weight.is_finite() || weight <= 0.0 {
        return Err(Error::invalid_request(format!(
            "{name} must be greater than 0, got {weight}"
        )));
    }
    Ok(weight)
}

fn join_fields(requested: &[String], fallback: &[String]) -> Option<String> {
    let fields = if requested.is_empty() {
        fallback
    } else {
        requested
    };
    (!fields.is_empty()).then(|| fields.join(","))
}
