//! Search kinds and result records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::AppliedParameters;

/// Field names checked, in order, for a document's display title.
const TITLE_FIELDS: &[&str] = &["title", "Title", "name", "Name", "FullName", "fullName"];
/// Field names checked, in order, for a document's body text.
const BODY_FIELDS: &[&str] = &["content", "chunk", "Chunk"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchKind {
    Keyword,
    Vector,
    Hybrid,
}

impl SearchKind {
    pub const ALL: [SearchKind; 3] = [SearchKind::Keyword, SearchKind::Vector, SearchKind::Hybrid];

    /// Human-readable label, e.g. "Keyword".
    pub fn label(self) -> &'static str {
        match self {
            SearchKind::Keyword => "Keyword",
            SearchKind::Vector => "Vector",
            SearchKind::Hybrid => "Hybrid",
        }
    }

    pub fn tool_name(self) -> &'static str {
        match self {
            SearchKind::Keyword => "keyword_search",
            SearchKind::Vector => "vector_search",
            SearchKind::Hybrid => "hybrid_search",
        }
    }

    pub fn from_tool_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tool_name() == name)
    }
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lexical match strategy: `all` requires every term, `any` matches on any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Any,
    #[default]
    All,
}

impl SearchMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchMode::Any => "any",
            SearchMode::All => "all",
        }
    }
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" => Ok(SearchMode::Any),
            "all" => Ok(SearchMode::All),
            other => Err(format!("search mode must be 'any' or 'all', got '{other}'")),
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ranked document from the search service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    /// 1-based position in the service's ordering.
    pub rank: usize,
    /// `@search.score`
    pub score: f64,
    /// `@search.rerankerScore`, present for semantic queries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reranker_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Document fields, without `@search.*` annotations.
    pub fields: Map<String, Value>,
}

impl SearchHit {
    pub fn title(&self) -> Option<&str> {
        first_text(&self.fields, TITLE_FIELDS)
    }

    pub fn body(&self) -> Option<&str> {
        first_text(&self.fields, BODY_FIELDS)
    }
}

fn first_text<'a>(fields: &'a Map<String, Value>, names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .filter_map(|name| fields.get(*name).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// Extractive answer returned for semantic queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticAnswer {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub highlights: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}

/// Result of one search call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPage {
    pub kind: SearchKind,
    pub hits: Vec<SearchHit>,
    /// `@odata.count`, only when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facets: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub answers: Vec<SemanticAnswer>,
    /// Resolved hybrid parameters, echoed back to the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied: Option<AppliedParameters>,
}

impl SearchPage {
    pub fn empty(kind: SearchKind) -> Self {
        Self {
            kind,
            hits: Vec::new(),
            count: None,
            facets: None,
            answers: Vec::new(),
            applied: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }
}
