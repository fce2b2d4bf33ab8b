//! Parsing of search responses into [`SearchPage`].

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::Result;
use crate::types::{SearchHit, SearchKind, SearchPage, SemanticAnswer};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "@odata.count")]
    count: Option<u64>,
    #[serde(rename = "@search.facets")]
    facets: Option<Map<String, Value>>,
    #[serde(rename = "@search.answers")]
    answers: Option<Vec<SemanticAnswer>>,
    #[serde(default)]
    value: Vec<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct Caption {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    highlights: Option<String>,
}

/// Build a page from a raw response body, preserving the service's order.
pub fn parse_page(kind: SearchKind, body: &[u8]) -> Result<SearchPage> {
    let response: SearchResponse = serde_json::from_slice(body)?;

    let hits = response
        .value
        .into_iter()
        .enumerate()
        .map(|(i, document)| into_hit(i + 1, document))
        .collect();

    Ok(SearchPage {
        kind,
        hits,
        count: response.count,
        facets: response.facets,
        answers: response.answers.unwrap_or_default(),
        applied: None,
    })
}

fn into_hit(rank: usize, mut document: Map<String, Value>) -> SearchHit {
    let score = document
        .get("@search.score")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    let reranker_score = document
        .get("@search.rerankerScore")
        .and_then(Value::as_f64);
    let caption = document
        .remove("@search.captions")
        .and_then(|raw| serde_json::from_value::<Vec<Caption>>(raw).ok())
        .and_then(|captions| captions.into_iter().next())
        .and_then(|c| {
            [c.highlights, c.text]
                .into_iter()
                .flatten()
                .map(|s| s.trim().to_string())
                .find(|s| !s.is_empty())
        });

    document.retain(|key, _| !key.starts_with('@'));

    SearchHit {
        rank,
        score,
        reranker_score,
        caption,
        fields: document,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bytes(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_parse_ranks_in_service_order() {
        let body = bytes(json!({
            "value": [
                {"@search.score": 3.2, "title": "First", "chunk": "a"},
                {"@search.score": 2.1, "title": "Second", "chunk": "b"},
                {"@search.score": 0.4, "title": "Third", "chunk": "c"}
            ]
        }));
        let page = parse_page(SearchKind::Keyword, &body).unwrap();
        assert_eq!(page.len(), 3);
        let ranks: Vec<usize> = page.hits.iter().map(|h| h.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        assert_eq!(page.hits[0].title(), Some("First"));
        assert!(!page.hits[0].fields.contains_key("@search.score"));
        assert_eq!(page.count, None);
    }

    #[test]
    fn test_parse_semantic_extras() {
        let body = bytes(json!({
            "@odata.count": 42,
            "@search.facets": {"Category": [{"value": "Budget", "count": 3}]},
            "@search.answers": [{"key": "1", "text": "An answer", "score": 0.9}],
            "value": [{
                "@search.score": 0.03,
                "@search.rerankerScore": 2.75,
                "@search.captions": [{"text": "plain caption", "highlights": ""}],
                "title": "Doc"
            }]
        }));
        let page = parse_page(SearchKind::Hybrid, &body).unwrap();
        assert_eq!(page.count, Some(42));
        assert!(page.facets.as_ref().unwrap().contains_key("Category"));
        assert_eq!(page.answers[0].text, "An answer");

        let hit = &page.hits[0];
        assert_eq!(hit.reranker_score, Some(2.75));
        assert_eq!(hit.caption.as_deref(), Some("plain caption"));
        assert_eq!(hit.fields.len(), 1);
    }

    #[test]
    fn test_parse_empty_and_missing_value() {
        let page = parse_page(SearchKind::Vector, br#"{"value": []}"#).unwrap();
        assert!(page.is_empty());
        let page = parse_page(SearchKind::Vector, b"{}").unwrap();
        assert!(page.is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed_body() {
        let err = parse_page(SearchKind::Keyword, b"<html>").unwrap_err();
        assert!(matches!(err, crate::Error::Json(_)));
    }
}
