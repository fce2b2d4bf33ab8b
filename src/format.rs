//! Markdown rendering of search pages for tool responses.

use std::fmt::Write;

use serde_json::{Map, Value};

use crate::types::{SearchHit, SearchKind, SearchPage};

/// Longest body excerpt per hit, in characters.
pub const MAX_BODY_CHARS: usize = 1000;
/// Upper bound for one rendered response, in characters.
pub const MAX_OUTPUT_CHARS: usize = 24_000;

const UNTITLED: &str = "Unknown";

pub fn no_results(kind: SearchKind) -> String {
    format!("No results found for your query using {kind} Search.")
}

/// Text returned to the caller when a search fails.
pub fn error_text(kind: SearchKind, error: &crate::Error) -> String {
    format!(
        "Error performing {} search: {error}",
        kind.label().to_ascii_lowercase()
    )
}

pub fn render(page: &SearchPage) -> String {
    if page.is_empty() {
        return no_results(page.kind);
    }

    let include_scores = page.applied.as_ref().is_none_or(|a| a.include_scores);
    let select: Vec<&str> = page
        .applied
        .as_ref()
        .and_then(|a| a.select.as_deref())
        .map(|fields| {
            fields
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let mut out = format!("## {} Search Results\n\n", page.kind);
    if let Some(count) = page.count {
        let _ = writeln!(out, "Total matches reported by Azure Search: {count}\n");
    }

    if !page.answers.is_empty() {
        out.push_str("### Answers\n\n");
        for answer in &page.answers {
            let text = answer
                .highlights
                .as_deref()
                .filter(|h| !h.trim().is_empty())
                .unwrap_or(&answer.text);
            let _ = writeln!(out, "- {}", truncate_chars(text.trim(), MAX_BODY_CHARS));
        }
        out.push('\n');
    }

    let mut tail = String::new();
    if let Some(facets) = &page.facets {
        render_facets(&mut tail, facets);
    }
    if let Some(applied) = &page.applied {
        tail.push_str("### Applied search parameters\n\n");
        for (name, value) in applied.entries() {
            let _ = writeln!(tail, "- {name}: {value}");
        }
    }

    let budget = MAX_OUTPUT_CHARS.saturating_sub(tail.chars().count());
    let mut used = out.chars().count();
    let mut shown = 0;
    for hit in &page.hits {
        let block = render_hit(hit, include_scores, &select);
        let len = block.chars().count();
        if used + len > budget && shown > 0 {
            break;
        }
        used += len;
        out.push_str(&block);
        shown += 1;
    }
    if shown < page.hits.len() {
        let _ = writeln!(
            out,
            "_Output truncated: showing {shown} of {} results._\n",
            page.hits.len()
        );
    }

    out.push_str(&tail);

    if out.chars().count() > MAX_OUTPUT_CHARS {
        out = truncate_chars(&out, MAX_OUTPUT_CHARS).to_string();
    }
    out
}

/// One hit block. Selected fields are listed in request order; a hit with
/// neither a title nor a body field lists every field it has.
fn render_hit(hit: &SearchHit, include_scores: bool, select: &[&str]) -> String {
    let mut block = format!("### {}. {}\n", hit.rank, hit.title().unwrap_or(UNTITLED));
    if include_scores {
        let _ = writeln!(block, "Score: {:.2}", hit.score);
        if let Some(reranker) = hit.reranker_score {
            let _ = writeln!(block, "Reranker score: {reranker:.2}");
        }
    }
    block.push('\n');
    if let Some(caption) = &hit.caption {
        let _ = writeln!(block, "> {}\n", truncate_chars(caption, MAX_BODY_CHARS));
    }

    if !select.is_empty() {
        let selected = select
            .iter()
            .filter_map(|name| hit.fields.get(*name).map(|value| (*name, value)));
        render_fields(&mut block, selected);
    } else if let Some(body) = hit.body() {
        let _ = writeln!(block, "{}\n", truncate_chars(body, MAX_BODY_CHARS));
    } else if hit.title().is_none() {
        render_fields(&mut block, hit.fields.iter().map(|(k, v)| (k.as_str(), v)));
    }
    block.push_str("---\n\n");
    block
}

/// `name: value` lines, skipping null and blank values.
fn render_fields<'a>(out: &mut String, fields: impl Iterator<Item = (&'a str, &'a Value)>) {
    let mut wrote = false;
    for (name, value) in fields {
        let text = scalar(value);
        let text = text.trim();
        if value.is_null() || text.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{name}: {}", truncate_chars(text, MAX_BODY_CHARS));
        wrote = true;
    }
    if wrote {
        out.push('\n');
    }
}

fn render_facets(out: &mut String, facets: &Map<String, Value>) {
    out.push_str("### Facets\n\n");
    for (field, buckets) in facets {
        let buckets: Vec<String> = buckets
            .as_array()
            .map(|items| items.iter().map(facet_bucket).collect())
            .unwrap_or_default();
        let _ = writeln!(out, "- {field}: {}", buckets.join(", "));
    }
    out.push('\n');
}

fn facet_bucket(bucket: &Value) -> String {
    let label = match (bucket.get("value"), bucket.get("from"), bucket.get("to")) {
        (Some(value), _, _) => scalar(value),
        (None, from, to) => format!(
            "{}..{}",
            from.map(scalar).unwrap_or_default(),
            to.map(scalar).unwrap_or_default()
        ),
    };
    match bucket.get("count").and_then(Value::as_u64) {
        Some(count) => format!("{label} ({count})"),
        None => label,
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Prefix of `s` with at most `max` characters, never splitting a character.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
