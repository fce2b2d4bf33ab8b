//! Structured spans for tool calls.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{Level, Span, field, span};

use crate::types::SearchKind;

/// Numbers tool calls so interleaved log lines can be told apart.
#[derive(Debug, Default)]
pub struct SpanContext {
    request_id: AtomicU64,
}

impl SpanContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_request_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Span covering one tool call. `hits` and `is_error` are recorded on completion.
    pub fn tool_call_span(&self, kind: SearchKind) -> Span {
        let request_id = self.next_request_id();
        span!(
            Level::INFO,
            "tool_call",
            tool = kind.tool_name(),
            request_id,
            hits = field::Empty,
            is_error = field::Empty,
        )
    }
}
