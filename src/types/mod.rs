//! Request options and result types shared by the client, renderer and tools.

mod hybrid;
mod search;

pub use hybrid::{AppliedParameters, HybridOptions};
pub use search::{SearchHit, SearchKind, SearchMode, SearchPage, SemanticAnswer};
