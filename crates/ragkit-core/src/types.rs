//! Domain types shared by the chunker, the loaders and the pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

pub type DocId = String;
pub type NodeId = String;
pub type Meta = BTreeMap<String, String>;

/// A whole source text plus metadata, as produced by a loader.
///
/// - `id`: source identity, usually the file path
/// - `text`: full content
/// - `metadata`: key/value pairs such as `file_name` or `file_size`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub text: String,
    pub metadata: Meta,
}

impl Document {
    pub fn new(id: impl Into<DocId>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into(), metadata: Meta::new() }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A bounded span of a document's text, the unit handed to embedding.
///
/// `start_char_idx`/`end_char_idx` are character offsets into the parent
/// text, end exclusive. `metadata` is shared by every node of the same
/// document. `prev_id`/`next_id` link neighbouring nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub doc_id: DocId,
    pub text: String,
    pub start_char_idx: usize,
    pub end_char_idx: usize,
    pub index: usize,
    pub total: usize,
    pub prev_id: Option<NodeId>,
    pub next_id: Option<NodeId>,
    pub metadata: Arc<Meta>,
}

impl Node {
    pub fn char_len(&self) -> usize {
        self.end_char_idx - self.start_char_idx
    }
}

/// A node returned by a vector search. Higher `score` is better.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredNode {
    pub node: Node,
    pub score: f32,
}
