//! Capabilities the pipeline consumes but does not implement.
//!
//! Loading, embedding, vector storage and text generation live behind these
//! traits so the pipeline can be wired to any backend at construction time.

use crate::types::{Document, Node, ScoredNode};

pub trait DocumentLoader: Send + Sync {
    fn load(&self) -> anyhow::Result<Vec<Document>>;
}

pub trait Embedder: Send + Sync {
    /// Stable identifier for the model (e.g. `local:BAAI/bge-small-en-v1.5`).
    fn model_id(&self) -> &str;
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

pub trait VectorIndexer: Send + Sync {
    fn index(&self, nodes: &[Node], embeddings: &[Vec<f32>]) -> anyhow::Result<()>;
    fn search_vec(&self, query_vec: &[f32], k: usize) -> anyhow::Result<Vec<ScoredNode>>;
}

pub trait LanguageModel: Send + Sync {
    fn complete(&self, prompt: &str) -> anyhow::Result<String>;
}
