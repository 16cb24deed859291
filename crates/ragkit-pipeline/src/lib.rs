//! ragkit-pipeline
//!
//! Wires a loader, the chunker, an embedder, a vector index and a language
//! model into the ingest/query flow. Every collaborator is injected, and all
//! tunables come from `Settings`.

pub mod prompt;

use anyhow::Result;
use ragkit_core::chunker::Chunker;
use ragkit_core::config::Settings;
use ragkit_core::error::Error;
use ragkit_core::traits::{DocumentLoader, Embedder, LanguageModel, VectorIndexer};
use ragkit_core::types::{Document, Node, ScoredNode};

pub use prompt::build_prompt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub documents: usize,
    pub nodes: usize,
}

/// An answer plus the nodes it was grounded on, best match first.
#[derive(Debug, Clone)]
pub struct Response {
    pub answer: String,
    pub source_nodes: Vec<ScoredNode>,
}

pub struct Pipeline<L, V> where L: DocumentLoader, V: VectorIndexer {
    settings: Settings,
    chunker: Chunker,
    loader: L,
    index: V,
    embedder: Box<dyn Embedder>,
    llm: Box<dyn LanguageModel>,
}

impl<L, V> Pipeline<L, V> where L: DocumentLoader, V: VectorIndexer {
    pub fn new(settings: Settings, loader: L, index: V, embedder: Box<dyn Embedder>, llm: Box<dyn LanguageModel>) -> Result<Self> {
        settings.validate()?;
        let chunker = Chunker::new(settings.chunking)?;
        if embedder.model_id() != settings.embedding.model {
            tracing::warn!(configured = %settings.embedding.model, actual = embedder.model_id(), "embedder differs from configured model");
        }
        Ok(Self { settings, chunker, loader, index, embedder, llm })
    }

    pub fn settings(&self) -> &Settings { &self.settings }

    /// Loads every document, then chunks, embeds and indexes them.
    pub fn ingest(&self) -> Result<IngestStats> {
        let documents = self.loader.load()?;
        let nodes = self.index_documents(&documents)?;
        let stats = IngestStats { documents: documents.len(), nodes };
        tracing::info!(documents = stats.documents, nodes = stats.nodes, "ingest complete");
        Ok(stats)
    }

    /// Chunks, embeds and indexes `documents`; returns the node count.
    pub fn index_documents(&self, documents: &[Document]) -> Result<usize> {
        let nodes = self.chunker.chunk_all(documents);
        if nodes.is_empty() {
            tracing::info!("no nodes to index");
            return Ok(0);
        }
        let embeddings = self.embed_nodes(&nodes)?;
        self.index.index(&nodes, &embeddings)?;
        Ok(nodes.len())
    }

    /// Embeds node texts in batches of `embedding.batch_size`.
    pub fn embed_nodes(&self, nodes: &[Node]) -> Result<Vec<Vec<f32>>> {
        let dim = self.embedder.dim();
        let mut embeddings = Vec::with_capacity(nodes.len());
        for batch in nodes.chunks(self.settings.embedding.batch_size) {
            let texts: Vec<String> = batch.iter().map(|n| n.text.clone()).collect();
            let vectors = self.embedder.embed_batch(&texts)?;
            if vectors.len() != batch.len() {
                return Err(Error::Operation(format!("embedder returned {} vectors for {} texts", vectors.len(), batch.len())).into());
            }
            if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
                return Err(Error::Operation(format!("embedding has dimension {}, expected {}", bad.len(), dim)).into());
            }
            embeddings.extend(vectors);
            tracing::debug!(embedded = embeddings.len(), total = nodes.len(), "embedded batch");
        }
        Ok(embeddings)
    }

    pub fn retrieve(&self, question: &str) -> Result<Vec<ScoredNode>> {
        let mut vectors = self.embedder.embed_batch(&[question.to_string()])?;
        if vectors.len() != 1 {
            return Err(Error::Operation(format!("embedder returned {} vectors for the query", vectors.len())).into());
        }
        let q_vec = vectors.remove(0);
        let dim = self.embedder.dim();
        if q_vec.len() != dim {
            return Err(Error::Operation(format!("query embedding has dimension {}, expected {}", q_vec.len(), dim)).into());
        }
        let mut hits = self.index.search_vec(&q_vec, self.settings.query.similarity_top_k)?;
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(self.settings.query.similarity_top_k);
        Ok(hits)
    }

    pub fn query(&self, question: &str) -> Result<Response> {
        let source_nodes = self.retrieve(question)?;
        let prompt = build_prompt(&self.settings.query.prompt_template, &source_nodes, question);
        tracing::debug!(sources = source_nodes.len(), prompt_chars = prompt.len(), "querying language model");
        let answer = self.llm.complete(&prompt)?;
        Ok(Response { answer, source_nodes })
    }
}
