//! Sentence-aware chunking of documents into overlapping nodes.
//!
//! Sizes are counted in characters. From the current start the chunker closes
//! a node at the furthest sentence boundary that keeps the node within
//! `chunk_size`; the next node starts `chunk_overlap` characters before that
//! close. When no boundary fits (one sentence longer than the window) the node
//! is cut at exactly `chunk_size` characters.
//!
//! Consequences relied on by callers:
//! - no node is longer than `chunk_size`
//! - consecutive nodes share exactly `chunk_overlap` characters
//! - dropping the first `chunk_overlap` characters of every node but the first
//!   and concatenating gives back the original text

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::sentence::sentence_boundaries;
use crate::types::{Document, Node};

pub const DEFAULT_CHUNK_SIZE: usize = 1024;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self { chunk_size: DEFAULT_CHUNK_SIZE, chunk_overlap: DEFAULT_CHUNK_OVERLAP }
    }
}

impl ChunkConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        let config = Self { chunk_size, chunk_overlap };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be positive".into()));
        }
        if self.chunk_overlap == 0 {
            return Err(Error::InvalidConfig("chunk_overlap must be positive".into()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// A chunker bound to a validated `ChunkConfig`.
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkConfig,
}

impl Chunker {
    pub fn new(config: ChunkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Character ranges of the nodes `text` splits into.
    pub fn spans(&self, text: &str) -> Vec<Range<usize>> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let ChunkConfig { chunk_size: size, chunk_overlap: overlap } = self.config;
        let len = text.chars().count();
        let boundaries = sentence_boundaries(text);

        let mut spans = Vec::new();
        let mut start = 0usize;
        while len - start > size {
            let limit = start + size;
            let fitting = boundaries.partition_point(|&b| b <= limit);
            let end = match fitting.checked_sub(1).map(|i| boundaries[i]) {
                Some(b) if b > start + overlap => b,
                _ => limit,
            };
            spans.push(start..end);
            start = end - overlap;
        }
        spans.push(start..len);
        spans
    }

    pub fn chunk(&self, document: &Document) -> Vec<Node> {
        let spans = self.spans(&document.text);
        if spans.is_empty() {
            tracing::debug!(doc_id = %document.id, "document has no content to chunk");
            return Vec::new();
        }

        let byte_at: Vec<usize> = document
            .text
            .char_indices()
            .map(|(b, _)| b)
            .chain(std::iter::once(document.text.len()))
            .collect();
        let metadata = Arc::new(document.metadata.clone());
        let total = spans.len();
        let node_id = |i: usize| format!("{}:{}", document.id, i);

        let nodes: Vec<Node> = spans
            .into_iter()
            .enumerate()
            .map(|(index, span)| Node {
                id: node_id(index),
                doc_id: document.id.clone(),
                text: document.text[byte_at[span.start]..byte_at[span.end]].to_string(),
                start_char_idx: span.start,
                end_char_idx: span.end,
                index,
                total,
                prev_id: index.checked_sub(1).map(node_id),
                next_id: (index + 1 < total).then(|| node_id(index + 1)),
                metadata: Arc::clone(&metadata),
            })
            .collect();
        tracing::debug!(doc_id = %document.id, nodes = nodes.len(), "chunked document");
        nodes
    }

    /// Chunks documents in parallel; nodes come back grouped in input order.
    pub fn chunk_all(&self, documents: &[Document]) -> Vec<Node> {
        let per_doc: Vec<Vec<Node>> = documents.par_iter().map(|d| self.chunk(d)).collect();
        per_doc.into_iter().flatten().collect()
    }
}

/// Splits one document into nodes. Fails only on an invalid `config`.
pub fn chunk(document: &Document, config: &ChunkConfig) -> Result<Vec<Node>> {
    Ok(Chunker::new(*config)?.chunk(document))
}

pub fn chunk_documents(documents: &[Document], config: &ChunkConfig) -> Result<Vec<Node>> {
    Ok(Chunker::new(*config)?.chunk_all(documents))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(size: usize, overlap: usize) -> Chunker {
        Chunker::new(ChunkConfig { chunk_size: size, chunk_overlap: overlap }).unwrap()
    }

    #[test]
    fn rejects_invalid_configs() {
        for (size, overlap) in [(10, 10), (10, 11), (0, 0), (10, 0), (0, 5)] {
            let err = ChunkConfig::new(size, overlap).unwrap_err();
            assert!(matches!(err, Error::InvalidConfig(_)), "{size}/{overlap} -> {err}");
        }
        assert!(ChunkConfig::new(100, 10).is_ok());
        assert!(ChunkConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_and_blank_text_have_no_spans() {
        let c = chunker(10, 2);
        assert!(c.spans("").is_empty());
        assert!(c.spans(" \n\t  \n").is_empty());
    }

    #[test]
    fn short_text_is_one_span() {
        assert_eq!(chunker(100, 10).spans("Hello world."), vec![0..12]);
        assert_eq!(chunker(12, 3).spans("Hello world."), vec![0..12]);
    }

    #[test]
    fn closes_at_sentence_boundary_and_backs_up_by_overlap() {
        // Sentences end at 10 ("Aaaa bbbb.") and 21 (" Cccc dddd.").
        let text = "Aaaa bbbb. Cccc dddd. Eeee.";
        let spans = chunker(15, 3).spans(text);
        assert_eq!(spans[0], 0..10);
        assert_eq!(spans[1].start, 7);
        assert_eq!(spans[1].end, 21);
        assert_eq!(spans.last().unwrap().end, text.chars().count());
    }

    #[test]
    fn long_sentence_is_hard_split() {
        let text = "a".repeat(25);
        assert_eq!(chunker(10, 2).spans(&text), vec![0..10, 8..18, 16..25]);
    }

    #[test]
    fn boundary_inside_overlap_is_skipped() {
        // The only boundary in the first window sits at 2, not past the overlap.
        let text = "x. bbbbbbbbbbbbbbbbbbbb";
        let spans = chunker(10, 4).spans(text);
        assert_eq!(spans[0], 0..10);
        assert_eq!(spans[1].start, 6);
    }

    #[test]
    fn nodes_link_neighbours_and_share_metadata() {
        let doc = Document::new("doc", "One two. Three four. Five six. Seven eight.")
            .with_metadata("file_name", "doc.txt");
        let nodes = chunker(20, 4).chunk(&doc);
        assert!(nodes.len() > 1);
        assert_eq!(nodes[0].prev_id, None);
        assert_eq!(nodes[0].next_id.as_deref(), Some("doc:1"));
        assert_eq!(nodes.last().unwrap().next_id, None);
        for (i, n) in nodes.iter().enumerate() {
            assert_eq!(n.id, format!("doc:{i}"));
            assert_eq!(n.total, nodes.len());
            assert!(Arc::ptr_eq(&n.metadata, &nodes[0].metadata));
        }
    }

    #[test]
    fn multibyte_text_slices_on_char_offsets() {
        let doc = Document::new("u", "Ünïcödé tëxt hérè. Ånöthér séntèncé hérè.");
        let nodes = chunker(20, 5).chunk(&doc);
        for n in &nodes {
            assert_eq!(n.text.chars().count(), n.char_len());
            assert!(n.char_len() <= 20);
        }
    }

    #[test]
    fn chunk_all_keeps_document_order() {
        let docs: Vec<Document> = (0..8)
            .map(|i| Document::new(format!("d{i}"), "Alpha beta. Gamma delta. Epsilon zeta.".repeat(3)))
            .collect();
        let nodes = chunker(30, 5).chunk_all(&docs);
        let order: Vec<&str> = nodes.iter().map(|n| n.doc_id.as_str()).collect();
        let mut sorted = order.clone();
        sorted.sort_by_key(|id| id[1..].parse::<usize>().unwrap());
        assert_eq!(order, sorted);
    }
}
