#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod chunker;
pub mod config;
pub mod error;
pub mod sentence;
pub mod traits;
pub mod types;

pub use chunker::{chunk, chunk_documents, ChunkConfig, Chunker};
pub use error::{Error, Result};
pub use types::{Document, Node, ScoredNode};
