//! ragkit-loader
//!
//! Filesystem document loading. `DirectoryReader` turns a directory tree or an
//! explicit file list into `Document`s with file metadata, ready for chunking.

pub mod reader;

pub use reader::DirectoryReader;
