use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use ragkit_core::config::{resolve_with_base, DataSettings};
use ragkit_core::error::{Error, Result};
use ragkit_core::traits::DocumentLoader;
use ragkit_core::types::Document;

#[derive(Debug, Clone)]
enum Source {
    Dir(PathBuf),
    Files(Vec<PathBuf>),
}

/// Reads text files into `Document`s.
///
/// Directory sources are walked (recursively by default), hidden entries are
/// skipped, files are filtered by extension and sorted by path. Explicit file
/// lists are read in the given order without extension filtering.
#[derive(Debug, Clone)]
pub struct DirectoryReader {
    source: Source,
    recursive: bool,
    required_exts: Vec<String>,
    num_files_limit: Option<usize>,
}

impl DirectoryReader {
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self::with_source(Source::Dir(input_dir.into()))
    }

    pub fn from_files<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::with_source(Source::Files(files.into_iter().map(Into::into).collect()))
    }

    /// Builds a reader from `[data]` settings; relative paths resolve against `base`.
    pub fn from_settings(data: &DataSettings, base: &Path) -> Self {
        let reader = if data.input_files.is_empty() {
            Self::new(resolve_with_base(base, &data.input_dir))
        } else {
            Self::from_files(data.input_files.iter().map(|f| resolve_with_base(base, f)))
        };
        reader
            .recursive(data.recursive)
            .required_exts(data.required_exts.iter().cloned())
            .num_files_limit(data.num_files_limit)
    }

    fn with_source(source: Source) -> Self {
        Self {
            source,
            recursive: true,
            required_exts: vec!["txt".to_string(), "md".to_string()],
            num_files_limit: None,
        }
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Extensions to keep when walking a directory, with or without a leading dot.
    /// An empty list keeps every file.
    pub fn required_exts<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.required_exts = exts
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    pub fn num_files_limit(mut self, limit: Option<usize>) -> Self {
        self.num_files_limit = limit;
        self
    }

    /// The files `load_data` would read, in reading order.
    pub fn list_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = match &self.source {
            Source::Dir(dir) => self.walk_dir(dir)?,
            Source::Files(files) => {
                if let Some(missing) = files.iter().find(|f| !f.is_file()) {
                    return Err(Error::NotFound(format!("input file {}", missing.display())));
                }
                files.clone()
            }
        };
        if let Some(limit) = self.num_files_limit {
            if files.len() > limit {
                tracing::info!(limit, found = files.len(), "limiting input files");
                files.truncate(limit);
            }
        }
        Ok(files)
    }

    pub fn load_data(&self) -> Result<Vec<Document>> {
        let files = self.list_files()?;
        let mut documents = Vec::with_capacity(files.len());
        for (i, path) in files.iter().enumerate() {
            tracing::debug!(file = %path.display(), "loading file {}/{}", i + 1, files.len());
            documents.push(read_document(path)?);
        }
        tracing::info!(documents = documents.len(), "loaded documents");
        Ok(documents)
    }

    fn walk_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(Error::NotFound(format!("input directory {}", dir.display())));
        }
        let walker = WalkDir::new(dir).max_depth(if self.recursive { usize::MAX } else { 1 });
        let mut files = Vec::new();
        for entry in walker.into_iter().filter_entry(|e| e.depth() == 0 || !is_hidden(e)) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            if entry.file_type().is_file() && self.has_required_ext(entry.path()) {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }

    fn has_required_ext(&self, path: &Path) -> bool {
        if self.required_exts.is_empty() {
            return true;
        }
        let ext = path.extension().and_then(|s| s.to_str()).map(str::to_ascii_lowercase);
        ext.is_some_and(|ext| self.required_exts.contains(&ext))
    }
}

impl DocumentLoader for DirectoryReader {
    fn load(&self) -> anyhow::Result<Vec<Document>> {
        Ok(self.load_data()?)
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(|name| name.starts_with('.'))
}

fn read_document(path: &Path) -> Result<Document> {
    let bytes = fs::read(path)?;
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(file = %path.display(), "file is not valid UTF-8, decoding lossily");
            String::from_utf8_lossy(err.as_bytes()).into_owned()
        }
    };
    let meta = fs::metadata(path)?;
    let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let mut document = Document::new(path.to_string_lossy(), text)
        .with_metadata("file_path", path.to_string_lossy())
        .with_metadata("file_name", file_name)
        .with_metadata("file_type", file_type(path))
        .with_metadata("file_size", meta.len().to_string());
    if let Ok(modified) = meta.modified() {
        let modified: DateTime<Utc> = modified.into();
        document = document.with_metadata("last_modified_date", modified.format("%Y-%m-%d").to_string());
    }
    Ok(document)
}

fn file_type(path: &Path) -> &'static str {
    match path.extension().and_then(|s| s.to_str()).map(str::to_ascii_lowercase).as_deref() {
        Some("txt") => "text/plain",
        Some("md" | "markdown") => "text/markdown",
        Some("csv") => "text/csv",
        Some("json") => "application/json",
        Some("html" | "htm") => "text/html",
        _ => "application/octet-stream",
    }
}
