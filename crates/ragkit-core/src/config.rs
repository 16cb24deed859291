//! Layered configuration and path helpers.
//!
//! Figment merges serde defaults, `ragkit.toml`, `ragkit.<env>.toml` and
//! `APP_*` environment variables (`__` separates nested keys, so
//! `APP_CHUNKING__CHUNK_SIZE=512` sets `chunking.chunk_size`).

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::chunker::ChunkConfig;
use crate::error::{Error, Result};

pub const DEFAULT_EMBED_MODEL: &str = "local:BAAI/bge-small-en-v1.5";
pub const DEFAULT_LLM_API_BASE: &str = "http://localhost:1234/v1";
pub const DEFAULT_PROMPT_TEMPLATE: &str = "Context information is below.\n\
---------------------\n\
{context_str}\n\
---------------------\n\
Given the context information and not prior knowledge, answer the query.\n\
Query: {query_str}\n\
Answer: ";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub chunking: ChunkConfig,
    pub data: DataSettings,
    pub embedding: EmbeddingSettings,
    pub llm: LlmSettings,
    pub query: QuerySettings,
}

/// Where documents are read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub input_dir: String,
    /// Explicit files; when non-empty, `input_dir` is ignored.
    pub input_files: Vec<String>,
    pub recursive: bool,
    pub required_exts: Vec<String>,
    pub num_files_limit: Option<usize>,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            input_dir: "data".to_string(),
            input_files: Vec::new(),
            recursive: true,
            required_exts: vec!["txt".to_string(), "md".to_string()],
            num_files_limit: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub model: String,
    pub batch_size: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self { model: DEFAULT_EMBED_MODEL.to_string(), batch_size: 32 }
    }
}

/// OpenAI-compatible completion endpoint, e.g. a local LM Studio server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub api_base: String,
    pub api_key: String,
    pub model: Option<String>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self { api_base: DEFAULT_LLM_API_BASE.to_string(), api_key: "not-needed".to_string(), model: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    pub similarity_top_k: usize,
    pub prompt_template: String,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self { similarity_top_k: 2, prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string() }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;
        if self.embedding.batch_size == 0 {
            return Err(Error::InvalidConfig("embedding.batch_size must be positive".into()));
        }
        if self.query.similarity_top_k == 0 {
            return Err(Error::InvalidConfig("query.similarity_top_k must be positive".into()));
        }
        Ok(())
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    /// Loads for the environment named by `RAGKIT_ENV` (default `dev`).
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RAGKIT_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_for_env(&env_name)
    }

    pub fn load_for_env(env_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("ragkit.toml"));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("ragkit.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("ragkit.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("ragkit.test.toml")),
            other => tracing::warn!(env = other, "unknown RAGKIT_ENV, using base config only"),
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        // Parse only. `settings()` validates, after any overrides.
        let config = Self { figment };
        config
            .figment
            .extract::<Settings>()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        Ok(config)
    }

    /// Overrides a single key, e.g. from a command-line flag.
    pub fn with_override<T: Serialize>(self, key: &str, value: T) -> Self {
        Self { figment: self.figment.merge(Serialized::default(key, value)) }
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Extracts and validates the typed settings.
    pub fn settings(&self) -> Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
