//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env
//! vars. Typed sections cover the embedding endpoint, the vector index, the
//! matching defaults and the corpus sync; every field has a default so a
//! missing config file still yields a runnable setup.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Remote embedding endpoint settings (OpenAI-protocol `/embeddings`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub dimension: usize,
    pub normalize: bool,
    pub timeout_secs: u64,
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001/v1".to_string(),
            api_key: None,
            model: "bge-large-zh-v1.5".to_string(),
            dimension: 1024,
            normalize: true,
            timeout_secs: 30,
            batch_size: 32,
        }
    }
}

/// Vector/document index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub url: String,
    pub index_name: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".to_string(),
            index_name: "intent_recognition".to_string(),
            username: None,
            password: None,
            timeout_secs: 30,
        }
    }
}

/// Defaults for the matching API surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub max_results: usize,
    pub min_score: f32,
    /// Raw candidates fetched per requested result before re-scoring.
    pub overfetch_factor: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            max_results: 5,
            min_score: 0.3,
            overfetch_factor: 3,
        }
    }
}

/// Corpus sync derivation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub keyword_limit: usize,
    /// When set, keyword derivation also samples the underlying csv file
    /// for marker-column values.
    pub scan_data_files: bool,
    pub scan_row_limit: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            keyword_limit: 20,
            scan_data_files: false,
            scan_row_limit: 200,
        }
    }
}

/// Everything the engine and its clients need, extracted in one pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub embedding: EmbeddingConfig,
    pub index: IndexConfig,
    pub matching: MatchingConfig,
    pub sync: SyncConfig,
}

impl EngineConfig {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(EngineConfig::default()))
            .merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Expand env vars first
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    // Expand ~ at start
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after
/// expansion. If `p` is absolute, it's returned as-is; otherwise
/// `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() {
        p
    } else {
        base.join(p)
    }
}
