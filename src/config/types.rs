use photoreel_common::{DetailLevel, FailurePolicy, SafetyLevel};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub run: RunConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// REST endpoint of the photo API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key sent with every request
    #[serde(default)]
    pub api_key: String,

    /// Client-side request budget
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.flickr.com/services/rest/".to_string()
}
fn default_requests_per_second() -> u32 {
    3
}
fn default_timeout() -> u64 {
    30
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            requests_per_second: default_requests_per_second(),
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
    Memory,
    #[default]
    File,
    None,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackendKind,

    /// Directory for the file backend (`~` is expanded)
    #[serde(default = "default_cache_dir")]
    pub directory: PathBuf,

    /// Entry lifetime in seconds; 0 disables caching
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,

    /// Upper bound on entries held by the memory backend
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("~/.cache/photoreel")
}
fn default_ttl() -> u64 {
    3600
}
fn default_max_entries() -> usize {
    10_000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackendKind::default(),
            directory: default_cache_dir(),
            ttl_secs: default_ttl(),
            max_entries: default_max_entries(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default)]
    pub detail_level: DetailLevel,

    /// First page to fetch (1-based)
    #[serde(default = "default_start_page")]
    pub start_page: u32,

    /// Stop after this many processed photos
    #[serde(default)]
    pub limit: Option<u64>,

    /// Build events without handing them to subscribers
    #[serde(default)]
    pub dry_run: bool,

    /// Evict every cache entry before the run starts
    #[serde(default)]
    pub clear_cache: bool,

    /// Content filter for search runs
    #[serde(default)]
    pub safe_search: SafetyLevel,

    /// Overrides the per-mode enrichment failure policy
    #[serde(default)]
    pub on_enrichment_error: Option<FailurePolicy>,
}

fn default_page_size() -> u32 {
    100
}
fn default_start_page() -> u32 {
    1
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            detail_level: DetailLevel::default(),
            start_page: default_start_page(),
            limit: None,
            dry_run: false,
            clear_cache: false,
            safe_search: SafetyLevel::default(),
            on_enrichment_error: None,
        }
    }
}
