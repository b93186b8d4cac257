use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub metadata: MetadataConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub transcode: TranscodeConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetadataConfig {
    /// API key for the metadata provider.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_region")]
    pub region: String,
}

fn default_language() -> String {
    "fr".to_string()
}
fn default_region() -> String {
    "fr".to_string()
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            language: default_language(),
            region: default_region(),
        }
    }
}

/// Which cache variant backs the metadata client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// In-process map, for tests and short-lived processes.
    #[default]
    Memory,
    /// Shared Redis store with content-aware TTLs.
    Redis,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackend,

    #[serde(default = "default_redis_addr")]
    pub redis_addr: String,

    #[serde(default)]
    pub redis_password: String,
}

fn default_redis_addr() -> String {
    "127.0.0.1:6379".to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            redis_addr: default_redis_addr(),
            redis_password: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub endpoint: String,

    #[serde(default)]
    pub region: String,

    #[serde(default)]
    pub bucket: String,

    #[serde(default)]
    pub access_key: String,

    #[serde(default)]
    pub secret_key: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscodeConfig {
    /// Intro clip prepended to 16:9 sources.
    #[serde(default)]
    pub intro_path: PathBuf,

    /// Intro clip prepended to sources wider than 1.8:1.
    #[serde(default)]
    pub intro_path_21x9: PathBuf,

    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,

    #[serde(default = "default_segment_seconds")]
    pub segment_seconds: u32,

    #[serde(default = "default_scale")]
    pub scale: String,

    #[serde(default = "default_scale_21x9")]
    pub scale_21x9: String,
}

fn default_output_root() -> PathBuf {
    PathBuf::from("./media")
}
fn default_segment_seconds() -> u32 {
    10
}
fn default_scale() -> String {
    "1280:720".to_string()
}
fn default_scale_21x9() -> String {
    "1920:816".to_string()
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            intro_path: PathBuf::new(),
            intro_path_21x9: PathBuf::new(),
            output_root: default_output_root(),
            segment_seconds: default_segment_seconds(),
            scale: default_scale(),
            scale_21x9: default_scale_21x9(),
        }
    }
}
