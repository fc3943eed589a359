use std::path::PathBuf;

use serde::Deserialize;

use crate::service::DEFAULT_TOP_K;

/// Server configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Address to bind
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding movie_database.bin and similarity_matrix.bin
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,

    /// Number of recommendations per request
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            artifact_dir: default_artifact_dir(),
            top_k: default_top_k(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables (and `.env`, if present)
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<ServerConfig>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
