use anyhow::Result;
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub generator: GeneratorConfig,
    pub storage: StorageConfig,
    pub retention: RetentionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    /// Base URL of the external content-generation service.
    pub base_url: String,
    /// Hard ceiling on one generation call, in seconds. Background
    /// execution that exceeds it fails the job with a timeout.
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory generated artifacts are written to.
    pub artifact_dir: String,
    /// Directory uploaded source files are staged in until consumed.
    pub upload_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetentionConfig {
    /// Terminal jobs older than this are swept from the registry.
    pub job_ttl_secs: u64,
    /// Artifacts older than this are swept from disk.
    pub artifact_ttl_secs: u64,
    /// How often the retention sweep runs.
    pub sweep_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()?,
            },
            generator: GeneratorConfig {
                base_url: env::var("GENERATOR_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:8001".to_string()),
                request_timeout_secs: env::var("GENERATION_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "300".to_string())
                    .parse()?,
            },
            storage: StorageConfig {
                artifact_dir: env::var("ARTIFACT_DIR")
                    .unwrap_or_else(|_| "generated_files".to_string()),
                upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
            },
            retention: RetentionConfig {
                job_ttl_secs: env::var("JOB_TTL_SECS")
                    .unwrap_or_else(|_| "86400".to_string())
                    .parse()?,
                artifact_ttl_secs: env::var("ARTIFACT_TTL_SECS")
                    .unwrap_or_else(|_| "604800".to_string())
                    .parse()?,
                sweep_interval_secs: env::var("SWEEP_INTERVAL_SECS")
                    .unwrap_or_else(|_| "3600".to_string())
                    .parse()?,
            },
        })
    }
}
