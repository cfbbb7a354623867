use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Service settings loaded from environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub addr: SocketAddr,
    pub language: String,
    /// Directory reports are written to and downloaded from
    pub report_dir: PathBuf,
    /// Upstream timeout in seconds
    pub timeout: u64,
    pub llm: Option<LlmSettings>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LlmSettings {
    pub base_url: String,
    pub model: String,
    pub fallback_model: Option<String>,
    pub api_key: Option<String>,
}

impl Settings {
    /// Load settings from the process environment, `.env` included
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let addr = var("WIKIHARVEST_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8000".to_string())
            .parse()
            .context("WIKIHARVEST_ADDR must be a socket address")?;

        let timeout = var("WIKIHARVEST_TIMEOUT")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .context("WIKIHARVEST_TIMEOUT must be a number of seconds")?;

        let llm = var("LLM_BASE_URL").map(|base_url| LlmSettings {
            base_url,
            model: var("LLM_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
            fallback_model: var("LLM_FALLBACK_MODEL"),
            api_key: var("LLM_API_KEY"),
        });

        Ok(Self {
            addr,
            language: var("WIKIHARVEST_LANGUAGE").unwrap_or_else(|| "tr".to_string()),
            report_dir: var("WIKIHARVEST_REPORT_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("reports")),
            timeout,
            llm,
        })
    }
}
