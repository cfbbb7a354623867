use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use wikiharvest_core::{
    ChatSettings, ChatSummarizer, DisabledSummarizer, HttpTransport, LocaleLoader, Summarizer, WikiClient, WikiConfig,
};

use crate::error::{ApiError, ApiResult};
use crate::settings::Settings;

/// Shared by every request; read-only after startup.
#[derive(Debug)]
pub struct AppState {
    pub client: WikiClient,
    pub report_dir: PathBuf,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(client: WikiClient, report_dir: PathBuf) -> SharedState {
        Arc::new(Self { client, report_dir })
    }

    /// Build the HTTP-backed client described by the settings.
    pub fn from_settings(settings: &Settings) -> Result<SharedState> {
        let mut config = WikiConfig::builder()
            .language(&settings.language)
            .timeout(settings.timeout)
            .build()
            .context("Invalid client configuration")?;
        config.locale = LocaleLoader::default().load(&settings.language).context("Failed to load locale profile")?;

        let summarizer: Arc<dyn Summarizer> = match &settings.llm {
            Some(llm) => {
                tracing::info!(base_url = %llm.base_url, model = %llm.model, "guide summaries enabled");
                Arc::new(
                    ChatSummarizer::new(ChatSettings {
                        base_url: llm.base_url.clone(),
                        model: llm.model.clone(),
                        fallback_model: llm.fallback_model.clone(),
                        api_key: llm.api_key.clone(),
                        timeout: 60,
                    })
                    .context("Failed to create summarizer")?,
                )
            }
            None => Arc::new(DisabledSummarizer),
        };

        let transport = HttpTransport::from_config(&config).context("Failed to create HTTP client")?;
        let client = WikiClient::with_parts(config, Arc::new(transport), summarizer).context("Failed to create client")?;

        std::fs::create_dir_all(&settings.report_dir)
            .with_context(|| format!("Failed to create report directory {}", settings.report_dir.display()))?;

        Ok(Self::new(client, settings.report_dir.clone()))
    }

    /// Client for a requested language, the configured one by default.
    pub fn client_for(&self, language: Option<&str>) -> ApiResult<WikiClient> {
        match language {
            Some(language) => Ok(self.client.for_language(language)?),
            None => Ok(self.client.clone()),
        }
    }

    /// Path of a report inside the report directory.
    pub fn report_path(&self, file_name: &str) -> ApiResult<PathBuf> {
        if !is_plain_file_name(file_name) {
            return Err(ApiError::unprocessable(format!("Invalid file name: {}", file_name)));
        }
        Ok(self.report_dir.join(file_name))
    }
}

/// A single path component that stays inside its directory.
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\', '\0'])
        && Path::new(name).file_name().is_some_and(|file| file == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_file_names() {
        assert!(is_plain_file_name("wikipedia_results.txt"));
        assert!(is_plain_file_name("topic_Ankara_20250101_120000.txt"));

        assert!(!is_plain_file_name(""));
        assert!(!is_plain_file_name(".."));
        assert!(!is_plain_file_name(".env"));
        assert!(!is_plain_file_name("../secret.txt"));
        assert!(!is_plain_file_name("a/b.txt"));
        assert!(!is_plain_file_name("a\\b.txt"));
    }
}
