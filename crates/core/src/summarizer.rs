//! External natural-language summaries for enriched search hits.
//!
//! The model is reached through the [`Summarizer`] seam. Search enrichment
//! calls [`guide_summary`], which never fails: any error turns into a
//! placeholder sentence stored in place of the summary.

use async_trait::async_trait;

use crate::{HarvestError, Result};

/// Prefix of the text stored when no summary could be produced.
pub const SUMMARY_FAILURE_PREFIX: &str = "AI rehber özeti üretilemedi";

/// Produces a short descriptive paragraph about an article.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, title: &str, summary: &str, categories: &[String]) -> Result<String>;
}

/// Summary paragraph, or the failure placeholder carrying the error text.
pub async fn guide_summary(summarizer: &dyn Summarizer, title: &str, summary: &str, categories: &[String]) -> String {
    match summarizer.summarize(title, summary, categories).await {
        Ok(paragraph) => paragraph,
        Err(e) => {
            tracing::warn!(title = %title, error = %e, "summarizer failed");
            format!("{}: {}", SUMMARY_FAILURE_PREFIX, e)
        }
    }
}

/// Prompt asking for a single plain paragraph of five to eight sentences.
pub fn guide_prompt(title: &str, summary: &str, categories: &[String]) -> String {
    let mut prompt = format!(
        "Aşağıdaki Wikipedia bilgilerini kullanarak {title} konusunu kısaca tanıtan sade ve bilgilendirici bir metin yaz.\n\
         Başlık: {title}\n\
         Özet: {summary}\n"
    );
    if !categories.is_empty() {
        prompt.push_str(&format!("İlgili Kategoriler: {}\n", categories.join(", ")));
    }
    prompt.push_str(
        "\nMetin bir mobil uygulama ekranında gösterilecek.\n\
         Tarihçesinden ve yakınında görülmeye değer yerlerden kısaca bahset.\n\
         Satır sonu veya markdown işareti kullanma; metin tek parça düz bir paragraf olsun.\n\
         En az 5, en fazla 8 cümle yaz.\n\
         Tarafsız, anlaşılır ve doğrudan bilgi veren bir dil kullan.",
    );
    prompt
}

/// Summarizer used when no model is configured; always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSummarizer;

#[async_trait]
impl Summarizer for DisabledSummarizer {
    async fn summarize(&self, _title: &str, _summary: &str, _categories: &[String]) -> Result<String> {
        Err(HarvestError::Summarizer("no language model configured".to_string()))
    }
}

/// Connection settings for an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    /// Base URL, e.g. `http://localhost:1234/v1`.
    pub base_url: String,
    pub model: String,
    /// Tried once when the primary model fails.
    pub fallback_model: Option<String>,
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout: u64,
}

#[cfg(feature = "fetch")]
pub use chat::ChatSummarizer;

#[cfg(feature = "fetch")]
mod chat {
    use std::time::Duration;

    use async_trait::async_trait;
    use serde::Serialize;
    use serde_json::Value;

    use super::{ChatSettings, Summarizer, guide_prompt};
    use crate::{HarvestError, Result};

    #[derive(Serialize)]
    struct Message<'a> {
        role: &'a str,
        content: &'a str,
    }

    /// [`Summarizer`] backed by a chat-completions endpoint.
    pub struct ChatSummarizer {
        client: reqwest::Client,
        settings: ChatSettings,
    }

    impl ChatSummarizer {
        pub fn new(settings: ChatSettings) -> Result<Self> {
            let client = reqwest::Client::builder().timeout(Duration::from_secs(settings.timeout)).build()?;
            Ok(Self { client, settings })
        }

        /// Chat completions endpoint resolved from the base URL
        pub fn endpoint(&self) -> String {
            let base = self.settings.base_url.trim_end_matches('/');
            if base.ends_with("/chat/completions") {
                base.to_string()
            } else if base.ends_with("/v1") {
                format!("{}/chat/completions", base)
            } else {
                format!("{}/v1/chat/completions", base)
            }
        }

        async fn complete(&self, model: &str, prompt: &str) -> Result<String> {
            let messages = [Message { role: "user", content: prompt }];
            let body = serde_json::json!({
                "model": model,
                "messages": messages,
                "temperature": 0.3,
            });

            let mut request = self.client.post(self.endpoint()).json(&body);
            if let Some(key) = &self.settings.api_key {
                request = request.bearer_auth(key);
            }

            let response = request.send().await.map_err(|e| {
                if e.is_timeout() {
                    HarvestError::Timeout { timeout: self.settings.timeout }
                } else {
                    HarvestError::HttpError(e)
                }
            })?;

            let status = response.status();
            if !status.is_success() {
                return Err(HarvestError::Summarizer(format!("model {} returned status {}", model, status.as_u16())));
            }

            let json: Value = serde_json::from_str(&response.text().await?)?;
            let content = json["choices"]
                .get(0)
                .and_then(|choice| choice["message"]["content"].as_str())
                .map(str::trim)
                .unwrap_or("");

            if content.is_empty() {
                return Err(HarvestError::Summarizer(format!("model {} returned no content", model)));
            }
            Ok(content.to_string())
        }
    }

    #[async_trait]
    impl Summarizer for ChatSummarizer {
        async fn summarize(&self, title: &str, summary: &str, categories: &[String]) -> Result<String> {
            let prompt = guide_prompt(title, summary, categories);

            match self.complete(&self.settings.model, &prompt).await {
                Ok(paragraph) => Ok(paragraph),
                Err(e) => match &self.settings.fallback_model {
                    Some(fallback) => {
                        tracing::debug!(model = %self.settings.model, error = %e, "primary model failed, trying fallback");
                        self.complete(fallback, &prompt).await
                    }
                    None => Err(e),
                },
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn summarizer(base_url: &str) -> ChatSummarizer {
            ChatSummarizer::new(ChatSettings {
                base_url: base_url.to_string(),
                model: "primary".to_string(),
                fallback_model: None,
                api_key: None,
                timeout: 5,
            })
            .unwrap()
        }

        #[test]
        fn test_endpoint_resolution() {
            assert_eq!(summarizer("http://localhost:1234/v1").endpoint(), "http://localhost:1234/v1/chat/completions");
            assert_eq!(summarizer("http://localhost:1234/").endpoint(), "http://localhost:1234/v1/chat/completions");
            assert_eq!(
                summarizer("https://api.example.com/v1/chat/completions").endpoint(),
                "https://api.example.com/v1/chat/completions"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticSummarizer;

    #[tokio::test]
    async fn test_guide_summary_passes_reply_through() {
        let summarizer = StaticSummarizer::new("Ankara, Türkiye'nin başkentidir.");
        let text = guide_summary(&summarizer, "Ankara", "özet", &[]).await;

        assert_eq!(text, "Ankara, Türkiye'nin başkentidir.");
        assert_eq!(summarizer.titles(), vec!["Ankara"]);
    }

    #[tokio::test]
    async fn test_guide_summary_placeholder_on_failure() {
        let text = guide_summary(&DisabledSummarizer, "Ankara", "özet", &[]).await;
        assert!(text.starts_with("AI rehber özeti üretilemedi: "));
        assert!(text.contains("no language model configured"));
    }

    #[test]
    fn test_prompt_mentions_categories_only_when_present() {
        let with = guide_prompt("Ankara", "Başkent.", &["İller".to_string(), "Başkentler".to_string()]);
        let without = guide_prompt("Ankara", "Başkent.", &[]);

        assert!(with.contains("İlgili Kategoriler: İller, Başkentler"));
        assert!(!without.contains("İlgili Kategoriler"));
        assert!(without.contains("Başlık: Ankara"));
    }
}
