//! One-stop client tying configuration, transport and summarizer together.
//!
//! # Example
//!
//! ```rust,no_run
//! use wikiharvest_core::{SearchOptions, WikiClient, WikiConfig};
//!
//! # async fn run() -> wikiharvest_core::Result<()> {
//! let client = WikiClient::new(WikiConfig::for_language("tr"))?;
//! let hits = client.search(&SearchOptions::new("Ankara").limit(3)).await?;
//! for hit in &hits {
//!     println!("{} ({})", hit.title, hit.page_id);
//! }
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::analysis::Analyzer;
use crate::article::{ArticleContent, ArticleRef, count_words};
use crate::config::WikiConfig;
use crate::explore::Explorer;
use crate::metadata::MetadataAccessor;
use crate::normalize::Normalizer;
use crate::report::{collect_report_entries, render_report, write_report};
use crate::retriever::ContentRetriever;
use crate::search::{SearchHit, SearchOptions, Searcher};
use crate::summarizer::{DisabledSummarizer, Summarizer};
use crate::transport::Transport;
use crate::{HarvestError, Result};

/// Full view of one page.
#[derive(Debug, Clone, Serialize)]
pub struct PageDetails {
    pub page_id: u64,
    pub title: String,
    pub url: String,
    pub categories: Vec<String>,
    pub content: String,
    pub word_count: usize,
}

/// Client for one language edition.
///
/// Cheap to clone: transport and summarizer are shared.
#[derive(Clone)]
pub struct WikiClient {
    config: WikiConfig,
    normalizer: Normalizer,
    transport: Arc<dyn Transport>,
    summarizer: Arc<dyn Summarizer>,
}

impl std::fmt::Debug for WikiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WikiClient").field("config", &self.config).finish_non_exhaustive()
    }
}

impl WikiClient {
    /// Client over HTTP with summaries disabled.
    #[cfg(feature = "fetch")]
    pub fn new(config: WikiConfig) -> Result<Self> {
        let transport = crate::transport::HttpTransport::from_config(&config)?;
        Self::with_parts(config, Arc::new(transport), Arc::new(DisabledSummarizer))
    }

    /// Client over an arbitrary transport and summarizer.
    pub fn with_parts(
        config: WikiConfig,
        transport: Arc<dyn Transport>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Result<Self> {
        let normalizer = Normalizer::new(&config.locale)?;
        Ok(Self { config, normalizer, transport, summarizer })
    }

    /// Replace the summarizer used for enrichment.
    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = summarizer;
        self
    }

    pub fn config(&self) -> &WikiConfig {
        &self.config
    }

    /// Client for another language edition sharing transport and summarizer.
    pub fn for_language(&self, language: &str) -> Result<Self> {
        if language == self.config.language {
            return Ok(self.clone());
        }
        let config = self.config.with_language(language)?;
        Self::with_parts(config, Arc::clone(&self.transport), Arc::clone(&self.summarizer))
    }

    pub fn retriever(&self) -> ContentRetriever<'_> {
        ContentRetriever::new(self.transport.as_ref(), &self.config, &self.normalizer)
    }

    pub fn metadata(&self) -> MetadataAccessor<'_> {
        MetadataAccessor::new(self.transport.as_ref(), &self.config)
    }

    pub fn searcher(&self) -> Searcher<'_> {
        Searcher::new(self.transport.as_ref(), &self.config, &self.normalizer, self.summarizer.as_ref())
    }

    pub fn analyzer(&self) -> Analyzer<'_> {
        Analyzer::new(self.transport.as_ref(), &self.config, &self.normalizer)
    }

    pub fn explorer(&self) -> Explorer<'_> {
        Explorer::new(self.transport.as_ref(), &self.config, &self.normalizer, self.summarizer.as_ref())
    }

    /// Plain text of an article; empty when nothing was found.
    pub async fn fetch_content(&self, article: impl Into<ArticleRef>) -> String {
        self.retriever().fetch(&article.into()).await
    }

    /// Structured content of an article.
    pub async fn retrieve(&self, article: impl Into<ArticleRef>) -> ArticleContent {
        self.retriever().retrieve(&article.into()).await
    }

    /// Search, honoring a language override in the options.
    ///
    /// Fails only when the override is not a valid language code.
    pub async fn search(&self, options: &SearchOptions) -> Result<Vec<SearchHit>> {
        match options.language.as_deref() {
            Some(language) if language != self.config.language => {
                let client = self.for_language(language)?;
                Ok(client.searcher().search(options).await)
            }
            _ => Ok(self.searcher().search(options).await),
        }
    }

    /// Content, categories and canonical identity of a page.
    pub async fn page(&self, page_id: u64) -> Result<PageDetails> {
        let content = self.fetch_content(page_id).await;
        if content.trim().is_empty() {
            return Err(HarvestError::NoContent);
        }

        let metadata = self.metadata();
        let categories = metadata.categories(page_id).await;
        let (title, url) = match metadata.page_info(page_id).await {
            Some(info) => (info.title, info.url),
            None => (String::new(), String::new()),
        };

        Ok(PageDetails { page_id, title, url, categories, word_count: count_words(&content), content })
    }

    /// Collect and render a report for a list of hits.
    pub async fn build_report(&self, term: &str, hits: &[SearchHit]) -> String {
        let entries = collect_report_entries(&self.retriever(), &self.metadata(), hits).await;
        render_report(term, &entries)
    }

    /// Build a report and write it to `path`.
    pub async fn save_report(&self, term: &str, hits: &[SearchHit], path: &Path) -> Result<PathBuf> {
        let report = self.build_report(term, hits).await;
        write_report(path, &report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;
    use serde_json::json;

    fn client(transport: MockTransport) -> WikiClient {
        WikiClient::with_parts(WikiConfig::default(), Arc::new(transport), Arc::new(DisabledSummarizer)).unwrap()
    }

    #[test]
    fn test_for_language_switches_endpoints() {
        let client = client(MockTransport::new());
        let english = client.for_language("en").unwrap();

        assert_eq!(english.config().api_url, "https://en.wikipedia.org/w/api.php");
        assert_eq!(client.config().api_url, "https://tr.wikipedia.org/w/api.php");
        assert!(client.for_language("../etc").is_err());
    }

    #[tokio::test]
    async fn test_search_language_override_hits_other_wiki() {
        let transport = MockTransport::new().on(&[("list", "search")], json!({"query": {"search": []}}));
        let client = client(transport.clone());

        let options = SearchOptions::new("Berlin").language("de").enrich(false);
        client.search(&options).await.unwrap();

        assert_eq!(transport.calls()[0].url, "https://de.wikipedia.org/w/api.php");
    }

    #[tokio::test]
    async fn test_page_without_content_is_no_content() {
        let client = client(MockTransport::new());
        assert!(matches!(client.page(5).await, Err(HarvestError::NoContent)));
    }

    #[tokio::test]
    async fn test_page_details() {
        let transport = MockTransport::new()
            .on(
                &[("prop", "extracts")],
                json!({"query": {"pages": {"5": {"pageid": 5, "title": "Ankara", "extract": "Ankara başkenttir. ".repeat(80)}}}}),
            )
            .on(
                &[("prop", "info")],
                json!({"query": {"pages": {"5": {"title": "Ankara", "fullurl": "https://tr.wikipedia.org/wiki/Ankara"}}}}),
            )
            .on(&[("prop", "categories")], json!({"query": {"pages": {"5": {"categories": [{"title": "Kategori:İller"}]}}}}));
        let client = client(transport);

        let page = client.page(5).await.unwrap();

        assert_eq!(page.title, "Ankara");
        assert_eq!(page.url, "https://tr.wikipedia.org/wiki/Ankara");
        assert_eq!(page.categories, vec!["İller"]);
        assert_eq!(page.word_count, 160);
    }
}
