//! Search orchestration: query, per-hit enrichment, filtering.
//!
//! Hits are processed one at a time in upstream order. Any failure while
//! enriching a hit drops that hit only; survivors keep their relative order.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::article::{ArticleRef, truncate_chars};
use crate::config::WikiConfig;
use crate::metadata::MetadataAccessor;
use crate::normalize::Normalizer;
use crate::retriever::ContentRetriever;
use crate::summarizer::{Summarizer, guide_summary};
use crate::transport::{Params, Transport};
use crate::wire::{self, QueryResponse};
use crate::{HarvestError, Result};

/// Result ordering requested from upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Relevance,
    /// Newest pages first.
    Date,
}

impl FromStr for SortMode {
    type Err = HarvestError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "relevance" => Ok(SortMode::Relevance),
            "date" => Ok(SortMode::Date),
            other => Err(HarvestError::ConfigError(format!("Unsupported sort mode: {}", other))),
        }
    }
}

/// Parameters of one search.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub query: String,
    pub limit: usize,
    pub offset: usize,
    /// Language edition to search instead of the configured one.
    pub language: Option<String>,
    pub min_word_count: usize,
    /// Keep only hits in at least one of these categories (case-insensitive).
    pub categories: Vec<String>,
    pub sort: SortMode,
    pub enrich: bool,
}

impl SearchOptions {
    /// Enriched relevance search returning up to 10 hits.
    pub fn new(query: &str) -> Self {
        Self {
            query: query.to_string(),
            limit: 10,
            offset: 0,
            language: None,
            min_word_count: 0,
            categories: Vec::new(),
            sort: SortMode::Relevance,
            enrich: true,
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn language(mut self, language: &str) -> Self {
        self.language = Some(language.to_string());
        self
    }

    pub fn min_word_count(mut self, words: usize) -> Self {
        self.min_word_count = words;
        self
    }

    pub fn categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    pub fn sort(mut self, sort: SortMode) -> Self {
        self.sort = sort;
        self
    }

    pub fn enrich(mut self, enrich: bool) -> Self {
        self.enrich = enrich;
        self
    }
}

/// Derived fields attached to an enriched hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enrichment {
    pub word_count: usize,
    /// First characters of the article text, `...` appended when cut.
    pub content_summary: String,
    pub categories: Vec<String>,
    /// External summary, or the failure placeholder.
    pub ai_guide_summary: String,
}

/// One search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    #[serde(rename = "pageid")]
    pub page_id: u64,
    pub title: String,
    pub snippet: String,
    #[serde(flatten)]
    pub enrichment: Option<Enrichment>,
}

/// Case-insensitive equality between any wanted category and any page category
pub fn matches_category(wanted: &[String], categories: &[String]) -> bool {
    wanted.iter().any(|want| {
        let want = want.to_lowercase();
        categories.iter().any(|category| category.to_lowercase() == want)
    })
}

/// Runs searches against one language edition.
#[derive(Clone, Copy)]
pub struct Searcher<'a> {
    transport: &'a dyn Transport,
    config: &'a WikiConfig,
    normalizer: &'a Normalizer,
    summarizer: &'a dyn Summarizer,
}

impl<'a> Searcher<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        config: &'a WikiConfig,
        normalizer: &'a Normalizer,
        summarizer: &'a dyn Summarizer,
    ) -> Self {
        Self { transport, config, normalizer, summarizer }
    }

    /// Search and optionally enrich. An upstream failure of the search
    /// request itself yields an empty list.
    pub async fn search(&self, options: &SearchOptions) -> Vec<SearchHit> {
        let hits = match self.try_raw_search(options).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(query = %options.query, error = %e, "search request failed");
                return Vec::new();
            }
        };

        if !options.enrich {
            return hits;
        }

        let mut enriched = Vec::with_capacity(hits.len());
        for hit in hits {
            if let Some(hit) = self.enrich(hit, options).await {
                enriched.push(hit);
            }
        }
        enriched
    }

    /// Upstream hits in upstream order, without enrichment.
    pub async fn try_raw_search(&self, options: &SearchOptions) -> Result<Vec<SearchHit>> {
        let mut params: Params = vec![
            ("action", "query".to_string()),
            ("format", "json".to_string()),
            ("list", "search".to_string()),
            ("srsearch", options.query.clone()),
            ("srlimit", options.limit.to_string()),
            ("sroffset", options.offset.to_string()),
            ("utf8", "1".to_string()),
        ];
        if options.sort == SortMode::Date {
            params.push(("srsort", "create_timestamp_desc".to_string()));
        }

        let body = self.transport.get_json(&self.config.api_url, &params).await?;
        let response: QueryResponse = wire::decode(body)?;

        Ok(response
            .query
            .search
            .into_iter()
            .map(|entry| SearchHit { page_id: entry.pageid, title: entry.title, snippet: entry.snippet, enrichment: None })
            .collect())
    }

    async fn enrich(&self, mut hit: SearchHit, options: &SearchOptions) -> Option<SearchHit> {
        let retriever = ContentRetriever::new(self.transport, self.config, self.normalizer);
        let content = retriever.retrieve(&ArticleRef::Id(hit.page_id)).await;
        let word_count = content.word_count();
        if word_count < options.min_word_count {
            debug!(page_id = hit.page_id, word_count, min = options.min_word_count, "below minimum word count");
            return None;
        }

        let metadata = MetadataAccessor::new(self.transport, self.config);
        let categories = match metadata.try_categories(hit.page_id).await {
            Ok(categories) => categories,
            Err(e) => {
                warn!(page_id = hit.page_id, error = %e, "category lookup failed, dropping hit");
                return None;
            }
        };

        if !options.categories.is_empty() && !matches_category(&options.categories, &categories) {
            debug!(page_id = hit.page_id, "category filter rejected hit");
            return None;
        }

        let content_summary = truncate_chars(&content.text, self.config.summary_chars);
        let ai_guide_summary = guide_summary(self.summarizer, &hit.title, &content_summary, &categories).await;

        hit.enrichment = Some(Enrichment { word_count, content_summary, categories, ai_guide_summary });
        Some(hit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarizer::DisabledSummarizer;
    use crate::testing::MockTransport;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("relevance", SortMode::Relevance)]
    #[case("DATE", SortMode::Date)]
    fn test_sort_mode_from_str(#[case] input: &str, #[case] expected: SortMode) {
        assert_eq!(input.parse::<SortMode>().unwrap(), expected);
    }

    #[test]
    fn test_sort_mode_rejects_unknown() {
        assert!("popularity".parse::<SortMode>().is_err());
    }

    #[rstest]
    #[case(&["türkiye'deki iller"], &["Türkiye'deki iller"], true)]
    #[case(&["BAŞKENTLER"], &["İller", "Başkentler"], true)]
    #[case(&["iller"], &["Türkiye'deki iller"], false)]
    #[case(&["x"], &[], false)]
    fn test_matches_category(#[case] wanted: &[&str], #[case] categories: &[&str], #[case] expected: bool) {
        let wanted: Vec<String> = wanted.iter().map(|s| s.to_string()).collect();
        let categories: Vec<String> = categories.iter().map(|s| s.to_string()).collect();
        assert_eq!(matches_category(&wanted, &categories), expected);
    }

    #[tokio::test]
    async fn test_raw_search_params_and_order() {
        let transport = MockTransport::new().on(
            &[("list", "search")],
            json!({"query": {"search": [
                {"pageid": 2, "title": "B", "snippet": "<span>b</span>"},
                {"pageid": 1, "title": "A"}
            ]}}),
        );
        let config = WikiConfig::default();
        let normalizer = Normalizer::default();
        let searcher = Searcher::new(&transport, &config, &normalizer, &DisabledSummarizer);

        let options = SearchOptions::new("harf").limit(2).offset(4).sort(SortMode::Date).enrich(false);
        let hits = searcher.search(&options).await;

        assert_eq!(hits.iter().map(|h| h.page_id).collect::<Vec<_>>(), vec![2, 1]);
        assert!(hits.iter().all(|h| h.enrichment.is_none()));
        assert_eq!(hits[1].snippet, "");

        let call = &transport.calls()[0];
        assert_eq!(call.param("srlimit"), Some("2"));
        assert_eq!(call.param("sroffset"), Some("4"));
        assert_eq!(call.param("srsort"), Some("create_timestamp_desc"));
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_search_failure_is_empty() {
        let transport = MockTransport::new().fail_on(&[("list", "search")], "offline");
        let config = WikiConfig::default();
        let normalizer = Normalizer::default();
        let searcher = Searcher::new(&transport, &config, &normalizer, &DisabledSummarizer);

        assert!(searcher.search(&SearchOptions::new("Ankara")).await.is_empty());
    }

    #[test]
    fn test_hit_serialization_flattens_enrichment() {
        let bare = SearchHit { page_id: 1, title: "A".into(), snippet: String::new(), enrichment: None };
        let rich = SearchHit {
            enrichment: Some(Enrichment {
                word_count: 3,
                content_summary: "a b c".into(),
                categories: vec!["X".into()],
                ai_guide_summary: "özet".into(),
            }),
            ..bare.clone()
        };

        let bare = serde_json::to_value(&bare).unwrap();
        let rich = serde_json::to_value(&rich).unwrap();

        assert_eq!(bare, json!({"pageid": 1, "title": "A", "snippet": ""}));
        assert_eq!(rich["word_count"], 3);
        assert_eq!(rich["ai_guide_summary"], "özet");
        assert_eq!(rich["categories"], json!(["X"]));
    }
}
