//! Exploration built on top of search and metadata: related pages through a
//! shared category, advanced query syntax, and multi-level topic research.

use serde::Serialize;
use tracing::debug;

use crate::article::ArticleRef;
use crate::config::WikiConfig;
use crate::metadata::MetadataAccessor;
use crate::normalize::Normalizer;
use crate::retriever::ContentRetriever;
use crate::search::{SearchHit, SearchOptions, Searcher};
use crate::summarizer::Summarizer;
use crate::transport::Transport;
use crate::{HarvestError, Result};

/// Categories kept per main page in topic research.
pub const TOPIC_CATEGORY_LIMIT: usize = 5;

/// Outbound links requested per main page.
pub const TOPIC_LINK_REQUEST: usize = 10;

/// Outbound links followed per main page.
pub const TOPIC_LINKS_FOLLOWED: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedPage {
    pub title: String,
    pub page_id: u64,
    pub url: String,
}

/// Advanced search parameters; empty strings count as absent.
#[derive(Debug, Clone, Default)]
pub struct AdvancedSearch {
    pub query: String,
    pub exact_phrase: Option<String>,
    pub exclude_words: Option<String>,
    pub date_start: Option<String>,
    pub date_end: Option<String>,
    /// Case-insensitive substring matched against hit categories.
    pub category: Option<String>,
    pub min_word_count: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdvancedSearchResult {
    /// Query actually sent upstream.
    pub query: String,
    pub original_query: String,
    pub hits: Vec<SearchHit>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MainPage {
    pub title: String,
    pub page_id: u64,
    pub url: String,
    pub categories: Vec<String>,
    /// First paragraph of the content.
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedTopic {
    pub title: String,
    pub page_id: u64,
    pub url: String,
    pub summary: String,
    /// Title of the main page the link was found on.
    pub main_topic: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopicResearch {
    pub topic: String,
    pub main_pages: Vec<MainPage>,
    pub related_topics: Vec<RelatedTopic>,
    /// Every hit visited, main pages first, for the report.
    #[serde(skip)]
    pub hits: Vec<SearchHit>,
}

impl TopicResearch {
    /// Search term printed in the report header
    pub fn report_term(&self) -> String {
        format!("Konu Araştırması: {}", self.topic)
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Compose `query "phrase" -w1 -w2 start/end` from the optional parts.
pub fn build_advanced_query(
    query: &str,
    exact_phrase: Option<&str>,
    exclude_words: Option<&str>,
    date_start: Option<&str>,
    date_end: Option<&str>,
) -> String {
    let mut built = query.to_string();

    if let Some(phrase) = exact_phrase.filter(|p| !p.is_empty()) {
        built.push_str(&format!(" \"{}\"", phrase));
    }

    if let Some(words) = exclude_words {
        for word in words.split_whitespace() {
            built.push_str(&format!(" -{}", word));
        }
    }

    let start = date_start.unwrap_or_default();
    let end = date_end.unwrap_or_default();
    if !start.is_empty() || !end.is_empty() {
        built.push_str(&format!(" {}/{}", start, end));
    }

    built
}

/// Runs exploration operations against one language edition.
#[derive(Clone, Copy)]
pub struct Explorer<'a> {
    transport: &'a dyn Transport,
    config: &'a WikiConfig,
    normalizer: &'a Normalizer,
    summarizer: &'a dyn Summarizer,
}

impl<'a> Explorer<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        config: &'a WikiConfig,
        normalizer: &'a Normalizer,
        summarizer: &'a dyn Summarizer,
    ) -> Self {
        Self { transport, config, normalizer, summarizer }
    }

    fn metadata(&self) -> MetadataAccessor<'a> {
        MetadataAccessor::new(self.transport, self.config)
    }

    fn retriever(&self) -> ContentRetriever<'a> {
        ContentRetriever::new(self.transport, self.config, self.normalizer)
    }

    fn searcher(&self) -> Searcher<'a> {
        Searcher::new(self.transport, self.config, self.normalizer, self.summarizer)
    }

    /// Pages sharing the first category of a page, the page itself excluded.
    pub async fn related_pages(&self, page_id: u64, limit: usize) -> Vec<RelatedPage> {
        let metadata = self.metadata();
        let categories = metadata.categories(page_id).await;
        let Some(category) = categories.first() else {
            debug!(page_id, "no categories, no related pages");
            return Vec::new();
        };

        metadata
            .category_members(category, limit.saturating_add(1))
            .await
            .into_iter()
            .filter(|member| member.page_id != page_id)
            .take(limit)
            .map(|member| RelatedPage { url: metadata.page_url(&member.title), title: member.title, page_id: member.page_id })
            .collect()
    }

    /// Enriched search with query syntax, then a category substring filter.
    pub async fn advanced_search(&self, params: &AdvancedSearch) -> AdvancedSearchResult {
        let query = build_advanced_query(
            &params.query,
            present(&params.exact_phrase),
            present(&params.exclude_words),
            present(&params.date_start),
            present(&params.date_end),
        );

        let options = SearchOptions::new(&query).limit(params.limit).min_word_count(params.min_word_count);
        let mut hits = self.searcher().search(&options).await;

        if let Some(wanted) = present(&params.category) {
            let wanted = wanted.to_lowercase();
            hits.retain(|hit| {
                hit.enrichment
                    .as_ref()
                    .is_some_and(|e| e.categories.iter().any(|c| c.to_lowercase().contains(&wanted)))
            });
        }

        AdvancedSearchResult { query, original_query: params.query.clone(), hits }
    }

    /// Research a topic: main pages from a search, and at depth 2 or more
    /// the pages behind their first outbound links.
    pub async fn topic_research(&self, topic: &str, depth: u8, limit: usize) -> Result<TopicResearch> {
        if !(1..=3).contains(&depth) {
            return Err(HarvestError::ConfigError(format!("Depth must be between 1 and 3, got {}", depth)));
        }

        let metadata = self.metadata();
        let retriever = self.retriever();
        let searcher = self.searcher();

        let main_hits = searcher.search(&SearchOptions::new(topic).limit(limit).enrich(false)).await;

        let mut research =
            TopicResearch { topic: topic.to_string(), main_pages: Vec::new(), related_topics: Vec::new(), hits: Vec::new() };

        for hit in main_hits {
            let content = retriever.fetch(&ArticleRef::Id(hit.page_id)).await;
            let mut categories = metadata.categories(hit.page_id).await;
            categories.truncate(TOPIC_CATEGORY_LIMIT);

            research.main_pages.push(MainPage {
                title: hit.title.clone(),
                page_id: hit.page_id,
                url: metadata.page_url(&hit.title),
                categories,
                summary: first_paragraph(&content),
            });
            research.hits.push(hit.clone());

            if depth >= 2 {
                let links = metadata.links(hit.page_id, TOPIC_LINK_REQUEST).await;
                for link in links.iter().take(TOPIC_LINKS_FOLLOWED) {
                    let found = searcher.search(&SearchOptions::new(link).limit(1).enrich(false)).await;
                    let Some(related) = found.into_iter().next() else {
                        continue;
                    };

                    let related_content = retriever.fetch(&ArticleRef::Id(related.page_id)).await;
                    research.related_topics.push(RelatedTopic {
                        title: link.clone(),
                        page_id: related.page_id,
                        url: metadata.page_url(link),
                        summary: first_paragraph(&related_content),
                        main_topic: hit.title.clone(),
                    });
                    research.hits.push(related);
                }
            }
        }

        Ok(research)
    }
}

fn first_paragraph(content: &str) -> String {
    if content.is_empty() { String::new() } else { content.split("\n\n").next().unwrap_or_default().to_string() }
}
