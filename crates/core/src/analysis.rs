//! Light content analysis: summary paragraph, keyword frequencies, section
//! headings, and pairwise page comparison.

use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::article::ArticleRef;
use crate::config::WikiConfig;
use crate::locale::LocaleProfile;
use crate::metadata::MetadataAccessor;
use crate::normalize::Normalizer;
use crate::retriever::ContentRetriever;
use crate::transport::Transport;
use crate::{HarvestError, Result};

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[a-zA-ZğüşıöçĞÜŞİÖÇ]{4,}\b").unwrap());

/// Summary paragraphs longer than this are cut.
pub const SUMMARY_MAX_CHARS: usize = 500;

/// Keywords reported per analysis.
pub const KEYWORD_LIMIT: usize = 10;

/// Which parts of an analysis to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzeKind {
    #[default]
    Summary,
    Keywords,
    Sections,
    All,
}

impl AnalyzeKind {
    fn includes(self, part: AnalyzeKind) -> bool {
        self == AnalyzeKind::All || self == part
    }
}

impl FromStr for AnalyzeKind {
    type Err = HarvestError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "summary" => Ok(AnalyzeKind::Summary),
            "keywords" => Ok(AnalyzeKind::Keywords),
            "sections" => Ok(AnalyzeKind::Sections),
            "all" => Ok(AnalyzeKind::All),
            other => Err(HarvestError::ConfigError(format!("Unsupported analysis type: {}", other))),
        }
    }
}

/// Word and number of occurrences
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Keyword {
    pub word: String,
    pub count: usize,
}

/// Result of [`Analyzer::analyze`]; parts not requested are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Analysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<Keyword>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<String>>,
}

/// One side of a comparison
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComparedPage {
    pub page_id: u64,
    pub title: String,
    pub url: String,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageComparison {
    pub page1: ComparedPage,
    pub page2: ComparedPage,
    /// Sorted category names shared by both pages.
    pub common_categories: Vec<String>,
    /// `|common words| / max(|words1|, |words2|)`, 0 when both are empty.
    pub similarity: f64,
    pub common_word_count: usize,
}

/// First paragraph, cut to 497 characters plus `...` when longer than 500
pub fn summary_paragraph(content: &str) -> String {
    let first = content.split("\n\n").next().unwrap_or_default();
    if first.chars().count() > SUMMARY_MAX_CHARS {
        let cut: String = first.chars().take(SUMMARY_MAX_CHARS - 3).collect();
        format!("{}...", cut)
    } else {
        first.to_string()
    }
}

/// Most frequent words of four or more letters, stop-words excluded.
///
/// Ties keep first-seen order.
pub fn keywords(content: &str, profile: &LocaleProfile, limit: usize) -> Vec<Keyword> {
    let lowered = content.to_lowercase();
    let mut counted: Vec<Keyword> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for word in WORD.find_iter(&lowered).map(|m| m.as_str()) {
        if profile.is_stopword(word) {
            continue;
        }
        match positions.get(word) {
            Some(&index) => counted[index].count += 1,
            None => {
                positions.insert(word, counted.len());
                counted.push(Keyword { word: word.to_string(), count: 1 });
            }
        }
    }

    counted.sort_by(|a, b| b.count.cmp(&a.count));
    counted.truncate(limit);
    counted
}

/// Headings of `## ` lines in document order
pub fn section_headings(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| line.strip_prefix("## "))
        .map(|heading| heading.trim().to_string())
        .collect()
}

/// Distinct lowercased words of four or more letters
pub fn word_set(content: &str) -> BTreeSet<String> {
    let lowered = content.to_lowercase();
    WORD.find_iter(&lowered).map(|m| m.as_str().to_string()).collect()
}

/// Common-word ratio of two word sets
pub fn similarity(words1: &BTreeSet<String>, words2: &BTreeSet<String>) -> (f64, usize) {
    let common = words1.intersection(words2).count();
    let largest = words1.len().max(words2.len());
    if largest == 0 { (0.0, common) } else { (common as f64 / largest as f64, common) }
}

/// Runs analyses against one language edition.
#[derive(Clone, Copy)]
pub struct Analyzer<'a> {
    transport: &'a dyn Transport,
    config: &'a WikiConfig,
    normalizer: &'a Normalizer,
}

impl<'a> Analyzer<'a> {
    pub fn new(transport: &'a dyn Transport, config: &'a WikiConfig, normalizer: &'a Normalizer) -> Self {
        Self { transport, config, normalizer }
    }

    /// Analyze one page; [`HarvestError::NoContent`] when nothing was retrieved.
    pub async fn analyze(&self, page_id: u64, kind: AnalyzeKind) -> Result<Analysis> {
        let retriever = ContentRetriever::new(self.transport, self.config, self.normalizer);
        let content = retriever.fetch(&ArticleRef::Id(page_id)).await;
        if content.trim().is_empty() {
            return Err(HarvestError::NoContent);
        }
        Ok(analyze_text(&content, kind, &self.config.locale))
    }

    /// Compare two pages by categories and vocabulary.
    pub async fn compare(&self, page_id_1: u64, page_id_2: u64) -> PageComparison {
        let (page1, content1) = self.compared_page(page_id_1).await;
        let (page2, content2) = self.compared_page(page_id_2).await;

        let categories2: BTreeSet<&String> = page2.categories.iter().collect();
        let common_categories: BTreeSet<String> =
            page1.categories.iter().filter(|c| categories2.contains(c)).cloned().collect();

        let (similarity, common_word_count) = similarity(&word_set(&content1), &word_set(&content2));

        PageComparison {
            page1,
            page2,
            common_categories: common_categories.into_iter().collect(),
            similarity,
            common_word_count,
        }
    }

    async fn compared_page(&self, page_id: u64) -> (ComparedPage, String) {
        let metadata = MetadataAccessor::new(self.transport, self.config);
        let retriever = ContentRetriever::new(self.transport, self.config, self.normalizer);

        let mut page = ComparedPage { page_id, ..Default::default() };
        if let Some(info) = metadata.page_info(page_id).await {
            page.title = info.title;
            page.url = info.url;
        }
        page.categories = metadata.categories(page_id).await;

        let content = retriever.fetch(&ArticleRef::Id(page_id)).await;
        (page, content)
    }
}

/// Analysis of already retrieved text
pub fn analyze_text(content: &str, kind: AnalyzeKind, profile: &LocaleProfile) -> Analysis {
    let mut analysis = Analysis::default();
    if kind.includes(AnalyzeKind::Summary) {
        analysis.summary = Some(summary_paragraph(content));
    }
    if kind.includes(AnalyzeKind::Keywords) {
        analysis.keywords = Some(keywords(content, profile, KEYWORD_LIMIT));
    }
    if kind.includes(AnalyzeKind::Sections) {
        analysis.sections = Some(section_headings(content));
    }
    analysis
}
