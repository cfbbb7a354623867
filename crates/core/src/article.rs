//! Article identifiers and assembled content.
//!
//! [`ArticleContent`] is the result of one retrieval: the sections in document
//! order, the raw concatenated buffer, the cleaned text and the tier that
//! produced it.

use serde::Serialize;

/// Identifies an article within one language edition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArticleRef {
    /// Numeric page id.
    Id(u64),
    /// Page title as typed by the caller.
    Title(String),
}

impl From<u64> for ArticleRef {
    fn from(page_id: u64) -> Self {
        ArticleRef::Id(page_id)
    }
}

impl From<&str> for ArticleRef {
    fn from(title: &str) -> Self {
        ArticleRef::Title(title.to_string())
    }
}

impl std::fmt::Display for ArticleRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArticleRef::Id(id) => write!(f, "#{}", id),
            ArticleRef::Title(title) => f.write_str(title),
        }
    }
}

/// Which retrieval tier produced the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
    /// Full-text extract.
    Extract,
    /// Section-by-section parse.
    Sections,
    /// Mobile-sections endpoint.
    Mobile,
    /// Nothing usable upstream.
    Missing,
}

/// One titled subdivision of an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Heading; `None` for lead text.
    pub heading: Option<String>,
    /// Normalized body text.
    pub body: String,
}

/// The complete result of retrieving an article.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleContent {
    /// Canonical title when it was resolved.
    pub title: Option<String>,

    /// Sections in document order.
    pub sections: Vec<Section>,

    /// Concatenated buffer before the final clean-up pass.
    pub raw: String,

    /// Final plain text.
    pub text: String,

    /// Tier that produced `text`.
    pub source: ContentSource,
}

impl ArticleContent {
    /// Content from a plain-text extract.
    pub(crate) fn from_extract(title: Option<String>, extract: String, text: String) -> Self {
        let sections = vec![Section { heading: None, body: extract.clone() }];
        Self { title, sections, raw: extract, text, source: ContentSource::Extract }
    }

    /// Content when every tier came back empty.
    pub fn missing() -> Self {
        Self { title: None, sections: Vec::new(), raw: String::new(), text: String::new(), source: ContentSource::Missing }
    }

    /// Whether any text was found.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Whitespace-separated word count of the final text.
    pub fn word_count(&self) -> usize {
        count_words(&self.text)
    }
}

/// Count whitespace-separated words
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// First `max_chars` characters of `text`, suffixed with `...` when cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}...", &text[..byte_index]),
        None => text.to_string(),
    }
}
