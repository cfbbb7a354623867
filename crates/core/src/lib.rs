pub mod analysis;
pub mod article;
pub mod client;
pub mod config;
pub mod error;
pub mod explore;
pub mod locale;
pub mod metadata;
pub mod normalize;
pub mod report;
pub mod retriever;
pub mod search;
pub mod summarizer;
#[doc(hidden)]
pub mod testing;
pub mod transport;
#[doc(hidden)]
pub mod wire;

pub use analysis::{Analysis, AnalyzeKind, Analyzer, ComparedPage, Keyword, PageComparison};
pub use article::{ArticleContent, ArticleRef, ContentSource, Section, count_words, truncate_chars};
pub use client::{PageDetails, WikiClient};
pub use config::{DEFAULT_CONTENT_THRESHOLD, DEFAULT_SUMMARY_CHARS, WikiConfig, WikiConfigBuilder};
pub use error::{HarvestError, Result};
pub use explore::{
    AdvancedSearch, AdvancedSearchResult, Explorer, MainPage, RelatedPage, RelatedTopic, TopicResearch,
    build_advanced_query,
};
pub use locale::{LocaleDirective, LocaleLoader, LocaleLoaderBuilder, LocaleParser, LocaleProfile};
pub use metadata::{CategoryMember, ImageRef, MetadataAccessor, PageInfo};
pub use normalize::{Normalizer, clean_artifacts, html_to_text};
pub use report::{
    ReportEntry, ReportKind, collect_report_entries, default_report_file_name, render_report, report_file_name,
    write_report,
};
pub use retriever::ContentRetriever;
pub use search::{Enrichment, SearchHit, SearchOptions, Searcher, SortMode};
#[cfg(feature = "fetch")]
pub use summarizer::ChatSummarizer;
pub use summarizer::{ChatSettings, DisabledSummarizer, Summarizer, guide_summary};
pub use transport::Transport;
#[cfg(feature = "fetch")]
pub use transport::HttpTransport;
