//! Best-effort article retrieval.
//!
//! Three upstream tiers are tried in a fixed order, each only when the
//! previous one left less than [`WikiConfig::content_threshold`] characters:
//!
//! 1. the full-text extract of the page;
//! 2. a section-by-section parse by canonical title (lead section, then every
//!    section whose heading is not on the locale skip-list);
//! 3. the mobile-sections endpoint, appended to the tier 2 buffer.
//!
//! Upstream failures never escape: each call site logs the error and treats
//! it as "no content from this step". The final artifact clean-up runs over
//! whatever buffer won.

use tracing::{debug, warn};

use crate::article::{ArticleContent, ArticleRef, ContentSource, Section};
use crate::config::WikiConfig;
use crate::metadata::{MetadataAccessor, encode_title};
use crate::normalize::Normalizer;
use crate::transport::{Params, Transport};
use crate::wire::{self, MobileResponse, ParseResponse, QueryResponse, SectionEntry};
use crate::{HarvestError, Result};

/// Extract lookup result: canonical title and extract text, both optional
#[derive(Debug, Default)]
struct ExtractLookup {
    title: Option<String>,
    extract: Option<String>,
}

/// Assembles the best-available plain text of an article.
#[derive(Clone, Copy)]
pub struct ContentRetriever<'a> {
    transport: &'a dyn Transport,
    config: &'a WikiConfig,
    normalizer: &'a Normalizer,
}

impl<'a> ContentRetriever<'a> {
    pub fn new(transport: &'a dyn Transport, config: &'a WikiConfig, normalizer: &'a Normalizer) -> Self {
        Self { transport, config, normalizer }
    }

    /// Plain text of an article; empty when every tier came back empty.
    pub async fn fetch(&self, article: &ArticleRef) -> String {
        self.retrieve(article).await.text
    }

    /// Retrieve an article with its sections and the tier that produced it.
    pub async fn retrieve(&self, article: &ArticleRef) -> ArticleContent {
        let lookup = self.fetch_extract(article).await.unwrap_or_else(|e| {
            warn!(article = %article, error = %e, "extract request failed");
            ExtractLookup::default()
        });
        let extract = lookup.extract.unwrap_or_default();

        if char_len(&extract) >= self.config.content_threshold {
            debug!(article = %article, chars = char_len(&extract), "extract satisfied threshold");
            let text = self.normalizer.clean_artifacts(&extract);
            return ArticleContent::from_extract(lookup.title, extract, text);
        }

        let title = match article {
            ArticleRef::Id(page_id) => self.resolve_title(*page_id).await,
            ArticleRef::Title(title) => lookup.title.clone().or_else(|| Some(title.clone())),
        };

        let Some(title) = title else {
            debug!(article = %article, "title unresolved, keeping short extract");
            return self.short_extract(None, extract);
        };

        let assembled = self.assemble_by_title(&title).await;
        if assembled.sections.is_empty() {
            debug!(title = %title, "assembly found no sections, keeping short extract");
            return self.short_extract(Some(title), extract);
        }

        assembled
    }

    /// Assemble content by title from parsed sections, falling back to the
    /// mobile endpoint when the buffer stays under the threshold.
    pub async fn assemble_by_title(&self, title: &str) -> ArticleContent {
        let mut buffer = format!("# {}\n\n", title);
        let mut sections = Vec::new();

        match self.fetch_section_markup(title, "0").await {
            Ok(Some(markup)) => {
                let body = self.normalizer.html_to_text(&markup);
                if !body.is_empty() {
                    buffer.push_str(&body);
                    buffer.push_str("\n\n");
                    sections.push(Section { heading: None, body });
                }
            }
            Ok(None) => {}
            Err(e) => warn!(title = %title, error = %e, "lead section request failed"),
        }

        match self.fetch_section_list(title).await {
            Ok(entries) => {
                for entry in entries {
                    self.append_section(title, &entry, &mut buffer, &mut sections).await;
                }
            }
            Err(e) => warn!(title = %title, error = %e, "section list request failed"),
        }

        let mut source = ContentSource::Sections;

        if char_len(&buffer) < self.config.content_threshold {
            debug!(title = %title, chars = char_len(&buffer), "trying mobile sections");
            match self.fetch_mobile(title).await {
                Ok(mobile) => {
                    let before = sections.len();
                    self.append_mobile(mobile, &mut buffer, &mut sections);
                    if sections.len() > before {
                        source = ContentSource::Mobile;
                    }
                }
                Err(e) => warn!(title = %title, error = %e, "mobile sections request failed"),
            }
        }

        let text = self.normalizer.clean_artifacts(&buffer);
        ArticleContent { title: Some(title.to_string()), sections, raw: buffer, text, source }
    }

    async fn append_section(&self, title: &str, entry: &SectionEntry, buffer: &mut String, sections: &mut Vec<Section>) {
        let heading = self.normalizer.html_to_text(&entry.line);
        if self.config.locale.is_skipped_heading(&heading) {
            debug!(title = %title, heading = %heading, "skipping section");
            return;
        }

        let index = entry.index.to_string();
        match self.fetch_section_markup(title, &index).await {
            Ok(Some(markup)) => {
                let body = self.normalizer.html_to_text(&markup);
                if !body.is_empty() {
                    buffer.push_str(&format!("## {}\n\n{}\n\n", heading, body));
                    sections.push(Section { heading: Some(heading), body });
                }
            }
            Ok(None) => {}
            Err(e) => warn!(title = %title, section = %index, error = %e, "section request failed, skipping"),
        }
    }

    fn append_mobile(&self, mobile: MobileResponse, buffer: &mut String, sections: &mut Vec<Section>) {
        for lead in mobile.lead.sections {
            let body = lead.text.map(|t| self.normalizer.html_to_text(&t)).unwrap_or_default();
            if !body.is_empty() {
                buffer.push_str(&body);
                buffer.push_str("\n\n");
                sections.push(Section { heading: None, body });
            }
        }

        for section in mobile.remaining.sections {
            let heading = section.line.map(|line| self.normalizer.html_to_text(&line));
            if heading.as_deref().is_some_and(|h| self.config.locale.is_skipped_heading(h)) {
                continue;
            }

            let body = section.text.map(|t| self.normalizer.html_to_text(&t)).unwrap_or_default();
            if body.is_empty() {
                continue;
            }

            if let Some(heading) = &heading {
                buffer.push_str(&format!("## {}\n\n", heading));
            }
            buffer.push_str(&body);
            buffer.push_str("\n\n");
            sections.push(Section { heading, body });
        }
    }

    fn short_extract(&self, title: Option<String>, extract: String) -> ArticleContent {
        if extract.trim().is_empty() {
            let mut content = ArticleContent::missing();
            content.title = title;
            return content;
        }
        let text = self.normalizer.clean_artifacts(&extract);
        ArticleContent::from_extract(title, extract, text)
    }

    async fn resolve_title(&self, page_id: u64) -> Option<String> {
        let metadata = MetadataAccessor::new(self.transport, self.config);
        match metadata.try_page_info(page_id).await {
            Ok(info) => info.map(|info| info.title),
            Err(e) => {
                warn!(page_id, error = %e, "title resolution failed");
                None
            }
        }
    }

    async fn fetch_extract(&self, article: &ArticleRef) -> Result<ExtractLookup> {
        let mut params: Params = vec![
            ("action", "query".to_string()),
            ("format", "json".to_string()),
            ("prop", "extracts".to_string()),
            ("explaintext", "1".to_string()),
        ];
        match article {
            ArticleRef::Id(page_id) => params.push(("pageids", page_id.to_string())),
            ArticleRef::Title(title) => {
                params.push(("titles", title.clone()));
                params.push(("redirects", "1".to_string()));
            }
        }

        let body = self.transport.get_json(&self.config.api_url, &params).await?;
        let response: QueryResponse = wire::decode(body)?;
        let page = match article {
            ArticleRef::Id(page_id) => response.page(*page_id),
            ArticleRef::Title(_) => response.first_page(),
        };

        Ok(page
            .map(|page| ExtractLookup { title: page.title.clone(), extract: page.extract.clone() })
            .unwrap_or_default())
    }

    async fn fetch_section_markup(&self, title: &str, index: &str) -> Result<Option<String>> {
        let params: Params = vec![
            ("action", "parse".to_string()),
            ("format", "json".to_string()),
            ("page", title.to_string()),
            ("prop", "text".to_string()),
            ("section", index.to_string()),
            ("formatversion", "2".to_string()),
        ];

        let body = self.transport.get_json(&self.config.api_url, &params).await?;
        let response: ParseResponse = wire::decode(body)?;
        Ok(response.parse.and_then(|parse| parse.text).map(|text| text.into_string()))
    }

    async fn fetch_section_list(&self, title: &str) -> Result<Vec<SectionEntry>> {
        let params: Params = vec![
            ("action", "parse".to_string()),
            ("format", "json".to_string()),
            ("page", title.to_string()),
            ("prop", "sections".to_string()),
        ];

        let body = self.transport.get_json(&self.config.api_url, &params).await?;
        let response: ParseResponse = wire::decode(body)?;
        Ok(response.parse.map(|parse| parse.sections).unwrap_or_default())
    }

    async fn fetch_mobile(&self, title: &str) -> Result<MobileResponse> {
        let url = format!("{}{}", self.config.mobile_url, encode_title(title));
        let body = self.transport.get_json(&url, &[]).await?;
        if body.get("lead").is_none() && body.get("remaining").is_none() {
            return Err(HarvestError::MalformedResponse(format!("no sections in mobile response for {}", title)));
        }
        wire::decode(body)
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;
    use serde_json::json;

    fn config() -> WikiConfig {
        WikiConfig::builder().content_threshold(100).build().unwrap()
    }

    #[tokio::test]
    async fn test_long_extract_short_circuits() {
        let extract = "Ankara başkenttir.[1] ".repeat(10);
        let transport = MockTransport::new()
            .on(&[("prop", "extracts")], json!({"query": {"pages": {"5": {"pageid": 5, "title": "Ankara", "extract": extract}}}}));
        let config = config();
        let normalizer = Normalizer::default();
        let retriever = ContentRetriever::new(&transport, &config, &normalizer);

        let content = retriever.retrieve(&ArticleRef::Id(5)).await;

        assert_eq!(content.source, ContentSource::Extract);
        assert!(!content.text.contains("[1]"));
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_everything_failing_yields_empty() {
        let transport = MockTransport::new();
        let config = config();
        let normalizer = Normalizer::default();
        let retriever = ContentRetriever::new(&transport, &config, &normalizer);

        assert_eq!(retriever.fetch(&ArticleRef::Id(9)).await, "");
    }

    #[tokio::test]
    async fn test_unresolved_title_keeps_short_extract() {
        let transport = MockTransport::new()
            .on(&[("prop", "extracts")], json!({"query": {"pages": {"5": {"pageid": 5, "extract": "Kısa.[2]"}}}}))
            .on(&[("prop", "info")], json!({"query": {"pages": {}}}));
        let config = config();
        let normalizer = Normalizer::default();
        let retriever = ContentRetriever::new(&transport, &config, &normalizer);

        let content = retriever.retrieve(&ArticleRef::Id(5)).await;

        assert_eq!(content.text, "Kısa.");
        assert_eq!(transport.count(&[("action", "parse")]), 0);
    }

    #[tokio::test]
    async fn test_title_ref_uses_titles_param() {
        let transport = MockTransport::new().on(
            &[("prop", "extracts"), ("titles", "ankara")],
            json!({"query": {"pages": {"5": {"pageid": 5, "title": "Ankara", "extract": "x".repeat(150)}}}}),
        );
        let config = config();
        let normalizer = Normalizer::default();
        let retriever = ContentRetriever::new(&transport, &config, &normalizer);

        let content = retriever.retrieve(&ArticleRef::from("ankara")).await;

        assert_eq!(content.title.as_deref(), Some("Ankara"));
        assert_eq!(content.source, ContentSource::Extract);
    }
}
