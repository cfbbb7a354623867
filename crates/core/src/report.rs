//! Human-readable text reports of search results.
//!
//! Rendering is pure ([`render_report`]); the upstream lookups that fill a
//! report happen in [`collect_report_entries`]; [`write_report`] only touches
//! the filesystem.

use std::path::{Path, PathBuf};

use time::OffsetDateTime;
use time::macros::format_description;
use tracing::debug;

use crate::Result;
use crate::article::ArticleRef;
use crate::metadata::{ImageRef, MetadataAccessor};
use crate::retriever::ContentRetriever;
use crate::search::SearchHit;

/// Categories listed per result.
pub const REPORT_CATEGORY_LIMIT: usize = 10;

/// Images listed per result.
pub const REPORT_IMAGE_LIMIT: usize = 5;

const RULE_WIDTH: usize = 50;

/// Everything printed for one result block.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub page_id: u64,
    pub title: String,
    pub url: String,
    pub categories: Vec<String>,
    pub content: String,
    pub images: Vec<ImageRef>,
}

/// Which operation produced a report; decides the default file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Search,
    Advanced,
    Topic,
}

impl ReportKind {
    fn prefix(self) -> &'static str {
        match self {
            ReportKind::Search => "",
            ReportKind::Advanced => "advanced_",
            ReportKind::Topic => "topic_",
        }
    }

    fn fallback(self) -> &'static str {
        match self {
            ReportKind::Topic => "topic_search",
            _ => "wiki_search",
        }
    }
}

/// Render the report text.
pub fn render_report(term: &str, entries: &[ReportEntry]) -> String {
    let mut out = format!("ARAMA TERİMİ: {}\n{}\n\n", term, "=".repeat(RULE_WIDTH));

    if entries.is_empty() {
        out.push_str("Sonuç bulunamadı.\n");
        return out;
    }

    out.push_str(&format!("{} SONUÇ BULUNDU:\n\n", entries.len()));

    for (i, entry) in entries.iter().enumerate() {
        out.push_str(&format!("SONUÇ {}:\n", i + 1));
        out.push_str(&format!("Başlık: {}\n", entry.title));
        out.push_str(&format!("Sayfa ID: {}\n", entry.page_id));
        out.push_str(&format!("Sayfa URL: {}\n\n", entry.url));

        if !entry.categories.is_empty() {
            let shown: Vec<&str> = entry.categories.iter().take(REPORT_CATEGORY_LIMIT).map(String::as_str).collect();
            out.push_str("KATEGORİLER:\n");
            out.push_str(&shown.join(", "));
            out.push_str("\n\n");
        }

        if entry.content.is_empty() {
            out.push_str("İçerik bulunamadı.\n\n");
        } else {
            out.push_str("İÇERİK:\n");
            out.push_str(&entry.content);
            out.push_str("\n\n");
        }

        if !entry.images.is_empty() {
            out.push_str("RESİMLER:\n");
            for (j, image) in entry.images.iter().take(REPORT_IMAGE_LIMIT).enumerate() {
                out.push_str(&format!("{}. {}\n", j + 1, image.title));
                if let Some(url) = &image.url {
                    out.push_str(&format!("   URL: {}\n", url));
                }
            }
            out.push('\n');
        }

        out.push_str(&"-".repeat(RULE_WIDTH));
        out.push_str("\n\n");
    }

    out
}

/// Look up URL, categories, full content and images for each hit.
///
/// Categories already attached by enrichment are reused.
pub async fn collect_report_entries(
    retriever: &ContentRetriever<'_>,
    metadata: &MetadataAccessor<'_>,
    hits: &[SearchHit],
) -> Vec<ReportEntry> {
    let mut entries = Vec::with_capacity(hits.len());

    for hit in hits {
        debug!(page_id = hit.page_id, "collecting report entry");
        let categories = match &hit.enrichment {
            Some(enrichment) => enrichment.categories.clone(),
            None => metadata.categories(hit.page_id).await,
        };
        let content = retriever.fetch(&ArticleRef::Id(hit.page_id)).await;
        let images = metadata.images_with_urls(hit.page_id, REPORT_IMAGE_LIMIT).await;

        entries.push(ReportEntry {
            page_id: hit.page_id,
            title: hit.title.clone(),
            url: metadata.page_url(&hit.title),
            categories,
            content,
            images,
        });
    }

    entries
}

/// Write a rendered report, creating missing parent directories.
pub fn write_report(path: &Path, report: &str) -> Result<PathBuf> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, report)?;
    Ok(path.to_path_buf())
}

/// File-name-safe form of a search term: word characters, whitespace and
/// `-` survive, spaces become `_`.
pub fn safe_term(term: &str) -> Option<String> {
    let kept: String = term
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();
    let kept = kept.trim().replace(' ', "_");
    if kept.is_empty() { None } else { Some(kept) }
}

/// Default report file name: `<prefix><safe_term>_<YYYYmmdd_HHMMSS>.txt`.
pub fn report_file_name(kind: ReportKind, term: &str, at: OffsetDateTime) -> String {
    let format = format_description!("[year][month][day]_[hour][minute][second]");
    let stamp = at.format(format).unwrap_or_else(|_| at.unix_timestamp().to_string());
    let term = safe_term(term).unwrap_or_else(|| kind.fallback().to_string());
    format!("{}{}_{}.txt", kind.prefix(), term, stamp)
}

/// [`report_file_name`] stamped with the current local time.
pub fn default_report_file_name(kind: ReportKind, term: &str) -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    report_file_name(kind, term, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;
    use time::macros::datetime;

    fn entry() -> ReportEntry {
        ReportEntry {
            page_id: 3,
            title: "Ankara".to_string(),
            url: "https://tr.wikipedia.org/wiki/Ankara".to_string(),
            categories: vec!["Türkiye'deki iller".to_string(), "Başkentler".to_string()],
            content: "# Ankara\n\nAnkara başkenttir.".to_string(),
            images: vec![
                ImageRef { title: "Dosya:Anıtkabir.jpg".to_string(), url: Some("https://upload/a.jpg".to_string()) },
                ImageRef { title: "Dosya:Harita.svg".to_string(), url: None },
            ],
        }
    }

    #[test]
    fn test_render_empty_report() {
        let report = render_report("yok", &[]);
        assert_eq!(report, format!("ARAMA TERİMİ: yok\n{}\n\nSonuç bulunamadı.\n", "=".repeat(50)));
    }

    #[test]
    fn test_render_full_entry() {
        let report = render_report("Ankara", &[entry()]);
        let expected = format!(
            "ARAMA TERİMİ: Ankara\n{}\n\n1 SONUÇ BULUNDU:\n\n\
             SONUÇ 1:\nBaşlık: Ankara\nSayfa ID: 3\nSayfa URL: https://tr.wikipedia.org/wiki/Ankara\n\n\
             KATEGORİLER:\nTürkiye'deki iller, Başkentler\n\n\
             İÇERİK:\n# Ankara\n\nAnkara başkenttir.\n\n\
             RESİMLER:\n1. Dosya:Anıtkabir.jpg\n   URL: https://upload/a.jpg\n2. Dosya:Harita.svg\n\n\
             {}\n\n",
            "=".repeat(50),
            "-".repeat(50)
        );
        assert_eq!(report, expected);
    }

    #[test]
    fn test_render_omits_empty_blocks() {
        let bare = ReportEntry { categories: vec![], content: String::new(), images: vec![], ..entry() };
        let report = render_report("Ankara", &[bare]);

        assert!(!report.contains("KATEGORİLER:"));
        assert!(!report.contains("RESİMLER:"));
        assert!(report.contains("İçerik bulunamadı.\n\n"));
    }

    #[test]
    fn test_render_caps_categories_and_images() {
        let many = ReportEntry {
            categories: (1..=12).map(|i| format!("K{}", i)).collect(),
            images: (1..=7).map(|i| ImageRef { title: format!("Dosya:{}.jpg", i), url: None }).collect(),
            ..entry()
        };
        let report = render_report("x", &[many]);

        assert!(report.contains("K10\n\n"));
        assert!(!report.contains("K11"));
        assert!(report.contains("5. Dosya:5.jpg"));
        assert!(!report.contains("6. Dosya:6.jpg"));
    }

    #[rstest]
    #[case("Ankara Kalesi", Some("Ankara_Kalesi"))]
    #[case("  İstanbul!? ", Some("İstanbul"))]
    #[case("a-b c_d", Some("a-b_c_d"))]
    #[case("?!*", None)]
    fn test_safe_term(#[case] term: &str, #[case] expected: Option<&str>) {
        assert_eq!(safe_term(term).as_deref(), expected);
    }

    #[test]
    fn test_report_file_name() {
        let at = datetime!(2024-03-05 14:07:09 UTC);
        assert_eq!(report_file_name(ReportKind::Search, "Ankara Kalesi", at), "Ankara_Kalesi_20240305_140709.txt");
        assert_eq!(report_file_name(ReportKind::Advanced, "???", at), "advanced_wiki_search_20240305_140709.txt");
        assert_eq!(report_file_name(ReportKind::Topic, "", at), "topic_topic_search_20240305_140709.txt");
    }

    #[test]
    fn test_write_report_creates_parent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reports/nested/out.txt");

        let written = write_report(&path, "ARAMA TERİMİ: x\n").unwrap();

        assert_eq!(written, path);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "ARAMA TERİMİ: x\n");
    }
}
