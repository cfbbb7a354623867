use serde::Serialize;
use tracing::warn;

use crate::config::WikiConfig;
use crate::transport::{Params, Transport};
use crate::wire::{self, QueryResponse};
use crate::Result;

/// Canonical identity of a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page_id: u64,
    pub title: String,
    pub url: String,
}

/// Image used on a page, with its file URL when resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    pub title: String,
    pub url: Option<String>,
}

/// Page listed in a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryMember {
    pub page_id: u64,
    pub title: String,
}

/// Percent-encode a title for use in a URL path.
///
/// Spaces become underscores; `/` separates path segments and is kept.
pub fn encode_title(title: &str) -> String {
    title
        .replace(' ', "_")
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Thin page lookups with no fallback logic.
///
/// The plain methods log and return empty values on any anomaly. The `try_*`
/// variants surface the error for callers that must tell "nothing" apart
/// from "failed".
#[derive(Clone, Copy)]
pub struct MetadataAccessor<'a> {
    transport: &'a dyn Transport,
    config: &'a WikiConfig,
}

impl<'a> MetadataAccessor<'a> {
    pub fn new(transport: &'a dyn Transport, config: &'a WikiConfig) -> Self {
        Self { transport, config }
    }

    /// Canonical page-view URL for a title
    pub fn page_url(&self, title: &str) -> String {
        format!("{}{}", self.config.wiki_url, encode_title(title))
    }

    pub async fn try_categories(&self, page_id: u64) -> Result<Vec<String>> {
        let params = page_query(page_id, "categories", &[("cllimit", "50")]);
        let response = self.query(&params).await?;

        Ok(response
            .page(page_id)
            .map(|page| {
                page.categories
                    .iter()
                    .map(|category| self.config.locale.strip_category_prefix(&category.title))
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Category names of a page, namespace prefix stripped
    pub async fn categories(&self, page_id: u64) -> Vec<String> {
        self.try_categories(page_id).await.unwrap_or_else(|e| {
            warn!(page_id, error = %e, "category lookup failed");
            Vec::new()
        })
    }

    pub async fn try_images(&self, page_id: u64) -> Result<Vec<String>> {
        let params = page_query(page_id, "images", &[]);
        let response = self.query(&params).await?;

        Ok(response
            .page(page_id)
            .map(|page| page.images.iter().map(|image| image.title.clone()).collect())
            .unwrap_or_default())
    }

    /// File titles of the images used on a page
    pub async fn images(&self, page_id: u64) -> Vec<String> {
        self.try_images(page_id).await.unwrap_or_else(|e| {
            warn!(page_id, error = %e, "image lookup failed");
            Vec::new()
        })
    }

    pub async fn try_image_url(&self, image_title: &str) -> Result<Option<String>> {
        let params: Params = vec![
            ("action", "query".to_string()),
            ("format", "json".to_string()),
            ("prop", "imageinfo".to_string()),
            ("titles", image_title.to_string()),
            ("iiprop", "url".to_string()),
        ];
        let response = self.query(&params).await?;

        Ok(response
            .query
            .pages
            .values()
            .find_map(|page| page.imageinfo.first().and_then(|info| info.url.clone())))
    }

    /// Direct file URL of an image, `None` when unresolved
    pub async fn image_url(&self, image_title: &str) -> Option<String> {
        self.try_image_url(image_title).await.unwrap_or_else(|e| {
            warn!(image = %image_title, error = %e, "image URL lookup failed");
            None
        })
    }

    /// Images of a page with URLs resolved, in page order
    pub async fn images_with_urls(&self, page_id: u64, limit: usize) -> Vec<ImageRef> {
        let mut resolved = Vec::new();
        for title in self.images(page_id).await.into_iter().take(limit) {
            let url = self.image_url(&title).await;
            resolved.push(ImageRef { title, url });
        }
        resolved
    }

    pub async fn try_page_info(&self, page_id: u64) -> Result<Option<PageInfo>> {
        let params = page_query(page_id, "info", &[("inprop", "url|displaytitle")]);
        let response = self.query(&params).await?;

        Ok(response.page(page_id).and_then(|page| {
            let title = page.title.clone()?;
            let url = page.fullurl.clone().unwrap_or_else(|| self.page_url(&title));
            Some(PageInfo { page_id, title, url })
        }))
    }

    /// Title and canonical URL of a page
    pub async fn page_info(&self, page_id: u64) -> Option<PageInfo> {
        self.try_page_info(page_id).await.unwrap_or_else(|e| {
            warn!(page_id, error = %e, "page info lookup failed");
            None
        })
    }

    pub async fn try_links(&self, page_id: u64, limit: usize) -> Result<Vec<String>> {
        let limit = limit.to_string();
        let params = page_query(page_id, "links", &[("plnamespace", "0"), ("pllimit", limit.as_str())]);
        let response = self.query(&params).await?;

        Ok(response
            .page(page_id)
            .map(|page| page.links.iter().map(|link| link.title.clone()).collect())
            .unwrap_or_default())
    }

    /// Titles of article-namespace pages linked from a page
    pub async fn links(&self, page_id: u64, limit: usize) -> Vec<String> {
        self.try_links(page_id, limit).await.unwrap_or_else(|e| {
            warn!(page_id, error = %e, "link lookup failed");
            Vec::new()
        })
    }

    pub async fn try_category_members(&self, category: &str, limit: usize) -> Result<Vec<CategoryMember>> {
        let params: Params = vec![
            ("action", "query".to_string()),
            ("format", "json".to_string()),
            ("list", "categorymembers".to_string()),
            ("cmtitle", self.config.locale.category_title(category)),
            ("cmlimit", limit.to_string()),
            ("cmtype", "page".to_string()),
        ];
        let response = self.query(&params).await?;

        Ok(response
            .query
            .categorymembers
            .into_iter()
            .map(|member| CategoryMember { page_id: member.pageid, title: member.title })
            .collect())
    }

    /// Pages in a category, given its bare name
    pub async fn category_members(&self, category: &str, limit: usize) -> Vec<CategoryMember> {
        self.try_category_members(category, limit).await.unwrap_or_else(|e| {
            warn!(category = %category, error = %e, "category member lookup failed");
            Vec::new()
        })
    }

    async fn query(&self, params: &[(&'static str, String)]) -> Result<QueryResponse> {
        let body = self.transport.get_json(&self.config.api_url, params).await?;
        wire::decode(body)
    }
}

fn page_query(page_id: u64, prop: &str, extra: &[(&'static str, &str)]) -> Params {
    let mut params: Params = vec![
        ("action", "query".to_string()),
        ("format", "json".to_string()),
        ("prop", prop.to_string()),
        ("pageids", page_id.to_string()),
    ];
    params.extend(extra.iter().map(|(key, value)| (*key, value.to_string())));
    params
}
