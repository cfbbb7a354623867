//! Response shapes of the MediaWiki action API and the mobile-sections
//! endpoint.
//!
//! Everything is optional or defaulted: upstream omits keys freely, and a
//! missing key means "no data", not a decoding failure.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{HarvestError, Result};

/// `{"error": {"code": ..., "info": ...}}` envelope
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiError {
    pub code: String,
    pub info: String,
}

/// `action=query` response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QueryResponse {
    pub query: QueryBody,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QueryBody {
    pub pages: BTreeMap<String, PageEntry>,
    pub search: Vec<SearchEntry>,
    pub categorymembers: Vec<MemberEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PageEntry {
    pub pageid: Option<u64>,
    pub title: Option<String>,
    pub extract: Option<String>,
    pub fullurl: Option<String>,
    pub missing: Option<Value>,
    pub categories: Vec<TitleEntry>,
    pub images: Vec<TitleEntry>,
    pub links: Vec<TitleEntry>,
    pub imageinfo: Vec<ImageInfoEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TitleEntry {
    pub title: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImageInfoEntry {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchEntry {
    pub pageid: u64,
    pub title: String,
    #[serde(default)]
    pub snippet: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberEntry {
    pub pageid: u64,
    pub title: String,
}

/// `action=parse` response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ParseResponse {
    pub parse: Option<ParseBody>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ParseBody {
    pub title: Option<String>,
    pub text: Option<ParsedText>,
    pub sections: Vec<SectionEntry>,
}

/// Rendered markup: a plain string with `formatversion=2`, `{"*": ...}` without
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ParsedText {
    Plain(String),
    Legacy {
        #[serde(rename = "*")]
        content: String,
    },
}

impl ParsedText {
    pub fn into_string(self) -> String {
        match self {
            ParsedText::Plain(s) => s,
            ParsedText::Legacy { content } => content,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SectionEntry {
    #[serde(default)]
    pub index: SectionIndex,
    #[serde(default)]
    pub line: String,
}

/// Section index as sent upstream; usually `"3"`, occasionally a number or `"T-1"`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SectionIndex {
    Text(String),
    Number(u64),
}

impl Default for SectionIndex {
    fn default() -> Self {
        SectionIndex::Text("0".to_string())
    }
}

impl std::fmt::Display for SectionIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SectionIndex::Text(s) => f.write_str(s),
            SectionIndex::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Mobile-sections response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MobileResponse {
    pub lead: MobileGroup,
    pub remaining: MobileGroup,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MobileGroup {
    pub sections: Vec<MobileSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MobileSection {
    pub line: Option<String>,
    pub text: Option<String>,
}

/// Decode an upstream body, turning API error envelopes into errors
pub fn decode<T: DeserializeOwned>(body: Value) -> Result<T> {
    if let Some(error) = body.get("error") {
        let error: ApiError = serde_json::from_value(error.clone()).unwrap_or_default();
        return Err(HarvestError::MalformedResponse(format!("{}: {}", error.code, error.info)));
    }
    if !body.is_object() {
        return Err(HarvestError::MalformedResponse("expected a JSON object".to_string()));
    }
    Ok(serde_json::from_value(body)?)
}

impl QueryResponse {
    /// Page entry for a page id, ignoring pages flagged as missing
    pub fn page(&self, page_id: u64) -> Option<&PageEntry> {
        self.query
            .pages
            .get(&page_id.to_string())
            .filter(|page| page.missing.is_none())
    }

    /// First page that is not flagged as missing
    pub fn first_page(&self) -> Option<&PageEntry> {
        self.query.pages.values().find(|page| page.missing.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_query_pages() {
        let body = json!({
            "batchcomplete": "",
            "query": {"pages": {"42": {"pageid": 42, "title": "Ankara", "extract": "Başkent."}}}
        });
        let response: QueryResponse = decode(body).unwrap();
        let page = response.page(42).unwrap();
        assert_eq!(page.title.as_deref(), Some("Ankara"));
        assert_eq!(page.extract.as_deref(), Some("Başkent."));
        assert!(response.page(7).is_none());
    }

    #[test]
    fn test_missing_page_is_ignored() {
        let body = json!({"query": {"pages": {"-1": {"title": "Yok", "missing": ""}}}});
        let response: QueryResponse = decode(body).unwrap();
        assert!(response.first_page().is_none());
    }

    #[test]
    fn test_decode_api_error() {
        let body = json!({"error": {"code": "missingtitle", "info": "The page you specified doesn't exist."}});
        let result: Result<ParseResponse> = decode(body);
        assert!(matches!(result, Err(HarvestError::MalformedResponse(msg)) if msg.contains("missingtitle")));
    }

    #[test]
    fn test_decode_non_object() {
        let result: Result<QueryResponse> = decode(json!([1, 2, 3]));
        assert!(result.is_err());
    }

    #[test]
    fn test_parsed_text_variants() {
        let v2: ParseResponse = decode(json!({"parse": {"text": "<p>a</p>"}})).unwrap();
        let v1: ParseResponse = decode(json!({"parse": {"text": {"*": "<p>b</p>"}}})).unwrap();

        assert_eq!(v2.parse.unwrap().text.unwrap().into_string(), "<p>a</p>");
        assert_eq!(v1.parse.unwrap().text.unwrap().into_string(), "<p>b</p>");
    }

    #[test]
    fn test_section_index_forms() {
        let body = json!({"parse": {"sections": [
            {"index": "1", "line": "Tarihçe"},
            {"index": 2, "line": "Coğrafya"},
            {"line": "İndekssiz"}
        ]}});
        let response: ParseResponse = decode(body).unwrap();
        let indexes: Vec<String> = response.parse.unwrap().sections.iter().map(|s| s.index.to_string()).collect();
        assert_eq!(indexes, vec!["1", "2", "0"]);
    }
}
