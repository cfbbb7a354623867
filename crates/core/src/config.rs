//! Client configuration shared by every pipeline stage.
//!
//! A [`WikiConfig`] is built once per language and passed by reference into
//! each component; nothing in the pipeline mutates it.
//!
//! # Example
//!
//! ```rust
//! use wikiharvest_core::WikiConfig;
//!
//! let config = WikiConfig::builder()
//!     .language("en")
//!     .timeout(5)
//!     .content_threshold(1500)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.api_url, "https://en.wikipedia.org/w/api.php");
//! ```

use crate::locale::LocaleProfile;
use crate::{HarvestError, Result};
use url::Url;

/// Default length under which assembled content is considered useless.
pub const DEFAULT_CONTENT_THRESHOLD: usize = 1000;

/// Default length of the enrichment content summary.
pub const DEFAULT_SUMMARY_CHARS: usize = 500;

/// Endpoints, limits and vocabulary for one Wikipedia language edition.
#[derive(Debug, Clone)]
pub struct WikiConfig {
    /// Language code (tr, en, de, ...).
    pub language: String,

    /// MediaWiki action API endpoint.
    pub api_url: String,

    /// Page-view base path; titles are appended to it.
    pub wiki_url: String,

    /// Mobile-sections REST endpoint; titles are appended to it.
    pub mobile_url: String,

    /// Per-request timeout in seconds (default: 10).
    pub timeout: u64,

    /// User-Agent sent upstream.
    pub user_agent: String,

    /// Fallback threshold in characters (default: 1000).
    pub content_threshold: usize,

    /// Characters kept in enrichment summaries (default: 500).
    pub summary_chars: usize,

    /// Localized vocabulary.
    pub locale: LocaleProfile,
}

impl WikiConfig {
    /// Configuration for a language edition with default settings.
    pub fn for_language(language: &str) -> Self {
        Self {
            language: language.to_string(),
            api_url: format!("https://{}.wikipedia.org/w/api.php", language),
            wiki_url: format!("https://{}.wikipedia.org/wiki/", language),
            mobile_url: format!("https://{}.wikipedia.org/api/rest_v1/page/mobile-sections/", language),
            timeout: 10,
            user_agent: "wikiharvest/0.1 (https://www.mediawiki.org/wiki/API:Etiquette)".to_string(),
            content_threshold: DEFAULT_CONTENT_THRESHOLD,
            summary_chars: DEFAULT_SUMMARY_CHARS,
            locale: LocaleProfile::builtin(language),
        }
    }

    /// Creates a new builder for WikiConfig.
    pub fn builder() -> WikiConfigBuilder {
        WikiConfigBuilder::new()
    }

    /// Copy of this configuration pointed at another language edition.
    ///
    /// Timeout, user agent and thresholds carry over; endpoints and the
    /// built-in vocabulary follow the new language.
    pub fn with_language(&self, language: &str) -> Result<Self> {
        WikiConfig::builder()
            .language(language)
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .content_threshold(self.content_threshold)
            .summary_chars(self.summary_chars)
            .build()
    }
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self::for_language("tr")
    }
}

/// Builder for WikiConfig.
#[derive(Debug, Default)]
pub struct WikiConfigBuilder {
    language: Option<String>,
    api_url: Option<String>,
    wiki_url: Option<String>,
    mobile_url: Option<String>,
    timeout: Option<u64>,
    user_agent: Option<String>,
    content_threshold: Option<usize>,
    summary_chars: Option<usize>,
    locale: Option<LocaleProfile>,
}

impl WikiConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the language code.
    pub fn language(mut self, value: &str) -> Self {
        self.language = Some(value.to_string());
        self
    }

    /// Overrides the action API endpoint.
    pub fn api_url(mut self, value: &str) -> Self {
        self.api_url = Some(value.to_string());
        self
    }

    /// Overrides the page-view base path.
    pub fn wiki_url(mut self, value: &str) -> Self {
        self.wiki_url = Some(value.to_string());
        self
    }

    /// Overrides the mobile-sections endpoint.
    pub fn mobile_url(mut self, value: &str) -> Self {
        self.mobile_url = Some(value.to_string());
        self
    }

    /// Sets the request timeout in seconds.
    pub fn timeout(mut self, value: u64) -> Self {
        self.timeout = Some(value);
        self
    }

    /// Sets the User-Agent.
    pub fn user_agent(mut self, value: &str) -> Self {
        self.user_agent = Some(value.to_string());
        self
    }

    /// Sets the fallback threshold.
    pub fn content_threshold(mut self, value: usize) -> Self {
        self.content_threshold = Some(value);
        self
    }

    /// Sets the enrichment summary length.
    pub fn summary_chars(mut self, value: usize) -> Self {
        self.summary_chars = Some(value);
        self
    }

    /// Replaces the locale profile.
    pub fn locale(mut self, value: LocaleProfile) -> Self {
        self.locale = Some(value);
        self
    }

    /// Builds the config, validating language and endpoints.
    pub fn build(self) -> Result<WikiConfig> {
        let language = self.language.unwrap_or_else(|| "tr".to_string());
        if language.is_empty() || !language.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(HarvestError::ConfigError(format!("Invalid language code: {:?}", language)));
        }

        let mut config = WikiConfig::for_language(&language);

        if let Some(api_url) = self.api_url {
            config.api_url = api_url;
        }
        if let Some(wiki_url) = self.wiki_url {
            config.wiki_url = wiki_url;
        }
        if let Some(mobile_url) = self.mobile_url {
            config.mobile_url = mobile_url;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if let Some(user_agent) = self.user_agent {
            config.user_agent = user_agent;
        }
        if let Some(threshold) = self.content_threshold {
            config.content_threshold = threshold;
        }
        if let Some(chars) = self.summary_chars {
            config.summary_chars = chars;
        }
        if let Some(locale) = self.locale {
            config.locale = locale;
        }

        for endpoint in [&config.api_url, &config.wiki_url, &config.mobile_url] {
            Url::parse(endpoint).map_err(|e| HarvestError::InvalidUrl(format!("{}: {}", endpoint, e)))?;
        }

        Ok(config)
    }
}
