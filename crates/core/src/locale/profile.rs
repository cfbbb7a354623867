use crate::error::{HarvestError, Result};

/// Represents a single locale directive line
#[derive(Debug, Clone, PartialEq)]
pub enum LocaleDirective {
    /// Heading keyword whose sections are never assembled
    SkipSection(String),
    /// Bracketed edit link label pair, e.g. `edit | edit source`
    EditLabel(String, String),
    /// Parenthesized edit label, e.g. `(edit)`
    ParenLabel(String),
    /// File/media namespace prefix without the colon
    MediaPrefix(String),
    /// Prefix stripped from category titles, colon included
    CategoryPrefix(String),
    /// Namespace used when building category titles
    CategoryNamespace(String),
    /// Word ignored by keyword analysis
    Stopword(String),
}

/// Localized vocabulary used by the retriever, normalizer and analysis.
///
/// Wikipedia UI chrome and section names differ per language. Everything that
/// depends on that vocabulary lives here so new languages are a data change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocaleProfile {
    /// Heading keywords (matched by case-insensitive containment)
    pub skip_sections: Vec<String>,
    /// `[a | b]` edit link label pairs
    pub edit_labels: Vec<(String, String)>,
    /// `(label)` edit labels
    pub paren_labels: Vec<String>,
    /// File/media prefixes such as `Dosya` or `File`
    pub media_prefixes: Vec<String>,
    /// Category title prefixes such as `Kategori:`
    pub category_prefixes: Vec<String>,
    /// Category namespace for building `Namespace:Name` titles
    pub category_namespace: Option<String>,
    /// Keyword analysis stop-words
    pub stopwords: Vec<String>,
}

impl LocaleProfile {
    /// Create an empty profile
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in profile: Turkish and English vocabulary, with the category
    /// namespace chosen by language.
    pub fn builtin(language: &str) -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        Self {
            skip_sections: owned(&[
                "kaynakça",
                "referans",
                "dipnot",
                "dış bağlantı",
                "ayrıca bakınız",
                "references",
                "notes",
                "external links",
                "see also",
            ]),
            edit_labels: vec![
                ("değiştir".to_string(), "kaynağı değiştir".to_string()),
                ("edit".to_string(), "edit source".to_string()),
            ],
            paren_labels: owned(&["düzenle", "edit"]),
            media_prefixes: owned(&["Dosya", "File", "Media"]),
            category_prefixes: owned(&["Kategori:", "Category:"]),
            category_namespace: Some(if language == "tr" { "Kategori" } else { "Category" }.to_string()),
            stopwords: owned(&["için", "olarak", "kadar", "sonra", "önce", "daha", "diğer"]),
        }
    }

    /// Add a directive to this profile
    pub fn add_directive(&mut self, directive: LocaleDirective) {
        match directive {
            LocaleDirective::SkipSection(word) => push_unique(&mut self.skip_sections, word.to_lowercase()),
            LocaleDirective::EditLabel(left, right) => {
                if !self.edit_labels.contains(&(left.clone(), right.clone())) {
                    self.edit_labels.push((left, right));
                }
            }
            LocaleDirective::ParenLabel(label) => push_unique(&mut self.paren_labels, label),
            LocaleDirective::MediaPrefix(prefix) => push_unique(&mut self.media_prefixes, prefix),
            LocaleDirective::CategoryPrefix(prefix) => push_unique(&mut self.category_prefixes, prefix),
            LocaleDirective::CategoryNamespace(namespace) => self.category_namespace = Some(namespace),
            LocaleDirective::Stopword(word) => push_unique(&mut self.stopwords, word.to_lowercase()),
        }
    }

    /// Merge another profile into this one.
    /// Lists are extended without duplicates; the namespace is overridden when set.
    pub fn merge(&mut self, other: &LocaleProfile) {
        for word in &other.skip_sections {
            push_unique(&mut self.skip_sections, word.to_lowercase());
        }
        for pair in &other.edit_labels {
            if !self.edit_labels.contains(pair) {
                self.edit_labels.push(pair.clone());
            }
        }
        for label in &other.paren_labels {
            push_unique(&mut self.paren_labels, label.clone());
        }
        for prefix in &other.media_prefixes {
            push_unique(&mut self.media_prefixes, prefix.clone());
        }
        for prefix in &other.category_prefixes {
            push_unique(&mut self.category_prefixes, prefix.clone());
        }
        if other.category_namespace.is_some() {
            self.category_namespace = other.category_namespace.clone();
        }
        for word in &other.stopwords {
            push_unique(&mut self.stopwords, word.to_lowercase());
        }
    }

    /// Whether a section heading belongs to the skip-list
    pub fn is_skipped_heading(&self, heading: &str) -> bool {
        let heading = heading.to_lowercase();
        self.skip_sections.iter().any(|word| heading.contains(word.as_str()))
    }

    /// Strip the first matching category prefix from a category title
    pub fn strip_category_prefix(&self, title: &str) -> String {
        self.category_prefixes
            .iter()
            .find_map(|prefix| title.strip_prefix(prefix.as_str()))
            .unwrap_or(title)
            .to_string()
    }

    /// Full category page title for a bare category name
    pub fn category_title(&self, name: &str) -> String {
        let namespace = self.category_namespace.as_deref().unwrap_or("Category");
        format!("{}:{}", namespace, name)
    }

    /// Whether a word is a keyword stop-word
    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.iter().any(|s| s == word)
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

/// Parse a directive line from the locale file format
pub fn parse_directive(line: &str) -> Result<LocaleDirective> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Err(HarvestError::LocaleError("Empty or comment line".to_string()));
    }

    let (key, value) = line
        .split_once(':')
        .ok_or_else(|| HarvestError::LocaleError(format!("Missing ':' in directive: {}", line)))?;
    let key = key.trim();
    let value = value.trim();

    if value.is_empty() {
        return Err(HarvestError::LocaleError(format!("Empty value for directive: {}", key)));
    }

    match key {
        "skip_section" => Ok(LocaleDirective::SkipSection(value.to_string())),
        "edit_label" => {
            let (left, right) = value
                .split_once('|')
                .ok_or_else(|| HarvestError::LocaleError(format!("Invalid edit_label format: {}", value)))?;
            Ok(LocaleDirective::EditLabel(left.trim().to_string(), right.trim().to_string()))
        }
        "paren_label" => Ok(LocaleDirective::ParenLabel(value.to_string())),
        "media_prefix" => Ok(LocaleDirective::MediaPrefix(value.trim_end_matches(':').to_string())),
        "category_prefix" => {
            let prefix = if value.ends_with(':') { value.to_string() } else { format!("{}:", value) };
            Ok(LocaleDirective::CategoryPrefix(prefix))
        }
        "category_namespace" => Ok(LocaleDirective::CategoryNamespace(value.trim_end_matches(':').to_string())),
        "stopword" => Ok(LocaleDirective::Stopword(value.to_string())),
        _ => Err(HarvestError::LocaleError(format!("Unknown directive: {}", key))),
    }
}
