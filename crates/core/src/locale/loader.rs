use crate::error::Result;
use crate::locale::parser::LocaleParser;
use crate::locale::profile::LocaleProfile;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Loader for per-language locale profiles
///
/// Files are named `<language>.txt`. The built-in profile is the base; the
/// standard directory is merged next and the custom directory last.
#[derive(Debug, Clone)]
pub struct LocaleLoader {
    /// Custom locale directory path
    custom_dir: Option<PathBuf>,
    /// Standard locale directory path
    standard_dir: Option<PathBuf>,
    /// Loaded profile cache
    cache: HashMap<String, LocaleProfile>,
}

impl LocaleLoader {
    /// Create a loader that only knows the built-in profiles
    pub fn new() -> Self {
        Self { custom_dir: None, standard_dir: None, cache: HashMap::new() }
    }

    /// Load the profile for a language
    pub fn load(&mut self, language: &str) -> Result<LocaleProfile> {
        if let Some(profile) = self.cache.get(language) {
            return Ok(profile.clone());
        }

        let mut profile = LocaleProfile::builtin(language);
        for file_path in self.find_locale_files(language) {
            let extra = LocaleParser::parse_file(&file_path)?;
            tracing::debug!(path = %file_path.display(), "merged locale file");
            profile.merge(&extra);
        }

        self.cache.insert(language.to_string(), profile.clone());
        Ok(profile)
    }

    /// Locale files for a language, lowest priority first
    fn find_locale_files(&self, language: &str) -> Vec<PathBuf> {
        let file_name = format!("{}.txt", language);

        [&self.standard_dir, &self.custom_dir]
            .into_iter()
            .flatten()
            .map(|dir| dir.join(&file_name))
            .filter(|path| path.exists())
            .collect()
    }

    /// Clear the profile cache
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

/// Builder for LocaleLoader
#[derive(Debug)]
pub struct LocaleLoaderBuilder {
    custom_dir: Option<PathBuf>,
    standard_dir: Option<PathBuf>,
}

impl LocaleLoaderBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self { custom_dir: None, standard_dir: None }
    }

    /// Set custom locale directory
    pub fn custom_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.custom_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set standard locale directory
    pub fn standard_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.standard_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Build the LocaleLoader
    pub fn build(self) -> LocaleLoader {
        LocaleLoader { custom_dir: self.custom_dir, standard_dir: self.standard_dir, cache: HashMap::new() }
    }
}

impl Default for LocaleLoaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for LocaleLoader {
    fn default() -> Self {
        let mut builder = LocaleLoaderBuilder::new();

        if let Some(custom_dir) = Self::default_custom_dir() {
            builder = builder.custom_dir(custom_dir);
        }

        let standard_dir = PathBuf::from("locales");
        if standard_dir.exists() {
            builder = builder.standard_dir(standard_dir);
        }

        builder.build()
    }
}

impl LocaleLoader {
    /// Default custom locale directory (~/.config/wikiharvest/locales)
    fn default_custom_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("wikiharvest").join("locales"))
    }
}
