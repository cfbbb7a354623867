use crate::error::{HarvestError, Result};
use crate::locale::profile::{LocaleProfile, parse_directive};
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Locale directive file parser
#[derive(Debug)]
pub struct LocaleParser;

impl LocaleParser {
    /// Parse a single locale file
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<LocaleProfile> {
        let file = std::fs::File::open(&path).map_err(|e| {
            HarvestError::LocaleError(format!("Cannot open file {}: {}", path.as_ref().display(), e))
        })?;

        let reader = BufReader::new(file);
        Self::parse_reader(reader)
    }

    /// Parse locale directives from a reader
    pub fn parse_reader<R: BufRead>(reader: R) -> Result<LocaleProfile> {
        let mut profile = LocaleProfile::new();

        for (index, line) in reader.lines().enumerate() {
            let line_number = index + 1;
            let line =
                line.map_err(|e| HarvestError::LocaleError(format!("Read error at line {}: {}", line_number, e)))?;
            Self::apply_line(&mut profile, &line, line_number)?;
        }

        Ok(profile)
    }

    /// Parse locale directives from a string
    pub fn parse_string(content: &str) -> Result<LocaleProfile> {
        let mut profile = LocaleProfile::new();

        for (index, line) in content.lines().enumerate() {
            Self::apply_line(&mut profile, line, index + 1)?;
        }

        Ok(profile)
    }

    fn apply_line(profile: &mut LocaleProfile, line: &str, line_number: usize) -> Result<()> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }

        match parse_directive(line) {
            Ok(directive) => {
                profile.add_directive(directive);
                Ok(())
            }
            Err(e) => Err(HarvestError::LocaleError(format!(
                "Parse error at line {}: {}",
                line_number, e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_string() {
        let content = r#"
# French vocabulary
skip_section: Bibliographie
skip_section: Liens externes
edit_label: modifier | modifier le code
category_prefix: Catégorie:
category_namespace: Catégorie
stopword: dans
"#;

        let profile = LocaleParser::parse_string(content).unwrap();

        assert_eq!(profile.skip_sections, vec!["bibliographie", "liens externes"]);
        assert_eq!(profile.edit_labels.len(), 1);
        assert_eq!(profile.category_prefixes, vec!["Catégorie:"]);
        assert_eq!(profile.category_namespace.as_deref(), Some("Catégorie"));
        assert!(profile.is_stopword("dans"));
    }

    #[test]
    fn test_parse_reader() {
        let reader = Cursor::new("paren_label: modifier\nmedia_prefix: Fichier\n");
        let profile = LocaleParser::parse_reader(reader).unwrap();

        assert_eq!(profile.paren_labels, vec!["modifier"]);
        assert_eq!(profile.media_prefixes, vec!["Fichier"]);
    }

    #[test]
    fn test_parse_error_reports_line() {
        let err = LocaleParser::parse_string("skip_section: Notes\nbogus line\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_parse_missing_file() {
        let result = LocaleParser::parse_file("/nonexistent/locale/xx.txt");
        assert!(matches!(result, Err(HarvestError::LocaleError(_))));
    }
}
