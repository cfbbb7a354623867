//! Text normalization: HTML flattening and wiki artifact removal.
//!
//! Both transforms are pure and order-sensitive: [`html_to_text`] runs on
//! rendered markup, [`clean_artifacts`] on the flattened text. Each repeats
//! its passes until the text stops changing, so running either twice gives
//! the same result as running it once.

use std::sync::LazyLock;

use regex::Regex;

use crate::Result;
use crate::locale::LocaleProfile;

static STYLE_BLOCK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").unwrap());
static SCRIPT_BLOCK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap());
static CSS_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.mw-parser-output\s+\.[^{]+\{[^}]+\}").unwrap());
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(nbsp|lt|gt|amp|quot|apos|#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6});").unwrap());
static FOOTNOTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\d+\]").unwrap());
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

static BUILTIN: LazyLock<Normalizer> = LazyLock::new(|| Normalizer::new(&LocaleProfile::builtin("tr")).unwrap());

/// Flatten rendered markup to a single line of plain text.
///
/// Removes `<style>`/`<script>` blocks, `.mw-parser-output` CSS rules and
/// tags, collapses whitespace, decodes `nbsp lt gt amp quot apos` plus
/// numeric character references, and trims.
pub fn html_to_text(markup: &str) -> String {
    let mut text = flatten_once(markup);
    // every pass either shrinks the text or only normalizes whitespace
    loop {
        let next = flatten_once(&text);
        if next == text {
            return text;
        }
        text = next;
    }
}

/// Remove wiki artifacts using the built-in Turkish and English vocabulary.
pub fn clean_artifacts(text: &str) -> String {
    BUILTIN.clean_artifacts(text)
}

fn flatten_once(markup: &str) -> String {
    let text = STYLE_BLOCK.replace_all(markup, " ");
    let text = SCRIPT_BLOCK.replace_all(&text, " ");
    let text = CSS_RULE.replace_all(&text, " ");
    let text = TAG.replace_all(&text, " ");
    let text = WHITESPACE.replace_all(&text, " ");
    let text = decode_entities(&text);
    text.trim().to_string()
}

/// Decode the supported named entities and numeric references in a single pass
fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures| match &caps[1] {
            "nbsp" => " ".to_string(),
            "lt" => "<".to_string(),
            "gt" => ">".to_string(),
            "amp" => "&".to_string(),
            "quot" => "\"".to_string(),
            "apos" => "'".to_string(),
            numeric => numeric_reference(numeric).map(String::from).unwrap_or_else(|| caps[0].to_string()),
        })
        .to_string()
}

/// `#91` or `#x5B` to its character
fn numeric_reference(reference: &str) -> Option<char> {
    let digits = reference.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(code)
}

/// Artifact remover compiled from a locale profile.
#[derive(Debug, Clone)]
pub struct Normalizer {
    edit_labels: Option<Regex>,
    paren_labels: Option<Regex>,
    media_refs: Option<Regex>,
}

impl Normalizer {
    /// Compile the localized artifact patterns of a profile.
    pub fn new(profile: &LocaleProfile) -> Result<Self> {
        let edit_labels = alternation(profile.edit_labels.iter().map(|(left, right)| {
            format!(r"\[\s*{}\s*\|\s*{}\s*\]", phrase_pattern(left), phrase_pattern(right))
        }))?;

        let paren_labels =
            alternation(profile.paren_labels.iter().map(|label| format!(r"(?i:\(\s*{}\s*\))", phrase_pattern(label))))?;

        let media_refs = if profile.media_prefixes.is_empty() {
            None
        } else {
            let prefixes: Vec<String> = profile.media_prefixes.iter().map(|p| regex::escape(p)).collect();
            Some(Regex::new(&format!(r"(?:{}):[^\]]+\]", prefixes.join("|")))?)
        };

        Ok(Self { edit_labels, paren_labels, media_refs })
    }

    /// Flatten rendered markup; see [`html_to_text`].
    pub fn html_to_text(&self, markup: &str) -> String {
        html_to_text(markup)
    }

    /// Remove edit labels, stylesheet fragments, media fragments and
    /// footnote markers, then collapse runs of blank lines.
    pub fn clean_artifacts(&self, text: &str) -> String {
        let mut text = self.clean_once(text);
        // every pass removes text, so this reaches a fixed point
        loop {
            let next = self.clean_once(&text);
            if next == text {
                return text;
            }
            text = next;
        }
    }

    fn clean_once(&self, text: &str) -> String {
        let mut cleaned = text.to_string();

        for pattern in [&self.edit_labels, &self.paren_labels].into_iter().flatten() {
            cleaned = pattern.replace_all(&cleaned, "").to_string();
        }

        cleaned = CSS_RULE.replace_all(&cleaned, "").to_string();

        if let Some(media_refs) = &self.media_refs {
            cleaned = media_refs.replace_all(&cleaned, "").to_string();
        }

        cleaned = FOOTNOTE.replace_all(&cleaned, "").to_string();
        BLANK_LINES.replace_all(&cleaned, "\n\n").to_string()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        BUILTIN.clone()
    }
}

/// Escape a phrase, letting any run of whitespace match its spaces
fn phrase_pattern(phrase: &str) -> String {
    phrase.split_whitespace().map(regex::escape).collect::<Vec<_>>().join(r"\s+")
}

fn alternation(patterns: impl Iterator<Item = String>) -> Result<Option<Regex>> {
    let patterns: Vec<String> = patterns.collect();
    if patterns.is_empty() {
        return Ok(None);
    }
    Ok(Some(Regex::new(&patterns.join("|"))?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::LocaleDirective;
    use rstest::rstest;

    fn has_tag(text: &str) -> bool {
        TAG.is_match(text)
    }

    fn has_entity(text: &str) -> bool {
        ["&nbsp;", "&lt;", "&gt;", "&amp;", "&quot;", "&apos;"].iter().any(|e| text.contains(e))
    }

    #[test]
    fn test_html_to_text_basic() {
        let html = "<p>Ankara, <b>Türkiye</b>'nin başkentidir.</p>\n<p>İkinci   paragraf.</p>";
        assert_eq!(html_to_text(html), "Ankara, Türkiye 'nin başkentidir. İkinci paragraf.");
    }

    #[test]
    fn test_html_to_text_removes_style_and_css() {
        let html = r#"<style data-mw-deduplicate="x">.mw-parser-output .hatnote{font-style:italic}</style><div>Metin</div>.mw-parser-output .navbox{display:none} son"#;
        assert_eq!(html_to_text(html), "Metin son");
    }

    #[test]
    fn test_html_to_text_decodes_entities() {
        assert_eq!(html_to_text("Tom&nbsp;&amp;&nbsp;Jerry &quot;x&quot; &apos;y&apos;"), "Tom & Jerry \"x\" 'y'");
        assert_eq!(html_to_text("a &lt; b"), "a < b");
    }

    #[rstest]
    #[case("&lt;b&gt;bold&lt;/b&gt;")]
    #[case("&amp;lt;script&amp;gt;")]
    #[case("&amp;amp;nbsp;")]
    #[case("<div><span>x</span></div><style>p{}</style>")]
    #[case("<scr<b>ipt>alert(1)</script>")]
    #[case("1 &lt; 2 &gt; 0")]
    fn test_html_to_text_never_leaves_tags_or_entities(#[case] input: &str) {
        let text = html_to_text(input);
        assert!(!has_tag(&text), "tag left in {:?}", text);
        assert!(!has_entity(&text), "entity left in {:?}", text);
    }

    #[test]
    fn test_html_to_text_numeric_references() {
        assert_eq!(html_to_text("<sup>&#91;1&#93;</sup> &#x131;"), "[1] ı");
        assert_eq!(html_to_text("&#60;b&#62;x&#60;/b&#62;"), "x");
        assert_eq!(html_to_text("&#1114112;"), "&#1114112;");
    }

    #[test]
    fn test_html_to_text_idempotent() {
        let once = html_to_text("<p>Ankara &amp; İstanbul</p>");
        assert_eq!(html_to_text(&once), once);
    }

    #[test]
    fn test_clean_edit_labels() {
        let text = "Tarihçe[değiştir | kaynağı değiştir]\nHistory[edit | edit source] (düzenle) (Edit)";
        assert_eq!(clean_artifacts(text), "Tarihçe\nHistory  ");
    }

    #[test]
    fn test_clean_media_and_footnotes() {
        let text = "Kale[1] çok eskidir.[23] Dosya:Kale.jpg|küçük] Resim File:A.png] Media:Ses.ogg]";
        assert_eq!(clean_artifacts(text), "Kale çok eskidir.  Resim  ");
    }

    #[test]
    fn test_clean_collapses_blank_lines() {
        assert_eq!(clean_artifacts("a\n\n\n\nb\n\n\nc"), "a\n\nb\n\nc");
    }

    #[rstest]
    #[case("[1[2]]")]
    #[case("a\n\n[3]\n\nb")]
    #[case("x[[12]4]y\n\n\n\n\nz")]
    #[case("[değiştir | kaynağı değiştir]\n\n\n[1]")]
    fn test_clean_properties(#[case] input: &str) {
        let cleaned = clean_artifacts(input);
        assert!(!FOOTNOTE.is_match(&cleaned), "footnote left in {:?}", cleaned);
        assert!(!cleaned.contains("\n\n\n"), "blank lines left in {:?}", cleaned);
        assert_eq!(clean_artifacts(&cleaned), cleaned);
    }

    #[test]
    fn test_clean_keeps_plain_text() {
        let text = "# Ankara\n\nAnkara Türkiye'nin başkentidir.\n\n## Tarihçe\n\nEski bir şehirdir.";
        assert_eq!(clean_artifacts(text), text);
    }

    #[test]
    fn test_custom_profile_labels() {
        let mut profile = LocaleProfile::new();
        profile.add_directive(LocaleDirective::EditLabel("modifier".into(), "modifier le code".into()));
        profile.add_directive(LocaleDirective::MediaPrefix("Fichier".into()));
        let normalizer = Normalizer::new(&profile).unwrap();

        let cleaned = normalizer.clean_artifacts("Histoire[modifier | modifier le code] Fichier:x.jpg] fin[4]");
        assert_eq!(cleaned, "Histoire  fin");
    }

    #[test]
    fn test_empty_profile_only_generic_rules() {
        let normalizer = Normalizer::new(&LocaleProfile::new()).unwrap();
        assert_eq!(normalizer.clean_artifacts("a[edit | edit source][5]"), "a[edit | edit source]");
    }
}
