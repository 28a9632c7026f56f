//! HTML extractor.

use crate::Result;
use crate::core::io::read_text_file;
use crate::error::ExtractionError;
use crate::image::extract_embedded_images;
use crate::plugins::{DocumentExtractor, Plugin};
use crate::types::{ExtractionResult, FormatInfo};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static SCRIPT_TAG_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("Script tag regex pattern is valid and should compile")
});
static STYLE_TAG_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<style[^>]*>(.*?)</style>").expect("Style tag regex pattern is valid and should compile")
});
static COMMENT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("Comment regex pattern is valid and should compile"));
static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("Tag regex pattern is valid and should compile"));
static IMG_OPEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<img\b").expect("Image tag regex pattern is valid and should compile"));
static TABLE_OPEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<table\b").expect("Table tag regex pattern is valid and should compile"));
static TITLE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("Title regex pattern is valid and should compile"));
static META_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("Meta tag regex pattern is valid and should compile"));
static META_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bname\s*=\s*["']([^"']*)["']"#).expect("Meta name regex pattern is valid and should compile")
});
static META_CONTENT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)\bcontent\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("Meta content regex pattern is valid and should compile")
});

/// HTML extractor.
///
/// The formatted content is the markup itself. Visible text excludes script
/// and style bodies; style bodies become the generated CSS.
pub struct HtmlExtractor;

impl HtmlExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HtmlExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for HtmlExtractor {
    fn name(&self) -> &str {
        "html-extractor"
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    fn description(&self) -> &str {
        "Extracts text, inline styles and embedded images from HTML documents"
    }
}

impl DocumentExtractor for HtmlExtractor {
    #[tracing::instrument(skip(self), fields(extractor.name = self.name()))]
    fn extract_file(&self, path: &Path, mime_type: &str) -> std::result::Result<ExtractionResult, ExtractionError> {
        let (html, _encoding) = read_text_file(path)?;
        Ok(parse_html(&html, mime_type))
    }

    fn supported_mime_types(&self) -> &[&str] {
        &["text/html", "application/xhtml+xml"]
    }
}

/// Turn HTML markup into an extraction result.
pub fn parse_html(html: &str, mime_type: &str) -> ExtractionResult {
    let generated_css: String = STYLE_TAG_PATTERN
        .captures_iter(html)
        .filter_map(|captures| captures.get(1))
        .map(|body| body.as_str())
        .collect();

    let images = extract_embedded_images(html);
    let (author, creation_date, modification_date) = meta_fields(html);

    ExtractionResult {
        content: visible_text(html),
        formatted_content: html.to_string(),
        mime_type: mime_type.to_string(),
        images,
        format_info: FormatInfo {
            has_headers: false,
            has_footers: false,
            has_tables: TABLE_OPEN_PATTERN.is_match(html),
            has_images: IMG_OPEN_PATTERN.is_match(html),
            generated_css,
        },
        title: TITLE_PATTERN
            .captures(html)
            .and_then(|captures| captures.get(1))
            .map(|title| decode_entities(title.as_str().trim()))
            .filter(|title| !title.is_empty()),
        author,
        creation_date,
        modification_date,
    }
}

fn visible_text(html: &str) -> String {
    let text = COMMENT_PATTERN.replace_all(html, "");
    let text = SCRIPT_TAG_PATTERN.replace_all(&text, "");
    let text = STYLE_TAG_PATTERN.replace_all(&text, "");
    let text = TAG_PATTERN.replace_all(&text, "");
    decode_entities(&text)
}

type MetaFields = (Option<String>, Option<String>, Option<String>);

fn meta_fields(html: &str) -> MetaFields {
    let mut author = None;
    let mut created = None;
    let mut modified = None;

    for tag in META_PATTERN.find_iter(html) {
        let tag = tag.as_str();
        let Some(name) = META_NAME_PATTERN.captures(tag).and_then(|c| c.get(1)) else {
            continue;
        };
        let Some(content) = META_CONTENT_PATTERN
            .captures(tag)
            .and_then(|c| c.get(1).or_else(|| c.get(2)))
            .map(|m| decode_entities(m.as_str().trim()))
            .filter(|content| !content.is_empty())
        else {
            continue;
        };

        match name.as_str().to_ascii_lowercase().as_str() {
            "author" | "dc.creator" => author = author.or(Some(content)),
            "date" | "dcterms.created" | "created" => created = created.or(Some(content)),
            "dcterms.modified" | "last-modified" | "modified" => modified = modified.or(Some(content)),
            _ => {}
        }
    }

    (author, created, modified)
}

/// Decode numeric and named character references.
pub fn decode_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}
