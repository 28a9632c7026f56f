//! Plain text extractor.

use crate::Result;
use crate::core::io::read_text_file;
use crate::error::ExtractionError;
use crate::plugins::{DocumentExtractor, Plugin};
use crate::types::{ExtractionResult, FormatInfo};
use std::path::Path;

pub(crate) const TEXT_DOCUMENT_CSS: &str = ".text-document { font-family: monospace; white-space: pre-wrap; }";

/// Plain text extractor.
///
/// Reads the file with the UTF-8 → Latin-1 → Windows-1252 chain and wraps
/// it in preformatted markup. It is also the last resort of every fallback
/// chain except PDF, so it accepts whatever MIME type it is handed.
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlainTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for PlainTextExtractor {
    fn name(&self) -> &str {
        "plain-text-extractor"
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
        "Extracts content from plain text files"
    }
}

impl DocumentExtractor for PlainTextExtractor {
    #[tracing::instrument(skip(self), fields(extractor.name = self.name()))]
    fn extract_file(&self, path: &Path, mime_type: &str) -> std::result::Result<ExtractionResult, ExtractionError> {
        let (content, encoding) = read_text_file(path)?;
        tracing::debug!(encoding = encoding.label(), chars = content.chars().count(), "Decoded text file");

        Ok(text_result(content, mime_type))
    }

    fn supported_mime_types(&self) -> &[&str] {
        &["text/plain"]
    }
}

/// Build the result of a plain-text extraction from decoded content.
pub(crate) fn text_result(content: String, mime_type: &str) -> ExtractionResult {
    let formatted_content = format!(
        "<div class=\"text-document\"><pre>{}</pre></div>",
        escape_html(&content).replace('\n', "<br>\n")
    );

    ExtractionResult {
        content,
        formatted_content,
        mime_type: mime_type.to_string(),
        format_info: FormatInfo {
            generated_css: TEXT_DOCUMENT_CSS.to_string(),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
