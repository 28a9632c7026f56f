use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

// ============================================================================
// Extraction results
// ============================================================================

/// Normalized result returned by every document extractor.
///
/// Produced once per extraction run and consumed by the quality scorers,
/// the metrics accumulator and the image optimizer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Plain text content.
    pub content: String,
    /// Markup rendition of the content (HTML fragments for the built-in extractors).
    pub formatted_content: String,
    /// MIME type the extractor handled.
    pub mime_type: String,
    /// Image candidates in document order.
    #[serde(default)]
    pub images: Vec<ImageCandidate>,
    /// Structural hints reported by the extractor.
    #[serde(default)]
    pub format_info: FormatInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Creation timestamp (ISO 8601 format)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    /// Last modification timestamp (ISO 8601 format)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modification_date: Option<String>,
}

impl ExtractionResult {
    /// Create a result holding only text content.
    pub fn from_text(content: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            mime_type: mime_type.into(),
            ..Default::default()
        }
    }
}

/// Structural hints attached to an extraction result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatInfo {
    #[serde(default)]
    pub has_headers: bool,
    #[serde(default)]
    pub has_footers: bool,
    #[serde(default)]
    pub has_tables: bool,
    #[serde(default)]
    pub has_images: bool,
    /// Stylesheet text accompanying `formatted_content`.
    #[serde(default)]
    pub generated_css: String,
}

/// An image found by an extractor.
///
/// `data` is `None` when the extractor located the image but could not read
/// its bytes; the scorers treat that as a failed extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageCandidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<u8>>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl ImageCandidate {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            data: Some(data),
            name: name.into(),
            width: None,
            height: None,
        }
    }

    /// A candidate whose bytes could not be extracted.
    pub fn missing(name: impl Into<String>) -> Self {
        Self {
            data: None,
            name: name.into(),
            width: None,
            height: None,
        }
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Whether the candidate carries non-empty image bytes.
    pub fn has_data(&self) -> bool {
        self.data.as_ref().is_some_and(|data| !data.is_empty())
    }
}

// ============================================================================
// Documents
// ============================================================================

/// Processing status of a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Error,
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DocumentStatus::Pending => "pending",
            DocumentStatus::Processing => "processing",
            DocumentStatus::Completed => "completed",
            DocumentStatus::Error => "error",
        };
        f.write_str(label)
    }
}

/// Handle to a document record owned by a [`crate::store::DocumentStore`].
///
/// The processor only writes the derived fields below; creating and deleting
/// records is the store's business.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub path: PathBuf,
    pub status: DocumentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    pub extracted_content: String,
    pub formatted_content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modification_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,

    pub extraction_precision: f64,
    pub total_elements_detected: usize,
    pub total_elements_extracted: usize,
    pub text_extraction_quality: f64,
    pub image_extraction_quality: f64,
    pub table_extraction_quality: f64,
}

impl Document {
    pub fn new(id: impl Into<String>, title: impl Into<String>, path: impl AsRef<Path>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            path: path.as_ref().to_path_buf(),
            status: DocumentStatus::Pending,
            error_message: None,
            extracted_content: String::new(),
            formatted_content: String::new(),
            author: None,
            creation_date: None,
            modification_date: None,
            processed_at: None,
            extraction_precision: 0.0,
            total_elements_detected: 0,
            total_elements_extracted: 0,
            text_extraction_quality: 0.0,
            image_extraction_quality: 0.0,
            table_extraction_quality: 0.0,
        }
    }

    /// Copy content and metadata of an extraction result onto the document.
    pub(crate) fn apply_extraction(&mut self, result: &ExtractionResult) {
        self.extracted_content = result.content.clone();
        self.formatted_content = result.formatted_content.clone();
        self.author = result.author.clone();
        self.creation_date = result.creation_date.clone();
        self.modification_date = result.modification_date.clone();
    }
}

// ============================================================================
// Images ready for storage
// ============================================================================

/// Encoding chosen by the image optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    Jpeg,
    /// The input could not be decoded and was passed through untouched.
    Original,
}

impl OutputFormat {
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            OutputFormat::Png => Some("png"),
            OutputFormat::Jpeg => Some("jpg"),
            OutputFormat::Original => None,
        }
    }
}

/// An optimized image handed to the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredImage {
    pub file_name: String,
    pub name: String,
    pub position: usize,
    pub format: OutputFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip)]
    pub data: Vec<u8>,
}
