//! Structured extraction diagnostics.
//!
//! Quality problems detected while scoring an extraction are recorded as
//! immutable [`DiagnosticRecord`]s in a [`DiagnosticLog`]. The log belongs to a
//! single extraction run and is flushed to the document store at the end of it.
//!
//! When a diagnostic does not carry its own remediation, one is derived from a
//! fixed table keyed by [`ErrorType`]: the first two entries, joined by `"; "`.
//!
//! ```rust
//! use docmeter::diagnostics::{Diagnostic, DiagnosticLog, ErrorType, Severity};
//!
//! let mut log = DiagnosticLog::new();
//! log.log(Diagnostic::new(ErrorType::Encoding, Severity::Medium, "3 corrupted characters"));
//!
//! let record = &log.records()[0];
//! assert_eq!(record.page_number(), 1);
//! assert_eq!(
//!     record.suggested_fix(),
//!     "Re-encode the document as UTF-8; Use OCR with automatic encoding detection"
//! );
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of an extraction problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    Encoding,
    LayoutAnalysis,
    TextOcr,
    ImageExtraction,
    TableParsing,
    FontDetection,
    Other,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Encoding => "encoding",
            ErrorType::LayoutAnalysis => "layout_analysis",
            ErrorType::TextOcr => "text_ocr",
            ErrorType::ImageExtraction => "image_extraction",
            ErrorType::TableParsing => "table_parsing",
            ErrorType::FontDetection => "font_detection",
            ErrorType::Other => "other",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const ENCODING_FIXES: [&str; 3] = [
    "Re-encode the document as UTF-8",
    "Use OCR with automatic encoding detection",
    "Convert the document to PDF before extraction",
];

const IMAGE_EXTRACTION_FIXES: [&str; 3] = [
    "Increase the DPI used for image extraction",
    "Apply an image enhancement algorithm",
    "Convert images to a standard format (PNG/JPEG)",
];

const TABLE_PARSING_FIXES: [&str; 3] = [
    "Pre-process the page with border detection",
    "Use a specialised algorithm for complex tables",
    "Convert to a format with a structured grid",
];

const TEXT_OCR_FIXES: [&str; 3] = [
    "Apply an image denoising filter",
    "Use a more advanced OCR model",
    "Improve the resolution of the source document",
];

const LAYOUT_ANALYSIS_FIXES: [&str; 3] = [
    "Apply automatic column detection",
    "Use a page segmentation algorithm",
    "Re-analyse with text zone detection",
];

const FONT_DETECTION_FIXES: [&str; 3] = [
    "Normalise fonts to standard equivalents",
    "Use a font substitution library",
    "Convert to a uniform text format",
];

const GENERIC_FIXES: [&str; 3] = [
    "Reprocess the document with tuned parameters",
    "Use an alternative processor",
    "Check the integrity of the source file",
];

/// Remediation suggestions for an error category, most relevant first.
pub fn suggested_fixes(error_type: ErrorType) -> &'static [&'static str; 3] {
    match error_type {
        ErrorType::Encoding => &ENCODING_FIXES,
        ErrorType::ImageExtraction => &IMAGE_EXTRACTION_FIXES,
        ErrorType::TableParsing => &TABLE_PARSING_FIXES,
        ErrorType::TextOcr => &TEXT_OCR_FIXES,
        ErrorType::LayoutAnalysis => &LAYOUT_ANALYSIS_FIXES,
        ErrorType::FontDetection => &FONT_DETECTION_FIXES,
        ErrorType::Other => &GENERIC_FIXES,
    }
}

/// The remediation used when a diagnostic does not supply one.
pub fn auto_suggested_fix(error_type: ErrorType) -> String {
    suggested_fixes(error_type)[..2].join("; ")
}

/// A diagnostic about to be logged.
///
/// Optional fields left unset are resolved by [`DiagnosticLog::log`].
#[derive(Debug, Clone)]
pub struct Diagnostic {
    error_type: ErrorType,
    severity: Severity,
    message: String,
    details: Option<serde_json::Value>,
    page_number: Option<u32>,
    element_type: Option<String>,
    suggested_fix: Option<String>,
}

impl Diagnostic {
    pub fn new(error_type: ErrorType, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            error_type,
            severity,
            message: message.into(),
            details: None,
            page_number: None,
            element_type: None,
            suggested_fix: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_page(mut self, page_number: u32) -> Self {
        self.page_number = Some(page_number);
        self
    }

    pub fn with_element_type(mut self, element_type: impl Into<String>) -> Self {
        self.element_type = Some(element_type.into());
        self
    }

    pub fn with_suggested_fix(mut self, suggested_fix: impl Into<String>) -> Self {
        self.suggested_fix = Some(suggested_fix.into());
        self
    }
}

/// An immutable record of one detected quality problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    error_type: ErrorType,
    severity: Severity,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    page_number: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    element_type: Option<String>,
    suggested_fix: String,
}

impl DiagnosticRecord {
    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&serde_json::Value> {
        self.details.as_ref()
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn element_type(&self) -> Option<&str> {
        self.element_type.as_deref()
    }

    pub fn suggested_fix(&self) -> &str {
        &self.suggested_fix
    }
}

/// Ordered diagnostics of one extraction run.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticLog {
    records: Vec<DiagnosticRecord>,
    current_page: Option<u32>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Page attributed to diagnostics that do not name one.
    pub fn set_current_page(&mut self, page: u32) {
        self.current_page = Some(page);
    }

    pub fn current_page(&self) -> u32 {
        self.current_page.unwrap_or(1)
    }

    /// Append a diagnostic, resolving its page and remediation.
    pub fn log(&mut self, diagnostic: Diagnostic) {
        let page_number = diagnostic.page_number.unwrap_or_else(|| self.current_page());
        let suggested_fix = diagnostic
            .suggested_fix
            .unwrap_or_else(|| auto_suggested_fix(diagnostic.error_type));

        tracing::debug!(
            error_type = %diagnostic.error_type,
            severity = %diagnostic.severity,
            page = page_number,
            message = %diagnostic.message,
            "Extraction diagnostic recorded"
        );

        self.records.push(DiagnosticRecord {
            error_type: diagnostic.error_type,
            severity: diagnostic.severity,
            message: diagnostic.message,
            details: diagnostic.details,
            page_number,
            element_type: diagnostic.element_type,
            suggested_fix,
        });
    }

    pub fn records(&self) -> &[DiagnosticRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.records.iter().filter(|r| r.severity == severity).count()
    }

    pub fn count_by_type(&self, error_type: ErrorType) -> usize {
        self.records.iter().filter(|r| r.error_type == error_type).count()
    }

    /// Take all records out of the log, leaving it empty.
    pub fn drain(&mut self) -> Vec<DiagnosticRecord> {
        std::mem::take(&mut self.records)
    }
}
