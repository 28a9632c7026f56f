//! MIME type detection.
//!
//! A [`TypeDetector`] asks an ordered list of [`TypeSniffer`]s and keeps the
//! first answer. The best available detector inspects magic bytes first and
//! falls back to an extension table; when every sniffer gives up the generic
//! binary type is returned, so detection never fails.

use crate::core::io::read_header;
use std::path::Path;

pub const PDF_MIME_TYPE: &str = "application/pdf";
pub const DOCX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const LEGACY_WORD_MIME_TYPE: &str = "application/msword";
pub const PLAIN_TEXT_MIME_TYPE: &str = "text/plain";
pub const HTML_MIME_TYPE: &str = "text/html";
pub const EXCEL_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const EXCEL_BINARY_MIME_TYPE: &str = "application/vnd.ms-excel";
pub const RTF_MIME_TYPE: &str = "application/rtf";
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Extension → MIME type table used when content sniffing is unavailable.
const EXTENSION_TABLE: [(&str, &str); 8] = [
    ("pdf", PDF_MIME_TYPE),
    ("docx", DOCX_MIME_TYPE),
    ("doc", LEGACY_WORD_MIME_TYPE),
    ("txt", PLAIN_TEXT_MIME_TYPE),
    ("html", HTML_MIME_TYPE),
    ("xlsx", EXCEL_MIME_TYPE),
    ("xls", EXCEL_BINARY_MIME_TYPE),
    ("rtf", RTF_MIME_TYPE),
];

/// Generic containers that Office formats are stored in.
const CONTAINER_MIME_TYPES: [&str; 3] = ["application/zip", "application/x-ole-storage", "application/x-cfb"];

const MAGIC_HEADER_LEN: usize = 8192;

/// Look a path's extension up in the fixed table, case-insensitively.
pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_lowercase();
    EXTENSION_TABLE
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
}

/// One strategy for guessing a file's MIME type.
pub trait TypeSniffer: Send + Sync {
    fn name(&self) -> &str;

    /// `None` when this strategy has no opinion.
    fn sniff(&self, path: &Path) -> Option<String>;
}

/// Content sniffing from the file header.
#[derive(Debug, Default, Clone, Copy)]
pub struct MagicSniffer;

impl TypeSniffer for MagicSniffer {
    fn name(&self) -> &str {
        "magic"
    }

    fn sniff(&self, path: &Path) -> Option<String> {
        let header = match read_header(path, MAGIC_HEADER_LEN) {
            Ok(header) => header,
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "Magic sniffing skipped");
                return None;
            }
        };

        let detected = infer::get(&header)?.mime_type();

        // DOCX/XLSX are zip archives and DOC/XLS are OLE storages on disk
        if CONTAINER_MIME_TYPES.contains(&detected) && mime_from_extension(path).is_some_and(is_office_type) {
            return None;
        }

        Some(detected.to_string())
    }
}

fn is_office_type(mime_type: &str) -> bool {
    matches!(
        mime_type,
        DOCX_MIME_TYPE | LEGACY_WORD_MIME_TYPE | EXCEL_MIME_TYPE | EXCEL_BINARY_MIME_TYPE
    )
}

/// Extension lookup in the fixed eight-entry table.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtensionSniffer;

impl TypeSniffer for ExtensionSniffer {
    fn name(&self) -> &str {
        "extension"
    }

    fn sniff(&self, path: &Path) -> Option<String> {
        mime_from_extension(path).map(str::to_string)
    }
}

/// Ordered chain of sniffers chosen at construction.
pub struct TypeDetector {
    sniffers: Vec<Box<dyn TypeSniffer>>,
}

impl TypeDetector {
    pub fn new(sniffers: Vec<Box<dyn TypeSniffer>>) -> Self {
        Self { sniffers }
    }

    /// Magic bytes first, then the extension table.
    pub fn best_available() -> Self {
        Self::new(vec![Box::new(MagicSniffer), Box::new(ExtensionSniffer)])
    }

    pub fn extension_only() -> Self {
        Self::new(vec![Box::new(ExtensionSniffer)])
    }

    pub fn sniffer_names(&self) -> Vec<&str> {
        self.sniffers.iter().map(|sniffer| sniffer.name()).collect()
    }

    /// Detect the MIME type of a file, defaulting to `application/octet-stream`.
    pub fn detect(&self, path: impl AsRef<Path>) -> String {
        let path = path.as_ref();
        for sniffer in &self.sniffers {
            if let Some(mime_type) = sniffer.sniff(path) {
                tracing::debug!(path = %path.display(), sniffer = sniffer.name(), mime_type = %mime_type, "MIME type detected");
                return mime_type;
            }
        }
        DEFAULT_MIME_TYPE.to_string()
    }
}

impl Default for TypeDetector {
    fn default() -> Self {
        Self::best_available()
    }
}

/// Detect a file's MIME type with the best available detector.
///
/// # Example
///
/// ```rust
/// use docmeter::core::mime::detect_mime_type;
///
/// // Missing files fall back to the extension table
/// assert_eq!(detect_mime_type("missing/report.PDF"), "application/pdf");
/// assert_eq!(detect_mime_type("missing/archive.xyz"), "application/octet-stream");
/// ```
pub fn detect_mime_type(path: impl AsRef<Path>) -> String {
    TypeDetector::best_available().detect(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_extension_table() {
        assert_eq!(mime_from_extension(Path::new("a.pdf")), Some(PDF_MIME_TYPE));
        assert_eq!(mime_from_extension(Path::new("a.DOCX")), Some(DOCX_MIME_TYPE));
        assert_eq!(mime_from_extension(Path::new("a.doc")), Some(LEGACY_WORD_MIME_TYPE));
        assert_eq!(mime_from_extension(Path::new("a.txt")), Some(PLAIN_TEXT_MIME_TYPE));
        assert_eq!(mime_from_extension(Path::new("a.html")), Some(HTML_MIME_TYPE));
        assert_eq!(mime_from_extension(Path::new("a.xlsx")), Some(EXCEL_MIME_TYPE));
        assert_eq!(mime_from_extension(Path::new("a.xls")), Some(EXCEL_BINARY_MIME_TYPE));
        assert_eq!(mime_from_extension(Path::new("a.rtf")), Some(RTF_MIME_TYPE));
        assert_eq!(mime_from_extension(Path::new("a.htm")), None);
        assert_eq!(mime_from_extension(Path::new("noext")), None);
    }

    #[test]
    fn test_extension_only_detector() {
        let detector = TypeDetector::extension_only();
        assert_eq!(detector.sniffer_names(), vec!["extension"]);
        assert_eq!(detector.detect("notes.txt"), PLAIN_TEXT_MIME_TYPE);
        assert_eq!(detector.detect("notes.md"), DEFAULT_MIME_TYPE);
    }

    #[test]
    fn test_magic_beats_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("actually_pdf.txt");
        fs::write(&path, b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n1 0 obj\n").unwrap();

        assert_eq!(detect_mime_type(&path), PDF_MIME_TYPE);
        assert_eq!(TypeDetector::extension_only().detect(&path), PLAIN_TEXT_MIME_TYPE);
    }

    #[test]
    fn test_plain_text_falls_back_to_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "just some words").unwrap();

        assert_eq!(detect_mime_type(&path), PLAIN_TEXT_MIME_TYPE);
    }

    #[test]
    fn test_zip_container_defers_to_office_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("letter.docx");
        // Local file header of an empty zip entry
        let mut bytes = b"PK\x03\x04".to_vec();
        bytes.extend_from_slice(&[0u8; 60]);
        fs::write(&path, &bytes).unwrap();

        assert_eq!(detect_mime_type(&path), DOCX_MIME_TYPE);
    }

    #[test]
    fn test_unknown_content_and_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        fs::write(&path, [0u8, 1, 2, 3]).unwrap();

        assert_eq!(detect_mime_type(&path), DEFAULT_MIME_TYPE);
    }
}
