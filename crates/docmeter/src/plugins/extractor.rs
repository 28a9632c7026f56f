//! Document extractor plugin trait.

use crate::error::ExtractionError;
use crate::plugins::Plugin;
use crate::types::ExtractionResult;
use std::path::Path;

/// Default priority of an extractor.
pub const DEFAULT_PRIORITY: i32 = 50;

/// A format-specific extractor.
///
/// Extractors are opaque to the pipeline: they turn a file into an
/// [`ExtractionResult`] or fail. A failure moves the processor on to the next
/// strategy of the fallback chain.
///
/// # Example
///
/// ```rust
/// use docmeter::plugins::{DocumentExtractor, Plugin};
/// use docmeter::types::ExtractionResult;
/// use docmeter::{ExtractionError, Result};
/// use std::path::Path;
///
/// struct CsvExtractor;
///
/// impl Plugin for CsvExtractor {
///     fn name(&self) -> &str { "csv-extractor" }
///     fn version(&self) -> String { "1.0.0".to_string() }
///     fn initialize(&self) -> Result<()> { Ok(()) }
///     fn shutdown(&self) -> Result<()> { Ok(()) }
/// }
///
/// impl DocumentExtractor for CsvExtractor {
///     fn extract_file(&self, path: &Path, mime_type: &str) -> std::result::Result<ExtractionResult, ExtractionError> {
///         let content = std::fs::read_to_string(path)?;
///         Ok(ExtractionResult::from_text(content, mime_type))
///     }
///
///     fn supported_mime_types(&self) -> &[&str] {
///         &["text/csv"]
///     }
/// }
/// ```
pub trait DocumentExtractor: Plugin {
    /// Extract content from a file on disk.
    fn extract_file(&self, path: &Path, mime_type: &str) -> std::result::Result<ExtractionResult, ExtractionError>;

    /// MIME types this extractor handles. Entries ending in `/*` match a whole family.
    fn supported_mime_types(&self) -> &[&str];

    /// Higher priorities are tried first.
    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;

    struct Failing;

    impl Plugin for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn version(&self) -> String {
            "1.0.0".to_string()
        }

        fn initialize(&self) -> Result<()> {
            Ok(())
        }

        fn shutdown(&self) -> Result<()> {
            Ok(())
        }
    }

    impl DocumentExtractor for Failing {
        fn extract_file(&self, path: &Path, _mime_type: &str) -> std::result::Result<ExtractionResult, ExtractionError> {
            Err(ExtractionError::parsing(format!("cannot parse {}", path.display())))
        }

        fn supported_mime_types(&self) -> &[&str] {
            &["application/msword"]
        }
    }

    #[test]
    fn test_default_priority() {
        assert_eq!(Failing.priority(), DEFAULT_PRIORITY);
    }

    #[test]
    fn test_extract_failure_is_error() {
        let err = Failing.extract_file(Path::new("report.doc"), "application/msword").unwrap_err();
        assert!(err.to_string().contains("report.doc"));
    }
}
