//! Extractor plugins.
//!
//! - [`Plugin`] - lifecycle and identity shared by every plugin
//! - [`DocumentExtractor`] - turns a file into an [`crate::types::ExtractionResult`]
//! - [`DocumentExtractorRegistry`] - builds the fallback chain for a MIME type
//!
//! Extractors for PDF or Word documents are supplied by the caller; the crate
//! ships the plain-text and HTML extractors in [`crate::extractors`].

mod extractor;
pub mod registry;
mod traits;

pub use extractor::{DEFAULT_PRIORITY, DocumentExtractor};
pub use registry::{DocumentExtractorRegistry, FallbackPolicy};
pub use traits::Plugin;
