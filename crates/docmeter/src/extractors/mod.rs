//! Built-in document extractors.
//!
//! PDF and Word extraction is left to caller-provided plugins; plain text and
//! HTML are handled here.

pub mod html;
pub mod text;

pub use html::HtmlExtractor;
pub use text::PlainTextExtractor;

use crate::Result;
use crate::plugins::DocumentExtractorRegistry;
use std::sync::Arc;

/// Register the built-in extractors with a registry.
pub fn register_default_extractors(registry: &mut DocumentExtractorRegistry) -> Result<()> {
    registry.register(Arc::new(PlainTextExtractor::new()))?;
    registry.register(Arc::new(HtmlExtractor::new()))?;
    Ok(())
}
