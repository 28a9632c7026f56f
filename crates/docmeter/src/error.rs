//! Error types for Docmeter.
//!
//! All fallible operations return [`DocmeterError`] through the crate-wide
//! [`Result`] alias. Errors are built with `thiserror` and keep their source
//! chain through `#[source]` attributes.
//!
//! # Error Handling Philosophy
//!
//! **System errors bubble up unchanged:**
//! - `DocmeterError::Io` (from `std::io::Error`) covers file system and permission errors.
//!
//! **Quality problems are not errors.** A corrupt or partial extraction still
//! produces a (lower) score plus diagnostics; see [`crate::diagnostics`].
//!
//! **Application errors are wrapped with context:**
//! - `Parsing` - Document format errors, corrupt files
//! - `Validation` - Invalid configuration or parameters
//! - `ImageProcessing` - Decode/encode failures in the image pipeline
//! - `Persistence` - A document store rejected a write
//! - `NoExtractionResult` - Every extractor in the fallback chain failed
//!
//! # Example
//!
//! ```rust
//! use docmeter::{DocmeterError, Result};
//!
//! fn read_config(path: &str) -> Result<String> {
//!     // IO errors bubble up automatically via ?
//!     let content = std::fs::read_to_string(path)?;
//!
//!     if content.is_empty() {
//!         return Err(DocmeterError::validation(format!("Config file is empty: {}", path)));
//!     }
//!
//!     Ok(content)
//! }
//! ```
use thiserror::Error;

/// Result type alias using `DocmeterError`.
pub type Result<T> = std::result::Result<T, DocmeterError>;

/// Error returned by document extractors.
///
/// Extractors share the library error type so that I/O failures keep their
/// original variant when they bubble through a fallback chain.
pub type ExtractionError = DocmeterError;

/// Main error type for all Docmeter operations.
#[derive(Debug, Error)]
pub enum DocmeterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parsing error: {message}")]
    Parsing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Image processing error: {message}")]
    ImageProcessing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Persistence error: {message}")]
    Persistence {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Plugin error in '{plugin_name}': {message}")]
    Plugin { message: String, plugin_name: String },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("No extractor produced a result for '{mime_type}' ({attempts} attempted)")]
    NoExtractionResult { mime_type: String, attempts: usize },
}

impl From<serde_json::Error> for DocmeterError {
    fn from(err: serde_json::Error) -> Self {
        DocmeterError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<image::ImageError> for DocmeterError {
    fn from(err: image::ImageError) -> Self {
        DocmeterError::ImageProcessing {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl DocmeterError {
    error_constructor!(parsing, Parsing);
    error_constructor!(validation, Validation);
    error_constructor!(image_processing, ImageProcessing);
    error_constructor!(persistence, Persistence);
    error_constructor!(serialization, Serialization);
}
