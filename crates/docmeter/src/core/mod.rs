//! Core pipeline: configuration, file access, type detection and orchestration.

pub mod config;
pub mod io;
pub mod mime;
pub mod processor;

pub use config::DocmeterConfig;
pub use mime::{TypeDetector, TypeSniffer, detect_mime_type};
pub use processor::{DocumentProcessor, ProcessingReport};
