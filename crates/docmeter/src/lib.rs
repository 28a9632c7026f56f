//! Docmeter - Document Extraction Quality Assessment
//!
//! Docmeter runs document extractors and tells you how far to trust what they
//! returned. Each extraction is scored for text, image and table quality,
//! failure modes are recorded as structured diagnostics with suggested fixes,
//! and everything is folded into a single precision metric. Extracted images
//! are normalized for storage along the way.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use docmeter::{DocmeterConfig, DocumentProcessor, Document, InMemoryDocumentStore};
//!
//! # fn main() -> docmeter::Result<()> {
//! let processor = DocumentProcessor::new(DocmeterConfig::default())?;
//! let store = InMemoryDocumentStore::new();
//! let mut document = Document::new("1", "Quarterly report", "report.html");
//!
//! let report = processor.process(&mut document, &store)?;
//! println!("precision: {}%", report.precision);
//! for record in &report.metrics.errors {
//!     println!("[{}] {}: {}", record.severity(), record.error_type(), record.message());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Core Module** (`core`): configuration, MIME detection and the orchestrating processor
//! - **Plugins** (`plugins`): extractor traits and the registry that builds fallback chains
//! - **Quality** (`quality`): text, image and table scoring
//! - **Diagnostics** (`diagnostics`): structured records with auto-suggested fixes
//! - **Metrics** (`metrics`): per-run counters and the precision metric
//! - **Image** (`image`): resizing, enhancement and re-encoding of extracted images
//! - **Store** (`store`): the persistence interface and an in-memory implementation

#![deny(unsafe_code)]

pub mod core;
pub mod diagnostics;
pub mod error;
pub mod extractors;
pub mod image;
pub mod metrics;
pub mod plugins;
pub mod quality;
pub mod store;
pub mod text;
pub mod types;

pub use error::{DocmeterError, ExtractionError, Result};
pub use types::*;

pub use crate::core::config::{DocmeterConfig, EnhanceOptions, ImageOptimizerConfig, QualityConfig, WebImageConfig};
pub use crate::core::mime::{TypeDetector, detect_mime_type};
pub use crate::core::processor::{DocumentProcessor, ProcessingReport};
pub use diagnostics::{Diagnostic, DiagnosticLog, DiagnosticRecord, ErrorType, Severity};
pub use metrics::{ExtractionMetrics, MetricsAccumulator};
pub use plugins::{DocumentExtractor, DocumentExtractorRegistry, Plugin};
pub use quality::QualityScorer;
pub use store::{DocumentStore, InMemoryDocumentStore};
