//! Extraction orchestration.
//!
//! [`DocumentProcessor::process`] drives one extraction run:
//!
//! 1. mark the document as processing
//! 2. detect the MIME type
//! 3. try the extractor chain for that type until one succeeds
//! 4. persist content, format info and optimized images
//! 5. score the result and finalize the metrics into the document
//!
//! Only the absence of any extraction result is fatal: the document is marked
//! as failed and [`DocmeterError::NoExtractionResult`] is returned. Store
//! failures are logged and never interrupt the run.

use crate::core::config::DocmeterConfig;
use crate::core::mime::TypeDetector;
use crate::diagnostics::{Diagnostic, ErrorType, Severity};
use crate::image::ImageOptimizer;
use crate::metrics::{ExtractionMetrics, MetricsAccumulator};
use crate::plugins::DocumentExtractorRegistry;
use crate::store::DocumentStore;
use crate::types::{Document, DocumentStatus, ExtractionResult, ImageCandidate, StoredImage};
use crate::{DocmeterError, Result};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::{info, instrument, warn};

/// Outcome of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingReport {
    pub document_id: String,
    pub mime_type: String,
    /// Name of the extractor that produced the result.
    pub extractor: String,
    /// Extractors tried, including the successful one.
    pub attempts: usize,
    pub precision: f64,
    pub images_saved: usize,
    pub metrics: ExtractionMetrics,
}

/// Drives the extraction and quality assessment of documents.
///
/// # Example
///
/// ```rust,no_run
/// use docmeter::core::config::DocmeterConfig;
/// use docmeter::core::processor::DocumentProcessor;
/// use docmeter::store::InMemoryDocumentStore;
/// use docmeter::types::Document;
///
/// # fn main() -> docmeter::Result<()> {
/// let processor = DocumentProcessor::new(DocmeterConfig::default())?;
/// let store = InMemoryDocumentStore::new();
/// let mut document = Document::new("42", "Notes", "notes.txt");
///
/// let report = processor.process(&mut document, &store)?;
/// println!("precision: {}%", report.precision);
/// # Ok(())
/// # }
/// ```
pub struct DocumentProcessor {
    config: DocmeterConfig,
    detector: TypeDetector,
    registry: DocumentExtractorRegistry,
    optimizer: ImageOptimizer,
}

impl DocumentProcessor {
    /// Processor with the best available type detector and the built-in extractors.
    ///
    /// # Errors
    ///
    /// Returns `DocmeterError::Validation` when the configuration is invalid.
    pub fn new(config: DocmeterConfig) -> Result<Self> {
        config.validate()?;
        let registry = DocumentExtractorRegistry::with_defaults()?;
        Ok(Self::with_components(config, TypeDetector::best_available(), registry))
    }

    pub fn with_components(config: DocmeterConfig, detector: TypeDetector, registry: DocumentExtractorRegistry) -> Self {
        let optimizer = ImageOptimizer::new(&config);
        Self {
            config,
            detector,
            registry,
            optimizer,
        }
    }

    pub fn config(&self) -> &DocmeterConfig {
        &self.config
    }

    pub fn registry(&self) -> &DocumentExtractorRegistry {
        &self.registry
    }

    /// Register additional extractors (PDF, Word, ...) here.
    pub fn registry_mut(&mut self) -> &mut DocumentExtractorRegistry {
        &mut self.registry
    }

    pub fn detect_file_type(&self, document: &Document) -> String {
        self.detector.detect(&document.path)
    }

    /// Run the pipeline for one document.
    ///
    /// # Errors
    ///
    /// Returns `DocmeterError::NoExtractionResult` when every extractor failed;
    /// the document status is then `Error` with a message attached.
    #[instrument(skip(self, document, store), fields(document_id = %document.id, path = %document.path.display()))]
    pub fn process(&self, document: &mut Document, store: &dyn DocumentStore) -> Result<ProcessingReport> {
        info!(title = %document.title, "Processing document");
        self.set_status(document, store, DocumentStatus::Processing, None);

        let mime_type = self.detect_file_type(document);
        info!(mime_type = %mime_type, "Detected file type");

        let mut metrics = MetricsAccumulator::new(&self.config);
        let chain = self.registry.chain_for(&mime_type);
        let mut attempts = 0usize;
        let mut last_error: Option<DocmeterError> = None;
        let mut extracted: Option<(String, ExtractionResult)> = None;

        for extractor in &chain {
            attempts += 1;
            match extractor.extract_file(&document.path, &mime_type) {
                Ok(result) => {
                    extracted = Some((extractor.name().to_string(), result));
                    break;
                }
                Err(cause) => {
                    let err = DocmeterError::Plugin {
                        message: cause.to_string(),
                        plugin_name: extractor.name().to_string(),
                    };
                    warn!(error = %err, "Extractor failed, trying next strategy");
                    metrics.diagnostics_mut().log(
                        Diagnostic::new(ErrorType::Other, Severity::Low, err.to_string())
                            .with_details(json!({ "extractor": extractor.name(), "mime_type": mime_type }))
                            .with_element_type("document"),
                    );
                    last_error = Some(err);
                }
            }
        }

        let Some((extractor_name, result)) = extracted else {
            let err = DocmeterError::NoExtractionResult {
                mime_type: mime_type.clone(),
                attempts,
            };
            let message = match &last_error {
                Some(cause) => format!("Processing failed: {} (last error: {})", err, cause),
                None => format!("Processing failed: {}", err),
            };
            warn!(error = %message, "Document processing failed");
            self.set_status(document, store, DocumentStatus::Error, Some(message));
            if let Err(save_err) = store.save_document_fields(document) {
                warn!(error = %save_err, "Failed to save failed document");
            }
            return Err(err);
        };

        document.apply_extraction(&result);
        document.processed_at = Some(Utc::now());
        self.set_status(document, store, DocumentStatus::Completed, None);
        info!(
            extractor = %extractor_name,
            chars = document.extracted_content.chars().count(),
            "Document extracted"
        );

        if let Err(err) = store.save_format_info(&document.id, &result.format_info) {
            warn!(error = %err, "Failed to save format info");
        }

        let images_saved = self.save_images(document, &result.images, store);

        metrics.update(&result);
        let snapshot = metrics.snapshot();
        let precision = metrics.finalize(document, store);

        info!(
            precision,
            diagnostics = snapshot.errors.len(),
            images_saved,
            "Document processed"
        );

        Ok(ProcessingReport {
            document_id: document.id.clone(),
            mime_type,
            extractor: extractor_name,
            attempts,
            precision,
            images_saved,
            metrics: snapshot,
        })
    }

    fn set_status(
        &self,
        document: &mut Document,
        store: &dyn DocumentStore,
        status: DocumentStatus,
        error_message: Option<String>,
    ) {
        document.status = status;
        document.error_message = error_message;
        if let Err(err) = store.set_status(&document.id, status, document.error_message.as_deref()) {
            warn!(status = %status, error = %err, "Failed to save document status");
        }
    }

    /// Optimize and store every candidate carrying data; returns how many were stored.
    fn save_images(&self, document: &Document, images: &[ImageCandidate], store: &dyn DocumentStore) -> usize {
        let mut saved = 0usize;

        for (position, candidate) in images.iter().enumerate() {
            let Some(data) = candidate.data.as_deref().filter(|data| !data.is_empty()) else {
                warn!(position, name = %candidate.name, "Skipping image without data");
                continue;
            };

            let optimized = self
                .optimizer
                .save_image(data, &format!("{}_image_{}.png", document.id, position));
            let name = if candidate.name.is_empty() {
                format!("Image {}", position + 1)
            } else {
                candidate.name.clone()
            };

            let stored = StoredImage {
                file_name: optimized.file_name,
                name,
                position,
                format: optimized.image.format,
                width: candidate.width.or(optimized.image.width),
                height: candidate.height.or(optimized.image.height),
                data: optimized.image.data,
            };

            match store.save_image(&document.id, &stored) {
                Ok(()) => saved += 1,
                Err(err) => warn!(position, error = %err, "Failed to save image"),
            }
        }

        saved
    }
}
