//! Per-run metrics aggregation.
//!
//! A [`MetricsAccumulator`] is created for one extraction run, fed the
//! extraction result, and finalized into the document record. It owns the
//! run's [`DiagnosticLog`]; nothing here is shared between runs.

use crate::core::config::DocmeterConfig;
use crate::diagnostics::{DiagnosticLog, DiagnosticRecord};
use crate::quality::{QualityScorer, has_table_indicator};
use crate::store::DocumentStore;
use crate::types::{Document, ExtractionResult};
use serde::Serialize;

/// Marker class of rendered PDF pages in formatted content.
const PAGE_MARKER: &str = "pdf-page";

/// Serializable view of an accumulator.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionMetrics {
    pub total_elements_detected: usize,
    pub total_elements_extracted: usize,
    pub text_quality: f64,
    pub image_quality: f64,
    pub table_quality: f64,
    pub page_count: usize,
    pub precision: f64,
    pub errors: Vec<DiagnosticRecord>,
}

/// Counters, scores and diagnostics of one extraction run.
///
/// # Example
///
/// ```rust
/// use docmeter::metrics::MetricsAccumulator;
/// use docmeter::types::ExtractionResult;
///
/// let mut metrics = MetricsAccumulator::default();
/// metrics.update(&ExtractionResult::from_text("hello world", "text/plain"));
///
/// assert_eq!(metrics.total_elements_detected(), 1);
/// assert_eq!(metrics.precision(), 100.0);
/// ```
#[derive(Debug, Clone)]
pub struct MetricsAccumulator {
    scorer: QualityScorer,
    words_per_page: usize,
    total_elements_detected: usize,
    total_elements_extracted: usize,
    text_quality: f64,
    image_quality: f64,
    table_quality: f64,
    page_count: usize,
    log: DiagnosticLog,
}

impl Default for MetricsAccumulator {
    fn default() -> Self {
        Self::new(&DocmeterConfig::default())
    }
}

impl MetricsAccumulator {
    pub fn new(config: &DocmeterConfig) -> Self {
        Self {
            scorer: QualityScorer::new(config),
            words_per_page: config.quality.words_per_page,
            total_elements_detected: 0,
            total_elements_extracted: 0,
            text_quality: 0.0,
            image_quality: 0.0,
            table_quality: 0.0,
            page_count: 1,
            log: DiagnosticLog::new(),
        }
    }

    /// Count the elements of an extraction result and score it.
    ///
    /// The document itself counts as one element, extracted when it has
    /// content. Images count as detected per candidate (at least one when the
    /// format reports images) and as extracted when they carry data. Tables
    /// count once when reported, and as extracted when the formatted content
    /// shows any table indicator.
    pub fn update(&mut self, result: &ExtractionResult) {
        self.page_count = estimate_page_count(&result.content, &result.formatted_content, self.words_per_page);

        self.total_elements_detected += 1;
        if !result.content.is_empty() {
            self.total_elements_extracted += 1;
        }

        let mut images_detected = result.images.len();
        if result.format_info.has_images {
            images_detected = images_detected.max(1);
        }
        self.total_elements_detected += images_detected;
        self.total_elements_extracted += result.images.iter().filter(|image| image.has_data()).count();

        if result.format_info.has_tables {
            self.total_elements_detected += 1;
            if has_table_indicator(&result.formatted_content) {
                self.total_elements_extracted += 1;
            }
        }

        self.text_quality = self.scorer.text(&result.content, None, &mut self.log);
        self.image_quality = self.scorer.images(&result.images, Some(images_detected), &mut self.log);
        self.table_quality = self
            .scorer
            .tables(&result.formatted_content, &result.format_info, &mut self.log);

        tracing::debug!(
            detected = self.total_elements_detected,
            extracted = self.total_elements_extracted,
            text_quality = self.text_quality,
            image_quality = self.image_quality,
            table_quality = self.table_quality,
            pages = self.page_count,
            "Extraction metrics updated"
        );
    }

    /// Add detected/extracted counts directly.
    pub fn record_elements(&mut self, detected: usize, extracted: usize) {
        self.total_elements_detected += detected;
        self.total_elements_extracted += extracted;
    }

    /// `extracted / detected × 100`, or 100 when nothing was detected.
    ///
    /// Not clamped: a value above 100 means elements were counted twice.
    pub fn precision(&self) -> f64 {
        if self.total_elements_detected > 0 {
            self.total_elements_extracted as f64 / self.total_elements_detected as f64 * 100.0
        } else {
            100.0
        }
    }

    pub fn total_elements_detected(&self) -> usize {
        self.total_elements_detected
    }

    pub fn total_elements_extracted(&self) -> usize {
        self.total_elements_extracted
    }

    pub fn text_quality(&self) -> f64 {
        self.text_quality
    }

    pub fn image_quality(&self) -> f64 {
        self.image_quality
    }

    pub fn table_quality(&self) -> f64 {
        self.table_quality
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn diagnostics(&self) -> &DiagnosticLog {
        &self.log
    }

    pub fn diagnostics_mut(&mut self) -> &mut DiagnosticLog {
        &mut self.log
    }

    pub fn snapshot(&self) -> ExtractionMetrics {
        ExtractionMetrics {
            total_elements_detected: self.total_elements_detected,
            total_elements_extracted: self.total_elements_extracted,
            text_quality: self.text_quality,
            image_quality: self.image_quality,
            table_quality: self.table_quality,
            page_count: self.page_count,
            precision: self.precision(),
            errors: self.log.records().to_vec(),
        }
    }

    /// Write the metrics to the document and flush diagnostics to the store.
    ///
    /// Scores are rounded to two decimals. Store failures are logged and do
    /// not undo the in-memory fields; each diagnostic is saved on its own.
    /// Returns the rounded precision.
    pub fn finalize(&mut self, document: &mut Document, store: &dyn DocumentStore) -> f64 {
        let precision = round2(self.precision());

        document.extraction_precision = precision;
        document.total_elements_detected = self.total_elements_detected;
        document.total_elements_extracted = self.total_elements_extracted;
        document.text_extraction_quality = round2(self.text_quality);
        document.image_extraction_quality = round2(self.image_quality);
        document.table_extraction_quality = round2(self.table_quality);

        if let Err(err) = store.save_document_fields(document) {
            tracing::warn!(document_id = %document.id, error = %err, "Failed to save extraction metrics");
        }

        let records = self.log.drain();
        let mut failed = 0usize;
        for record in &records {
            if let Err(err) = store.save_diagnostic(&document.id, record) {
                failed += 1;
                tracing::warn!(
                    document_id = %document.id,
                    error_type = %record.error_type(),
                    error = %err,
                    "Failed to save extraction diagnostic"
                );
            }
        }

        tracing::info!(
            document_id = %document.id,
            precision,
            diagnostics = records.len(),
            failed_diagnostics = failed,
            "Extraction metrics finalized"
        );

        precision
    }
}

/// Number of pages: page markers in the formatted content, else one page per
/// `words_per_page` words (at least one).
pub fn estimate_page_count(content: &str, formatted_content: &str, words_per_page: usize) -> usize {
    if formatted_content.contains(PAGE_MARKER) {
        return formatted_content.matches(PAGE_MARKER).count();
    }
    if content.is_empty() {
        return 1;
    }
    (content.split_whitespace().count() / words_per_page.max(1)).max(1)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
