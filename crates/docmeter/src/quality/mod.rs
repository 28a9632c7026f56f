//! Extraction quality scoring.
//!
//! Three independent heuristics score one dimension of an extraction each.
//! Scores are percentages in `[0, 100]`; problems found along the way are
//! recorded in the run's [`DiagnosticLog`] instead of being returned as errors.

pub mod images;
pub mod tables;
pub mod text;

pub use images::image_quality;
pub use tables::{has_table_indicator, table_quality};
pub use text::text_quality;

use crate::core::config::{DocmeterConfig, QualityConfig};
use crate::diagnostics::DiagnosticLog;
use crate::types::{FormatInfo, ImageCandidate};

/// Scorer bound to a set of thresholds.
///
/// # Example
///
/// ```rust
/// use docmeter::diagnostics::DiagnosticLog;
/// use docmeter::quality::QualityScorer;
///
/// let scorer = QualityScorer::default();
/// let mut log = DiagnosticLog::new();
///
/// assert_eq!(scorer.text("", None, &mut log), 0.0);
/// assert_eq!(scorer.images(&[], Some(0), &mut log), 100.0);
/// assert!(log.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct QualityScorer {
    thresholds: QualityConfig,
    small_image_threshold: u32,
}

impl Default for QualityScorer {
    fn default() -> Self {
        Self::new(&DocmeterConfig::default())
    }
}

impl QualityScorer {
    pub fn new(config: &DocmeterConfig) -> Self {
        Self {
            thresholds: config.quality.clone(),
            small_image_threshold: config.images.small_image_threshold,
        }
    }

    pub fn thresholds(&self) -> &QualityConfig {
        &self.thresholds
    }

    pub fn text(&self, text: &str, expected_length: Option<usize>, log: &mut DiagnosticLog) -> f64 {
        text_quality(text, expected_length, &self.thresholds, log)
    }

    pub fn images(&self, images: &[ImageCandidate], total_detected: Option<usize>, log: &mut DiagnosticLog) -> f64 {
        image_quality(images, total_detected, self.small_image_threshold, log)
    }

    pub fn tables(&self, formatted_content: &str, format_info: &FormatInfo, log: &mut DiagnosticLog) -> f64 {
        table_quality(formatted_content, format_info, log)
    }
}
