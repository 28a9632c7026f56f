use crate::core::config::QualityConfig;
use crate::diagnostics::{Diagnostic, DiagnosticLog, ErrorType, Severity};
use serde_json::json;

/// Placeholders left behind by broken decoders and failed glyph lookups.
const CORRUPTION_MARKERS: [char; 3] = ['\u{FFFD}', '\u{25A1}', '?'];

const BLANK_LINE_PENALTY: f64 = 20.0;
const LENGTH_MISMATCH_PENALTY: f64 = 15.0;

fn is_corrupted(c: char) -> bool {
    u32::from(c) > 0xFFFF || CORRUPTION_MARKERS.contains(&c)
}

/// Score extracted text.
///
/// Empty text scores 0 without a diagnostic. Otherwise the score starts at
/// 100 and loses points for corrupted characters, a mostly blank layout and a
/// length far from `expected_length` (in characters).
pub fn text_quality(
    text: &str,
    expected_length: Option<usize>,
    thresholds: &QualityConfig,
    log: &mut DiagnosticLog,
) -> f64 {
    if text.is_empty() {
        return 0.0;
    }

    let mut score = 100.0;
    let total_chars = text.chars().count();

    let corrupted = text.chars().filter(|&c| is_corrupted(c)).count();
    if corrupted > 0 {
        let penalty = (corrupted as f64 / total_chars as f64 * 100.0).min(thresholds.corruption_penalty_cap);
        score -= penalty;

        if penalty > thresholds.corruption_log_threshold {
            log.log(
                Diagnostic::new(
                    ErrorType::Encoding,
                    Severity::Medium,
                    format!("Detected {} corrupted characters", corrupted),
                )
                .with_details(json!({ "corrupted_chars": corrupted, "total_chars": total_chars }))
                .with_suggested_fix("Verify the encoding of the source document"),
            );
        }
    }

    let lines: Vec<&str> = text.split('\n').collect();
    let blank = lines.iter().filter(|line| line.trim().is_empty()).count();
    let blank_ratio = blank as f64 / lines.len() as f64;
    if blank_ratio > thresholds.blank_line_ratio {
        score -= BLANK_LINE_PENALTY;
        log.log(
            Diagnostic::new(ErrorType::LayoutAnalysis, Severity::Low, "Many blank lines detected")
                .with_details(json!({ "empty_lines_ratio": blank_ratio }))
                .with_suggested_fix("The document may need more precise OCR"),
        );
    }

    if let Some(expected) = expected_length.filter(|&expected| expected > 0) {
        let deviation = (total_chars as f64 - expected as f64).abs() / expected as f64;
        if deviation > thresholds.length_tolerance {
            score -= LENGTH_MISMATCH_PENALTY;
            log.log(
                Diagnostic::new(
                    ErrorType::TextOcr,
                    Severity::Medium,
                    "Extracted text length differs significantly from the expected length",
                )
                .with_details(json!({ "extracted_length": total_chars, "expected_length": expected })),
            );
        }
    }

    f64::max(0.0, score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::auto_suggested_fix;

    fn score(text: &str, expected: Option<usize>) -> (f64, DiagnosticLog) {
        let mut log = DiagnosticLog::new();
        let value = text_quality(text, expected, &QualityConfig::default(), &mut log);
        (value, log)
    }

    #[test]
    fn test_empty_text_scores_zero_silently() {
        let (value, log) = score("", Some(100));
        assert_eq!(value, 0.0);
        assert!(log.is_empty());
    }

    #[test]
    fn test_clean_text_scores_full() {
        let (value, log) = score("The quick brown fox\njumps over the lazy dog.", None);
        assert_eq!(value, 100.0);
        assert!(log.is_empty());
    }

    #[test]
    fn test_light_corruption_penalised_without_diagnostic() {
        // 1 marker in 20 characters: 5 points, below the logging threshold
        let (value, log) = score("abcdefghijklmnopqrs?", None);
        assert!((value - 95.0).abs() < 1e-9);
        assert!(log.is_empty());
    }

    #[test]
    fn test_heavy_corruption_logs_encoding_diagnostic() {
        let (value, log) = score("ab\u{FFFD}\u{FFFD}\u{25A1}?\u{1F600}xyz", None);

        // 5 of 10 characters are corrupted: penalty capped at 50
        assert_eq!(value, 50.0);
        assert_eq!(log.len(), 1);
        let record = &log.records()[0];
        assert_eq!(record.error_type(), ErrorType::Encoding);
        assert_eq!(record.severity(), Severity::Medium);
        assert_eq!(record.suggested_fix(), "Verify the encoding of the source document");
        assert_eq!(record.details().unwrap()["corrupted_chars"], 5);
        assert_eq!(record.details().unwrap()["total_chars"], 10);
    }

    #[test]
    fn test_blank_lines_penalised() {
        let (value, log) = score("title\n\n\n\nbody", None);
        assert_eq!(value, 80.0);
        assert_eq!(log.count_by_type(ErrorType::LayoutAnalysis), 1);
        assert_eq!(log.records()[0].severity(), Severity::Low);
    }

    #[test]
    fn test_half_blank_lines_not_penalised() {
        let (value, _) = score("line\n", None);
        assert_eq!(value, 100.0);
    }

    #[test]
    fn test_length_mismatch_uses_auto_fix() {
        let (value, log) = score("short text", Some(100));
        assert_eq!(value, 85.0);
        assert_eq!(log.len(), 1);
        let record = &log.records()[0];
        assert_eq!(record.error_type(), ErrorType::TextOcr);
        assert_eq!(record.suggested_fix(), auto_suggested_fix(ErrorType::TextOcr));
    }

    #[test]
    fn test_length_within_tolerance() {
        let (value, log) = score("0123456789", Some(12));
        assert_eq!(value, 100.0);
        assert!(log.is_empty());
    }

    #[test]
    fn test_zero_expected_length_ignored() {
        let (value, _) = score("anything", Some(0));
        assert_eq!(value, 100.0);
    }

    #[test]
    fn test_all_penalties_never_below_zero() {
        let (value, log) = score("??\n\n\n\n??", Some(1000));
        assert!(value >= 0.0);
        assert_eq!(value, 15.0);
        assert_eq!(log.len(), 3);
    }
}
