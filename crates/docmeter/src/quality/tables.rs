use crate::diagnostics::{Diagnostic, DiagnosticLog, ErrorType, Severity};
use crate::types::FormatInfo;
use serde_json::json;

const TABLE_OPEN: &str = "<table>";
const TABLE_CLOSE: &str = "</table>";

const MISSING_TABLES_SCORE: f64 = 20.0;
const UNBALANCED_TABLES_SCORE: f64 = 60.0;
const PLAUSIBLE_TABLES_SCORE: f64 = 85.0;

/// Whether formatted content carries any table markup, pipe or tab.
pub fn has_table_indicator(formatted_content: &str) -> bool {
    formatted_content.contains(TABLE_OPEN) || formatted_content.contains('|') || formatted_content.contains('\t')
}

fn indicator_count(formatted_content: &str) -> usize {
    formatted_content.matches(TABLE_OPEN).count()
        + formatted_content.matches('|').count()
        + formatted_content.matches('\t').count()
}

/// Score table extraction.
///
/// Documents without tables score 100. Tables that left no trace in the
/// formatted content score 20, unbalanced HTML tables 60, anything else 85.
pub fn table_quality(formatted_content: &str, format_info: &FormatInfo, log: &mut DiagnosticLog) -> f64 {
    if !format_info.has_tables {
        return 100.0;
    }

    if indicator_count(formatted_content) == 0 {
        log.log(
            Diagnostic::new(
                ErrorType::TableParsing,
                Severity::High,
                "Tables detected but not extracted correctly",
            )
            .with_element_type("table")
            .with_suggested_fix("The document contains complex tables that need specialised processing"),
        );
        return MISSING_TABLES_SCORE;
    }

    let opened = formatted_content.matches(TABLE_OPEN).count();
    if opened > 0 {
        let closed = formatted_content.matches(TABLE_CLOSE).count();
        if opened != closed {
            let imbalance = opened as i64 - closed as i64;
            log.log(
                Diagnostic::new(ErrorType::TableParsing, Severity::Medium, "Incomplete HTML tables detected")
                    .with_details(json!({ "incomplete_tables": imbalance }))
                    .with_element_type("table"),
            );
            return UNBALANCED_TABLES_SCORE;
        }
    }

    PLAUSIBLE_TABLES_SCORE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_tables() -> FormatInfo {
        FormatInfo {
            has_tables: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_no_tables_expected() {
        let mut log = DiagnosticLog::new();
        assert_eq!(table_quality("<table>", &FormatInfo::default(), &mut log), 100.0);
        assert_eq!(table_quality("", &FormatInfo::default(), &mut log), 100.0);
        assert!(log.is_empty());
    }

    #[test]
    fn test_tables_without_indicators() {
        let mut log = DiagnosticLog::new();
        assert_eq!(table_quality("<p>plain paragraph</p>", &with_tables(), &mut log), 20.0);
        assert_eq!(log.len(), 1);
        assert_eq!(log.records()[0].severity(), Severity::High);
        assert_eq!(log.records()[0].error_type(), ErrorType::TableParsing);
    }

    #[test]
    fn test_unbalanced_tables() {
        let content = "<table></table><table></table><table>";
        let mut log = DiagnosticLog::new();

        assert_eq!(table_quality(content, &with_tables(), &mut log), 60.0);
        assert_eq!(log.len(), 1);
        assert_eq!(log.records()[0].severity(), Severity::Medium);
        assert_eq!(log.records()[0].details().unwrap()["incomplete_tables"], 1);
    }

    #[test]
    fn test_balanced_tables() {
        let mut log = DiagnosticLog::new();
        assert_eq!(table_quality("<table><tr><td>1</td></tr></table>", &with_tables(), &mut log), 85.0);
        assert!(log.is_empty());
    }

    #[test]
    fn test_pipe_tables() {
        let mut log = DiagnosticLog::new();
        assert_eq!(table_quality("| a | b |\n| 1 | 2 |", &with_tables(), &mut log), 85.0);
        assert!(has_table_indicator("a\tb"));
        assert!(!has_table_indicator("a b"));
    }
}
