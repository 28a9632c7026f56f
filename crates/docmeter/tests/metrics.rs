//! Precision aggregation and persistence of finalized metrics.

use docmeter::diagnostics::{Diagnostic, ErrorType, Severity};
use docmeter::types::{FormatInfo, ImageCandidate};
use docmeter::{Document, ExtractionResult, InMemoryDocumentStore, MetricsAccumulator};

#[test]
fn test_finalize_ratio() {
    let store = InMemoryDocumentStore::new();
    let mut document = Document::new("m-1", "Ratio", "ratio.txt");
    let mut metrics = MetricsAccumulator::default();
    metrics.record_elements(10, 7);

    assert_eq!(metrics.finalize(&mut document, &store), 70.0);
    assert_eq!(document.extraction_precision, 70.0);
    assert_eq!(store.document("m-1").unwrap().total_elements_extracted, 7);
}

#[test]
fn test_finalize_nothing_detected() {
    let store = InMemoryDocumentStore::new();
    let mut document = Document::new("m-2", "Empty", "empty.txt");
    let mut metrics = MetricsAccumulator::default();

    assert_eq!(metrics.finalize(&mut document, &store), 100.0);
}

#[test]
fn test_double_counted_elements_exceed_hundred() {
    let store = InMemoryDocumentStore::new();
    let mut document = Document::new("m-3", "Overcount", "overcount.txt");
    let mut metrics = MetricsAccumulator::default();
    metrics.record_elements(3, 4);

    let precision = metrics.finalize(&mut document, &store);

    assert_eq!(precision, 133.33);
    assert!(document.extraction_precision > 100.0);
}

#[test]
fn test_finalize_persists_diagnostics_in_order() {
    let store = InMemoryDocumentStore::new();
    let mut document = Document::new("m-4", "Scan", "scan.html");
    let mut metrics = MetricsAccumulator::default();
    metrics.diagnostics_mut().set_current_page(3);

    let result = ExtractionResult {
        content: "Visible words".to_string(),
        formatted_content: "<p>Visible words</p>".to_string(),
        mime_type: "text/html".to_string(),
        images: vec![ImageCandidate::missing("logo.png")],
        format_info: FormatInfo {
            has_images: true,
            has_tables: true,
            ..Default::default()
        },
        ..Default::default()
    };
    metrics.update(&result);
    metrics
        .diagnostics_mut()
        .log(Diagnostic::new(ErrorType::FontDetection, Severity::Low, "Substituted fonts").with_page(5));

    assert_eq!(metrics.total_elements_detected(), 3);
    assert_eq!(metrics.total_elements_extracted(), 1);
    let precision = metrics.finalize(&mut document, &store);
    assert_eq!(precision, 33.33);
    assert_eq!(document.image_extraction_quality, 0.0);
    assert_eq!(document.table_extraction_quality, 20.0);

    let saved = store.diagnostics("m-4");
    let types: Vec<ErrorType> = saved.iter().map(|record| record.error_type()).collect();
    assert_eq!(
        types,
        vec![ErrorType::ImageExtraction, ErrorType::TableParsing, ErrorType::FontDetection]
    );
    assert_eq!(saved[0].page_number(), 3);
    assert_eq!(saved[2].page_number(), 5);
    assert!(metrics.diagnostics().is_empty());
}
