use crate::diagnostics::DiagnosticRecord;
use crate::store::DocumentStore;
use crate::types::{Document, DocumentStatus, FormatInfo, StoredImage};
use crate::{DocmeterError, Result};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Document store keeping everything in memory.
///
/// Useful for the command line and for tests; all reads return copies.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: Mutex<HashMap<String, Document>>,
    diagnostics: Mutex<Vec<(String, DiagnosticRecord)>>,
    format_infos: Mutex<HashMap<String, FormatInfo>>,
    images: Mutex<Vec<(String, StoredImage)>>,
    statuses: Mutex<Vec<(String, DocumentStatus, Option<String>)>>,
}

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>> {
    mutex
        .lock()
        .map_err(|e| DocmeterError::persistence(format!("Failed to acquire {} lock: {}", what, e)))
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last saved fields of a document.
    pub fn document(&self, document_id: &str) -> Option<Document> {
        lock(&self.documents, "documents").ok()?.get(document_id).cloned()
    }

    pub fn diagnostics(&self, document_id: &str) -> Vec<DiagnosticRecord> {
        lock(&self.diagnostics, "diagnostics")
            .map(|records| {
                records
                    .iter()
                    .filter(|(id, _)| id == document_id)
                    .map(|(_, record)| record.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn format_info(&self, document_id: &str) -> Option<FormatInfo> {
        lock(&self.format_infos, "format info").ok()?.get(document_id).cloned()
    }

    pub fn images(&self, document_id: &str) -> Vec<StoredImage> {
        lock(&self.images, "images")
            .map(|images| {
                images
                    .iter()
                    .filter(|(id, _)| id == document_id)
                    .map(|(_, image)| image.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Status transitions recorded for a document, oldest first.
    pub fn status_history(&self, document_id: &str) -> Vec<(DocumentStatus, Option<String>)> {
        lock(&self.statuses, "statuses")
            .map(|statuses| {
                statuses
                    .iter()
                    .filter(|(id, _, _)| id == document_id)
                    .map(|(_, status, message)| (*status, message.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn save_document_fields(&self, document: &Document) -> Result<()> {
        lock(&self.documents, "documents")?.insert(document.id.clone(), document.clone());
        Ok(())
    }

    fn save_diagnostic(&self, document_id: &str, record: &DiagnosticRecord) -> Result<()> {
        lock(&self.diagnostics, "diagnostics")?.push((document_id.to_string(), record.clone()));
        Ok(())
    }

    fn save_format_info(&self, document_id: &str, format_info: &FormatInfo) -> Result<()> {
        lock(&self.format_infos, "format info")?.insert(document_id.to_string(), format_info.clone());
        Ok(())
    }

    fn save_image(&self, document_id: &str, image: &StoredImage) -> Result<()> {
        lock(&self.images, "images")?.push((document_id.to_string(), image.clone()));
        Ok(())
    }

    fn set_status(&self, document_id: &str, status: DocumentStatus, error_message: Option<&str>) -> Result<()> {
        lock(&self.statuses, "statuses")?.push((
            document_id.to_string(),
            status,
            error_message.map(str::to_string),
        ));
        Ok(())
    }
}
