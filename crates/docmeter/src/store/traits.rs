use crate::Result;
use crate::diagnostics::DiagnosticRecord;
use crate::types::{Document, DocumentStatus, FormatInfo, StoredImage};

/// Persistence collaborator receiving the results of a processing run.
///
/// Every call may fail on its own. The processor logs failures and carries
/// on, so implementations should not rely on later calls being skipped after
/// an error. Implementations must accept concurrent writes for distinct
/// documents.
pub trait DocumentStore: Send + Sync {
    /// Persist the derived fields of a document: precision, element counts,
    /// quality scores, content, metadata and status.
    fn save_document_fields(&self, document: &Document) -> Result<()>;

    fn save_diagnostic(&self, document_id: &str, record: &DiagnosticRecord) -> Result<()>;

    /// Create or replace the format information of a document.
    fn save_format_info(&self, document_id: &str, format_info: &FormatInfo) -> Result<()>;

    fn save_image(&self, document_id: &str, image: &StoredImage) -> Result<()>;

    fn set_status(&self, document_id: &str, status: DocumentStatus, error_message: Option<&str>) -> Result<()>;
}
