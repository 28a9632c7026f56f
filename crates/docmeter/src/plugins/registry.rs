//! Extractor registration and fallback chains.
//!
//! The registry is an owned value handed to the processor; nothing here is
//! global. For a given MIME type it yields an ordered chain of strategies:
//! exact registrations by descending priority, then family wildcards
//! (`text/*`), then the plain-text fallback when the [`FallbackPolicy`]
//! allows it.

use crate::extractors::PlainTextExtractor;
use crate::plugins::DocumentExtractor;
use crate::{DocmeterError, Result};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// MIME types whose extraction failure must not fall back to plain text.
const NO_TEXT_FALLBACK: &[&str] = &["application/pdf"];

fn validate_plugin_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(DocmeterError::validation("Plugin name cannot be empty"));
    }

    if name.contains(char::is_whitespace) {
        return Err(DocmeterError::validation(format!(
            "Plugin name '{}' cannot contain whitespace",
            name
        )));
    }

    Ok(())
}

/// What the processor may try after the registered extractors of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackPolicy {
    /// Append the plain-text extractor to the chain.
    pub text_fallback: bool,
}

impl FallbackPolicy {
    pub fn for_mime(mime_type: &str) -> Self {
        Self {
            text_fallback: !NO_TEXT_FALLBACK.contains(&mime_type),
        }
    }
}

/// Registry for document extractor plugins.
pub struct DocumentExtractorRegistry {
    extractors: HashMap<String, BTreeMap<i32, Arc<dyn DocumentExtractor>>>,
    name_index: HashMap<String, Vec<(String, i32)>>,
    text_fallback: Option<Arc<dyn DocumentExtractor>>,
}

impl DocumentExtractorRegistry {
    /// Empty registry with the plain-text fallback installed.
    pub fn new() -> Self {
        Self {
            extractors: HashMap::new(),
            name_index: HashMap::new(),
            text_fallback: Some(Arc::new(PlainTextExtractor::new())),
        }
    }

    /// Registry with the built-in plain-text and HTML extractors registered.
    pub fn with_defaults() -> Result<Self> {
        let mut registry = Self::new();
        crate::extractors::register_default_extractors(&mut registry)?;
        Ok(registry)
    }

    /// Replace (or remove, with `None`) the plain-text fallback strategy.
    pub fn set_text_fallback(&mut self, fallback: Option<Arc<dyn DocumentExtractor>>) {
        self.text_fallback = fallback;
    }

    /// Register an extractor for every MIME type it supports.
    ///
    /// The extractor is initialized first; an initialization error aborts the
    /// registration. Registering a second extractor with the same priority for
    /// a type replaces the first one for that type.
    pub fn register(&mut self, extractor: Arc<dyn DocumentExtractor>) -> Result<()> {
        let name = extractor.name().to_string();
        let priority = extractor.priority();
        let mime_types: Vec<String> = extractor.supported_mime_types().iter().map(|s| s.to_string()).collect();

        validate_plugin_name(&name)?;

        extractor.initialize()?;

        let mut index_entries = Vec::new();
        for mime_type in &mime_types {
            self.extractors
                .entry(mime_type.clone())
                .or_default()
                .insert(priority, Arc::clone(&extractor));
            index_entries.push((mime_type.clone(), priority));
        }

        tracing::debug!(extractor = %name, priority, mime_types = ?mime_types, "Registered extractor");
        self.name_index.insert(name, index_entries);

        Ok(())
    }

    /// Names of the registered extractors, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.name_index.keys().cloned().collect();
        names.sort();
        names
    }

    /// Remove an extractor and shut it down. Unknown names are ignored.
    pub fn remove(&mut self, name: &str) -> Result<()> {
        let Some(index_entries) = self.name_index.remove(name) else {
            return Ok(());
        };

        let mut extractor_to_shutdown: Option<Arc<dyn DocumentExtractor>> = None;

        for (mime_type, priority) in index_entries {
            if let Some(priority_map) = self.extractors.get_mut(&mime_type) {
                if let Some(extractor) = priority_map.remove(&priority)
                    && extractor_to_shutdown.is_none()
                {
                    extractor_to_shutdown = Some(extractor);
                }

                if priority_map.is_empty() {
                    self.extractors.remove(&mime_type);
                }
            }
        }

        if let Some(extractor) = extractor_to_shutdown {
            extractor.shutdown()?;
        }

        Ok(())
    }

    /// Highest priority extractor for a type, ignoring the fallback.
    pub fn get(&self, mime_type: &str) -> Result<Arc<dyn DocumentExtractor>> {
        self.registered_chain(mime_type)
            .into_iter()
            .next()
            .ok_or_else(|| DocmeterError::UnsupportedFormat(mime_type.to_string()))
    }

    /// Ordered strategies to try for a MIME type.
    ///
    /// An unsupported type yields only the plain-text fallback; PDF never gets it.
    pub fn chain_for(&self, mime_type: &str) -> Vec<Arc<dyn DocumentExtractor>> {
        let mut chain = self.registered_chain(mime_type);

        if FallbackPolicy::for_mime(mime_type).text_fallback
            && let Some(fallback) = &self.text_fallback
            && !chain.iter().any(|extractor| extractor.name() == fallback.name())
        {
            chain.push(Arc::clone(fallback));
        }

        chain
    }

    fn registered_chain(&self, mime_type: &str) -> Vec<Arc<dyn DocumentExtractor>> {
        let mut chain: Vec<Arc<dyn DocumentExtractor>> = Vec::new();

        if let Some(priority_map) = self.extractors.get(mime_type) {
            chain.extend(priority_map.values().rev().cloned());
        }

        let mut wildcard: Vec<Arc<dyn DocumentExtractor>> = self
            .extractors
            .iter()
            .filter(|(registered, _)| {
                registered
                    .strip_suffix('*')
                    .is_some_and(|prefix| prefix.ends_with('/') && mime_type.starts_with(prefix))
            })
            .flat_map(|(_, priority_map)| priority_map.values().cloned())
            .collect();
        wildcard.sort_by_key(|extractor| std::cmp::Reverse(extractor.priority()));

        for extractor in wildcard {
            if !chain.iter().any(|existing| existing.name() == extractor.name()) {
                chain.push(extractor);
            }
        }

        chain
    }
}

impl Default for DocumentExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractionError;
    use crate::plugins::Plugin;
    use crate::types::ExtractionResult;
    use std::path::Path;

    struct MockExtractor {
        name: &'static str,
        mime_types: &'static [&'static str],
        priority: i32,
    }

    impl Plugin for MockExtractor {
        fn name(&self) -> &str {
            self.name
        }

        fn version(&self) -> String {
            "1.0.0".to_string()
        }

        fn initialize(&self) -> Result<()> {
            Ok(())
        }

        fn shutdown(&self) -> Result<()> {
            Ok(())
        }
    }

    impl DocumentExtractor for MockExtractor {
        fn extract_file(&self, _: &Path, mime_type: &str) -> std::result::Result<ExtractionResult, ExtractionError> {
            Ok(ExtractionResult::from_text(self.name, mime_type))
        }

        fn supported_mime_types(&self) -> &[&str] {
            self.mime_types
        }

        fn priority(&self) -> i32 {
            self.priority
        }
    }

    fn mock(name: &'static str, mime_types: &'static [&'static str], priority: i32) -> Arc<dyn DocumentExtractor> {
        Arc::new(MockExtractor {
            name,
            mime_types,
            priority,
        })
    }

    fn names(chain: &[Arc<dyn DocumentExtractor>]) -> Vec<&str> {
        chain.iter().map(|extractor| extractor.name()).collect()
    }

    #[test]
    fn test_chain_orders_by_priority_then_fallback() {
        let mut registry = DocumentExtractorRegistry::new();
        registry.register(mock("docx-low", &["application/msword"], 10)).unwrap();
        registry.register(mock("docx-high", &["application/msword"], 90)).unwrap();

        let chain = registry.chain_for("application/msword");
        assert_eq!(names(&chain), vec!["docx-high", "docx-low", "plain-text-extractor"]);
    }

    #[test]
    fn test_wildcard_after_exact() {
        let mut registry = DocumentExtractorRegistry::new();
        registry.register(mock("any-text", &["text/*"], 100)).unwrap();
        registry.register(mock("markdown", &["text/markdown"], 10)).unwrap();

        let chain = registry.chain_for("text/markdown");
        assert_eq!(names(&chain), vec!["markdown", "any-text", "plain-text-extractor"]);
    }

    #[test]
    fn test_pdf_gets_no_text_fallback() {
        let registry = DocumentExtractorRegistry::new();
        assert!(registry.chain_for("application/pdf").is_empty());
        assert!(!FallbackPolicy::for_mime("application/pdf").text_fallback);
    }

    #[test]
    fn test_unsupported_type_uses_fallback_only() {
        let registry = DocumentExtractorRegistry::new();
        let chain = registry.chain_for("application/octet-stream");
        assert_eq!(names(&chain), vec!["plain-text-extractor"]);
    }

    #[test]
    fn test_fallback_can_be_disabled() {
        let mut registry = DocumentExtractorRegistry::new();
        registry.set_text_fallback(None);
        assert!(registry.chain_for("text/plain").is_empty());
    }

    #[test]
    fn test_remove_and_list() {
        let mut registry = DocumentExtractorRegistry::new();
        registry.register(mock("b-extractor", &["text/csv"], 50)).unwrap();
        registry.register(mock("a-extractor", &["text/tsv"], 50)).unwrap();
        assert_eq!(registry.list(), vec!["a-extractor", "b-extractor"]);

        registry.remove("b-extractor").unwrap();
        assert_eq!(registry.list(), vec!["a-extractor"]);
        assert!(matches!(
            registry.get("text/csv"),
            Err(DocmeterError::UnsupportedFormat(_))
        ));
        registry.remove("missing").unwrap();
    }

    #[test]
    fn test_invalid_name_rejected() {
        let mut registry = DocumentExtractorRegistry::new();
        assert!(registry.register(mock("", &["text/csv"], 50)).is_err());
        assert!(registry.register(mock("bad name", &["text/csv"], 50)).is_err());
    }

    #[test]
    fn test_with_defaults() {
        let registry = DocumentExtractorRegistry::with_defaults().unwrap();
        assert_eq!(registry.get("text/html").unwrap().name(), "html-extractor");
        assert_eq!(registry.get("text/plain").unwrap().name(), "plain-text-extractor");
        assert_eq!(names(&registry.chain_for("text/plain")), vec!["plain-text-extractor"]);
    }
}
