//! Base plugin trait definition.

use crate::Result;

/// Lifecycle and identity shared by every plugin.
///
/// Plugins live behind `Arc<dyn Trait>`, so lifecycle hooks take `&self`;
/// implementations that keep state use interior mutability.
///
/// # Example
///
/// ```rust
/// use docmeter::plugins::Plugin;
/// use docmeter::Result;
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// struct WordBridge {
///     ready: AtomicBool,
/// }
///
/// impl Plugin for WordBridge {
///     fn name(&self) -> &str {
///         "word-bridge"
///     }
///
///     fn version(&self) -> String {
///         "1.0.0".to_string()
///     }
///
///     fn initialize(&self) -> Result<()> {
///         self.ready.store(true, Ordering::Release);
///         Ok(())
///     }
///
///     fn shutdown(&self) -> Result<()> {
///         self.ready.store(false, Ordering::Release);
///         Ok(())
///     }
/// }
/// ```
pub trait Plugin: Send + Sync {
    /// Unique kebab-case identifier.
    fn name(&self) -> &str;

    fn version(&self) -> String;

    /// Called once on registration. An error prevents registration.
    fn initialize(&self) -> Result<()>;

    /// Called when the plugin is removed from its registry.
    fn shutdown(&self) -> Result<()>;

    fn description(&self) -> &str {
        ""
    }
}
