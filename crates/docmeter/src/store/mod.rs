//! Persistence of processing results.

pub mod memory;
mod traits;

pub use memory::InMemoryDocumentStore;
pub use traits::DocumentStore;
