//! Text decoding helpers.

pub mod encoding;

pub use encoding::{TextEncoding, decode_with_fallback};
