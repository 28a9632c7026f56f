//! File I/O utilities.

use crate::text::{TextEncoding, decode_with_fallback};
use crate::{DocmeterError, Result};
use std::io::Read;
use std::path::Path;

/// Read a whole file.
///
/// # Errors
///
/// Returns `DocmeterError::Io` for I/O errors (these always bubble up).
pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    std::fs::read(path.as_ref()).map_err(DocmeterError::Io)
}

/// Read at most `limit` bytes from the start of a file.
pub fn read_header(path: impl AsRef<Path>, limit: usize) -> Result<Vec<u8>> {
    let file = std::fs::File::open(path.as_ref())?;
    let mut header = Vec::with_capacity(limit);
    file.take(limit as u64).read_to_end(&mut header)?;
    Ok(header)
}

/// Read a text file, decoding it with the UTF-8 → Latin-1 → Windows-1252 chain.
pub fn read_text_file(path: impl AsRef<Path>) -> Result<(String, TextEncoding)> {
    let bytes = read_file(path)?;
    Ok(decode_with_fallback(&bytes))
}
