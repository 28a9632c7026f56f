use encoding_rs::{UTF_8, WINDOWS_1252};
use std::borrow::Cow;

/// Character encodings tried when reading text files, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Latin1,
    Windows1252,
}

impl TextEncoding {
    pub fn label(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Latin1 => "iso-8859-1",
            TextEncoding::Windows1252 => "windows-1252",
        }
    }
}

/// Decode bytes with the UTF-8 → Latin-1 → Windows-1252 chain.
///
/// UTF-8 is accepted only when valid (a BOM is stripped). Latin-1 is accepted
/// when no byte falls in the C1 control range `0x80..=0x9F`, which real Latin-1
/// text does not use; anything else decodes as Windows-1252, which maps those
/// bytes to printable characters. Decoding never fails.
pub fn decode_with_fallback(bytes: &[u8]) -> (String, TextEncoding) {
    if let Some(text) = UTF_8.decode_without_bom_handling_and_without_replacement(strip_utf8_bom(bytes)) {
        return (text.into_owned(), TextEncoding::Utf8);
    }

    if !bytes.iter().any(|b| (0x80..=0x9F).contains(b)) {
        return (bytes.iter().map(|&b| char::from(b)).collect(), TextEncoding::Latin1);
    }

    let (text, _had_errors) = WINDOWS_1252.decode_without_bom_handling(bytes);
    (Cow::into_owned(text), TextEncoding::Windows1252)
}

fn strip_utf8_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes)
}
