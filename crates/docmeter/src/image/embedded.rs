//! Inline data-URI images in HTML markup.

use crate::types::ImageCandidate;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use once_cell::sync::Lazy;
use regex::Regex;

static IMG_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<img\b[^>]*>").expect("Image tag regex pattern is valid and should compile"));
// Attribute names must follow whitespace so `data-src` never matches `src`.
static SRC_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)\ssrc\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
        .expect("Src attribute regex pattern is valid and should compile")
});
static WIDTH_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)\swidth\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
        .expect("Width attribute regex pattern is valid and should compile")
});
static HEIGHT_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)\sheight\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
        .expect("Height attribute regex pattern is valid and should compile")
});

/// Collect images whose `src` is an inline `data:image/...` URI.
///
/// Candidates are named `embedded_image_{i}.{ext}` where `i` is the position
/// of the tag among all `<img>` tags. Entries that cannot be decoded are
/// skipped.
///
/// ```rust
/// use docmeter::image::extract_embedded_images;
///
/// let html = r#"<img src="data:image/png;base64,iVBORw0KGgo=" width="40"><img src="logo.png">"#;
/// let images = extract_embedded_images(html);
///
/// assert_eq!(images.len(), 1);
/// assert_eq!(images[0].name, "embedded_image_0.png");
/// assert_eq!(images[0].width, Some(40));
/// ```
pub fn extract_embedded_images(html: &str) -> Vec<ImageCandidate> {
    let mut images = Vec::new();

    for (index, tag) in IMG_TAG.find_iter(html).enumerate() {
        let tag = tag.as_str();
        let Some(src) = attribute_value(&SRC_ATTR, tag) else {
            continue;
        };
        if !src.starts_with("data:image/") {
            continue;
        }

        let Some((header, payload)) = src.split_once(',') else {
            tracing::warn!(image_index = index, "Embedded image has no data payload");
            continue;
        };

        let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        let data = match STANDARD.decode(cleaned.as_bytes()) {
            Ok(data) => data,
            Err(err) => {
                tracing::warn!(image_index = index, error = %err, "Failed to decode embedded image");
                continue;
            }
        };

        let mut candidate = ImageCandidate::new(format!("embedded_image_{}.{}", index, extension_for(header)), data);
        candidate.width = numeric_attribute(&WIDTH_ATTR, tag);
        candidate.height = numeric_attribute(&HEIGHT_ATTR, tag);
        images.push(candidate);
    }

    images
}

fn attribute_value<'a>(pattern: &Regex, tag: &'a str) -> Option<&'a str> {
    let captures = pattern.captures(tag)?;
    captures
        .get(1)
        .or_else(|| captures.get(2))
        .or_else(|| captures.get(3))
        .map(|m| m.as_str().trim())
}

fn numeric_attribute(pattern: &Regex, tag: &str) -> Option<u32> {
    attribute_value(pattern, tag)?.parse().ok()
}

fn extension_for(header: &str) -> &'static str {
    let header = header.to_ascii_lowercase();
    if header.contains("png") {
        "png"
    } else if header.contains("jpeg") || header.contains("jpg") {
        "jpg"
    } else {
        "png"
    }
}
