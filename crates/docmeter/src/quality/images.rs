use crate::diagnostics::{Diagnostic, DiagnosticLog, ErrorType, Severity};
use crate::types::ImageCandidate;
use image::ImageReader;
use serde_json::json;
use std::io::Cursor;

/// Score the images an extractor returned.
///
/// With no candidates the score is 0 when `total_detected` says images were
/// expected, 100 otherwise. With candidates it is the share that carry bytes.
pub fn image_quality(
    images: &[ImageCandidate],
    total_detected: Option<usize>,
    small_image_threshold: u32,
    log: &mut DiagnosticLog,
) -> f64 {
    if images.is_empty() {
        return match total_detected {
            Some(detected) if detected > 0 => {
                log.log(
                    Diagnostic::new(
                        ErrorType::ImageExtraction,
                        Severity::High,
                        format!("No image extracted although {} were detected", detected),
                    )
                    .with_details(json!({ "detected": detected, "extracted": 0 })),
                );
                0.0
            }
            _ => 100.0,
        };
    }

    let mut successful = 0usize;
    for (index, candidate) in images.iter().enumerate() {
        let position = index + 1;

        if !candidate.has_data() {
            log.log(
                Diagnostic::new(
                    ErrorType::ImageExtraction,
                    Severity::Medium,
                    format!("Failed to extract image {}", position),
                )
                .with_details(json!({ "image_index": index }))
                .with_element_type("image"),
            );
            continue;
        }

        successful += 1;

        match candidate_dimensions(candidate) {
            Ok(Some((width, height))) if width < small_image_threshold || height < small_image_threshold => {
                log.log(
                    Diagnostic::new(
                        ErrorType::ImageExtraction,
                        Severity::Low,
                        format!("Image {} is very small", position),
                    )
                    .with_details(json!({ "width": width, "height": height }))
                    .with_element_type("image")
                    .with_suggested_fix("The image may be low quality or corrupted"),
                );
            }
            Ok(_) => {}
            Err(err) => {
                log.log(
                    Diagnostic::new(
                        ErrorType::ImageExtraction,
                        Severity::High,
                        format!("Error while inspecting image {}: {}", position, err),
                    )
                    .with_details(json!({ "image_index": index, "error": err }))
                    .with_element_type("image"),
                );
            }
        }
    }

    successful as f64 / images.len() as f64 * 100.0
}

/// Declared dimensions, or the ones in the image header when none were declared.
///
/// Bytes in a format nobody recognises yield `Ok(None)`; a recognised header
/// that cannot be read is an error.
fn candidate_dimensions(candidate: &ImageCandidate) -> std::result::Result<Option<(u32, u32)>, String> {
    if let (Some(width), Some(height)) = (candidate.width, candidate.height) {
        return Ok(Some((width, height)));
    }

    let Some(data) = candidate.data.as_deref() else {
        return Ok(None);
    };

    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| e.to_string())?;
    if reader.format().is_none() {
        return Ok(None);
    }

    let (probed_width, probed_height) = reader.into_dimensions().map_err(|e| e.to_string())?;
    Ok(Some((
        candidate.width.unwrap_or(probed_width),
        candidate.height.unwrap_or(probed_height),
    )))
}
