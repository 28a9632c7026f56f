//! Storage normalization of extracted images.
//!
//! Every operation here is best effort: undecodable input is handed back
//! unchanged, and a failing enhancement step is logged and skipped.

use crate::core::config::{DocmeterConfig, EnhanceOptions, ImageOptimizerConfig, WebImageConfig};
use crate::image::enhance::{adjust_contrast, flatten_on_white, median_denoise, sharpen};
use crate::types::OutputFormat;
use crate::{DocmeterError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use serde::Serialize;
use std::io::Cursor;
use tracing::{debug, instrument, warn};

const ENHANCE_UPSCALE_BELOW: u32 = 500;
const ENHANCE_UPSCALE_FACTOR: u32 = 2;
const ENHANCE_CONTRAST: f32 = 1.2;
const ENHANCE_SHARPNESS: f32 = 1.5;
const ENHANCE_JPEG_QUALITY: u8 = 95;

/// Output of [`ImageOptimizer::optimize`].
#[derive(Debug, Clone)]
pub struct OptimizedImage {
    pub data: Vec<u8>,
    pub format: OutputFormat,
    /// Dimensions after resizing; `None` when the input could not be decoded.
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Optimized bytes plus the file name they should be stored under.
#[derive(Debug, Clone)]
pub struct SavedImage {
    pub file_name: String,
    pub image: OptimizedImage,
}

/// Details about an encoded image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub color_type: String,
    pub size_bytes: usize,
    pub is_small: bool,
    pub aspect_ratio: f64,
}

/// Resizes, sharpens and re-encodes images.
///
/// # Example
///
/// ```rust
/// use docmeter::image::ImageOptimizer;
/// use docmeter::types::OutputFormat;
///
/// let optimizer = ImageOptimizer::default();
/// let result = optimizer.optimize(b"definitely not an image");
///
/// assert_eq!(result.format, OutputFormat::Original);
/// assert_eq!(result.data, b"definitely not an image");
/// ```
#[derive(Debug, Clone)]
pub struct ImageOptimizer {
    images: ImageOptimizerConfig,
    web: WebImageConfig,
    enhance: EnhanceOptions,
    thumbnail_size: u32,
}

impl Default for ImageOptimizer {
    fn default() -> Self {
        Self::new(&DocmeterConfig::default())
    }
}

impl ImageOptimizer {
    pub fn new(config: &DocmeterConfig) -> Self {
        Self {
            images: config.images.clone(),
            web: config.web.clone(),
            enhance: config.enhance,
            thumbnail_size: config.thumbnail_size,
        }
    }

    /// Default switches for [`ImageOptimizer::enhance_image_quality`].
    pub fn enhance_options(&self) -> EnhanceOptions {
        self.enhance
    }

    pub fn thumbnail_size(&self) -> u32 {
        self.thumbnail_size
    }

    /// Normalize an image for storage.
    ///
    /// Images smaller than the minimum size on both sides are upsampled so the
    /// smaller side reaches it; images over the maximum bounds are fit inside
    /// them. A mild sharpening follows. Images with alpha are stored as PNG,
    /// everything else as JPEG.
    #[instrument(skip(self, bytes), fields(input_len = bytes.len()))]
    pub fn optimize(&self, bytes: &[u8]) -> OptimizedImage {
        match self.try_optimize(bytes) {
            Ok(optimized) => optimized,
            Err(err) => {
                warn!(error = %err, "Image optimization failed, keeping original bytes");
                OptimizedImage {
                    data: bytes.to_vec(),
                    format: OutputFormat::Original,
                    width: None,
                    height: None,
                }
            }
        }
    }

    fn try_optimize(&self, bytes: &[u8]) -> Result<OptimizedImage> {
        let mut image = decode(bytes)?;
        let (width, height) = (image.width(), image.height());
        let min_size = self.images.min_size;

        if width < min_size && height < min_size {
            let (new_width, new_height) = upscaled_dimensions(width, height, min_size);
            debug!(width, height, new_width, new_height, "Upscaling small image");
            image = image.resize_exact(new_width, new_height, FilterType::Lanczos3);
        }

        if image.width() > self.images.max_width || image.height() > self.images.max_height {
            image = image.resize(self.images.max_width, self.images.max_height, FilterType::Lanczos3);
            debug!(width = image.width(), height = image.height(), "Downscaled oversized image");
        }

        image = apply_step(image, "sharpen", |image| sharpen(image, self.images.sharpen_factor));

        let (format, data) = if image.color().has_alpha() {
            (OutputFormat::Png, encode_png(&image)?)
        } else {
            (OutputFormat::Jpeg, encode_jpeg(&image, self.images.jpeg_quality)?)
        };

        Ok(OptimizedImage {
            data,
            format,
            width: Some(image.width()),
            height: Some(image.height()),
        })
    }

    /// Optimize an image and derive the name it is stored under.
    ///
    /// JPEG output renames a `.png` suffix to `.jpg`.
    pub fn save_image(&self, bytes: &[u8], file_name: &str) -> SavedImage {
        let image = self.optimize(bytes);
        let file_name = match (image.format, file_name.strip_suffix(".png")) {
            (OutputFormat::Jpeg, Some(stem)) => format!("{}.jpg", stem),
            _ => file_name.to_string(),
        };
        SavedImage { file_name, image }
    }

    /// Configurable enhancement.
    ///
    /// Upscales 2× when either side is under 500 px, then optionally denoises,
    /// boosts contrast (×1.2) and sharpens (×1.5). PNG is kept for images with
    /// alpha; others become JPEG at quality 95. Undecodable input is returned
    /// unchanged.
    #[instrument(skip(self, bytes), fields(input_len = bytes.len()))]
    pub fn enhance_image_quality(&self, bytes: &[u8], options: &EnhanceOptions) -> Vec<u8> {
        let result = decode(bytes).and_then(|mut image| {
            if options.upscale && (image.width() < ENHANCE_UPSCALE_BELOW || image.height() < ENHANCE_UPSCALE_BELOW) {
                image = image.resize_exact(
                    image.width() * ENHANCE_UPSCALE_FACTOR,
                    image.height() * ENHANCE_UPSCALE_FACTOR,
                    FilterType::Lanczos3,
                );
            }
            if options.denoise {
                image = apply_step(image, "denoise", median_denoise);
            }
            if options.contrast_enhancement {
                image = apply_step(image, "contrast", |image| adjust_contrast(image, ENHANCE_CONTRAST));
            }
            if options.sharpen {
                image = apply_step(image, "sharpen", |image| sharpen(image, ENHANCE_SHARPNESS));
            }

            if image.color().has_alpha() {
                encode_png(&image)
            } else {
                encode_jpeg(&image, ENHANCE_JPEG_QUALITY)
            }
        });

        result.unwrap_or_else(|err| {
            warn!(error = %err, "Image enhancement failed, keeping original bytes");
            bytes.to_vec()
        })
    }

    /// JPEG rendition for web display, capped at the web bounds.
    ///
    /// Transparent areas are composited onto white. Returns the original bytes
    /// on any failure.
    #[instrument(skip(self, bytes), fields(input_len = bytes.len()))]
    pub fn convert_to_web_format(&self, bytes: &[u8]) -> Vec<u8> {
        let result = decode(bytes).and_then(|image| {
            let mut image = if image.color().has_alpha() {
                DynamicImage::ImageRgba8(image.to_rgba8())
            } else {
                DynamicImage::ImageRgb8(image.to_rgb8())
            };

            if image.width() > self.web.max_width || image.height() > self.web.max_height {
                image = image.resize(self.web.max_width, self.web.max_height, FilterType::Lanczos3);
            }

            image = apply_step(image, "contrast", |image| adjust_contrast(image, self.web.contrast));
            image = apply_step(image, "sharpen", |image| sharpen(image, self.web.sharpness));

            encode_jpeg(&flatten_on_white(&image), self.web.jpeg_quality)
        });

        result.unwrap_or_else(|err| {
            warn!(error = %err, "Web conversion failed, keeping original bytes");
            bytes.to_vec()
        })
    }

    /// Thumbnail fitting within `size`×`size`; images already inside are not enlarged.
    #[instrument(skip(self, bytes), fields(input_len = bytes.len()))]
    pub fn create_thumbnail(&self, bytes: &[u8], size: u32) -> Option<Vec<u8>> {
        let result = decode(bytes).and_then(|image| {
            let image = if image.width() > size || image.height() > size {
                image.resize(size, size, FilterType::Lanczos3)
            } else {
                image
            };

            if image.color().has_alpha() {
                encode_png(&image)
            } else {
                encode_jpeg(&image, self.images.jpeg_quality)
            }
        });

        match result {
            Ok(thumbnail) => Some(thumbnail),
            Err(err) => {
                warn!(error = %err, "Thumbnail creation failed");
                None
            }
        }
    }
}

/// Inspect an encoded image. `None` when it cannot be decoded.
pub fn image_info(bytes: &[u8]) -> Option<ImageInfo> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format().ok()?;
    let format = reader.format()?;
    let image = reader.decode().ok()?;
    let (width, height) = (image.width(), image.height());

    Some(ImageInfo {
        width,
        height,
        format: format!("{:?}", format).to_uppercase(),
        color_type: format!("{:?}", image.color()),
        size_bytes: bytes.len(),
        is_small: width < 300 || height < 300,
        aspect_ratio: if height > 0 { width as f64 / height as f64 } else { 1.0 },
    })
}

/// Scale so the smaller side lands exactly on `min_size`, keeping the aspect ratio.
fn upscaled_dimensions(width: u32, height: u32, min_size: u32) -> (u32, u32) {
    let shorter = width.min(height).max(1);
    let scale = min_size as f64 / shorter as f64;
    let scaled = |side: u32| {
        if side == shorter {
            min_size
        } else {
            (side as f64 * scale).round() as u32
        }
    };
    (scaled(width), scaled(height))
}

fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}

/// Run an enhancement step, keeping the input when it fails.
fn apply_step<F>(image: DynamicImage, step: &str, operation: F) -> DynamicImage
where
    F: FnOnce(&DynamicImage) -> Result<DynamicImage>,
{
    match operation(&image) {
        Ok(enhanced) => enhanced,
        Err(err) => {
            warn!(step, error = %err, "Enhancement step failed, continuing without it");
            image
        }
    }
}

fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let rgb = flatten_on_white(image).to_rgb8();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    rgb.write_with_encoder(encoder)
        .map_err(|e| DocmeterError::image_processing_with_source("JPEG encoding failed", e))?;
    Ok(buffer)
}

fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut buffer, CompressionType::Best, PngFilter::Adaptive);
    image
        .write_with_encoder(encoder)
        .map_err(|e| DocmeterError::image_processing_with_source("PNG encoding failed", e))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

    fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, format).unwrap();
        buffer.into_inner()
    }

    fn rgb(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([120, 80, 40])))
    }

    fn rgba(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([120, 80, 40, 100])))
    }

    fn dimensions(bytes: &[u8]) -> (u32, u32) {
        let image = image::load_from_memory(bytes).unwrap();
        (image.width(), image.height())
    }

    #[test]
    fn test_small_image_upscaled_to_min_size() {
        let optimized = ImageOptimizer::default().optimize(&encode(&rgb(100, 50), ImageFormat::Png));

        assert_eq!(optimized.format, OutputFormat::Jpeg);
        assert_eq!((optimized.width, optimized.height), (Some(600), Some(300)));
        assert_eq!(dimensions(&optimized.data), (600, 300));
    }

    #[test]
    fn test_upscaled_shorter_side_is_exact() {
        let optimized = ImageOptimizer::default().optimize(&encode(&rgb(281, 290), ImageFormat::Png));
        assert_eq!(dimensions(&optimized.data), (300, 310));

        assert_eq!(upscaled_dimensions(299, 291, 300), (308, 300));
        assert_eq!(upscaled_dimensions(64, 64, 300), (300, 300));
    }

    #[test]
    fn test_only_one_small_side_not_upscaled() {
        let optimized = ImageOptimizer::default().optimize(&encode(&rgb(400, 100), ImageFormat::Png));
        assert_eq!(dimensions(&optimized.data), (400, 100));
    }

    #[test]
    fn test_large_image_fit_within_bounds() {
        let optimized = ImageOptimizer::default().optimize(&encode(&rgb(4800, 1200), ImageFormat::Png));
        assert_eq!(dimensions(&optimized.data), (2400, 600));
    }

    #[test]
    fn test_alpha_kept_as_png() {
        let optimized = ImageOptimizer::default().optimize(&encode(&rgba(320, 320), ImageFormat::Png));

        assert_eq!(optimized.format, OutputFormat::Png);
        assert_eq!(image::guess_format(&optimized.data).unwrap(), ImageFormat::Png);
        assert!(image::load_from_memory(&optimized.data).unwrap().color().has_alpha());
    }

    #[test]
    fn test_undecodable_bytes_passed_through() {
        let optimizer = ImageOptimizer::default();
        let optimized = optimizer.optimize(b"garbage");
        assert_eq!(optimized.format, OutputFormat::Original);
        assert_eq!(optimized.data, b"garbage");
        assert_eq!(optimized.width, None);

        assert_eq!(optimizer.enhance_image_quality(b"garbage", &EnhanceOptions::default()), b"garbage");
        assert_eq!(optimizer.convert_to_web_format(b"garbage"), b"garbage");
        assert!(optimizer.create_thumbnail(b"garbage", 200).is_none());
    }

    #[test]
    fn test_save_image_renames_png_for_jpeg_output() {
        let optimizer = ImageOptimizer::default();

        let saved = optimizer.save_image(&encode(&rgb(320, 320), ImageFormat::Png), "doc_image_0.png");
        assert_eq!(saved.file_name, "doc_image_0.jpg");

        let saved = optimizer.save_image(&encode(&rgba(320, 320), ImageFormat::Png), "doc_image_1.png");
        assert_eq!(saved.file_name, "doc_image_1.png");

        let saved = optimizer.save_image(b"garbage", "doc_image_2.png");
        assert_eq!(saved.file_name, "doc_image_2.png");
    }

    #[test]
    fn test_enhance_upscales_and_encodes_jpeg() {
        let options = EnhanceOptions {
            denoise: true,
            ..Default::default()
        };
        let enhanced = ImageOptimizer::default().enhance_image_quality(&encode(&rgb(200, 600), ImageFormat::Png), &options);

        assert_eq!(image::guess_format(&enhanced).unwrap(), ImageFormat::Jpeg);
        assert_eq!(dimensions(&enhanced), (400, 1200));
    }

    #[test]
    fn test_enhance_without_upscale_keeps_size() {
        let options = EnhanceOptions {
            upscale: false,
            ..Default::default()
        };
        let enhanced = ImageOptimizer::default().enhance_image_quality(&encode(&rgba(100, 100), ImageFormat::Png), &options);

        assert_eq!(image::guess_format(&enhanced).unwrap(), ImageFormat::Png);
        assert_eq!(dimensions(&enhanced), (100, 100));
    }

    #[test]
    fn test_web_format_caps_and_flattens() {
        let web = ImageOptimizer::default().convert_to_web_format(&encode(&rgba(3200, 800), ImageFormat::Png));

        assert_eq!(image::guess_format(&web).unwrap(), ImageFormat::Jpeg);
        assert_eq!(dimensions(&web), (1600, 400));
    }

    #[test]
    fn test_thumbnail() {
        let optimizer = ImageOptimizer::default();

        let thumbnail = optimizer.create_thumbnail(&encode(&rgb(800, 400), ImageFormat::Png), 200).unwrap();
        assert_eq!(dimensions(&thumbnail), (200, 100));
        assert_eq!(image::guess_format(&thumbnail).unwrap(), ImageFormat::Jpeg);

        let thumbnail = optimizer.create_thumbnail(&encode(&rgba(50, 50), ImageFormat::Png), 200).unwrap();
        assert_eq!(dimensions(&thumbnail), (50, 50));
        assert_eq!(image::guess_format(&thumbnail).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_image_info() {
        let bytes = encode(&rgb(640, 200), ImageFormat::Png);
        let info = image_info(&bytes).unwrap();

        assert_eq!(info.width, 640);
        assert_eq!(info.height, 200);
        assert_eq!(info.format, "PNG");
        assert_eq!(info.color_type, "Rgb8");
        assert_eq!(info.size_bytes, bytes.len());
        assert!(info.is_small);
        assert!((info.aspect_ratio - 3.2).abs() < 1e-9);

        assert!(image_info(b"nope").is_none());
    }
}
