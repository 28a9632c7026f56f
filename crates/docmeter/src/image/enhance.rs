//! Pixel-level enhancement primitives.
//!
//! Sharpness and contrast follow the blend-with-degenerate model of classic
//! imaging libraries: the output is `degenerate + factor * (image - degenerate)`,
//! so a factor of 1.0 returns the input, values above 1.0 move away from the
//! degenerate image and values below 1.0 towards it. Alpha is preserved.

use crate::{DocmeterError, Result};
use image::{DynamicImage, Rgba, RgbaImage};

/// 3×3 smoothing kernel used as the degenerate image for sharpening.
const SMOOTH_KERNEL: [[u32; 3]; 3] = [[1, 1, 1], [1, 5, 1], [1, 1, 1]];
const SMOOTH_KERNEL_SUM: u32 = 13;

fn ensure_not_empty(image: &DynamicImage, operation: &str) -> Result<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(DocmeterError::image_processing(format!(
            "cannot {} an empty {}x{} image",
            operation,
            image.width(),
            image.height()
        )));
    }
    Ok(())
}

/// Return an RGBA working buffer and the kind of image to rebuild from it.
fn working_copy(image: &DynamicImage) -> (RgbaImage, bool) {
    (image.to_rgba8(), image.color().has_alpha())
}

fn rebuild(buffer: RgbaImage, has_alpha: bool) -> DynamicImage {
    let image = DynamicImage::ImageRgba8(buffer);
    if has_alpha {
        image
    } else {
        DynamicImage::ImageRgb8(image.to_rgb8())
    }
}

fn blend_channel(degenerate: u8, original: u8, factor: f32) -> u8 {
    let value = degenerate as f32 + factor * (original as f32 - degenerate as f32);
    value.round().clamp(0.0, 255.0) as u8
}

/// Sharpen (factor > 1) or soften (factor < 1) an image.
///
/// Border pixels have no full neighbourhood and are left unchanged.
pub fn sharpen(image: &DynamicImage, factor: f32) -> Result<DynamicImage> {
    ensure_not_empty(image, "sharpen")?;

    let (source, has_alpha) = working_copy(image);
    let (width, height) = source.dimensions();
    let mut output = source.clone();

    if width >= 3 && height >= 3 {
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let mut sums = [0u32; 3];
                for (ky, row) in SMOOTH_KERNEL.iter().enumerate() {
                    for (kx, weight) in row.iter().enumerate() {
                        let Rgba(pixel) = *source.get_pixel(x + kx as u32 - 1, y + ky as u32 - 1);
                        for channel in 0..3 {
                            sums[channel] += pixel[channel] as u32 * weight;
                        }
                    }
                }

                let Rgba(original) = *source.get_pixel(x, y);
                let mut sharpened = original;
                for channel in 0..3 {
                    let smoothed = ((sums[channel] + SMOOTH_KERNEL_SUM / 2) / SMOOTH_KERNEL_SUM) as u8;
                    sharpened[channel] = blend_channel(smoothed, original[channel], factor);
                }
                output.put_pixel(x, y, Rgba(sharpened));
            }
        }
    }

    Ok(rebuild(output, has_alpha))
}

/// Increase (factor > 1) or reduce (factor < 1) contrast around the mean grey level.
pub fn adjust_contrast(image: &DynamicImage, factor: f32) -> Result<DynamicImage> {
    ensure_not_empty(image, "adjust the contrast of")?;

    let luma = image.to_luma8();
    let total: u64 = luma.pixels().map(|pixel| pixel.0[0] as u64).sum();
    let pixel_count = luma.width() as u64 * luma.height() as u64;
    let mean = ((total as f64 / pixel_count as f64) + 0.5).floor().clamp(0.0, 255.0) as u8;

    let (mut buffer, has_alpha) = working_copy(image);
    for pixel in buffer.pixels_mut() {
        for channel in 0..3 {
            pixel.0[channel] = blend_channel(mean, pixel.0[channel], factor);
        }
    }

    Ok(rebuild(buffer, has_alpha))
}

/// 3×3 median filter.
pub fn median_denoise(image: &DynamicImage) -> Result<DynamicImage> {
    ensure_not_empty(image, "denoise")?;

    let denoised = if image.color().has_alpha() {
        DynamicImage::ImageRgba8(imageproc::filter::median_filter(&image.to_rgba8(), 1, 1))
    } else {
        DynamicImage::ImageRgb8(imageproc::filter::median_filter(&image.to_rgb8(), 1, 1))
    };
    Ok(denoised)
}

/// Composite an image onto a white background, dropping the alpha channel.
pub fn flatten_on_white(image: &DynamicImage) -> DynamicImage {
    if !image.color().has_alpha() {
        return DynamicImage::ImageRgb8(image.to_rgb8());
    }

    let rgba = image.to_rgba8();
    let flattened = image::RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
        let alpha = a as f32 / 255.0;
        let over_white = |channel: u8| (channel as f32 * alpha + 255.0 * (1.0 - alpha)).round() as u8;
        image::Rgb([over_white(r), over_white(g), over_white(b)])
    });
    DynamicImage::ImageRgb8(flattened)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn checkerboard(size: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(size, size, |x, y| {
            if (x + y) % 2 == 0 { Rgb([200, 200, 200]) } else { Rgb([50, 50, 50]) }
        }))
    }

    #[test]
    fn test_sharpen_identity_factor() {
        let image = checkerboard(6);
        let sharpened = sharpen(&image, 1.0).unwrap();
        assert_eq!(sharpened.to_rgb8(), image.to_rgb8());
    }

    #[test]
    fn test_sharpen_increases_local_contrast() {
        let image = checkerboard(6);
        let sharpened = sharpen(&image, 1.5).unwrap().to_rgb8();

        let original = image.to_rgb8();
        assert!(sharpened.get_pixel(2, 2).0[0] >= original.get_pixel(2, 2).0[0]);
        assert!(sharpened.get_pixel(2, 3).0[0] <= original.get_pixel(2, 3).0[0]);
        // borders untouched
        assert_eq!(sharpened.get_pixel(0, 0), original.get_pixel(0, 0));
    }

    #[test]
    fn test_sharpen_keeps_alpha() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 128])));
        let sharpened = sharpen(&image, 1.2).unwrap();
        assert!(sharpened.color().has_alpha());
        assert_eq!(sharpened.to_rgba8().get_pixel(1, 1).0[3], 128);
    }

    #[test]
    fn test_contrast_spreads_values() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_fn(2, 1, |x, _| {
            if x == 0 { Rgb([100, 100, 100]) } else { Rgb([150, 150, 150]) }
        }));

        let contrasted = adjust_contrast(&image, 1.2).unwrap().to_rgb8();
        assert!(contrasted.get_pixel(0, 0).0[0] < 100);
        assert!(contrasted.get_pixel(1, 0).0[0] > 150);
    }

    #[test]
    fn test_median_removes_speck() {
        let mut buffer = RgbImage::from_pixel(5, 5, Rgb([0, 0, 0]));
        buffer.put_pixel(2, 2, Rgb([255, 255, 255]));

        let denoised = median_denoise(&DynamicImage::ImageRgb8(buffer)).unwrap().to_rgb8();
        assert_eq!(denoised.get_pixel(2, 2), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_empty_image_rejected() {
        let empty = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        assert!(sharpen(&empty, 1.2).is_err());
        assert!(adjust_contrast(&empty, 1.2).is_err());
        assert!(median_denoise(&empty).is_err());
    }

    #[test]
    fn test_flatten_on_white() {
        let transparent = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0])));
        let flattened = flatten_on_white(&transparent);
        assert!(!flattened.color().has_alpha());
        assert_eq!(flattened.to_rgb8().get_pixel(0, 0), &Rgb([255, 255, 255]));
    }
}
