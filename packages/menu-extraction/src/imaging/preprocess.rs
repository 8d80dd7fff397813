//! Image preprocessing profiles.
//!
//! Two profiles are used: one that makes printed blocks stand out for
//! contour detection, and one that prepares text for recognition.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage};
use imageproc::contrast::{adaptive_threshold, threshold, ThresholdType};
use imageproc::filter::median_filter;

use crate::error::{ExtractionError, Result};
use crate::types::config::PreprocessConfig;

fn ensure_not_empty(image: &DynamicImage) -> Result<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ExtractionError::Imaging(format!(
            "cannot preprocess a {}x{} image",
            image.width(),
            image.height()
        )));
    }
    Ok(())
}

/// Grayscale, locally adaptive threshold, inverted.
///
/// Ink ends up as foreground (255) on a black background, which is what
/// contour tracing expects.
pub fn contour_profile(image: &DynamicImage, config: &PreprocessConfig) -> Result<GrayImage> {
    ensure_not_empty(image)?;

    let gray = image.to_luma8();
    let mut binary = adaptive_threshold(&gray, config.adaptive_block_radius.max(1));
    imageops::invert(&mut binary);
    Ok(binary)
}

/// Grayscale, upscaled, smoothed and binarized for OCR.
pub fn ocr_profile(image: &DynamicImage, config: &PreprocessConfig) -> Result<GrayImage> {
    ensure_not_empty(image)?;

    let gray = image.to_luma8();
    let scale = if config.upscale > 0.0 { config.upscale } else { 1.0 };
    let width = ((gray.width() as f32) * scale).round().max(1.0) as u32;
    let height = ((gray.height() as f32) * scale).round().max(1.0) as u32;

    let resized = if (width, height) == gray.dimensions() {
        gray
    } else {
        imageops::resize(&gray, width, height, FilterType::CatmullRom)
    };

    let smoothed = if config.denoise_radius > 0 {
        median_filter(&resized, config.denoise_radius, config.denoise_radius)
    } else {
        resized
    };

    Ok(threshold(
        &smoothed,
        config.binarize_level,
        ThresholdType::Binary,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    fn page_with_block() -> DynamicImage {
        let mut img = GrayImage::from_pixel(120, 80, Luma([255]));
        draw_filled_rect_mut(&mut img, Rect::at(30, 20).of_size(40, 30), Luma([0]));
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn test_contour_profile_marks_ink_as_foreground() {
        let profile = contour_profile(&page_with_block(), &PreprocessConfig::default()).unwrap();

        assert_eq!(profile.dimensions(), (120, 80));
        // plain paper stays background
        assert_eq!(profile.get_pixel(5, 5)[0], 0);
        // block edge is foreground
        assert_eq!(profile.get_pixel(30, 35)[0], 255);
    }

    #[test]
    fn test_ocr_profile_upscales_and_binarizes() {
        let profile = ocr_profile(&page_with_block(), &PreprocessConfig::default()).unwrap();

        assert_eq!(profile.dimensions(), (180, 120));
        assert!(profile.pixels().all(|p| p[0] == 0 || p[0] == 255));
        assert_eq!(profile.get_pixel(2, 2)[0], 255);
        assert_eq!(profile.get_pixel(75, 52)[0], 0);
    }

    #[test]
    fn test_empty_image_is_an_error() {
        let empty = DynamicImage::new_luma8(0, 0);
        let config = PreprocessConfig::default();

        assert!(matches!(
            contour_profile(&empty, &config),
            Err(ExtractionError::Imaging(_))
        ));
        assert!(ocr_profile(&empty, &config).is_err());
    }
}
