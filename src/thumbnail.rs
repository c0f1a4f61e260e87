//! Bounded, orientation-corrected decoding of saved captures for display.

use crate::constants::{THUMBNAIL_MAX_HEIGHT, THUMBNAIL_MAX_WIDTH};
use crate::errors::CameraError;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageDecoder, ImageReader};
use std::path::{Path, PathBuf};

/// A saved capture as handed to the display layer
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub path: PathBuf,
    /// `None` when the file could not be decoded.
    pub image: Option<DynamicImage>,
}

impl Thumbnail {
    /// Decode `path` within the default 1024x1024 bound, keeping the path
    /// even if decoding fails.
    pub fn for_file(path: &Path) -> Self {
        let image = match load_thumbnail(path, THUMBNAIL_MAX_WIDTH, THUMBNAIL_MAX_HEIGHT) {
            Ok(image) => Some(image),
            Err(e) => {
                log::warn!("Could not decode thumbnail for {}: {}", path.display(), e);
                None
            }
        };
        Self {
            path: path.to_path_buf(),
            image,
        }
    }
}

/// Integer downsampling factor for a `width`x`height` image shown at about
/// `req_width`x`req_height`.
///
/// Starts from the smaller of the rounded height and width ratios, then grows
/// until the sampled image holds at most twice the requested pixel count.
pub fn in_sample_size(width: u32, height: u32, req_width: u32, req_height: u32) -> u32 {
    let mut sample = 1u32;
    if req_width == 0 || req_height == 0 {
        return sample;
    }

    if height > req_height || width > req_width {
        let height_ratio = (height as f32 / req_height as f32).round() as u32;
        let width_ratio = (width as f32 / req_width as f32).round() as u32;
        sample = height_ratio.min(width_ratio).max(1);

        let total_pixels = width as u64 * height as u64;
        let pixel_cap = req_width as u64 * req_height as u64 * 2;
        while total_pixels / (sample as u64 * sample as u64) > pixel_cap {
            sample += 1;
        }
    }
    sample
}

/// Decode an image file, downsample it toward `max_width`x`max_height` and
/// apply its EXIF orientation.
pub fn load_thumbnail(
    path: &Path,
    max_width: u32,
    max_height: u32,
) -> Result<DynamicImage, CameraError> {
    let mut decoder = ImageReader::open(path)?
        .with_guessed_format()?
        .into_decoder()?;
    let orientation = decoder.orientation()?;
    let image = DynamicImage::from_decoder(decoder)?;

    let (width, height) = image.dimensions();
    let sample = in_sample_size(width, height, max_width, max_height);
    let mut image = if sample > 1 {
        image.resize_exact(
            (width / sample).max(1),
            (height / sample).max(1),
            FilterType::Triangle,
        )
    } else {
        image
    };
    image.apply_orientation(orientation);
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::synthetic_jpeg;

    #[test]
    fn test_small_image_is_not_sampled() {
        assert_eq!(in_sample_size(800, 600, 1024, 1024), 1);
        assert_eq!(in_sample_size(1024, 1024, 1024, 1024), 1);
    }

    #[test]
    fn test_sample_size_uses_smaller_ratio() {
        // 4096/1024 = 4 for both ratios
        assert_eq!(in_sample_size(4096, 4096, 1024, 1024), 4);
        // height ratio 1, width ratio 3 -> 1, then 3072*1024/1 > 2*1024*1024 -> 2
        assert_eq!(in_sample_size(3072, 1024, 1024, 1024), 2);
    }

    #[test]
    fn test_panorama_is_sampled_further() {
        // height ratio rounds to 0, width ratio 8
        let sample = in_sample_size(8192, 400, 1024, 1024);
        assert!(8192u64 * 400 / (sample as u64 * sample as u64) <= 2 * 1024 * 1024);
        assert!(sample >= 1);
    }

    #[test]
    fn test_zero_request_is_identity() {
        assert_eq!(in_sample_size(4000, 3000, 0, 0), 1);
    }

    #[test]
    fn test_load_thumbnail_downsamples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IMG_test.jpg");
        std::fs::write(&path, synthetic_jpeg(2048, 1536, 80, 0)).unwrap();

        let image = load_thumbnail(&path, 1024, 1024).unwrap();
        assert_eq!(image.dimensions(), (1024, 768));
    }

    #[test]
    fn test_thumbnail_keeps_path_on_decode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IMG_broken.jpg");
        std::fs::write(&path, b"not a jpeg").unwrap();

        let thumbnail = Thumbnail::for_file(&path);
        assert_eq!(thumbnail.path, path);
        assert!(thumbnail.image.is_none());
    }
}
