//! Synthetic picture data
//!
//! Deterministic JPEG stills so capture, storage and thumbnail paths can be
//! exercised without camera hardware.

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;

/// Raw RGB24 gradient that shifts with `seed`
pub fn synthetic_rgb(width: u32, height: u32, seed: u64) -> Vec<u8> {
    let mut data = vec![0u8; (width as usize) * (height as usize) * 3];

    let base = (seed % 256) as u8;
    for y in 0..height {
        for x in 0..width {
            let idx = ((y as usize) * (width as usize) + x as usize) * 3;
            data[idx] = base.wrapping_add((x % 256) as u8);
            data[idx + 1] = base.wrapping_add((y % 256) as u8);
            data[idx + 2] = base.wrapping_add(((x + y) % 256) as u8);
        }
    }

    data
}

/// JPEG-encoded gradient still, as a camera would deliver it
pub fn synthetic_jpeg(width: u32, height: u32, quality: u8, seed: u64) -> Vec<u8> {
    let rgb = synthetic_rgb(width, height, seed);
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
        .encode(&rgb, width, height, ExtendedColorType::Rgb8)
        .expect("in-memory JPEG encoding of a valid RGB buffer");
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jpeg_markers() {
        let jpeg = synthetic_jpeg(32, 16, 100, 0);
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        assert_eq!(&jpeg[jpeg.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_seed_changes_content() {
        assert_ne!(synthetic_rgb(8, 8, 0), synthetic_rgb(8, 8, 1));
    }
}
