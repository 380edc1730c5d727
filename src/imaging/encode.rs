//! Decoding, flattening, resampling and encoding of page images.
//!
//! The WebP encoder shipped with `image` is lossless only, so WebP output ignores any quality
//! setting. JPEG output is baseline.

use std::fs;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageError, ImageReader, Rgb, RgbImage};

use crate::error::PrepError;

/// Container written by [`save_image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// PNG with maximum compression and adaptive filtering.
    Png,
    /// Baseline JPEG at the given quality (clamped to 1–100).
    Jpeg {
        /// Encoder quality.
        quality: u8,
    },
    /// Lossless WebP.
    WebP,
}

/// Decode an image from disk.
pub fn load_image(path: &Path) -> Result<DynamicImage, PrepError> {
    if !path.exists() {
        return Err(PrepError::NotFound(path.to_path_buf()));
    }
    image::open(path).map_err(|source| PrepError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Decode an image with the decoder's allocation limits lifted, for oversized sources.
pub fn load_image_unbounded(path: &Path) -> Result<DynamicImage, PrepError> {
    let mut reader = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|err| PrepError::io(path, err))?;
    reader.no_limits();
    reader.decode().map_err(|source| PrepError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Composite any transparency onto a white background, returning an RGB image.
pub fn flatten_onto_white(image: &DynamicImage) -> DynamicImage {
    if !image.color().has_alpha() {
        return DynamicImage::ImageRgb8(image.to_rgb8());
    }

    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let flattened = RgbImage::from_fn(width, height, |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = u32::from(a);
        let blend = |channel: u8| ((u32::from(channel) * alpha + 255 * (255 - alpha)) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    });
    DynamicImage::ImageRgb8(flattened)
}

/// Resample to exactly `width` × `height` with Lanczos3; a no-op at the current size.
pub fn resize_to(image: DynamicImage, width: u32, height: u32) -> DynamicImage {
    if image.dimensions() == (width, height) {
        image
    } else {
        image.resize_exact(width, height, FilterType::Lanczos3)
    }
}

/// Encode `image` into an in-memory buffer.
pub fn encode_image(image: &DynamicImage, format: OutputFormat) -> Result<Vec<u8>, ImageError> {
    let mut buffer = Vec::new();
    match format {
        OutputFormat::Png => {
            let encoder = PngEncoder::new_with_quality(
                &mut buffer,
                CompressionType::Best,
                PngFilter::Adaptive,
            );
            image.write_with_encoder(encoder)?;
        }
        OutputFormat::Jpeg { quality } => {
            let rgb = flatten_onto_white(image);
            let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
            rgb.write_with_encoder(encoder)?;
        }
        OutputFormat::WebP => {
            let rgba = DynamicImage::ImageRgba8(image.to_rgba8());
            let encoder = WebPEncoder::new_lossless(&mut buffer);
            rgba.write_with_encoder(encoder)?;
        }
    }
    Ok(buffer)
}

/// Encode and write `image` to `path`, creating parent directories. Returns the byte size.
pub fn save_image(
    image: &DynamicImage,
    path: &Path,
    format: OutputFormat,
) -> Result<u64, PrepError> {
    let bytes = encode_image(image, format).map_err(|source| PrepError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| PrepError::io(parent, err))?;
    }
    fs::write(path, &bytes).map_err(|err| PrepError::io(path, err))?;
    Ok(bytes.len() as u64)
}

/// Size of a file in bytes.
pub fn file_size(path: &Path) -> Result<u64, PrepError> {
    fs::metadata(path)
        .map(|metadata| metadata.len())
        .map_err(|err| PrepError::io(path, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::tempdir;

    fn translucent() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(4, 2, |x, _| {
            if x < 2 {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([10, 20, 30, 255])
            }
        }))
    }

    #[test]
    fn flattening_blends_onto_white() {
        let flat = flatten_onto_white(&translucent()).to_rgb8();
        assert_eq!(flat.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(flat.get_pixel(3, 1).0, [10, 20, 30]);
    }

    #[test]
    fn half_transparent_pixels_are_mixed() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 128])));
        let [r, _, _] = flatten_onto_white(&image).to_rgb8().get_pixel(0, 0).0;
        assert!((126..=128).contains(&r));
    }

    #[test]
    fn resize_preserves_identity_and_changes_size() {
        let image = translucent();
        assert_eq!(resize_to(image.clone(), 4, 2).dimensions(), (4, 2));
        assert_eq!(resize_to(image, 2, 1).dimensions(), (2, 1));
    }

    #[test]
    fn saves_every_format_and_reads_back_dimensions() {
        let dir = tempdir().unwrap();
        let image = translucent();
        for (name, format) in [
            ("a.png", OutputFormat::Png),
            ("a.jpg", OutputFormat::Jpeg { quality: 85 }),
            ("a.webp", OutputFormat::WebP),
        ] {
            let path = dir.path().join("out").join(name);
            let size = save_image(&image, &path, format).unwrap();
            assert_eq!(size, file_size(&path).unwrap());
            assert_eq!(load_image(&path).unwrap().dimensions(), (4, 2));
        }
    }

    #[test]
    fn missing_and_corrupt_inputs_are_typed() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            load_image(&dir.path().join("none.png")),
            Err(PrepError::NotFound(_))
        ));
        let bad = dir.path().join("bad.png");
        fs::write(&bad, b"not an image").unwrap();
        assert!(matches!(load_image(&bad), Err(PrepError::Decode { .. })));
        assert!(matches!(
            load_image_unbounded(&dir.path().join("none.png")),
            Err(PrepError::NotFound(_))
        ));
    }
}
