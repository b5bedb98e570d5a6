// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page image loading and saving. Every decoded page is converted to 8-bit RGB,
// the only layout the engine's algorithms read.

use std::io::Cursor;
use std::path::Path;

use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader, RgbImage};
use pagescan_core::error::{PageScanError, Result};
use tracing::{debug, info, instrument};

/// Decode a page from encoded bytes (JPEG, PNG, TIFF, ...).
#[instrument(skip(data), fields(data_len = data.len()))]
pub fn decode_page(data: &[u8]) -> Result<RgbImage> {
    let image = image::load_from_memory(data)
        .map_err(|err| PageScanError::ImageError(format!("failed to decode page image: {err}")))?;
    Ok(to_rgb(image))
}

/// Open and decode a page from disk.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn open_page(path: impl AsRef<Path>) -> Result<RgbImage> {
    let path = path.as_ref();
    let image = image::open(path).map_err(|err| {
        PageScanError::ImageError(format!("failed to open page image {}: {err}", path.display()))
    })?;
    Ok(to_rgb(image))
}

/// Decode a page from encoded bytes along with its EXIF orientation.
///
/// The pixels are returned as stored; the orientation is not applied.
#[instrument(skip(data), fields(data_len = data.len()))]
pub fn decode_page_with_orientation(data: &[u8]) -> Result<(RgbImage, Orientation)> {
    let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
    decode_with_orientation(reader, "<memory>")
}

/// Open a page from disk along with its EXIF orientation.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn open_page_with_orientation(path: impl AsRef<Path>) -> Result<(RgbImage, Orientation)> {
    let path = path.as_ref();
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    decode_with_orientation(reader, &path.display().to_string())
}

fn decode_with_orientation<R>(
    reader: ImageReader<R>,
    source: &str,
) -> Result<(RgbImage, Orientation)>
where
    R: std::io::BufRead + std::io::Seek,
{
    let image_error = |err: image::ImageError| {
        PageScanError::ImageError(format!("failed to decode page image {source}: {err}"))
    };
    let mut decoder = reader.into_decoder().map_err(image_error)?;
    let orientation = decoder.orientation().map_err(image_error)?;
    let image = DynamicImage::from_decoder(decoder).map_err(image_error)?;
    debug!(?orientation, "Page orientation read");
    Ok((to_rgb(image), orientation))
}

/// Write a rendered page; the format follows the file extension.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn save_page(image: &RgbImage, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    image.save(path).map_err(|err| {
        PageScanError::ImageError(format!("failed to save page image {}: {err}", path.display()))
    })?;
    info!(width = image.width(), height = image.height(), "Page saved");
    Ok(())
}

fn to_rgb(image: DynamicImage) -> RgbImage {
    info!(width = image.width(), height = image.height(), "Page image loaded");
    match image {
        DynamicImage::ImageRgb8(rgb) => rgb,
        other => other.to_rgb8(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(image: DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
        bytes
    }

    #[test]
    fn decodes_png_to_rgb() {
        let src = RgbImage::from_pixel(3, 2, Rgb([10, 20, 30]));
        let page = decode_page(&png_bytes(DynamicImage::ImageRgb8(src.clone()))).unwrap();
        assert_eq!(page, src);
    }

    #[test]
    fn alpha_is_dropped() {
        let src = RgbaImage::from_pixel(2, 2, Rgba([200, 100, 50, 128]));
        let page = decode_page(&png_bytes(DynamicImage::ImageRgba8(src))).unwrap();
        assert_eq!(*page.get_pixel(1, 1), Rgb([200, 100, 50]));
    }

    #[test]
    fn garbage_is_an_image_error() {
        let err = decode_page(b"definitely not an image").unwrap_err();
        assert!(matches!(err, PageScanError::ImageError(_)));
    }

    #[test]
    fn saved_page_opens_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page-0001.png");
        let src = RgbImage::from_fn(5, 4, |x, y| Rgb([x as u8 * 50, y as u8 * 60, 9]));
        save_page(&src, &path).unwrap();
        assert_eq!(open_page(&path).unwrap(), src);
    }

    #[test]
    fn untagged_page_has_no_orientation() {
        let src = RgbImage::from_pixel(4, 3, Rgb([1, 2, 3]));
        let bytes = png_bytes(DynamicImage::ImageRgb8(src.clone()));
        let (page, orientation) = decode_page_with_orientation(&bytes).unwrap();
        assert_eq!(page, src);
        assert_eq!(orientation, Orientation::NoTransforms);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page-0002.png");
        save_page(&src, &path).unwrap();
        let (page, orientation) = open_page_with_orientation(&path).unwrap();
        assert_eq!(page, src);
        assert_eq!(orientation, Orientation::NoTransforms);
    }

    #[test]
    fn oriented_decode_rejects_garbage() {
        let err = decode_page_with_orientation(b"still not an image").unwrap_err();
        assert!(matches!(err, PageScanError::ImageError(_)));
        let err = open_page_with_orientation("/nonexistent/page-0003.jpg").unwrap_err();
        assert!(matches!(err, PageScanError::Io(_)));
    }

    #[test]
    fn missing_file_is_an_image_error() {
        let err = open_page("/nonexistent/page-0001.png").unwrap_err();
        assert!(matches!(err, PageScanError::ImageError(_)));
    }
}
