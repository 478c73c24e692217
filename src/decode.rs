//! Reading QR codes back out of images.
//!
//! Detection and symbol decoding are done by `rqrr`; this module feeds it a
//! grayscale copy of the image and maps its outcome onto [`QrError`].

use std::path::Path;

use image::{DynamicImage, ImageError};

use crate::error::{QrError, QrResult};

/// Decodes the first readable QR code in `image`.
///
/// # Errors
///
/// Returns [`QrError::NotFound`] if no grid is detected or none decodes.
pub fn decode_image(image: &DynamicImage) -> QrResult<String> {
    let luma = image.to_luma8();
    let (width, height) = luma.dimensions();
    let mut prepared =
        rqrr::PreparedImage::prepare_from_greyscale(width as usize, height as usize, |x, y| {
            luma.get_pixel(x as u32, y as u32)[0]
        });

    let grids = prepared.detect_grids();
    if grids.is_empty() {
        return Err(QrError::not_found("no QR code detected"));
    }

    let mut last_error = None;
    for grid in &grids {
        match grid.decode() {
            Ok((_meta, content)) => return Ok(content),
            Err(e) => last_error = Some(e),
        }
    }
    Err(QrError::not_found(match last_error {
        Some(e) => format!("QR code detected but unreadable: {e:?}"),
        None => "no QR code decoded".to_string(),
    }))
}

/// Decodes a QR code from encoded image bytes (PNG, JPEG, ...).
pub fn decode_bytes(bytes: &[u8]) -> QrResult<String> {
    let image = image::load_from_memory(bytes).map_err(into_io)?;
    decode_image(&image)
}

/// Decodes a QR code from an image file.
///
/// # Errors
///
/// Returns [`QrError::Io`] if the file is missing or not a decodable image and
/// [`QrError::NotFound`] if it holds no readable QR code.
pub fn decode_file(path: impl AsRef<Path>) -> QrResult<String> {
    let image = image::open(path.as_ref()).map_err(into_io)?;
    decode_image(&image)
}

fn into_io(err: ImageError) -> QrError {
    match err {
        ImageError::IoError(e) => QrError::Io(e),
        other => QrError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, other)),
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;
    use crate::matrix::{encode, EncodeOptions};
    use crate::raster::rasterize;

    #[test]
    fn raster_round_trip() {
        for content in ["Hello, World!", "http://example.com", "1234567890"] {
            let matrix = encode(content, &EncodeOptions::default()).unwrap();
            let img = rasterize(&matrix, 300).unwrap();
            let decoded = decode_image(&DynamicImage::ImageRgba8(img)).unwrap();
            assert_eq!(decoded, content);
        }
    }

    #[test]
    fn utf8_round_trip() {
        let content = "沉默王二 says hi";
        let matrix = encode(content, &EncodeOptions::default()).unwrap();
        let img = rasterize(&matrix, 400).unwrap();
        assert_eq!(decode_image(&DynamicImage::ImageRgba8(img)).unwrap(), content);
    }

    #[test]
    fn blank_image_has_no_code() {
        let img = RgbaImage::from_pixel(200, 200, Rgba([255, 255, 255, 255]));
        let err = decode_image(&DynamicImage::ImageRgba8(img)).unwrap_err();
        assert!(matches!(err, QrError::NotFound(_)));
    }

    #[test]
    fn missing_file_is_io() {
        let err = decode_file("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, QrError::Io(_)));
    }

    #[test]
    fn garbage_bytes_are_io() {
        let err = decode_bytes(b"not an image").unwrap_err();
        assert!(matches!(err, QrError::Io(_)));
    }
}
