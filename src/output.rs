use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageEncoder, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{QrError, QrResult};

/// Encoding of the final image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Lossy; the alpha channel is dropped.
    Jpeg { quality: u8 },
    Png,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Jpeg { quality: 90 }
    }
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg { .. } => "jpg",
            Self::Png => "png",
        }
    }
}

/// Encodes `canvas` into an in-memory byte buffer.
///
/// # Errors
///
/// Returns [`QrError::Serialization`] if the encoder rejects the image.
pub fn serialize(canvas: &RgbaImage, format: OutputFormat) -> QrResult<Vec<u8>> {
    let mut buf = Vec::new();
    let (width, height) = canvas.dimensions();
    let result = match format {
        OutputFormat::Jpeg { quality } => {
            let rgb = DynamicImage::ImageRgba8(canvas.clone()).into_rgb8();
            JpegEncoder::new_with_quality(Cursor::new(&mut buf), quality.clamp(1, 100))
                .write_image(rgb.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        }
        OutputFormat::Png => PngEncoder::new(Cursor::new(&mut buf)).write_image(
            canvas.as_raw(),
            width,
            height,
            image::ExtendedColorType::Rgba8,
        ),
    };
    result.map_err(QrError::Serialization)?;
    tracing::debug!(width, height, ?format, len = buf.len(), "serialized image");
    Ok(buf)
}
