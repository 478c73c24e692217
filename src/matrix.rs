//! QR symbol encoding.
//!
//! Symbol construction is delegated to the `qrcode` crate; this module only
//! copies its module grid into a [`BitMatrix`] with a quiet-zone margin, ready
//! for [`crate::raster::rasterize`].

use qrcode::{Color, EcLevel, QrCode};
use serde::{Deserialize, Serialize};

use crate::error::{QrError, QrResult};

/// The error correction level used in a QR Code symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QrCodeEcc {
    /// The QR Code can tolerate about  7% erroneous codewords.
    Low,
    /// The QR Code can tolerate about 15% erroneous codewords.
    Medium,
    /// The QR Code can tolerate about 25% erroneous codewords.
    Quartile,
    /// The QR Code can tolerate about 30% erroneous codewords.
    High,
}

impl From<QrCodeEcc> for EcLevel {
    fn from(ecc: QrCodeEcc) -> Self {
        match ecc {
            QrCodeEcc::Low => EcLevel::L,
            QrCodeEcc::Medium => EcLevel::M,
            QrCodeEcc::Quartile => EcLevel::Q,
            QrCodeEcc::High => EcLevel::H,
        }
    }
}

/// Codec settings. High error correction leaves room for a centred logo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    pub ecc: QrCodeEcc,
    /// Light modules added around the symbol on every side.
    pub margin: u32,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            ecc: QrCodeEcc::High,
            margin: 1,
        }
    }
}

/// A square grid of modules; `true` is a dark module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMatrix {
    width: usize,
    bits: Vec<bool>,
}

impl BitMatrix {
    /// Builds a matrix from row-major module states.
    pub fn new(width: usize, bits: Vec<bool>) -> QrResult<Self> {
        if width == 0 {
            return Err(QrError::encoding("bit matrix is empty"));
        }
        if bits.len() != width * width {
            return Err(QrError::encoding(format!(
                "bit matrix of width {width} needs {} modules, got {}",
                width * width,
                bits.len()
            )));
        }
        Ok(Self { width, bits })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the module at `(x, y)`; anything outside the grid is light.
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.bits[y * self.width + x]
    }

    fn from_code(code: &QrCode, margin: usize) -> QrResult<Self> {
        let inner = code.width();
        let width = inner + 2 * margin;
        let mut bits = vec![false; width * width];
        for (i, color) in code.to_colors().into_iter().enumerate() {
            if color == Color::Dark {
                let (x, y) = (i % inner, i / inner);
                bits[(y + margin) * width + x + margin] = true;
            }
        }
        Self::new(width, bits)
    }
}

/// Encodes UTF-8 text into a module grid.
///
/// # Errors
///
/// Returns [`QrError::Encoding`] for empty content or content beyond the
/// capacity of a version 40 symbol at the requested error correction level.
///
/// # Example
///
/// ```
/// use qrposter::matrix::{encode, EncodeOptions};
///
/// let matrix = encode("Hello, World!", &EncodeOptions::default()).unwrap();
/// assert!(matrix.width() >= 21);
/// ```
pub fn encode(content: &str, options: &EncodeOptions) -> QrResult<BitMatrix> {
    if content.is_empty() {
        return Err(QrError::encoding("QR content is empty"));
    }
    let code = QrCode::with_error_correction_level(content.as_bytes(), options.ecc.into())
        .map_err(|e| QrError::encoding(format!("cannot encode {content:?}: {e}")))?;
    BitMatrix::from_code(&code, options.margin as usize)
}
