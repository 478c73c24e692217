use image::{Rgba, RgbaImage};

use crate::error::{QrError, QrResult};
use crate::matrix::BitMatrix;

pub const DARK: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const LIGHT: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Converts a module grid into a `size` x `size` image.
///
/// Each module becomes a square block of `size / width` pixels with the symbol
/// centred and the leftover border filled with the light colour. When `size`
/// is smaller than the grid, modules are sampled nearest-neighbour instead so
/// the output keeps the requested dimensions.
///
/// # Errors
///
/// Returns [`QrError::Encoding`] if `size` is zero.
///
/// # Example
///
/// ```
/// use qrposter::matrix::{encode, EncodeOptions};
/// use qrposter::raster::rasterize;
///
/// let matrix = encode("Hello, World!", &EncodeOptions::default()).unwrap();
/// let img = rasterize(&matrix, 400).unwrap();
/// assert_eq!(img.dimensions(), (400, 400));
/// ```
pub fn rasterize(matrix: &BitMatrix, size: u32) -> QrResult<RgbaImage> {
    if size == 0 {
        return Err(QrError::encoding("raster size must be positive"));
    }
    let width = matrix.width() as u32;
    let mut img = RgbaImage::new(size, size);

    let scale = size / width;
    if scale == 0 {
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            let mx = (x as u64 * width as u64 / size as u64) as usize;
            let my = (y as u64 * width as u64 / size as u64) as usize;
            *pixel = if matrix.get(mx, my) { DARK } else { LIGHT };
        }
        return Ok(img);
    }

    let offset = (size - width * scale) / 2;
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let dark = x >= offset
            && y >= offset
            && matrix.get(((x - offset) / scale) as usize, ((y - offset) / scale) as usize);
        *pixel = if dark { DARK } else { LIGHT };
    }
    Ok(img)
}
