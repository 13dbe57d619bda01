//! Conversions between ndarray pixel fields and image crate buffers.
//!
//! Rendered fields use astronomical orientation: row 0 is the *bottom* of
//! the picture (matplotlib's `origin="lower"`). The image crate puts row 0
//! at the top, so every conversion here flips rows.
//!
//! - **ndarray**: `[row, col]` = `[y, x]`, dimensions `(height, width[, channel])`
//! - **image crate**: `(x, y)` with dimensions `(width, height)`

use image::{GrayImage, Luma, Rgb, RgbImage};
use ndarray::{Array2, Array3};

fn to_u8(v: f64) -> u8 {
    if v.is_finite() {
        (v.clamp(0.0, 1.0) * 255.0).round() as u8
    } else {
        0
    }
}

/// Convert a `(height, width, 3)` field with values in `[0, 1]` to an RGB image
///
/// Values outside the unit interval are clipped; non-finite values become black.
pub fn rgb_field_to_image(field: &Array3<f64>) -> RgbImage {
    let (height, width, channels) = field.dim();
    assert!(channels >= 3, "RGB field needs three channels, got {channels}");

    RgbImage::from_fn(width as u32, height as u32, |x, y| {
        let row = height - 1 - y as usize;
        let col = x as usize;
        Rgb([
            to_u8(field[[row, col, 0]]),
            to_u8(field[[row, col, 1]]),
            to_u8(field[[row, col, 2]]),
        ])
    })
}

/// Convert a scalar field to a grayscale image, mapping `[lo, hi]` to `[0, 255]`
///
/// A degenerate range (`hi <= lo`) produces a black image.
pub fn gray_field_to_image(field: &Array2<f64>, lo: f64, hi: f64) -> GrayImage {
    let (height, width) = field.dim();
    let span = hi - lo;

    GrayImage::from_fn(width as u32, height as u32, |x, y| {
        let v = field[[height - 1 - y as usize, x as usize]];
        let level = if span > 0.0 { (v - lo) / span } else { 0.0 };
        Luma([to_u8(level)])
    })
}

/// Convert pixel-center coordinates of a field (`col`, `row`, origin lower)
/// to image-space coordinates (`x`, `y`, origin upper)
pub fn field_to_image_coords(col: f64, row: f64, height: usize) -> (f64, f64) {
    (col + 0.5, height as f64 - row - 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_rows_are_flipped() {
        let mut field = Array3::zeros((2, 3, 3));
        field[[0, 1, 0]] = 1.0; // bottom row, middle column, red
        let img = rgb_field_to_image(&field);
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(1, 1), &Rgb([255, 0, 0]));
        assert_eq!(img.get_pixel(1, 0), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_rgb_clips_and_blanks_nan() {
        let mut field = Array3::from_elem((1, 2, 3), 2.0);
        field[[0, 1, 2]] = f64::NAN;
        let img = rgb_field_to_image(&field);
        assert_eq!(img.get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(img.get_pixel(1, 0), &Rgb([255, 255, 0]));
    }

    #[test]
    fn test_gray_linear_range() {
        let field = ndarray::arr2(&[[0.0, 5.0, 10.0]]);
        let img = gray_field_to_image(&field, 0.0, 10.0);
        assert_eq!(img.get_pixel(0, 0).0[0], 0);
        assert_eq!(img.get_pixel(1, 0).0[0], 128);
        assert_eq!(img.get_pixel(2, 0).0[0], 255);
    }

    #[test]
    fn test_gray_degenerate_range_is_black() {
        let field = Array2::from_elem((2, 2), 3.0);
        let img = gray_field_to_image(&field, 3.0, 3.0);
        assert!(img.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn test_field_to_image_coords() {
        assert_eq!(field_to_image_coords(0.0, 0.0, 10), (0.5, 9.5));
        assert_eq!(field_to_image_coords(9.0, 9.0, 10), (9.5, 0.5));
    }
}
