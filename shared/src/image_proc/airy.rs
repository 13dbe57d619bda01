//! Airy disk point spread function for diffraction-limited optics.
//!
//! The intensity of a circular aperture's diffraction pattern is
//!
//! ```text
//! I(r) = I₀ * [2*J₁(kr)/kr]²
//! ```
//!
//! where `J₁` is the first-order Bessel function. The first dark ring sits
//! at `kr = 3.8317`, which corresponds to the familiar `1.22 λ/D`.

use ndarray::Array2;
use scilib::math::bessel;

use super::convolve2d::{normalize_kernel, odd_kernel_size};

/// First zero of J₁, i.e. the normalized radius of the first dark ring
pub const AIRY_FIRST_ZERO: f64 = 3.831_705_970_207_512;

/// Angular radius of the first dark ring in radians, `1.22 λ / D`
pub fn first_zero_angle(wavelength_m: f64, aperture_m: f64) -> f64 {
    1.219_669_891_266_504_5 * wavelength_m / aperture_m
}

/// Airy intensity at normalized radius, with I(0) = 1
pub fn airy_intensity(radius: f64) -> f64 {
    if radius.abs() < 1e-10 {
        return 1.0;
    }
    let j1 = bessel::j_n(1, radius);
    let term = 2.0 * j1 / radius;
    term * term
}

/// Pixel kernel of an Airy pattern whose first dark ring has radius
/// `first_zero_px` pixels, extending over `rings` dark-ring radii.
///
/// Each pixel is integrated with a `subsample × subsample` grid so that
/// patterns narrower than a pixel still produce a sensible kernel.
pub fn airy_kernel(first_zero_px: f64, rings: f64, subsample: usize) -> Array2<f64> {
    let first_zero_px = first_zero_px.max(1e-3);
    let size = odd_kernel_size((first_zero_px * rings).max(1.0));
    let center = (size / 2) as f64;
    let n = subsample.max(1);
    let scale = AIRY_FIRST_ZERO / first_zero_px;

    let kernel = Array2::from_shape_fn((size, size), |(i, j)| {
        let mut acc = 0.0;
        for si in 0..n {
            for sj in 0..n {
                let dy = i as f64 - center + (si as f64 + 0.5) / n as f64 - 0.5;
                let dx = j as f64 - center + (sj as f64 + 0.5) / n as f64 - 0.5;
                acc += airy_intensity((dx * dx + dy * dy).sqrt() * scale);
            }
        }
        acc
    });

    normalize_kernel(kernel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_intensity_peak_and_first_zero() {
        assert_eq!(airy_intensity(0.0), 1.0);
        assert!(airy_intensity(AIRY_FIRST_ZERO) < 1e-10);
        assert!(airy_intensity(1.0) < 1.0);
        assert!(airy_intensity(5.0) > 0.0);
    }

    #[test]
    fn test_first_zero_angle_hst_v_band() {
        // 551 nm on a 2.4 m mirror is about 0.058 arcsec
        let arcsec = first_zero_angle(551e-9, 2.4).to_degrees() * 3600.0;
        assert_relative_eq!(arcsec, 0.0578, epsilon = 5e-4);
    }

    #[test]
    fn test_kernel_is_normalized_and_peaked() {
        let kernel = airy_kernel(3.0, 4.0, 3);
        let (r, c) = kernel.dim();
        assert_eq!(r, c);
        assert_eq!(r % 2, 1);
        assert_relative_eq!(kernel.sum(), 1.0, epsilon = 1e-10);
        let peak = kernel[[r / 2, c / 2]];
        assert!(kernel.iter().all(|&v| v <= peak));
    }

    #[test]
    fn test_narrow_kernel_has_minimum_footprint() {
        let kernel = airy_kernel(0.2, 4.0, 5);
        assert_eq!(kernel.dim(), (3, 3));
        assert_relative_eq!(kernel.sum(), 1.0, epsilon = 1e-10);
    }
}
