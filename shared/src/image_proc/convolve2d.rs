//! Point-source convolution kernels
//!
//! Stars are point sources, so convolving a sparse star image with a PSF is the
//! same as stamping a shifted copy of the kernel at every star. The helpers here
//! build normalized kernels and stamp them at sub-pixel positions with bilinear
//! weights, which keeps the centroid of each stamp exactly at the source.

use ndarray::{Array2, ArrayView2};

/// Create a Gaussian kernel with specified size and sigma
///
/// # Arguments
/// * `size` - Size of the kernel (must be odd)
/// * `sigma` - Standard deviation of the Gaussian in pixels
///
/// # Returns
/// * Gaussian kernel normalized to unit sum
pub fn gaussian_kernel(size: usize, sigma: f64) -> Array2<f64> {
    assert!(size % 2 == 1, "Kernel size must be odd");

    let center = (size / 2) as f64;
    let kernel = Array2::from_shape_fn((size, size), |(i, j)| {
        let x = j as f64 - center;
        let y = i as f64 - center;
        (-(x * x + y * y) / (2.0 * sigma * sigma)).exp()
    });

    normalize_kernel(kernel)
}

/// Smallest odd kernel size covering `radius` pixels on each side of the center
pub fn odd_kernel_size(radius: f64) -> usize {
    2 * radius.max(0.0).ceil() as usize + 1
}

/// Scale a kernel so its elements sum to one
///
/// Kernels with a non-positive sum are returned unchanged.
pub fn normalize_kernel(mut kernel: Array2<f64>) -> Array2<f64> {
    let sum = kernel.sum();
    if sum > 0.0 {
        kernel.mapv_inplace(|v| v / sum);
    }
    kernel
}

/// Resample a kernel by `zoom` (output pixel = `1/zoom` input pixels)
///
/// Uses bilinear sampling of the input at the output pixel centers and
/// renormalizes, so a zoom of 0.25 turns a 41 px kernel into an 11 px one.
pub fn resample_kernel(kernel: &ArrayView2<f64>, zoom: f64) -> Array2<f64> {
    let (rows, cols) = kernel.dim();
    if rows == 0 || cols == 0 || (zoom - 1.0).abs() < 1e-12 {
        return normalize_kernel(kernel.to_owned());
    }

    let out_rows = ((rows as f64 * zoom).round() as usize).max(1) | 1;
    let out_cols = ((cols as f64 * zoom).round() as usize).max(1) | 1;
    let in_center = ((rows - 1) as f64 / 2.0, (cols - 1) as f64 / 2.0);
    let out_center = ((out_rows - 1) as f64 / 2.0, (out_cols - 1) as f64 / 2.0);

    let sample = |r: f64, c: f64| -> f64 {
        if r < 0.0 || c < 0.0 || r > (rows - 1) as f64 || c > (cols - 1) as f64 {
            return 0.0;
        }
        let (r0, c0) = (r.floor() as usize, c.floor() as usize);
        let (r1, c1) = ((r0 + 1).min(rows - 1), (c0 + 1).min(cols - 1));
        let (fr, fc) = (r - r0 as f64, c - c0 as f64);
        kernel[[r0, c0]] * (1.0 - fr) * (1.0 - fc)
            + kernel[[r0, c1]] * (1.0 - fr) * fc
            + kernel[[r1, c0]] * fr * (1.0 - fc)
            + kernel[[r1, c1]] * fr * fc
    };

    let resampled = Array2::from_shape_fn((out_rows, out_cols), |(i, j)| {
        let r = in_center.0 + (i as f64 - out_center.0) / zoom;
        let c = in_center.1 + (j as f64 - out_center.1) / zoom;
        sample(r, c)
    });

    normalize_kernel(resampled)
}

/// Stamp `kernel * weight` centered at sub-pixel position (`x`, `y`)
///
/// `x` is the column coordinate and `y` the row coordinate, both measured at
/// pixel centers. The stamp is split bilinearly between the four surrounding
/// integer positions; pixels falling outside the image are dropped.
pub fn stamp_kernel(image: &mut Array2<f64>, kernel: &ArrayView2<f64>, x: f64, y: f64, weight: f64) {
    if weight == 0.0 || !x.is_finite() || !y.is_finite() {
        return;
    }

    let (height, width) = image.dim();
    let (k_rows, k_cols) = kernel.dim();
    let half_r = (k_rows / 2) as i64;
    let half_c = (k_cols / 2) as i64;

    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;

    let corners = [
        (x0 as i64, y0 as i64, (1.0 - fx) * (1.0 - fy)),
        (x0 as i64 + 1, y0 as i64, fx * (1.0 - fy)),
        (x0 as i64, y0 as i64 + 1, (1.0 - fx) * fy),
        (x0 as i64 + 1, y0 as i64 + 1, fx * fy),
    ];

    for (cx, cy, share) in corners {
        if share <= 0.0 {
            continue;
        }
        let scale = weight * share;
        for ((ki, kj), &k) in kernel.indexed_iter() {
            let row = cy + ki as i64 - half_r;
            let col = cx + kj as i64 - half_c;
            if row < 0 || col < 0 || row >= height as i64 || col >= width as i64 {
                continue;
            }
            image[[row as usize, col as usize]] += k * scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_gaussian_kernel() {
        let kernel = gaussian_kernel(3, 1.0);

        let sum: f64 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-10);

        for ((i, j), &v) in kernel.indexed_iter() {
            if (i, j) != (1, 1) {
                assert!(kernel[[1, 1]] > v);
            }
        }
    }

    #[test]
    fn test_odd_kernel_size() {
        assert_eq!(odd_kernel_size(0.0), 1);
        assert_eq!(odd_kernel_size(2.2), 7);
        assert_eq!(odd_kernel_size(3.0), 7);
    }

    #[test]
    fn test_resample_shrinks_and_normalizes() {
        let kernel = gaussian_kernel(41, 6.0);
        let small = resample_kernel(&kernel.view(), 0.25);
        let (r, c) = small.dim();
        assert_eq!(r % 2, 1);
        assert_eq!(c % 2, 1);
        assert!(r < 41);
        assert_relative_eq!(small.sum(), 1.0, epsilon = 1e-10);
        assert_eq!(small[[r / 2, c / 2]], small.iter().cloned().fold(0.0, f64::max));
    }

    #[test]
    fn test_stamp_conserves_flux_inside_image() {
        let kernel = gaussian_kernel(7, 1.0);
        let mut image = Array2::zeros((40, 40));
        stamp_kernel(&mut image, &kernel.view(), 20.3, 17.6, 5.0);
        assert_relative_eq!(image.sum(), 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_stamp_centroid_is_subpixel_exact() {
        let kernel = gaussian_kernel(9, 1.5);
        let mut image = Array2::zeros((30, 30));
        stamp_kernel(&mut image, &kernel.view(), 12.25, 8.75, 1.0);

        let (mut xc, mut yc) = (0.0, 0.0);
        for ((row, col), &v) in image.indexed_iter() {
            xc += col as f64 * v;
            yc += row as f64 * v;
        }
        assert_relative_eq!(xc, 12.25, epsilon = 1e-9);
        assert_relative_eq!(yc, 8.75, epsilon = 1e-9);
    }

    #[test]
    fn test_stamp_clips_at_edges() {
        let kernel = array![[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]];
        let mut image = Array2::zeros((4, 4));
        stamp_kernel(&mut image, &kernel.view(), -3.0, 1.0, 1.0);
        assert_eq!(image.sum(), 0.0);
    }
}
