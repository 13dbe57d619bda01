//! Gas surface-density maps from SPH particles.

use log::debug;
use ndarray::Array2;
use shared::units::{Length, LengthExt};

use crate::nbody::{Dimension, NBodyConverter, NBodyError, NBodyQuantity};
use crate::particles::ParticleSet;

/// Normalization of the 2D cubic-spline kernel, `10 / (7π)`
const CUBIC_SPLINE_2D_NORM: f64 = 10.0 / (7.0 * std::f64::consts::PI);

/// Unnormalized cubic-spline shape at `q = r / h`, zero beyond `q = 2`
pub fn cubic_spline_shape(q: f64) -> f64 {
    if q < 1.0 {
        1.0 - 1.5 * q * q + 0.75 * q * q * q
    } else if q < 2.0 {
        let t = 2.0 - q;
        0.25 * t * t * t
    } else {
        0.0
    }
}

/// 2D cubic-spline kernel `W(r, h)` integrating to one over the plane
pub fn cubic_spline_2d(r: f64, h: f64) -> f64 {
    if h <= 0.0 {
        return 0.0;
    }
    CUBIC_SPLINE_2D_NORM / (h * h) * cubic_spline_shape(r / h)
}

/// Above this smoothing length (in pixels) the discrete kernel sum is
/// replaced by its continuum value `7π h² / 10`
const DISCRETE_NORM_MAX_H_PX: f64 = 16.0;

/// Sum of kernel shape values over the pixel centers within `2 h` of
/// (`col_c`, `row_c`), all in pixel units
fn kernel_pixel_sum(col_c: f64, row_c: f64, h_px: f64) -> f64 {
    if h_px > DISCRETE_NORM_MAX_H_PX {
        return h_px * h_px / CUBIC_SPLINE_2D_NORM;
    }
    let reach = 2.0 * h_px;
    let (c0, c1) = ((col_c - reach).floor() as i64, (col_c + reach).ceil() as i64);
    let (r0, r1) = ((row_c - reach).floor() as i64, (row_c + reach).ceil() as i64);
    let mut sum = 0.0;
    for row in r0..=r1 {
        for col in c0..=c1 {
            let dr = (col as f64 - col_c).hypot(row as f64 - row_c);
            sum += cubic_spline_shape(dr / h_px);
        }
    }
    sum
}

/// Projects gas onto the image plane as a surface density map
pub trait DensityMapper {
    /// Surface density in MSun/pc², indexed `[row, col]` with row 0 at the bottom
    fn column_density_map(
        &self,
        gas: &ParticleSet,
        converter: &NBodyConverter,
        image_width: Length,
        image_size: (usize, usize),
    ) -> Result<Array2<f64>, NBodyError>;
}

/// Mass-conserving SPH deposit with a cubic-spline kernel
///
/// Each particle's mass is spread over the pixels within two smoothing
/// lengths and divided by the discrete kernel sum, so no mass is lost to
/// pixelization. Smoothing lengths below one pixel are raised to one pixel.
/// Only pixels inside the frame are visited.
#[derive(Debug, Clone, Default)]
pub struct SphColumnDensity;

impl DensityMapper for SphColumnDensity {
    fn column_density_map(
        &self,
        gas: &ParticleSet,
        converter: &NBodyConverter,
        image_width: Length,
        image_size: (usize, usize),
    ) -> Result<Array2<f64>, NBodyError> {
        let (nx, ny) = image_size;
        let mut map = Array2::<f64>::zeros((ny, nx));
        if nx == 0 || ny == 0 {
            return Ok(map);
        }

        let width = converter.length_to_nbody(image_width);
        let pixel = NBodyQuantity::new(width.value / nx as f64, Dimension::LENGTH);
        let pixel_area = pixel * pixel;
        // Lower-left corner of the frame along either axis
        let corner_x = NBodyQuantity::new(-0.5 * nx as f64 * pixel.value, Dimension::LENGTH);
        let corner_y = NBodyQuantity::new(-0.5 * ny as f64 * pixel.value, Dimension::LENGTH);
        let mut deposited = NBodyQuantity::new(0.0, Dimension::MASS);

        for particle in gas {
            let dx = converter.length_to_nbody(particle.x()).checked_sub(corner_x)?;
            let dy = converter.length_to_nbody(particle.y()).checked_sub(corner_y)?;
            let col_c = dx.value / pixel.value - 0.5;
            let row_c = dy.value / pixel.value - 0.5;
            let h_px = particle
                .radius
                .map(|h| converter.length_to_nbody(h).value / pixel.value)
                .unwrap_or(1.0)
                .max(1.0);
            let mass_q = converter.mass_to_nbody(particle.mass);
            let mass = mass_q.value;
            if !(col_c.is_finite() && row_c.is_finite() && mass > 0.0) {
                continue;
            }

            let reach = 2.0 * h_px;
            let (c0, c1) = ((col_c - reach).floor() as i64, (col_c + reach).ceil() as i64);
            let (r0, r1) = ((row_c - reach).floor() as i64, (row_c + reach).ceil() as i64);
            if c1 < 0 || r1 < 0 || c0 >= nx as i64 || r0 >= ny as i64 {
                continue;
            }

            let weight_sum = kernel_pixel_sum(col_c, row_c, h_px);
            if weight_sum <= 0.0 {
                continue;
            }
            deposited = deposited.checked_add(mass_q)?;
            let scale = mass / (weight_sum * pixel_area.value);
            for row in r0.max(0)..=r1.min(ny as i64 - 1) {
                for col in c0.max(0)..=c1.min(nx as i64 - 1) {
                    let dr = (col as f64 - col_c).hypot(row as f64 - row_c);
                    let w = cubic_spline_shape(dr / h_px);
                    if w > 0.0 {
                        map[[row as usize, col as usize]] += w * scale;
                    }
                }
            }
        }

        debug!(
            "projected {} gas particles, {:.4} mass units within reach of the frame",
            gas.len(),
            deposited.value
        );
        let unit = NBodyQuantity::new(1.0, Dimension::SURFACE_DENSITY);
        let to_msun_pc2 = converter.surface_density_to_msun_per_pc2(unit)?;
        map.mapv_inplace(|v| v * to_msun_pc2);
        Ok(map)
    }
}

/// Total mass represented by a density map, in solar masses
pub fn integrated_mass_msun(map: &Array2<f64>, image_width: Length) -> f64 {
    let nx = map.ncols().max(1) as f64;
    let pixel_pc = image_width.as_parsecs() / nx;
    map.sum() * pixel_pc * pixel_pc
}
