//! Dust extinction of starlight by the gas in front of each star.
//!
//! The observer looks down the -z axis, so gas with a larger z than a star
//! sits between the star and the observer.

use shared::units::{Length, LengthExt, MassExt};

use super::density::cubic_spline_2d;
use crate::particles::{Particle, ParticleSet};
use crate::photometry::Band;

/// V-band opacity per unit gas surface density, pc² / MSun (A_V ≈ Σ/21 mag)
pub const KAPPA_V_PC2_PER_MSUN: f64 = 0.0435;

/// Opacity in `band`, scaling as the inverse of the effective wavelength
pub fn opacity(band: Band) -> f64 {
    KAPPA_V_PC2_PER_MSUN * Band::V.effective_wavelength_nm() / band.effective_wavelength_nm()
}

/// Gas column in front of stars
#[derive(Debug, Clone)]
pub struct ExtinctionScreen<'a> {
    gas: &'a ParticleSet,
    min_smoothing_pc: f64,
}

impl<'a> ExtinctionScreen<'a> {
    /// `min_smoothing` bounds kernels from below, typically one pixel
    pub fn new(gas: &'a ParticleSet, min_smoothing: Length) -> Self {
        Self {
            gas,
            min_smoothing_pc: min_smoothing.as_parsecs().max(f64::MIN_POSITIVE),
        }
    }

    /// Gas surface density in front of `star`, MSun/pc²
    pub fn column_in_front(&self, star: &Particle) -> f64 {
        let (sx, sy, sz) = (star.x().as_parsecs(), star.y().as_parsecs(), star.z());
        self.gas
            .iter()
            .filter(|g| g.z() > sz)
            .map(|g| {
                let h = g
                    .radius
                    .map(|r| r.as_parsecs())
                    .unwrap_or(self.min_smoothing_pc)
                    .max(self.min_smoothing_pc);
                let dx = g.x().as_parsecs() - sx;
                let dy = g.y().as_parsecs() - sy;
                g.mass.as_solar_masses() * cubic_spline_2d((dx * dx + dy * dy).sqrt(), h)
            })
            .sum()
    }

    /// Transmitted fraction of a star's light in `band` given its column
    pub fn transmission(column_msun_pc2: f64, band: Band) -> f64 {
        (-opacity(band) * column_msun_pc2.max(0.0)).exp()
    }
}
