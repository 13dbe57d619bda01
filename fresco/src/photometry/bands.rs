//! Johnson-Cousins photometric bands and blackbody band fractions.
//!
//! Band luminosities are expressed as the share of a star's bolometric
//! luminosity that a blackbody of the star's effective temperature emits
//! inside the band, `π B_λ(λ_eff, T) Δλ / (σ T⁴)`.

use std::fmt;

use thiserror::Error;

const PLANCK: f64 = 6.626_070_15e-34;
const SPEED_OF_LIGHT: f64 = 2.997_924_58e8;
const BOLTZMANN: f64 = 1.380_649e-23;
const STEFAN_BOLTZMANN: f64 = 5.670_374_419e-8;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BandError {
    #[error("unknown photometric band '{0}' (valid: u, b, v, r, i)")]
    Unknown(char),
    #[error("no photometric bands requested")]
    Empty,
}

/// A photometric band of the UBVRI system
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Band {
    U,
    B,
    V,
    R,
    I,
}

impl Band {
    pub const ALL: [Band; 5] = [Band::U, Band::B, Band::V, Band::R, Band::I];

    /// Parse a single band letter (case-insensitive)
    pub fn from_char(c: char) -> Result<Self, BandError> {
        match c.to_ascii_lowercase() {
            'u' => Ok(Band::U),
            'b' => Ok(Band::B),
            'v' => Ok(Band::V),
            'r' => Ok(Band::R),
            'i' => Ok(Band::I),
            other => Err(BandError::Unknown(other)),
        }
    }

    /// Parse a band string such as `"ubvri"`, keeping order and dropping repeats
    pub fn parse_bands(spec: &str) -> Result<Vec<Band>, BandError> {
        let mut bands = Vec::new();
        for c in spec.chars().filter(|c| !c.is_whitespace()) {
            let band = Band::from_char(c)?;
            if !bands.contains(&band) {
                bands.push(band);
            }
        }
        if bands.is_empty() {
            return Err(BandError::Empty);
        }
        Ok(bands)
    }

    /// Lower-case band letter
    pub fn letter(&self) -> char {
        match self {
            Band::U => 'u',
            Band::B => 'b',
            Band::V => 'v',
            Band::R => 'r',
            Band::I => 'i',
        }
    }

    /// Effective wavelength in nanometers
    pub fn effective_wavelength_nm(&self) -> f64 {
        match self {
            Band::U => 365.0,
            Band::B => 445.0,
            Band::V => 551.0,
            Band::R => 658.0,
            Band::I => 806.0,
        }
    }

    /// Full width at half maximum of the passband in nanometers
    pub fn bandwidth_nm(&self) -> f64 {
        match self {
            Band::U => 66.0,
            Band::B => 94.0,
            Band::V => 88.0,
            Band::R => 138.0,
            Band::I => 149.0,
        }
    }

    /// Contribution of this band to the (red, green, blue) display channels
    pub fn rgb_weights(&self) -> [f64; 3] {
        match self {
            Band::U => [0.10, 0.00, 0.55],
            Band::B => [0.00, 0.25, 0.85],
            Band::V => [0.30, 0.80, 0.20],
            Band::R => [0.85, 0.30, 0.00],
            Band::I => [0.60, 0.00, 0.00],
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Planck spectral radiance B_λ in W sr⁻¹ m⁻³
fn planck_radiance(wavelength_m: f64, temperature_k: f64) -> f64 {
    let numerator = 2.0 * PLANCK * SPEED_OF_LIGHT * SPEED_OF_LIGHT;
    let exponent = PLANCK * SPEED_OF_LIGHT / (wavelength_m * BOLTZMANN * temperature_k);
    numerator / (wavelength_m.powi(5) * exponent.exp_m1())
}

/// Fraction of a blackbody's bolometric output emitted inside `band`
///
/// Returns 0 for non-positive or non-finite temperatures.
pub fn band_fraction(band: Band, temperature_k: f64) -> f64 {
    if !(temperature_k.is_finite() && temperature_k > 0.0) {
        return 0.0;
    }
    let wavelength = band.effective_wavelength_nm() * 1e-9;
    let width = band.bandwidth_nm() * 1e-9;
    let fraction = std::f64::consts::PI * planck_radiance(wavelength, temperature_k) * width
        / (STEFAN_BOLTZMANN * temperature_k.powi(4));
    if fraction.is_finite() {
        fraction
    } else {
        0.0
    }
}
