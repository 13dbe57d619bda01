//! Stellar evolution backends that assign luminosities to star particles.

use log::debug;
use shared::units::{
    Length, LengthExt, Luminosity, LuminosityExt, MassExt, Temperature, TemperatureExt, Time,
    TimeExt,
};
use thiserror::Error;

use super::bands::{band_fraction, Band};
use crate::particles::{Particle, ParticleSet};

/// Solar radius in meters
const SOLAR_RADIUS_M: f64 = 6.957e8;

/// Solar effective temperature in Kelvin
const SOLAR_TEMPERATURE_K: f64 = 5772.0;

/// Main-sequence lifetime of a one solar mass star
const SOLAR_LIFETIME_MYR: f64 = 10_000.0;

/// Stars at or above this mass leave dark (neutron star / black hole) remnants
const DARK_REMNANT_MASS: f64 = 8.0;

/// Typical white-dwarf radius in solar radii
const WHITE_DWARF_RADIUS: f64 = 0.0126;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvolutionError {
    #[error("star {key} has non-positive or non-finite mass {mass_msun} MSun")]
    InvalidMass { key: u64, mass_msun: f64 },
    #[error("negative evolution age {0} Myr")]
    NegativeAge(f64),
}

/// A stellar evolution code that can bring a set of stars to a given age
pub trait StellarEvolution {
    fn name(&self) -> &str;

    /// Evolve `stars` to `age` and write bolometric and per-band luminosities
    ///
    /// An `age` of zero means "use each star's own age", falling back to the
    /// zero-age main sequence for stars without one.
    fn evolve_to_age(
        &self,
        stars: &mut ParticleSet,
        age: Time,
        bands: &[Band],
    ) -> Result<(), EvolutionError>;
}

/// Power-law single-star evolution
///
/// Main-sequence stars follow piecewise mass-luminosity and mass-radius
/// relations with a lifetime of `10 Gyr · M^-2.5`. Past that lifetime stars
/// below 8 MSun become cooling white dwarfs and heavier stars go dark.
#[derive(Debug, Clone, Default)]
pub struct AnalyticEvolution;

/// Luminosity (LSun), radius (RSun) and effective temperature (K)
#[derive(Debug, Clone, Copy, PartialEq)]
struct StellarState {
    luminosity: f64,
    radius: f64,
    temperature: f64,
}

impl AnalyticEvolution {
    pub fn new() -> Self {
        Self
    }

    /// Main-sequence lifetime in Myr for a star of `mass` solar masses
    pub fn main_sequence_lifetime_myr(mass: f64) -> f64 {
        SOLAR_LIFETIME_MYR * mass.powf(-2.5)
    }

    fn main_sequence_luminosity(mass: f64) -> f64 {
        if mass < 0.43 {
            0.23 * mass.powf(2.3)
        } else if mass < 2.0 {
            mass.powi(4)
        } else if mass < 55.0 {
            1.4 * mass.powf(3.5)
        } else {
            32_000.0 * mass
        }
    }

    fn main_sequence_radius(mass: f64) -> f64 {
        if mass < 1.0 {
            mass.powf(0.8)
        } else {
            mass.powf(0.57)
        }
    }

    fn effective_temperature(luminosity: f64, radius: f64) -> f64 {
        SOLAR_TEMPERATURE_K * (luminosity / (radius * radius)).powf(0.25)
    }

    fn state_at(mass: f64, age_myr: f64) -> StellarState {
        let lifetime = Self::main_sequence_lifetime_myr(mass);
        if age_myr < lifetime {
            let luminosity = Self::main_sequence_luminosity(mass);
            let radius = Self::main_sequence_radius(mass);
            return StellarState {
                luminosity,
                radius,
                temperature: Self::effective_temperature(luminosity, radius),
            };
        }
        if mass >= DARK_REMNANT_MASS {
            return StellarState {
                luminosity: 0.0,
                radius: 0.0,
                temperature: 0.0,
            };
        }
        let cooling_myr = age_myr - lifetime;
        let luminosity = 0.1 * (1.0 + cooling_myr / 10.0).powf(-1.2);
        StellarState {
            luminosity,
            radius: WHITE_DWARF_RADIUS,
            temperature: Self::effective_temperature(luminosity, WHITE_DWARF_RADIUS),
        }
    }

    fn apply(star: &mut Particle, state: StellarState, bands: &[Band]) {
        star.luminosity = Some(Luminosity::from_solar_luminosities(state.luminosity));
        star.radius = Some(Length::from_meters(state.radius * SOLAR_RADIUS_M));
        star.temperature = if state.temperature > 0.0 {
            Some(Temperature::from_kelvin(state.temperature))
        } else {
            None
        };
        star.band_luminosity.clear();
        for &band in bands {
            let fraction = band_fraction(band, state.temperature);
            star.band_luminosity.insert(
                band,
                Luminosity::from_solar_luminosities(state.luminosity * fraction),
            );
        }
    }
}

impl StellarEvolution for AnalyticEvolution {
    fn name(&self) -> &str {
        "analytic"
    }

    fn evolve_to_age(
        &self,
        stars: &mut ParticleSet,
        age: Time,
        bands: &[Band],
    ) -> Result<(), EvolutionError> {
        let target_myr = age.as_megayears();
        if target_myr < 0.0 {
            return Err(EvolutionError::NegativeAge(target_myr));
        }
        for star in stars.iter_mut() {
            let mass = star.mass.as_solar_masses();
            if !(mass.is_finite() && mass > 0.0) {
                return Err(EvolutionError::InvalidMass {
                    key: star.key,
                    mass_msun: mass,
                });
            }
            let age_myr = if target_myr > 0.0 {
                target_myr
            } else {
                star.age.map(|a| a.as_megayears().max(0.0)).unwrap_or(0.0)
            };
            Self::apply(star, Self::state_at(mass, age_myr), bands);
        }
        debug!(
            "{} evolution: {} stars to {:.1} Myr",
            self.name(),
            stars.len(),
            target_myr
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particles::ParticleKind;
    use approx::assert_relative_eq;

    fn stars(masses: &[f64]) -> ParticleSet {
        ParticleSet::from_particles(
            ParticleKind::Stars,
            masses
                .iter()
                .enumerate()
                .map(|(i, &m)| Particle::at_parsecs(i as u64, 0.0, 0.0, 0.0, m))
                .collect(),
        )
    }

    #[test]
    fn test_sun_on_main_sequence() {
        let mut set = stars(&[1.0]);
        AnalyticEvolution::new()
            .evolve_to_age(&mut set, Time::from_megayears(4600.0), &Band::ALL)
            .unwrap();
        let sun = &set.as_slice()[0];
        assert_relative_eq!(
            sun.luminosity.unwrap().as_solar_luminosities(),
            1.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            sun.temperature.unwrap().as_kelvin(),
            SOLAR_TEMPERATURE_K,
            epsilon = 1e-6
        );
        assert_eq!(sun.band_luminosity.len(), 5);
        let total: f64 = sun
            .band_luminosity
            .values()
            .map(|l| l.as_solar_luminosities())
            .sum();
        assert!(total > 0.0 && total < 1.0);
    }

    #[test]
    fn test_massive_star_burns_out() {
        let mut set = stars(&[20.0, 3.0]);
        AnalyticEvolution::new()
            .evolve_to_age(&mut set, Time::from_megayears(1000.0), &[Band::V])
            .unwrap();
        let massive = &set.as_slice()[0];
        assert_eq!(massive.luminosity.unwrap().as_solar_luminosities(), 0.0);
        assert!(massive.temperature.is_none());
        assert_eq!(massive.band_luminosity[&Band::V].as_solar_luminosities(), 0.0);

        // 3 MSun lives ~640 Myr, so at 1 Gyr it is a faint white dwarf
        let dwarf = &set.as_slice()[1];
        let l = dwarf.luminosity.unwrap().as_solar_luminosities();
        assert!(l > 0.0 && l < 0.01);
    }

    #[test]
    fn test_zero_age_uses_own_age() {
        let mut set = stars(&[3.0, 3.0]);
        set.iter_mut().next().unwrap().age = Some(Time::from_megayears(2000.0));
        AnalyticEvolution::new()
            .evolve_to_age(&mut set, Time::from_megayears(0.0), &[Band::B])
            .unwrap();
        let old = set.as_slice()[0].luminosity.unwrap().as_solar_luminosities();
        let young = set.as_slice()[1].luminosity.unwrap().as_solar_luminosities();
        assert!(old < young);
    }

    #[test]
    fn test_invalid_mass() {
        let mut set = stars(&[1.0, 0.0]);
        let err = AnalyticEvolution::new()
            .evolve_to_age(&mut set, Time::from_megayears(10.0), &[Band::V])
            .unwrap_err();
        assert_eq!(
            err,
            EvolutionError::InvalidMass {
                key: 1,
                mass_msun: 0.0
            }
        );
    }
}
