//! Background/foreground field-star population.
//!
//! Field stars are generated in the already-centered frame, so they are never
//! re-centered or cropped. They get random ages and are evolved individually
//! (global age zero means "each star's own age").

use log::info;
use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use shared::units::{Length, LengthExt, Mass, MassExt, Time, TimeExt};

use crate::particles::{Particle, ParticleKind, ParticleSet};
use crate::photometry::{Band, EvolutionError, StellarEvolution};

/// Field-star keys start here so they never collide with scene keys
pub const FIELD_KEY_OFFSET: u64 = 1 << 40;

/// Youngest field star age
pub const MIN_FIELD_AGE_MYR: f64 = 400.0;

/// Oldest field star age
pub const MAX_FIELD_AGE_MYR: f64 = 12_000.0;

/// Source of a random field-star population
pub trait FieldStarGenerator {
    /// Generate `count` stars spread over a `width` × `height` field
    fn new_field_stars(
        &self,
        count: usize,
        width: Length,
        height: Length,
        rng: &mut StdRng,
    ) -> ParticleSet;
}

/// Uniform sky positions with a Salpeter mass function
#[derive(Debug, Clone)]
pub struct SalpeterFieldStars {
    /// Line-of-sight depth of the field population
    pub depth: Length,
    pub min_mass: Mass,
    pub max_mass: Mass,
    /// Power-law slope of dN/dM ∝ M^-alpha
    pub alpha: f64,
}

impl Default for SalpeterFieldStars {
    fn default() -> Self {
        Self {
            depth: Length::from_parsecs(100.0),
            min_mass: Mass::from_solar_masses(0.1),
            max_mass: Mass::from_solar_masses(125.0),
            alpha: 2.35,
        }
    }
}

impl SalpeterFieldStars {
    /// Inverse-CDF draw from the truncated power law for `u` in [0, 1)
    pub fn mass_from_uniform(&self, u: f64) -> Mass {
        let lo = self.min_mass.as_solar_masses();
        let hi = self.max_mass.as_solar_masses();
        let exponent = 1.0 - self.alpha;
        let msun = if exponent.abs() < 1e-12 {
            lo * (hi / lo).powf(u)
        } else {
            let a = lo.powf(exponent);
            let b = hi.powf(exponent);
            (a + u * (b - a)).powf(1.0 / exponent)
        };
        Mass::from_solar_masses(msun)
    }
}

impl FieldStarGenerator for SalpeterFieldStars {
    fn new_field_stars(
        &self,
        count: usize,
        width: Length,
        height: Length,
        rng: &mut StdRng,
    ) -> ParticleSet {
        let half_w = width.as_parsecs() / 2.0;
        let half_h = height.as_parsecs() / 2.0;
        let depth = self.depth.as_parsecs();

        let particles = (0..count)
            .map(|i| {
                let x = rng.gen_range(-half_w..=half_w);
                let y = rng.gen_range(-half_h..=half_h);
                let z = (rng.gen::<f64>() - 0.02) * depth;
                let mass = self.mass_from_uniform(rng.gen::<f64>());
                Particle::new(
                    FIELD_KEY_OFFSET + i as u64,
                    [
                        Length::from_parsecs(x),
                        Length::from_parsecs(y),
                        Length::from_parsecs(z),
                    ],
                    mass,
                )
            })
            .collect();
        ParticleSet::from_particles(ParticleKind::Stars, particles)
    }
}

/// Generate, age and evolve a field-star population ready to be merged
pub fn prepare_field_stars(
    count: usize,
    width: Length,
    generator: &dyn FieldStarGenerator,
    evolution: &dyn StellarEvolution,
    bands: &[Band],
    rng: &mut StdRng,
) -> Result<ParticleSet, EvolutionError> {
    let mut field = generator.new_field_stars(count, width, width, rng);
    let ages = Uniform::new_inclusive(MIN_FIELD_AGE_MYR, MAX_FIELD_AGE_MYR);
    for star in field.iter_mut() {
        star.age = Some(Time::from_megayears(ages.sample(rng)));
    }
    evolution.evolve_to_age(&mut field, Time::from_megayears(0.0), bands)?;
    info!("added {} field stars", field.len());
    Ok(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photometry::AnalyticEvolution;
    use approx::assert_relative_eq;
    use rand::SeedableRng;

    #[test]
    fn test_mass_inverse_cdf_limits() {
        let gen = SalpeterFieldStars::default();
        assert_relative_eq!(gen.mass_from_uniform(0.0).as_solar_masses(), 0.1, max_relative = 1e-9);
        assert_relative_eq!(gen.mass_from_uniform(1.0).as_solar_masses(), 125.0, max_relative = 1e-9);
        // Salpeter median sits well below 1 MSun
        assert!(gen.mass_from_uniform(0.5).as_solar_masses() < 0.3);
    }

    #[test]
    fn test_field_stars_fill_the_frame() {
        let gen = SalpeterFieldStars::default();
        let mut rng = StdRng::seed_from_u64(7);
        let width = Length::from_parsecs(10.0);
        let field = gen.new_field_stars(500, width, width, &mut rng);
        assert_eq!(field.len(), 500);
        for star in field.iter() {
            assert!(star.x().as_parsecs().abs() <= 5.0);
            assert!(star.y().as_parsecs().abs() <= 5.0);
            let z = star.z().as_parsecs();
            assert!((-2.0..98.0).contains(&z));
            assert!(star.key >= FIELD_KEY_OFFSET);
        }
        let behind = field.iter().filter(|s| s.z().as_parsecs() > 0.0).count();
        assert!(behind > 450);
    }

    #[test]
    fn test_same_seed_same_field() {
        let gen = SalpeterFieldStars::default();
        let width = Length::from_parsecs(3.0);
        let a = gen.new_field_stars(20, width, width, &mut StdRng::seed_from_u64(1));
        let b = gen.new_field_stars(20, width, width, &mut StdRng::seed_from_u64(1));
        assert_eq!(a, b);
    }

    #[test]
    fn test_prepared_field_stars_are_aged_and_evolved() {
        let mut rng = StdRng::seed_from_u64(3);
        let field = prepare_field_stars(
            50,
            Length::from_parsecs(4.0),
            &SalpeterFieldStars::default(),
            &AnalyticEvolution::new(),
            &Band::ALL,
            &mut rng,
        )
        .unwrap();
        for star in field.iter() {
            let age = star.age.unwrap().as_megayears();
            assert!((MIN_FIELD_AGE_MYR..=MAX_FIELD_AGE_MYR + 1e-6).contains(&age));
            assert!(star.luminosity.is_some());
            assert_eq!(star.band_luminosity.len(), 5);
        }
    }
}
