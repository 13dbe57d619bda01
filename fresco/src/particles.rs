//! Star and gas particle records and the set operations the pipeline needs.
//!
//! A [`ParticleSet`] is an ordered collection keyed by a per-particle `u64`
//! identifier. Attributes the input file did not carry (age, radius,
//! luminosity, temperature) are `None` rather than zero so downstream code can
//! distinguish "absent" from "dark".

use std::collections::{BTreeMap, HashSet};

use shared::units::{Length, LengthExt, Luminosity, Mass, MassExt, Temperature, Time};

use crate::photometry::Band;

/// Which physical population a set describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    Stars,
    Gas,
}

impl ParticleKind {
    pub fn label(&self) -> &'static str {
        match self {
            ParticleKind::Stars => "stars",
            ParticleKind::Gas => "gas",
        }
    }
}

/// A single star or gas particle
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub key: u64,
    pub position: [Length; 3],
    pub mass: Mass,
    /// Stellar age, if the source provided one
    pub age: Option<Time>,
    /// Stellar radius or gas smoothing length
    pub radius: Option<Length>,
    /// Bolometric luminosity
    pub luminosity: Option<Luminosity>,
    /// Effective temperature
    pub temperature: Option<Temperature>,
    /// Per-band luminosities, written by evolution or fixed-luminosity mode
    pub band_luminosity: BTreeMap<Band, Luminosity>,
}

impl Particle {
    /// A bare particle with only identity, position and mass
    pub fn new(key: u64, position: [Length; 3], mass: Mass) -> Self {
        Self {
            key,
            position,
            mass,
            age: None,
            radius: None,
            luminosity: None,
            temperature: None,
            band_luminosity: BTreeMap::new(),
        }
    }

    /// Convenience constructor in parsecs and solar masses
    pub fn at_parsecs(key: u64, x: f64, y: f64, z: f64, mass_msun: f64) -> Self {
        Self::new(
            key,
            [
                Length::from_parsecs(x),
                Length::from_parsecs(y),
                Length::from_parsecs(z),
            ],
            Mass::from_solar_masses(mass_msun),
        )
    }

    pub fn x(&self) -> Length {
        self.position[0]
    }

    pub fn y(&self) -> Length {
        self.position[1]
    }

    pub fn z(&self) -> Length {
        self.position[2]
    }
}

/// Ordered collection of particles of one kind
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSet {
    kind: ParticleKind,
    particles: Vec<Particle>,
}

impl ParticleSet {
    pub fn new(kind: ParticleKind) -> Self {
        Self {
            kind,
            particles: Vec::new(),
        }
    }

    pub fn from_particles(kind: ParticleKind, particles: Vec<Particle>) -> Self {
        Self { kind, particles }
    }

    pub fn kind(&self) -> ParticleKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Particle> {
        self.particles.iter_mut()
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    pub fn push(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    pub fn total_mass(&self) -> Mass {
        self.particles
            .iter()
            .fold(Mass::from_solar_masses(0.0), |acc, p| acc + p.mass)
    }

    /// Mass-weighted mean position
    ///
    /// Returns `None` for an empty set or one whose total mass is not positive.
    pub fn center_of_mass(&self) -> Option<[Length; 3]> {
        let total = self.total_mass().as_solar_masses();
        if self.particles.is_empty() || !(total > 0.0) {
            return None;
        }
        let mut sum = [0.0f64; 3];
        for p in &self.particles {
            let m = p.mass.as_solar_masses();
            for (axis, s) in sum.iter_mut().enumerate() {
                *s += m * p.position[axis].as_parsecs();
            }
        }
        Some(sum.map(|s| Length::from_parsecs(s / total)))
    }

    /// Particles of `other` whose key also appears in `self`, in `other`'s order
    pub fn intersecting_subset_in(&self, other: &ParticleSet) -> ParticleSet {
        let keys: HashSet<u64> = self.particles.iter().map(|p| p.key).collect();
        ParticleSet {
            kind: other.kind,
            particles: other
                .particles
                .iter()
                .filter(|p| keys.contains(&p.key))
                .cloned()
                .collect(),
        }
    }

    /// Shift every particle by `-offset`
    pub fn translate(&mut self, offset: [Length; 3]) {
        for p in &mut self.particles {
            for (axis, shift) in offset.iter().enumerate() {
                p.position[axis] -= *shift;
            }
        }
    }

    /// Keep only particles matching the predicate, returning how many were dropped
    pub fn retain_where<F>(&mut self, keep: F) -> usize
    where
        F: FnMut(&Particle) -> bool,
    {
        let before = self.particles.len();
        self.particles.retain(keep);
        before - self.particles.len()
    }

    /// Append all particles of `other`
    pub fn add_particles(&mut self, other: ParticleSet) {
        self.particles.extend(other.particles);
    }

    /// `(xmin, xmax, ymin, ymax)` over all particles, `None` when empty
    pub fn bounding_box_xy(&self) -> Option<(Length, Length, Length, Length)> {
        let first = self.particles.first()?;
        let init = (first.x(), first.x(), first.y(), first.y());
        Some(self.particles.iter().skip(1).fold(init, |acc, p| {
            (
                if p.x() < acc.0 { p.x() } else { acc.0 },
                if p.x() > acc.1 { p.x() } else { acc.1 },
                if p.y() < acc.2 { p.y() } else { acc.2 },
                if p.y() > acc.3 { p.y() } else { acc.3 },
            )
        }))
    }

    /// Whether any particle carries an effective temperature
    pub fn has_temperature(&self) -> bool {
        self.particles.iter().any(|p| p.temperature.is_some())
    }
}

impl<'a> IntoIterator for &'a ParticleSet {
    type Item = &'a Particle;
    type IntoIter = std::slice::Iter<'a, Particle>;

    fn into_iter(self) -> Self::IntoIter {
        self.particles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cluster() -> ParticleSet {
        ParticleSet::from_particles(
            ParticleKind::Stars,
            vec![
                Particle::at_parsecs(1, 1.0, 0.0, 0.0, 1.0),
                Particle::at_parsecs(2, -1.0, 2.0, 0.0, 1.0),
                Particle::at_parsecs(3, 3.0, 4.0, 2.0, 2.0),
            ],
        )
    }

    #[test]
    fn test_center_of_mass() {
        let com = cluster().center_of_mass().unwrap();
        assert_relative_eq!(com[0].as_parsecs(), 1.5, epsilon = 1e-12);
        assert_relative_eq!(com[1].as_parsecs(), 2.5, epsilon = 1e-12);
        assert_relative_eq!(com[2].as_parsecs(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_center_of_mass_empty_or_massless() {
        assert!(ParticleSet::new(ParticleKind::Gas).center_of_mass().is_none());
        let massless = ParticleSet::from_particles(
            ParticleKind::Stars,
            vec![Particle::at_parsecs(1, 1.0, 1.0, 1.0, 0.0)],
        );
        assert!(massless.center_of_mass().is_none());
    }

    #[test]
    fn test_total_mass() {
        assert_relative_eq!(cluster().total_mass().as_solar_masses(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_intersecting_subset_keeps_target_order() {
        let stars = cluster();
        let follow = ParticleSet::from_particles(
            ParticleKind::Stars,
            vec![
                Particle::at_parsecs(3, 0.0, 0.0, 0.0, 9.0),
                Particle::at_parsecs(1, 0.0, 0.0, 0.0, 9.0),
                Particle::at_parsecs(42, 0.0, 0.0, 0.0, 9.0),
            ],
        );
        let subset = follow.intersecting_subset_in(&stars);
        let keys: Vec<u64> = subset.iter().map(|p| p.key).collect();
        assert_eq!(keys, vec![1, 3]);
        // Attributes come from the target set, not the follow file
        assert_relative_eq!(subset.total_mass().as_solar_masses(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_translate_and_bbox() {
        let mut stars = cluster();
        stars.translate([
            Length::from_parsecs(1.0),
            Length::from_parsecs(1.0),
            Length::from_parsecs(0.0),
        ]);
        let (xmin, xmax, ymin, ymax) = stars.bounding_box_xy().unwrap();
        assert_relative_eq!(xmin.as_parsecs(), -2.0, epsilon = 1e-12);
        assert_relative_eq!(xmax.as_parsecs(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(ymin.as_parsecs(), -1.0, epsilon = 1e-12);
        assert_relative_eq!(ymax.as_parsecs(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_retain_and_add() {
        let mut stars = cluster();
        let dropped = stars.retain_where(|p| p.mass.as_solar_masses() < 1.5);
        assert_eq!(dropped, 1);
        stars.add_particles(ParticleSet::from_particles(
            ParticleKind::Stars,
            vec![Particle::at_parsecs(10, 0.0, 0.0, 0.0, 0.5)],
        ));
        assert_eq!(stars.len(), 3);
        assert_eq!(stars.as_slice()[2].key, 10);
        assert!(!stars.has_temperature());
    }
}
