//! Deciding where per-band star fluxes come from for a run.

use log::info;
use shared::units::{Luminosity, Time, TimeExt};

use super::bands::Band;
use super::evolution::{EvolutionError, StellarEvolution};
use crate::particles::ParticleSet;

/// How star luminosities are established
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FluxMode {
    /// Run stellar evolution when a positive age is requested
    Evolve,
    /// Every star gets this luminosity in every band
    Fixed(Luminosity),
}

/// What [`resolve_fluxes`] ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FluxOutcome {
    Evolved,
    Fixed,
    /// Stars keep whatever luminosities the input carried
    Untouched,
}

/// Give every star the same luminosity in each requested band
///
/// Any bolometric luminosity and temperature from the input are dropped, so
/// the renderer always uses the assigned band values.
pub fn assign_fixed_luminosity(stars: &mut ParticleSet, bands: &[Band], luminosity: Luminosity) {
    for star in stars.iter_mut() {
        star.luminosity = None;
        star.temperature = None;
        star.band_luminosity.clear();
        for &band in bands {
            star.band_luminosity.insert(band, luminosity);
        }
    }
}

/// Establish per-band luminosities for the primary stars
///
/// Evolution only runs for a strictly positive `age`; at age zero the input's
/// own luminosities are kept.
pub fn resolve_fluxes(
    stars: &mut ParticleSet,
    mode: FluxMode,
    age: Time,
    bands: &[Band],
    evolution: &dyn StellarEvolution,
) -> Result<FluxOutcome, EvolutionError> {
    match mode {
        FluxMode::Fixed(luminosity) => {
            assign_fixed_luminosity(stars, bands, luminosity);
            info!("assigned fixed luminosity to {} stars", stars.len());
            Ok(FluxOutcome::Fixed)
        }
        FluxMode::Evolve if age.as_megayears() > 0.0 => {
            evolution.evolve_to_age(stars, age, bands)?;
            info!(
                "evolved {} stars to {:.1} Myr with {} evolution",
                stars.len(),
                age.as_megayears(),
                evolution.name()
            );
            Ok(FluxOutcome::Evolved)
        }
        FluxMode::Evolve => Ok(FluxOutcome::Untouched),
    }
}
