//! Photometric bands, stellar evolution and luminosity assignment.

pub mod bands;
pub mod evolution;
pub mod flux;

pub use bands::{band_fraction, Band, BandError};
pub use evolution::{AnalyticEvolution, EvolutionError, StellarEvolution};
pub use flux::{assign_fixed_luminosity, resolve_fluxes, FluxMode, FluxOutcome};
