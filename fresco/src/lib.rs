//! Synthetic observations of particle simulations
//!
//! This crate turns star and gas particle snapshots into images: stars are
//! lit by stellar evolution (or a fixed luminosity), rendered through a
//! telescope PSF in several photometric bands and combined into color, gas
//! is projected into surface-density maps drawn as contours or grayscale.
//! Multi-frame sweeps rotate the scene between frames.

pub mod args;
pub mod compositor;
pub mod config;
pub mod error;
pub mod field_stars;
pub mod geometry;
pub mod image_proc;
pub mod io;
pub mod nbody;
pub mod particles;
pub mod photometry;
pub mod rotation;
pub mod sims;

// Re-exports for easier access
pub use config::{RenderConfig, WidthSpec};
pub use error::FrescoError;
pub use particles::{Particle, ParticleKind, ParticleSet};
pub use photometry::Band;
pub use sims::{Collaborators, FrameReport, Observation};
