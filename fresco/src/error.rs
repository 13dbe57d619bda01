//! Top-level error type for observation runs

use shared::image_proc::OverlayError;
use thiserror::Error;

use crate::image_proc::psf::PsfError;
use crate::io::LoadError;
use crate::nbody::NBodyError;
use crate::photometry::{Band, BandError, EvolutionError};

#[derive(Error, Debug)]
pub enum FrescoError {
    #[error("No such file: neither a stars nor a gas file was found")]
    NoInput,
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Psf(#[from] PsfError),
    #[error(transparent)]
    Evolution(#[from] EvolutionError),
    #[error(transparent)]
    Units(#[from] NBodyError),
    #[error(transparent)]
    Band(#[from] BandError),
    #[error("overlay rendering failed: {0}")]
    Overlay(#[from] OverlayError),
    #[error("star {key} has no luminosity in band {band}")]
    MissingLuminosity { key: u64, band: Band },
    #[error("unsupported image type '{0}'")]
    UnsupportedImageType(String),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("empty selection: {0}")]
    EmptySelection(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
