//! Point spread functions for star rendering.
//!
//! Kernel widths are specified at a 2048 pixel reference resolution and
//! scaled by the run's zoom factor (`pixels / 2048`), so a scene looks the
//! same at any output size.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use image::ImageError;
use ndarray::Array2;
use shared::image_proc::{airy_kernel, first_zero_angle, gaussian_kernel, resample_kernel};
use shared::image_proc::convolve2d::odd_kernel_size;
use thiserror::Error;

use crate::photometry::Band;

/// Output width the PSF widths are calibrated for
pub const REFERENCE_PIXELS: usize = 2048;

/// Primary mirror diameter of the default telescope PSF
pub const HUBBLE_APERTURE_M: f64 = 2.4;

/// Plate scale at the reference resolution
pub const HUBBLE_ARCSEC_PER_PIXEL: f64 = 0.04;

/// Dark rings included in the Airy kernel
const AIRY_RINGS: f64 = 6.0;

/// Sub-pixel integration grid for the Airy kernel
const AIRY_SUBSAMPLE: usize = 5;

/// Errors building or loading a PSF
#[derive(Error, Debug)]
pub enum PsfError {
    #[error("Invalid PSF type or file does not exist: {0}")]
    Invalid(String),
    #[error("failed to read PSF image {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: ImageError,
    },
    #[error("PSF kernel from {0} has no positive pixels")]
    EmptyKernel(String),
    #[error("invalid Gaussian PSF width {0}")]
    InvalidSigma(f64),
}

/// Which point spread function to use
#[derive(Debug, Clone, PartialEq)]
pub enum PsfSpec {
    /// Diffraction-limited 2.4 m telescope, wavelength dependent
    Hubble,
    /// Circular Gaussian, sigma in reference-resolution pixels
    Gaussian { sigma: f64 },
    /// User-supplied kernel image, identical for every band
    File(PathBuf),
}

impl PsfSpec {
    /// Interpret the `--psf` argument
    ///
    /// An existing file path wins over the named kinds; otherwise `hubble`
    /// and `gaussian` are accepted case-insensitively.
    pub fn resolve(psf: &str, sigma: f64) -> Result<Self, PsfError> {
        let path = Path::new(psf);
        if path.is_file() {
            return Ok(PsfSpec::File(path.to_path_buf()));
        }
        match psf.to_ascii_lowercase().as_str() {
            "hubble" => Ok(PsfSpec::Hubble),
            "gaussian" => {
                if sigma.is_finite() && sigma > 0.0 {
                    Ok(PsfSpec::Gaussian { sigma })
                } else {
                    Err(PsfError::InvalidSigma(sigma))
                }
            }
            _ => Err(PsfError::Invalid(psf.to_string())),
        }
    }

    /// Normalized kernel for `band` at the given zoom factor
    pub fn kernel_for_band(&self, band: Band, zoom: f64) -> Result<Array2<f64>, PsfError> {
        match self {
            PsfSpec::Hubble => {
                let arcsec = first_zero_angle(band.effective_wavelength_nm() * 1e-9, HUBBLE_APERTURE_M)
                    .to_degrees()
                    * 3600.0;
                let first_zero_px = (arcsec / HUBBLE_ARCSEC_PER_PIXEL * zoom).max(1.0);
                Ok(airy_kernel(first_zero_px, AIRY_RINGS, AIRY_SUBSAMPLE))
            }
            PsfSpec::Gaussian { sigma } => {
                let sigma_px = sigma * zoom;
                let size = odd_kernel_size((4.0 * sigma_px).max(1.0));
                Ok(gaussian_kernel(size, sigma_px))
            }
            PsfSpec::File(path) => load_kernel_image(path, zoom),
        }
    }

    pub fn label(&self) -> String {
        match self {
            PsfSpec::Hubble => "hubble".to_string(),
            PsfSpec::Gaussian { sigma } => format!("gaussian(sigma={sigma})"),
            PsfSpec::File(path) => path.display().to_string(),
        }
    }
}

/// Read a grayscale kernel image, flip it to origin-lower and resample
fn load_kernel_image(path: &Path, zoom: f64) -> Result<Array2<f64>, PsfError> {
    let gray = image::open(path)
        .map_err(|source| PsfError::Unreadable {
            path: path.display().to_string(),
            source,
        })?
        .to_luma32f();
    let (width, height) = gray.dimensions();
    let (w, h) = (width as usize, height as usize);
    let raw = Array2::from_shape_fn((h, w), |(row, col)| {
        f64::from(gray.get_pixel(col as u32, (h - 1 - row) as u32).0[0]).max(0.0)
    });
    if !(raw.sum() > 0.0) {
        return Err(PsfError::EmptyKernel(path.display().to_string()));
    }
    Ok(resample_kernel(&raw.view(), zoom))
}

/// Kernels for every band of a run, built once
#[derive(Debug, Clone)]
pub struct PsfKernels {
    kernels: BTreeMap<Band, Array2<f64>>,
}

impl PsfKernels {
    pub fn build(spec: &PsfSpec, bands: &[Band], zoom: f64) -> Result<Self, PsfError> {
        let mut kernels = BTreeMap::new();
        for &band in bands {
            kernels.insert(band, spec.kernel_for_band(band, zoom)?);
        }
        Ok(Self { kernels })
    }

    pub fn get(&self, band: Band) -> Option<&Array2<f64>> {
        self.kernels.get(&band)
    }
}
