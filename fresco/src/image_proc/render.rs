//! Star image synthesis.
//!
//! Stars are point sources: each band's image is built by stamping the
//! band's PSF kernel at every star's sub-pixel position, weighted by its band
//! luminosity. Bands are then mixed into RGB, normalized by a dynamic-range
//! ceiling (`vmax`) and sRGB encoded.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};
use ndarray::{Array2, Array3, Axis};
use shared::algo::{quantile_sorted, sorted_finite};
use shared::image_proc::stamp_kernel;
use shared::units::{Length, LengthExt, LuminosityExt, TemperatureExt, Time, TimeExt};

use super::extinction::ExtinctionScreen;
use super::psf::{PsfError, PsfKernels, PsfSpec};
use crate::error::FrescoError;
use crate::nbody::NBodyConverter;
use crate::particles::{Particle, ParticleSet};
use crate::photometry::{band_fraction, Band};

/// Everything a synthesizer needs to render one frame
#[derive(Debug, Clone)]
pub struct SynthesisRequest<'a> {
    pub stars: &'a ParticleSet,
    pub gas: Option<&'a ParticleSet>,
    pub converter: &'a NBodyConverter,
    pub image_width: Length,
    /// (width, height) in pixels
    pub image_size: (usize, usize),
    pub percentile: f64,
    /// Derive band luminosities from luminosity and temperature
    pub calc_temperature: bool,
    pub age: Time,
    /// Fixed normalization ceiling; computed from the image when `None`
    pub vmax: Option<f64>,
    pub bands: &'a [Band],
    pub psf: &'a PsfSpec,
    pub zoom_factor: f64,
    pub extinction: bool,
}

/// Rendered star frame
#[derive(Debug, Clone)]
pub struct StarImage {
    /// `[row, col, channel]`, values in [0, 1], row 0 at the bottom
    pub rgb: Array3<f64>,
    /// Ceiling used for normalization, always finite and positive
    pub vmax: f64,
}

/// Renders stars into an RGB image
pub trait ImageSynthesizer {
    fn make_image(&self, request: &SynthesisRequest<'_>) -> Result<StarImage, FrescoError>;
}

/// Normalization ceiling of a linear RGB field
///
/// Takes the value at quantile `1 - 3 (1 - percentile)` of all finite channel
/// values. Falls back to the maximum when that is not positive, and to 1 for
/// an entirely dark field.
pub fn compute_vmax(rgb: &Array3<f64>, percentile: f64) -> f64 {
    let sorted = sorted_finite(rgb.iter().copied());
    let q = (1.0 - 3.0 * (1.0 - percentile)).clamp(0.0, 1.0);
    if let Some(v) = quantile_sorted(&sorted, q).filter(|v| *v > 0.0) {
        return v;
    }
    match sorted.last() {
        Some(&max) if max > 0.0 => {
            debug!("quantile {q} is dark, using maximum {max} as vmax");
            max
        }
        _ => {
            warn!("image is entirely dark, using vmax = 1");
            1.0
        }
    }
}

/// sRGB transfer curve for a linear value in [0, 1]
pub fn srgb_encode(linear: f64) -> f64 {
    if linear <= 0.003_130_8 {
        12.92 * linear
    } else {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    }
}

/// Band luminosity of one star in solar luminosities
fn band_luminosity(star: &Particle, band: Band, calc_temperature: bool) -> Result<f64, FrescoError> {
    if calc_temperature {
        if let (Some(l), Some(t)) = (star.luminosity, star.temperature) {
            return Ok(l.as_solar_luminosities() * band_fraction(band, t.as_kelvin()));
        }
    }
    star.band_luminosity
        .get(&band)
        .map(|l| l.as_solar_luminosities())
        .ok_or(FrescoError::MissingLuminosity {
            key: star.key,
            band,
        })
}

#[derive(Debug, Clone)]
struct CachedKernels {
    psf: PsfSpec,
    bands: Vec<Band>,
    zoom: f64,
    kernels: Rc<PsfKernels>,
}

/// PSF-stamping synthesizer with optional dust extinction
///
/// Kernels are kept between calls and rebuilt only when the PSF, the bands
/// or the zoom factor change, so a sweep builds them once.
#[derive(Debug, Clone, Default)]
pub struct PsfImageSynthesizer {
    cache: RefCell<Option<CachedKernels>>,
}

impl PsfImageSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn kernels(&self, request: &SynthesisRequest<'_>) -> Result<Rc<PsfKernels>, PsfError> {
        if let Some(cached) = self.cache.borrow().as_ref() {
            if cached.psf == *request.psf
                && cached.bands == request.bands
                && cached.zoom == request.zoom_factor
            {
                return Ok(Rc::clone(&cached.kernels));
            }
        }
        let kernels = Rc::new(PsfKernels::build(
            request.psf,
            request.bands,
            request.zoom_factor,
        )?);
        debug!("built PSF kernels for {} bands", request.bands.len());
        *self.cache.borrow_mut() = Some(CachedKernels {
            psf: request.psf.clone(),
            bands: request.bands.to_vec(),
            zoom: request.zoom_factor,
            kernels: Rc::clone(&kernels),
        });
        Ok(kernels)
    }
}

impl ImageSynthesizer for PsfImageSynthesizer {
    fn make_image(&self, request: &SynthesisRequest<'_>) -> Result<StarImage, FrescoError> {
        let (nx, ny) = request.image_size;
        let kernels = self.kernels(request)?;
        let pixel_pc = request.image_width.as_parsecs() / nx.max(1) as f64;

        let columns: Option<Vec<f64>> = match request.gas {
            Some(gas) if request.extinction && !gas.is_empty() => {
                let screen = ExtinctionScreen::new(gas, Length::from_parsecs(pixel_pc));
                Some(request.stars.iter().map(|s| screen.column_in_front(s)).collect())
            }
            _ => None,
        };

        let mut rgb = Array3::<f64>::zeros((ny, nx, 3));
        let mut band_image = Array2::<f64>::zeros((ny, nx));
        for &band in request.bands {
            let Some(kernel) = kernels.get(band) else {
                continue;
            };
            band_image.fill(0.0);
            for (i, star) in request.stars.iter().enumerate() {
                let mut weight = band_luminosity(star, band, request.calc_temperature)?;
                if let Some(columns) = &columns {
                    weight *= ExtinctionScreen::transmission(columns[i], band);
                }
                let col = star.x().as_parsecs() / pixel_pc + nx as f64 / 2.0 - 0.5;
                let row = star.y().as_parsecs() / pixel_pc + ny as f64 / 2.0 - 0.5;
                stamp_kernel(&mut band_image, &kernel.view(), col, row, weight);
            }
            for (channel, w) in band.rgb_weights().into_iter().enumerate() {
                if w > 0.0 {
                    rgb.index_axis_mut(Axis(2), channel)
                        .scaled_add(w, &band_image);
                }
            }
        }

        let vmax = match request.vmax {
            Some(v) if v.is_finite() && v > 0.0 => v,
            _ => compute_vmax(&rgb, request.percentile),
        };
        rgb.mapv_inplace(|v| srgb_encode((v / vmax).clamp(0.0, 1.0)));
        debug!(
            "rendered {} stars at {:.1} Myr, {}x{} px, vmax {:.4e}",
            request.stars.len(),
            request.age.as_megayears(),
            nx,
            ny,
            vmax
        );
        Ok(StarImage { rgb, vmax })
    }
}
