//! Immutable run configuration derived from the command line.

use std::path::{Path, PathBuf};

use log::warn;
use shared::units::{Angle, AngleExt, Length, LengthExt, Luminosity, LuminosityExt, Time, TimeExt};

use crate::args::FrescoArgs;
use crate::error::FrescoError;
use crate::image_proc::psf::{PsfSpec, REFERENCE_PIXELS};
use crate::photometry::{Band, FluxMode};

/// Fraction of pixel values below the normalization ceiling
pub const PERCENTILE: f64 = 0.9995;

/// Output base filename when none is given
pub const DEFAULT_OUTPUT_BASE: &str = "test";

/// Band luminosity every star gets in fixed-luminosity mode, in LSun
pub const FIXED_LUMINOSITY_LSUN: f64 = 1.0;

/// Physical width of the field of view
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WidthSpec {
    Fixed(Length),
    /// Fit the bounding box of all stars
    Max,
}

/// Everything a run needs, in typed units
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub filetype: String,
    pub stars_path: Option<PathBuf>,
    pub gas_path: Option<PathBuf>,
    pub follow_path: Option<PathBuf>,
    pub output_base: String,
    pub imagetype: String,
    pub bands: Vec<Band>,
    pub age: Time,
    pub width: WidthSpec,
    pub plot_axes: bool,
    pub extinction: bool,
    pub seed: u64,
    pub vmax: Option<f64>,
    pub field_stars: usize,
    pub rotation_step: [Angle; 3],
    pub frames: usize,
    pub pixels: usize,
    pub psf: PsfSpec,
    pub fixed_luminosity: bool,
    pub contours: bool,
    pub use_com: bool,
    pub offset: [Length; 3],
    pub percentile: f64,
}

/// A path argument that names an existing file, `None` otherwise
fn existing_file(arg: Option<&str>, what: &str) -> Option<PathBuf> {
    let arg = arg?;
    let path = Path::new(arg);
    if path.exists() {
        Some(path.to_path_buf())
    } else {
        warn!("{what} file {arg} does not exist, ignoring it");
        None
    }
}

impl RenderConfig {
    /// Validate and convert parsed arguments
    ///
    /// The PSF is checked first, then the inputs: when neither the stars nor
    /// the gas file exists the run fails with [`FrescoError::NoInput`].
    pub fn from_args(args: &FrescoArgs) -> Result<Self, FrescoError> {
        let psf = PsfSpec::resolve(&args.psf, args.sigma)?;

        let stars_path = existing_file(args.stars.as_deref(), "stars");
        let gas_path = existing_file(args.gas.as_deref(), "gas");
        if stars_path.is_none() && gas_path.is_none() {
            return Err(FrescoError::NoInput);
        }
        let follow_path = existing_file(args.follow.as_deref(), "follow");

        let bands = Band::parse_bands(&args.bands)?;
        if args.pixels == 0 {
            return Err(FrescoError::InvalidConfig("--px must be positive".into()));
        }
        if !(args.age.is_finite() && args.age >= 0.0) {
            return Err(FrescoError::InvalidConfig(format!(
                "age must be non-negative, got {}",
                args.age
            )));
        }

        Ok(Self {
            filetype: args.filetype.clone(),
            stars_path,
            gas_path,
            use_com: args.use_com || follow_path.is_some(),
            follow_path,
            output_base: args
                .output
                .clone()
                .unwrap_or_else(|| DEFAULT_OUTPUT_BASE.to_string()),
            imagetype: args.imagetype.clone(),
            bands,
            age: Time::from_megayears(args.age),
            width: args.width,
            plot_axes: args.axes,
            extinction: args.extinction,
            seed: args.seed,
            vmax: (args.vmax > 0.0).then_some(args.vmax),
            field_stars: args.field_stars,
            rotation_step: [
                Angle::from_degrees(args.angle_x),
                Angle::from_degrees(args.angle_y),
                Angle::from_degrees(args.angle_z),
            ],
            frames: args.frames,
            pixels: args.pixels,
            psf,
            fixed_luminosity: args.fixed_luminosity,
            contours: args.contours,
            offset: [
                Length::from_parsecs(args.x_offset),
                Length::from_parsecs(args.y_offset),
                Length::from_parsecs(args.z_offset),
            ],
            percentile: PERCENTILE,
        })
    }

    /// Output resolution relative to the 2048 px reference
    pub fn zoom_factor(&self) -> f64 {
        self.pixels as f64 / REFERENCE_PIXELS as f64
    }

    /// (width, height) in pixels
    pub fn image_size(&self) -> (usize, usize) {
        (self.pixels, self.pixels)
    }

    pub fn flux_mode(&self) -> FluxMode {
        if self.fixed_luminosity {
            FluxMode::Fixed(Luminosity::from_solar_luminosities(FIXED_LUMINOSITY_LSUN))
        } else {
            FluxMode::Evolve
        }
    }
}
