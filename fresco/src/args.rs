use clap::Parser;
use shared::units::{Length, LengthExt};

use crate::config::WidthSpec;

/// Parse the `-w` argument: a width in parsec or the literal `max`
pub fn parse_width(s: &str) -> Result<WidthSpec, String> {
    if s.trim().eq_ignore_ascii_case("max") {
        return Ok(WidthSpec::Max);
    }
    let pc = s
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("width must be a number of parsecs or 'max', got '{s}'"))?;
    if !(pc.is_finite() && pc > 0.0) {
        return Err(format!("width must be positive, got {pc}"));
    }
    Ok(WidthSpec::Fixed(Length::from_parsecs(pc)))
}

/// Command line arguments of the `fresco` renderer
#[derive(Parser, Debug, Clone)]
#[command(version, about = "Render synthetic observations of star and gas particle sets")]
pub struct FrescoArgs {
    /// Particle file format (amuse, json, csv, txt)
    #[arg(long, default_value = "amuse")]
    pub filetype: String,

    /// Stars file
    #[arg(short = 's')]
    pub stars: Option<String>,

    /// Gas file
    #[arg(short = 'g')]
    pub gas: Option<String>,

    /// File with the stars to follow (centers on their center of mass)
    #[arg(short = 'f')]
    pub follow: Option<String>,

    /// Output base filename
    #[arg(short = 'o')]
    pub output: Option<String>,

    /// Output image type
    #[arg(long, default_value = "png")]
    pub imagetype: String,

    /// Photometric bands to use
    #[arg(short = 'b', default_value = "ubvri")]
    pub bands: String,

    /// Stellar age in Myr
    #[arg(short = 'a', default_value_t = 100.0)]
    pub age: f64,

    /// Physical image width in parsec, or 'max' to fit all stars
    #[arg(short = 'w', default_value = "5", value_parser = parse_width)]
    pub width: WidthSpec,

    /// Plot axes
    #[arg(short = 'x', default_value_t = false)]
    pub axes: bool,

    /// Include dust extinction in the image
    #[arg(long = "ext", default_value_t = false)]
    pub extinction: bool,

    /// Random seed
    #[arg(long, default_value_t = 1701)]
    pub seed: u64,

    /// Fixed normalization ceiling (0 computes it from the first frame)
    #[arg(long, default_value_t = 0.0)]
    pub vmax: f64,

    /// Number of field stars to add
    #[arg(long = "field", default_value_t = 0)]
    pub field_stars: usize,

    /// Rotation step about the x-axis in degrees
    #[arg(long = "ax", default_value_t = 0.0, allow_negative_numbers = true)]
    pub angle_x: f64,

    /// Rotation step about the y-axis in degrees
    #[arg(long = "ay", default_value_t = 0.0, allow_negative_numbers = true)]
    pub angle_y: f64,

    /// Rotation step about the z-axis in degrees
    #[arg(long = "az", default_value_t = 0.0, allow_negative_numbers = true)]
    pub angle_z: f64,

    /// Number of frames (>1: rotate around x, y, z)
    #[arg(long, default_value_t = 1)]
    pub frames: usize,

    /// Pixels per axis
    #[arg(long = "px", default_value_t = 2048)]
    pub pixels: usize,

    /// PSF type (hubble, gaussian) or a kernel image file
    #[arg(long, default_value = "hubble")]
    pub psf: String,

    /// Gaussian PSF sigma in pixels at 2048 px resolution
    #[arg(long, default_value_t = 1.0)]
    pub sigma: f64,

    /// Give every star the same luminosity in every band
    #[arg(long = "fl", default_value_t = false)]
    pub fixed_luminosity: bool,

    /// Overlay gas surface-density contours on the stars
    #[arg(long, default_value_t = false)]
    pub contours: bool,

    /// Center on the center of mass
    #[arg(long = "com", default_value_t = false)]
    pub use_com: bool,

    /// Offset in x (pc)
    #[arg(long = "xo", default_value_t = 0.0, allow_negative_numbers = true)]
    pub x_offset: f64,

    /// Offset in y (pc)
    #[arg(long = "yo", default_value_t = 0.0, allow_negative_numbers = true)]
    pub y_offset: f64,

    /// Offset in z (pc)
    #[arg(long = "zo", default_value_t = 0.0, allow_negative_numbers = true)]
    pub z_offset: f64,
}
