//! A complete observation: scene preparation followed by a rotation sweep.

use std::path::PathBuf;

use image::DynamicImage;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use shared::units::{Angle, Length, LengthExt, Mass, MassExt};

use crate::compositor::{output_filename, save_frame, FrameCompositor, FrameExtent, FrameLayers};
use crate::config::{RenderConfig, WidthSpec};
use crate::error::FrescoError;
use crate::field_stars::{prepare_field_stars, FieldStarGenerator, SalpeterFieldStars};
use crate::geometry::{apply_offset, center_offset, crop, max_width_frame, CropMargin};
use crate::image_proc::{
    DensityMapper, ImageSynthesizer, PsfImageSynthesizer, SphColumnDensity, SynthesisRequest,
};
use crate::io::{FileParticleLoader, ParticleLoader};
use crate::nbody::NBodyConverter;
use crate::particles::{ParticleKind, ParticleSet};
use crate::photometry::{resolve_fluxes, AnalyticEvolution, StellarEvolution};
use crate::rotation::RotationStepper;

/// The pluggable parts of a run
pub struct Collaborators {
    pub loader: Box<dyn ParticleLoader>,
    pub evolution: Box<dyn StellarEvolution>,
    pub field_stars: Box<dyn FieldStarGenerator>,
    pub synthesizer: Box<dyn ImageSynthesizer>,
    pub density: Box<dyn DensityMapper>,
}

impl Collaborators {
    /// File loader for `filetype` plus the built-in physics
    pub fn defaults(filetype: &str) -> Self {
        Self {
            loader: Box::new(FileParticleLoader::new(filetype)),
            evolution: Box::new(AnalyticEvolution::new()),
            field_stars: Box::new(SalpeterFieldStars::default()),
            synthesizer: Box::new(PsfImageSynthesizer::new()),
            density: Box::new(SphColumnDensity),
        }
    }
}

/// What happened in one rendered frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub frame: usize,
    /// Cumulative rotation `frame × step` per axis
    pub angles: [Angle; 3],
    pub vmax: Option<f64>,
    pub path: PathBuf,
}

/// A prepared scene ready to be rendered
#[derive(Debug, Clone)]
pub struct Observation {
    config: RenderConfig,
    stars: ParticleSet,
    gas: ParticleSet,
    converter: NBodyConverter,
    width: Length,
    offset: [Length; 3],
}

impl Observation {
    /// Load, light, center and crop the scene
    ///
    /// Star fluxes are resolved before centering. Field stars are added after
    /// the stars are cropped, and gas is loaded last, shifted by the same
    /// offset (or its own center of mass when centering is requested and
    /// there are no stars) and cropped with the tighter gas margin.
    pub fn prepare(
        config: RenderConfig,
        collaborators: &Collaborators,
        rng: &mut StdRng,
    ) -> Result<Self, FrescoError> {
        let mut offset = config.offset;
        let mut width = match config.width {
            WidthSpec::Fixed(width) => Some(width),
            WidthSpec::Max => None,
        };

        let mut stars = match &config.stars_path {
            Some(path) => collaborators.loader.load(path, ParticleKind::Stars)?,
            None => ParticleSet::new(ParticleKind::Stars),
        };
        if config.stars_path.is_some() {
            resolve_fluxes(
                &mut stars,
                config.flux_mode(),
                config.age,
                &config.bands,
                collaborators.evolution.as_ref(),
            )?;

            let follow = match &config.follow_path {
                Some(path) => Some(
                    collaborators
                        .loader
                        .load(path, ParticleKind::Stars)?
                        .intersecting_subset_in(&stars),
                ),
                None => None,
            };
            offset = center_offset(&stars, follow.as_ref(), config.use_com, offset);

            if width.is_none() {
                let (fit, center) = max_width_frame(&stars).ok_or_else(|| {
                    FrescoError::EmptySelection("cannot fit width 'max' to an empty star set".into())
                })?;
                width = Some(fit);
                offset[0] = center[0];
                offset[1] = center[1];
            }
        }
        let width = width.ok_or_else(|| {
            FrescoError::EmptySelection("width 'max' requires a stars file".into())
        })?;
        if width.as_parsecs().is_nan() || width.as_parsecs() <= 0.0 {
            return Err(FrescoError::EmptySelection(
                "stars span a zero-width field".into(),
            ));
        }

        if config.stars_path.is_some() {
            apply_offset(&mut stars, offset);
            crop(&mut stars, width, CropMargin::STARS);
        }

        if config.field_stars > 0 {
            let field = prepare_field_stars(
                config.field_stars,
                width,
                collaborators.field_stars.as_ref(),
                collaborators.evolution.as_ref(),
                &config.bands,
                rng,
            )?;
            stars.add_particles(field);
        }

        let mut gas = match &config.gas_path {
            Some(path) => collaborators.loader.load(path, ParticleKind::Gas)?,
            None => ParticleSet::new(ParticleKind::Gas),
        };
        if config.gas_path.is_some() {
            if config.use_com && stars.is_empty() {
                if let Some(com) = gas.center_of_mass() {
                    offset = com;
                }
            }
            apply_offset(&mut gas, offset);
            crop(&mut gas, width, CropMargin::GAS);
        }

        let total = if stars.is_empty() {
            gas.total_mass()
        } else {
            stars.total_mass()
        };
        let mass_unit = if total.as_solar_masses() > 0.0 {
            total
        } else {
            Mass::from_solar_masses(1.0)
        };
        let converter = NBodyConverter::new(mass_unit, width)?;

        info!(
            "scene: {} stars, {} gas particles, width {:.3} pc, offset ({:.3}, {:.3}, {:.3}) pc",
            stars.len(),
            gas.len(),
            width.as_parsecs(),
            offset[0].as_parsecs(),
            offset[1].as_parsecs(),
            offset[2].as_parsecs()
        );

        Ok(Self {
            config,
            stars,
            gas,
            converter,
            width,
            offset,
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn stars(&self) -> &ParticleSet {
        &self.stars
    }

    pub fn gas(&self) -> &ParticleSet {
        &self.gas
    }

    pub fn converter(&self) -> &NBodyConverter {
        &self.converter
    }

    pub fn width(&self) -> Length {
        self.width
    }

    pub fn offset(&self) -> [Length; 3] {
        self.offset
    }

    /// Physical extent of every frame
    pub fn extent(&self) -> FrameExtent {
        FrameExtent::new(self.width, self.offset[0], self.offset[1])
    }

    /// Render and save all frames
    ///
    /// `vmax` starts from the configured value and is carried from each
    /// rendered star frame to the next, so a sweep keeps one brightness scale.
    pub fn render_sweep<F>(
        &mut self,
        collaborators: &Collaborators,
        mut on_frame: F,
    ) -> Result<Vec<FrameReport>, FrescoError>
    where
        F: FnMut(&FrameReport),
    {
        let frames = self.config.frames;
        if frames == 0 {
            warn!("zero frames requested, nothing to render");
            return Ok(Vec::new());
        }

        let stepper = RotationStepper::new(self.config.rotation_step, frames);
        stepper.prepare(&mut self.stars);
        stepper.prepare(&mut self.gas);

        let compositor = FrameCompositor::new(self.extent(), self.config.plot_axes);
        let mut vmax = self.config.vmax;
        let mut reports = Vec::with_capacity(frames);

        for index in 0..frames {
            let frame = stepper.frame_number(index);
            let step = stepper.step();
            let angles = step.map(|a| a * frame as f64);

            stepper.step_for_frame(&mut self.stars, frame);
            stepper.step_for_frame(&mut self.gas, frame);

            let (image, frame_vmax) = render_frame(
                &self.stars,
                &self.gas,
                &self.config,
                &self.converter,
                self.width,
                collaborators,
                &compositor,
                vmax,
            )?;
            vmax = frame_vmax;

            let path = PathBuf::from(output_filename(
                &self.config.output_base,
                frame,
                frames,
                &self.config.imagetype,
            ));
            save_frame(&image, &path, &self.config.imagetype)?;
            debug!("wrote {}", path.display());

            let report = FrameReport {
                frame,
                angles,
                vmax,
                path,
            };
            on_frame(&report);
            reports.push(report);
        }
        Ok(reports)
    }
}

/// Render one frame of the current scene
///
/// Returns the composed image and the normalization ceiling to carry into
/// the next frame. Gas-only frames pass `vmax` through untouched.
#[allow(clippy::too_many_arguments)]
pub fn render_frame(
    stars: &ParticleSet,
    gas: &ParticleSet,
    config: &RenderConfig,
    converter: &NBodyConverter,
    width: Length,
    collaborators: &Collaborators,
    compositor: &FrameCompositor,
    vmax: Option<f64>,
) -> Result<(DynamicImage, Option<f64>), FrescoError> {
    let image_size = config.image_size();

    if stars.is_empty() {
        if gas.is_empty() {
            warn!("no particles left in the field of view");
        }
        let density = collaborators
            .density
            .column_density_map(gas, converter, width, image_size)?;
        let image = compositor.compose(FrameLayers::Gas { density: &density })?;
        return Ok((image, vmax));
    }

    let request = SynthesisRequest {
        stars,
        gas: (!gas.is_empty()).then_some(gas),
        converter,
        image_width: width,
        image_size,
        percentile: config.percentile,
        calc_temperature: stars.has_temperature(),
        age: config.age,
        vmax,
        bands: &config.bands,
        psf: &config.psf,
        zoom_factor: config.zoom_factor(),
        extinction: config.extinction,
    };
    let star_image = collaborators.synthesizer.make_image(&request)?;

    let contours = if config.contours && !gas.is_empty() {
        Some(
            collaborators
                .density
                .column_density_map(gas, converter, width, image_size)?,
        )
    } else {
        None
    };

    let image = compositor.compose(FrameLayers::Stars {
        image: &star_image,
        contours: contours.as_ref(),
    })?;
    Ok((image, Some(star_image.vmax)))
}
