//! Render synthetic observations of star and gas particle sets
//!
//! Loads a stars and/or gas snapshot, centers and crops the scene, lights the
//! stars and writes one image per frame.

use std::process::ExitCode;

use clap::Parser;
use fresco::args::FrescoArgs;
use fresco::sims::{Collaborators, Observation};
use fresco::{FrescoError, RenderConfig};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::units::AngleExt;

const CITATION: &str = "------------------
If you use fresco in a publication, please cite the particle code that
produced your snapshots as well as the stellar evolution model used to
light the stars.
------------------";

fn run(args: &FrescoArgs) -> Result<(), FrescoError> {
    let config = RenderConfig::from_args(args)?;
    info!(
        "rendering {} frame(s) at {} px with PSF {}",
        config.frames,
        config.pixels,
        config.psf.label()
    );

    let collaborators = Collaborators::defaults(&config.filetype);
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut observation = Observation::prepare(config, &collaborators, &mut rng)?;

    observation.render_sweep(&collaborators, |report| {
        println!(
            "frame {}, angle: {} {} {}",
            report.frame,
            report.angles[0].as_degrees(),
            report.angles[1].as_degrees(),
            report.angles[2].as_degrees()
        );
        match report.vmax {
            Some(vmax) => println!("vmax = {vmax}"),
            None => println!("vmax = None"),
        }
    })?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = FrescoArgs::parse();

    match run(&args) {
        Ok(()) => {
            println!("{CITATION}");
            ExitCode::SUCCESS
        }
        Err(FrescoError::Psf(err)) => {
            println!("{err}");
            ExitCode::from(2)
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
