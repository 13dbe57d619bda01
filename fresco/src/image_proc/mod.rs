//! Frame synthesis: PSFs, star images, gas density and extinction.

pub mod density;
pub mod extinction;
pub mod psf;
pub mod render;

pub use density::{DensityMapper, SphColumnDensity};
pub use extinction::ExtinctionScreen;
pub use psf::{PsfError, PsfKernels, PsfSpec};
pub use render::{compute_vmax, ImageSynthesizer, PsfImageSynthesizer, StarImage, SynthesisRequest};
