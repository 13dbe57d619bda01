//! End-to-end observation runs

pub mod observation;

pub use observation::{render_frame, Collaborators, FrameReport, Observation};
