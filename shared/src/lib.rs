//! Shared components for the fresco workspace.
//!
//! Physical units, small numeric algorithms and image plumbing that do not
//! depend on the particle model live here so they can be reused and tested
//! on their own.

pub mod algo;
pub mod image_proc;
pub mod units;
