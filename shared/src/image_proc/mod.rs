//! Pixel-level building blocks for synthetic observations.
//!
//! - **convolve2d**: normalized kernels and sub-pixel point-source stamping
//! - **airy**: diffraction-limited PSF kernels
//! - **contour**: marching-squares iso-lines
//! - **image**: ndarray ↔ image crate conversions (origin lower)
//! - **overlay**: SVG overlays blended onto frames

pub mod airy;
pub mod contour;
pub mod convolve2d;
pub mod image;
pub mod overlay;

pub use airy::{airy_kernel, first_zero_angle};
pub use contour::{iso_segments, Segment};
pub use convolve2d::{gaussian_kernel, normalize_kernel, resample_kernel, stamp_kernel};
pub use self::image::{field_to_image_coords, gray_field_to_image, rgb_field_to_image};
pub use overlay::{overlay_to_image, OverlayError, SvgOverlay};
