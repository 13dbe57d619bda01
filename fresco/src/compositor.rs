//! Final frame assembly: star image, gas contours or grayscale gas, axes.

use std::path::Path;

use image::{DynamicImage, ImageFormat, RgbImage};
use log::debug;
use ndarray::Array2;
use shared::algo::{logspace, MinMaxScan};
use shared::image_proc::{
    field_to_image_coords, gray_field_to_image, iso_segments, rgb_field_to_image, SvgOverlay,
};
use shared::units::{Length, LengthExt};

use crate::error::FrescoError;
use crate::image_proc::StarImage;

/// Contour stroke color
pub const CONTOUR_COLOR: &str = "white";

/// Contour stroke width in output pixels
pub const CONTOUR_STROKE_PX: f64 = 0.83;

const AXIS_COLOR: &str = "white";
const AXIS_TICKS: usize = 5;

/// Four logarithmically spaced contour levels for a density field
///
/// Non-finite values count as zero. With `M` the field maximum the levels
/// span `(M/200, M/2]`: the lowest of five log-spaced values between
/// `M/200` and `M/2` is dropped. Returns `None` when the field has no
/// positive value.
pub fn contour_levels(field: &Array2<f64>) -> Option<Vec<f64>> {
    let max = field
        .iter()
        .map(|v| if v.is_finite() { *v } else { 0.0 })
        .fold(0.0f64, f64::max);
    if max <= 0.0 {
        return None;
    }
    let vmax = max / 2.0;
    let vmin = vmax / 100.0;
    Some(logspace(vmin, vmax, 5).into_iter().skip(1).collect())
}

/// Physical extent covered by a frame, following the centering offsets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameExtent {
    pub xmin: Length,
    pub xmax: Length,
    pub ymin: Length,
    pub ymax: Length,
}

impl FrameExtent {
    pub fn new(width: Length, x_offset: Length, y_offset: Length) -> Self {
        let half = width / 2.0;
        Self {
            xmin: x_offset - half,
            xmax: x_offset + half,
            ymin: y_offset - half,
            ymax: y_offset + half,
        }
    }
}

/// What gets drawn in a frame
#[derive(Debug, Clone, Copy)]
pub enum FrameLayers<'a> {
    /// Stars, optionally with gas surface-density contours on top
    Stars {
        image: &'a StarImage,
        contours: Option<&'a Array2<f64>>,
    },
    /// Gas alone, as a grayscale surface-density map
    Gas { density: &'a Array2<f64> },
}

/// Assembles the image that is written for each frame
#[derive(Debug, Clone)]
pub struct FrameCompositor {
    pub extent: FrameExtent,
    pub plot_axes: bool,
}

impl FrameCompositor {
    pub fn new(extent: FrameExtent, plot_axes: bool) -> Self {
        Self { extent, plot_axes }
    }

    pub fn compose(&self, layers: FrameLayers<'_>) -> Result<DynamicImage, FrescoError> {
        match layers {
            FrameLayers::Stars { image, contours } => {
                let base = rgb_field_to_image(&image.rgb);
                let mut overlay = SvgOverlay::new(base.width(), base.height());
                if let Some(field) = contours {
                    self.draw_contours(&mut overlay, field);
                }
                if self.plot_axes {
                    self.draw_axes(&mut overlay, base.width(), base.height());
                }
                Ok(DynamicImage::ImageRgb8(overlay.apply(&base)?))
            }
            FrameLayers::Gas { density } => {
                let cleaned = density.mapv(|v| if v.is_finite() { v } else { 0.0 });
                let (lo, hi) = MinMaxScan::from_values(cleaned.iter().copied())
                    .min_max()
                    .unwrap_or((0.0, 0.0));
                let gray = gray_field_to_image(&cleaned, lo, hi);
                if !self.plot_axes {
                    return Ok(DynamicImage::ImageLuma8(gray));
                }
                let rgb: RgbImage = DynamicImage::ImageLuma8(gray).to_rgb8();
                let mut overlay = SvgOverlay::new(rgb.width(), rgb.height());
                self.draw_axes(&mut overlay, rgb.width(), rgb.height());
                Ok(DynamicImage::ImageRgb8(overlay.apply(&rgb)?))
            }
        }
    }

    fn draw_contours(&self, overlay: &mut SvgOverlay, field: &Array2<f64>) {
        let Some(levels) = contour_levels(field) else {
            return;
        };
        let cleaned = field.mapv(|v| if v.is_finite() { v } else { 0.0 });
        let height = cleaned.nrows();
        for level in &levels {
            let segments = iso_segments(&cleaned.view(), *level);
            debug!("contour level {level:.4e}: {} segments", segments.len());
            overlay.segments(
                segments.into_iter().map(|((c0, r0), (c1, r1))| {
                    (
                        field_to_image_coords(c0, r0, height),
                        field_to_image_coords(c1, r1, height),
                    )
                }),
                CONTOUR_COLOR,
                CONTOUR_STROKE_PX,
            );
        }
    }

    fn draw_axes(&self, overlay: &mut SvgOverlay, width: u32, height: u32) {
        let (w, h) = (width as f64, height as f64);
        let stroke = (w / 512.0).max(1.0);
        let font = (w / 40.0).max(8.0);
        let tick = font * 0.6;
        overlay.rect(0.5, 0.5, w - 1.0, h - 1.0, AXIS_COLOR, stroke);

        let (xmin, xmax) = (self.extent.xmin.as_parsecs(), self.extent.xmax.as_parsecs());
        let (ymin, ymax) = (self.extent.ymin.as_parsecs(), self.extent.ymax.as_parsecs());
        let mut ticks = Vec::new();
        for i in 0..AXIS_TICKS {
            let f = (i as f64 + 0.5) / AXIS_TICKS as f64;
            let px = f * w;
            let py = h - f * h;
            ticks.push(((px, h), (px, h - tick)));
            ticks.push(((0.0, py), (tick, py)));
            let xv = xmin + f * (xmax - xmin);
            let yv = ymin + f * (ymax - ymin);
            overlay.text(px, h - tick - 2.0, &format!("{xv:.1}"), AXIS_COLOR, font, "middle");
            overlay.text(tick + 2.0, py + font / 3.0, &format!("{yv:.1}"), AXIS_COLOR, font, "start");
        }
        overlay.segments(ticks, AXIS_COLOR, stroke);
        overlay.text(w - 4.0, h - 2.0 * tick - font, "x [pc]", AXIS_COLOR, font, "end");
        overlay.text(4.0, font + 2.0, "y [pc]", AXIS_COLOR, font, "start");
    }
}

/// File name for a frame: `{base}-{frame:06}.{type}` in a sweep, else `{base}.{type}`
pub fn output_filename(base: &str, frame: usize, frames: usize, imagetype: &str) -> String {
    if frames > 1 {
        format!("{base}-{frame:06}.{imagetype}")
    } else {
        format!("{base}.{imagetype}")
    }
}

/// Image format for an `--imagetype` value
pub fn image_format(imagetype: &str) -> Result<ImageFormat, FrescoError> {
    ImageFormat::from_extension(imagetype)
        .ok_or_else(|| FrescoError::UnsupportedImageType(imagetype.to_string()))
}

/// Write a composed frame
pub fn save_frame(image: &DynamicImage, path: &Path, imagetype: &str) -> Result<(), FrescoError> {
    let format = image_format(imagetype)?;
    image.save_with_format(path, format)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array3;

    #[test]
    fn test_output_filename() {
        assert_eq!(output_filename("test", 1, 1, "png"), "test.png");
        assert_eq!(output_filename("run", 12, 20, "jpg"), "run-000012.jpg");
        assert_eq!(output_filename("a/b", 3, 2, "png"), "a/b-000003.png");
    }

    #[test]
    fn test_contour_levels_bounds() {
        let mut field = Array2::<f64>::zeros((8, 8));
        field[[3, 3]] = 400.0;
        field[[4, 4]] = f64::NAN;
        let levels = contour_levels(&field).unwrap();
        assert_eq!(levels.len(), 4);
        assert!(levels.windows(2).all(|w| w[0] < w[1]));
        assert!(levels[0] > 400.0 / 200.0);
        assert_relative_eq!(levels[3], 200.0, max_relative = 1e-12);
        let ratio = 100f64.powf(0.25);
        for pair in levels.windows(2) {
            assert_relative_eq!(pair[1] / pair[0], ratio, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_contour_levels_empty_field() {
        assert!(contour_levels(&Array2::<f64>::zeros((4, 4))).is_none());
        assert!(contour_levels(&Array2::from_elem((4, 4), f64::NAN)).is_none());
    }

    #[test]
    fn test_extent_follows_offsets() {
        let extent = FrameExtent::new(
            Length::from_parsecs(4.0),
            Length::from_parsecs(1.0),
            Length::from_parsecs(-2.0),
        );
        assert_relative_eq!(extent.xmin.as_parsecs(), -1.0, epsilon = 1e-12);
        assert_relative_eq!(extent.xmax.as_parsecs(), 3.0, epsilon = 1e-12);
        assert_relative_eq!(extent.ymin.as_parsecs(), -4.0, epsilon = 1e-12);
        assert_relative_eq!(extent.ymax.as_parsecs(), 0.0, epsilon = 1e-12);
    }

    fn compositor(plot_axes: bool) -> FrameCompositor {
        FrameCompositor::new(
            FrameExtent::new(
                Length::from_parsecs(2.0),
                Length::from_parsecs(0.0),
                Length::from_parsecs(0.0),
            ),
            plot_axes,
        )
    }

    #[test]
    fn test_gas_only_is_grayscale_min_max() {
        let density = Array2::from_shape_fn((4, 6), |(r, c)| (r * 6 + c) as f64);
        let image = compositor(false)
            .compose(FrameLayers::Gas { density: &density })
            .unwrap();
        let gray = image.as_luma8().unwrap();
        assert_eq!(gray.dimensions(), (6, 4));
        // Row 0 of the field (lowest values) is the bottom of the picture
        assert_eq!(gray.get_pixel(0, 3).0[0], 0);
        assert_eq!(gray.get_pixel(5, 0).0[0], 255);
    }

    #[test]
    fn test_contours_draw_on_star_frame() {
        let star = StarImage {
            rgb: Array3::zeros((32, 32, 3)),
            vmax: 1.0,
        };
        let density = Array2::from_shape_fn((32, 32), |(r, c)| {
            let d2 = (r as f64 - 16.0).powi(2) + (c as f64 - 16.0).powi(2);
            (-d2 / 20.0).exp()
        });
        let plain = compositor(false)
            .compose(FrameLayers::Stars {
                image: &star,
                contours: None,
            })
            .unwrap();
        assert!(plain.to_rgb8().pixels().all(|p| p.0 == [0, 0, 0]));

        let contoured = compositor(false)
            .compose(FrameLayers::Stars {
                image: &star,
                contours: Some(&density),
            })
            .unwrap()
            .to_rgb8();
        assert_eq!(contoured.dimensions(), (32, 32));
        assert!(contoured.pixels().any(|p| p.0[0] > 0));
    }

    #[test]
    fn test_axes_mark_the_border() {
        let star = StarImage {
            rgb: Array3::zeros((64, 64, 3)),
            vmax: 1.0,
        };
        let framed = compositor(true)
            .compose(FrameLayers::Stars {
                image: &star,
                contours: None,
            })
            .unwrap()
            .to_rgb8();
        assert!(framed.get_pixel(0, 32).0[0] > 0);
    }

    #[test]
    fn test_image_format_lookup() {
        assert_eq!(image_format("png").unwrap(), ImageFormat::Png);
        assert_eq!(image_format("jpg").unwrap(), ImageFormat::Jpeg);
        assert!(matches!(
            image_format("xyz"),
            Err(FrescoError::UnsupportedImageType(_))
        ));
    }
}
