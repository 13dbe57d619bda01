//! SVG overlays rasterized on top of rendered frames
//!
//! Contour lines and axis decorations are described as SVG, rendered with
//! resvg into a transparent pixmap and alpha-blended onto the frame.

use std::fmt::Write;
use std::sync::Arc;

use image::{Rgb, RgbImage};
use once_cell::sync::Lazy;
use thiserror::Error;
use tiny_skia::{Pixmap, Transform};
use usvg::{fontdb, Options, Tree};

/// Errors raised while building or rasterizing an overlay
#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("SVG parsing failed: {0}")]
    Svg(#[from] usvg::Error),
    #[error("cannot allocate a {0}x{1} overlay pixmap")]
    Pixmap(u32, u32),
}

static FONTS: Lazy<Arc<fontdb::Database>> = Lazy::new(|| {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    Arc::new(db)
});

/// Incrementally built SVG document sized to a frame
#[derive(Debug, Clone)]
pub struct SvgOverlay {
    width: u32,
    height: u32,
    body: String,
}

impl SvgOverlay {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            body: String::new(),
        }
    }

    /// True when nothing has been drawn yet
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Add one path made of disjoint line segments in image coordinates
    pub fn segments(
        &mut self,
        segments: impl IntoIterator<Item = ((f64, f64), (f64, f64))>,
        color: &str,
        stroke_width: f64,
    ) {
        let mut d = String::new();
        for ((x0, y0), (x1, y1)) in segments {
            let _ = write!(d, "M{x0:.2} {y0:.2}L{x1:.2} {y1:.2}");
        }
        if d.is_empty() {
            return;
        }
        let _ = write!(
            self.body,
            r#"<path d="{d}" fill="none" stroke="{color}" stroke-width="{stroke_width:.3}" stroke-linecap="round"/>"#
        );
    }

    /// Add an outlined rectangle
    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &str, stroke_width: f64) {
        let _ = write!(
            self.body,
            r#"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" fill="none" stroke="{color}" stroke-width="{stroke_width:.3}"/>"#
        );
    }

    /// Add a text label anchored at (`x`, `y`)
    pub fn text(&mut self, x: f64, y: f64, label: &str, color: &str, size: f64, anchor: &str) {
        let _ = write!(
            self.body,
            r#"<text x="{x:.2}" y="{y:.2}" font-family="sans-serif" font-size="{size:.1}" fill="{color}" text-anchor="{anchor}">{label}</text>"#
        );
    }

    /// The complete SVG document
    pub fn to_svg(&self) -> String {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}">{}</svg>"#,
            self.width, self.height, self.body
        )
    }

    /// Rasterize the overlay and blend it onto `image`
    pub fn apply(&self, image: &RgbImage) -> Result<RgbImage, OverlayError> {
        if self.is_empty() {
            return Ok(image.clone());
        }
        overlay_to_image(image, &self.to_svg())
    }
}

/// Render `svg_data` and alpha-blend it over `image`
pub fn overlay_to_image(image: &RgbImage, svg_data: &str) -> Result<RgbImage, OverlayError> {
    let options = Options {
        fontdb: FONTS.clone(),
        ..Options::default()
    };
    let tree = Tree::from_str(svg_data, &options)?;

    let (width, height) = image.dimensions();
    let mut pixmap = Pixmap::new(width, height).ok_or(OverlayError::Pixmap(width, height))?;
    resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());

    let mut output = image.clone();
    for (x, y, pixel) in output.enumerate_pixels_mut() {
        let Some(overlay_pixel) = pixmap.pixel(x, y) else {
            continue;
        };
        if overlay_pixel.alpha() == 0 {
            continue;
        }
        let color = overlay_pixel.demultiply();
        let alpha = color.alpha();
        *pixel = Rgb([
            blend_channel(pixel[0], color.red(), alpha),
            blend_channel(pixel[1], color.green(), alpha),
            blend_channel(pixel[2], color.blue(), alpha),
        ]);
    }

    Ok(output)
}

fn blend_channel(base: u8, overlay: u8, alpha: u8) -> u8 {
    let alpha_f = alpha as f32 / 255.0;
    (base as f32 * (1.0 - alpha_f) + overlay as f32 * alpha_f).round() as u8
}
