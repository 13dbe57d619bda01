//! Framing: centering offsets, automatic field width and field-of-view crops.

use log::debug;
use shared::units::{Length, LengthExt};

use crate::particles::ParticleSet;

/// Multiplier on the half-width used when cropping a population
///
/// Stars get a wider margin so PSF wings of stars just outside the frame
/// still reach the image; gas only needs its smoothing kernels covered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropMargin(pub f64);

impl CropMargin {
    pub const STARS: CropMargin = CropMargin(1.5);
    pub const GAS: CropMargin = CropMargin(1.1);
}

/// Offset that centering will subtract from every position
///
/// With `use_com` the center of mass of `follow` (when present and non-empty)
/// or of `stars` replaces `manual` entirely. Without it `manual` is returned.
pub fn center_offset(
    stars: &ParticleSet,
    follow: Option<&ParticleSet>,
    use_com: bool,
    manual: [Length; 3],
) -> [Length; 3] {
    if !use_com {
        return manual;
    }
    let reference = match follow {
        Some(subset) if !subset.is_empty() => subset,
        _ => stars,
    };
    match reference.center_of_mass() {
        Some(com) => com,
        None => manual,
    }
}

/// Square field that encloses every star's projected position
///
/// Returns the field width (the larger of the x and y extents) and the x/y
/// center of the bounding box, or `None` when there are no stars.
pub fn max_width_frame(stars: &ParticleSet) -> Option<(Length, [Length; 2])> {
    let (xmin, xmax, ymin, ymax) = stars.bounding_box_xy()?;
    let wx = xmax - xmin;
    let wy = ymax - ymin;
    let width = if wx > wy { wx } else { wy };
    let center = [(xmin + xmax) / 2.0, (ymin + ymax) / 2.0];
    Some((width, center))
}

/// Translate a set so that `offset` becomes the origin
pub fn apply_offset(set: &mut ParticleSet, offset: [Length; 3]) {
    set.translate(offset);
}

/// Whether a coordinate lies strictly inside `±half_extent`
fn strictly_inside(value: Length, half_extent: Length) -> bool {
    value > -half_extent && value < half_extent
}

/// Drop particles outside the square `±margin · width / 2` in x and y
///
/// Bounds are strict, so a particle exactly on the expanded boundary is
/// removed. Returns the number of particles removed.
pub fn crop(set: &mut ParticleSet, width: Length, margin: CropMargin) -> usize {
    let half_extent = width * (margin.0 / 2.0);
    let removed = set.retain_where(|p| {
        strictly_inside(p.x(), half_extent) && strictly_inside(p.y(), half_extent)
    });
    debug!(
        "cropped {} {} outside ±{:.3} pc, {} remain",
        removed,
        set.kind().label(),
        half_extent.as_parsecs(),
        set.len()
    );
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particles::{Particle, ParticleKind};
    use approx::assert_relative_eq;

    fn pc(v: f64) -> Length {
        Length::from_parsecs(v)
    }

    fn stars() -> ParticleSet {
        ParticleSet::from_particles(
            ParticleKind::Stars,
            vec![
                Particle::at_parsecs(1, 2.0, 1.0, 0.0, 1.0),
                Particle::at_parsecs(2, 4.0, 3.0, 1.0, 1.0),
                Particle::at_parsecs(3, 6.0, 2.0, -1.0, 2.0),
            ],
        )
    }

    #[test]
    fn test_manual_offset_without_com() {
        let offset = center_offset(&stars(), None, false, [pc(1.0), pc(2.0), pc(3.0)]);
        assert_relative_eq!(offset[2].as_parsecs(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_com_overrides_manual_offset() {
        let offset = center_offset(&stars(), None, true, [pc(100.0); 3]);
        assert_relative_eq!(offset[0].as_parsecs(), 4.5, epsilon = 1e-12);
        assert_relative_eq!(offset[1].as_parsecs(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_follow_subset_drives_com() {
        let all = stars();
        let follow = ParticleSet::from_particles(
            ParticleKind::Stars,
            vec![Particle::at_parsecs(2, 0.0, 0.0, 0.0, 1.0)],
        )
        .intersecting_subset_in(&all);
        let offset = center_offset(&all, Some(&follow), true, [pc(0.0); 3]);
        assert_relative_eq!(offset[0].as_parsecs(), 4.0, epsilon = 1e-12);
        assert_relative_eq!(offset[1].as_parsecs(), 3.0, epsilon = 1e-12);
        assert_relative_eq!(offset[2].as_parsecs(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_centering_is_idempotent() {
        let mut set = stars();
        let first = center_offset(&set, None, true, [pc(0.0); 3]);
        apply_offset(&mut set, first);
        let second = center_offset(&set, None, true, [pc(0.0); 3]);
        for axis in second {
            assert_relative_eq!(axis.as_parsecs(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_max_width_frame() {
        let (width, center) = max_width_frame(&stars()).unwrap();
        assert_relative_eq!(width.as_parsecs(), 4.0, epsilon = 1e-12);
        assert_relative_eq!(center[0].as_parsecs(), 4.0, epsilon = 1e-12);
        assert_relative_eq!(center[1].as_parsecs(), 2.0, epsilon = 1e-12);
        assert!(max_width_frame(&ParticleSet::new(ParticleKind::Stars)).is_none());
    }

    #[test]
    fn test_star_crop_keeps_nominal_edge() {
        let mut set = ParticleSet::from_particles(
            ParticleKind::Stars,
            vec![
                Particle::at_parsecs(1, 2.5, 0.0, 0.0, 1.0),
                Particle::at_parsecs(2, 0.0, -3.7, 0.0, 1.0),
                Particle::at_parsecs(3, 3.76, 0.0, 0.0, 1.0),
                Particle::at_parsecs(4, 0.0, -3.8, 0.0, 1.0),
            ],
        );
        let removed = crop(&mut set, pc(5.0), CropMargin::STARS);
        assert_eq!(removed, 2);
        let keys: Vec<u64> = set.iter().map(|p| p.key).collect();
        assert_eq!(keys, vec![1, 2]);
    }

    #[test]
    fn test_gas_crop_is_tighter() {
        let mut set = ParticleSet::from_particles(
            ParticleKind::Gas,
            vec![
                Particle::at_parsecs(1, 2.7, 0.0, 0.0, 1.0),
                Particle::at_parsecs(2, 2.8, 0.0, 0.0, 1.0),
            ],
        );
        assert_eq!(crop(&mut set, pc(5.0), CropMargin::GAS), 1);
        assert_eq!(set.as_slice()[0].key, 1);
    }
}
