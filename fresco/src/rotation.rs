//! Rigid rotation of particle sets about the origin.
//!
//! Rotations are composed as `Rz(ψ) · Ry(θ) · Rx(φ)`: a position is turned
//! about the x-axis first, then y, then z. Rotation is applied after
//! centering, so the origin is the chosen frame center.

use nalgebra::{Matrix3, Vector3};
use shared::units::{Angle, AngleExt, Length, LengthExt};

use crate::particles::ParticleSet;

fn rotation_x(phi: f64) -> Matrix3<f64> {
    let (s, c) = phi.sin_cos();
    Matrix3::new(1.0, 0.0, 0.0, 0.0, c, -s, 0.0, s, c)
}

fn rotation_y(theta: f64) -> Matrix3<f64> {
    let (s, c) = theta.sin_cos();
    Matrix3::new(c, 0.0, s, 0.0, 1.0, 0.0, -s, 0.0, c)
}

fn rotation_z(psi: f64) -> Matrix3<f64> {
    let (s, c) = psi.sin_cos();
    Matrix3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0)
}

/// Combined rotation matrix for per-axis angles applied x, then y, then z
pub fn rotation_matrix(ax: Angle, ay: Angle, az: Angle) -> Matrix3<f64> {
    rotation_z(az.as_radians()) * rotation_y(ay.as_radians()) * rotation_x(ax.as_radians())
}

/// Rotate every particle position about the origin
pub fn rotate(set: &mut ParticleSet, ax: Angle, ay: Angle, az: Angle) {
    let matrix = rotation_matrix(ax, ay, az);
    for p in set.iter_mut() {
        let v = Vector3::new(
            p.position[0].as_parsecs(),
            p.position[1].as_parsecs(),
            p.position[2].as_parsecs(),
        );
        let r = matrix * v;
        p.position = [
            Length::from_parsecs(r.x),
            Length::from_parsecs(r.y),
            Length::from_parsecs(r.z),
        ];
    }
}

/// Drives the per-frame rotation of a multi-frame sweep
///
/// Before the first frame the scene is turned by `(frames - 1)` steps in one
/// combined rotation, then each rendered frame applies one further step.
/// Frames are numbered from `frames` upwards, which keeps the step for every
/// frame of a sweep and for the single frame of a still.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationStepper {
    step: [Angle; 3],
    frames: usize,
}

impl RotationStepper {
    pub fn new(step: [Angle; 3], frames: usize) -> Self {
        Self { step, frames }
    }

    pub fn step(&self) -> [Angle; 3] {
        self.step
    }

    /// Frame number for the `index`-th rendered frame (0-based)
    pub fn frame_number(&self, index: usize) -> usize {
        index + self.frames
    }

    /// Apply the one-off pre-rotation by `(frames - 1)` steps
    pub fn prepare(&self, set: &mut ParticleSet) {
        if self.frames > 1 {
            let n = (self.frames - 1) as f64;
            rotate(set, self.step[0] * n, self.step[1] * n, self.step[2] * n);
        }
    }

    /// Whether frame number `frame` receives an incremental step
    pub fn rotates_on(&self, frame: usize) -> bool {
        frame != 0 || self.frames == 1
    }

    /// Apply the incremental step for frame number `frame`, if it gets one
    pub fn step_for_frame(&self, set: &mut ParticleSet, frame: usize) -> bool {
        if self.rotates_on(frame) {
            rotate(set, self.step[0], self.step[1], self.step[2]);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particles::{Particle, ParticleKind};
    use approx::assert_relative_eq;

    fn deg(v: f64) -> Angle {
        Angle::from_degrees(v)
    }

    fn single(x: f64, y: f64, z: f64) -> ParticleSet {
        ParticleSet::from_particles(ParticleKind::Stars, vec![Particle::at_parsecs(1, x, y, z, 1.0)])
    }

    fn position(set: &ParticleSet) -> [f64; 3] {
        set.as_slice()[0].position.map(|l| l.as_parsecs())
    }

    #[test]
    fn test_quarter_turn_about_z() {
        let mut set = single(1.0, 0.0, 0.0);
        rotate(&mut set, deg(0.0), deg(0.0), deg(90.0));
        let [x, y, z] = position(&set);
        assert_relative_eq!(x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_axis_order_is_x_then_y_then_z() {
        // x first: (0,1,0) -> (0,0,1); then y by 90: (0,0,1) -> (1,0,0)
        let mut set = single(0.0, 1.0, 0.0);
        rotate(&mut set, deg(90.0), deg(90.0), deg(0.0));
        let [x, y, z] = position(&set);
        assert_relative_eq!(x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_preserves_distance() {
        let mut set = single(1.0, 2.0, 3.0);
        rotate(&mut set, deg(12.0), deg(-40.0), deg(77.0));
        let [x, y, z] = position(&set);
        assert_relative_eq!((x * x + y * y + z * z).sqrt(), 14.0f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_first_frame_matches_direct_rotation() {
        let frames = 6;
        let step = [deg(0.0), deg(10.0), deg(0.0)];
        let stepper = RotationStepper::new(step, frames);

        let mut swept = single(1.0, 0.5, -2.0);
        stepper.prepare(&mut swept);
        assert!(stepper.step_for_frame(&mut swept, stepper.frame_number(0)));

        let mut direct = single(1.0, 0.5, -2.0);
        rotate(&mut direct, deg(0.0), deg(10.0 * frames as f64), deg(0.0));

        for (a, b) in position(&swept).iter().zip(position(&direct).iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_every_frame_of_a_sweep_steps() {
        let stepper = RotationStepper::new([deg(1.0), deg(0.0), deg(0.0)], 4);
        for index in 0..4 {
            assert!(stepper.rotates_on(stepper.frame_number(index)));
        }
    }

    #[test]
    fn test_single_frame_gets_exactly_one_step() {
        let stepper = RotationStepper::new([deg(0.0), deg(0.0), deg(30.0)], 1);
        let mut set = single(1.0, 0.0, 0.0);
        stepper.prepare(&mut set);
        assert_relative_eq!(position(&set)[0], 1.0, epsilon = 1e-12);
        assert!(stepper.step_for_frame(&mut set, stepper.frame_number(0)));
        let [x, y, _] = position(&set);
        assert_relative_eq!(x, 30f64.to_radians().cos(), epsilon = 1e-12);
        assert_relative_eq!(y, 30f64.to_radians().sin(), epsilon = 1e-12);
    }

    #[test]
    fn test_frame_zero_of_a_sweep_would_not_step() {
        let stepper = RotationStepper::new([deg(5.0); 3], 3);
        assert!(!stepper.rotates_on(0));
    }
}
