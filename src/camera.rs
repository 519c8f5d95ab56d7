use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec3};

const EPSILON: f32 = 1e-6;

/// Perspective viewing camera. `fov` is the vertical field of view in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl PerspectiveCamera {
    pub fn new(aspect: f32) -> Self {
        Self {
            fov: 75.0,
            aspect: aspect.max(EPSILON),
            near: 0.1,
            far: 1000.0,
            position: Vec3::new(0.0, 2.0, 5.0),
            target: Vec3::ZERO,
        }
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

/// Orbit camera rig around the camera target with damped motion.
///
/// Input only accumulates deltas; [`OrbitControls::update`] applies a
/// `damping` fraction of the rotation every frame so the camera keeps gliding
/// after the pointer stops. Dolly is applied in full on the next update.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    pub damping: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar: f32,
    pub max_polar: f32,
    /// Dolly factor applied per wheel notch.
    pub zoom_step: f32,
    theta_delta: f32,
    phi_delta: f32,
    scale: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            damping: 0.25,
            min_distance: 1.0,
            max_distance: 1000.0,
            min_polar: 0.0,
            max_polar: FRAC_PI_2,
            zoom_step: 0.95,
            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
        }
    }
}

impl OrbitControls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rotates around the vertical axis; positive angles move the camera left.
    pub fn rotate_left(&mut self, angle: f32) {
        self.theta_delta -= angle;
    }

    /// Tilts the camera; positive angles move it up towards the pole.
    pub fn rotate_up(&mut self, angle: f32) {
        self.phi_delta -= angle;
    }

    /// Moves the camera closer for positive notches, farther for negative.
    pub fn dolly(&mut self, notches: f32) {
        if notches.is_finite() {
            self.scale *= self.zoom_step.powf(notches);
        }
    }

    /// Whether any delta is still being applied.
    pub fn is_moving(&self) -> bool {
        self.theta_delta.abs() > EPSILON
            || self.phi_delta.abs() > EPSILON
            || (self.scale - 1.0).abs() > EPSILON
    }

    /// Moves `camera` by one damped step. Returns true when it moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let offset = camera.position - camera.target;
        let mut radius = offset.length();
        if radius < EPSILON {
            return false;
        }
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        theta += self.theta_delta * self.damping;
        phi += self.phi_delta * self.damping;
        phi = phi
            .clamp(self.min_polar, self.max_polar)
            .clamp(EPSILON, std::f32::consts::PI - EPSILON);

        radius *= self.scale;
        radius = radius.clamp(self.min_distance, self.max_distance);

        let sin_phi = phi.sin();
        let next = camera.target
            + Vec3::new(
                radius * sin_phi * theta.sin(),
                radius * phi.cos(),
                radius * sin_phi * theta.cos(),
            );

        let keep = 1.0 - self.damping;
        self.theta_delta *= keep;
        self.phi_delta *= keep;
        self.scale = 1.0;
        if !self.is_moving() {
            self.theta_delta = 0.0;
            self.phi_delta = 0.0;
        }

        let moved = next.distance_squared(camera.position) > EPSILON * EPSILON;
        camera.position = next;
        moved
    }
}
