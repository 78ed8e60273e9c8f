use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec3};

const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;
const DISTANCE_RANGE: (f32, f32) = (0.5, 100.0);

/// Orbit camera looking at a fixed target.
#[derive(Debug, Clone)]
pub struct Camera {
    target: Vec3,
    distance: f32,
    yaw: f32,
    pitch: f32,
    fovy: f32,
    aspect: f32,
    near: f32,
    far: f32,
    view: Mat4,
    projection: Mat4,
}

impl Camera {
    pub fn new(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let distance = offset.length().max(DISTANCE_RANGE.0);
        let mut camera = Self {
            target,
            distance,
            yaw: offset.x.atan2(offset.z),
            pitch: (offset.y / distance).clamp(-1.0, 1.0).asin(),
            fovy: 45f32.to_radians(),
            aspect: 1.0,
            near: 0.1,
            far: 1000.0,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        };
        camera.update();
        camera.update_projection_matrix();
        camera
    }

    pub fn eye(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target + self.distance * Vec3::new(cp * sy, sp, cp * cy)
    }

    /// Rotates around the target by the given angles in radians.
    pub fn orbit(&mut self, yaw: f32, pitch: f32) {
        self.yaw += yaw;
        self.pitch = (self.pitch + pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Scales the distance to the target.
    pub fn zoom(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.distance = (self.distance * factor).clamp(DISTANCE_RANGE.0, DISTANCE_RANGE.1);
        }
    }

    pub fn update(&mut self) {
        self.view = Mat4::look_at_rh(self.eye(), self.target, Vec3::Y);
    }

    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection = Mat4::perspective_rh_gl(self.fovy, self.aspect, self.near, self.far);
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection * self.view
    }
}
