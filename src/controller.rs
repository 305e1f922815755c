use std::f32::consts::PI;

use glam::{Vec2, Vec3};

use crate::camera::{Camera, PerspectiveCamera};
use crate::config::OrbitConfig;
use crate::input::OrbitInput;

const POLAR_EPSILON: f32 = 1e-3;

/// Where an orbiting camera sits and what it looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitPose {
    pub position: Vec3,
    pub target: Vec3,
}

/// Rotates and zooms a camera around a fixed target.
///
/// The pose is kept in spherical coordinates around `target`: `azimuth` is
/// measured in the XZ plane from +Z towards +X, `polar` from +Y.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitController {
    target: Vec3,
    distance: f32,
    azimuth: f32,
    polar: f32,
    min_distance: f32,
    max_distance: f32,
    rotate_speed: f32,
    zoom_speed: f32,
}

impl OrbitController {
    /// Creates a controller that keeps `camera`'s current position.
    pub fn new(camera: &dyn Camera, target: Vec3, config: &OrbitConfig) -> Self {
        let mut controller = Self {
            target,
            distance: 0.0,
            azimuth: 0.0,
            polar: PI / 2.0,
            min_distance: config.min_distance,
            max_distance: config.max_distance.max(config.min_distance),
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
        };
        controller.sync_from(camera.position());
        controller
    }

    fn sync_from(&mut self, position: Vec3) {
        let offset = position - self.target;
        let distance = offset.length();
        if distance > f32::EPSILON {
            self.azimuth = offset.x.atan2(offset.z);
            self.polar = (offset.y / distance).clamp(-1.0, 1.0).acos();
        }
        self.polar = self.polar.clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        self.distance = distance.clamp(self.min_distance, self.max_distance);
    }

    /// Applies a frame's worth of drag and wheel input.
    pub fn apply(&mut self, input: &OrbitInput) {
        self.rotate(input.drag);
        self.zoom(input.wheel);
    }

    pub fn rotate(&mut self, drag: Vec2) {
        self.azimuth -= drag.x * self.rotate_speed;
        self.polar =
            (self.polar - drag.y * self.rotate_speed).clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
    }

    /// Positive steps move the camera closer.
    pub fn zoom(&mut self, steps: f32) {
        if steps == 0.0 {
            return;
        }
        let factor = (1.0 + self.zoom_speed).powf(-steps);
        self.distance = (self.distance * factor).clamp(self.min_distance, self.max_distance);
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn distance_range(&self) -> (f32, f32) {
        (self.min_distance, self.max_distance)
    }

    pub fn pose(&self) -> OrbitPose {
        let offset = Vec3::new(
            self.polar.sin() * self.azimuth.sin(),
            self.polar.cos(),
            self.polar.sin() * self.azimuth.cos(),
        ) * self.distance;
        OrbitPose {
            position: self.target + offset,
            target: self.target,
        }
    }

    /// Moves `camera` to the current pose.
    pub fn update_camera(&self, camera: &mut PerspectiveCamera) {
        let pose = self.pose();
        camera.set_position(pose.position);
        camera.look_at(pose.target);
    }
}
