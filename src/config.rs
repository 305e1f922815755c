use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Tunables for [`FrustumDebugOverlay`](crate::overlay::FrustumDebugOverlay).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Color of the frustum wireframe.
    pub line_color: Vec3,
    /// Length of each axis segment in world units.
    pub axis_length: f32,
    /// Height above the grid at which axes are anchored.
    pub axis_height: f32,
    pub grid: GridConfig,
    pub debug_camera: DebugCameraConfig,
    pub orbit: OrbitConfig,
    pub frustum_aspect: FrustumAspect,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            line_color: Vec3::ONE,
            axis_length: 150.0,
            axis_height: 2.0,
            grid: GridConfig::default(),
            debug_camera: DebugCameraConfig::default(),
            orbit: OrbitConfig::default(),
            frustum_aspect: FrustumAspect::default(),
        }
    }
}

impl OverlayConfig {
    pub fn with_line_color(mut self, color: Vec3) -> Self {
        self.line_color = color;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: f32,
    pub height: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    pub color: Vec3,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 2000.0,
            height: 2000.0,
            width_segments: 20,
            height_segments: 20,
            color: Vec3::splat(0.5),
        }
    }
}

/// Initial lens and pose of the camera the debug view is rendered from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugCameraConfig {
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub look_at: Vec3,
}

impl Default for DebugCameraConfig {
    fn default() -> Self {
        Self {
            fov: 60.0,
            near: 1.0,
            far: 100_000.0,
            position: Vec3::new(0.0, 2000.0, -5000.0),
            look_at: Vec3::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    pub min_distance: f32,
    pub max_distance: f32,
    /// Radians of rotation per dragged pixel.
    pub rotate_speed: f32,
    /// Relative distance change per wheel step.
    pub zoom_speed: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            min_distance: 300.0,
            max_distance: 10_000.0,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
        }
    }
}

/// Which aspect ratio shapes the frustum geometry on resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrustumAspect {
    /// The target camera's own width and height.
    #[default]
    TargetCamera,
    /// The overlay's size from the most recent resize.
    Viewport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_debugger_constants() {
        let config = OverlayConfig::default();
        assert_eq!(config.line_color, Vec3::ONE);
        assert_eq!(config.axis_length, 150.0);
        assert_eq!(config.orbit.min_distance, 300.0);
        assert_eq!(config.orbit.max_distance, 10_000.0);
        assert_eq!(config.debug_camera.position, Vec3::new(0.0, 2000.0, -5000.0));
        assert_eq!(config.frustum_aspect, FrustumAspect::TargetCamera);
    }

    #[test]
    fn builder_overrides_line_color() {
        let config = OverlayConfig::default().with_line_color(Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(config.line_color, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(config.grid, GridConfig::default());
    }
}
