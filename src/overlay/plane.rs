use glam::Vec2;

/// Two triangles covering the unit quad, as `x, y` pairs.
pub const PLANE_VERTICES: [f32; 12] = [
    -1.0, -1.0, 1.0, -1.0, -1.0, 1.0, //
    -1.0, 1.0, 1.0, -1.0, 1.0, 1.0,
];

pub const PLANE_VERTEX_COUNT: u32 = 6;

/// Rectangle in window pixels, anchored at its center, y growing downwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PixelRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Same center, grown by `margin` pixels on every side.
    pub fn inflate(&self, margin: f32) -> Self {
        Self {
            width: self.width + margin * 2.0,
            height: self.height + margin * 2.0,
            ..*self
        }
    }
}

/// Rectangle in clip space, y growing upwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRect {
    pub center: Vec2,
    pub half_size: Vec2,
}

impl ClipRect {
    pub fn from_pixels(rect: PixelRect, window: Vec2) -> Self {
        Self {
            center: Vec2::new(
                rect.x / window.x * 2.0 - 1.0,
                1.0 - rect.y / window.y * 2.0,
            ),
            half_size: Vec2::new(rect.width / window.x, rect.height / window.y),
        }
    }

    pub fn min(&self) -> Vec2 {
        self.center - self.half_size
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.half_size
    }
}
