use glam::{Mat4, Vec3};
use log::debug;

use crate::camera::Camera;
use crate::config::GridConfig;
use crate::error::GraphicsError;
use crate::gpu::{
    BufferKind, DrawCall, GraphicsContext, RasterState, Renderable, ShaderProgram, Topology,
    UniformValue,
};
use crate::shaders::line_program;

/// Line segments of a `width × height` grid on the XZ plane, centered at the
/// origin, as `x, y, z` triples (two points per segment).
pub fn grid_lines(width: f32, height: f32, width_segments: u32, height_segments: u32) -> Vec<f32> {
    let width_segments = width_segments.max(1);
    let height_segments = height_segments.max(1);
    let (half_w, half_h) = (width / 2.0, height / 2.0);
    let mut positions =
        Vec::with_capacity(((width_segments + 1 + height_segments + 1) * 6) as usize);

    for column in 0..=width_segments {
        let x = -half_w + width * column as f32 / width_segments as f32;
        positions.extend_from_slice(&[x, 0.0, -half_h, x, 0.0, half_h]);
    }
    for row in 0..=height_segments {
        let z = -half_h + height * row as f32 / height_segments as f32;
        positions.extend_from_slice(&[-half_w, 0.0, z, half_w, 0.0, z]);
    }
    positions
}

/// Reference grid drawn under the debug view.
pub struct GridHelper<C: GraphicsContext> {
    program: C::Program,
    vertices: C::Buffer,
    vertex_count: u32,
    width: f32,
    height: f32,
    color: Vec3,
}

impl<C: GraphicsContext> GridHelper<C> {
    pub fn new(ctx: &mut C, config: &GridConfig) -> Result<Self, GraphicsError> {
        let program = ctx.create_program(&line_program("grid"))?;
        let positions = grid_lines(
            config.width,
            config.height,
            config.width_segments,
            config.height_segments,
        );
        let vertices = ctx.create_buffer(BufferKind::Vertex, bytemuck::cast_slice(&positions))?;
        let vertex_count = (positions.len() / 3) as u32;
        debug!(
            "grid helper {}x{} with {vertex_count} vertices",
            config.width, config.height
        );
        Ok(Self {
            program,
            vertices,
            vertex_count,
            width: config.width,
            height: config.height,
            color: config.color,
        })
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }
}

impl<C: GraphicsContext> Renderable<C> for GridHelper<C> {
    fn render(&mut self, ctx: &mut C, camera: &dyn Camera) -> Result<(), GraphicsError> {
        self.program
            .set_uniform("model_matrix", UniformValue::Mat4(Mat4::IDENTITY))?;
        self.program
            .set_uniform("view_matrix", UniformValue::Mat4(camera.view_matrix()))?;
        self.program.set_uniform(
            "projection_matrix",
            UniformValue::Mat4(camera.projection_matrix()),
        )?;
        self.program
            .set_uniform("color", UniformValue::Vec3(self.color))?;
        ctx.draw(
            &self.program,
            DrawCall {
                topology: Topology::Lines,
                vertices: &self.vertices,
                indices: None,
                count: self.vertex_count,
                raster: RasterState::OPAQUE,
            },
        )
    }
}
