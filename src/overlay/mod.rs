//! Debug view of a camera: its frustum, a reference grid with axes, and the
//! scene rendered from an orbiting viewpoint.

mod plane;

pub use plane::{ClipRect, PixelRect, PLANE_VERTEX_COUNT, PLANE_VERTICES};

use glam::{Mat4, Vec2, Vec3};
use log::{debug, warn};

use crate::camera::{Camera, PerspectiveCamera, TargetCamera};
use crate::config::{FrustumAspect, OverlayConfig};
use crate::controller::OrbitController;
use crate::error::GraphicsError;
use crate::frustum::{frustum_transform, FrustumMesh, FrustumParams, FRUSTUM_INDEX_COUNT};
use crate::gpu::{
    BufferKind, DrawCall, GpuBuffer, GraphicsContext, RasterState, Renderable, ShaderProgram,
    Topology, UniformValue,
};
use crate::grid::GridHelper;
use crate::input::OrbitInput;
use crate::shaders::{AXIS_PROGRAM, FRUSTUM_PROGRAM, PLANE_PROGRAM};

/// Principal axes; each doubles as its line color.
pub const AXIS_DIRECTIONS: [Vec3; 3] = [Vec3::X, Vec3::Y, Vec3::Z];

const AXIS_RATES: [f32; 2] = [0.0, 1.0];

pub struct FrustumDebugOverlay<C: GraphicsContext> {
    config: OverlayConfig,
    width: u32,
    height: u32,
    frustum_program: C::Program,
    frustum_vertices: C::Buffer,
    frustum_indices: C::Buffer,
    frustum_mesh: FrustumMesh,
    frustum_transform: Mat4,
    axis_program: C::Program,
    axis_rates: C::Buffer,
    plane_program: C::Program,
    plane_vertices: C::Buffer,
    debug_camera: PerspectiveCamera,
    orbit: OrbitController,
    grid: GridHelper<C>,
}

impl<C: GraphicsContext> FrustumDebugOverlay<C> {
    /// Builds the overlay with default settings and the given line color.
    pub fn new(
        ctx: &mut C,
        target: &dyn TargetCamera,
        width: u32,
        height: u32,
        color: Vec3,
    ) -> Result<Self, GraphicsError> {
        Self::with_config(
            ctx,
            target,
            width,
            height,
            OverlayConfig::default().with_line_color(color),
        )
    }

    /// Compiles every program and allocates every buffer up front.
    pub fn with_config(
        ctx: &mut C,
        target: &dyn TargetCamera,
        width: u32,
        height: u32,
        config: OverlayConfig,
    ) -> Result<Self, GraphicsError> {
        let frustum_program = ctx.create_program(&FRUSTUM_PROGRAM)?;
        let frustum_mesh = FrustumMesh::new(&frustum_params(
            target,
            config.frustum_aspect,
            width,
            height,
        ));
        let frustum_vertices = ctx.create_buffer(
            BufferKind::Vertex,
            bytemuck::cast_slice(&frustum_mesh.positions()),
        )?;
        let frustum_indices =
            ctx.create_buffer(BufferKind::Index, bytemuck::cast_slice(&frustum_mesh.indices))?;

        let axis_program = ctx.create_program(&AXIS_PROGRAM)?;
        let axis_rates = ctx.create_buffer(BufferKind::Vertex, bytemuck::cast_slice(&AXIS_RATES))?;

        let plane_program = ctx.create_program(&PLANE_PROGRAM)?;
        let plane_vertices =
            ctx.create_buffer(BufferKind::Vertex, bytemuck::cast_slice(&PLANE_VERTICES))?;

        let camera_config = &config.debug_camera;
        let mut debug_camera = PerspectiveCamera::new(
            width as f32,
            height as f32,
            camera_config.fov,
            camera_config.near,
            camera_config.far,
        );
        debug_camera.set_position(camera_config.position);
        debug_camera.look_at(camera_config.look_at);
        let orbit = OrbitController::new(&debug_camera, camera_config.look_at, &config.orbit);
        orbit.update_camera(&mut debug_camera);

        let grid = GridHelper::new(ctx, &config.grid)?;

        debug!(
            "camera debugger ready: {width}x{height}, frustum near={} far={} fov={}",
            target.near(),
            target.far(),
            target.fov()
        );

        Ok(Self {
            config,
            width,
            height,
            frustum_program,
            frustum_vertices,
            frustum_indices,
            frustum_mesh,
            frustum_transform: Mat4::IDENTITY,
            axis_program,
            axis_rates,
            plane_program,
            plane_vertices,
            debug_camera,
            orbit,
            grid,
        })
    }

    /// Draws one debug frame: frustum, grid, axes, then every scene object
    /// from the debug camera, in order. The first failure aborts the frame.
    pub fn render(
        &mut self,
        ctx: &mut C,
        target: &dyn Camera,
        objects: &mut [&mut dyn Renderable<C>],
    ) -> Result<(), GraphicsError> {
        self.update_transform(target);
        let view = self.debug_camera.view_matrix();
        let projection = self.debug_camera.projection_matrix();
        self.write_frustum_uniforms(view, projection)?;
        self.draw(ctx)?;
        self.grid.render(ctx, &self.debug_camera)?;

        let half = Vec2::new(self.grid.width(), self.grid.height()) / 2.0;
        self.update_axis(view, projection)?;
        self.draw_axis(ctx, -half.x, -half.y)?;
        self.draw_axis(ctx, half.x, half.y)?;

        for object in objects.iter_mut() {
            object.render(ctx, &self.debug_camera)?;
        }
        Ok(())
    }

    /// Points the frustum program at `camera`'s view.
    pub fn update(&mut self, camera: &dyn Camera) -> Result<(), GraphicsError> {
        self.write_frustum_uniforms(camera.view_matrix(), camera.projection_matrix())
    }

    /// Issues the frustum wireframe draw with the current uniforms.
    pub fn draw(&self, ctx: &mut C) -> Result<(), GraphicsError> {
        ctx.draw(
            &self.frustum_program,
            DrawCall {
                topology: Topology::Lines,
                vertices: &self.frustum_vertices,
                indices: Some(&self.frustum_indices),
                count: FRUSTUM_INDEX_COUNT as u32,
                raster: RasterState::OPAQUE,
            },
        )
    }

    /// Fills a window-space rectangle with a flat color.
    pub fn draw_plane(
        &mut self,
        ctx: &mut C,
        rect: PixelRect,
        window: Vec2,
        color: Vec3,
    ) -> Result<(), GraphicsError> {
        let clip = ClipRect::from_pixels(rect, window);
        let program = &mut self.plane_program;
        program.set_uniform("center", UniformValue::Vec2(clip.center))?;
        program.set_uniform("half_size", UniformValue::Vec2(clip.half_size))?;
        program.set_uniform("color", UniformValue::Vec3(color))?;
        ctx.draw(
            &self.plane_program,
            DrawCall {
                topology: Topology::Triangles,
                vertices: &self.plane_vertices,
                indices: None,
                count: PLANE_VERTEX_COUNT,
                raster: RasterState::OPAQUE,
            },
        )
    }

    /// Resizes the debug camera and rebuilds the frustum vertices. A zero
    /// width or height is logged and ignored, leaving the overlay as it was.
    pub fn resize(
        &mut self,
        target: &dyn TargetCamera,
        width: u32,
        height: u32,
    ) -> Result<(), GraphicsError> {
        if width == 0 || height == 0 {
            warn!("ignoring resize to {width}x{height}");
            return Ok(());
        }
        self.width = width;
        self.height = height;
        self.debug_camera.update_size(width as f32, height as f32);
        debug!("camera debugger resized to {width}x{height}");
        self.update_buffer(target)
    }

    /// Recomputes the frustum from `target`'s lens and re-uploads the vertex
    /// buffer in place. The index buffer is left untouched.
    pub fn update_buffer(&mut self, target: &dyn TargetCamera) -> Result<(), GraphicsError> {
        let params = frustum_params(target, self.config.frustum_aspect, self.width, self.height);
        self.frustum_mesh = FrustumMesh::new(&params);
        self.frustum_vertices
            .upload(bytemuck::cast_slice(&self.frustum_mesh.positions()))
    }

    /// Feeds pointer input to the debug camera's orbit.
    pub fn handle_orbit_input(&mut self, input: &OrbitInput) {
        if input.is_idle() {
            return;
        }
        self.orbit.apply(input);
        self.orbit.update_camera(&mut self.debug_camera);
    }

    pub fn debug_camera(&self) -> &PerspectiveCamera {
        &self.debug_camera
    }

    pub fn orbit(&self) -> &OrbitController {
        &self.orbit
    }

    pub fn frustum_transform(&self) -> Mat4 {
        self.frustum_transform
    }

    pub fn frustum_mesh(&self) -> &FrustumMesh {
        &self.frustum_mesh
    }

    /// Vertex and index buffers holding the frustum wireframe.
    pub fn frustum_buffers(&self) -> (&C::Buffer, &C::Buffer) {
        (&self.frustum_vertices, &self.frustum_indices)
    }

    /// Quad shared by every `draw_plane` call.
    pub fn plane_buffer(&self) -> &C::Buffer {
        &self.plane_vertices
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn update_transform(&mut self, target: &dyn Camera) {
        self.frustum_transform = frustum_transform(target.rotation(), target.position());
    }

    fn write_frustum_uniforms(
        &mut self,
        view: Mat4,
        projection: Mat4,
    ) -> Result<(), GraphicsError> {
        let program = &mut self.frustum_program;
        program.set_uniform("model_matrix", UniformValue::Mat4(self.frustum_transform))?;
        program.set_uniform("view_matrix", UniformValue::Mat4(view))?;
        program.set_uniform("projection_matrix", UniformValue::Mat4(projection))?;
        program.set_uniform("color", UniformValue::Vec3(self.config.line_color))
    }

    fn update_axis(&mut self, view: Mat4, projection: Mat4) -> Result<(), GraphicsError> {
        let program = &mut self.axis_program;
        program.set_uniform("model_matrix", UniformValue::Mat4(Mat4::IDENTITY))?;
        program.set_uniform("view_matrix", UniformValue::Mat4(view))?;
        program.set_uniform("projection_matrix", UniformValue::Mat4(projection))?;
        program.set_uniform("length", UniformValue::Float(self.config.axis_length))
    }

    fn draw_axis(&mut self, ctx: &mut C, x: f32, z: f32) -> Result<(), GraphicsError> {
        let start = Vec3::new(x, self.config.axis_height, z);
        self.axis_program
            .set_uniform("start_position", UniformValue::Vec3(start))?;
        for direction in AXIS_DIRECTIONS {
            self.axis_program
                .set_uniform("dir", UniformValue::Vec3(direction))?;
            self.axis_program
                .set_uniform("color", UniformValue::Vec3(direction))?;
            ctx.draw(
                &self.axis_program,
                DrawCall {
                    topology: Topology::Lines,
                    vertices: &self.axis_rates,
                    indices: None,
                    count: AXIS_RATES.len() as u32,
                    raster: RasterState::OPAQUE,
                },
            )?;
        }
        Ok(())
    }
}

fn frustum_params(
    target: &dyn TargetCamera,
    aspect: FrustumAspect,
    width: u32,
    height: u32,
) -> FrustumParams {
    let mut params = target.frustum_params();
    if aspect == FrustumAspect::Viewport && height > 0 {
        params.aspect = width as f32 / height as f32;
    }
    params
}
