//! Demo scene shared by the windowed and headless front ends.

use anyhow::{Context, Result};
use glam::{Mat4, Vec2, Vec3};
use log::{debug, info};

use crate::camera::{Camera, PerspectiveCamera, TargetCamera};
use crate::error::GraphicsError;
use crate::gpu::{
    BufferKind, DrawCall, FrameControl, GraphicsContext, RasterState, Renderable, ShaderProgram,
    Topology, UniformValue, Viewport,
};
use crate::input::OrbitInput;
use crate::overlay::{FrustumDebugOverlay, PixelRect};
use crate::shaders::line_program;

/// Frustum line color used by the demo.
pub const DEMO_LINE_COLOR: Vec3 = Vec3::new(1.0, 1.0, 0.0);

/// Field of view range reachable with `DemoApp::adjust_fov`, in degrees.
pub const FOV_RANGE: (f32, f32) = (1.0, 179.0);

const BOX_EDGES: [u16; 24] = [
    0, 1, 1, 3, 3, 2, 2, 0, // bottom
    4, 5, 5, 7, 7, 6, 6, 4, // top
    0, 4, 1, 5, 2, 6, 3, 7,
];

/// Axis-aligned wireframe box.
pub struct WireBox<C: GraphicsContext> {
    program: C::Program,
    vertices: C::Buffer,
    indices: C::Buffer,
    center: Vec3,
    color: Vec3,
}

impl<C: GraphicsContext> WireBox<C> {
    pub fn new(ctx: &mut C, size: Vec3, center: Vec3, color: Vec3) -> Result<Self, GraphicsError> {
        let program = ctx.create_program(&line_program("wire-box"))?;
        let corners = box_corners(size);
        let vertices = ctx.create_buffer(BufferKind::Vertex, bytemuck::cast_slice(&corners))?;
        let indices = ctx.create_buffer(BufferKind::Index, bytemuck::cast_slice(&BOX_EDGES))?;
        Ok(Self {
            program,
            vertices,
            indices,
            center,
            color,
        })
    }
}

impl<C: GraphicsContext> Renderable<C> for WireBox<C> {
    fn render(&mut self, ctx: &mut C, camera: &dyn Camera) -> Result<(), GraphicsError> {
        self.program.set_uniform(
            "model_matrix",
            UniformValue::Mat4(Mat4::from_translation(self.center)),
        )?;
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
                indices: Some(&self.indices),
                count: BOX_EDGES.len() as u32,
                raster: RasterState::OPAQUE,
            },
        )
    }
}

/// Corners of a box centered at the origin; bit 0 picks x, bit 1 z, bit 2 y.
fn box_corners(size: Vec3) -> [f32; 24] {
    let half = size / 2.0;
    let mut corners = [0.0; 24];
    for (index, corner) in corners.chunks_exact_mut(3).enumerate() {
        let sign = |bit: usize| if index & bit == 0 { -1.0 } else { 1.0 };
        corner.copy_from_slice(&[half.x * sign(1), half.y * sign(4), half.z * sign(2)]);
    }
    corners
}

/// Target camera circling the origin.
#[derive(Debug, Clone)]
pub struct DemoScene {
    camera: PerspectiveCamera,
    theta: f32,
    radius: f32,
    height: f32,
    paused: bool,
}

impl DemoScene {
    pub const RADIUS: f32 = 800.0;
    pub const HEIGHT: f32 = 600.0;
    pub const STEP: f32 = 1.0 / 60.0;

    pub fn new(width: f32, height: f32) -> Self {
        Self::with_lens(width, height, 60.0, 500.0, 2000.0)
    }

    pub fn with_lens(width: f32, height: f32, fov: f32, near: f32, far: f32) -> Self {
        let mut camera = PerspectiveCamera::new(width, height, fov, near, far);
        camera.set_position(Vec3::new(0.0, Self::HEIGHT, Self::RADIUS));
        camera.look_at(Vec3::ZERO);
        Self {
            camera,
            theta: 0.0,
            radius: Self::RADIUS,
            height: Self::HEIGHT,
            paused: false,
        }
    }

    /// Moves the camera one step along its orbit unless paused.
    pub fn advance(&mut self) {
        if self.paused {
            return;
        }
        self.theta += Self::STEP;
        self.camera.set_position(Vec3::new(
            self.radius * self.theta.cos(),
            self.height,
            self.radius * self.theta.sin(),
        ));
        self.camera.look_at(Vec3::ZERO);
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        info!("animation {}", if self.paused { "paused" } else { "resumed" });
        self.paused
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        &mut self.camera
    }
}

/// Corner inset showing the target camera's own view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PictureInPicture {
    pub width: f32,
    pub margin: f32,
    pub border: f32,
}

impl Default for PictureInPicture {
    fn default() -> Self {
        Self {
            width: 300.0,
            margin: 20.0,
            border: 1.0,
        }
    }
}

/// Where the inset lands for a given window size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipLayout {
    pub border: PixelRect,
    pub inset: PixelRect,
    pub viewport: Viewport,
}

impl PictureInPicture {
    /// Anchors the inset in the bottom-right corner, keeping the window's
    /// aspect ratio.
    pub fn layout(&self, window: Vec2) -> PipLayout {
        let height = self.width * window.y / window.x;
        let offset = self.margin + self.border;
        let center = Vec2::new(
            window.x - self.width / 2.0 - offset,
            window.y - height / 2.0 - offset,
        );
        let inset = PixelRect::new(center.x, center.y, self.width, height);
        PipLayout {
            border: inset.inflate(self.border),
            inset,
            viewport: Viewport {
                x: window.x - (self.width + offset),
                y: window.y - offset - height,
                width: self.width,
                height,
            },
        }
    }
}

/// The demo: a target camera circling a box, watched by the debug overlay.
pub struct DemoApp<C: GraphicsContext> {
    overlay: FrustumDebugOverlay<C>,
    wire_box: WireBox<C>,
    scene: DemoScene,
    pip: PictureInPicture,
    width: u32,
    height: u32,
    debug_view: bool,
}

impl<C: GraphicsContext + FrameControl> DemoApp<C> {
    pub fn new(ctx: &mut C, width: u32, height: u32) -> Result<Self> {
        Self::with_scene(ctx, DemoScene::new(width as f32, height as f32), width, height)
    }

    pub fn with_scene(ctx: &mut C, scene: DemoScene, width: u32, height: u32) -> Result<Self> {
        let overlay =
            FrustumDebugOverlay::new(ctx, scene.camera(), width, height, DEMO_LINE_COLOR)
                .context("failed to create camera debugger")?;
        let wire_box = WireBox::new(
            ctx,
            Vec3::splat(200.0),
            Vec3::new(0.0, 100.0, 0.0),
            Vec3::ONE,
        )
        .context("failed to create demo box")?;
        Ok(Self {
            overlay,
            wire_box,
            scene,
            pip: PictureInPicture::default(),
            width,
            height,
            debug_view: true,
        })
    }

    /// Advances the animation and draws one frame.
    pub fn frame(&mut self, ctx: &mut C) -> Result<(), GraphicsError> {
        self.scene.advance();
        ctx.set_viewport(None);
        if !self.debug_view {
            return self.wire_box.render(ctx, self.scene.camera());
        }

        let window = Vec2::new(self.width as f32, self.height as f32);
        let layout = self.pip.layout(window);
        self.overlay
            .render(ctx, self.scene.camera(), &mut [&mut self.wire_box])?;

        ctx.clear_depth();
        self.overlay
            .draw_plane(ctx, layout.border, window, Vec3::ONE)?;
        ctx.clear_depth();
        self.overlay
            .draw_plane(ctx, layout.inset, window, Vec3::ZERO)?;

        ctx.set_viewport(Some(layout.viewport));
        ctx.clear_depth();
        self.wire_box.render(ctx, self.scene.camera())
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), GraphicsError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.width = width;
        self.height = height;
        self.scene
            .camera_mut()
            .update_size(width as f32, height as f32);
        self.overlay.resize(self.scene.camera(), width, height)
    }

    pub fn handle_orbit_input(&mut self, input: &OrbitInput) {
        self.overlay.handle_orbit_input(input);
    }

    /// Widens or narrows the target camera's lens and rebuilds the frustum.
    /// Returns the new field of view.
    pub fn adjust_fov(&mut self, delta: f32) -> Result<f32, GraphicsError> {
        let fov = (self.scene.camera().fov() + delta).clamp(FOV_RANGE.0, FOV_RANGE.1);
        self.scene.camera_mut().set_fov(fov);
        self.overlay.update_buffer(self.scene.camera())?;
        debug!("target fov set to {fov}");
        Ok(fov)
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.scene.toggle_pause()
    }

    pub fn toggle_debug_view(&mut self) -> bool {
        self.debug_view = !self.debug_view;
        debug!("debug view {}", if self.debug_view { "on" } else { "off" });
        self.debug_view
    }

    pub fn overlay(&self) -> &FrustumDebugOverlay<C> {
        &self.overlay
    }

    pub fn scene(&self) -> &DemoScene {
        &self.scene
    }
}
