//! Camera debugging overlay for real-time 3D renderers.
//!
//! [`FrustumDebugOverlay`] draws a target camera's view frustum, a reference
//! grid with axes, and the scene itself from an orbiting debug camera. All
//! drawing goes through the small [`gpu`] interfaces so the overlay runs on
//! the wgpu backend in [`render`] as well as on the in-memory
//! [`RecordingContext`] used by headless tools and tests.

pub mod app;
pub mod camera;
pub mod config;
pub mod controller;
pub mod error;
pub mod frustum;
pub mod gpu;
pub mod grid;
pub mod input;
pub mod overlay;
#[cfg(not(target_arch = "wasm32"))]
pub mod render;
pub mod shaders;

pub use app::{DemoApp, DemoScene, PictureInPicture, PipLayout, WireBox};
pub use camera::{Camera, PerspectiveCamera, TargetCamera};
pub use config::{DebugCameraConfig, FrustumAspect, GridConfig, OrbitConfig, OverlayConfig};
pub use controller::{OrbitController, OrbitPose};
pub use error::GraphicsError;
pub use frustum::{
    frustum_edges, frustum_transform, frustum_vertices, FrustumMesh, FrustumParams,
    FRUSTUM_EDGE_COUNT, FRUSTUM_INDEX_COUNT, FRUSTUM_VERTEX_COUNT,
};
pub use gpu::recording::{DrawRecord, FrameEvent, RecordingContext};
pub use gpu::{
    BufferKind, DrawCall, FrameControl, GpuBuffer, GraphicsContext, ProgramSource, RasterState,
    Renderable, ShaderProgram, Topology, UniformValue, Viewport,
};
pub use grid::GridHelper;
pub use input::{MouseButton, OrbitInput, PointerState};
pub use overlay::{ClipRect, FrustumDebugOverlay, PixelRect};
#[cfg(not(target_arch = "wasm32"))]
pub use render::{Renderer, WgpuContext};
