use crate::gpu::{ProgramSource, UniformKind, UniformSlot, VertexAttribute};

const LINE_UNIFORMS: &[UniformSlot] = &[
    UniformSlot::new("model_matrix", UniformKind::Mat4),
    UniformSlot::new("view_matrix", UniformKind::Mat4),
    UniformSlot::new("projection_matrix", UniformKind::Mat4),
    UniformSlot::new("color", UniformKind::Vec3),
];

const LINE_SHADER: &str = r#"
struct Uniforms {
    model_matrix: mat4x4<f32>,
    view_matrix: mat4x4<f32>,
    projection_matrix: mat4x4<f32>,
    color: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> u: Uniforms;

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return u.projection_matrix * u.view_matrix * u.model_matrix * vec4<f32>(position, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(u.color.rgb, 1.0);
}
"#;

/// Solid-color lines in world space, shared by the frustum, the grid and
/// wireframe scene objects.
pub const fn line_program(label: &'static str) -> ProgramSource {
    ProgramSource {
        label,
        wgsl: LINE_SHADER,
        attribute: VertexAttribute::new("position", 3),
        uniforms: LINE_UNIFORMS,
    }
}

pub const FRUSTUM_PROGRAM: ProgramSource = line_program("frustum");

const AXIS_SHADER: &str = r#"
struct Uniforms {
    model_matrix: mat4x4<f32>,
    view_matrix: mat4x4<f32>,
    projection_matrix: mat4x4<f32>,
    length: vec4<f32>,
    start_position: vec4<f32>,
    dir: vec4<f32>,
    color: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> u: Uniforms;

@vertex
fn vs_main(@location(0) rate: f32) -> @builtin(position) vec4<f32> {
    let position = u.start_position.xyz + u.dir.xyz * rate * u.length.x;
    return u.projection_matrix * u.view_matrix * u.model_matrix * vec4<f32>(position, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(u.color.rgb, 1.0);
}
"#;

/// Unit segment stretched along `dir` from `start_position`.
pub const AXIS_PROGRAM: ProgramSource = ProgramSource {
    label: "axis",
    wgsl: AXIS_SHADER,
    attribute: VertexAttribute::new("rate", 1),
    uniforms: &[
        UniformSlot::new("model_matrix", UniformKind::Mat4),
        UniformSlot::new("view_matrix", UniformKind::Mat4),
        UniformSlot::new("projection_matrix", UniformKind::Mat4),
        UniformSlot::new("length", UniformKind::Float),
        UniformSlot::new("start_position", UniformKind::Vec3),
        UniformSlot::new("dir", UniformKind::Vec3),
        UniformSlot::new("color", UniformKind::Vec3),
    ],
};

const PLANE_SHADER: &str = r#"
struct Uniforms {
    center: vec4<f32>,
    half_size: vec4<f32>,
    color: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> u: Uniforms;

@vertex
fn vs_main(@location(0) position: vec2<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(u.center.xy + position * u.half_size.xy, 0.0, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(u.color.rgb, 1.0);
}
"#;

/// Clip-space quad placed by center and half size.
pub const PLANE_PROGRAM: ProgramSource = ProgramSource {
    label: "plane",
    wgsl: PLANE_SHADER,
    attribute: VertexAttribute::new("position", 2),
    uniforms: &[
        UniformSlot::new("center", UniformKind::Vec2),
        UniformSlot::new("half_size", UniformKind::Vec2),
        UniformSlot::new("color", UniformKind::Vec3),
    ],
};
