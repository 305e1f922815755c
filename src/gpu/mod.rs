//! Narrow capability interfaces the overlay draws through.
//!
//! Backends implement [`GraphicsContext`] together with a program and a buffer
//! type. The overlay never touches a backend directly, so the same sequencing
//! code drives the wgpu renderer and the in-memory [`recording`] context.

pub mod recording;

use glam::{Mat4, Vec2, Vec3};

use crate::camera::Camera;
use crate::error::GraphicsError;

/// Largest uniform block a program may declare, in bytes.
pub const UNIFORM_BLOCK_LIMIT: usize = 256;

const SLOT_SIZE: usize = 16;
const MAT4_SIZE: usize = 64;

/// Value written to a named uniform slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Mat4(Mat4),
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            Self::Float(_) => UniformKind::Float,
            Self::Vec2(_) => UniformKind::Vec2,
            Self::Vec3(_) => UniformKind::Vec3,
            Self::Mat4(_) => UniformKind::Mat4,
        }
    }

    fn write_to(&self, out: &mut [f32]) {
        match self {
            Self::Float(value) => out[0] = *value,
            Self::Vec2(value) => out[..2].copy_from_slice(&value.to_array()),
            Self::Vec3(value) => out[..3].copy_from_slice(&value.to_array()),
            Self::Mat4(value) => out[..16].copy_from_slice(&value.to_cols_array()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformKind {
    Float,
    Vec2,
    Vec3,
    Mat4,
}

impl UniformKind {
    /// Bytes the slot occupies inside a [`UniformBlock`].
    pub const fn size(self) -> usize {
        match self {
            Self::Mat4 => MAT4_SIZE,
            _ => SLOT_SIZE,
        }
    }

    fn zero(self) -> UniformValue {
        match self {
            Self::Float => UniformValue::Float(0.0),
            Self::Vec2 => UniformValue::Vec2(Vec2::ZERO),
            Self::Vec3 => UniformValue::Vec3(Vec3::ZERO),
            Self::Mat4 => UniformValue::Mat4(Mat4::IDENTITY),
        }
    }
}

/// Uniform declared by a program, in block order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformSlot {
    pub name: &'static str,
    pub kind: UniformKind,
}

impl UniformSlot {
    pub const fn new(name: &'static str, kind: UniformKind) -> Self {
        Self { name, kind }
    }
}

/// CPU-side copy of a program's uniform block.
///
/// Slots are packed in declaration order. A `Mat4` takes 64 bytes, every other
/// kind takes a single vec4 with the unused lanes left at zero, which matches
/// a WGSL struct made of `mat4x4<f32>` and `vec4<f32>` members.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformBlock {
    slots: &'static [UniformSlot],
    values: Vec<UniformValue>,
}

impl UniformBlock {
    pub fn new(label: &str, slots: &'static [UniformSlot]) -> Result<Self, GraphicsError> {
        let size: usize = slots.iter().map(|slot| slot.kind.size()).sum();
        if size > UNIFORM_BLOCK_LIMIT {
            return Err(GraphicsError::UniformBlockTooLarge {
                label: label.to_string(),
                size,
                limit: UNIFORM_BLOCK_LIMIT,
            });
        }
        Ok(Self {
            slots,
            values: slots.iter().map(|slot| slot.kind.zero()).collect(),
        })
    }

    pub fn set(
        &mut self,
        program: &str,
        name: &str,
        value: UniformValue,
    ) -> Result<(), GraphicsError> {
        let index = self
            .slots
            .iter()
            .position(|slot| slot.name == name)
            .ok_or_else(|| GraphicsError::UnknownUniform {
                program: program.to_string(),
                name: name.to_string(),
            })?;
        let expected = self.slots[index].kind;
        if expected != value.kind() {
            return Err(GraphicsError::UniformKindMismatch {
                name: name.to_string(),
                expected,
                actual: value.kind(),
            });
        }
        self.values[index] = value;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<UniformValue> {
        self.slots
            .iter()
            .position(|slot| slot.name == name)
            .map(|index| self.values[index])
    }

    /// Size of the packed block in bytes.
    pub fn size(&self) -> usize {
        self.slots.iter().map(|slot| slot.kind.size()).sum()
    }

    /// Packs the current values into the layout described above.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut floats = vec![0.0f32; self.size() / 4];
        let mut offset = 0;
        for (slot, value) in self.slots.iter().zip(&self.values) {
            let len = slot.kind.size() / 4;
            value.write_to(&mut floats[offset..offset + len]);
            offset += len;
        }
        bytemuck::cast_slice(&floats).to_vec()
    }
}

/// Single per-vertex input a program consumes at location 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub name: &'static str,
    /// Number of `f32` components (1 to 4).
    pub components: u32,
}

impl VertexAttribute {
    pub const fn new(name: &'static str, components: u32) -> Self {
        Self { name, components }
    }

    /// Stride of one vertex in bytes.
    pub const fn stride(&self) -> u64 {
        self.components as u64 * 4
    }
}

/// Everything a backend needs to build a shader program.
///
/// `wgsl` must expose `vs_main` and `fs_main` and read its uniforms from
/// `@group(0) @binding(0)`.
#[derive(Debug, Clone, Copy)]
pub struct ProgramSource {
    pub label: &'static str,
    pub wgsl: &'static str,
    pub attribute: VertexAttribute,
    pub uniforms: &'static [UniformSlot],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Vertex,
    /// `u16` element indices.
    Index,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    Lines,
    Triangles,
}

/// Fixed-function state applied to a single draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RasterState {
    pub cull_face: bool,
    pub depth_test: bool,
    pub blend: bool,
}

impl RasterState {
    /// Culling off, depth test on, blending off: last write wins on depth.
    pub const OPAQUE: Self = Self {
        cull_face: false,
        depth_test: true,
        blend: false,
    };
}

/// Parameters of one draw submission.
#[derive(Debug)]
pub struct DrawCall<'a, B> {
    pub topology: Topology,
    pub vertices: &'a B,
    pub indices: Option<&'a B>,
    /// Number of indices when `indices` is set, number of vertices otherwise.
    pub count: u32,
    pub raster: RasterState,
}

pub trait ShaderProgram {
    fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<(), GraphicsError>;
}

pub trait GpuBuffer {
    fn kind(&self) -> BufferKind;

    /// Allocated capacity in bytes.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replaces the buffer contents in place; never reallocates.
    fn upload(&mut self, data: &[u8]) -> Result<(), GraphicsError>;
}

pub trait GraphicsContext {
    type Program: ShaderProgram;
    type Buffer: GpuBuffer;

    fn create_program(&mut self, source: &ProgramSource) -> Result<Self::Program, GraphicsError>;

    fn create_buffer(
        &mut self,
        kind: BufferKind,
        contents: &[u8],
    ) -> Result<Self::Buffer, GraphicsError>;

    /// Draws with `program` using the uniform values it currently holds.
    fn draw(
        &mut self,
        program: &Self::Program,
        call: DrawCall<'_, Self::Buffer>,
    ) -> Result<(), GraphicsError>;
}

/// Target-wide state changes a host issues between draws.
pub trait FrameControl {
    /// Clears depth so later draws overwrite earlier ones.
    fn clear_depth(&mut self);

    /// Restricts later draws to `viewport`; `None` restores the full target.
    fn set_viewport(&mut self, viewport: Option<Viewport>);
}

/// Pixel rectangle of the render target, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Anything that can draw itself from a given viewpoint.
pub trait Renderable<C: GraphicsContext> {
    fn render(&mut self, ctx: &mut C, camera: &dyn Camera) -> Result<(), GraphicsError>;
}

/// Validates buffer roles and element ranges shared by every backend.
pub(crate) fn check_draw<B: GpuBuffer>(
    call: &DrawCall<'_, B>,
    attribute: VertexAttribute,
) -> Result<(), GraphicsError> {
    if call.vertices.kind() != BufferKind::Vertex {
        return Err(GraphicsError::BufferKindMismatch {
            expected: BufferKind::Vertex,
        });
    }
    let available: usize = match call.indices {
        Some(indices) => {
            if indices.kind() != BufferKind::Index {
                return Err(GraphicsError::BufferKindMismatch {
                    expected: BufferKind::Index,
                });
            }
            indices.len() / std::mem::size_of::<u16>()
        }
        None => call.vertices.len() / attribute.stride() as usize,
    };
    if call.count as usize > available {
        return Err(GraphicsError::DrawOutOfRange {
            count: call.count,
            available: available as u32,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLOTS: &[UniformSlot] = &[
        UniformSlot::new("model", UniformKind::Mat4),
        UniformSlot::new("length", UniformKind::Float),
        UniformSlot::new("color", UniformKind::Vec3),
    ];

    #[test]
    fn packs_slots_in_declaration_order() {
        let mut block = UniformBlock::new("test", SLOTS).unwrap();
        block
            .set("test", "length", UniformValue::Float(150.0))
            .unwrap();
        block
            .set("test", "color", UniformValue::Vec3(Vec3::new(1.0, 0.5, 0.25)))
            .unwrap();
        let bytes = block.to_bytes();
        assert_eq!(bytes.len(), 96);
        let floats: &[f32] = bytemuck::cast_slice(&bytes);
        assert_eq!(&floats[..16], &Mat4::IDENTITY.to_cols_array());
        assert_eq!(&floats[16..20], &[150.0, 0.0, 0.0, 0.0]);
        assert_eq!(&floats[20..24], &[1.0, 0.5, 0.25, 0.0]);
    }

    #[test]
    fn rejects_unknown_and_mistyped_uniforms() {
        let mut block = UniformBlock::new("test", SLOTS).unwrap();
        assert!(matches!(
            block.set("test", "missing", UniformValue::Float(1.0)),
            Err(GraphicsError::UnknownUniform { .. })
        ));
        assert!(matches!(
            block.set("test", "model", UniformValue::Float(1.0)),
            Err(GraphicsError::UniformKindMismatch {
                expected: UniformKind::Mat4,
                actual: UniformKind::Float,
                ..
            })
        ));
    }

    #[test]
    fn oversized_blocks_are_refused() {
        const HUGE: &[UniformSlot] = &[
            UniformSlot::new("a", UniformKind::Mat4),
            UniformSlot::new("b", UniformKind::Mat4),
            UniformSlot::new("c", UniformKind::Mat4),
            UniformSlot::new("d", UniformKind::Mat4),
            UniformSlot::new("e", UniformKind::Float),
        ];
        assert!(matches!(
            UniformBlock::new("huge", HUGE),
            Err(GraphicsError::UniformBlockTooLarge { size: 272, .. })
        ));
    }
}
