//! Backend that keeps everything in memory.
//!
//! Programs and buffers behave like their GPU counterparts (uniform checks,
//! in-place uploads, range validation) while every draw is appended to a log.
//! The headless CLI mode and the tests render through it.

use super::{
    check_draw, BufferKind, DrawCall, FrameControl, GpuBuffer, GraphicsContext, ProgramSource,
    RasterState, ShaderProgram, Topology, UniformBlock, UniformValue, Viewport,
};
use crate::error::GraphicsError;

#[derive(Debug, Clone)]
pub struct RecordedProgram {
    id: usize,
    label: &'static str,
    source: ProgramSource,
    uniforms: UniformBlock,
}

impl RecordedProgram {
    pub fn id(&self) -> usize {
        self.id
    }
}

impl ShaderProgram for RecordedProgram {
    fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<(), GraphicsError> {
        self.uniforms.set(self.label, name, value)
    }
}

#[derive(Debug, Clone)]
pub struct RecordedBuffer {
    id: usize,
    kind: BufferKind,
    data: Vec<u8>,
    uploads: usize,
}

impl RecordedBuffer {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Number of uploads since creation.
    pub fn uploads(&self) -> usize {
        self.uploads
    }

    pub fn to_f32(&self) -> Vec<f32> {
        self.data
            .chunks_exact(4)
            .map(|chunk| f32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    pub fn to_u16(&self) -> Vec<u16> {
        self.data
            .chunks_exact(2)
            .map(|chunk| u16::from_ne_bytes([chunk[0], chunk[1]]))
            .collect()
    }
}

impl GpuBuffer for RecordedBuffer {
    fn kind(&self) -> BufferKind {
        self.kind
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn upload(&mut self, data: &[u8]) -> Result<(), GraphicsError> {
        if data.len() > self.data.len() {
            return Err(GraphicsError::BufferOverflow {
                len: data.len(),
                capacity: self.data.len(),
            });
        }
        self.data[..data.len()].copy_from_slice(data);
        self.uploads += 1;
        Ok(())
    }
}

/// One submitted draw with the uniform values it was issued with.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub program: String,
    pub topology: Topology,
    pub raster: RasterState,
    pub count: u32,
    pub vertex_buffer: usize,
    pub index_buffer: Option<usize>,
    pub uniforms: UniformBlock,
}

impl DrawRecord {
    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.uniforms.get(name)
    }
}

/// Target-wide change interleaved with the draws.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameEvent {
    ClearDepth,
    Viewport(Option<Viewport>),
}

#[derive(Debug, Default)]
pub struct RecordingContext {
    programs: Vec<&'static str>,
    buffers: Vec<BufferKind>,
    draws: Vec<DrawRecord>,
    events: Vec<(usize, FrameEvent)>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Labels of every program created so far, in creation order.
    pub fn programs(&self) -> &[&'static str] {
        &self.programs
    }

    /// Kinds of every buffer created so far, in creation order.
    pub fn buffers(&self) -> &[BufferKind] {
        &self.buffers
    }

    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    /// Frame events, each paired with the number of draws recorded before it.
    pub fn events(&self) -> &[(usize, FrameEvent)] {
        &self.events
    }

}

impl FrameControl for RecordingContext {
    fn clear_depth(&mut self) {
        self.events.push((self.draws.len(), FrameEvent::ClearDepth));
    }

    fn set_viewport(&mut self, viewport: Option<Viewport>) {
        self.events
            .push((self.draws.len(), FrameEvent::Viewport(viewport)));
    }
}

impl GraphicsContext for RecordingContext {
    type Program = RecordedProgram;
    type Buffer = RecordedBuffer;

    fn create_program(&mut self, source: &ProgramSource) -> Result<Self::Program, GraphicsError> {
        let uniforms = UniformBlock::new(source.label, source.uniforms)?;
        let id = self.programs.len();
        self.programs.push(source.label);
        Ok(RecordedProgram {
            id,
            label: source.label,
            source: *source,
            uniforms,
        })
    }

    fn create_buffer(
        &mut self,
        kind: BufferKind,
        contents: &[u8],
    ) -> Result<Self::Buffer, GraphicsError> {
        let id = self.buffers.len();
        self.buffers.push(kind);
        Ok(RecordedBuffer {
            id,
            kind,
            data: contents.to_vec(),
            uploads: 0,
        })
    }

    fn draw(
        &mut self,
        program: &Self::Program,
        call: DrawCall<'_, Self::Buffer>,
    ) -> Result<(), GraphicsError> {
        check_draw(&call, program.source.attribute)?;
        self.draws.push(DrawRecord {
            program: program.label.to_string(),
            topology: call.topology,
            raster: call.raster,
            count: call.count,
            vertex_buffer: call.vertices.id,
            index_buffer: call.indices.map(|buffer| buffer.id),
            uniforms: program.uniforms.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::{UniformKind, UniformSlot, VertexAttribute};

    const SOURCE: ProgramSource = ProgramSource {
        label: "points",
        wgsl: "",
        attribute: VertexAttribute::new("position", 3),
        uniforms: &[UniformSlot::new("color", UniformKind::Vec3)],
    };

    #[test]
    fn upload_replaces_contents_without_growing() {
        let mut ctx = RecordingContext::new();
        let mut buffer = ctx
            .create_buffer(BufferKind::Vertex, bytemuck::cast_slice(&[0.0f32; 3]))
            .unwrap();
        buffer
            .upload(bytemuck::cast_slice(&[1.0f32, 2.0, 3.0]))
            .unwrap();
        assert_eq!(buffer.to_f32(), vec![1.0, 2.0, 3.0]);
        assert_eq!(buffer.uploads(), 1);
        assert!(matches!(
            buffer.upload(&[0u8; 16]),
            Err(GraphicsError::BufferOverflow {
                len: 16,
                capacity: 12
            })
        ));
    }

    #[test]
    fn draw_validates_buffer_roles_and_ranges() {
        let mut ctx = RecordingContext::new();
        let program = ctx.create_program(&SOURCE).unwrap();
        let vertices = ctx
            .create_buffer(BufferKind::Vertex, bytemuck::cast_slice(&[0.0f32; 6]))
            .unwrap();
        let indices = ctx
            .create_buffer(BufferKind::Index, bytemuck::cast_slice(&[0u16, 1]))
            .unwrap();

        let swapped = ctx.draw(
            &program,
            DrawCall {
                topology: Topology::Lines,
                vertices: &indices,
                indices: None,
                count: 2,
                raster: RasterState::OPAQUE,
            },
        );
        assert!(matches!(
            swapped,
            Err(GraphicsError::BufferKindMismatch {
                expected: BufferKind::Vertex
            })
        ));

        let too_many = ctx.draw(
            &program,
            DrawCall {
                topology: Topology::Lines,
                vertices: &vertices,
                indices: Some(&indices),
                count: 4,
                raster: RasterState::OPAQUE,
            },
        );
        assert!(matches!(
            too_many,
            Err(GraphicsError::DrawOutOfRange {
                count: 4,
                available: 2
            })
        ));
        assert!(ctx.draws().is_empty());

        ctx.draw(
            &program,
            DrawCall {
                topology: Topology::Lines,
                vertices: &vertices,
                indices: Some(&indices),
                count: 2,
                raster: RasterState::OPAQUE,
            },
        )
        .unwrap();
        assert_eq!(ctx.draws().len(), 1);
        assert_eq!(ctx.draws()[0].index_buffer, Some(indices.id()));
    }
}
