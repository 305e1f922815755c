use std::collections::HashMap;
use std::num::NonZeroU64;
use std::sync::Arc;

use log::debug;
use wgpu::util::DeviceExt;

use crate::error::GraphicsError;
use crate::gpu::{
    check_draw, BufferKind, DrawCall, FrameControl, GpuBuffer, GraphicsContext, ProgramSource,
    RasterState, ShaderProgram, Topology, UniformBlock, UniformValue, VertexAttribute, Viewport,
    UNIFORM_BLOCK_LIMIT,
};

/// Distance between two draws' uniform blocks in the per-frame buffer; also
/// the default `min_uniform_buffer_offset_alignment`.
const UNIFORM_STRIDE: usize = 256;

#[derive(Debug)]
pub struct WgpuProgram {
    id: usize,
    label: &'static str,
    attribute: VertexAttribute,
    uniforms: UniformBlock,
}

impl ShaderProgram for WgpuProgram {
    fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<(), GraphicsError> {
        self.uniforms.set(self.label, name, value)
    }
}

#[derive(Debug)]
pub struct WgpuBuffer {
    buffer: Arc<wgpu::Buffer>,
    queue: Arc<wgpu::Queue>,
    kind: BufferKind,
    len: usize,
}

impl GpuBuffer for WgpuBuffer {
    fn kind(&self) -> BufferKind {
        self.kind
    }

    fn len(&self) -> usize {
        self.len
    }

    fn upload(&mut self, data: &[u8]) -> Result<(), GraphicsError> {
        if data.len() > self.len {
            return Err(GraphicsError::BufferOverflow {
                len: data.len(),
                capacity: self.len,
            });
        }
        let align = wgpu::COPY_BUFFER_ALIGNMENT as usize;
        if data.len() % align == 0 {
            self.queue.write_buffer(&self.buffer, 0, data);
        } else {
            // Buffers are allocated with an aligned size, so the padding fits.
            let mut padded = data.to_vec();
            padded.resize(data.len().next_multiple_of(align), 0);
            self.queue.write_buffer(&self.buffer, 0, &padded);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PipelineKey {
    program: usize,
    topology: Topology,
    raster: RasterState,
}

enum Command {
    Draw {
        pipeline: PipelineKey,
        vertices: Arc<wgpu::Buffer>,
        indices: Option<Arc<wgpu::Buffer>>,
        count: u32,
        uniform_offset: u32,
    },
    Viewport(Option<Viewport>),
    ClearDepth,
}

/// [`GraphicsContext`] backed by wgpu.
///
/// Draws are recorded together with a snapshot of their uniforms and turned
/// into render passes by [`WgpuContext::encode_frame`]. Every `ClearDepth`
/// starts a new pass that keeps color and clears depth.
pub struct WgpuContext {
    device: wgpu::Device,
    queue: Arc<wgpu::Queue>,
    color_format: wgpu::TextureFormat,
    depth_format: wgpu::TextureFormat,
    uniform_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    modules: Vec<(wgpu::ShaderModule, VertexAttribute, &'static str)>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    commands: Vec<Command>,
    uniform_data: Vec<u8>,
}

impl WgpuContext {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform-bind-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("debugger-pipeline-layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });
        Self {
            device,
            queue: Arc::new(queue),
            color_format,
            depth_format,
            uniform_layout,
            pipeline_layout,
            modules: Vec::new(),
            pipelines: HashMap::new(),
            commands: Vec::new(),
            uniform_data: Vec::new(),
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Drops everything recorded since the last encoded frame.
    pub fn discard_frame(&mut self) {
        self.commands.clear();
        self.uniform_data.clear();
    }

    /// Encodes the recorded commands into `encoder`, clearing `color` first.
    /// `size` is the pixel size of both attachments.
    pub fn encode_frame(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        color: &wgpu::TextureView,
        depth: &wgpu::TextureView,
        size: (u32, u32),
        clear_color: wgpu::Color,
    ) {
        let commands = std::mem::take(&mut self.commands);
        let mut uniform_data = std::mem::take(&mut self.uniform_data);
        if uniform_data.is_empty() {
            uniform_data.resize(UNIFORM_STRIDE, 0);
        }

        let uniform_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("frame-uniforms"),
                contents: &uniform_data,
                usage: wgpu::BufferUsages::UNIFORM,
            });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame-uniform-bind-group"),
            layout: &self.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: NonZeroU64::new(UNIFORM_STRIDE as u64),
                }),
            }],
        });

        let mut viewport = None;
        for (index, segment) in commands
            .split(|command| matches!(command, Command::ClearDepth))
            .enumerate()
        {
            let color_load = if index == 0 {
                wgpu::LoadOp::Clear(clear_color)
            } else {
                wgpu::LoadOp::Load
            };
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("debugger-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: color_load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            if let Some(rect) = viewport {
                apply_viewport(&mut pass, rect);
            }

            for command in segment {
                match command {
                    Command::Viewport(rect) => {
                        viewport = *rect;
                        match rect {
                            Some(rect) => apply_viewport(&mut pass, *rect),
                            None => apply_viewport(
                                &mut pass,
                                Viewport {
                                    x: 0.0,
                                    y: 0.0,
                                    width: size.0 as f32,
                                    height: size.1 as f32,
                                },
                            ),
                        }
                    }
                    Command::Draw {
                        pipeline,
                        vertices,
                        indices,
                        count,
                        uniform_offset,
                    } => {
                        let Some(pipeline) = self.pipelines.get(pipeline) else {
                            continue;
                        };
                        pass.set_pipeline(pipeline);
                        pass.set_bind_group(0, &bind_group, &[*uniform_offset]);
                        pass.set_vertex_buffer(0, vertices.slice(..));
                        match indices {
                            Some(indices) => {
                                pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint16);
                                pass.draw_indexed(0..*count, 0, 0..1);
                            }
                            None => pass.draw(0..*count, 0..1),
                        }
                    }
                    Command::ClearDepth => {}
                }
            }
        }
    }

    fn ensure_pipeline(&mut self, key: PipelineKey) {
        if self.pipelines.contains_key(&key) {
            return;
        }
        let (module, attribute, label) = &self.modules[key.program];
        let attributes = [wgpu::VertexAttribute {
            format: vertex_format(attribute.components),
            offset: 0,
            shader_location: 0,
        }];
        let depth_compare = if key.raster.depth_test {
            wgpu::CompareFunction::Less
        } else {
            wgpu::CompareFunction::Always
        };
        let blend = if key.raster.blend {
            wgpu::BlendState::ALPHA_BLENDING
        } else {
            wgpu::BlendState::REPLACE
        };
        debug!("creating pipeline for `{label}` ({:?}, {:?})", key.topology, key.raster);

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(*label),
                layout: Some(&self.pipeline_layout),
                vertex: wgpu::VertexState {
                    module,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: attribute.stride(),
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &attributes,
                    }],
                },
                primitive: wgpu::PrimitiveState {
                    topology: match key.topology {
                        Topology::Lines => wgpu::PrimitiveTopology::LineList,
                        Topology::Triangles => wgpu::PrimitiveTopology::TriangleList,
                    },
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: key.raster.cull_face.then_some(wgpu::Face::Back),
                    polygon_mode: wgpu::PolygonMode::Fill,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: self.depth_format,
                    depth_write_enabled: key.raster.depth_test,
                    depth_compare,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.color_format,
                        blend: Some(blend),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                multiview: None,
                cache: None,
            });
        self.pipelines.insert(key, pipeline);
    }

    fn push_uniforms(&mut self, block: &UniformBlock) -> u32 {
        let offset = self.uniform_data.len();
        self.uniform_data.extend_from_slice(&block.to_bytes());
        self.uniform_data.resize(offset + UNIFORM_STRIDE, 0);
        offset as u32
    }
}

impl GraphicsContext for WgpuContext {
    type Program = WgpuProgram;
    type Buffer = WgpuBuffer;

    fn create_program(&mut self, source: &ProgramSource) -> Result<Self::Program, GraphicsError> {
        let uniforms = UniformBlock::new(source.label, source.uniforms)?;
        debug_assert!(uniforms.size() <= UNIFORM_BLOCK_LIMIT.min(UNIFORM_STRIDE));

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(source.label),
                source: wgpu::ShaderSource::Wgsl(source.wgsl.into()),
            });
        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(GraphicsError::ProgramCompilation {
                label: source.label.to_string(),
                reason: err.to_string(),
            });
        }

        let id = self.modules.len();
        self.modules.push((module, source.attribute, source.label));
        Ok(WgpuProgram {
            id,
            label: source.label,
            attribute: source.attribute,
            uniforms,
        })
    }

    fn create_buffer(
        &mut self,
        kind: BufferKind,
        contents: &[u8],
    ) -> Result<Self::Buffer, GraphicsError> {
        let usage = match kind {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX,
            BufferKind::Index => wgpu::BufferUsages::INDEX,
        } | wgpu::BufferUsages::COPY_DST;
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(match kind {
                    BufferKind::Vertex => "vertex-buffer",
                    BufferKind::Index => "index-buffer",
                }),
                contents,
                usage,
            });
        Ok(WgpuBuffer {
            buffer: Arc::new(buffer),
            queue: Arc::clone(&self.queue),
            kind,
            len: contents.len(),
        })
    }

    fn draw(
        &mut self,
        program: &Self::Program,
        call: DrawCall<'_, Self::Buffer>,
    ) -> Result<(), GraphicsError> {
        check_draw(&call, program.attribute)?;
        let key = PipelineKey {
            program: program.id,
            topology: call.topology,
            raster: call.raster,
        };
        self.ensure_pipeline(key);
        let uniform_offset = self.push_uniforms(&program.uniforms);
        self.commands.push(Command::Draw {
            pipeline: key,
            vertices: Arc::clone(&call.vertices.buffer),
            indices: call.indices.map(|buffer| Arc::clone(&buffer.buffer)),
            count: call.count,
            uniform_offset,
        });
        Ok(())
    }
}

impl FrameControl for WgpuContext {
    fn clear_depth(&mut self) {
        self.commands.push(Command::ClearDepth);
    }

    fn set_viewport(&mut self, viewport: Option<Viewport>) {
        self.commands.push(Command::Viewport(viewport));
    }
}

fn apply_viewport(pass: &mut wgpu::RenderPass<'_>, rect: Viewport) {
    pass.set_viewport(rect.x, rect.y, rect.width, rect.height, 0.0, 1.0);
}

fn vertex_format(components: u32) -> wgpu::VertexFormat {
    match components {
        1 => wgpu::VertexFormat::Float32,
        2 => wgpu::VertexFormat::Float32x2,
        3 => wgpu::VertexFormat::Float32x3,
        _ => wgpu::VertexFormat::Float32x4,
    }
}
