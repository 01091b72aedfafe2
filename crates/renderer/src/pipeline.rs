use wgpu::util::DeviceExt;

use playback::SurfaceSize;

use crate::compile::{check_linkage, create_module, parse_stage, VERTEX_SHADER_GLSL};
use crate::error::{RendererError, ShaderStageKind};
use crate::uniforms::FrameUniforms;

/// Full-screen quad as two triangles, matching the fixed vertex stage's
/// `a_position` attribute. Uploaded once per program, immutable afterwards.
pub(crate) const QUAD_VERTICES: [[f32; 2]; 6] = [
    [-1.0, -1.0],
    [1.0, -1.0],
    [-1.0, 1.0],
    [-1.0, 1.0],
    [1.0, -1.0],
    [1.0, 1.0],
];

const QUAD_ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    format: wgpu::VertexFormat::Float32x2,
    offset: 0,
    shader_location: 0,
}];

pub(crate) struct GeometryBuffer {
    pub buffer: wgpu::Buffer,
    pub vertex_count: u32,
}

impl GeometryBuffer {
    fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("fullscreen quad"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            buffer,
            vertex_count: QUAD_VERTICES.len() as u32,
        }
    }

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &QUAD_ATTRIBUTES,
        }
    }
}

/// Owned bundle of every GPU object belonging to one compiled shader.
///
/// A program either exists fully linked or not at all: `link` returns the
/// complete bundle or an error, and on the error path any partially created
/// objects are locals that drop before returning. Dropping the bundle
/// releases the pipeline, the quad geometry, and the uniform buffer
/// together, which is what makes "did we leak a GPU object" a property of
/// the bundle's lifetime instead of a per-call audit.
pub struct ShaderProgram {
    pub(crate) pipeline: wgpu::RenderPipeline,
    pub(crate) geometry: GeometryBuffer,
    pub(crate) uniform_buffer: wgpu::Buffer,
    pub(crate) uniform_bind_group: wgpu::BindGroup,
    pub(crate) uniforms: FrameUniforms,
}

impl ShaderProgram {
    /// Compiles both stages, links the pipeline, and uploads the quad.
    pub(crate) fn link(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        fragment_source: &str,
        size: SurfaceSize,
    ) -> Result<Self, RendererError> {
        let vertex_ir = parse_stage(ShaderStageKind::Vertex, VERTEX_SHADER_GLSL)?;
        let fragment_ir = parse_stage(ShaderStageKind::Fragment, fragment_source)?;
        check_linkage(&fragment_ir)?;

        let vertex_module = create_module(device, "fullscreen quad vertex", vertex_ir);
        let fragment_module = create_module(device, "gallery fragment", fragment_ir);

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame uniform layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("shader pipeline layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shader pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some("main"),
                buffers: &[GeometryBuffer::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some("main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview: None,
            cache: None,
        });

        let uniforms = FrameUniforms::new(size);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("frame uniform buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame uniform bind group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Ok(Self {
            pipeline,
            geometry: GeometryBuffer::new(device),
            uniform_buffer,
            uniform_bind_group,
            uniforms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_is_two_triangles_covering_clip_space() {
        assert_eq!(QUAD_VERTICES.len(), 6);
        for corner in [[-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0], [1.0, 1.0]] {
            assert!(
                QUAD_VERTICES.contains(&corner),
                "quad misses corner {corner:?}"
            );
        }
    }
}
