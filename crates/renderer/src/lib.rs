//! Canvas renderer for shaderdeck gallery entries.
//!
//! One [`CanvasRenderer`] per mounted canvas owns the graphics context and
//! turns fragment-shader source text into drawable [`ShaderProgram`] bundles;
//! the playback machine decides when frames happen and with what shader time:
//!
//! ```text
//!   gallery entry ──▶ playback::Playback ──▶ CanvasRenderer
//!        (source)        set_source │           initialize ──▶ ShaderProgram
//!                        on_frame   └─────────▶ draw_frame ──▶ presented frame
//! ```
//!
//! Compilation goes through wgpu's bundled naga frontend so a bad shader
//! produces a structured, synchronous diagnostic (stage + compiler text)
//! instead of an asynchronous device error. The fixed vertex stage and the
//! quad geometry live here; fragment shaders are taken verbatim from the
//! embedding, which is responsible for supplying a complete stage (see the
//! gallery crate's wrapping).
//!
//! Shader-author interface, fixed and documented:
//! - vertex attribute `a_position: vec2` at location 0 (provided by the
//!   fixed stage, authors never see it);
//! - one optional std140 uniform block at set 0, binding 0 holding
//!   `iResolution: vec2` then `iTime: float`. A shader that omits the block
//!   simply ignores the bound group; the pipeline layout permits subsets.

mod compile;
mod context;
mod error;
mod pipeline;
mod uniforms;

pub use error::{RendererError, ShaderStageKind};
pub use pipeline::ShaderProgram;

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use playback::{FrameRenderer, SurfaceSize};

use crate::context::GpuContext;

/// Renderer for one canvas surface.
pub struct CanvasRenderer {
    context: GpuContext,
}

impl CanvasRenderer {
    /// Acquires a graphics context for the surface.
    ///
    /// Failure is [`RendererError::ContextUnavailable`]: fatal for this
    /// canvas instance and not retried, but without effect on any other
    /// canvas.
    pub fn new<T>(target: &T, size: SurfaceSize) -> Result<Self, RendererError>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        Ok(Self {
            context: GpuContext::new(target, size)?,
        })
    }

    /// Compiles and links a fragment source into a drawable program.
    pub fn initialize(&mut self, fragment_source: &str) -> Result<ShaderProgram, RendererError> {
        ShaderProgram::link(
            self.context.device(),
            self.context.surface_format(),
            fragment_source,
            self.context.size(),
        )
    }

    /// Draws one frame at `shader_time` into a surface of `size`.
    ///
    /// The backing store is resynchronized first if the size changed; a
    /// resize never recompiles anything. Recoverable surface conditions
    /// (lost, outdated, timeout) skip the frame instead of failing; the next
    /// scheduled frame presents normally.
    pub fn draw_frame(&mut self, program: &mut ShaderProgram, shader_time: f32, size: SurfaceSize) {
        self.context.ensure_size(size);
        program.uniforms.set_resolution(size);
        program.uniforms.set_time(shader_time);
        self.context.queue().write_buffer(
            &program.uniform_buffer,
            0,
            bytemuck::bytes_of(&program.uniforms),
        );

        let Some(frame) = self.context.acquire_frame() else {
            return;
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("frame encoder"),
                });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("frame pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&program.pipeline);
            render_pass.set_bind_group(0, &program.uniform_bind_group, &[]);
            render_pass.set_vertex_buffer(0, program.geometry.buffer.slice(..));
            render_pass.draw(0..program.geometry.vertex_count, 0..1);
        }

        self.context.queue().submit(std::iter::once(encoder.finish()));
        frame.present();
        tracing::trace!(shader_time, width = size.width, height = size.height, "presented frame");
    }
}

impl FrameRenderer for CanvasRenderer {
    type Handle = ShaderProgram;
    type Error = RendererError;

    fn initialize(&mut self, fragment_source: &str) -> Result<ShaderProgram, RendererError> {
        CanvasRenderer::initialize(self, fragment_source)
    }

    fn draw_frame(&mut self, handle: &mut ShaderProgram, shader_time: f32, size: SurfaceSize) {
        CanvasRenderer::draw_frame(self, handle, shader_time, size);
    }

    fn dispose(&mut self, handle: ShaderProgram) {
        // The bundle owns every GPU object of the program; consuming it here
        // releases pipeline, quad, and uniform buffer in one step.
        drop(handle);
    }
}
