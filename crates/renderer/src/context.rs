use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use playback::SurfaceSize;

use crate::error::RendererError;

/// Owns the wgpu plumbing for one canvas: instance, surface, device, queue.
///
/// Exactly one context exists per mounted canvas; nothing here is shared
/// across canvases, so a device loss or misbehaving shader on one gallery
/// entry cannot disturb another.
pub(crate) struct GpuContext {
    _instance: wgpu::Instance,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: SurfaceSize,
}

impl GpuContext {
    pub(crate) fn new<T>(target: &T, initial_size: SurfaceSize) -> Result<Self, RendererError>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let instance = wgpu::Instance::default();

        let window_handle = target.window_handle().map_err(|err| unavailable(format!(
            "failed to acquire window handle: {err}"
        )))?;
        let display_handle = target.display_handle().map_err(|err| unavailable(format!(
            "failed to acquire display handle: {err}"
        )))?;

        let surface = unsafe {
            instance.create_surface_unsafe(wgpu::SurfaceTargetUnsafe::RawHandle {
                raw_display_handle: display_handle.as_raw(),
                raw_window_handle: window_handle.as_raw(),
            })
        }
        .map_err(|err| unavailable(format!("failed to create rendering surface: {err}")))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(|err| unavailable(format!("no suitable GPU adapter: {err}")))?;

        let limits = adapter.limits();
        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("shaderdeck device"),
            required_features: wgpu::Features::empty(),
            required_limits: limits,
            memory_hints: wgpu::MemoryHints::default(),
            trace: wgpu::Trace::default(),
        }))
        .map_err(|err| unavailable(format!("failed to create GPU device: {err}")))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|format| format.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        // Fifo paces the redraw loop to the display's vertical sync.
        let present_mode = surface_caps
            .present_modes
            .iter()
            .copied()
            .find(|mode| *mode == wgpu::PresentMode::Fifo)
            .unwrap_or(surface_caps.present_modes[0]);

        let size = SurfaceSize::new(initial_size.width.max(1), initial_size.height.max(1));
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 1,
        };
        surface.configure(&device, &config);

        tracing::debug!(
            ?surface_format,
            ?present_mode,
            width = size.width,
            height = size.height,
            "acquired graphics context"
        );

        Ok(Self {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            size,
        })
    }

    pub(crate) fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub(crate) fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub(crate) fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub(crate) fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Resynchronizes the backing store to the reported surface size.
    ///
    /// Called at the top of every frame, never as a separate scheduled task,
    /// so it cannot race with disposal. Only the swapchain configuration
    /// changes; the compiled program is untouched.
    pub(crate) fn ensure_size(&mut self, size: SurfaceSize) {
        if size.width == 0 || size.height == 0 || size == self.size {
            return;
        }
        self.size = size;
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Acquires the next swapchain texture, absorbing recoverable errors.
    ///
    /// Lost/outdated surfaces are reconfigured and the frame skipped; the
    /// next scheduled frame draws normally. `None` always means "skip this
    /// frame", never a fatal condition for the caller.
    pub(crate) fn acquire_frame(&mut self) -> Option<wgpu::SurfaceTexture> {
        match self.surface.get_current_texture() {
            Ok(frame) => Some(frame),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("surface lost or outdated; reconfiguring");
                self.surface.configure(&self.device, &self.config);
                None
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::debug!("surface timeout; skipping frame");
                None
            }
            Err(err) => {
                tracing::error!(error = ?err, "surface error; skipping frame");
                None
            }
        }
    }
}

fn unavailable(reason: String) -> RendererError {
    RendererError::ContextUnavailable { reason }
}
