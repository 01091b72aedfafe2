use bytemuck::{Pod, Zeroable};

use playback::SurfaceSize;

/// CPU mirror of the per-frame uniform block.
///
/// Matches the documented std140 interface at set 0, binding 0:
/// `iResolution` (vec2) at offset 0, `iTime` (float) at offset 8, explicit
/// padding to the 16-byte block stride. Shaders that never declare the block
/// still render; the bound group is simply unused.
#[repr(C, align(16))]
#[derive(Clone, Copy)]
pub(crate) struct FrameUniforms {
    resolution: [f32; 2],
    time: f32,
    _pad: f32,
}

unsafe impl Zeroable for FrameUniforms {}
unsafe impl Pod for FrameUniforms {}

impl FrameUniforms {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            resolution: [size.width as f32, size.height as f32],
            time: 0.0,
            _pad: 0.0,
        }
    }

    pub fn set_resolution(&mut self, size: SurfaceSize) {
        self.resolution = [size.width as f32, size.height as f32];
    }

    pub fn set_time(&mut self, seconds: f32) {
        self.time = seconds;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_layout_matches_std140() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 16);
        assert_eq!(std::mem::offset_of!(FrameUniforms, resolution), 0);
        assert_eq!(std::mem::offset_of!(FrameUniforms, time), 8);
    }

    #[test]
    fn resolution_tracks_surface_size() {
        let mut uniforms = FrameUniforms::new(SurfaceSize::new(640, 360));
        uniforms.set_resolution(SurfaceSize::new(1920, 1080));
        assert_eq!(uniforms.resolution, [1920.0, 1080.0]);
    }
}
