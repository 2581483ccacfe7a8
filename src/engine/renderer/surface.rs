use glam::UVec2;

pub struct Surface {
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
}

impl Surface {
    pub fn new(
        surface: wgpu::Surface<'static>,
        surface_config: wgpu::SurfaceConfiguration,
    ) -> Self {
        Self {
            surface,
            surface_config,
        }
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.surface_config.format
    }

    pub fn size(&self) -> UVec2 {
        UVec2::new(self.surface_config.width, self.surface_config.height)
    }

    pub fn configure(&self, device: &wgpu::Device) {
        self.surface.configure(device, &self.surface_config);
    }

    /// Resize the swap chain. A zero sized surface can not be configured, so minimized windows
    /// keep their previous configuration.
    pub fn resize(&mut self, device: &wgpu::Device, size: UVec2) {
        if size.x == 0 || size.y == 0 {
            return;
        }
        self.surface_config.width = size.x;
        self.surface_config.height = size.y;
        self.configure(device);
    }

    /// Get the next texture in the swap chain. Returns `None` when this frame should be skipped;
    /// a lost or outdated surface is reconfigured so the next frame can render again.
    pub fn get_texture(&self, device: &wgpu::Device) -> Option<wgpu::SurfaceTexture> {
        match self.surface.get_current_texture() {
            Ok(texture) => Some(texture),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::warn!("Surface lost or outdated, reconfiguring.");
                self.configure(device);
                None
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::debug!("Timed out waiting for the surface texture.");
                None
            }
            Err(err) => {
                tracing::error!("Could not get the surface texture: {err}");
                None
            }
        }
    }
}
