mod render;
mod surface;

use std::sync::Arc;

pub use render::*;
pub use surface::*;
use winit::window::Window;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Could not create the window surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("No graphics adapter is compatible with the window surface")]
    NoAdapter,
    #[error("The window surface is not supported by the adapter")]
    UnsupportedSurface,
    #[error("Could not request a device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
}

/// Create the window surface and a renderer for the device driving it.
pub fn create(window: Arc<Window>) -> Result<(Surface, Renderer), RenderError> {
    let winit::dpi::PhysicalSize { width, height } = window.inner_size();

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        ..Default::default()
    });

    let surface = instance.create_surface(window)?;

    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        force_fallback_adapter: false,
        compatible_surface: Some(&surface),
    }))
    .ok_or(RenderError::NoAdapter)?;

    tracing::info!("Using adapter: {}", adapter.get_info().name);

    let surface_caps = surface.get_capabilities(&adapter);

    // Find a sRGB surface format or use the first.
    let format = surface_caps
        .formats
        .iter()
        .find(|cap| cap.is_srgb())
        .or(surface_caps.formats.first())
        .copied()
        .ok_or(RenderError::UnsupportedSurface)?;

    let mut surface_config = surface
        .get_default_config(&adapter, width.max(1), height.max(1))
        .ok_or(RenderError::UnsupportedSurface)?;
    surface_config.format = format;
    surface_config.present_mode = wgpu::PresentMode::AutoVsync;

    let (device, queue) = pollster::block_on(adapter.request_device(
        &wgpu::DeviceDescriptor {
            label: Some("studio_device"),
            ..Default::default()
        },
        None,
    ))?;

    let surface = Surface::new(surface, surface_config);
    surface.configure(&device);

    let renderer = Renderer::new(device, queue, surface.format());

    Ok((surface, renderer))
}
