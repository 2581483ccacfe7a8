use glam::{Mat4, Vec2, Vec3, Vec4};
use smplx::CameraConfig;

use crate::engine::prelude::*;

pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 1000.0;

pub const MIN_DISTANCE: f32 = 0.5;
pub const MAX_DISTANCE: f32 = 50.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrices {
    pub projection: Mat4,
    pub view: Mat4,
}

/// Right handed, Y up matrices looking from the camera position at its target.
pub fn calculate_matrices(camera: &CameraConfig, aspect_ratio: f32) -> Matrices {
    let offset = camera.position - camera.target;

    // Degenerate configurations can be typed into the panel. Keep the matrices finite.
    let eye = if offset.length_squared() < f32::EPSILON {
        camera.target + Vec3::Z * MIN_DISTANCE
    } else {
        camera.position
    };
    let up = if offset.normalize_or_zero().y.abs() > 0.999 {
        Vec3::NEG_Z
    } else {
        Vec3::Y
    };

    Matrices {
        projection: Mat4::perspective_rh(
            camera.fov.to_radians(),
            aspect_ratio.max(f32::EPSILON),
            NEAR,
            FAR,
        ),
        view: Mat4::look_at_rh(eye, camera.target, up),
    }
}

#[derive(Clone, Copy, Default, bytemuck::NoUninit)]
#[repr(C)]
pub struct CameraBuffer {
    pub proj: Mat4,
    pub view: Mat4,
    pub position: Vec4,
}

pub struct GpuCamera {
    buffer: wgpu::Buffer,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
}

impl GpuCamera {
    pub fn new(renderer: &Renderer) -> Self {
        let buffer = renderer.create_uniform_buffer("camera_buffer", &CameraBuffer::default());

        let bind_group_layout =
            renderer
                .device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("camera_bind_group_layout"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    }],
                });

        let bind_group = renderer
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("camera_bind_group"),
                layout: &bind_group_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer(buffer.as_entire_buffer_binding()),
                }],
            });

        Self {
            buffer,
            bind_group_layout,
            bind_group,
        }
    }

    pub fn upload_matrices(&self, queue: &wgpu::Queue, matrices: &Matrices, position: Vec3) {
        let data = CameraBuffer {
            proj: matrices.projection,
            view: matrices.view,
            position: position.extend(1.0),
        };
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&data));
    }
}

/// Orbits the camera position around its target. Dragging with the left mouse button rotates and
/// the wheel zooms. The target never moves.
pub struct OrbitController {
    /// Radians per pixel dragged.
    pub rotate_sensitivity: f32,
    /// Fraction of the distance covered per wheel line.
    pub zoom_speed: f32,
}

impl Default for OrbitController {
    fn default() -> Self {
        Self {
            rotate_sensitivity: 0.008,
            zoom_speed: 0.1,
        }
    }
}

impl OrbitController {
    /// Keeps the camera from flipping over the poles.
    const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

    /// New position after dragging by `delta` pixels, keeping the distance to the target.
    pub fn rotate(&self, camera: &CameraConfig, delta: Vec2) -> Vec3 {
        let offset = camera.position - camera.target;
        let distance = offset.length();
        if distance < f32::EPSILON {
            return camera.position;
        }

        let yaw = offset.x.atan2(offset.z) + delta.x * self.rotate_sensitivity;
        let pitch = ((offset.y / distance).clamp(-1.0, 1.0).asin()
            - delta.y * self.rotate_sensitivity)
            .clamp(-Self::MAX_PITCH, Self::MAX_PITCH);

        camera.target
            + distance
                * Vec3::new(
                    pitch.cos() * yaw.sin(),
                    pitch.sin(),
                    pitch.cos() * yaw.cos(),
                )
    }

    /// New position after scrolling `lines`; positive values move closer.
    pub fn zoom(&self, camera: &CameraConfig, lines: f32) -> Vec3 {
        let offset = camera.position - camera.target;
        let distance = offset.length();
        let direction = if distance < f32::EPSILON {
            Vec3::Z
        } else {
            offset / distance
        };

        let distance =
            (distance * (1.0 - self.zoom_speed).powf(lines)).clamp(MIN_DISTANCE, MAX_DISTANCE);
        camera.target + direction * distance
    }

    pub fn on_input(&self, input: &InputState, camera: &mut Tracked<CameraConfig>) {
        if input.mouse_pressed(MouseButton::Left) {
            if let Some(delta) = input.mouse_delta() {
                if delta != glam::IVec2::ZERO {
                    let position = self.rotate(camera, delta.as_vec2());
                    camera.position = position;
                }
            }
        }

        let lines = input.wheel_delta();
        if lines != 0.0 {
            let position = self.zoom(camera, lines);
            camera.position = position;
        }
    }
}
