use glam::{Mat4, Vec3, Vec4};
use wgpu::{util::DeviceExt, vertex_attr_array};

use crate::wgsl_shader;

use super::{
    depth_buffer::DepthBuffer,
    renderer::{BufferLayout, Frame, Renderer},
};

#[derive(Clone, Copy, Debug, bytemuck::NoUninit)]
#[repr(C)]
pub struct GizmoVertex {
    position: Vec3,
    _padding: f32,
    color: Vec4,
}

impl GizmoVertex {
    pub fn new(position: Vec3, color: Vec4) -> Self {
        Self {
            position,
            _padding: 1.0,
            color,
        }
    }
}

impl BufferLayout for GizmoVertex {
    fn layout() -> wgpu::VertexBufferLayout<'static> {
        const VERTEX_ATTR_ARRAY: &[wgpu::VertexAttribute] = &vertex_attr_array![
            0 => Float32x4, // position
            1 => Float32x4, // color
        ];

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: VERTEX_ATTR_ARRAY,
        }
    }
}

/// Draws colored line lists, depth tested against the rest of the scene.
pub struct GizmosRenderer {
    pipeline: wgpu::RenderPipeline,
}

impl GizmosRenderer {
    pub fn new(renderer: &Renderer, camera_bind_group_layout: &wgpu::BindGroupLayout) -> Self {
        let module = renderer
            .device
            .create_shader_module(wgsl_shader!("gizmos"));

        let pipeline = renderer
            .build_render_pipeline::<GizmoVertex>("gizmos", &module)
            .binding(camera_bind_group_layout)
            .with_primitive(wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            })
            .with_depth_compare(wgpu::CompareFunction::LessEqual)
            .with_blend(wgpu::BlendState::ALPHA_BLENDING)
            .build();

        Self { pipeline }
    }

    pub fn render_frame(
        &self,
        frame: &mut Frame,
        depth_buffer: &DepthBuffer,
        camera_bind_group: &wgpu::BindGroup,
        vertices: &[GizmoVertex],
    ) {
        if vertices.is_empty() {
            return;
        }

        let vertex_buffer =
            frame
                .renderer
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("gizmos_vertex_buffer"),
                    contents: bytemuck::cast_slice(vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });

        let mut render_pass = frame
            .encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("gizmos_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.surface,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(depth_buffer.load_attachment()),
                ..Default::default()
            });

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
        render_pass.set_bind_group(0, camera_bind_group, &[]);
        render_pass.draw(0..(vertices.len() as u32), 0..1);
    }

    /// Red, green and blue lines along the X, Y and Z axes of `transform`.
    pub fn create_axis(transform: Mat4, size: f32) -> Vec<GizmoVertex> {
        let zero = transform.transform_point3(Vec3::ZERO);
        [
            (Vec3::X, Vec4::new(1.0, 0.0, 0.0, 1.0)),
            (Vec3::Y, Vec4::new(0.0, 1.0, 0.0, 1.0)),
            (Vec3::Z, Vec4::new(0.0, 0.0, 1.0, 1.0)),
        ]
        .into_iter()
        .flat_map(|(axis, color)| {
            [
                GizmoVertex::new(zero, color),
                GizmoVertex::new(transform.transform_point3(axis * size), color),
            ]
        })
        .collect()
    }

    /// A square grid on the XZ plane centered on the origin. The two lines through the origin use
    /// `center_color`.
    pub fn create_grid(
        size: f32,
        divisions: u32,
        center_color: Vec4,
        color: Vec4,
    ) -> Vec<GizmoVertex> {
        let half = size / 2.0;
        let step = size / divisions as f32;

        (0..=divisions)
            .flat_map(|i| {
                let k = -half + i as f32 * step;
                let color = if i * 2 == divisions { center_color } else { color };
                [
                    GizmoVertex::new(Vec3::new(-half, 0.0, k), color),
                    GizmoVertex::new(Vec3::new(half, 0.0, k), color),
                    GizmoVertex::new(Vec3::new(k, 0.0, -half), color),
                    GizmoVertex::new(Vec3::new(k, 0.0, half), color),
                ]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_covers_the_floor() {
        let center = Vec4::new(1.0, 0.0, 0.0, 1.0);
        let other = Vec4::new(0.0, 1.0, 0.0, 1.0);
        let grid = GizmosRenderer::create_grid(20.0, 40, center, other);

        assert_eq!(grid.len(), 41 * 4);
        assert!(grid.iter().all(|v| v.position.y == 0.0));
        assert!(
            grid.iter()
                .all(|v| v.position.x.abs() <= 10.0 && v.position.z.abs() <= 10.0)
        );

        let centered: Vec<_> = grid.iter().filter(|v| v.color == center).collect();
        assert_eq!(centered.len(), 4);
        assert!(centered.iter().all(|v| v.position.x == 0.0 || v.position.z == 0.0));
    }

    #[test]
    fn axis_follows_the_transform() {
        let transform = Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0));
        let axis = GizmosRenderer::create_axis(transform, 0.5);
        assert_eq!(axis.len(), 6);
        assert_eq!(axis[0].position, Vec3::Y);
        assert_eq!(axis[3].position, Vec3::new(0.0, 1.5, 0.0));
    }
}
