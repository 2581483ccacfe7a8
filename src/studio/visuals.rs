use egui::ecolor::linear_f32_from_gamma_u8;
use glam::{Mat4, Vec3};
use smplx::{Proxy, ProxyShape, Skeleton};
use wgpu::vertex_attr_array;

use crate::{
    engine::{depth_buffer::DepthBuffer, mesh::Mesh, prelude::*},
    wgsl_shader,
};

#[derive(Clone, Copy, Debug, bytemuck::NoUninit)]
#[repr(C)]
pub struct ProxyVertex {
    position: Vec3,
    normal: Vec3,
    color: [f32; 4],
    emissive: [f32; 4],
}

impl BufferLayout for ProxyVertex {
    fn layout() -> wgpu::VertexBufferLayout<'static> {
        const VERTEX_ATTR_ARRAY: &[wgpu::VertexAttribute] = &vertex_attr_array![
            0 => Float32x3, // position
            1 => Float32x3, // normal
            2 => Float32x4, // color
            3 => Float32x4, // emissive
        ];

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: VERTEX_ATTR_ARRAY,
        }
    }
}

/// Convert a `0xRRGGBB` sRGB color to linear components.
pub fn linear_rgb(hex: u32) -> Vec3 {
    let [_, r, g, b] = hex.to_be_bytes();
    Vec3::new(
        linear_f32_from_gamma_u8(r),
        linear_f32_from_gamma_u8(g),
        linear_f32_from_gamma_u8(b),
    )
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub color: [f32; 4],
    pub emissive: [f32; 4],
}

impl Material {
    /// Glowing white dot drawn at every joint.
    pub fn joint_marker() -> Self {
        Self {
            color: [1.0, 1.0, 1.0, 1.0],
            emissive: (Vec3::ONE * 0.8).extend(0.0).to_array(),
        }
    }

    /// Translucent blue limb.
    pub fn limb() -> Self {
        Self {
            color: linear_rgb(0x0088ff).extend(0.85).to_array(),
            emissive: linear_rgb(0x001133).extend(0.0).to_array(),
        }
    }
}

/// Tessellation of a proxy shape in joint space.
pub fn proxy_mesh(proxy: &Proxy) -> Mesh {
    let mesh = match proxy.shape {
        ProxyShape::Sphere { radius } => {
            // Small markers don't need as many triangles as the head.
            let segments = if radius < 0.05 { 12 } else { 32 };
            Mesh::sphere(radius, segments, segments)
        }
        ProxyShape::Cuboid { size } => Mesh::cuboid(size),
        ProxyShape::Cylinder {
            radius_top,
            radius_bottom,
            height,
        } => Mesh::cylinder(radius_top, radius_bottom, height, 12),
    };
    mesh.transformed(&proxy.placement.to_mat4())
}

/// A piece of geometry attached to a joint.
struct Part {
    joint: usize,
    mesh: Mesh,
    material: Material,
}

/// Markers come first so the translucent limbs are blended over them.
fn build_parts(skeleton: &Skeleton) -> Vec<Part> {
    let marker = proxy_mesh(&Proxy::marker());

    let markers = (0..skeleton.len()).map(|joint| Part {
        joint,
        mesh: marker.clone(),
        material: Material::joint_marker(),
    });

    let limbs = skeleton
        .joints()
        .iter()
        .enumerate()
        .filter_map(|(joint, j)| {
            j.proxy.as_ref().map(|proxy| Part {
                joint,
                mesh: proxy_mesh(proxy),
                material: Material::limb(),
            })
        });

    markers.chain(limbs).collect()
}

fn part_indices(parts: &[Part]) -> Vec<u32> {
    let mut indices = Vec::new();
    let mut base = 0;
    for part in parts {
        indices.extend(part.mesh.indices.iter().map(|i| i + base));
        base += part.mesh.vertices.len() as u32;
    }
    indices
}

/// Move every part's vertices into world space. Joint transforms are rigid, so normals only need
/// the rotation.
fn pose_vertices(parts: &[Part], world: &[Mat4], out: &mut Vec<ProxyVertex>) {
    out.clear();
    for part in parts {
        let transform = world.get(part.joint).copied().unwrap_or(Mat4::IDENTITY);
        out.extend(part.mesh.vertices.iter().map(|v| ProxyVertex {
            position: transform.transform_point3(v.position),
            normal: transform.transform_vector3(v.normal).normalize_or_zero(),
            color: part.material.color,
            emissive: part.material.emissive,
        }));
    }
}

/// The GPU side of a skeleton: every proxy tessellated once into one static index buffer and one
/// vertex buffer that is rewritten whenever the pose changes.
pub struct SkeletonVisuals {
    parts: Vec<Part>,
    vertices: Vec<ProxyVertex>,

    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,

    pipeline: wgpu::RenderPipeline,
}

impl SkeletonVisuals {
    pub fn new(
        renderer: &Renderer,
        skeleton: &Skeleton,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let parts = build_parts(skeleton);

        let mut vertices = Vec::new();
        pose_vertices(&parts, &skeleton.world_transforms(), &mut vertices);
        let indices = part_indices(&parts);

        let vertex_buffer = renderer.create_vertex_buffer("skeleton_vertex_buffer", &vertices);
        let index_buffer = renderer.create_index_buffer("skeleton_index_buffer", &indices);

        let module = renderer
            .device
            .create_shader_module(wgsl_shader!("proxies"));

        let pipeline = renderer
            .build_render_pipeline::<ProxyVertex>("skeleton_proxies", &module)
            .binding(camera_bind_group_layout)
            .with_primitive(wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            })
            .with_depth_compare(wgpu::CompareFunction::Less)
            .with_depth_writes(true)
            .with_blend(wgpu::BlendState::ALPHA_BLENDING)
            .build();

        tracing::info!(
            "Created skeleton visuals with {} parts, {} vertices",
            parts.len(),
            vertices.len()
        );

        Self {
            parts,
            vertices,
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            pipeline,
        }
    }

    /// Pose the proxies with new joint world transforms.
    pub fn update(&mut self, queue: &wgpu::Queue, world: &[Mat4]) {
        pose_vertices(&self.parts, world, &mut self.vertices);
        queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&self.vertices));
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        depth_buffer: &DepthBuffer,
        camera_bind_group: &wgpu::BindGroup,
    ) {
        let mut render_pass = frame
            .encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("skeleton_render_pass"),
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
        render_pass.set_bind_group(0, camera_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}
