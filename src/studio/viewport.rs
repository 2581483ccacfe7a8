use glam::{Mat4, UVec2, Vec3, Vec4};
use smplx::{CameraConfig, JointTable, Skeleton};
use tracing::warn;

use super::{
    camera::{self, GpuCamera, OrbitController},
    state::StudioState,
    visuals::{SkeletonVisuals, linear_rgb},
};
use crate::engine::{
    depth_buffer::DepthBuffer,
    gizmos::{GizmoVertex, GizmosRenderer},
    prelude::*,
};

const CLEAR_COLOR: u32 = 0x050505;

const GRID_SIZE: f32 = 20.0;
const GRID_DIVISIONS: u32 = 40;
const GRID_CENTER_COLOR: u32 = 0x222222;
const GRID_COLOR: u32 = 0x111111;

const ROOT_AXIS_SIZE: f32 = 0.2;

/// Renders the posed skeleton, the floor grid and optional bone lines.
pub struct Viewport {
    skeleton: Skeleton,
    visuals: SkeletonVisuals,

    gpu_camera: GpuCamera,
    orbit: OrbitController,
    gizmos: GizmosRenderer,
    depth_buffer: DepthBuffer,

    grid: Vec<GizmoVertex>,
    /// World transforms of the last pose that was applied.
    world: Vec<Mat4>,
    size: UVec2,
}

impl Viewport {
    pub fn new(renderer: &Renderer, table: &JointTable, size: UVec2) -> Self {
        let skeleton = Skeleton::build(table);

        let gpu_camera = GpuCamera::new(renderer);
        let visuals = SkeletonVisuals::new(renderer, &skeleton, &gpu_camera.bind_group_layout);
        let gizmos = GizmosRenderer::new(renderer, &gpu_camera.bind_group_layout);
        let depth_buffer = DepthBuffer::new(&renderer.device, size);

        let grid = GizmosRenderer::create_grid(
            GRID_SIZE,
            GRID_DIVISIONS,
            linear_rgb(GRID_CENTER_COLOR).extend(1.0),
            linear_rgb(GRID_COLOR).extend(1.0),
        );

        let world = skeleton.world_transforms();

        Self {
            skeleton,
            visuals,
            gpu_camera,
            orbit: OrbitController::default(),
            gizmos,
            depth_buffer,
            grid,
            world,
            size,
        }
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn resize(&mut self, renderer: &Renderer, size: UVec2) {
        self.size = size;
        self.depth_buffer.resize(&renderer.device, size);
    }

    /// Orbit the camera with whatever mouse input the panel did not consume.
    pub fn handle_input(&self, input: &InputState, camera: &mut Tracked<CameraConfig>) {
        self.orbit.on_input(input, camera);
    }

    /// Bring the GPU side up to date with whatever changed in the state since the last call.
    pub fn sync(&mut self, queue: &wgpu::Queue, state: &StudioState) {
        state.params.if_changed(|params| {
            match self.skeleton.apply_pose(params) {
                Ok(()) => {
                    self.world = self.skeleton.world_transforms();
                    self.visuals.update(queue, &self.world);
                }
                // The previous pose is still valid, keep showing it.
                Err(err) => warn!("Ignoring pose update: {err}"),
            }
        });

        state.camera.if_changed(|camera| {
            let aspect_ratio = self.size.x as f32 / self.size.y.max(1) as f32;
            let matrices = camera::calculate_matrices(camera, aspect_ratio);
            self.gpu_camera
                .upload_matrices(queue, &matrices, camera.position);
        });
    }

    pub fn render(&self, frame: &mut Frame, show_bones: bool) {
        self.clear(frame);

        let mut lines = self.grid.clone();
        if show_bones {
            lines.extend(self.bone_lines());
            if let Some(root) = self.world.first() {
                lines.extend(GizmosRenderer::create_axis(*root, ROOT_AXIS_SIZE));
            }
        }

        self.gizmos.render_frame(
            frame,
            &self.depth_buffer,
            &self.gpu_camera.bind_group,
            &lines,
        );

        self.visuals
            .render(frame, &self.depth_buffer, &self.gpu_camera.bind_group);
    }

    /// A line from every joint to its parent.
    fn bone_lines(&self) -> Vec<GizmoVertex> {
        let color = Vec4::new(1.0, 0.85, 0.2, 1.0);
        let position = |index: usize| self.world[index].transform_point3(Vec3::ZERO);

        self.skeleton
            .joints()
            .iter()
            .enumerate()
            .filter_map(|(index, joint)| joint.parent.map(|parent| (parent, index)))
            .filter(|&(parent, index)| parent < self.world.len() && index < self.world.len())
            .flat_map(|(parent, index)| {
                [
                    GizmoVertex::new(position(parent), color),
                    GizmoVertex::new(position(index), color),
                ]
            })
            .collect()
    }

    fn clear(&self, frame: &mut Frame) {
        let clear = linear_rgb(CLEAR_COLOR);
        let _render_pass = frame
            .encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("viewport_clear_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.surface,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear.x as f64,
                            g: clear.y as f64,
                            b: clear.z as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(self.depth_buffer.clear_attachment()),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
    }
}
