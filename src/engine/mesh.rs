use std::f32::consts::{PI, TAU};

use glam::{Mat3, Mat4, Vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self { position, normal }
    }
}

/// Indexed triangle list geometry on the CPU. Triangles wind counter clockwise when looking at the
/// front face.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    /// A UV sphere centered on the origin.
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);

        let mut mesh = Self::default();

        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                let normal = Vec3::new(
                    -(u * TAU).cos() * (v * PI).sin(),
                    (v * PI).cos(),
                    (u * TAU).sin() * (v * PI).sin(),
                );
                mesh.vertices.push(Vertex::new(normal * radius, normal));
            }
        }

        let row = width_segments + 1;
        for iy in 0..height_segments {
            for ix in 0..width_segments {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;

                // The poles collapse one triangle of each quad.
                if iy != 0 {
                    mesh.indices.extend([a, b, d]);
                }
                if iy != height_segments - 1 {
                    mesh.indices.extend([b, c, d]);
                }
            }
        }

        mesh
    }

    /// An axis aligned box centered on the origin.
    pub fn cuboid(size: Vec3) -> Self {
        let half = size / 2.0;
        let mut mesh = Self::default();

        for (normal, up) in [
            (Vec3::X, Vec3::Y),
            (Vec3::NEG_X, Vec3::Y),
            (Vec3::Y, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::Z),
            (Vec3::Z, Vec3::Y),
            (Vec3::NEG_Z, Vec3::Y),
        ] {
            let right = up.cross(normal);
            let base = mesh.vertices.len() as u32;
            for (r, u) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let corner = normal + right * r + up * u;
                mesh.vertices.push(Vertex::new(corner * half, normal));
            }
            mesh.indices
                .extend([base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        mesh
    }

    /// A capped cylinder along the Y axis, centered on the origin, with `radius_top` at
    /// `y = height / 2` and `radius_bottom` at `y = -height / 2`.
    pub fn cylinder(
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        radial_segments: u32,
    ) -> Self {
        let radial_segments = radial_segments.max(3);
        let half_height = height / 2.0;
        let slope = (radius_bottom - radius_top) / height;

        let mut mesh = Self::default();

        // Side wall, top ring first.
        for (y, radius) in [(half_height, radius_top), (-half_height, radius_bottom)] {
            for x in 0..=radial_segments {
                let theta = x as f32 / radial_segments as f32 * TAU;
                let (sin, cos) = theta.sin_cos();
                mesh.vertices.push(Vertex::new(
                    Vec3::new(radius * sin, y, radius * cos),
                    Vec3::new(sin, slope, cos).normalize(),
                ));
            }
        }

        let row = radial_segments + 1;
        for x in 0..radial_segments {
            let a = x;
            let b = row + x;
            let c = row + x + 1;
            let d = x + 1;
            mesh.indices.extend([a, b, d, b, c, d]);
        }

        // Caps.
        for (y, radius, normal) in [
            (half_height, radius_top, Vec3::Y),
            (-half_height, radius_bottom, Vec3::NEG_Y),
        ] {
            if radius <= 0.0 {
                continue;
            }

            let center = mesh.vertices.len() as u32;
            mesh.vertices
                .push(Vertex::new(Vec3::new(0.0, y, 0.0), normal));
            for x in 0..=radial_segments {
                let theta = x as f32 / radial_segments as f32 * TAU;
                let (sin, cos) = theta.sin_cos();
                mesh.vertices
                    .push(Vertex::new(Vec3::new(radius * sin, y, radius * cos), normal));
            }

            for x in 0..radial_segments {
                let i = center + 1 + x;
                if normal.y > 0.0 {
                    mesh.indices.extend([i, i + 1, center]);
                } else {
                    mesh.indices.extend([i + 1, i, center]);
                }
            }
        }

        mesh
    }

    /// Return a copy of the mesh with every vertex moved by `transform`.
    pub fn transformed(&self, transform: &Mat4) -> Self {
        let normal_matrix = Mat3::from_mat4(*transform).inverse().transpose();
        Self {
            vertices: self
                .vertices
                .iter()
                .map(|v| {
                    Vertex::new(
                        transform.transform_point3(v.position),
                        (normal_matrix * v.normal).normalize_or_zero(),
                    )
                })
                .collect(),
            indices: self.indices.clone(),
        }
    }
}
