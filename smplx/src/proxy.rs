use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};

use crate::transform::Transform;

/// Radius of the marker sphere every joint gets.
pub const JOINT_MARKER_RADIUS: f32 = 0.025;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProxyShape {
    Sphere {
        radius: f32,
    },
    Cuboid {
        size: Vec3,
    },
    /// A cylinder along the Y axis, centered on the origin, with `radius_top` at `+height / 2`.
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
    },
}

/// The shape drawn for a joint, placed relative to the joint's origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Proxy {
    pub shape: ProxyShape,
    pub placement: Transform,
}

impl Proxy {
    /// Pick the limb proxy for a joint by its name. The first matching rule wins; joints matching
    /// no rule only get the marker.
    pub fn for_joint(name: &str) -> Option<Self> {
        const LEG: [&str; 3] = ["Hip", "Knee", "Ankle"];
        const ARM: [&str; 4] = ["Shoulder", "Elbow", "Wrist", "Collar"];

        if name.contains("Head") {
            Some(Self {
                shape: ProxyShape::Sphere { radius: 0.12 },
                placement: Transform::default(),
            })
        } else if name == "Pelvis" || name.contains("Spine") {
            Some(Self {
                shape: ProxyShape::Cuboid {
                    size: Vec3::new(0.22, 0.12, 0.18),
                },
                placement: Transform::from_translation(Vec3::new(0.0, 0.05, 0.0)),
            })
        } else if LEG.iter().any(|part| name.contains(part)) {
            let height = 0.35;
            Some(Self {
                shape: ProxyShape::Cylinder {
                    radius_top: 0.06,
                    radius_bottom: 0.04,
                    height,
                },
                placement: Transform::from_translation(Vec3::new(0.0, -height / 2.0, 0.0)),
            })
        } else if ARM.iter().any(|part| name.contains(part)) {
            let height = 0.25;
            let side = if name.starts_with("L_") { 1.0 } else { -1.0 };
            Some(Self {
                shape: ProxyShape::Cylinder {
                    radius_top: 0.05,
                    radius_bottom: 0.03,
                    height,
                },
                placement: Transform::new(
                    Vec3::new(side * height / 2.0, 0.0, 0.0),
                    Quat::from_rotation_z(FRAC_PI_2),
                ),
            })
        } else {
            None
        }
    }

    pub fn marker() -> Self {
        Self {
            shape: ProxyShape::Sphere {
                radius: JOINT_MARKER_RADIUS,
            },
            placement: Transform::default(),
        }
    }
}
