use glam::{Mat4, Vec3};

use crate::{joints::JointTable, params::PoseParameters, proxy::Proxy, transform::Transform};

/// How much the first shape coefficient stretches joint offsets vertically.
const STATURE_PER_BETA: f32 = 0.05;
/// How much the second shape coefficient stretches joint offsets sideways.
const WIDTH_PER_BETA: f32 = 0.1;

#[derive(Clone, Debug)]
pub struct Joint {
    pub name: String,
    pub parent: Option<usize>,
    pub rest_offset: Vec3,
    /// Transform relative to the parent joint.
    pub local: Transform,
    /// The limb shape attached to this joint, if any.
    pub proxy: Option<Proxy>,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PoseError {
    #[error("Pose produces a non-finite transform for joint {joint} ({name})")]
    NonFinite { joint: usize, name: String },
}

/// An articulated joint hierarchy stored as a flat list where every parent comes before its
/// children.
#[derive(Clone, Debug)]
pub struct Skeleton {
    joints: Vec<Joint>,
}

impl Skeleton {
    /// Link one joint per table entry and place every joint at its rest offset.
    pub fn build(table: &JointTable) -> Self {
        let joints = table
            .iter()
            .enumerate()
            .map(|(index, def)| Joint {
                name: def.name.clone(),
                parent: table.parent(index),
                rest_offset: def.rest_offset,
                local: Transform::from_translation(def.rest_offset),
                proxy: Proxy::for_joint(&def.name),
            })
            .collect();

        Self { joints }
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn root(&self) -> usize {
        0
    }

    pub fn find(&self, name: &str) -> Option<usize> {
        self.joints.iter().position(|joint| joint.name == name)
    }

    /// Set every joint's local transform from the parameters. Rotations are absolute, so applying
    /// the same parameters again changes nothing. Joints without a full rotation vector in
    /// `body_pose` are left as they are.
    ///
    /// If any resulting transform is not finite, nothing is changed.
    pub fn apply_pose(&mut self, params: &PoseParameters) -> Result<(), PoseError> {
        let stature = 1.0 + params.beta(0) * STATURE_PER_BETA;
        let width = 1.0 + params.beta(1) * WIDTH_PER_BETA;

        let mut locals: Vec<Transform> = self.joints.iter().map(|joint| joint.local).collect();

        let root = self.root();
        if let Some(local) = locals.get_mut(root) {
            local.translation = self.joints[root].rest_offset + params.transl;
        }

        for (index, joint) in self.joints.iter().enumerate() {
            let Some(rotation_vector) = params.joint_rotation_vector(index) else {
                continue;
            };

            let local = &mut locals[index];
            local.rotation = Transform::rotation_from_axis_angle(rotation_vector);

            if index != root {
                let rest = joint.rest_offset;
                local.translation = Vec3::new(rest.x * width, rest.y * stature, rest.z);
            }
        }

        if let Some(joint) = locals.iter().position(|local| !local.is_finite()) {
            return Err(PoseError::NonFinite {
                joint,
                name: self.joints[joint].name.clone(),
            });
        }

        for (joint, local) in self.joints.iter_mut().zip(locals) {
            joint.local = local;
        }

        Ok(())
    }

    /// Compose the local transforms down the hierarchy. A single pass is enough because parents
    /// always come before their children.
    pub fn world_transforms(&self) -> Vec<Mat4> {
        let mut world: Vec<Mat4> = Vec::with_capacity(self.joints.len());
        for joint in &self.joints {
            let local = joint.local.to_mat4();
            let transform = match joint.parent {
                Some(parent) => world[parent] * local,
                None => local,
            };
            world.push(transform);
        }
        world
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, PI};

    use glam::Quat;

    use super::*;
    use crate::joints::{BODY_JOINT_COUNT, JointDef};

    fn body() -> Skeleton {
        Skeleton::build(&JointTable::smplx_body().unwrap())
    }

    #[test]
    fn parents_follow_the_table() {
        let table = JointTable::smplx_body().unwrap();
        let skeleton = Skeleton::build(&table);

        assert_eq!(skeleton.len(), BODY_JOINT_COUNT);
        for (index, joint) in skeleton.joints().iter().enumerate() {
            assert_eq!(joint.parent, table.parent(index));
            if let Some(parent) = joint.parent {
                assert!(parent < index);
            }
        }

        let roots = skeleton
            .joints()
            .iter()
            .filter(|joint| joint.parent.is_none())
            .count();
        assert_eq!(roots, 1);
        assert_eq!(skeleton.joints()[skeleton.root()].name, "Pelvis");
    }

    #[test]
    fn proxies_are_attached_by_name() {
        let skeleton = body();
        let head = skeleton.find("Head").unwrap();
        let foot = skeleton.find("L_Foot").unwrap();
        assert!(skeleton.joints()[head].proxy.is_some());
        assert!(skeleton.joints()[foot].proxy.is_none());
    }

    #[test]
    fn zero_pose_is_identity() {
        let mut skeleton = body();
        skeleton.apply_pose(&PoseParameters::default()).unwrap();
        for joint in skeleton.joints() {
            assert_eq!(joint.local.rotation, Quat::IDENTITY);
        }
    }

    #[test]
    fn rotation_vectors_become_axis_angle_rotations() {
        let axis = Vec3::new(1.0, 2.0, -0.5).normalize();
        for angle in [0.001, FRAC_PI_2, PI] {
            let mut params = PoseParameters::default();
            params.set_joint_rotation_vector(4, axis * angle);

            let mut skeleton = body();
            skeleton.apply_pose(&params).unwrap();

            let expected = Quat::from_axis_angle(axis, angle);
            let actual = skeleton.joints()[4].local.rotation;
            assert!(
                actual.abs_diff_eq(expected, 1e-5),
                "angle {angle}: {actual:?} != {expected:?}"
            );
        }
    }

    #[test]
    fn applying_twice_does_not_accumulate() {
        let mut params = PoseParameters::default();
        params.set_joint_rotation_vector(1, Vec3::new(0.3, -0.2, 0.1));
        params.set_joint_rotation_vector(18, Vec3::new(0.0, 0.0, 1.2));
        params.betas[0] = 1.5;
        params.transl = Vec3::new(0.1, 0.0, -0.2);

        let mut once = body();
        once.apply_pose(&params).unwrap();
        let mut twice = body();
        twice.apply_pose(&params).unwrap();
        twice.apply_pose(&params).unwrap();

        for (a, b) in once.joints().iter().zip(twice.joints()) {
            assert_eq!(a.local, b.local);
        }
    }

    #[test]
    fn root_rotation_about_y() {
        let mut params = PoseParameters::default();
        params.body_pose[0..3].copy_from_slice(&[0.0, FRAC_PI_2, 0.0]);

        let mut skeleton = body();
        skeleton.apply_pose(&params).unwrap();

        let root = skeleton.joints()[0].local.rotation;
        assert!(root.abs_diff_eq(Quat::from_rotation_y(FRAC_PI_2), 1e-6));
        for joint in &skeleton.joints()[1..] {
            assert_eq!(joint.local.rotation, Quat::IDENTITY);
        }

        // Children swing with the root: the left hip at +X ends up at -Z.
        let world = skeleton.world_transforms();
        let hip = world[1].transform_point3(Vec3::ZERO);
        assert!(hip.abs_diff_eq(Vec3::new(0.0, 0.95, -0.08), 1e-5));
    }

    #[test]
    fn translation_moves_the_root_only() {
        let mut params = PoseParameters::default();
        params.transl = Vec3::new(1.0, -0.5, 2.0);

        let mut skeleton = body();
        skeleton.apply_pose(&params).unwrap();

        assert_eq!(
            skeleton.joints()[0].local.translation,
            Vec3::new(1.0, 0.5, 2.0)
        );
        assert_eq!(
            skeleton.joints()[1].local.translation,
            Vec3::new(0.08, -0.05, 0.0)
        );
    }

    #[test]
    fn betas_scale_offsets() {
        let mut params = PoseParameters::default();
        params.betas[0] = 2.0;
        params.betas[1] = -1.0;

        let mut skeleton = body();
        skeleton.apply_pose(&params).unwrap();

        let collar = skeleton.joints()[13].local.translation;
        assert!(collar.abs_diff_eq(Vec3::new(0.05 * 0.9, 0.12 * 1.1, 0.0), 1e-6));

        let foot = skeleton.joints()[10].local.translation;
        assert!(foot.abs_diff_eq(Vec3::new(0.0, -0.05 * 1.1, 0.1), 1e-6));

        // The root ignores shape.
        assert_eq!(skeleton.joints()[0].local.translation, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn short_body_pose_skips_missing_joints() {
        let mut skeleton = body();

        let mut params = PoseParameters::default();
        params.set_joint_rotation_vector(5, Vec3::new(0.0, 0.0, 0.5));
        skeleton.apply_pose(&params).unwrap();
        let before = skeleton.joints()[5].local;

        let mut short = PoseParameters::default();
        short.body_pose.truncate(6);
        short.betas[0] = 3.0;
        skeleton.apply_pose(&short).unwrap();

        assert_eq!(skeleton.joints()[5].local, before);
        assert_eq!(skeleton.joints()[1].local.rotation, Quat::IDENTITY);
        assert!(
            skeleton.joints()[1]
                .local
                .translation
                .abs_diff_eq(Vec3::new(0.08, -0.05 * 1.15, 0.0), 1e-6)
        );
    }

    #[test]
    fn non_finite_pose_keeps_previous_state() {
        let mut skeleton = body();
        let mut params = PoseParameters::default();
        params.set_joint_rotation_vector(2, Vec3::new(0.2, 0.0, 0.0));
        skeleton.apply_pose(&params).unwrap();
        let before: Vec<Transform> = skeleton.joints().iter().map(|j| j.local).collect();

        let mut broken = params.clone();
        broken.body_pose[0] = 0.5;
        broken.body_pose[20] = f32::NAN;
        let err = skeleton.apply_pose(&broken).unwrap_err();
        assert!(matches!(err, PoseError::NonFinite { joint: 6, .. }));

        let after: Vec<Transform> = skeleton.joints().iter().map(|j| j.local).collect();
        assert_eq!(before, after);

        let mut broken = params;
        broken.transl.y = f32::INFINITY;
        assert!(skeleton.apply_pose(&broken).is_err());
    }

    #[test]
    fn small_tables_work() {
        let table = JointTable::new(vec![
            JointDef::new("root", -1, Vec3::ZERO),
            JointDef::new("child", 0, Vec3::X),
        ])
        .unwrap();
        let skeleton = Skeleton::build(&table);
        let world = skeleton.world_transforms();
        assert_eq!(world[1].transform_point3(Vec3::ZERO), Vec3::X);
    }
}
