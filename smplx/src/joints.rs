use std::collections::HashSet;

use glam::Vec3;

/// Parent index used by the root joint.
pub const ROOT_PARENT: i32 = -1;

/// Number of body joints in the SMPL-X body table.
pub const BODY_JOINT_COUNT: usize = 22;

/// A single entry in a joint table.
#[derive(Clone, Debug, PartialEq)]
pub struct JointDef {
    pub name: String,
    /// Index of the parent joint, [ROOT_PARENT] for the root.
    pub parent: i32,
    /// Translation from the parent joint in the rest pose.
    pub rest_offset: Vec3,
}

impl JointDef {
    pub fn new(name: impl Into<String>, parent: i32, rest_offset: Vec3) -> Self {
        Self {
            name: name.into(),
            parent,
            rest_offset,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum JointTableError {
    #[error("The joint table is empty")]
    Empty,
    #[error("The first joint ({name}) must be the root, but has parent {parent}")]
    RootNotFirst { name: String, parent: i32 },
    #[error("Joint {index} ({name}) has no parent; only the first joint may be a root")]
    MultipleRoots { index: usize, name: String },
    #[error("Joint {index} ({name}) references parent {parent} which is not an earlier joint")]
    ForwardReference {
        index: usize,
        name: String,
        parent: i32,
    },
    #[error("Joint name {0} is used more than once")]
    DuplicateName(String),
    #[error("Joint {index} ({name}) has a non-finite rest offset")]
    NonFiniteOffset { index: usize, name: String },
}

/// An ordered joint hierarchy where every parent comes before its children. This lets a skeleton
/// be linked in a single forward pass.
#[derive(Clone, Debug)]
pub struct JointTable {
    joints: Vec<JointDef>,
}

impl JointTable {
    pub fn new(joints: Vec<JointDef>) -> Result<Self, JointTableError> {
        validate(&joints)?;
        Ok(Self { joints })
    }

    /// The 22 joint SMPL-X body hierarchy in its T-pose.
    pub fn smplx_body() -> Result<Self, JointTableError> {
        Self::new(Self::smplx_body_joints())
    }

    pub fn smplx_body_joints() -> Vec<JointDef> {
        const TABLE: [(&str, i32, [f32; 3]); BODY_JOINT_COUNT] = [
            ("Pelvis", -1, [0.0, 1.0, 0.0]),
            ("L_Hip", 0, [0.08, -0.05, 0.0]),
            ("R_Hip", 0, [-0.08, -0.05, 0.0]),
            ("Spine1", 0, [0.0, 0.1, 0.0]),
            ("L_Knee", 1, [0.0, -0.4, 0.0]),
            ("R_Knee", 2, [0.0, -0.4, 0.0]),
            ("Spine2", 3, [0.0, 0.12, 0.0]),
            ("L_Ankle", 4, [0.0, -0.4, 0.0]),
            ("R_Ankle", 5, [0.0, -0.4, 0.0]),
            ("Spine3", 6, [0.0, 0.12, 0.0]),
            ("L_Foot", 7, [0.0, -0.05, 0.1]),
            ("R_Foot", 8, [0.0, -0.05, 0.1]),
            ("Neck", 9, [0.0, 0.15, 0.0]),
            ("L_Collar", 9, [0.05, 0.12, 0.0]),
            ("R_Collar", 9, [-0.05, 0.12, 0.0]),
            ("Head", 12, [0.0, 0.1, 0.0]),
            ("L_Shoulder", 13, [0.12, 0.0, 0.0]),
            ("R_Shoulder", 14, [-0.12, 0.0, 0.0]),
            ("L_Elbow", 16, [0.25, 0.0, 0.0]),
            ("R_Elbow", 17, [-0.25, 0.0, 0.0]),
            ("L_Wrist", 18, [0.22, 0.0, 0.0]),
            ("R_Wrist", 19, [-0.22, 0.0, 0.0]),
        ];

        TABLE
            .iter()
            .map(|&(name, parent, offset)| JointDef::new(name, parent, Vec3::from_array(offset)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&JointDef> {
        self.joints.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &JointDef> {
        self.joints.iter()
    }

    /// Parent of the joint at `index`, `None` for the root.
    pub fn parent(&self, index: usize) -> Option<usize> {
        self.joints
            .get(index)
            .and_then(|joint| usize::try_from(joint.parent).ok())
    }
}

fn validate(joints: &[JointDef]) -> Result<(), JointTableError> {
    let Some(first) = joints.first() else {
        return Err(JointTableError::Empty);
    };
    if first.parent != ROOT_PARENT {
        return Err(JointTableError::RootNotFirst {
            name: first.name.clone(),
            parent: first.parent,
        });
    }

    let mut names = HashSet::with_capacity(joints.len());
    for (index, joint) in joints.iter().enumerate() {
        if index > 0 {
            if joint.parent < 0 {
                return Err(JointTableError::MultipleRoots {
                    index,
                    name: joint.name.clone(),
                });
            }
            if joint.parent as usize >= index {
                return Err(JointTableError::ForwardReference {
                    index,
                    name: joint.name.clone(),
                    parent: joint.parent,
                });
            }
        }

        if !joint.rest_offset.is_finite() {
            return Err(JointTableError::NonFiniteOffset {
                index,
                name: joint.name.clone(),
            });
        }

        if !names.insert(joint.name.as_str()) {
            return Err(JointTableError::DuplicateName(joint.name.clone()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(name: &str, parent: i32) -> JointDef {
        JointDef::new(name, parent, Vec3::Y)
    }

    #[test]
    fn body_table_is_valid() {
        let table = JointTable::smplx_body().unwrap();
        assert_eq!(table.len(), BODY_JOINT_COUNT);
        assert_eq!(table.parent(0), None);
        assert_eq!(table.parent(15), Some(12));
        assert_eq!(table.get(21).unwrap().name, "R_Wrist");
    }

    #[test]
    fn empty_table() {
        assert_eq!(JointTable::new(vec![]).unwrap_err(), JointTableError::Empty);
    }

    #[test]
    fn root_must_come_first() {
        let err = JointTable::new(vec![def("a", 1), def("b", -1)]).unwrap_err();
        assert!(matches!(err, JointTableError::RootNotFirst { .. }));
    }

    #[test]
    fn second_root_is_rejected() {
        let err = JointTable::new(vec![def("a", -1), def("b", -1)]).unwrap_err();
        assert_eq!(
            err,
            JointTableError::MultipleRoots {
                index: 1,
                name: String::from("b")
            }
        );
    }

    #[test]
    fn forward_and_self_references_are_rejected() {
        let err = JointTable::new(vec![def("a", -1), def("b", 2), def("c", 0)]).unwrap_err();
        assert!(matches!(
            err,
            JointTableError::ForwardReference { index: 1, parent: 2, .. }
        ));

        let err = JointTable::new(vec![def("a", -1), def("b", 1)]).unwrap_err();
        assert!(matches!(
            err,
            JointTableError::ForwardReference { index: 1, parent: 1, .. }
        ));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = JointTable::new(vec![def("a", -1), def("a", 0)]).unwrap_err();
        assert_eq!(err, JointTableError::DuplicateName(String::from("a")));
    }

    #[test]
    fn non_finite_offsets_are_rejected() {
        let mut joints = vec![def("a", -1), def("b", 0)];
        joints[1].rest_offset.x = f32::NAN;
        let err = JointTable::new(joints).unwrap_err();
        assert!(matches!(err, JointTableError::NonFiniteOffset { index: 1, .. }));
    }
}
