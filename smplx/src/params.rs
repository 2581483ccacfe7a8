use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::joints::BODY_JOINT_COUNT;

pub const BETAS_LEN: usize = 10;
pub const BODY_POSE_LEN: usize = BODY_JOINT_COUNT * 3;
pub const JAW_POSE_LEN: usize = 3;
pub const EYE_POSE_LEN: usize = 3;
pub const HAND_JOINT_COUNT: usize = 15;
pub const HAND_POSE_LEN: usize = HAND_JOINT_COUNT * 3;
pub const EXPRESSION_LEN: usize = 10;

/// The full SMPL-X parameter set. Every array has a fixed length; see [PoseParameters::conform].
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PoseParameters {
    /// Shape coefficients.
    pub betas: Vec<f32>,
    /// Axis-angle rotation vectors for the body joints, 3 values per joint.
    pub body_pose: Vec<f32>,
    pub jaw_pose: Vec<f32>,
    pub leye_pose: Vec<f32>,
    pub reye_pose: Vec<f32>,
    pub left_hand_pose: Vec<f32>,
    pub right_hand_pose: Vec<f32>,
    /// Facial blend shape coefficients.
    pub expression: Vec<f32>,
    /// Translation applied to the root joint.
    #[serde(with = "crate::vec3_repr")]
    pub transl: Vec3,
}

impl Default for PoseParameters {
    fn default() -> Self {
        Self {
            betas: vec![0.0; BETAS_LEN],
            body_pose: vec![0.0; BODY_POSE_LEN],
            jaw_pose: vec![0.0; JAW_POSE_LEN],
            leye_pose: vec![0.0; EYE_POSE_LEN],
            reye_pose: vec![0.0; EYE_POSE_LEN],
            left_hand_pose: vec![0.0; HAND_POSE_LEN],
            right_hand_pose: vec![0.0; HAND_POSE_LEN],
            expression: vec![0.0; EXPRESSION_LEN],
            transl: Vec3::ZERO,
        }
    }
}

/// A partial parameter set. Only the fields that are present replace the current values when
/// merged.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PosePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub betas: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_pose: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jaw_pose: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leye_pose: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reye_pose: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_hand_pose: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_hand_pose: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<Vec<f32>>,
    #[serde(
        with = "crate::vec3_repr::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub transl: Option<Vec3>,
}

impl PosePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Name of the first field holding a NaN or infinite value. JSON numbers too large for `f32`
    /// parse as infinity.
    pub fn non_finite_field(&self) -> Option<&'static str> {
        let arrays = [
            ("betas", &self.betas),
            ("body_pose", &self.body_pose),
            ("jaw_pose", &self.jaw_pose),
            ("leye_pose", &self.leye_pose),
            ("reye_pose", &self.reye_pose),
            ("left_hand_pose", &self.left_hand_pose),
            ("right_hand_pose", &self.right_hand_pose),
            ("expression", &self.expression),
        ];

        arrays
            .into_iter()
            .find(|(_, values)| {
                values
                    .as_ref()
                    .is_some_and(|values| values.iter().any(|v| !v.is_finite()))
            })
            .map(|(name, _)| name)
            .or_else(|| {
                self.transl
                    .is_some_and(|transl| !transl.is_finite())
                    .then_some("transl")
            })
    }
}

impl PoseParameters {
    /// The rotation vector for the body joint at `joint`, if the body pose is long enough to hold
    /// it.
    pub fn joint_rotation_vector(&self, joint: usize) -> Option<Vec3> {
        let start = joint * 3;
        self.body_pose
            .get(start..start + 3)
            .map(|v| Vec3::new(v[0], v[1], v[2]))
    }

    pub fn set_joint_rotation_vector(&mut self, joint: usize, rotation_vector: Vec3) {
        let start = joint * 3;
        if let Some(slot) = self.body_pose.get_mut(start..start + 3) {
            slot.copy_from_slice(&rotation_vector.to_array());
        }
    }

    /// Shape coefficient `index`, zero when absent.
    pub fn beta(&self, index: usize) -> f32 {
        self.betas.get(index).copied().unwrap_or(0.0)
    }

    /// Replace every field present in `patch` and bring all arrays back to their fixed lengths.
    pub fn merge(&mut self, patch: PosePatch) {
        let PosePatch {
            betas,
            body_pose,
            jaw_pose,
            leye_pose,
            reye_pose,
            left_hand_pose,
            right_hand_pose,
            expression,
            transl,
        } = patch;

        fn replace(field: &mut Vec<f32>, value: Option<Vec<f32>>) {
            if let Some(value) = value {
                *field = value;
            }
        }

        replace(&mut self.betas, betas);
        replace(&mut self.body_pose, body_pose);
        replace(&mut self.jaw_pose, jaw_pose);
        replace(&mut self.leye_pose, leye_pose);
        replace(&mut self.reye_pose, reye_pose);
        replace(&mut self.left_hand_pose, left_hand_pose);
        replace(&mut self.right_hand_pose, right_hand_pose);
        replace(&mut self.expression, expression);
        if let Some(transl) = transl {
            self.transl = transl;
        }

        self.conform();
    }

    /// Same as [PoseParameters::merge], but returns a new value.
    pub fn merged(&self, patch: PosePatch) -> Self {
        let mut result = self.clone();
        result.merge(patch);
        result
    }

    /// Zero-pad short arrays and truncate long ones to their fixed lengths.
    pub fn conform(&mut self) {
        fn fit(name: &str, field: &mut Vec<f32>, len: usize) {
            if field.len() != len {
                warn!(
                    "{name} has {} values, expected {len}; adjusting",
                    field.len()
                );
                field.resize(len, 0.0);
            }
        }

        fit("betas", &mut self.betas, BETAS_LEN);
        fit("body_pose", &mut self.body_pose, BODY_POSE_LEN);
        fit("jaw_pose", &mut self.jaw_pose, JAW_POSE_LEN);
        fit("leye_pose", &mut self.leye_pose, EYE_POSE_LEN);
        fit("reye_pose", &mut self.reye_pose, EYE_POSE_LEN);
        fit("left_hand_pose", &mut self.left_hand_pose, HAND_POSE_LEN);
        fit("right_hand_pose", &mut self.right_hand_pose, HAND_POSE_LEN);
        fit("expression", &mut self.expression, EXPRESSION_LEN);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_fields_are_named() {
        assert_eq!(PosePatch::default().non_finite_field(), None);

        let patch = PosePatch {
            betas: Some(vec![0.5, -1.0]),
            expression: Some(vec![0.0, f32::INFINITY]),
            ..Default::default()
        };
        assert_eq!(patch.non_finite_field(), Some("expression"));

        let patch = PosePatch {
            transl: Some(Vec3::new(0.0, f32::NAN, 0.0)),
            ..Default::default()
        };
        assert_eq!(patch.non_finite_field(), Some("transl"));
    }

    #[test]
    fn defaults_have_fixed_lengths() {
        let params = PoseParameters::default();
        assert_eq!(params.betas.len(), 10);
        assert_eq!(params.body_pose.len(), 66);
        assert_eq!(params.left_hand_pose.len(), 45);
        assert_eq!(params.right_hand_pose.len(), 45);
        assert_eq!(params.expression.len(), 10);
        assert_eq!(params.jaw_pose, vec![0.0; 3]);
        assert_eq!(params.transl, Vec3::ZERO);
    }

    #[test]
    fn merge_replaces_only_present_fields() {
        let mut params = PoseParameters::default();
        params.expression[3] = 0.5;
        params.transl = Vec3::new(1.0, 2.0, 3.0);

        let patch: PosePatch =
            serde_json::from_str(r#"{"betas":[1,0,0,0,0,0,0,0,0,0]}"#).unwrap();
        let merged = params.merged(patch);

        assert_eq!(merged.betas[0], 1.0);
        assert!(merged.betas[1..].iter().all(|&b| b == 0.0));
        assert_eq!(merged.expression, params.expression);
        assert_eq!(merged.transl, params.transl);
        assert_eq!(merged.body_pose, params.body_pose);
    }

    #[test]
    fn merge_conforms_lengths() {
        let mut params = PoseParameters::default();
        params.merge(PosePatch {
            body_pose: Some(vec![0.1, 0.2]),
            expression: Some(vec![1.0; 12]),
            ..Default::default()
        });

        assert_eq!(params.body_pose.len(), BODY_POSE_LEN);
        assert_eq!(&params.body_pose[..3], &[0.1, 0.2, 0.0]);
        assert_eq!(params.expression, vec![1.0; EXPRESSION_LEN]);
    }

    #[test]
    fn missing_keys_default_to_zero() {
        let params: PoseParameters = serde_json::from_str(r#"{"betas":[0.5]}"#).unwrap();
        assert_eq!(params.body_pose, vec![0.0; BODY_POSE_LEN]);
        assert_eq!(params.transl, Vec3::ZERO);
        // Deserialization keeps what was given; conforming happens explicitly.
        assert_eq!(params.betas, vec![0.5]);
    }

    #[test]
    fn transl_accepts_object_and_array() {
        let patch: PosePatch = serde_json::from_str(r#"{"transl":{"x":1,"y":2,"z":3}}"#).unwrap();
        assert_eq!(patch.transl, Some(Vec3::new(1.0, 2.0, 3.0)));

        let patch: PosePatch = serde_json::from_str(r#"{"transl":[4,5,6]}"#).unwrap();
        assert_eq!(patch.transl, Some(Vec3::new(4.0, 5.0, 6.0)));

        let patch: PosePatch = serde_json::from_str("{}").unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn transl_is_written_as_object() {
        let params = PoseParameters {
            transl: Vec3::new(1.0, 0.0, -1.0),
            ..Default::default()
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["transl"]["x"], 1.0);
        assert_eq!(value["transl"]["z"], -1.0);
    }

    #[test]
    fn joint_rotation_vectors() {
        let mut params = PoseParameters::default();
        params.set_joint_rotation_vector(2, Vec3::new(0.1, 0.2, 0.3));
        assert_eq!(&params.body_pose[6..9], &[0.1, 0.2, 0.3]);
        assert_eq!(
            params.joint_rotation_vector(2),
            Some(Vec3::new(0.1, 0.2, 0.3))
        );
        assert_eq!(params.joint_rotation_vector(BODY_JOINT_COUNT), None);
    }
}
