use glam::{Mat4, Quat, Vec3};

/// A translation and rotation that can be converted into a 4x4 matrix.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Transform {
    /// Rotation vectors shorter than this are treated as no rotation at all.
    pub const AXIS_ANGLE_EPSILON: f32 = 1e-4;

    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Create a new transform from a translation.
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
        }
    }

    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    /// Convert an axis-angle rotation vector into a rotation. The direction of the vector is the
    /// axis and its length the angle in radians.
    pub fn rotation_from_axis_angle(rotation_vector: Vec3) -> Quat {
        let angle = rotation_vector.length();
        if angle <= Self::AXIS_ANGLE_EPSILON {
            Quat::IDENTITY
        } else {
            Quat::from_axis_angle(rotation_vector / angle, angle)
        }
    }

    pub fn is_finite(&self) -> bool {
        self.translation.is_finite() && self.rotation.is_finite()
    }

    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.translation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic() {
        let transform = Transform::default().to_mat4();
        assert_eq!(transform, Mat4::IDENTITY);

        let transform = Transform::default()
            .with_translation(Vec3::new(10.0, 8.0, 6.0))
            .to_mat4();

        let transform = transform * Transform::default().to_mat4();

        assert_eq!(transform, Mat4::from_translation(Vec3::new(10.0, 8.0, 6.0)));
    }

    #[test]
    fn tiny_rotation_vectors_snap_to_identity() {
        assert_eq!(
            Transform::rotation_from_axis_angle(Vec3::ZERO),
            Quat::IDENTITY
        );
        assert_eq!(
            Transform::rotation_from_axis_angle(Vec3::new(5e-5, 0.0, 5e-5)),
            Quat::IDENTITY
        );
    }

    #[test]
    fn rotation_vector_length_is_the_angle() {
        let rotation = Transform::rotation_from_axis_angle(Vec3::new(0.0, 0.0, 2.0));
        let (axis, angle) = rotation.to_axis_angle();
        assert!(axis.abs_diff_eq(Vec3::Z, 1e-5));
        assert!((angle - 2.0).abs() < 1e-5);
    }
}
