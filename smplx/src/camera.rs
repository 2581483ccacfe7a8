use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Where the viewer looks from and how wide.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CameraConfig {
    #[serde(with = "crate::vec3_repr")]
    pub position: Vec3,
    /// The point the camera looks at and orbits around.
    #[serde(with = "crate::vec3_repr")]
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
}

impl CameraConfig {
    pub const MIN_FOV: f32 = 1.0;
    pub const MAX_FOV: f32 = 179.0;

    pub fn set_fov(&mut self, fov: f32) {
        self.fov = if fov.is_finite() {
            fov.clamp(Self::MIN_FOV, Self::MAX_FOV)
        } else {
            Self::default().fov
        };
    }

    /// Returns the config with the field of view forced into the renderable range.
    pub fn clamped(mut self) -> Self {
        self.set_fov(self.fov);
        self
    }

    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 1.5, 4.0),
            target: Vec3::new(0.0, 1.0, 0.0),
            fov: 45.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fov_is_clamped() {
        let mut camera = CameraConfig::default();
        camera.set_fov(0.0);
        assert_eq!(camera.fov, CameraConfig::MIN_FOV);
        camera.set_fov(500.0);
        assert_eq!(camera.fov, CameraConfig::MAX_FOV);
        camera.set_fov(f32::NAN);
        assert_eq!(camera.fov, 45.0);

        let camera: CameraConfig = serde_json::from_str(r#"{"fov": -3}"#).unwrap();
        assert_eq!(camera.clamped().fov, CameraConfig::MIN_FOV);
    }
}
