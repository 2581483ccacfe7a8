//! Serde representation of [Vec3] used by the parameter files: written as `{"x":..,"y":..,"z":..}`,
//! read from either that object or a 3 element array.

use glam::Vec3;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Deserialize, Serialize)]
struct Xyz {
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    #[serde(default)]
    z: f32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AnyVec3 {
    Object(Xyz),
    Array([f32; 3]),
}

impl From<AnyVec3> for Vec3 {
    fn from(value: AnyVec3) -> Self {
        match value {
            AnyVec3::Object(Xyz { x, y, z }) => Vec3::new(x, y, z),
            AnyVec3::Array(a) => Vec3::from_array(a),
        }
    }
}

pub fn serialize<S: Serializer>(value: &Vec3, serializer: S) -> Result<S::Ok, S::Error> {
    Xyz {
        x: value.x,
        y: value.y,
        z: value.z,
    }
    .serialize(serializer)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec3, D::Error> {
    AnyVec3::deserialize(deserializer).map(Vec3::from)
}

/// Same as the parent module, for optional fields.
pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<Vec3>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => super::serialize(v, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec3>, D::Error> {
        Option::<AnyVec3>::deserialize(deserializer).map(|v| v.map(Vec3::from))
    }
}
