//! Parameter model and skeleton math for SMPL-X style body models.
//!
//! Nothing in this crate touches the GPU or the window. The viewer builds a [Skeleton] once, feeds
//! it [PoseParameters] whenever they change and renders the resulting world transforms.

pub mod camera;
pub mod import;
pub mod joints;
pub mod params;
pub mod proxy;
pub mod random;
pub mod skeleton;
pub mod transform;

mod vec3_repr;

pub use camera::CameraConfig;
pub use import::{ImportError, export_json, import_bytes, import_file};
pub use joints::{JointDef, JointTable, JointTableError};
pub use params::{PoseParameters, PosePatch};
pub use proxy::{Proxy, ProxyShape};
pub use random::random_parameters;
pub use skeleton::{Joint, PoseError, Skeleton};
pub use transform::Transform;
