pub mod depth_buffer;
pub mod egui_integration;
pub mod gizmos;
pub mod input;
pub mod mesh;
pub mod renderer;
pub mod scene;
pub mod shaders;
pub mod tracked;

pub mod prelude {
    pub use super::input::*;
    pub use super::renderer::*;
    pub use super::scene::*;
    pub use super::tracked::*;
    pub use glam::UVec2;
}
