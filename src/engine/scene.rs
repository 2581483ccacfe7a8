use glam::UVec2;

use super::{
    input::InputState,
    renderer::{Frame, Renderer},
};

/// A trait that represents a scene in the engine. It splits each stage of a frame into separate
/// function calls.
#[allow(unused)]
pub trait Scene {
    /// Called when the size of the window surface is changed.
    fn resize(&mut self, renderer: &Renderer, size: UVec2) {}

    /// Called each frame with the `delta_time` in seconds based on the time the last frame took
    /// and the state of all input devices not captured by the UI.
    fn update(&mut self, delta_time: f32, input: &InputState) {}

    /// Called to render the frame to the surface.
    fn render(&mut self, frame: &mut Frame);

    /// Called to build the user interface for the frame.
    fn ui(&mut self, egui: &egui::Context) {}
}
