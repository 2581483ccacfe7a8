use std::path::Path;

use smplx::{ImportError, JointTable};
use tracing::{info, warn};

use super::{
    ai_pose::PoseService,
    notifications::Notifications,
    panel::{ControlPanel, PanelAction},
    pose_requests::PoseRequests,
    state::StudioState,
    viewport::Viewport,
};
use crate::engine::prelude::*;

pub struct StudioScene {
    state: StudioState,
    viewport: Viewport,
    panel: ControlPanel,
    requests: PoseRequests,
    notifications: Notifications,
}

impl StudioScene {
    pub fn new(
        renderer: &Renderer,
        table: &JointTable,
        size: UVec2,
        mut state: StudioState,
        service: PoseService,
        initial_params: Option<&Path>,
    ) -> Self {
        let mut notifications = Notifications::default();

        if let Some(path) = initial_params {
            let result = state.import_file(path);
            report_import(&mut notifications, &path.display().to_string(), result);
        }

        Self {
            state,
            viewport: Viewport::new(renderer, table, size),
            panel: ControlPanel::default(),
            requests: PoseRequests::new(service),
            notifications,
        }
    }

    fn handle_action(&mut self, action: PanelAction) {
        match action {
            PanelAction::Synthesize(prompt) => {
                if let Some(seq) = self.requests.submit(&prompt) {
                    info!("Requested pose {seq} for {:?}", prompt.trim());
                }
            }
            PanelAction::Import(path) => {
                let result = self.state.import_file(&path);
                report_import(
                    &mut self.notifications,
                    &path.display().to_string(),
                    result,
                );
            }
            PanelAction::Export(path) => match self.state.export(&path) {
                Ok(()) => self
                    .notifications
                    .info(format!("Exported {}", path.display())),
                Err(err) => {
                    warn!("Could not export {}: {err}", path.display());
                    self.notifications
                        .error(format!("Could not export {}: {err}", path.display()));
                }
            },
        }
    }

    fn import_dropped(&mut self, file: egui::DroppedFile) {
        let result = match (&file.path, &file.bytes) {
            (Some(path), _) => self.state.import_file(path),
            (None, Some(bytes)) => self.state.import_bytes(&file.name, bytes),
            (None, None) => {
                warn!("Dropped file {:?} has no contents", file.name);
                return;
            }
        };

        let name = match &file.path {
            Some(path) => path.display().to_string(),
            None => file.name.clone(),
        };
        report_import(&mut self.notifications, &name, result);
    }
}

fn report_import(notifications: &mut Notifications, name: &str, result: Result<(), ImportError>) {
    match result {
        Ok(()) => notifications.info(format!("Loaded {name}")),
        Err(err) => {
            warn!("Could not import {name}: {err}");
            notifications.error(format!("Could not load {name}: {err}"));
        }
    }
}

impl Scene for StudioScene {
    fn resize(&mut self, renderer: &Renderer, size: UVec2) {
        self.viewport.resize(renderer, size);
        // The aspect ratio changed.
        self.state.camera.mark_changed();
    }

    fn update(&mut self, _delta_time: f32, input: &InputState) {
        if input.key_just_pressed(KeyCode::KeyR) {
            self.state.randomize();
        }
        if input.key_just_pressed(KeyCode::Home) {
            self.state.reset_camera();
        }

        self.viewport.handle_input(input, &mut self.state.camera);

        if let Some(pose) = self.requests.poll() {
            self.state.apply_patch(pose.into_patch());
            self.notifications.info("Pose synthesized");
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        let renderer = frame.renderer;
        self.viewport.sync(&renderer.queue, &self.state);
        self.viewport.render(frame, self.state.show_bones);
    }

    fn ui(&mut self, egui: &egui::Context) {
        let busy = self.requests.is_busy();

        let actions = self
            .panel
            .show(egui, &mut self.state, self.viewport.skeleton(), busy);
        for action in actions {
            self.handle_action(action);
        }

        let dropped = egui.input(|input| input.raw.dropped_files.clone());
        for file in dropped {
            self.import_dropped(file);
        }

        if busy {
            egui::Area::new(egui::Id::new("synthesizing"))
                .anchor(egui::Align2::CENTER_TOP, egui::vec2(0.0, 16.0))
                .interactable(false)
                .show(egui, |ui| {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label("Synthesizing pose…");
                        });
                    });
                });
        }

        self.notifications.show(egui);
    }
}
