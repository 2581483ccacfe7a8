use std::path::PathBuf;

use egui::{RichText, Slider};
use smplx::{Skeleton, params::BETAS_LEN};
use strum::IntoEnumIterator;

use super::state::StudioState;

const ACCENT: egui::Color32 = egui::Color32::from_rgb(16, 185, 129);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::EnumIter)]
pub enum Tab {
    #[default]
    Pose,
    Shape,
    View,
    #[strum(to_string = "AI")]
    Ai,
    Data,
}

/// Things the panel asks for that need more than the state.
#[derive(Debug, PartialEq)]
pub enum PanelAction {
    Synthesize(String),
    Import(PathBuf),
    Export(PathBuf),
}

pub struct ControlPanel {
    tab: Tab,
    prompt: String,
    import_path: String,
    export_path: String,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            tab: Tab::default(),
            prompt: String::new(),
            import_path: String::new(),
            export_path: String::from("smplx_params.json"),
        }
    }
}

impl ControlPanel {
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        state: &mut StudioState,
        skeleton: &Skeleton,
        busy: bool,
    ) -> Vec<PanelAction> {
        let mut actions = vec![];

        egui::SidePanel::left("control_panel")
            .resizable(true)
            .default_width(320.0)
            .min_width(260.0)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                ui.heading(RichText::new("SMPL-X Studio").strong());
                ui.separator();

                ui.horizontal(|ui| {
                    if ui.button("🔀 Randomize").clicked() {
                        state.randomize();
                    }
                    if ui.button("🗑 Reset").on_hover_text("Reset all parameters").clicked() {
                        state.reset_params();
                    }
                });
                ui.separator();

                ui.horizontal(|ui| {
                    for tab in Tab::iter() {
                        ui.selectable_value(&mut self.tab, tab, tab.to_string());
                    }
                });
                ui.separator();

                let footer_height = 36.0;
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .max_height((ui.available_height() - footer_height).max(0.0))
                    .show(ui, |ui| match self.tab {
                        Tab::Pose => pose_tab(ui, state, skeleton),
                        Tab::Shape => shape_tab(ui, state),
                        Tab::View => view_tab(ui, state),
                        Tab::Ai => self.ai_tab(ui, busy, &mut actions),
                        Tab::Data => self.data_tab(ui, &mut actions),
                    });

                ui.separator();
                if ui
                    .add_sized(
                        [ui.available_width(), 24.0],
                        egui::Button::new("📷 Export Snapshot"),
                    )
                    .on_hover_text(format!("Save the parameters to {}", self.export_path))
                    .clicked()
                {
                    actions.push(PanelAction::Export(PathBuf::from(&self.export_path)));
                }
            });

        actions
    }

    fn ai_tab(&mut self, ui: &mut egui::Ui, busy: bool, actions: &mut Vec<PanelAction>) {
        section(ui, "AI Generator");
        ui.add(
            egui::TextEdit::multiline(&mut self.prompt)
                .hint_text("Describe a pose... (e.g. 'A ballerina performing a pirouette')")
                .desired_rows(8)
                .desired_width(f32::INFINITY),
        );

        let can_submit = !busy && !self.prompt.trim().is_empty();
        ui.horizontal(|ui| {
            if ui
                .add_enabled(can_submit, egui::Button::new("✨ Synthesize Pose"))
                .clicked()
            {
                actions.push(PanelAction::Synthesize(self.prompt.clone()));
            }
            if busy {
                ui.spinner();
            }
        });
    }

    fn data_tab(&mut self, ui: &mut egui::Ui, actions: &mut Vec<PanelAction>) {
        section(ui, "Parameter Files");
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.vertical_centered(|ui| {
                ui.label(RichText::new("⬇ Drop a parameter file onto the window").strong());
                ui.label(RichText::new("Partial files only replace the keys they contain").weak());
            });
        });

        ui.add_space(8.0);
        ui.label("Load from path");
        ui.horizontal(|ui| {
            ui.text_edit_singleline(&mut self.import_path);
            if ui
                .add_enabled(!self.import_path.trim().is_empty(), egui::Button::new("Load"))
                .clicked()
            {
                actions.push(PanelAction::Import(PathBuf::from(self.import_path.trim())));
            }
        });

        ui.label("Export to path");
        ui.horizontal(|ui| {
            ui.text_edit_singleline(&mut self.export_path);
            if ui
                .add_enabled(!self.export_path.trim().is_empty(), egui::Button::new("Export"))
                .clicked()
            {
                actions.push(PanelAction::Export(PathBuf::from(self.export_path.trim())));
            }
        });

        ui.add_space(8.0);
        section(ui, "Compatible Formats");
        egui::Grid::new("formats").num_columns(2).show(ui, |ui| {
            ui.monospace(".JSON");
            ui.label("Parameters");
            ui.end_row();
            ui.monospace(".PKL / .NPZ");
            ui.label(RichText::new("Binary, convert to JSON first").weak());
            ui.end_row();
        });
    }
}

fn section(ui: &mut egui::Ui, title: &str) {
    ui.label(RichText::new(title.to_uppercase()).small().strong().color(ACCENT));
    ui.add_space(4.0);
}

fn pose_tab(ui: &mut egui::Ui, state: &mut StudioState, skeleton: &Skeleton) {
    section(ui, "Standard Joints");

    for (joint, j) in skeleton.joints().iter().enumerate() {
        ui.horizontal(|ui| {
            ui.label(RichText::new(&j.name).strong());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(RichText::new(format!("ID {joint}")).monospace().weak());
            });
        });

        ui.horizontal(|ui| {
            ui.spacing_mut().slider_width = ((ui.available_width() - 16.0) / 3.0).max(40.0);
            for axis in 0..3 {
                let index = joint * 3 + axis;
                let Some(&current) = state.params.body_pose.get(index) else {
                    continue;
                };
                let mut value = current;
                if ui
                    .add(Slider::new(&mut value, -1.5..=1.5).show_value(false))
                    .on_hover_text(format!("{value:.2}"))
                    .changed()
                {
                    state.update_params(|params| params.body_pose[index] = value);
                }
            }
        });
        ui.add_space(2.0);
    }
}

fn shape_tab(ui: &mut egui::Ui, state: &mut StudioState) {
    section(ui, "Linear Blend Shapes");

    for index in 0..BETAS_LEN {
        let mut value = state.params.beta(index);
        ui.label(format!("Shape Coefficient {index}"));
        if ui
            .add(Slider::new(&mut value, -3.0..=3.0).fixed_decimals(3))
            .changed()
        {
            state.update_params(|params| params.betas[index] = value);
        }
    }
}

fn view_tab(ui: &mut egui::Ui, state: &mut StudioState) {
    section(ui, "Camera");

    let mut fov = state.camera.fov;
    ui.label("Field of View");
    if ui
        .add(Slider::new(&mut fov, 20.0..=100.0).step_by(1.0).suffix("°"))
        .changed()
    {
        state.update_camera(|camera| camera.fov = fov);
    }

    ui.add_space(8.0);
    let mut position = state.camera.position;
    let mut changed = false;
    egui::Grid::new("camera_position").num_columns(2).show(ui, |ui| {
        for (label, value) in [
            ("X-Pos", &mut position.x),
            ("Y-Pos", &mut position.y),
            ("Z-Pos", &mut position.z),
        ] {
            ui.label(label);
            changed |= ui
                .add(egui::DragValue::new(value).speed(0.1).fixed_decimals(2))
                .changed();
            ui.end_row();
        }
    });
    if changed {
        state.update_camera(|camera| camera.position = position);
    }

    ui.add_space(8.0);
    if ui.button("Reset camera").on_hover_text("Home").clicked() {
        state.reset_camera();
    }
    ui.checkbox(&mut state.show_bones, "Show bone lines");
}
