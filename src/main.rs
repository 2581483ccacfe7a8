use std::{path::PathBuf, sync::Arc, time::Instant};

use clap::Parser;
use egui::Widget;
use engine::{
    egui_integration::EguiIntegration,
    input::InputState,
    renderer::{self, Frame, Renderer, Surface},
    scene::Scene,
};
use glam::UVec2;
use smplx::JointTable;
use studio::{
    ai_pose::{self, GeminiBackend, PoseService},
    scene::StudioScene,
    state::StudioState,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use winit::event::{ElementState, WindowEvent};

mod engine;
mod studio;

#[derive(clap::Parser)]
#[command(version, about = "Pose and shape an SMPL-X skeleton")]
struct Opts {
    /// Parameter file (.json) to load at startup.
    #[arg(long)]
    params: Option<PathBuf>,

    /// Seed for the randomizer, to make sessions reproducible.
    #[arg(long)]
    seed: Option<u64>,

    /// Key for the pose generation endpoint. Without one every request falls back to the rest
    /// pose.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model used to generate poses.
    #[arg(long, default_value = ai_pose::DEFAULT_MODEL)]
    model: String,

    /// Base URL of the generative language API.
    #[arg(long, default_value = ai_pose::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Draw lines between parent and child joints from the start.
    #[arg(long)]
    show_bones: bool,
}

enum App {
    Uninitialized {
        opts: Opts,
        table: JointTable,
    },
    Initialized {
        window: Arc<winit::window::Window>,

        surface: Surface,
        renderer: Renderer,

        egui_integration: EguiIntegration,

        /// Input not consumed by the UI.
        input: InputState,

        // The instant that the last frame started to render.
        last_frame_time: Instant,

        /// The scene we are currently rendering to the screen.
        scene: Box<dyn Scene>,
    },
    /// The window was closed and everything it owned was dropped.
    Closed,
    /// Start up failed, the reason was logged.
    Failed,
}

impl App {
    fn initialize(
        event_loop: &winit::event_loop::ActiveEventLoop,
        opts: &Opts,
        table: &JointTable,
    ) -> Option<Self> {
        event_loop.set_control_flow(winit::event_loop::ControlFlow::Poll);

        let mut attributes = winit::window::WindowAttributes::default()
            .with_title("SMPL-X Studio")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 800));

        if let Some(monitor) = event_loop.primary_monitor() {
            let screen_size = monitor.size();
            attributes = attributes.with_position(winit::dpi::Position::Physical(
                winit::dpi::PhysicalPosition::new(
                    screen_size.width as i32 / 4,
                    screen_size.height as i32 / 4,
                ),
            ));
        }

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                error!("Could not create the main window: {err}");
                return None;
            }
        };

        let (surface, renderer) = match renderer::create(Arc::clone(&window)) {
            Ok(created) => created,
            Err(err) => {
                error!("Could not create the renderer: {err}");
                return None;
            }
        };

        let egui_integration = EguiIntegration::new(event_loop, &renderer);

        let mut state = StudioState::new(opts.seed);
        state.show_bones = opts.show_bones;

        if opts.api_key.is_none() {
            warn!("No API key given, pose synthesis will always fall back to the rest pose");
        }
        let backend = GeminiBackend::new(
            opts.api_key.clone(),
            opts.model.clone(),
            opts.endpoint.clone(),
        );
        let service = PoseService::new(Arc::new(backend));

        let scene = StudioScene::new(
            &renderer,
            table,
            surface.size(),
            state,
            service,
            opts.params.as_deref(),
        );

        info!("Application initialized!");

        Some(App::Initialized {
            window,
            surface,
            renderer,
            egui_integration,
            input: InputState::default(),
            last_frame_time: Instant::now(),
            scene: Box::new(scene),
        })
    }
}

impl winit::application::ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        match self {
            App::Uninitialized { opts, table } => {
                *self = match App::initialize(event_loop, opts, table) {
                    Some(app) => app,
                    None => {
                        event_loop.exit();
                        App::Failed
                    }
                };
            }

            App::Initialized { .. } => {
                warn!("Application already initialized!");
            }

            App::Closed | App::Failed => {}
        }
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let App::Initialized {
            window,
            surface,
            renderer,
            egui_integration,
            input,
            last_frame_time,
            scene,
        } = self
        else {
            return;
        };

        if window_id != window.id() {
            return;
        }

        let egui_winit::EventResponse { consumed, .. } =
            egui_integration.window_event(window.as_ref(), &event);

        // Releases always reach the input state so a drag that ends over the UI doesn't stick.
        let is_release = matches!(
            event,
            WindowEvent::MouseInput {
                state: ElementState::Released,
                ..
            }
        );
        if !consumed || is_release {
            input.handle_window_event(&event);
        }

        match event {
            WindowEvent::CloseRequested => {
                info!("Closing");
                event_loop.exit();
                *self = App::Closed;
            }

            WindowEvent::Resized(winit::dpi::PhysicalSize { width, height }) => {
                if width == 0 || height == 0 {
                    return;
                }
                let size = UVec2::new(width, height);
                surface.resize(&renderer.device, size);
                scene.resize(renderer, size);

                window.request_redraw();
            }

            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let last_frame_duration = now - *last_frame_time;
                *last_frame_time = now;

                scene.update(last_frame_duration.as_secs_f32(), input);
                input.reset_current_frame();

                let Some(output) = surface.get_texture(&renderer.device) else {
                    window.request_redraw();
                    return;
                };

                let view = output
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());

                let encoder =
                    renderer
                        .device
                        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                            label: Some("main command encoder"),
                        });

                let mut frame = Frame {
                    encoder,
                    surface: view,
                    renderer,
                };
                scene.render(&mut frame);
                let Frame {
                    mut encoder,
                    surface: view,
                    ..
                } = frame;

                egui_integration.render(
                    window,
                    renderer,
                    surface.size(),
                    &mut encoder,
                    &view,
                    |ctx| {
                        scene.ui(ctx);
                        fps_hud(ctx, last_frame_duration.as_secs_f64());
                    },
                );

                renderer.queue.submit(std::iter::once(encoder.finish()));

                window.pre_present_notify();
                output.present();

                window.request_redraw();
            }

            _ => {}
        }
    }
}

fn fps_hud(ctx: &egui::Context, frame_seconds: f64) {
    egui::Area::new(egui::Id::new("engine_info"))
        .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-8.0, 8.0))
        .interactable(false)
        .show(ctx, |ui| {
            let fps = if frame_seconds > 0.0 {
                1.0 / frame_seconds
            } else {
                0.0
            };
            let text = egui::WidgetText::RichText(egui::RichText::new(format!("{fps:0.1}")))
                .background_color(egui::Color32::from_rgba_premultiplied(0, 0, 0, 127))
                .monospace();
            egui::Label::new(text.color(egui::Color32::WHITE))
                .wrap_mode(egui::TextWrapMode::Extend)
                .ui(ui);
        });
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let opts = Opts::parse();

    let table = match JointTable::smplx_body() {
        Ok(table) => table,
        Err(err) => {
            error!("Invalid joint table: {err}");
            std::process::exit(1);
        }
    };

    let event_loop = match winit::event_loop::EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            error!("Could not create the event loop: {err}");
            std::process::exit(1);
        }
    };

    let mut app = App::Uninitialized { opts, table };
    if let Err(err) = event_loop.run_app(&mut app) {
        error!("Event loop failed: {err}");
        std::process::exit(1);
    }

    if matches!(app, App::Failed) {
        std::process::exit(1);
    }
}
