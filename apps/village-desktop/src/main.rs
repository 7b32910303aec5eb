use anyhow::{Context as _, Result};
use clap::Parser;
use egui::Context as EguiContext;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use village_props::VillageConfig;
use village_runtime::params::{AMBIENT_RANGE, LANTERN_RANGE, PARAM_STEP, SUN_RANGE};
use village_runtime::{AppContext, Clock, FrameHost, ParamChange, Params, TickReport};
use village_render_wgpu::{OrbitCamera, WgpuRenderer};
use village_scene::Scene;
use village_tools::SceneInspector;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

const PANEL_WIDTH: f32 = 300.0;
/// Pixels of trackpad scroll counted as one wheel notch.
const PIXELS_PER_NOTCH: f32 = 50.0;

#[derive(Parser)]
#[command(name = "village-desktop", about = "Village scene viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Seed for the cobble scatter
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Parameter file (JSON) with ambient, sun, fog and lantern
    #[arg(long)]
    params: Option<PathBuf>,

    /// Initial window width
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Initial window height
    #[arg(long, default_value = "720")]
    height: u32,
}

/// Parameter panel state. Holds a copy of the live params for the sliders
/// and queues edits until the frame that drew them has finished.
#[derive(Default)]
struct Panel {
    params: Params,
    changes: Vec<ParamChange>,
    last_report: Option<TickReport>,
}

impl Panel {
    fn draw(&mut self, ctx: &EguiContext, scene: &Scene) {
        egui::SidePanel::right("controls")
            .exact_width(PANEL_WIDTH)
            .show(ctx, |ui| {
                egui::CollapsingHeader::new("Lights")
                    .default_open(true)
                    .show(ui, |ui| {
                        let ambient = ui.add(
                            egui::Slider::new(&mut self.params.ambient, AMBIENT_RANGE)
                                .step_by(PARAM_STEP as f64)
                                .text("ambient"),
                        );
                        if ambient.changed() {
                            self.changes.push(ParamChange::Ambient(self.params.ambient));
                        }
                        let sun = ui.add(
                            egui::Slider::new(&mut self.params.sun, SUN_RANGE)
                                .step_by(PARAM_STEP as f64)
                                .text("sun"),
                        );
                        if sun.changed() {
                            self.changes.push(ParamChange::Sun(self.params.sun));
                        }
                    });

                egui::CollapsingHeader::new("Environment")
                    .default_open(true)
                    .show(ui, |ui| {
                        if ui.checkbox(&mut self.params.fog, "Fog").changed() {
                            self.changes.push(ParamChange::Fog(self.params.fog));
                        }
                        let lantern = ui.add(
                            egui::Slider::new(&mut self.params.lantern, LANTERN_RANGE)
                                .step_by(PARAM_STEP as f64)
                                .text("Lantern"),
                        );
                        if lantern.changed() {
                            self.changes.push(ParamChange::Lantern(self.params.lantern));
                        }
                    });

                egui::CollapsingHeader::new("Inspector")
                    .default_open(false)
                    .show(ui, |ui| {
                        let summary = SceneInspector::summary(scene);
                        ui.label(format!(
                            "Nodes: {}  Drawables: {}",
                            summary.reachable, summary.drawables
                        ));
                        ui.label(format!(
                            "Shapes: {}  Paints: {}",
                            summary.shapes, summary.paints
                        ));
                        ui.label(format!("Lights: {}", summary.lights.join(", ")));
                        if let Some(report) = &self.last_report {
                            ui.separator();
                            ui.label(format!("Frame: {}  t={:.2}s", report.tick, report.elapsed));
                            ui.label(format!("Window glow: {:.3}", report.window_pulse));
                            ui.label(format!("Lantern: {:.3}", report.lantern));
                            ui.label(format!("Pulley: {:.3} rad", report.pulley_angle));
                        }
                    });

                ui.separator();
                ui.small("LMB: Orbit | RMB: Pan | Wheel: Zoom");
            });
    }
}

/// GPU and UI resources tied to one window.
struct Gpu {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(window: Arc<Window>, egui_ctx: &EguiContext) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("find adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("village_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface has no formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(&device, surface_format, config.width, config.height);

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    fn draw_panel(
        &mut self,
        window: &Window,
        egui_ctx: &EguiContext,
        panel: &mut Panel,
        scene: &Scene,
        view: &wgpu::TextureView,
    ) {
        let raw_input = self.egui_winit.take_egui_input(window);
        let full_output = egui_ctx.run(raw_input, |ctx| panel.draw(ctx, scene));
        self.egui_winit
            .handle_platform_output(window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

/// Frame host backed by the window: orbit controls, GPU draw plus panel,
/// and redraw scheduling.
struct DesktopHost<'a> {
    window: &'a Window,
    gpu: &'a mut Gpu,
    camera: &'a mut OrbitCamera,
    egui_ctx: &'a EguiContext,
    panel: &'a mut Panel,
}

impl FrameHost for DesktopHost<'_> {
    fn update_controls(&mut self) {
        self.camera.update();
    }

    fn render(&mut self, scene: &Scene) {
        self.gpu.renderer.prepare(&self.gpu.device, scene);

        let output = match self.gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.gpu.surface.configure(&self.gpu.device, &self.gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.gpu.renderer.render(
            &self.gpu.device,
            &self.gpu.queue,
            &view,
            self.camera,
            scene,
        );
        self.gpu
            .draw_panel(self.window, self.egui_ctx, self.panel, scene, &view);

        output.present();
    }

    fn request_next_frame(&mut self) {
        self.window.request_redraw();
    }
}

/// Pointer drag state for the orbit controls.
#[derive(Default)]
struct Pointer {
    rotating: bool,
    panning: bool,
    last: Option<(f64, f64)>,
}

struct DesktopApp {
    app: AppContext,
    camera: OrbitCamera,
    panel: Panel,
    pointer: Pointer,
    size: PhysicalSize<u32>,
    window: Option<Arc<Window>>,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl DesktopApp {
    fn new(app: AppContext, size: PhysicalSize<u32>) -> Self {
        let aspect = size.width as f32 / size.height.max(1) as f32;
        let camera = OrbitCamera::from_view(app.view(), aspect);
        let panel = Panel {
            params: *app.params(),
            ..Panel::default()
        };
        Self {
            app,
            camera,
            panel,
            pointer: Pointer::default(),
            size,
            window: None,
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn redraw(&mut self) {
        let (Some(window), Some(gpu)) = (&self.window, &mut self.gpu) else {
            return;
        };
        let mut host = DesktopHost {
            window,
            gpu,
            camera: &mut self.camera,
            egui_ctx: &self.egui_ctx,
            panel: &mut self.panel,
        };
        let report = self.app.frame(&mut host);
        if let Some(report) = report {
            for missing in &report.missing {
                tracing::debug!(%missing, frame = report.tick, "animation target skipped");
            }
            self.panel.last_report = Some(report);
        }

        for change in std::mem::take(&mut self.panel.changes) {
            if let Err(e) = self.app.set_param(change) {
                tracing::warn!(?change, "parameter edit failed: {e}");
            }
        }
        self.panel.params = *self.app.params();
    }

    fn cursor_moved(&mut self, x: f64, y: f64) {
        if let Some((lx, ly)) = self.pointer.last {
            let (dx, dy) = ((x - lx) as f32, (y - ly) as f32);
            let height = self.size.height as f32;
            if self.pointer.rotating {
                self.camera.rotate(dx, dy, height);
            } else if self.pointer.panning {
                self.camera.pan(dx, dy, height);
            }
        }
        self.pointer.last = Some((x, y));
    }

    /// Stop the loop and drop GPU resources before the window.
    fn shutdown(&mut self) {
        self.app.teardown();
        if let Some(mut gpu) = self.gpu.take() {
            gpu.renderer.release_meshes();
        }
        self.window = None;
    }
}

impl ApplicationHandler for DesktopApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("Village")
            .with_inner_size(self.size);
        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                tracing::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        match Gpu::new(window.clone(), &self.egui_ctx) {
            Ok(gpu) => {
                self.size = window.inner_size();
                self.camera.aspect = gpu.aspect();
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to initialize GPU: {e:#}");
                event_loop.exit();
                return;
            }
        }

        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(window), Some(gpu)) = (&self.window, &mut self.gpu) {
            let response = gpu.egui_winit.on_window_event(window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.shutdown();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.size = new_size;
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size);
                    self.camera.aspect = gpu.aspect();
                }
            }
            WindowEvent::MouseInput { button, state, .. } => {
                let pressed = state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.pointer.rotating = pressed,
                    MouseButton::Right => self.pointer.panning = pressed,
                    _ => {}
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(position.x, position.y);
            }
            WindowEvent::CursorLeft { .. } => {
                self.pointer.last = None;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_NOTCH,
                };
                self.camera.zoom(steps);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("village-desktop starting");

    let params = match &cli.params {
        Some(path) => Params::load(path)
            .with_context(|| format!("loading params from {}", path.display()))?,
        None => Params::default(),
    };
    let config = VillageConfig {
        cobble_seed: cli.seed,
        ..VillageConfig::default()
    };
    let app = AppContext::init(&config, params, Clock::start())?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = DesktopApp::new(app, PhysicalSize::new(cli.width.max(1), cli.height.max(1)));
    event_loop.run_app(&mut app)?;

    Ok(())
}
