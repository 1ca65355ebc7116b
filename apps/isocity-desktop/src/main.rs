use anyhow::{Context, Result, anyhow};
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec2;
use isocity_common::{GameConfig, GridCoord};
use isocity_game::{GameContext, ToolApplication};
use isocity_input::{Key, Modifiers, PointerButton};
use isocity_render::Viewport;
use isocity_render_wgpu::WgpuRenderer;
use isocity_tools::{CityInspector, Tool};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Wheel units per scrolled line, matching the classic 120-per-notch convention.
const LINE_TO_WHEEL: f32 = 120.0;

/// Longest frame gap fed to the tick accumulator.
const MAX_FRAME_DT: Duration = Duration::from_millis(250);

#[derive(Parser)]
#[command(name = "isocity-desktop", about = "Isometric city builder")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the grid size
    #[arg(long)]
    size: Option<u32>,

    /// Override the growth seed
    #[arg(long)]
    seed: Option<u64>,
}

impl Cli {
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => GameConfig::default(),
        };
        if let Some(size) = self.size {
            config.grid_size = size;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Application state.
struct AppState {
    game: GameContext,
    cursor: Vec2,
    modifiers: Modifiers,
    hovered: Option<GridCoord>,
    last_application: Option<ToolApplication>,
    show_panel: bool,
    last_frame: Instant,
}

impl AppState {
    fn new(config: GameConfig) -> Self {
        Self {
            game: GameContext::new(config, Viewport::default()),
            cursor: Vec2::ZERO,
            modifiers: Modifiers::default(),
            hovered: None,
            last_application: None,
            show_panel: true,
            last_frame: Instant::now(),
        }
    }

    fn record(&mut self, applied: Option<ToolApplication>) {
        if applied.is_some() {
            self.last_application = applied;
        }
    }

    fn update(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_frame).min(MAX_FRAME_DT);
        self.last_frame = now;
        self.game.advance(dt);
        self.hovered = self.game.tile_at(self.cursor);
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if key == KeyCode::Space {
            self.game.key(Key::Space, pressed);
            return;
        }
        if !pressed {
            return;
        }
        let digit = match key {
            KeyCode::Digit1 => Some(0),
            KeyCode::Digit2 => Some(1),
            KeyCode::Digit3 => Some(2),
            KeyCode::Digit4 => Some(3),
            KeyCode::Digit5 => Some(4),
            KeyCode::F1 => {
                self.show_panel = !self.show_panel;
                None
            }
            _ => None,
        };
        if let Some(tool) = digit.and_then(|i| Tool::ALL.get(i)) {
            self.game.select_tool(*tool);
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_panel {
            return;
        }

        let summary = CityInspector::summary(self.game.city());

        egui::SidePanel::left("city_panel")
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading("isocity");
                ui.separator();
                ui.label(format!("Tick: {}  Seed: {}", summary.tick, summary.seed));
                ui.label(format!("Grid: {0}x{0}", summary.size));
                ui.label(format!(
                    "Buildings: {} (tallest {})",
                    summary.total_buildings(),
                    summary.max_height
                ));
                for (kind, count) in &summary.buildings {
                    ui.label(format!("  {kind}: {count}"));
                }
                ui.separator();

                ui.heading("Tools");
                let active = self.game.active_tool();
                for (i, tool) in Tool::ALL.iter().enumerate() {
                    let label = format!("{} ({})", tool.id(), i + 1);
                    if ui.selectable_label(active == *tool, label).clicked() {
                        self.game.set_active_tool(tool.id());
                    }
                }

                ui.separator();
                ui.heading("Tile");
                match self
                    .hovered
                    .and_then(|coord| CityInspector::inspect_tile(self.game.city(), coord))
                {
                    Some(info) => ui.label(info.to_string()),
                    None => ui.label("-"),
                };
                if let Some(applied) = &self.last_application {
                    ui.small(format!(
                        "last: {} at {} -> {:?}",
                        applied.tool, applied.coord, applied.outcome
                    ));
                }

                ui.separator();
                let camera = self.game.camera();
                ui.small(format!(
                    "Camera: az={:.0} el={:.0} r={:.1}",
                    camera.azimuth.to_degrees(),
                    camera.elevation.to_degrees(),
                    camera.radius
                ));
                ui.small("LMB: orbit/click | RMB or Space/Ctrl+LMB: pan");
                ui.small("Shift+LMB: brush | Wheel: zoom | F1: panel");
            });
    }
}

fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Middle => PointerButton::Middle,
        MouseButton::Right => PointerButton::Secondary,
        MouseButton::Back => PointerButton::Other(3),
        MouseButton::Forward => PointerButton::Other(4),
        MouseButton::Other(id) => PointerButton::Other(id),
    }
}

fn wheel_delta(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y * LINE_TO_WHEEL,
        MouseScrollDelta::PixelDelta(p) => p.y as f32,
    }
}

/// Window, device and renderers, created once the event loop resumes.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, egui_ctx: &EguiContext) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("isocity")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow!("no compatible GPU adapter"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("isocity_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("surface reports no formats"))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(&device, format, config.width, config.height);
        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, format, None, 1, false);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            width = config.width,
            height = config.height,
            "GPU initialized"
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn viewport(&self) -> Viewport {
        Viewport::new(self.config.width as f32, self.config.height as f32)
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }
}

struct App {
    state: AppState,
    egui_ctx: EguiContext,
    gpu: Option<Gpu>,
}

impl App {
    fn new(config: GameConfig) -> Self {
        Self {
            state: AppState::new(config),
            egui_ctx: EguiContext::default(),
            gpu: None,
        }
    }

    fn redraw(&mut self) {
        self.state.update();

        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let frame = match gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let state = &mut self.state;
        let full_output = self.egui_ctx.run(raw_input, |ctx| state.draw_ui(ctx));
        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);
        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        gpu.renderer.render(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &view,
            self.state.game.scene(),
            self.state.game.camera(),
            self.state.hovered,
        );

        for (id, delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, delta);
        }
        gpu.egui_renderer
            .update_buffers(&gpu.device, &gpu.queue, &mut encoder, &paint_jobs, &screen);
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
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
            gpu.egui_renderer.render(&mut pass, &paint_jobs, &screen);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        frame.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match Gpu::new(event_loop, &self.egui_ctx) {
            Ok(gpu) => {
                self.state.game.resize(gpu.viewport());
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to initialize graphics: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
        // Releases always reach the game so a drag ending over the panel still ends.
        let is_release = matches!(
            event,
            WindowEvent::MouseInput {
                state: ElementState::Released,
                ..
            }
        );
        if response.consumed && !is_release {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                gpu.resize(size);
                self.state.game.resize(gpu.viewport());
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.state.handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                let m = modifiers.state();
                self.state.modifiers = Modifiers {
                    ctrl: m.control_key(),
                    shift: m.shift_key(),
                };
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.state.cursor = Vec2::new(position.x as f32, position.y as f32);
                let applied = self.state.game.pointer_move(self.state.cursor);
                self.state.record(applied);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let pos = self.state.cursor;
                let applied = match state {
                    ElementState::Pressed => {
                        self.state
                            .game
                            .pointer_down(pointer_button(button), self.state.modifiers, pos)
                    }
                    ElementState::Released => self.state.game.pointer_up(pos),
                };
                self.state.record(applied);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.state.game.wheel(wheel_delta(delta));
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = cli.game_config()?;
    tracing::info!(grid_size = config.grid_size, seed = config.seed, "isocity-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    Ok(())
}
