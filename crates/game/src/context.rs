use glam::{Vec2, Vec3};
use isocity_common::{GameConfig, GridCoord};
use isocity_input::{Action, InputState, Key, Modifiers, PointerButton};
use isocity_kernel::City;
use isocity_render::{OrbitCamera, Scene, SyncStats, Viewport, pick};
use isocity_tools::{Tool, ToolOutcome, apply_tool};
use std::time::Duration;

/// Record of one tool application triggered by input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolApplication {
    pub coord: GridCoord,
    pub tool: Tool,
    pub outcome: ToolOutcome,
}

/// Application context: owns the city, its scene, the camera and input state.
///
/// Hosts forward raw events and elapsed time; the context routes them into
/// camera motion, tool application and fixed-interval ticks.
pub struct GameContext {
    config: GameConfig,
    city: City,
    scene: Scene,
    camera: OrbitCamera,
    input: InputState,
    active_tool: Tool,
    /// Last tile a brush stroke touched; the tool re-applies only on a new tile.
    last_brushed: Option<GridCoord>,
    tick_accumulator: Duration,
    tick_interval: Duration,
}

impl GameContext {
    pub fn new(config: GameConfig, viewport: Viewport) -> Self {
        let mut city = City::from_config(&config);
        let scene = Scene::initialize(&mut city);
        let center = (config.grid_size.saturating_sub(1)) as f32 * 0.5;
        let camera = OrbitCamera::from_config(&config.camera, Vec3::new(center, center, 0.0), viewport);
        let tick_interval = Duration::from_millis(config.tick_interval_ms.max(1));

        tracing::info!(
            grid_size = config.grid_size,
            seed = config.seed,
            tick_ms = config.tick_interval_ms,
            "game context created"
        );

        Self {
            config,
            city,
            scene,
            camera,
            input: InputState::new(),
            active_tool: Tool::default(),
            last_brushed: None,
            tick_accumulator: Duration::ZERO,
            tick_interval,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn city(&self) -> &City {
        &self.city
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn active_tool(&self) -> Tool {
        self.active_tool
    }

    pub fn select_tool(&mut self, tool: Tool) {
        if tool != self.active_tool {
            tracing::info!(%tool, "active tool changed");
        }
        self.active_tool = tool;
    }

    /// Select a tool by UI identifier. Unknown ids are logged and ignored.
    pub fn set_active_tool(&mut self, id: &str) -> bool {
        match id.parse::<Tool>() {
            Ok(tool) => {
                self.select_tool(tool);
                true
            }
            Err(e) => {
                tracing::warn!("{e}; keeping {}", self.active_tool);
                false
            }
        }
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.camera.resize(viewport);
    }

    pub fn pointer_down(
        &mut self,
        button: PointerButton,
        modifiers: Modifiers,
        pos: Vec2,
    ) -> Option<ToolApplication> {
        let action = self.input.pointer_down(button, modifiers, pos);
        self.apply_action(action)
    }

    pub fn pointer_up(&mut self, pos: Vec2) -> Option<ToolApplication> {
        let action = self.input.pointer_up(pos);
        self.last_brushed = None;
        self.apply_action(action)
    }

    pub fn pointer_move(&mut self, pos: Vec2) -> Option<ToolApplication> {
        let action = self.input.pointer_move(pos);
        self.apply_action(action)
    }

    pub fn wheel(&mut self, delta: f32) {
        let action = self.input.wheel(delta);
        self.apply_action(action);
    }

    pub fn key(&mut self, key: Key, pressed: bool) {
        self.input.key(key, pressed);
    }

    /// Route an action to the camera rig or the active tool.
    pub fn apply_action(&mut self, action: Action) -> Option<ToolApplication> {
        match action {
            Action::Orbit(delta) => {
                self.camera.apply_orbit(delta);
                None
            }
            Action::Pan(delta) => {
                self.camera.apply_pan(delta);
                None
            }
            Action::Zoom(delta) => {
                self.camera.apply_zoom(delta);
                None
            }
            Action::Select(pos) => self.apply_tool_at(pos),
            Action::Brush(pos) => {
                let coord = self.tile_at(pos)?;
                if self.last_brushed == Some(coord) {
                    return None;
                }
                self.last_brushed = Some(coord);
                Some(self.apply_tool_to(coord))
            }
            Action::Noop => None,
        }
    }

    /// Tile under a pointer position, if any.
    pub fn tile_at(&self, pointer: Vec2) -> Option<GridCoord> {
        pick(pointer, self.camera.viewport, &self.camera, self.scene.elements())
            .map(|hit| hit.element.coord)
    }

    /// Pick the tile under `pointer` and apply the active tool to it.
    pub fn apply_tool_at(&mut self, pointer: Vec2) -> Option<ToolApplication> {
        let coord = self.tile_at(pointer)?;
        Some(self.apply_tool_to(coord))
    }

    /// Apply the active tool to a tile and bring the scene up to date.
    pub fn apply_tool_to(&mut self, coord: GridCoord) -> ToolApplication {
        let tool = self.active_tool;
        let outcome = apply_tool(tool, &mut self.city, coord);
        self.scene.sync(&mut self.city);
        ToolApplication {
            coord,
            tool,
            outcome,
        }
    }

    /// Run one simulation tick and reconcile the scene.
    pub fn tick(&mut self) -> SyncStats {
        self.city.tick();
        self.scene.sync(&mut self.city)
    }

    /// Accumulate elapsed time and run every tick that has come due.
    /// Returns the number of ticks run.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        self.tick_accumulator += dt;
        let mut ticks = 0;
        while self.tick_accumulator >= self.tick_interval {
            self.tick_accumulator -= self.tick_interval;
            self.tick();
            ticks += 1;
        }
        if ticks > 1 {
            tracing::debug!(ticks, "caught up on simulation ticks");
        }
        ticks
    }
}
