//! # Game Loop
//!
//! [`Game`] owns the [`World`] together with the backend and input source
//! and drives them at a fixed cadence:
//!
//! ```text
//! loop {
//!     poll input      (Escape / Quit stop the loop)
//!     update(dt)      MovementSystem: model *= T(direction * speed * dt)
//!     render()        clear, one draw per RenderSystem member, present
//!     sleep           until 1 / max_framerate has elapsed
//! }
//! ```

use std::time::{Duration, Instant};

use glam::Vec3;
use nomad_core::{Entity, World};
use tracing::{debug, info, warn};

use crate::components::{Renderable, Transform};
use crate::config::GameConfig;
use crate::error::GameResult;
use crate::input::{InputEvent, InputSource, Key, KeyState};
use crate::render::{
    load_shader, Camera, RenderBackend, ShaderHandle, DEFAULT_FRAGMENT_SHADER,
    DEFAULT_VERTEX_SHADER,
};
use crate::systems::{self, SystemSet};

/// Unit quad centred on the origin, `xyz` per vertex.
pub const QUAD_VERTICES: [f32; 12] = [
    0.5, 0.5, 0.0, // top right
    0.5, -0.5, 0.0, // bottom right
    -0.5, -0.5, 0.0, // bottom left
    -0.5, 0.5, 0.0, // top left
];

/// Two triangles covering [`QUAD_VERTICES`].
pub const QUAD_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

/// Horizontal distance between spawned squares.
const SQUARE_SPACING: f32 = 1.25;

/// Upper bound on a frame's delta time in seconds.
const MAX_DELTA: f32 = 0.1;

/// The running game.
#[derive(Debug)]
pub struct Game<B, I> {
    config: GameConfig,
    world: World,
    systems: SystemSet,
    backend: B,
    input: I,
    camera: Camera,
    keys: KeyState,
    events: Vec<InputEvent>,
    shader: Option<ShaderHandle>,
    squares: Vec<Entity>,
    frame: u64,
    running: bool,
}

impl<B: RenderBackend, I: InputSource> Game<B, I> {
    /// Creates a game with an empty world and the frame loop systems
    /// registered.
    ///
    /// # Errors
    ///
    /// Fails if `config` is invalid.
    pub fn new(config: GameConfig, backend: B, input: I) -> GameResult<Self> {
        config.validate()?;

        let mut world = World::new();
        let systems = systems::register(&mut world)?;
        let camera = Camera::new(config.aspect_ratio());

        Ok(Self {
            config,
            world,
            systems,
            backend,
            input,
            camera,
            keys: KeyState::default(),
            events: Vec::new(),
            shader: None,
            squares: Vec::new(),
            frame: 0,
            running: true,
        })
    }

    /// Spawns `config.squares` squares in a row centred on the origin.
    ///
    /// # Errors
    ///
    /// Propagates shader, backend and ECS errors.
    pub fn init(&mut self) -> GameResult<()> {
        let count = self.config.squares;
        #[allow(clippy::cast_precision_loss)]
        let offset = count.saturating_sub(1) as f32 * SQUARE_SPACING / 2.0;

        for i in 0..count {
            #[allow(clippy::cast_precision_loss)]
            let x = i as f32 * SQUARE_SPACING - offset;
            self.create_square(Vec3::new(x, 0.0, 0.0))?;
        }

        info!(
            title = %self.config.title,
            squares = count,
            width = self.config.width,
            height = self.config.height,
            "Game initialised"
        );
        Ok(())
    }

    /// Returns the shared square shader, linking it on first use.
    fn shader(&mut self) -> GameResult<ShaderHandle> {
        if let Some(shader) = self.shader {
            return Ok(shader);
        }
        let vertex = load_shader(self.config.vertex_shader.as_deref(), DEFAULT_VERTEX_SHADER)?;
        let fragment =
            load_shader(self.config.fragment_shader.as_deref(), DEFAULT_FRAGMENT_SHADER)?;
        let shader = self.backend.create_shader(&vertex, &fragment)?;
        self.shader = Some(shader);
        Ok(shader)
    }

    /// Creates a renderable square at `position`.
    ///
    /// # Errors
    ///
    /// Propagates shader, backend and ECS errors. Nothing is spawned or
    /// uploaded on failure.
    pub fn create_square(&mut self, position: Vec3) -> GameResult<Entity> {
        let entity = self.world.create_entity()?;
        let uploaded = self.shader().and_then(|shader| {
            let mesh = self.backend.create_mesh(&QUAD_VERTICES, &QUAD_INDICES)?;
            Ok(Renderable {
                mesh,
                shader,
                index_count: QUAD_INDICES.len() as u32,
            })
        });
        let renderable = match uploaded {
            Ok(renderable) => renderable,
            Err(err) => {
                self.world.destroy_entity(entity)?;
                return Err(err);
            }
        };

        let attached = self
            .world
            .add_component(entity, Transform::at(position))
            .and_then(|()| self.world.add_component(entity, renderable));
        if let Err(err) = attached {
            self.backend.destroy_mesh(renderable.mesh);
            self.world.destroy_entity(entity)?;
            return Err(err.into());
        }

        self.squares.push(entity);
        debug!(%entity, x = position.x, y = position.y, "Square spawned");
        Ok(entity)
    }

    /// Destroys a square, its components and its mesh.
    ///
    /// # Errors
    ///
    /// `InvalidEntity` if it is not alive.
    pub fn destroy_square(&mut self, entity: Entity) -> GameResult<()> {
        let mesh = self
            .world
            .component::<Renderable>(entity)
            .ok()
            .map(|renderable| renderable.mesh);
        self.world.destroy_entity(entity)?;
        if let Some(mesh) = mesh {
            self.backend.destroy_mesh(mesh);
        }
        self.squares.retain(|&square| square != entity);
        debug!(%entity, "Square destroyed");
        Ok(())
    }

    /// Drains pending input into the key state. Returns `false` once a quit
    /// was requested.
    pub fn handle_input(&mut self) -> bool {
        self.input.poll(self.frame, &mut self.events);
        for event in self.events.drain(..) {
            match event {
                InputEvent::Quit | InputEvent::KeyDown(Key::Escape) => {
                    if self.running {
                        info!(frame = self.frame, "Quit requested");
                    }
                    self.running = false;
                }
                other => self.keys.apply(other),
            }
        }
        self.running
    }

    /// Moves every square by the held direction, scaled by `dt` seconds.
    ///
    /// # Errors
    ///
    /// Propagates ECS errors.
    pub fn update(&mut self, dt: f32) -> GameResult<()> {
        let delta = self.keys.direction() * self.config.speed * dt;
        systems::apply_movement(&mut self.world, self.systems.movement, delta)?;
        Ok(())
    }

    /// Renders one frame and returns the number of draws.
    ///
    /// # Errors
    ///
    /// Propagates ECS and backend errors.
    pub fn render(&mut self) -> GameResult<usize> {
        self.backend.clear(self.config.clear_color);
        let drawn = systems::render_frame(
            &self.world,
            self.systems.render,
            &self.camera,
            &mut self.backend,
        )?;
        self.backend.present()?;
        Ok(drawn)
    }

    fn frame_limit_reached(&self) -> bool {
        self.config.max_frames.is_some_and(|limit| self.frame >= limit)
    }

    /// Runs one frame with the given delta time. Returns `false` once the
    /// loop should stop.
    ///
    /// # Errors
    ///
    /// Propagates errors from `update` and `render`.
    pub fn step(&mut self, dt: f32) -> GameResult<bool> {
        if !self.handle_input() || self.frame_limit_reached() {
            self.running = false;
            return Ok(false);
        }

        self.update(dt)?;
        self.render()?;
        self.frame += 1;

        if self.frame_limit_reached() {
            self.running = false;
        }
        Ok(self.running)
    }

    /// Runs frames at `max_framerate` until quit or the frame limit, and
    /// returns the number of frames rendered.
    ///
    /// # Errors
    ///
    /// Stops at the first frame error.
    pub fn run(&mut self) -> GameResult<u64> {
        let budget = Duration::from_secs_f64(1.0 / f64::from(self.config.max_framerate));
        info!(
            max_framerate = self.config.max_framerate,
            max_frames = ?self.config.max_frames,
            "Game loop started"
        );

        let mut last = Instant::now();
        loop {
            let frame_start = Instant::now();
            // Clamped so a stall does not teleport the squares
            let dt = frame_start.duration_since(last).as_secs_f32().min(MAX_DELTA);
            last = frame_start;

            if !self.step(dt)? {
                break;
            }

            let elapsed = frame_start.elapsed();
            match budget.checked_sub(elapsed) {
                Some(remaining) => std::thread::sleep(remaining),
                None => warn!(
                    frame = self.frame,
                    elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                    budget_ms = budget.as_secs_f64() * 1000.0,
                    "Frame exceeded budget"
                ),
            }
        }

        info!(frames = self.frame, "Game loop stopped");
        Ok(self.frame)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The ECS world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the ECS world.
    #[must_use]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The render backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Ids of the frame loop systems.
    #[must_use]
    pub fn systems(&self) -> SystemSet {
        self.systems
    }

    /// Current key state.
    #[must_use]
    pub fn keys(&self) -> &KeyState {
        &self.keys
    }

    /// Live squares in spawn order.
    #[must_use]
    pub fn squares(&self) -> &[Entity] {
        &self.squares
    }

    /// Frames rendered so far.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Whether the loop is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }
}
