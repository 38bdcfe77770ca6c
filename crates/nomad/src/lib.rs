//! # NOMAD
//!
//! A fixed-cadence frame loop on top of [`nomad_core`]: renderable squares
//! are entities, movement and drawing are systems over their interest sets.
//!
//! Platform concerns stay behind two traits:
//! - [`RenderBackend`] uploads meshes, links shaders and submits draws
//! - [`InputSource`] reports key and quit events once per frame
//!
//! [`HeadlessBackend`] and [`ScriptedInput`] implement both without a window.
//!
//! ## Example
//!
//! ```rust
//! use nomad::{Game, GameConfig, HeadlessBackend, ScriptedInput};
//!
//! # fn main() -> nomad::GameResult<()> {
//! let config = GameConfig { squares: 2, max_frames: Some(3), ..GameConfig::default() };
//! let mut game = Game::new(config, HeadlessBackend::new(), ScriptedInput::demo(3))?;
//! game.init()?;
//! while game.step(1.0 / 60.0)? {}
//!
//! assert_eq!(game.backend().frames_presented(), 3);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod components;
pub mod config;
pub mod error;
pub mod game;
pub mod input;
pub mod render;
pub mod systems;

pub use components::{Renderable, Transform};
pub use config::GameConfig;
pub use error::{ConfigError, GameError, GameResult};
pub use game::Game;
pub use input::{InputEvent, InputSource, Key, KeyState, ScriptedInput};
pub use render::{
    Camera, DrawCommand, Frame, HeadlessBackend, MeshHandle, RenderBackend, ShaderHandle,
};
pub use systems::{MovementSystem, RenderSystem, SystemSet};
