//! Grid raycaster: one ray per screen column against a tile map and billboard
//! enemies, composited into a pseudo-3D view.

pub mod combat;
pub mod config;
pub mod entity;
pub mod error;
pub mod game;
pub mod geometry;
pub mod hud;
pub mod intersect;
pub mod march;
pub mod player;
pub mod raycaster;
pub mod renderer;
pub mod scaler;
pub mod texture;
pub mod world;

pub use config::Config;
pub use error::{ConfigError, GridError};
pub use game::{Controls, FrameOutcome, Game};
