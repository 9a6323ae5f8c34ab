use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("tile grid has no rows or no columns")]
    Empty,

    #[error("tile grid row {row} has {found} tiles, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid map: {0}")]
    Grid(#[from] GridError),

    #[error("screen must be at least 2x2 pixels, got {width}x{height}")]
    Screen { width: usize, height: usize },

    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },

    #[error("{name} must be {expected}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: f32,
        expected: &'static str,
    },

    #[error("light direction must be non-zero")]
    ZeroLight,

    #[error("{what} at ({x}, {y}) is outside the map or inside a wall")]
    BlockedSpawn { what: &'static str, x: f32, y: f32 },
}
