//! TOML configuration. Every section is optional; missing fields fall back to
//! the built-in demo scene.

use std::f32::consts::{FRAC_PI_4, PI};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::{Vec2, length};
use crate::texture::TextureId;
use crate::world::TileGrid;

/// Finest march step accepted from a config file, in map units.
pub const MIN_MARCH_STEP: f32 = 1e-4;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Config {
    pub screen: ScreenConfig,
    pub player: PlayerConfig,
    pub render: RenderConfig,
    pub combat: CombatConfig,
    pub map: MapConfig,
    pub enemies: EnemyList,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: usize,
    pub height: usize,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub fov: f32,
    pub move_speed: f32,
    pub turn_speed: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            x: 8.0,
            y: 8.0,
            angle: 0.0,
            fov: FRAC_PI_4,
            move_speed: 4.0,
            turn_speed: 1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    pub max_range: f32,
    pub march_step: f32,
    pub fisheye_correction: bool,
    pub show_overlay: bool,
    pub light_direction: Vec2,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_range: 40.0,
            march_step: crate::march::DEFAULT_STEP,
            fisheye_correction: false,
            show_overlay: true,
            light_direction: [1.0, 2.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CombatConfig {
    pub damage: f32,
    pub cooldown: f32, // seconds
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            damage: 10.0,
            cooldown: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MapConfig {
    pub rows: Vec<Vec<u8>>,
}

impl Default for MapConfig {
    fn default() -> Self {
        const DEMO: [[u8; 16]; 16] = [
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            [1, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 2, 0, 0, 0, 0, 0, 2, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 2, 0, 0, 2, 0, 0, 0, 0, 1],
            [1, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 2, 0, 0, 0, 0, 0, 1],
            [1, 3, 3, 3, 3, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
        ];
        Self {
            rows: DEMO.iter().map(|r| r.to_vec()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EnemySpawn {
    pub x: f32,
    pub y: f32,
    pub max_hp: f32,
    #[serde(default = "default_sprite")]
    pub sprite: TextureId,
}

fn default_sprite() -> TextureId {
    TextureId::GRUNT
}

/// `[[enemies]]` array; defaults to the single demo enemy.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct EnemyList(pub Vec<EnemySpawn>);

impl Default for EnemyList {
    fn default() -> Self {
        Self(vec![EnemySpawn {
            x: 7.0,
            y: 7.0,
            max_hp: 1000.0,
            sprite: TextureId::GRUNT,
        }])
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse and validate a TOML document.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Build the tile grid and check every value the renderer relies on.
    pub fn validate(&self) -> Result<TileGrid, ConfigError> {
        let grid = TileGrid::from_rows(&self.map.rows)?;

        let (width, height) = (self.screen.width, self.screen.height);
        if width < 2 || height < 2 {
            return Err(ConfigError::Screen { width, height });
        }

        let positive = [
            ("player.fov", self.player.fov),
            ("render.max_range", self.render.max_range),
            ("render.march_step", self.render.march_step),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }

        // outer columns need cos(fov / 2) > 0 for fisheye-corrected heights
        let fov = self.player.fov;
        if fov >= PI {
            return Err(ConfigError::OutOfRange {
                name: "player.fov",
                value: fov,
                expected: "below pi radians",
            });
        }

        let (range, step) = (self.render.max_range, self.render.march_step);
        if !range.is_finite() {
            return Err(ConfigError::OutOfRange {
                name: "render.max_range",
                value: range,
                expected: "finite",
            });
        }
        // every sample has to move the march forward
        if step < MIN_MARCH_STEP || range + step <= range {
            return Err(ConfigError::OutOfRange {
                name: "render.march_step",
                value: step,
                expected: "at least 1e-4 and large enough to advance past max_range",
            });
        }
        if length(self.render.light_direction) == 0.0 {
            return Err(ConfigError::ZeroLight);
        }

        if !grid.is_open([self.player.x, self.player.y]) {
            return Err(ConfigError::BlockedSpawn {
                what: "player",
                x: self.player.x,
                y: self.player.y,
            });
        }
        for spawn in &self.enemies.0 {
            if !grid.is_open([spawn.x, spawn.y]) {
                return Err(ConfigError::BlockedSpawn {
                    what: "enemy",
                    x: spawn.x,
                    y: spawn.y,
                });
            }
            if !(spawn.max_hp > 0.0) {
                return Err(ConfigError::NonPositive {
                    name: "enemies.max_hp",
                    value: spawn.max_hp,
                });
            }
        }

        Ok(grid)
    }
}
