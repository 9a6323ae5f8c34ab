//! Frame orchestration: input, casting, combat and HUD layout in the order the
//! column tasks require.

use std::f32::consts::FRAC_PI_4;

use crate::combat::{Combat, ShotOutcome};
use crate::config::Config;
use crate::entity::{Enemies, Enemy};
use crate::error::ConfigError;
use crate::geometry::{Vec2, normalize, rotate};
use crate::hud::{HealthBar, health_bars};
use crate::player::{Movement, Player};
use crate::raycaster::{Column, FrameSettings, FrameSnapshot, cast_frame};
use crate::world::World;

/// Radians per second the light turns while its key is held
const LIGHT_TURN_SPEED: f32 = FRAC_PI_4;

/// What happened during one `Game::update`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameOutcome {
    pub shot: ShotOutcome,
    /// Enemies removed by the post-combat sweep
    pub removed: usize,
}

/// Input sampled for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Controls {
    pub movement: Movement,
    /// +1 turns the light counter-clockwise
    pub light_turn: f32,
    pub fire: bool,
    pub toggle_fisheye: bool,
    pub toggle_overlay: bool,
}

pub struct Game {
    pub world: World,
    pub player: Player,
    pub enemies: Enemies,
    pub combat: Combat,
    pub light: Vec2,
    pub fisheye_correction: bool,
    pub show_overlay: bool,
    screen_width: usize,
    screen_height: usize,
    max_range: f32,
    march_step: f32,
    columns: Vec<Column>,
    bars: Vec<HealthBar>,
}

impl Game {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let grid = config.validate()?;
        let world = World::new(grid);

        let mut enemies = Enemies::new();
        for spawn in &config.enemies.0 {
            enemies.spawn(Enemy::new([spawn.x, spawn.y], spawn.max_hp, spawn.sprite));
        }

        let p = &config.player;
        tracing::info!(
            width = world.grid.width(),
            height = world.grid.height(),
            walls = world.wall_count(),
            enemies = enemies.len(),
            "scene loaded"
        );

        Ok(Self {
            world,
            player: Player {
                pos: [p.x, p.y],
                angle: p.angle,
                fov: p.fov,
                move_speed: p.move_speed,
                turn_speed: p.turn_speed,
            },
            enemies,
            combat: Combat::new(config.combat.damage, config.combat.cooldown),
            light: normalize(config.render.light_direction),
            fisheye_correction: config.render.fisheye_correction,
            show_overlay: config.render.show_overlay,
            screen_width: config.screen.width,
            screen_height: config.screen.height,
            max_range: config.render.max_range,
            march_step: config.render.march_step,
            columns: Vec::with_capacity(config.screen.width),
            bars: Vec::new(),
        })
    }

    pub fn settings(&self) -> FrameSettings {
        FrameSettings {
            screen_width: self.screen_width,
            screen_height: self.screen_height,
            max_range: self.max_range,
            march_step: self.march_step,
            fisheye_correction: self.fisheye_correction,
            light: self.light,
        }
    }

    /// Runs one frame.
    ///
    /// Billboards are refreshed before movement, so they may trail the player
    /// by a frame, but never change while columns are being cast. Enemy
    /// removal only happens once every column has been written, and after the
    /// health bars have read the enemy indices stored in the columns.
    pub fn update(&mut self, controls: &Controls, dt_s: f32) -> FrameOutcome {
        self.enemies.refresh_billboards(self.player.pos);
        self.combat.advance(dt_s);

        self.player.step(controls.movement, &self.world.grid, dt_s);
        if controls.toggle_fisheye {
            self.fisheye_correction = !self.fisheye_correction;
            tracing::debug!(enabled = self.fisheye_correction, "fisheye correction toggled");
        }
        if controls.toggle_overlay {
            self.show_overlay = !self.show_overlay;
            tracing::debug!(enabled = self.show_overlay, "overlay toggled");
        }
        if controls.light_turn != 0.0 {
            let angle = controls.light_turn * LIGHT_TURN_SPEED * dt_s;
            self.light = normalize(rotate(self.light, angle));
        }

        self.cast();

        let shot = self.combat.fire(controls.fire, &self.columns, &mut self.enemies);
        self.bars = health_bars(&self.columns, self.enemies.as_slice(), self.screen_height);

        let removed = self.enemies.remove_dead();
        if removed > 0 {
            tracing::debug!(removed, left = self.enemies.len(), "enemies killed");
        }
        FrameOutcome { shot, removed }
    }

    /// Refills the column buffer from the current state; blocks until every
    /// column is done.
    pub fn cast(&mut self) {
        let frame = FrameSnapshot {
            world: &self.world,
            player: &self.player,
            enemies: self.enemies.as_slice(),
            settings: self.settings(),
        };
        cast_frame(&frame, &mut self.columns);
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Bars laid out after this frame's shot; enemies killed by it get none.
    pub fn health_bars(&self) -> &[HealthBar] {
        &self.bars
    }

    pub fn screen_size(&self) -> (usize, usize) {
        (self.screen_width, self.screen_height)
    }
}
