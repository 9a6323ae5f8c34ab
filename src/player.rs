use crate::geometry::{Vec2, add, from_angle, scale};
use crate::world::TileGrid;

/// Movement intent for one tick, each axis in `[-1, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Movement {
    pub forward: f32,
    pub strafe: f32, // +1 = right
    pub turn: f32,   // +1 = clockwise on the map
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub pos: Vec2,  // (x, y) position in map units
    pub angle: f32, // radians, 0 faces +x, positive turns towards +y
    pub fov: f32,   // full horizontal field of view, radians
    pub move_speed: f32,
    pub turn_speed: f32,
}

impl Player {
    /// Unit vector the player is facing
    #[inline]
    pub fn forward(&self) -> Vec2 {
        from_angle(self.angle)
    }

    /// Unit vector pointing to the player's right
    #[inline]
    pub fn right(&self) -> Vec2 {
        let f = self.forward();
        [-f[1], f[0]]
    }

    /// Ray heading for a screen column: the fov is swept left to right.
    #[inline]
    pub fn ray_angle(&self, column: usize, screen_width: usize) -> f32 {
        (self.angle - self.fov / 2.0) + (column as f32 / screen_width as f32) * self.fov
    }

    /// Apply one tick of movement. Each translation is reverted if it would
    /// end inside a wall or off the map.
    pub fn step(&mut self, movement: Movement, grid: &TileGrid, dt_s: f32) {
        self.angle += movement.turn * self.turn_speed * dt_s;

        let dist = self.move_speed * dt_s;
        if movement.forward != 0.0 {
            self.try_move(scale(self.forward(), movement.forward * dist), grid);
        }
        if movement.strafe != 0.0 {
            self.try_move(scale(self.right(), movement.strafe * dist), grid);
        }
    }

    fn try_move(&mut self, delta: Vec2, grid: &TileGrid) -> bool {
        let next = add(self.pos, delta);
        if grid.is_open(next) {
            self.pos = next;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_4;

    fn player() -> Player {
        Player {
            pos: [1.5, 1.5],
            angle: 0.0,
            fov: FRAC_PI_4,
            move_speed: 4.0,
            turn_speed: 1.5,
        }
    }

    fn room() -> TileGrid {
        TileGrid::from_rows(&[
            vec![1, 1, 1, 1],
            vec![1, 0, 0, 1],
            vec![1, 0, 0, 1],
            vec![1, 1, 1, 1],
        ])
        .unwrap()
    }

    #[test]
    fn center_column_looks_straight_ahead() {
        let p = player();
        assert_eq!(p.ray_angle(640, 1280), p.angle);
        assert!((p.ray_angle(0, 1280) - (p.angle - FRAC_PI_4 / 2.0)).abs() < 1e-6);
    }

    #[test]
    fn right_is_a_quarter_turn_from_forward() {
        let p = player();
        let r = p.right();
        assert!(r[0].abs() < 1e-6);
        assert!((r[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn moves_in_open_space() {
        let mut p = player();
        let grid = room();
        p.step(
            Movement {
                forward: 1.0,
                ..Movement::default()
            },
            &grid,
            0.1,
        );
        assert!((p.pos[0] - 1.9).abs() < 1e-5);
        assert!((p.pos[1] - 1.5).abs() < 1e-5);
    }

    #[test]
    fn wall_step_is_reverted() {
        let mut p = player();
        let grid = room();
        // 4 units/s * 0.2 s = 0.8 backwards lands in the x = 0 wall column
        p.step(
            Movement {
                forward: -1.0,
                ..Movement::default()
            },
            &grid,
            0.2,
        );
        assert_eq!(p.pos, [1.5, 1.5]);
    }

    #[test]
    fn turning_scales_with_time() {
        let mut p = player();
        p.step(
            Movement {
                turn: -1.0,
                ..Movement::default()
            },
            &room(),
            0.5,
        );
        assert!((p.angle + 0.75).abs() < 1e-6);
    }
}
