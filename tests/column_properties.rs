//! Property tests for the column dispatcher.
//!
//! Each column is a pure function of the frame snapshot, so casting any subset
//! of columns in any order must reproduce the parallel frame exactly.

use std::f32::consts::TAU;

use gridcaster::raycaster::{FrameSnapshot, cast_column};
use gridcaster::{Config, Game};
use proptest::prelude::*;

const WIDTH: usize = 64;
const HEIGHT: usize = 48;

fn small_game(pos: [f32; 2], angle: f32, fisheye: bool) -> Game {
    let mut config = Config::default();
    config.screen.width = WIDTH;
    config.screen.height = HEIGHT;
    config.player.x = pos[0];
    config.player.y = pos[1];
    config.player.angle = angle;
    config.render.fisheye_correction = fisheye;
    let mut game = Game::from_config(&config).unwrap();
    game.enemies.refresh_billboards(game.player.pos);
    game
}

fn open_spot() -> impl Strategy<Value = [f32; 2]> {
    prop_oneof![
        Just([8.0, 8.0]),
        Just([1.5, 1.5]),
        Just([12.25, 13.75]),
        Just([6.5, 9.5]),
    ]
}

proptest! {
    #[test]
    fn any_column_order_matches_parallel_frame(
        pos in open_spot(),
        angle in 0.0f32..TAU,
        fisheye in any::<bool>(),
        order in proptest::collection::vec(0usize..WIDTH - 1, 1..48),
    ) {
        let mut game = small_game(pos, angle, fisheye);
        game.cast();

        let frame = FrameSnapshot {
            world: &game.world,
            player: &game.player,
            enemies: game.enemies.as_slice(),
            settings: game.settings(),
        };
        for &x in &order {
            prop_assert_eq!(cast_column(&frame, x), game.columns()[x]);
        }
    }

    #[test]
    fn recasting_is_deterministic(pos in open_spot(), angle in 0.0f32..TAU) {
        let mut game = small_game(pos, angle, true);
        game.cast();
        let first = game.columns().to_vec();
        game.cast();
        prop_assert_eq!(first, game.columns().to_vec());
    }

    #[test]
    fn enclosed_map_has_a_wall_in_every_cast_column(pos in open_spot(), angle in 0.0f32..TAU) {
        let mut game = small_game(pos, angle, false);
        game.cast();

        let columns = game.columns();
        prop_assert_eq!(columns.len(), WIDTH);
        for column in &columns[..WIDTH - 1] {
            let wall = column.wall.unwrap();
            prop_assert!(wall.height > 0);
            prop_assert!((0.0..=1.0).contains(&wall.along));
        }
        prop_assert!(columns[WIDTH - 1].wall.is_none());
    }
}
