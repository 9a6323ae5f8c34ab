use crate::entity::Enemies;
use crate::raycaster::Column;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShotOutcome {
    pub fired: bool,
    /// Index of the enemy hit, valid until dead enemies are removed
    pub hit: Option<usize>,
}

/// Hitscan weapon aimed down the screen's centre column.
#[derive(Debug, Clone, PartialEq)]
pub struct Combat {
    pub damage: f32,
    pub cooldown: f32,
    since_fired: f32,
}

impl Combat {
    pub fn new(damage: f32, cooldown: f32) -> Self {
        Self {
            damage,
            cooldown,
            // ready to fire on the first frame
            since_fired: f32::MAX,
        }
    }

    pub fn advance(&mut self, dt_s: f32) {
        self.since_fired += dt_s;
    }

    /// True on the frame a shot went off, for the muzzle flash.
    pub fn just_fired(&self) -> bool {
        self.since_fired == 0.0
    }

    /// Fires if the trigger is held and the cooldown has elapsed, damaging the
    /// enemy visible in the centre column.
    ///
    /// `columns` must be the completed buffer cast against `enemies`. Dead
    /// enemies are left in place for the caller's removal sweep.
    pub fn fire(&mut self, trigger: bool, columns: &[Column], enemies: &mut Enemies) -> ShotOutcome {
        let mut outcome = ShotOutcome::default();

        if trigger && self.since_fired > self.cooldown {
            self.since_fired = 0.0;
            outcome.fired = true;

            let center = columns.get(columns.len() / 2);
            if let Some(target) = center.and_then(Column::visible_enemy)
                && let Some(hp) = enemies.damage(target.index, self.damage)
            {
                tracing::debug!(enemy = target.index, hp, "enemy hit");
                outcome.hit = Some(target.index);
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Enemy;
    use crate::raycaster::EnemySample;
    use crate::texture::TextureId;

    fn aimed_at(index: usize) -> Vec<Column> {
        let mut columns = vec![Column::default(); 9];
        columns[4].enemy = Some(EnemySample {
            height: 100,
            distance: 3.0,
            along: 0.5,
            texture: TextureId::GRUNT,
            index,
        });
        columns
    }

    fn enemies(hp: &[f32]) -> Enemies {
        let mut list = Enemies::new();
        for (i, &max_hp) in hp.iter().enumerate() {
            list.spawn(Enemy::new([i as f32, 0.0], max_hp, TextureId::GRUNT));
        }
        list
    }

    #[test]
    fn shot_damages_centre_enemy() {
        let mut combat = Combat::new(10.0, 0.1);
        let mut list = enemies(&[100.0, 100.0]);

        let outcome = combat.fire(true, &aimed_at(1), &mut list);
        assert_eq!(
            outcome,
            ShotOutcome {
                fired: true,
                hit: Some(1)
            }
        );
        assert!(combat.just_fired());
        assert_eq!(list.get(1).unwrap().hp, 90.0);
        assert_eq!(list.get(0).unwrap().hp, 100.0);
    }

    #[test]
    fn cooldown_blocks_refire() {
        let mut combat = Combat::new(10.0, 0.1);
        let mut list = enemies(&[100.0]);
        let columns = aimed_at(0);

        assert!(combat.fire(true, &columns, &mut list).fired);
        combat.advance(0.05);
        assert!(!combat.fire(true, &columns, &mut list).fired);
        combat.advance(0.06);
        assert!(combat.fire(true, &columns, &mut list).fired);
        assert_eq!(list.get(0).unwrap().hp, 80.0);
    }

    #[test]
    fn no_trigger_no_shot() {
        let mut combat = Combat::new(10.0, 0.1);
        let mut list = enemies(&[100.0]);
        let outcome = combat.fire(false, &aimed_at(0), &mut list);
        assert!(!outcome.fired);
        assert!(!combat.just_fired());
        assert_eq!(list.get(0).unwrap().hp, 100.0);
    }

    #[test]
    fn enemy_behind_wall_is_not_hit() {
        let mut combat = Combat::new(10.0, 0.1);
        let mut list = enemies(&[100.0]);
        let mut columns = aimed_at(0);
        columns[4].wall = Some(crate::raycaster::WallSample {
            height: 300,
            distance: 1.0,
            along: 0.0,
            texture: TextureId(0),
            shade: 0,
        });

        let outcome = combat.fire(true, &columns, &mut list);
        assert!(outcome.fired);
        assert_eq!(outcome.hit, None);
    }

    #[test]
    fn lethal_shot_leaves_removal_to_the_sweep() {
        let mut combat = Combat::new(10.0, 0.1);
        let mut list = enemies(&[10.0, 50.0]);

        let outcome = combat.fire(true, &aimed_at(0), &mut list);
        assert_eq!(outcome.hit, Some(0));
        assert_eq!(list.len(), 2);
        assert!(list.get(0).unwrap().is_dead());

        assert_eq!(list.remove_dead(), 1);
        assert_eq!(list.get(0).unwrap().max_hp, 50.0);
    }
}
