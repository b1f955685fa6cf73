// attack.rs - Target selection and hit resolution for one attack

use crate::combat::{apply_damage, Board, Damage, DamageAccepter, Dodger};
use crate::ecs::{EntityId, World};
use crate::grid::{distance, select_line_targets};
use crate::sim::{Effect, GameState, SimError, Step};

/// Builds the damage of one hit from `(world, attacker, target)`.
pub type DamageFactory = Box<dyn FnMut(&World, EntityId, EntityId) -> Damage>;

/// Resolve an attack from `attacker` aimed at `target`.
///
/// With `area == 0` only the target is hit, and only if it stands within
/// `distance`. Otherwise every unit along the attacker-to-target ray is hit,
/// sampled every `area` units up to `distance`. Members of the attacker's
/// group are spared. Finishes in a single step.
pub struct AttackEffect {
    pub attacker: EntityId,
    pub target: EntityId,
    pub distance: f64,
    pub area: f64,
    create_damage: DamageFactory,
}

impl AttackEffect {
    pub fn new(
        attacker: EntityId,
        target: EntityId,
        create_damage: impl FnMut(&World, EntityId, EntityId) -> Damage + 'static,
        distance: f64,
        area: f64,
    ) -> Self {
        Self {
            attacker,
            target,
            distance,
            area,
            create_damage: Box::new(create_damage),
        }
    }

    fn targets(&self, world: &World) -> Vec<EntityId> {
        if self.area > 0.0 {
            select_line_targets(world, self.attacker, self.target, self.distance, self.area)
        } else if distance(world, self.attacker, self.target) <= self.distance {
            vec![self.target]
        } else {
            Vec::new()
        }
    }
}

impl Effect for AttackEffect {
    fn name(&self) -> &'static str {
        "attack"
    }

    fn on_step(&mut self, state: &mut GameState) -> Result<Step, SimError> {
        let targets = self.targets(&state.world);
        if targets.is_empty() {
            state.log_units("attack missed: no target in range", &[self.attacker], false);
        }

        for target in targets {
            if target == self.attacker || state.same_group(self.attacker, target) {
                continue;
            }
            let damage = (self.create_damage)(&state.world, self.attacker, target);

            if state.world.get::<DamageAccepter>(target).is_none() {
                state.log_units(
                    "cannot be damaged, attack stops",
                    &[target, self.attacker],
                    false,
                );
                return Ok(Step::Done);
            }
            if let Some(dodger) = state.world.get::<Dodger>(target).copied() {
                let roll = state.roll();
                if dodger.dodge(state.world.fetch::<Board>(target)?, &damage, roll) {
                    state.log_units("dodged an attack", &[target, self.attacker], true);
                    continue;
                }
            }

            let (world, rng) = state.world_and_rng();
            if let Some(dealt) = apply_damage(world, rng, target, damage)? {
                let hp = state.world.get::<Board>(target).map_or(0.0, |board| board.hp);
                let total = dealt.physical + dealt.magical + dealt.real;
                state.log_units(
                    format!("was hit for {total:.1} damage, {hp:.1} HP left"),
                    &[target, self.attacker],
                    true,
                );
            }
        }
        Ok(Step::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Component, EntityClass};
    use crate::grid::{set_pos, spawn_map, Positional};
    use crate::sim::{FixedRoll, RecordingLogger};
    use crate::unit::Unit;
    use std::sync::Arc;

    fn fighter_class() -> Arc<EntityClass> {
        Arc::new(EntityClass::new(
            "fighter",
            &[
                Unit::INFO,
                Board::INFO,
                Positional::INFO,
                DamageAccepter::INFO,
                Dodger::INFO,
            ],
        ))
    }

    struct Arena {
        state: GameState,
        class: Arc<EntityClass>,
        map: EntityId,
    }

    impl Arena {
        fn new(roll: f64) -> Self {
            let mut state = GameState::new(FixedRoll(roll));
            let map = spawn_map(&mut state.world, 20, 20, "arena").unwrap();
            Self {
                state,
                class: fighter_class(),
                map,
            }
        }

        fn fighter(&mut self, name: &str, x: i32, y: i32, hp: f64) -> EntityId {
            let id = self.state.spawn_unit(&self.class, name).unwrap();
            let world = &mut self.state.world;
            let board = world.fetch::<Board>(id).unwrap();
            board.apply_con(hp);
            board.apply_hp(hp);
            world.fetch::<DamageAccepter>(id).unwrap();
            set_pos(world, id, x, y, Some(self.map)).unwrap();
            id
        }
    }

    fn flat(amount: f64) -> impl FnMut(&World, EntityId, EntityId) -> Damage {
        move |_, _, _| Damage::physical(100.0, amount)
    }

    fn hp(state: &GameState, unit: EntityId) -> f64 {
        state.world.get::<Board>(unit).unwrap().hp
    }

    #[test]
    fn single_target_must_be_in_range() {
        let mut arena = Arena::new(-1.0);
        let a = arena.fighter("a", 0, 0, 50.0);
        let near = arena.fighter("near", 3, 0, 50.0);
        let far = arena.fighter("far", 9, 0, 50.0);

        arena.state.submit(AttackEffect::new(a, near, flat(5.0), 4.0, 0.0)).unwrap();
        arena.state.submit(AttackEffect::new(a, far, flat(5.0), 4.0, 0.0)).unwrap();
        arena.state.advance().unwrap();

        assert_eq!(hp(&arena.state, near), 45.0);
        assert_eq!(hp(&arena.state, far), 50.0);
        assert_eq!(arena.state.pending(), 0);
    }

    #[test]
    fn line_attack_spares_attacker_and_allies() {
        let mut arena = Arena::new(-1.0);
        let a = arena.fighter("a", 1, 1, 50.0);
        let ally = arena.fighter("ally", 3, 1, 50.0);
        let foe = arena.fighter("foe", 5, 1, 50.0);
        arena.state.create_group(a, "red").unwrap();
        arena.state.join_group(ally, "red").unwrap();

        arena.state.submit(AttackEffect::new(a, foe, flat(7.0), 6.0, 1.0)).unwrap();
        arena.state.advance().unwrap();

        assert_eq!(hp(&arena.state, a), 50.0);
        assert_eq!(hp(&arena.state, ally), 50.0);
        assert_eq!(hp(&arena.state, foe), 43.0);
    }

    #[test]
    fn low_focus_attack_can_be_dodged() {
        let mut arena = Arena::new(0.0);
        let a = arena.fighter("a", 0, 0, 50.0);
        let b = arena.fighter("b", 1, 0, 50.0);
        arena.state.world.fetch::<Board>(b).unwrap().apply_spr(10.0);
        arena.state.world.fetch::<Dodger>(b).unwrap();

        // ratio(20 - 2 - 5) > 0, so a roll of 0 dodges.
        let weak = |_: &World, _: EntityId, _: EntityId| Damage::physical(20.0, 5.0);
        arena.state.submit(AttackEffect::new(a, b, weak, 4.0, 0.0)).unwrap();
        arena.state.advance().unwrap();
        assert_eq!(hp(&arena.state, b), 50.0);
    }

    #[test]
    fn target_without_accepter_stops_the_attack() {
        let mut arena = Arena::new(-1.0);
        let a = arena.fighter("a", 1, 1, 50.0);
        let wall_class = Arc::new(EntityClass::new("wall", &[Unit::INFO, Positional::INFO]));
        let wall = arena.state.spawn_unit(&wall_class, "wall").unwrap();
        set_pos(&mut arena.state.world, wall, 2, 1, Some(arena.map)).unwrap();
        let foe = arena.fighter("foe", 4, 1, 50.0);
        let recorder = RecordingLogger::new();
        arena.state.add_logger(recorder.clone());

        arena.state.submit(AttackEffect::new(a, foe, flat(7.0), 6.0, 1.0)).unwrap();
        arena.state.advance().unwrap();
        assert_eq!(hp(&arena.state, foe), 50.0);
        let record = recorder
            .records()
            .into_iter()
            .find(|record| record.message.contains("cannot be damaged"))
            .unwrap();
        assert_eq!(record.subjects, vec!["wall".to_string(), "a".to_string()]);
    }
}
