// attack.rs - Basic weapon-less attack

use skein_core::combat::{AttackEffect, Board, Damage};
use skein_core::ecs::{EntityId, World};
use skein_core::sim::{Effect, GameState, SimError, Step};

/// Action points spent by one basic attack.
pub const NORMAL_ATTACK_COST: i32 = 2;

/// Damage of a basic attack, built from the attacker's stats.
pub fn normal_attack_damage(world: &World, attacker: EntityId, _target: EntityId) -> Damage {
    let Some(board) = world.get::<Board>(attacker) else {
        return Damage::physical(1.0, 1.0);
    };
    Damage::physical(
        1.0 + board.dexterity * 0.3 + board.charisma * 0.1 + board.spirit * 0.6,
        1.0 + board.strength * 0.8 + board.constitution * 0.1 + board.dexterity * 0.6,
    )
}

/// Pay for a basic attack and queue the resulting [`AttackEffect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalAttack {
    pub emitter: EntityId,
    pub target: EntityId,
}

impl NormalAttack {
    pub fn new(emitter: EntityId, target: EntityId) -> Self {
        Self { emitter, target }
    }
}

impl Effect for NormalAttack {
    fn name(&self) -> &'static str {
        "normal_attack"
    }

    fn on_step(&mut self, state: &mut GameState) -> Result<Step, SimError> {
        let board = state.world.fetch::<Board>(self.emitter)?;
        if !board.consume_efforts(NORMAL_ATTACK_COST) {
            state.log_units("not enough action points to attack", &[self.emitter], false);
            return Ok(Step::Done);
        }
        let reach = board.attack_dist;
        state.submit(AttackEffect::new(
            self.emitter,
            self.target,
            normal_attack_damage,
            reach,
            0.0,
        ))?;
        Ok(Step::Done)
    }
}
