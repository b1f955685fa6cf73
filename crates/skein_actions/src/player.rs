// player.rs - The standard player entity class

use crate::items::Bag;
use crate::skills::Caster;
use once_cell::sync::Lazy;
use skein_core::combat::{Board, DamageAccepter};
use skein_core::ecs::{Component, EntityClass, EntityId};
use skein_core::grid::{set_pos, Positional};
use skein_core::sim::{GameState, SimError};
use skein_core::unit::Unit;
use std::sync::Arc;

pub static PLAYER_CLASS: Lazy<Arc<EntityClass>> = Lazy::new(|| {
    Arc::new(EntityClass::new(
        "player",
        &[
            Unit::INFO,
            Board::INFO,
            Positional::INFO,
            DamageAccepter::INFO,
            Caster::INFO,
            Bag::INFO,
        ],
    ))
});

/// Starting attributes of a player.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Stats {
    pub strength: f64,
    pub constitution: f64,
    pub dexterity: f64,
    pub intelligence: f64,
    pub spirit: f64,
    pub charisma: f64,
}

/// Spawn a player standing at `(x, y)` on `map`, at full HP and MP.
pub fn spawn_player(
    state: &mut GameState,
    name: &str,
    stats: Stats,
    map: EntityId,
    x: i32,
    y: i32,
) -> Result<EntityId, SimError> {
    let id = state.spawn_unit(&PLAYER_CLASS, name)?;
    let world = &mut state.world;

    let board = world.fetch::<Board>(id)?;
    board.apply_str(stats.strength);
    board.apply_con(stats.constitution);
    board.apply_dex(stats.dexterity);
    board.apply_int(stats.intelligence);
    board.apply_spr(stats.spirit);
    board.apply_chr(stats.charisma);
    let (max_hp, max_mp) = (board.max_hp, board.max_mp);
    board.apply_hp(max_hp);
    board.apply_mp(max_mp);
    board.refill_efforts();

    world.fetch::<DamageAccepter>(id)?;
    world.fetch::<Bag>(id)?;
    world.fetch::<Caster>(id)?;
    set_pos(world, id, x, y, Some(map))?;
    Ok(id)
}
