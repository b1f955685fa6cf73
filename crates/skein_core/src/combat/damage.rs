//! Damage values, shields and their resolution against a unit
//!
//! Resolution order for one hit:
//! 1. critical gate (one roll, doubles physical and magical)
//! 2. physical shields, front to back
//! 3. magical shields, front to back
//! 4. HP loss: physical, then magical, then real

use crate::combat::Board;
use crate::define_component;
use crate::ecs::{EcsError, EntityId, World};
use crate::math::ratio;
use crate::sim::RandomSource;

/// Magnitudes of one attack against one target.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Damage {
    /// Accuracy, compared against the defender's dodge and crit thresholds.
    pub focus: f64,
    pub physical: f64,
    pub magical: f64,
    /// Bypasses shields.
    pub real: f64,
}

impl Damage {
    pub fn physical(focus: f64, amount: f64) -> Self {
        Self {
            focus,
            physical: amount,
            ..Self::default()
        }
    }

    pub fn magical(focus: f64, amount: f64) -> Self {
        Self {
            focus,
            magical: amount,
            ..Self::default()
        }
    }
}

/// Absorption buffer. Depleted shields stay in their list at zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shield {
    pub value: f64,
}

impl Shield {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

/// Drain `shields` front to back and return the damage left over.
pub fn drain_shields(shields: &mut [Shield], mut incoming: f64) -> f64 {
    for shield in shields.iter_mut() {
        if incoming <= 0.0 {
            break;
        }
        if shield.value > incoming {
            shield.value -= incoming;
            return 0.0;
        }
        incoming -= shield.value;
        shield.value = 0.0;
    }
    incoming
}

/// Capability to take damage. Units without it cannot be hurt.
#[derive(Debug)]
pub struct DamageAccepter {
    pub enabled: bool,
    pub physical_shields: Vec<Shield>,
    pub magical_shields: Vec<Shield>,
}
define_component!(DamageAccepter, 5, "DamageAccepter");

impl Default for DamageAccepter {
    fn default() -> Self {
        Self {
            enabled: true,
            physical_shields: Vec::new(),
            magical_shields: Vec::new(),
        }
    }
}

/// Capability to evade hits.
#[derive(Debug, Default, Clone, Copy)]
pub struct Dodger;
define_component!(Dodger, 6, "Dodger");

impl Dodger {
    /// Whether a hit with `damage` is evaded, given the defender's board.
    ///
    /// Attacks with focus above three times the defender's spirit always
    /// land. Otherwise the dodge succeeds when `roll` falls under
    /// `ratio(focus - 0.2 SPR - 0.7 DEX - 0.1 CON)`.
    pub fn dodge(&self, board: &Board, damage: &Damage, roll: f64) -> bool {
        if damage.focus > 3.0 * board.spirit {
            return false;
        }
        let chance = ratio(
            damage.focus
                - 0.2 * board.spirit
                - 0.7 * board.dexterity
                - 0.1 * board.constitution,
        );
        roll < chance
    }
}

/// Whether `roll` turns a hit with `focus` into a critical one against `board`.
pub fn is_critical(board: &Board, focus: f64, roll: f64) -> bool {
    roll > ratio(1.0 + 0.54 * board.spirit * board.dexterity - focus)
}

/// Resolve `damage` against `target` and subtract the result from its HP.
///
/// Returns the damage that went through the shields, or `None` when the
/// target's accepter is disabled.
pub fn apply_damage(
    world: &mut World,
    rng: &mut dyn RandomSource,
    target: EntityId,
    mut damage: Damage,
) -> Result<Option<Damage>, EcsError> {
    if !world.component::<DamageAccepter>(target)?.enabled {
        return Ok(None);
    }

    let critical = is_critical(world.fetch::<Board>(target)?, damage.focus, rng.roll());
    if critical {
        damage.physical *= 2.0;
        damage.magical *= 2.0;
    }

    if let Some(accepter) = world.get_mut::<DamageAccepter>(target) {
        damage.physical = drain_shields(&mut accepter.physical_shields, damage.physical);
        damage.magical = drain_shields(&mut accepter.magical_shields, damage.magical);
    }

    let board = world.fetch::<Board>(target)?;
    for amount in [damage.physical, damage.magical, damage.real] {
        if amount != 0.0 {
            board.apply_hp(board.hp - amount);
        }
    }
    tracing::debug!(
        %target,
        critical,
        physical = damage.physical,
        magical = damage.magical,
        real = damage.real,
        hp = board.hp,
        "damage applied"
    );
    Ok(Some(damage))
}
