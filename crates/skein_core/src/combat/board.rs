// board.rs - Unit statistics, vitals and action points

use crate::define_component;
use crate::event::Event;
use crate::math::clamp;

pub const DEFAULT_EFFORTS: i32 = 10;
pub const DEFAULT_ATTACK_DIST: f64 = 4.0;

/// Character sheet of a unit.
///
/// Derived maxima are only recomputed through the `apply_*` setters, so
/// gameplay code should prefer those over writing the fields directly.
#[derive(Debug)]
pub struct Board {
    pub strength: f64,
    pub constitution: f64,
    pub dexterity: f64,
    pub intelligence: f64,
    pub spirit: f64,
    pub charisma: f64,

    pub attack_dist: f64,

    /// Action points spent by moving, attacking and casting.
    pub efforts: i32,
    pub max_efforts: i32,

    pub hp: f64,
    pub mp: f64,
    pub max_hp: f64,
    pub max_mp: f64,

    pub alive: bool,
    /// Fired once, when HP first reaches zero.
    pub on_death: Event,
}
define_component!(Board, 2, "Board");

impl Default for Board {
    fn default() -> Self {
        Self {
            strength: 0.0,
            constitution: 0.0,
            dexterity: 0.0,
            intelligence: 0.0,
            spirit: 0.0,
            charisma: 0.0,
            attack_dist: DEFAULT_ATTACK_DIST,
            efforts: DEFAULT_EFFORTS,
            max_efforts: DEFAULT_EFFORTS,
            hp: 0.0,
            mp: 0.0,
            max_hp: 0.0,
            max_mp: 0.0,
            alive: true,
            on_death: Event::new(),
        }
    }
}

impl Board {
    pub fn apply_str(&mut self, value: f64) {
        self.strength = value;
    }

    /// Constitution drives max HP and part of the action point pool.
    pub fn apply_con(&mut self, value: f64) {
        self.constitution = value;
        self.max_hp = value;
        self.hp = clamp(self.hp, 0.0, self.max_hp);
        self.recompute_max_efforts();
    }

    pub fn apply_dex(&mut self, value: f64) {
        self.dexterity = value;
    }

    pub fn apply_int(&mut self, value: f64) {
        self.intelligence = value;
    }

    /// Spirit drives max MP and part of the action point pool.
    pub fn apply_spr(&mut self, value: f64) {
        self.spirit = value;
        self.max_mp = value / 2.0;
        self.mp = clamp(self.mp, 0.0, self.max_mp);
        self.recompute_max_efforts();
    }

    pub fn apply_chr(&mut self, value: f64) {
        self.charisma = value;
    }

    pub fn apply_attack_dist(&mut self, value: f64) {
        self.attack_dist = value;
    }

    fn recompute_max_efforts(&mut self) {
        self.max_efforts =
            DEFAULT_EFFORTS + (0.7 * self.constitution) as i32 + (0.3 * self.spirit) as i32;
        self.efforts = clamp(self.efforts, 0, self.max_efforts);
    }

    /// Set HP, clamped to `[0, max_hp]`.
    ///
    /// Dead units ignore this. Reaching zero marks the unit dead and fires
    /// `on_death`.
    pub fn apply_hp(&mut self, value: f64) {
        if !self.alive {
            return;
        }
        self.hp = clamp(value, 0.0, self.max_hp);
        if self.hp == 0.0 {
            self.alive = false;
            self.on_death.emit();
        }
    }

    pub fn apply_mp(&mut self, value: f64) {
        self.mp = clamp(value, 0.0, self.max_mp);
    }

    /// Spend `value` action points. The pool must stay above zero.
    pub fn consume_efforts(&mut self, value: i32) -> bool {
        if !self.alive {
            return false;
        }
        if self.efforts > value {
            self.efforts -= value;
            true
        } else {
            false
        }
    }

    /// Restore the action point pool to its maximum.
    pub fn refill_efforts(&mut self) {
        self.efforts = self.max_efforts;
    }

    /// Furthest distance a single move may cover.
    pub fn travel_limit(&self) -> f64 {
        self.dexterity * 0.3 + self.spirit * 0.05 + self.constitution * 0.1
    }
}
