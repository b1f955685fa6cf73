//! Combat resolution
//!
//! Stats live on [`Board`]; hits are resolved by [`apply_damage`] against a
//! [`DamageAccepter`]; [`AttackEffect`] finds targets on the grid and feeds
//! them a damage value built by a caller-supplied factory.

mod attack;
mod board;
mod damage;

pub use attack::{AttackEffect, DamageFactory};
pub use board::{Board, DEFAULT_ATTACK_DIST, DEFAULT_EFFORTS};
pub use damage::{apply_damage, drain_shields, is_critical, Damage, DamageAccepter, Dodger, Shield};
