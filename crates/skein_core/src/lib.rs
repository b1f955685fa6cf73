//! Skein simulation kernel
//!
//! Contains the systems every gameplay action is built on:
//! - Entity Component System with polymorphic component lookup
//! - Effect scheduler (one step per effect per tick)
//! - Combat resolution (damage, shields, dodge)
//! - Spatial grid with movement and line targeting
//! - Group bookkeeping

pub mod combat;
pub mod ecs;
pub mod event;
pub mod grid;
pub mod group;
pub mod math;
pub mod sim;
pub mod time;
pub mod unit;

pub use glam;

/// Kernel version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn scheduler_is_exported_from_the_root() {
        let mut state = sim::GameState::new(sim::FixedRoll(0.0));
        state.advance().unwrap();
        assert_eq!(state.tick(), 1);
        assert_eq!(state.pending(), 0);
    }
}
