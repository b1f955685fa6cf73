// movement.rs - Walking effects

use skein_core::ecs::{EcsError, EntityId, World};
use skein_core::grid::{move_to, Positional};
use skein_core::sim::{Effect, GameState, SimError, Step};

/// Walk towards an absolute grid point, as far as one move allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveTo {
    pub emitter: EntityId,
    pub x: i32,
    pub y: i32,
}

impl MoveTo {
    pub fn new(emitter: EntityId, x: i32, y: i32) -> Self {
        Self { emitter, x, y }
    }
}

/// A [`MoveTo`] relative to the emitter's current position.
pub fn move_by(world: &mut World, emitter: EntityId, dx: i32, dy: i32) -> Result<MoveTo, EcsError> {
    let pos = world.fetch::<Positional>(emitter)?;
    Ok(MoveTo::new(emitter, pos.x + dx, pos.y + dy))
}

impl Effect for MoveTo {
    fn name(&self) -> &'static str {
        "move"
    }

    fn on_step(&mut self, state: &mut GameState) -> Result<Step, SimError> {
        let steps = move_to(&mut state.world, self.emitter, self.x, self.y)?;
        let pos = *state.world.fetch::<Positional>(self.emitter)?;
        if steps == 0 && (pos.x, pos.y) != (self.x, self.y) {
            state.log_units(
                format!("cannot move towards ({}, {})", self.x, self.y),
                &[self.emitter],
                false,
            );
        } else if steps > 0 {
            state.log_units(format!("moved to ({}, {})", pos.x, pos.y), &[self.emitter], true);
        }
        Ok(Step::Done)
    }
}
