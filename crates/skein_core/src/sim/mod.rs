//! Effect scheduling and the game state it runs against.
//!
//! Gameplay actions are `Effect`s submitted to a `GameState`. Each call to
//! `GameState::advance` steps every queued effect once; effects that are
//! still pending carry over to the next tick in order. Loggers and the
//! random source are collaborators owned by the state so tests can swap
//! them out.

mod effect;
mod error;
mod logger;
mod random;
mod state;

pub use effect::{AsAny, Effect, EffectTree, Step};
pub use error::SimError;
pub use logger::{LogRecord, Logger, RecordingLogger, TracingLogger};
pub use random::{FixedRoll, RandomSource, SeededRandom};
pub use state::GameState;
