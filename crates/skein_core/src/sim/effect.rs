// effect.rs - Schedulable units of gameplay action

use crate::sim::{GameState, SimError};
use std::any::Any;
use std::fmt;

/// Outcome of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Run again on the next tick.
    Pending,
    /// Leave the scheduler for good.
    Done,
}

/// Type-erasure helper so queued effects can be downcast by queries.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A gameplay action advanced one step per tick until it reports `Done`.
///
/// `on_start` runs synchronously at submission. `on_step` runs once per
/// tick. Effects that can be cancelled keep their own flag and check it at
/// the top of `on_step`.
pub trait Effect: AsAny {
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn on_start(&mut self, _state: &mut GameState) -> Result<(), SimError> {
        Ok(())
    }

    fn on_step(&mut self, state: &mut GameState) -> Result<Step, SimError>;
}

impl dyn Effect {
    pub fn is<E: Effect>(&self) -> bool {
        self.as_any().is::<E>()
    }

    pub fn downcast_ref<E: Effect>(&self) -> Option<&E> {
        self.as_any().downcast_ref::<E>()
    }

    pub fn downcast_mut<E: Effect>(&mut self) -> Option<&mut E> {
        self.as_any_mut().downcast_mut::<E>()
    }
}

impl fmt::Debug for dyn Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Effect({})", self.name())
    }
}

/// What gets submitted: one effect or a bundle expanded at submission.
pub enum EffectTree {
    Leaf(Box<dyn Effect>),
    Composite(Vec<EffectTree>),
}

impl EffectTree {
    pub fn leaf(effect: impl Effect) -> Self {
        Self::Leaf(Box::new(effect))
    }

    /// Number of leaf effects this tree expands into.
    pub fn leaves(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Composite(children) => children.iter().map(EffectTree::leaves).sum(),
        }
    }
}

impl<E: Effect> From<E> for EffectTree {
    fn from(effect: E) -> Self {
        Self::Leaf(Box::new(effect))
    }
}

impl From<Vec<EffectTree>> for EffectTree {
    fn from(children: Vec<EffectTree>) -> Self {
        Self::Composite(children)
    }
}

impl fmt::Debug for EffectTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(effect) => fmt::Debug::fmt(&**effect, f),
            Self::Composite(children) => f.debug_list().entries(children).finish(),
        }
    }
}
