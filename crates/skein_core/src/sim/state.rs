//! Game state and the double-buffered effect scheduler
//!
//! One `GameState` owns everything a tick touches: the entity world, the
//! group table, the unit name index, the gameplay loggers, the random
//! source and the two effect queues.
//!
//! `advance` drains the current queue front to back. An effect reporting
//! `Pending` moves to the next queue; once the current queue is empty the
//! two are swapped, so deferred effects keep their relative order from one
//! tick to the next.

use crate::ecs::{EcsError, EntityClass, EntityId, World};
use crate::group::Group;
use crate::sim::{Effect, EffectTree, Logger, RandomSource, SimError, Step};
use crate::time::TickClock;
use crate::unit::Unit;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;

pub struct GameState {
    pub world: World,
    pub(crate) groups: BTreeMap<String, Group>,
    units: HashMap<String, EntityId>,
    loggers: Vec<Box<dyn Logger>>,
    rng: Box<dyn RandomSource>,
    current: VecDeque<Box<dyn Effect>>,
    next: VecDeque<Box<dyn Effect>>,
    clock: TickClock,
}

impl GameState {
    pub fn new(rng: impl RandomSource + 'static) -> Self {
        Self {
            world: World::new(),
            groups: BTreeMap::new(),
            units: HashMap::new(),
            loggers: Vec::new(),
            rng: Box::new(rng),
            current: VecDeque::new(),
            next: VecDeque::new(),
            clock: TickClock::new(),
        }
    }

    pub fn add_logger(&mut self, logger: impl Logger + 'static) {
        self.loggers.push(Box::new(logger));
    }

    pub fn set_random(&mut self, rng: impl RandomSource + 'static) {
        self.rng = Box::new(rng);
    }

    pub fn roll(&mut self) -> f64 {
        self.rng.roll()
    }

    /// Borrow the world and the random source at the same time.
    pub fn world_and_rng(&mut self) -> (&mut World, &mut dyn RandomSource) {
        (&mut self.world, self.rng.as_mut())
    }

    /// Report a gameplay line to every logger and mirror it to `tracing`.
    pub fn log(&mut self, message: impl AsRef<str>, subjects: &[String], public: bool) {
        let message = message.as_ref();
        tracing::debug!(target: "skein::gameplay", subjects = ?subjects, public, "{message}");
        for logger in &mut self.loggers {
            logger.log(message, subjects, public);
        }
    }

    /// Log with the display names of `units` as subjects.
    pub fn log_units(&mut self, message: impl AsRef<str>, units: &[EntityId], public: bool) {
        let subjects: Vec<String> = units.iter().map(|&unit| self.name_of(unit)).collect();
        self.log(message, &subjects, public);
    }

    // ---- units ----

    /// Spawn an entity of `class` and register it under `name`.
    pub fn spawn_unit(
        &mut self,
        class: &Arc<EntityClass>,
        name: impl Into<String>,
    ) -> Result<EntityId, SimError> {
        let name = name.into();
        let id = self.world.spawn(class);
        let unit = Unit::new(name.clone());
        if !self.world.insert(id, unit)? {
            self.world.despawn(id);
            return Err(EcsError::NoComponent {
                component: "Unit",
                class: class.name().to_string(),
            }
            .into());
        }
        if let Some(previous) = self.units.insert(name.clone(), id) {
            tracing::warn!(unit = %name, %previous, "unit name reused");
        }
        tracing::info!(unit = %name, entity = %id, "unit spawned");
        Ok(id)
    }

    pub fn unit_by_name(&self, name: &str) -> Option<EntityId> {
        self.units
            .get(name)
            .copied()
            .filter(|&id| self.world.contains(id))
    }

    /// Like [`GameState::unit_by_name`], but unknown names are an error.
    pub fn require_unit(&self, name: &str) -> Result<EntityId, SimError> {
        self.unit_by_name(name)
            .ok_or_else(|| SimError::UnknownUnit(name.to_string()))
    }

    /// Display name of `unit`, falling back to its handle.
    pub fn name_of(&self, unit: EntityId) -> String {
        self.world
            .get::<Unit>(unit)
            .map(|u| u.name.clone())
            .unwrap_or_else(|| unit.to_string())
    }

    // ---- scheduler ----

    /// Queue an effect, or every leaf of a composite, for the current tick.
    ///
    /// Each leaf takes its place at the back of the queue before its start
    /// hook runs, so effects submitted from the hook are queued behind it.
    /// A failing hook leaves the effect out of the queue.
    pub fn submit(&mut self, effect: impl Into<EffectTree>) -> Result<(), SimError> {
        match effect.into() {
            EffectTree::Leaf(mut effect) => {
                // Anything the hook submits lands after `slot`.
                let slot = self.current.len();
                effect.on_start(self)?;
                tracing::trace!(effect = effect.name(), "effect submitted");
                self.current.insert(slot.min(self.current.len()), effect);
            }
            EffectTree::Composite(children) => {
                for child in children {
                    self.submit(child)?;
                }
            }
        }
        Ok(())
    }

    /// Run one tick: step every queued effect exactly once.
    ///
    /// Effects submitted during the tick run later in the same tick. When a
    /// step fails, the failing effect is dropped and the error returned;
    /// the remaining effects stay queued and the next call picks up where
    /// this one stopped.
    pub fn advance(&mut self) -> Result<(), SimError> {
        while let Some(mut effect) = self.current.pop_front() {
            match effect.on_step(self) {
                Ok(Step::Pending) => self.next.push_back(effect),
                Ok(Step::Done) => {
                    tracing::trace!(effect = effect.name(), "effect finished");
                }
                Err(err) => {
                    tracing::warn!(effect = effect.name(), error = %err, "effect aborted");
                    return Err(err);
                }
            }
        }
        std::mem::swap(&mut self.current, &mut self.next);
        self.clock.advance_tick();
        tracing::trace!(tick = self.clock.tick_count(), pending = self.current.len(), "tick");
        Ok(())
    }

    /// Completed `advance` calls.
    pub fn tick(&self) -> u64 {
        self.clock.tick_count()
    }

    /// Effects waiting in either queue.
    pub fn pending(&self) -> usize {
        self.current.len() + self.next.len()
    }

    fn queued(&self) -> impl Iterator<Item = &dyn Effect> + '_ {
        self.current
            .iter()
            .chain(self.next.iter())
            .map(|effect| &**effect)
    }

    fn queued_mut(&mut self) -> impl Iterator<Item = &mut dyn Effect> + '_ {
        self.current
            .iter_mut()
            .chain(self.next.iter_mut())
            .map(|effect| &mut **effect)
    }

    /// Queued effects satisfying `pred`, current queue first.
    ///
    /// The effect being stepped is not queued while its step runs, so it
    /// never sees itself.
    pub fn matching_effects(&self, pred: impl Fn(&dyn Effect) -> bool) -> Vec<&dyn Effect> {
        self.queued().filter(|effect| pred(*effect)).collect()
    }

    pub fn matching_effects_mut(
        &mut self,
        pred: impl Fn(&dyn Effect) -> bool,
    ) -> Vec<&mut dyn Effect> {
        self.queued_mut().filter(|effect| pred(&**effect)).collect()
    }

    /// First queued effect of type `E` satisfying `pred`.
    pub fn find_effect<E: Effect>(&self, pred: impl Fn(&E) -> bool) -> Option<&E> {
        self.queued()
            .filter_map(|effect| effect.downcast_ref::<E>())
            .find(|effect| pred(effect))
    }

    pub fn find_effect_mut<E: Effect>(&mut self, pred: impl Fn(&E) -> bool) -> Option<&mut E> {
        self.queued_mut()
            .filter_map(|effect| effect.downcast_mut::<E>())
            .find(|effect| pred(effect))
    }

    /// Drop all effects, units, groups and entities and rewind the clock.
    /// Loggers and the random source are kept.
    pub fn reset(&mut self) {
        self.current.clear();
        self.next.clear();
        self.groups.clear();
        self.units.clear();
        self.world = World::new();
        self.clock.reset();
        tracing::debug!("game state reset");
    }
}
