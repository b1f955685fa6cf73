// skills.rs - Learnt skills and casting them

use skein_core::combat::Board;
use skein_core::define_component;
use skein_core::ecs::EntityId;
use skein_core::sim::{Effect, EffectTree, GameState, SimError, Step};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// A castable ability. Concrete spells implement this.
pub trait Skill {
    fn name(&self) -> &str;

    /// Action points spent per cast.
    fn casting_cost(&self) -> i32 {
        2
    }

    /// Build the effect this cast produces, if any.
    fn cast(&self, state: &GameState, emitter: EntityId, target: Option<EntityId>)
        -> Option<EffectTree>;
}

struct Learnt {
    skill: Rc<dyn Skill>,
    level: f64,
}

/// Skills a unit has learnt, keyed by skill name, with their levels.
#[derive(Default)]
pub struct Caster {
    learnt: BTreeMap<String, Learnt>,
}
define_component!(Caster, 33, "Caster");

impl Caster {
    /// Learn `skill` at level 1. Returns `false` if it is already known.
    pub fn learn(&mut self, skill: Rc<dyn Skill>) -> bool {
        let name = skill.name().to_string();
        if self.learnt.contains_key(&name) {
            return false;
        }
        self.learnt.insert(name, Learnt { skill, level: 1.0 });
        true
    }

    pub fn forget(&mut self, name: &str) -> bool {
        self.learnt.remove(name).is_some()
    }

    pub fn has_skill(&self, name: &str) -> bool {
        self.learnt.contains_key(name)
    }

    pub fn skill(&self, name: &str) -> Option<Rc<dyn Skill>> {
        self.learnt.get(name).map(|learnt| Rc::clone(&learnt.skill))
    }

    /// Level of a skill; zero when it was never learnt.
    pub fn level(&self, name: &str) -> f64 {
        self.learnt.get(name).map_or(0.0, |learnt| learnt.level)
    }

    pub fn level_up(&mut self, name: &str, by: f64) {
        if let Some(learnt) = self.learnt.get_mut(name) {
            learnt.level += by;
        }
    }

    pub fn skill_names(&self) -> impl Iterator<Item = &str> {
        self.learnt.keys().map(String::as_str)
    }
}

impl fmt::Debug for Caster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.learnt.iter().map(|(name, learnt)| (name, learnt.level)))
            .finish()
    }
}

/// Cast a learnt skill.
pub struct Cast {
    pub emitter: EntityId,
    pub skill: String,
    pub target: Option<EntityId>,
}

impl Cast {
    pub fn new(emitter: EntityId, skill: impl Into<String>, target: Option<EntityId>) -> Self {
        Self {
            emitter,
            skill: skill.into(),
            target,
        }
    }
}

impl Effect for Cast {
    fn name(&self) -> &'static str {
        "cast"
    }

    fn on_step(&mut self, state: &mut GameState) -> Result<Step, SimError> {
        let Some(skill) = state.world.fetch::<Caster>(self.emitter)?.skill(&self.skill) else {
            state.log_units(
                format!("skill [{}] has not been learnt", self.skill),
                &[self.emitter],
                false,
            );
            return Ok(Step::Done);
        };
        if !state
            .world
            .fetch::<Board>(self.emitter)?
            .consume_efforts(skill.casting_cost())
        {
            state.log_units(
                format!("not enough action points to cast [{}]", self.skill),
                &[self.emitter],
                false,
            );
            return Ok(Step::Done);
        }
        if let Some(effect) = skill.cast(state, self.emitter, self.target) {
            state.submit(effect)?;
        }
        state.log_units(format!("cast [{}]", self.skill), &[self.emitter], true);
        Ok(Step::Done)
    }
}
