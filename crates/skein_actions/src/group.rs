// group.rs - Party effects: create, leave, request to join, answer a request
//
// Joining is a two-party handshake. `JoinGroup` stays queued until the
// group owner submits a `RespondJoin`, which finds the pending request
// through the scheduler and records the answer on it.

use skein_core::ecs::EntityId;
use skein_core::sim::{Effect, GameState, SimError, Step};

pub struct CreateGroup {
    pub emitter: EntityId,
    pub name: String,
}

impl CreateGroup {
    pub fn new(emitter: EntityId, name: impl Into<String>) -> Self {
        Self {
            emitter,
            name: name.into(),
        }
    }
}

impl Effect for CreateGroup {
    fn name(&self) -> &'static str {
        "create_group"
    }

    fn on_step(&mut self, state: &mut GameState) -> Result<Step, SimError> {
        if state.group(&self.name).is_some() {
            state.log_units(
                format!("group [{}] already exists, cannot create it", self.name),
                &[self.emitter],
                false,
            );
            return Ok(Step::Done);
        }
        state.leave_group(self.emitter)?;
        state.create_group(self.emitter, &self.name)?;
        Ok(Step::Done)
    }
}

pub struct LeaveGroup {
    pub emitter: EntityId,
}

impl LeaveGroup {
    pub fn new(emitter: EntityId) -> Self {
        Self { emitter }
    }
}

impl Effect for LeaveGroup {
    fn name(&self) -> &'static str {
        "leave_group"
    }

    fn on_step(&mut self, state: &mut GameState) -> Result<Step, SimError> {
        state.leave_group(self.emitter)?;
        Ok(Step::Done)
    }
}

/// Owner's answer to a join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinAnswer {
    #[default]
    Pending,
    Agreed,
    Refused,
}

/// Request to join a group; waits for the owner's answer.
pub struct JoinGroup {
    pub emitter: EntityId,
    pub name: String,
    pub answer: JoinAnswer,
}

impl JoinGroup {
    pub fn new(emitter: EntityId, name: impl Into<String>) -> Self {
        Self {
            emitter,
            name: name.into(),
            answer: JoinAnswer::Pending,
        }
    }
}

impl Effect for JoinGroup {
    fn name(&self) -> &'static str {
        "join_group"
    }

    fn on_step(&mut self, state: &mut GameState) -> Result<Step, SimError> {
        if state.group(&self.name).is_none() {
            state.log_units(
                format!("group [{}] does not exist, cannot join", self.name),
                &[self.emitter],
                false,
            );
            return Ok(Step::Done);
        }
        match self.answer {
            JoinAnswer::Pending => Ok(Step::Pending),
            JoinAnswer::Refused => {
                state.log_units(
                    format!("request to join group [{}] was refused", self.name),
                    &[self.emitter],
                    false,
                );
                Ok(Step::Done)
            }
            JoinAnswer::Agreed => {
                state.join_group(self.emitter, &self.name)?;
                Ok(Step::Done)
            }
        }
    }
}

/// The owner of `name` accepts or refuses the pending request of the unit
/// called `requester`.
pub struct RespondJoin {
    pub emitter: EntityId,
    pub name: String,
    pub requester: String,
    pub agreed: bool,
}

impl RespondJoin {
    pub fn new(
        emitter: EntityId,
        name: impl Into<String>,
        requester: impl Into<String>,
        agreed: bool,
    ) -> Self {
        Self {
            emitter,
            name: name.into(),
            requester: requester.into(),
            agreed,
        }
    }
}

impl Effect for RespondJoin {
    fn name(&self) -> &'static str {
        "respond_join"
    }

    fn on_step(&mut self, state: &mut GameState) -> Result<Step, SimError> {
        let Some(owner) = state.group(&self.name).map(|group| group.owner) else {
            state.log_units(
                format!("group [{}] does not exist, cannot answer", self.name),
                &[self.emitter],
                false,
            );
            return Ok(Step::Done);
        };
        if owner != self.emitter {
            state.log_units(
                format!("not the owner of group [{}], cannot answer requests", self.name),
                &[self.emitter],
                false,
            );
            return Ok(Step::Done);
        }

        let Some(requester) = state.unit_by_name(&self.requester) else {
            state.log_units(
                format!("no unit called {}", self.requester),
                &[self.emitter],
                false,
            );
            return Ok(Step::Done);
        };
        let answer = if self.agreed {
            JoinAnswer::Agreed
        } else {
            JoinAnswer::Refused
        };
        let name = self.name.as_str();
        match state.find_effect_mut::<JoinGroup>(|join| {
            join.name == name && join.emitter == requester && join.answer == JoinAnswer::Pending
        }) {
            Some(request) => request.answer = answer,
            None => {
                state.log_units(
                    format!("{} has no pending request for group [{name}]", self.requester),
                    &[self.emitter],
                    false,
                );
            }
        }
        Ok(Step::Done)
    }
}
