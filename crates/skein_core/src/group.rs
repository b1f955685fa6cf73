// group.rs - Party bookkeeping
//
// Groups are keyed by name in the game state. Each member unit carries the
// group name as a back-reference in its `Unit` component.

use crate::ecs::EntityId;
use crate::sim::{GameState, SimError};
use crate::unit::Unit;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub owner: EntityId,
    /// Members in join order.
    pub members: Vec<EntityId>,
}

impl Group {
    pub fn contains(&self, unit: EntityId) -> bool {
        self.members.contains(&unit)
    }
}

impl GameState {
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    /// Name of the group `unit` belongs to.
    pub fn group_of(&self, unit: EntityId) -> Option<&str> {
        self.world.get::<Unit>(unit)?.group.as_deref()
    }

    /// Register a new group and make `owner` its first member.
    ///
    /// # Panics
    /// If a group called `name` already exists.
    pub fn create_group(&mut self, owner: EntityId, name: &str) -> Result<(), SimError> {
        assert!(
            !self.groups.contains_key(name),
            "group names must be unique: `{name}` already exists"
        );
        self.groups.insert(
            name.to_string(),
            Group {
                name: name.to_string(),
                owner,
                members: Vec::new(),
            },
        );
        tracing::info!(group = name, owner = %owner, "group created");
        self.join_group(owner, name)?;
        Ok(())
    }

    /// Move `unit` into the group `name`, leaving its current group first.
    ///
    /// Returns `false` when the unit is already a member or the group does
    /// not exist.
    pub fn join_group(&mut self, unit: EntityId, name: &str) -> Result<bool, SimError> {
        if self.group_of(unit) == Some(name) {
            return Ok(false);
        }
        if !self.groups.contains_key(name) {
            tracing::warn!(group = name, unit = %unit, "join of unknown group ignored");
            return Ok(false);
        }
        self.leave_group(unit)?;

        self.world.fetch::<Unit>(unit)?.group = Some(name.to_string());
        if let Some(group) = self.groups.get_mut(name) {
            group.members.push(unit);
        }
        self.log_units(format!("joined group [{name}]"), &[unit], true);
        Ok(true)
    }

    /// Take `unit` out of its group.
    ///
    /// The last member leaving dissolves the group. An owner leaving a
    /// group that still has members hands ownership to the earliest
    /// remaining member.
    pub fn leave_group(&mut self, unit: EntityId) -> Result<(), SimError> {
        let Some(name) = self.world.fetch::<Unit>(unit)?.group.take() else {
            return Ok(());
        };
        self.log_units(format!("left group [{name}]"), &[unit], true);

        let Some(group) = self.groups.get_mut(&name) else {
            return Ok(());
        };
        group.members.retain(|&member| member != unit);
        if group.members.is_empty() {
            self.groups.remove(&name);
            tracing::info!(group = %name, "group dissolved");
        } else if group.owner == unit {
            let successor = group.members[0];
            group.owner = successor;
            let successor_name = self.name_of(successor);
            self.log(
                format!("owner of group [{name}] is now {successor_name}"),
                &[],
                true,
            );
        }
        Ok(())
    }

    /// Both units belong to the same existing group.
    pub fn same_group(&self, a: EntityId, b: EntityId) -> bool {
        match (self.group_of(a), self.group_of(b)) {
            (Some(x), Some(y)) => x == y && self.groups.contains_key(x),
            _ => false,
        }
    }
}
