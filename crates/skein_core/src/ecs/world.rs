// world.rs - Entity table with generational handles

use crate::ecs::{Component, EcsError, Entity, EntityClass, EntityId};
use std::sync::Arc;

/// Owns every entity in the simulation.
///
/// Despawned rows are recycled through a free list; their generation is
/// bumped so stale handles stop resolving.
#[derive(Default)]
pub struct World {
    rows: Vec<Option<Entity>>,
    generations: Vec<u32>,
    free: Vec<u32>,
    live: usize,
}

impl World {
    /// Create a new empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn an empty entity of `class`. Components are created lazily.
    pub fn spawn(&mut self, class: &Arc<EntityClass>) -> EntityId {
        let id = match self.free.pop() {
            Some(index) => EntityId::new(index, self.generations[index as usize]),
            None => {
                let index = self.rows.len() as u32;
                self.rows.push(None);
                self.generations.push(0);
                EntityId::new(index, 0)
            }
        };
        self.rows[id.index() as usize] = Some(Entity::new(id, Arc::clone(class)));
        self.live += 1;
        tracing::trace!(entity = %id, class = class.name(), "spawned");
        id
    }

    /// Despawn an entity.
    ///
    /// The row is returned to the pool and its generation is incremented.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        if !self.contains(id) {
            return false;
        }
        let index = id.index() as usize;
        self.rows[index] = None;
        self.generations[index] = self.generations[index].wrapping_add(1);
        self.free.push(id.index());
        self.live -= 1;
        true
    }

    pub fn contains(&self, id: EntityId) -> bool {
        let index = id.index() as usize;
        self.generations.get(index) == Some(&id.generation())
            && self.rows.get(index).is_some_and(Option::is_some)
    }

    pub fn entity(&self, id: EntityId) -> Result<&Entity, EcsError> {
        if !self.contains(id) {
            return Err(EcsError::NoEntity(id));
        }
        self.rows[id.index() as usize]
            .as_ref()
            .ok_or(EcsError::NoEntity(id))
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Result<&mut Entity, EcsError> {
        if !self.contains(id) {
            return Err(EcsError::NoEntity(id));
        }
        self.rows[id.index() as usize]
            .as_mut()
            .ok_or(EcsError::NoEntity(id))
    }

    /// Polymorphic component lookup. `None` if the entity or instance is absent.
    pub fn get<T: Component>(&self, id: EntityId) -> Option<&T> {
        self.entity(id).ok()?.get::<T>()
    }

    pub fn get_mut<T: Component>(&mut self, id: EntityId) -> Option<&mut T> {
        self.entity_mut(id).ok()?.get_mut::<T>()
    }

    /// Strict lookup: an absent instance is an error rather than `None`.
    pub fn component<T: Component>(&self, id: EntityId) -> Result<&T, EcsError> {
        self.entity(id)?
            .get::<T>()
            .ok_or(EcsError::MissingComponent {
                component: T::INFO.name,
                entity: id,
            })
    }

    /// Fetch-or-create a component on `id`.
    pub fn fetch<T: Component + Default>(&mut self, id: EntityId) -> Result<&mut T, EcsError> {
        self.entity_mut(id)?.get_or_default::<T>()
    }

    /// Declare `component` ready on `id`, storing it in its exact slot.
    pub fn insert<T: Component>(&mut self, id: EntityId, component: T) -> Result<bool, EcsError> {
        Ok(self.entity_mut(id)?.insert(component))
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Iterate over live entities in row order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.rows.iter().filter_map(Option::as_ref)
    }
}
