//! Spatial grid
//!
//! A map is an entity carrying a [`Map`] component; units carry a
//! [`Positional`] that references the map entity by handle.

mod map;
mod positional;

pub use map::{CellCoord, CellListener, Map, MapCell};
pub use positional::{distance, location, move_to, select_line_targets, set_pos, Positional};

use crate::ecs::{Component, EcsError, EntityClass, EntityId, World};
use once_cell::sync::Lazy;
use std::sync::Arc;

/// Entity class for map entities.
pub static MAP_CLASS: Lazy<Arc<EntityClass>> =
    Lazy::new(|| Arc::new(EntityClass::new("map", &[Map::INFO])));

/// Spawn a map entity holding a fresh `rows × cols` grid.
pub fn spawn_map(
    world: &mut World,
    rows: usize,
    cols: usize,
    name: &str,
) -> Result<EntityId, EcsError> {
    let id = world.spawn(&MAP_CLASS);
    world.insert(id, Map::new(rows, cols, name))?;
    tracing::info!(map = name, rows, cols, "map created");
    Ok(id)
}
