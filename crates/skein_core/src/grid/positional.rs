// positional.rs - Binding units to grid coordinates
//
// Positional only stores a reference to the map entity plus integer
// coordinates. Everything that touches cells goes through the world so the
// map's listeners fire as units move.

use crate::combat::Board;
use crate::define_component;
use crate::ecs::{EcsError, EntityId, World};
use crate::grid::{CellCoord, Map};
use crate::math::DVec2;
use std::collections::HashSet;

/// Location of a unit. A fresh instance is off-grid at `(-1, -1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Positional {
    pub map: Option<EntityId>,
    pub x: i32,
    pub y: i32,
}
define_component!(Positional, 3, "Positional");

impl Default for Positional {
    fn default() -> Self {
        Self {
            map: None,
            x: -1,
            y: -1,
        }
    }
}

impl Positional {
    pub fn point(&self) -> DVec2 {
        DVec2::new(self.x as f64, self.y as f64)
    }
}

/// Cell currently holding `unit`, if it stands on one.
pub fn location(world: &World, unit: EntityId) -> Option<CellCoord> {
    let pos = world.get::<Positional>(unit)?;
    world.get::<Map>(pos.map?)?.cell_at_point(pos.x, pos.y)
}

fn cell_on(world: &World, map: Option<EntityId>, x: i32, y: i32) -> Option<(EntityId, CellCoord)> {
    let map = map?;
    let coord = world.get::<Map>(map)?.cell_at_point(x, y)?;
    Some((map, coord))
}

/// Place `unit` at `(x, y)`, optionally moving it onto another map.
///
/// Exit listeners of the vacated cell and enter listeners of the new cell
/// fire only when the cell actually changes.
pub fn set_pos(
    world: &mut World,
    unit: EntityId,
    x: i32,
    y: i32,
    map: Option<EntityId>,
) -> Result<Option<CellCoord>, EcsError> {
    let (old_map, old_x, old_y, new_map) = {
        let pos = world.fetch::<Positional>(unit)?;
        let old = (pos.map, pos.x, pos.y);
        pos.map = map.or(pos.map);
        pos.x = x;
        pos.y = y;
        (old.0, old.1, old.2, pos.map)
    };

    let old_cell = cell_on(world, old_map, old_x, old_y);
    let new_cell = cell_on(world, new_map, x, y);
    if old_cell != new_cell {
        if let Some((map, coord)) = old_cell {
            if let Some(cell) = world.get_mut::<Map>(map).and_then(|m| m.cell_mut(coord)) {
                cell.left_by(unit);
            }
        }
        if let Some((map, coord)) = new_cell {
            if let Some(cell) = world.get_mut::<Map>(map).and_then(|m| m.cell_mut(coord)) {
                cell.entered_by(unit);
            }
        }
        tracing::trace!(%unit, x, y, "moved between cells");
    }
    Ok(new_cell.map(|(_, coord)| coord))
}

/// Euclidean distance between two units; infinite across maps or off-grid.
pub fn distance(world: &World, a: EntityId, b: EntityId) -> f64 {
    match (world.get::<Positional>(a), world.get::<Positional>(b)) {
        (Some(pa), Some(pb)) if pa.map.is_some() && pa.map == pb.map => {
            pa.point().distance(pb.point())
        }
        _ => f64::INFINITY,
    }
}

/// Units along the ray from `source` towards `target`.
///
/// Samples every `radius` units from 0 up to `max_distance` and collects
/// each unit found within `radius` of a sample point, first sighting only.
/// Coincident source and target short-circuit to just the two of them.
pub fn select_line_targets(
    world: &World,
    source: EntityId,
    target: EntityId,
    max_distance: f64,
    radius: f64,
) -> Vec<EntityId> {
    let delta = distance(world, source, target);
    if delta == 0.0 {
        return if source == target {
            vec![source]
        } else {
            vec![source, target]
        };
    }
    if !delta.is_finite() || radius <= 0.0 {
        return Vec::new();
    }

    let (Some(src), Some(dst)) = (
        world.get::<Positional>(source),
        world.get::<Positional>(target),
    ) else {
        return Vec::new();
    };
    let Some(map) = src.map.and_then(|m| world.get::<Map>(m)) else {
        return Vec::new();
    };

    let origin = src.point();
    let direction = (dst.point() - origin) / delta;
    let mut visited = HashSet::new();
    let mut found = Vec::new();
    let mut travelled = 0.0;
    while travelled <= max_distance {
        let sample = origin + direction * travelled;
        for unit in map.units_within_circle(sample.x as i32, sample.y as i32, radius) {
            if visited.insert(unit) {
                found.push(unit);
            }
        }
        travelled += radius;
    }
    found
}

/// Walk `unit` towards `(x, y)` one grid unit at a time.
///
/// The trip is capped at the unit's travel limit and never passes the
/// destination. Each step pays the entered cell's pass consumption from the
/// unit's action points; the walk stops at the last cell it could pay for.
/// Returns the number of steps taken.
pub fn move_to(world: &mut World, unit: EntityId, x: i32, y: i32) -> Result<u32, EcsError> {
    let pos = *world.fetch::<Positional>(unit)?;
    let Some(map) = pos.map else {
        return Ok(0);
    };
    let start = pos.point();
    let delta = DVec2::new(x as f64, y as f64) - start;
    let dist = delta.length();
    if dist == 0.0 {
        return Ok(0);
    }

    let limit = world.fetch::<Board>(unit)?.travel_limit();
    let travel = limit.min(dist);
    if travel <= 0.0 {
        return Ok(0);
    }
    let reach = delta * (travel / dist);

    let along_x = delta.x.abs() > delta.y.abs();
    let (major, minor) = if along_x {
        (reach.x, reach.y)
    } else {
        (reach.y, reach.x)
    };
    let step = major.signum();
    let slope = minor / major;
    let steps = (major.abs() + 1e-9).floor() as u32;

    let mut taken = 0;
    for i in 1..=steps {
        let along = step * i as f64;
        let offset = if along_x {
            DVec2::new(along, along * slope)
        } else {
            DVec2::new(along * slope, along)
        };
        let point = start + offset;
        let (cx, cy) = (point.x as i32, point.y as i32);

        let cost = world
            .get::<Map>(map)
            .and_then(|m| m.cell_at_point(cx, cy).and_then(|coord| m.pass_consumption(coord)));
        let Some(cost) = cost else {
            break;
        };
        if !world.fetch::<Board>(unit)?.consume_efforts(cost) {
            break;
        }
        set_pos(world, unit, cx, cy, None)?;
        taken += 1;
    }
    tracing::debug!(%unit, to_x = x, to_y = y, steps = taken, "move_to");
    Ok(taken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Component, EntityClass};
    use crate::grid::spawn_map;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    fn walker_class() -> Arc<EntityClass> {
        Arc::new(EntityClass::new("walker", &[Positional::INFO, Board::INFO]))
    }

    fn setup(rows: usize, cols: usize) -> (World, EntityId, Arc<EntityClass>) {
        let mut world = World::new();
        let map = spawn_map(&mut world, rows, cols, "field").unwrap();
        (world, map, walker_class())
    }

    #[test]
    fn listeners_fire_on_cell_changes() {
        let (mut world, map, class) = setup(100, 100);
        let log: Rc<RefCell<Vec<(&str, CellCoord)>>> = Rc::default();
        {
            let cell = world.get_mut::<Map>(map).unwrap().cell_mut(CellCoord::new(4, 2)).unwrap();
            let enter = Rc::clone(&log);
            cell.on_enter(move |_, coord| enter.borrow_mut().push(("enter", coord)));
            let exit = Rc::clone(&log);
            cell.on_exit(move |_, coord| exit.borrow_mut().push(("leave", coord)));
        }

        let user = world.spawn(&class);
        assert_eq!(set_pos(&mut world, user, -1, -1, Some(map)).unwrap(), None);
        assert_eq!(location(&world, user), None);

        set_pos(&mut world, user, 2, 4, None).unwrap();
        set_pos(&mut world, user, 2, 4, None).unwrap();
        set_pos(&mut world, user, 10, 10, None).unwrap();

        let cell = CellCoord::new(4, 2);
        assert_eq!(*log.borrow(), vec![("enter", cell), ("leave", cell)]);
        assert_eq!(location(&world, user), Some(CellCoord::new(10, 10)));
        assert!(world.get::<Map>(map).unwrap().cell(CellCoord::new(10, 10)).unwrap().contains(user));
    }

    #[test]
    fn distance_is_infinite_across_maps() {
        let (mut world, map, class) = setup(10, 10);
        let other = spawn_map(&mut world, 10, 10, "elsewhere").unwrap();
        let a = world.spawn(&class);
        let b = world.spawn(&class);
        set_pos(&mut world, a, 0, 0, Some(map)).unwrap();
        set_pos(&mut world, b, 3, 4, Some(map)).unwrap();
        assert_eq!(distance(&world, a, b), 5.0);
        set_pos(&mut world, b, 3, 4, Some(other)).unwrap();
        assert!(distance(&world, a, b).is_infinite());
    }

    #[test]
    fn line_targets_collect_units_along_the_ray() {
        let (mut world, map, class) = setup(20, 20);
        let source = world.spawn(&class);
        let middle = world.spawn(&class);
        let target = world.spawn(&class);
        let off_line = world.spawn(&class);
        set_pos(&mut world, source, 1, 1, Some(map)).unwrap();
        set_pos(&mut world, middle, 4, 1, Some(map)).unwrap();
        set_pos(&mut world, target, 7, 1, Some(map)).unwrap();
        set_pos(&mut world, off_line, 4, 8, Some(map)).unwrap();

        let hits = select_line_targets(&world, source, target, 10.0, 1.0);
        assert_eq!(hits, vec![source, middle, target]);

        let short = select_line_targets(&world, source, target, 1.0, 1.0);
        assert_eq!(short, vec![source]);
    }

    #[test]
    fn coincident_line_targets_short_circuit() {
        let (mut world, map, class) = setup(10, 10);
        let a = world.spawn(&class);
        let b = world.spawn(&class);
        set_pos(&mut world, a, 3, 3, Some(map)).unwrap();
        set_pos(&mut world, b, 3, 3, Some(map)).unwrap();
        assert_eq!(select_line_targets(&world, a, b, 5.0, 1.0), vec![a, b]);
    }

    #[test]
    fn move_to_respects_travel_limit() {
        let (mut world, map, class) = setup(20, 20);
        let unit = world.spawn(&class);
        world.fetch::<Board>(unit).unwrap().apply_dex(10.0); // limit 3
        set_pos(&mut world, unit, 0, 0, Some(map)).unwrap();

        let steps = move_to(&mut world, unit, 10, 0).unwrap();
        assert_eq!(steps, 3);
        assert_eq!(world.get::<Positional>(unit).map(|p| (p.x, p.y)), Some((3, 0)));
        assert_eq!(world.get::<Board>(unit).unwrap().efforts, 7);
    }

    #[test]
    fn move_to_never_overshoots_destination() {
        let (mut world, map, class) = setup(20, 20);
        let unit = world.spawn(&class);
        world.fetch::<Board>(unit).unwrap().apply_dex(30.0); // limit 9
        set_pos(&mut world, unit, 10, 10, Some(map)).unwrap();

        move_to(&mut world, unit, 10, 8).unwrap();
        assert_eq!(world.get::<Positional>(unit).map(|p| (p.x, p.y)), Some((10, 8)));

        move_to(&mut world, unit, 7, 8).unwrap();
        assert_eq!(world.get::<Positional>(unit).map(|p| (p.x, p.y)), Some((7, 8)));
    }

    #[test]
    fn move_to_stops_at_unaffordable_or_missing_cells() {
        let (mut world, map, class) = setup(5, 5);
        let unit = world.spawn(&class);
        world.fetch::<Board>(unit).unwrap().apply_dex(30.0);
        set_pos(&mut world, unit, 2, 0, Some(map)).unwrap();
        world
            .get_mut::<Map>(map)
            .unwrap()
            .cell_mut(CellCoord::new(0, 4))
            .unwrap()
            .pass_consumption = 50;

        // Column 4 is too expensive.
        assert_eq!(move_to(&mut world, unit, 4, 0).unwrap(), 1);
        assert_eq!(world.get::<Positional>(unit).map(|p| p.x), Some(3));

        // Row -1 is off the map.
        set_pos(&mut world, unit, 0, 1, None).unwrap();
        assert_eq!(move_to(&mut world, unit, 0, -5).unwrap(), 1);
        assert_eq!(world.get::<Positional>(unit).map(|p| (p.x, p.y)), Some((0, 0)));
    }
}
