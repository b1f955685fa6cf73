// map.rs - Bounded grid of lazily created cells

use crate::define_component;
use crate::ecs::EntityId;
use std::collections::BTreeSet;
use std::fmt;

/// Callback fired with the unit and the cell it entered or left.
pub type CellListener = Box<dyn FnMut(EntityId, CellCoord)>;

/// Grid cell coordinates. `row` follows the y axis, `col` the x axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    pub row: usize,
    pub col: usize,
}

impl CellCoord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// One grid square: the units standing on it and its enter/exit listeners.
pub struct MapCell {
    coord: CellCoord,
    /// Action points spent to step onto this cell.
    pub pass_consumption: i32,
    units: BTreeSet<EntityId>,
    enter_listeners: Vec<CellListener>,
    exit_listeners: Vec<CellListener>,
}

impl MapCell {
    fn new(coord: CellCoord) -> Self {
        Self {
            coord,
            pass_consumption: 1,
            units: BTreeSet::new(),
            enter_listeners: Vec::new(),
            exit_listeners: Vec::new(),
        }
    }

    pub fn coord(&self) -> CellCoord {
        self.coord
    }

    pub fn on_enter(&mut self, listener: impl FnMut(EntityId, CellCoord) + 'static) {
        self.enter_listeners.push(Box::new(listener));
    }

    pub fn on_exit(&mut self, listener: impl FnMut(EntityId, CellCoord) + 'static) {
        self.exit_listeners.push(Box::new(listener));
    }

    pub fn contains(&self, unit: EntityId) -> bool {
        self.units.contains(&unit)
    }

    /// Units currently located here, in handle order.
    pub fn units(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.units.iter().copied()
    }

    /// Record `unit` arriving. Listeners fire only if it was not already here.
    pub(crate) fn entered_by(&mut self, unit: EntityId) -> bool {
        if !self.units.insert(unit) {
            return false;
        }
        let coord = self.coord;
        for listener in &mut self.enter_listeners {
            listener(unit, coord);
        }
        true
    }

    /// Record `unit` leaving. Listeners fire only if it was here.
    pub(crate) fn left_by(&mut self, unit: EntityId) -> bool {
        if !self.units.remove(&unit) {
            return false;
        }
        let coord = self.coord;
        for listener in &mut self.exit_listeners {
            listener(unit, coord);
        }
        true
    }
}

impl fmt::Debug for MapCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapCell")
            .field("coord", &self.coord)
            .field("pass_consumption", &self.pass_consumption)
            .field("units", &self.units)
            .finish()
    }
}

/// A `rows × cols` grid, held as a component of a map entity.
pub struct Map {
    name: String,
    rows: usize,
    cols: usize,
    cells: Vec<Option<MapCell>>,
}
define_component!(Map, 4, "Map");

impl Map {
    pub fn new(rows: usize, cols: usize, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows,
            cols,
            cells: (0..rows * cols).map(|_| None).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn index(&self, coord: CellCoord) -> Option<usize> {
        (coord.row < self.rows && coord.col < self.cols).then(|| coord.row * self.cols + coord.col)
    }

    /// Existing cell at `coord`; cells nobody touched yet read as `None`.
    pub fn cell(&self, coord: CellCoord) -> Option<&MapCell> {
        self.cells.get(self.index(coord)?)?.as_ref()
    }

    /// Cell at `coord`, created on first access. `None` only when out of bounds.
    pub fn cell_mut(&mut self, coord: CellCoord) -> Option<&mut MapCell> {
        let index = self.index(coord)?;
        Some(self.cells[index].get_or_insert_with(|| MapCell::new(coord)))
    }

    /// Map a point to a cell by truncation (`x` → column, `y` → row).
    pub fn cell_at_point(&self, x: i32, y: i32) -> Option<CellCoord> {
        if x < 0 || y < 0 {
            return None;
        }
        let coord = CellCoord::new(y as usize, x as usize);
        self.index(coord).map(|_| coord)
    }

    /// Action points needed to step onto `coord`. Untouched cells use the default.
    pub fn pass_consumption(&self, coord: CellCoord) -> Option<i32> {
        self.index(coord)?;
        Some(self.cell(coord).map_or(1, |cell| cell.pass_consumption))
    }

    /// In-bounds cells whose centre lies within `radius` of the point `(x, y)`.
    ///
    /// Uses the integer midpoint-circle membership test with the radius
    /// rounded up: `dx² + dy² ≤ ⌈radius⌉²`.
    pub fn cells_within_circle(&self, x: i32, y: i32, radius: f64) -> Vec<CellCoord> {
        let r = radius.max(0.0).ceil() as i64;
        let (row, col) = (y as i64, x as i64);
        let mut cells = Vec::new();
        for k in (row - r)..=(row + r) {
            for l in (col - r)..=(col + r) {
                if k < 0 || l < 0 || k >= self.rows as i64 || l >= self.cols as i64 {
                    continue;
                }
                if (k - row).pow(2) + (l - col).pow(2) <= r * r {
                    cells.push(CellCoord::new(k as usize, l as usize));
                }
            }
        }
        cells
    }

    /// Units standing within `radius` of `(x, y)`, cell by cell.
    pub fn units_within_circle(&self, x: i32, y: i32, radius: f64) -> Vec<EntityId> {
        self.cells_within_circle(x, y, radius)
            .into_iter()
            .filter_map(|coord| self.cell(coord))
            .flat_map(|cell| cell.units())
            .collect()
    }
}

impl fmt::Debug for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Map")
            .field("name", &self.name)
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .finish()
    }
}
