//! Items and the bag that carries them
//!
//! Concrete items (weapons, books, drugs) implement [`Item`]. Items are
//! stored in a unit's [`Bag`] under an [`ItemId`] that stays the same when
//! the item changes hands.
//!
//! Hooks receive the whole game state, so the helpers here take the item
//! out of its bag before calling a hook and put it back afterwards.

use skein_core::combat::Board;
use skein_core::define_component;
use skein_core::ecs::EntityId;
use skein_core::math::clamp;
use skein_core::sim::{Effect, GameState, SimError, Step};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

pub const BAG_CAPACITY: u32 = 100;
pub const MAX_MONEY: i64 = 99_999_999;

/// Stable handle of one item instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u64);

impl ItemId {
    /// Allocate a fresh, process-unique id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// Something a unit can carry and use.
pub trait Item: 'static {
    fn name(&self) -> &str;

    fn weight(&self) -> u32 {
        0
    }

    /// Action points spent per activation.
    fn activation_cost(&self) -> i32 {
        1
    }

    fn on_activated(
        &mut self,
        _state: &mut GameState,
        _unit: EntityId,
        _target: Option<EntityId>,
    ) -> Result<(), SimError> {
        Ok(())
    }

    fn on_deactivated(&mut self, _state: &mut GameState, _unit: EntityId) -> Result<(), SimError> {
        Ok(())
    }

    fn on_install(&mut self, _state: &mut GameState, _unit: EntityId) -> Result<(), SimError> {
        Ok(())
    }

    /// Removing an item deactivates it unless the item says otherwise.
    fn on_uninstall(&mut self, state: &mut GameState, unit: EntityId) -> Result<(), SimError> {
        self.on_deactivated(state, unit)
    }
}

/// Money and items carried by a unit.
pub struct Bag {
    pub capacity: u32,
    load: u32,
    money: i64,
    items: BTreeMap<ItemId, Box<dyn Item>>,
    /// Items lent out to one of their own hooks. Their weight stays in `load`.
    lent: BTreeSet<ItemId>,
}
define_component!(Bag, 32, "Bag");

impl Default for Bag {
    fn default() -> Self {
        Self {
            capacity: BAG_CAPACITY,
            load: 0,
            money: 0,
            items: BTreeMap::new(),
            lent: BTreeSet::new(),
        }
    }
}

impl Bag {
    pub fn money(&self) -> i64 {
        self.money
    }

    /// Add (or with a negative value, remove) money, clamped to `[0, MAX_MONEY]`.
    pub fn add_money(&mut self, value: i64) {
        self.money = clamp(self.money.saturating_add(value), 0, MAX_MONEY);
    }

    pub fn remove_money(&mut self, value: i64) {
        self.add_money(value.saturating_neg());
    }

    /// Total weight carried.
    pub fn load(&self) -> u32 {
        self.load
    }

    pub fn has_item(&self, id: ItemId) -> bool {
        self.items.contains_key(&id) || self.lent.contains(&id)
    }

    pub fn item(&self, id: ItemId) -> Option<&dyn Item> {
        self.items.get(&id).map(|item| &**item)
    }

    pub fn items(&self) -> impl Iterator<Item = (ItemId, &dyn Item)> + '_ {
        self.items.iter().map(|(&id, item)| (id, &**item))
    }

    pub fn matching_items(&self, pred: impl Fn(&dyn Item) -> bool) -> Vec<ItemId> {
        self.items()
            .filter(|(_, item)| pred(*item))
            .map(|(id, _)| id)
            .collect()
    }

    /// First item called `name`.
    pub fn find_by_name(&self, name: &str) -> Option<ItemId> {
        self.items()
            .find(|(_, item)| item.name() == name)
            .map(|(id, _)| id)
    }

    pub fn can_hold(&self, item: &dyn Item) -> bool {
        self.load + item.weight() <= self.capacity
    }

    fn store(&mut self, id: ItemId, item: Box<dyn Item>) -> Result<(), Box<dyn Item>> {
        if self.has_item(id) || !self.can_hold(&*item) {
            return Err(item);
        }
        self.load += item.weight();
        self.items.insert(id, item);
        Ok(())
    }

    fn take(&mut self, id: ItemId) -> Option<Box<dyn Item>> {
        let item = self.items.remove(&id)?;
        self.load -= item.weight();
        Some(item)
    }

    /// Remove an item but keep its id and weight reserved until `give_back`.
    fn lend(&mut self, id: ItemId) -> Option<Box<dyn Item>> {
        let item = self.items.remove(&id)?;
        self.lent.insert(id);
        Some(item)
    }

    /// Return a lent item. Always succeeds, even over capacity.
    fn give_back(&mut self, id: ItemId, item: Box<dyn Item>) {
        self.lent.remove(&id);
        self.items.insert(id, item);
    }
}

impl fmt::Debug for Bag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.items.values().map(|item| item.name()).collect();
        f.debug_struct("Bag")
            .field("money", &self.money)
            .field("load", &self.load)
            .field("capacity", &self.capacity)
            .field("items", &names)
            .finish()
    }
}

/// Put `item` into `unit`'s bag under `id` and run its install hook.
///
/// Hands the item back when the bag refuses it (duplicate id or too heavy).
pub fn install_as(
    state: &mut GameState,
    unit: EntityId,
    id: ItemId,
    item: Box<dyn Item>,
) -> Result<Option<Box<dyn Item>>, SimError> {
    if let Err(refused) = state.world.fetch::<Bag>(unit)?.store(id, item) {
        return Ok(Some(refused));
    }
    with_item(state, unit, id, |item, state| item.on_install(state, unit))?;
    Ok(None)
}

/// Give `unit` a new item. Returns its id, or `None` if the bag is full.
pub fn install(
    state: &mut GameState,
    unit: EntityId,
    item: impl Item,
) -> Result<Option<ItemId>, SimError> {
    let id = ItemId::next();
    let refused = install_as(state, unit, id, Box::new(item))?;
    Ok(refused.is_none().then_some(id))
}

/// Take an item out of `unit`'s bag and run its uninstall hook.
pub fn uninstall(
    state: &mut GameState,
    unit: EntityId,
    id: ItemId,
) -> Result<Option<Box<dyn Item>>, SimError> {
    let Some(mut item) = state.world.fetch::<Bag>(unit)?.take(id) else {
        return Ok(None);
    };
    item.on_uninstall(state, unit)?;
    Ok(Some(item))
}

/// Move an item between bags, keeping its id.
///
/// If the receiving bag refuses it, the item goes back to `from`.
pub fn transfer(
    state: &mut GameState,
    from: EntityId,
    to: EntityId,
    id: ItemId,
) -> Result<bool, SimError> {
    let Some(item) = uninstall(state, from, id)? else {
        return Ok(false);
    };
    match install_as(state, to, id, item)? {
        None => Ok(true),
        Some(refused) => {
            if install_as(state, from, id, refused)?.is_some() {
                tracing::warn!(%id, "item lost: neither bag would take it back");
            }
            Ok(false)
        }
    }
}

/// Run `f` on an item while it is temporarily out of the bag.
///
/// The item's slot stays reserved, so it always goes back in afterwards.
fn with_item<R>(
    state: &mut GameState,
    unit: EntityId,
    id: ItemId,
    f: impl FnOnce(&mut dyn Item, &mut GameState) -> Result<R, SimError>,
) -> Result<Option<R>, SimError> {
    let Some(mut item) = state.world.fetch::<Bag>(unit)?.lend(id) else {
        return Ok(None);
    };
    let result = f(&mut *item, state);
    match state.world.get_mut::<Bag>(unit) {
        Some(bag) => bag.give_back(id, item),
        None => tracing::warn!(%id, name = item.name(), "item dropped: owner has no bag"),
    }
    result.map(Some)
}

fn item_name(state: &mut GameState, unit: EntityId, id: ItemId) -> Result<Option<String>, SimError> {
    Ok(state
        .world
        .fetch::<Bag>(unit)?
        .item(id)
        .map(|item| item.name().to_string()))
}

/// Use an item from the bag on an optional target.
pub struct Activate {
    pub emitter: EntityId,
    pub item: ItemId,
    pub target: Option<EntityId>,
}

impl Activate {
    pub fn new(emitter: EntityId, item: ItemId, target: Option<EntityId>) -> Self {
        Self {
            emitter,
            item,
            target,
        }
    }
}

impl Effect for Activate {
    fn name(&self) -> &'static str {
        "activate"
    }

    fn on_step(&mut self, state: &mut GameState) -> Result<Step, SimError> {
        let Some(name) = item_name(state, self.emitter, self.item)? else {
            state.log_units(
                format!("{} is not in the bag, cannot use it", self.item),
                &[self.emitter],
                false,
            );
            return Ok(Step::Done);
        };
        let cost = state
            .world
            .fetch::<Bag>(self.emitter)?
            .item(self.item)
            .map_or(0, |item| item.activation_cost());
        if !state.world.fetch::<Board>(self.emitter)?.consume_efforts(cost) {
            state.log_units(
                format!("not enough action points to use [{name}]"),
                &[self.emitter],
                false,
            );
            return Ok(Step::Done);
        }
        let (emitter, target) = (self.emitter, self.target);
        with_item(state, emitter, self.item, |item, state| {
            item.on_activated(state, emitter, target)
        })?;
        state.log_units(format!("used [{name}]"), &[emitter], true);
        Ok(Step::Done)
    }
}

/// Stop using an item from the bag.
pub struct Deactivate {
    pub emitter: EntityId,
    pub item: ItemId,
}

impl Deactivate {
    pub fn new(emitter: EntityId, item: ItemId) -> Self {
        Self { emitter, item }
    }
}

impl Effect for Deactivate {
    fn name(&self) -> &'static str {
        "deactivate"
    }

    fn on_step(&mut self, state: &mut GameState) -> Result<Step, SimError> {
        let Some(name) = item_name(state, self.emitter, self.item)? else {
            state.log_units(
                format!("{} is not in the bag, cannot stop using it", self.item),
                &[self.emitter],
                false,
            );
            return Ok(Step::Done);
        };
        let emitter = self.emitter;
        with_item(state, emitter, self.item, |item, state| {
            item.on_deactivated(state, emitter)
        })?;
        state.log_units(format!("stopped using [{name}]"), &[emitter], true);
        Ok(Step::Done)
    }
}
