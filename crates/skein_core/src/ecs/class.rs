// class.rs - Per-entity-class slot and index tables
//
// An entity class is the set of component types declared for one kind of
// entity. The tables are computed once when the class is built and never
// change afterwards.

use crate::ecs::{ComponentId, ComponentInfo};
use std::collections::{BTreeSet, HashMap};

/// Precomputed component layout for one entity class.
///
/// Every type reached while walking a declared type's ancestor chain gets a
/// dense, zero-based slot. The index set of a type holds its own slot plus
/// the slots of all its subtypes known to the class.
#[derive(Debug)]
pub struct EntityClass {
    name: String,
    slots: Vec<&'static ComponentInfo>,
    exact: HashMap<ComponentId, usize>,
    indices: HashMap<ComponentId, Vec<usize>>,
}

impl EntityClass {
    /// Build the tables for the declared component types.
    ///
    /// Declaration order only affects slot numbering; the index sets are
    /// closed under the subtype relation for any order.
    pub fn new(name: impl Into<String>, declared: &[&'static ComponentInfo]) -> Self {
        let mut slots: Vec<&'static ComponentInfo> = Vec::new();
        let mut exact: HashMap<ComponentId, usize> = HashMap::new();
        let mut indices: HashMap<ComponentId, BTreeSet<usize>> = HashMap::new();

        for &info in declared {
            for ancestor in info.ancestors() {
                if exact.contains_key(&ancestor.id) {
                    continue;
                }
                let slot = slots.len();
                slots.push(ancestor);
                exact.insert(ancestor.id, slot);
                indices.entry(ancestor.id).or_default().insert(slot);

                // Bases discovered earlier learn about the new subtype.
                for (&known, set) in indices.iter_mut() {
                    if known != ancestor.id && ancestor.is_subtype_of(slots[exact[&known]]) {
                        set.insert(slot);
                    }
                }

                // Subtypes discovered earlier contribute everything they have.
                let inherited: Vec<usize> = indices
                    .iter()
                    .filter(|&(&known, _)| {
                        known != ancestor.id && slots[exact[&known]].is_subtype_of(ancestor)
                    })
                    .flat_map(|(_, set)| set.iter().copied())
                    .collect();
                indices.entry(ancestor.id).or_default().extend(inherited);
            }
        }

        let name = name.into();
        tracing::debug!(class = %name, slots = slots.len(), "entity class registered");

        Self {
            name,
            slots,
            exact,
            indices: indices
                .into_iter()
                .map(|(id, set)| (id, set.into_iter().collect()))
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of component slots an entity of this class carries.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot reserved for exactly this component type.
    pub fn slot_of(&self, id: ComponentId) -> Option<usize> {
        self.exact.get(&id).copied()
    }

    /// Ascending slot indices that may hold an instance of `id`.
    pub fn indices_of(&self, id: ComponentId) -> &[usize] {
        self.indices.get(&id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Descriptor of the component stored in `slot`.
    pub fn info_at(&self, slot: usize) -> Option<&'static ComponentInfo> {
        self.slots.get(slot).copied()
    }

    /// Iterate over `(slot, descriptor)` pairs in slot order.
    pub fn slots(&self) -> impl Iterator<Item = (usize, &'static ComponentInfo)> + '_ {
        self.slots.iter().copied().enumerate()
    }
}
