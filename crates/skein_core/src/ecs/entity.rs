//! Entity handles and per-entity component slots
//!
//! `EntityId` is a lightweight handle (8 bytes) into the `World`; the
//! generation counter prevents use-after-free of despawned slots.
//! `Entity` is the slot array itself, laid out by its `EntityClass`.

use crate::ecs::{AnyComponent, Component, ComponentInfo, EcsError, EntityClass};
use std::fmt;
use std::sync::Arc;

/// Entity handle (generation-indexed for safety)
///
/// Format: [32-bit index | 32-bit generation]
/// - Index: Position in the world's entity table
/// - Generation: Incremented on despawn (prevents use-after-free)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl EntityId {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Serialize to 64-bit integer
    pub fn to_bits(&self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64)
    }

    /// Deserialize from 64-bit integer
    pub fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Fixed-size array of optional component instances.
///
/// Slots are created lazily: either on the first `get_or_default` of a type
/// or when a component is handed to `insert`.
pub struct Entity {
    id: EntityId,
    class: Arc<EntityClass>,
    slots: Vec<Option<Box<dyn AnyComponent>>>,
}

impl Entity {
    pub(crate) fn new(id: EntityId, class: Arc<EntityClass>) -> Self {
        let slots = (0..class.len()).map(|_| None).collect();
        Self { id, class, slots }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn class(&self) -> &EntityClass {
        &self.class
    }

    /// Locate the slot answering a query for `info`.
    ///
    /// The exact slot wins; otherwise the polymorphic index set is scanned in
    /// ascending order and the lowest populated slot holding a subtype is
    /// returned. Ambiguity between several populated subtypes therefore
    /// always resolves to the lowest slot index.
    fn locate(&self, info: &ComponentInfo) -> Option<usize> {
        if let Some(slot) = self.class.slot_of(info.id) {
            if self.slots[slot].is_some() {
                return Some(slot);
            }
        }
        self.class.indices_of(info.id).iter().copied().find(|&slot| {
            self.slots[slot]
                .as_ref()
                .is_some_and(|stored| stored.info().is_subtype_of(info))
        })
    }

    /// Polymorphic lookup: returns the instance of `T` or of one of its subtypes.
    pub fn get<T: Component>(&self) -> Option<&T> {
        let slot = self.locate(T::INFO)?;
        self.slots[slot]
            .as_deref()?
            .upcast_to(T::INFO.id)?
            .downcast_ref::<T>()
    }

    /// Mutable counterpart of [`Entity::get`].
    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        let slot = self.locate(T::INFO)?;
        self.slots[slot]
            .as_deref_mut()?
            .upcast_to_mut(T::INFO.id)?
            .downcast_mut::<T>()
    }

    pub fn has<T: Component>(&self) -> bool {
        self.locate(T::INFO).is_some()
    }

    /// Store `component` in its exact slot, replacing any previous instance.
    ///
    /// Returns `false` when the type has no slot in this entity's class.
    pub fn insert<T: Component>(&mut self, component: T) -> bool {
        match self.class.slot_of(T::INFO.id) {
            Some(slot) => {
                self.slots[slot] = Some(Box::new(component));
                true
            }
            None => false,
        }
    }

    /// Fetch-or-create.
    ///
    /// Returns the instance answering a query for `T` if there is one;
    /// otherwise builds a default `T`, stores it in its exact slot, runs its
    /// initializer and returns it. Fails only when `T` never appears in any
    /// declared type's ancestor chain.
    pub fn get_or_default<T: Component + Default>(&mut self) -> Result<&mut T, EcsError> {
        let slot = match self.locate(T::INFO) {
            Some(slot) => slot,
            None => {
                let slot = self.class.slot_of(T::INFO.id).ok_or_else(|| {
                    EcsError::NoComponent {
                        component: T::INFO.name,
                        class: self.class.name().to_string(),
                    }
                })?;
                let mut component = T::default();
                component.init();
                self.slots[slot] = Some(Box::new(component));
                slot
            }
        };
        self.slots[slot]
            .as_deref_mut()
            .and_then(|stored| stored.upcast_to_mut(T::INFO.id))
            .and_then(|any| any.downcast_mut::<T>())
            .ok_or(EcsError::MissingComponent {
                component: T::INFO.name,
                entity: self.id,
            })
    }

    /// Drop the instance stored in `T`'s exact slot.
    pub fn remove<T: Component>(&mut self) -> bool {
        match self.class.slot_of(T::INFO.id) {
            Some(slot) => self.slots[slot].take().is_some(),
            None => false,
        }
    }

    /// Names of the populated components, in slot order.
    pub fn populated(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slots
            .iter()
            .filter_map(|slot| slot.as_deref().map(|stored| stored.info().name))
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("class", &self.class.name())
            .field("components", &self.populated().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::define_component;

    #[derive(Default)]
    struct Counter {
        ticks: u32,
    }
    define_component!(Counter, 700, "Counter");

    #[derive(Default)]
    struct Named {
        label: String,
    }
    define_component!(Named, 701, "Named");

    #[derive(Default)]
    struct Boss {
        named: Named,
    }
    define_component!(Boss, 702, "Boss", extends { Named => named });

    #[derive(Default)]
    struct Elite {
        named: Named,
    }
    define_component!(Elite, 703, "Elite", extends { Named => named });

    #[derive(Default)]
    struct Stray;
    define_component!(Stray, 704, "Stray");

    fn entity(declared: &[&'static ComponentInfo]) -> Entity {
        Entity::new(
            EntityId::new(0, 0),
            Arc::new(EntityClass::new("test", declared)),
        )
    }

    #[test]
    fn entity_bits_roundtrip() {
        let id = EntityId::new(42, 7);
        assert_eq!(EntityId::from_bits(id.to_bits()), id);
    }

    #[test]
    fn get_or_default_is_idempotent() {
        let mut e = entity(&[Counter::INFO]);
        assert!(e.get::<Counter>().is_none());
        e.get_or_default::<Counter>().unwrap().ticks = 3;
        let again = e.get_or_default::<Counter>().unwrap();
        assert_eq!(again.ticks, 3);
        again.ticks += 1;
        assert_eq!(e.get::<Counter>().map(|c| c.ticks), Some(4));
    }

    #[test]
    fn get_or_default_runs_initializer() {
        #[derive(Default)]
        struct Primed {
            charges: u32,
        }
        impl Component for Primed {
            const INFO: &'static ComponentInfo = &ComponentInfo {
                id: 705,
                name: "Primed",
                bases: &[],
            };

            fn init(&mut self) {
                self.charges = 3;
            }
        }

        let mut e = entity(&[Primed::INFO]);
        assert_eq!(e.get_or_default::<Primed>().unwrap().charges, 3);
        e.get_or_default::<Primed>().unwrap().charges = 1;
        assert_eq!(e.get_or_default::<Primed>().unwrap().charges, 1);
    }

    #[test]
    fn get_or_default_rejects_unregistered_type() {
        let mut e = entity(&[Counter::INFO]);
        let err = e.get_or_default::<Stray>().map(|_| ()).unwrap_err();
        assert!(matches!(
            err,
            EcsError::NoComponent { component: "Stray", .. }
        ));
    }

    #[test]
    fn base_query_finds_subtype_instance() {
        let mut e = entity(&[Boss::INFO]);
        let mut boss = Boss::default();
        boss.named.label = "warden".into();
        assert!(e.insert(boss));

        assert_eq!(e.get::<Named>().map(|n| n.label.as_str()), Some("warden"));
        e.get_mut::<Named>().unwrap().label = "keeper".into();
        assert_eq!(e.get::<Boss>().map(|b| b.named.label.as_str()), Some("keeper"));
    }

    #[test]
    fn base_type_fetch_without_declaration_uses_its_own_slot() {
        // Named only appears as an ancestor of Boss.
        let mut e = entity(&[Boss::INFO]);
        e.get_or_default::<Named>().unwrap().label = "plain".into();
        assert!(e.get::<Boss>().is_none());
        assert_eq!(e.get::<Named>().map(|n| n.label.as_str()), Some("plain"));
    }

    #[test]
    fn ambiguous_subtypes_resolve_to_lowest_slot() {
        let mut e = entity(&[Elite::INFO, Boss::INFO]);
        let mut boss = Boss::default();
        boss.named.label = "boss".into();
        let mut elite = Elite::default();
        elite.named.label = "elite".into();
        e.insert(boss);
        e.insert(elite);

        let elite_slot = e.class().slot_of(Elite::INFO.id).unwrap();
        let boss_slot = e.class().slot_of(Boss::INFO.id).unwrap();
        let expected = if elite_slot < boss_slot { "elite" } else { "boss" };
        assert_eq!(e.get::<Named>().map(|n| n.label.as_str()), Some(expected));
    }

    #[test]
    fn insert_ignores_types_outside_the_class() {
        let mut e = entity(&[Counter::INFO]);
        assert!(!e.insert(Stray));
        assert!(!e.has::<Stray>());
        assert!(!e.remove::<Counter>());
    }
}
