// component.rs - Static component descriptors and polymorphic upcasting
//
// Components are identified by u32 IDs declared next to the type. Each
// descriptor lists its direct supertypes, which is all the registry needs
// to compute slot and index tables without runtime type introspection.

use std::any::Any;
use std::fmt;

pub type ComponentId = u32;

/// Static description of a component type and its place in the type graph.
///
/// The shared root tag is implicit: a component with no `bases` derives
/// directly from it and it never receives a slot.
pub struct ComponentInfo {
    pub id: ComponentId,
    pub name: &'static str,
    /// Direct supertypes, left to right.
    pub bases: &'static [&'static ComponentInfo],
}

impl ComponentInfo {
    /// Ancestor chain starting with `self`, followed by a depth-first,
    /// left-to-right walk of the bases with duplicates removed.
    pub fn ancestors(&'static self) -> Vec<&'static ComponentInfo> {
        let mut chain = Vec::new();
        self.collect_ancestors(&mut chain);
        chain
    }

    fn collect_ancestors(&'static self, chain: &mut Vec<&'static ComponentInfo>) {
        if chain.iter().any(|known| known.id == self.id) {
            return;
        }
        chain.push(self);
        for base in self.bases {
            base.collect_ancestors(chain);
        }
    }

    /// Reflexive subtype check.
    pub fn is_subtype_of(&self, other: &ComponentInfo) -> bool {
        self.id == other.id || self.bases.iter().any(|base| base.is_subtype_of(other))
    }
}

impl PartialEq for ComponentInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ComponentInfo {}

impl fmt::Debug for ComponentInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bases: Vec<&str> = self.bases.iter().map(|base| base.name).collect();
        f.debug_struct("ComponentInfo")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("bases", &bases)
            .finish()
    }
}

impl fmt::Display for ComponentInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.id)
    }
}

/// Trait for entity-scoped state bundles.
///
/// A subtype embeds the state of each supertype and returns it from
/// `upcast`, so a query by base type can hand out the embedded value.
/// Use [`define_component!`](crate::define_component) rather than writing
/// the upcast table by hand.
pub trait Component: Any + Sized {
    /// Static descriptor, unique per type.
    const INFO: &'static ComponentInfo;

    /// Initializer run once after a default instance is created on demand.
    fn init(&mut self) {}

    /// Borrow the part of `self` that represents component `target`.
    fn upcast(&self, target: ComponentId) -> Option<&dyn Any> {
        (target == Self::INFO.id).then_some(self as &dyn Any)
    }

    /// Mutable counterpart of [`Component::upcast`].
    fn upcast_mut(&mut self, target: ComponentId) -> Option<&mut dyn Any> {
        if target == Self::INFO.id {
            Some(self as &mut dyn Any)
        } else {
            None
        }
    }
}

/// Object-safe view of a stored component.
pub trait AnyComponent: Any {
    fn info(&self) -> &'static ComponentInfo;
    fn upcast_to(&self, target: ComponentId) -> Option<&dyn Any>;
    fn upcast_to_mut(&mut self, target: ComponentId) -> Option<&mut dyn Any>;
}

impl<T: Component> AnyComponent for T {
    #[inline]
    fn info(&self) -> &'static ComponentInfo {
        T::INFO
    }

    #[inline]
    fn upcast_to(&self, target: ComponentId) -> Option<&dyn Any> {
        Component::upcast(self, target)
    }

    #[inline]
    fn upcast_to_mut(&mut self, target: ComponentId) -> Option<&mut dyn Any> {
        Component::upcast_mut(self, target)
    }
}

/// Helper macro to implement the `Component` trait.
///
/// # Example
/// ```ignore
/// #[derive(Default)]
/// struct Health { hp: f64 }
/// define_component!(Health, 10, "Health");
///
/// // `Armored` is both a `Health` and a `Tagged`; it embeds their state.
/// #[derive(Default)]
/// struct Armored { health: Health, tagged: Tagged, plates: u32 }
/// define_component!(Armored, 12, "Armored", extends { Health => health, Tagged => tagged });
/// ```
#[macro_export]
macro_rules! define_component {
    ($ty:ty, $id:expr, $name:expr) => {
        impl $crate::ecs::Component for $ty {
            const INFO: &'static $crate::ecs::ComponentInfo = &$crate::ecs::ComponentInfo {
                id: $id,
                name: $name,
                bases: &[],
            };
        }
    };
    ($ty:ty, $id:expr, $name:expr, extends { $($base:ty => $field:ident),+ $(,)? }) => {
        impl $crate::ecs::Component for $ty {
            const INFO: &'static $crate::ecs::ComponentInfo = &$crate::ecs::ComponentInfo {
                id: $id,
                name: $name,
                bases: &[$(<$base as $crate::ecs::Component>::INFO),+],
            };

            fn upcast(
                &self,
                target: $crate::ecs::ComponentId,
            ) -> ::std::option::Option<&dyn ::std::any::Any> {
                if target == <Self as $crate::ecs::Component>::INFO.id {
                    return ::std::option::Option::Some(self as &dyn ::std::any::Any);
                }
                $(
                    if let ::std::option::Option::Some(found) =
                        <$base as $crate::ecs::Component>::upcast(&self.$field, target)
                    {
                        return ::std::option::Option::Some(found);
                    }
                )+
                ::std::option::Option::None
            }

            fn upcast_mut(
                &mut self,
                target: $crate::ecs::ComponentId,
            ) -> ::std::option::Option<&mut dyn ::std::any::Any> {
                if target == <Self as $crate::ecs::Component>::INFO.id {
                    return ::std::option::Option::Some(self as &mut dyn ::std::any::Any);
                }
                $(
                    if <$base as $crate::ecs::Component>::upcast(&self.$field, target).is_some() {
                        return <$base as $crate::ecs::Component>::upcast_mut(&mut self.$field, target);
                    }
                )+
                ::std::option::Option::None
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::define_component;

    #[derive(Default)]
    struct Left {
        value: i32,
    }
    define_component!(Left, 900, "Left");

    #[derive(Default)]
    struct Right;
    define_component!(Right, 901, "Right");

    #[derive(Default)]
    struct Both {
        left: Left,
        right: Right,
    }
    define_component!(Both, 902, "Both", extends { Left => left, Right => right });

    #[test]
    fn ancestors_walk_bases_left_to_right() {
        let names: Vec<&str> = Both::INFO.ancestors().iter().map(|info| info.name).collect();
        assert_eq!(names, vec!["Both", "Left", "Right"]);
    }

    #[test]
    fn subtype_relation_is_reflexive_and_follows_bases() {
        assert!(Both::INFO.is_subtype_of(Left::INFO));
        assert!(Both::INFO.is_subtype_of(Right::INFO));
        assert!(Left::INFO.is_subtype_of(Left::INFO));
        assert!(!Left::INFO.is_subtype_of(Both::INFO));
    }

    #[test]
    fn upcast_reaches_embedded_base_state() {
        let mut both = Both::default();
        both.left.value = 7;
        let left = both
            .upcast(Left::INFO.id)
            .and_then(|any| any.downcast_ref::<Left>())
            .map(|left| left.value);
        assert_eq!(left, Some(7));

        if let Some(left) = both
            .upcast_mut(Left::INFO.id)
            .and_then(|any| any.downcast_mut::<Left>())
        {
            left.value = 9;
        }
        assert_eq!(both.left.value, 9);
        assert!(both.upcast(999).is_none());
    }
}
