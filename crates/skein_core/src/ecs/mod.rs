//! Entity Component System core types.
//!
//! Component types are declared statically with their supertypes. Each
//! entity class precomputes a slot per concrete type plus a polymorphic
//! index set per type, so queries by base type never need runtime type
//! introspection. Entities live in the `World` and are addressed by
//! generational `EntityId` handles.

mod class;
mod component;
mod entity;
mod error;
mod world;

pub use class::EntityClass;
pub use component::{AnyComponent, Component, ComponentId, ComponentInfo};
pub use entity::{Entity, EntityId};
pub use error::EcsError;
pub use world::World;
