use crate::ecs::EntityId;
use thiserror::Error;

/// Errors raised by component and entity access.
///
/// These are programming errors: they identify a type or handle the caller
/// should never have asked for, and they propagate out of the scheduler.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EcsError {
    #[error("component {component} is not registered for entity class '{class}'")]
    NoComponent {
        component: &'static str,
        class: String,
    },

    #[error("entity {0} does not exist")]
    NoEntity(EntityId),

    #[error("entity {entity} has no {component} instance")]
    MissingComponent {
        component: &'static str,
        entity: EntityId,
    },
}
