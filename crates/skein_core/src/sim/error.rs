use crate::ecs::EcsError;
use thiserror::Error;

/// Errors that abort an effect step and propagate out of `advance`.
///
/// Gameplay rejections never end up here; effects log those and finish.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Ecs(#[from] EcsError),

    #[error("unit '{0}' is not registered")]
    UnknownUnit(String),
}
