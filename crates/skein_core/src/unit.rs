// unit.rs - Identity of an acting entity

use crate::define_component;

/// Display name used as the log subject, plus the group back-reference.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Unit {
    pub name: String,
    /// Name of the group this unit belongs to.
    pub group: Option<String>,
}
define_component!(Unit, 1, "Unit");

impl Unit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: None,
        }
    }
}
