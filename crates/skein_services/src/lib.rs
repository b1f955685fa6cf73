//! Skein Services Layer
//!
//! Process-level plumbing shared by binaries: settings and log output.

pub mod logging;
pub mod settings;

pub use logging::init_logging;
pub use settings::{Settings, SettingsError};
