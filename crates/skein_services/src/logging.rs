//! Log output for binaries

use crate::settings::{LoggingSettings, SettingsError};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Build the filter for `settings.level`.
pub fn filter(settings: &LoggingSettings) -> Result<EnvFilter, SettingsError> {
    EnvFilter::try_new(&settings.level).map_err(|_| SettingsError::LogFilter(settings.level.clone()))
}

/// Install the global fmt subscriber.
///
/// An invalid filter falls back to `info`. Calling this twice is harmless;
/// the second subscriber is simply not installed.
pub fn init_logging(settings: &LoggingSettings) {
    let (filter, rejected) = match filter(settings) {
        Ok(filter) => (filter, None),
        Err(err) => (EnvFilter::new("info"), Some(err)),
    };
    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .is_ok();
    if let Some(err) = rejected {
        tracing::warn!(error = %err, "falling back to the info log level");
    }
    tracing::debug!(level = %settings.level, installed, "logging initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_accepts_directives() {
        let settings = LoggingSettings {
            level: "warn,skein::gameplay=info".into(),
        };
        assert!(filter(&settings).is_ok());
    }

    #[test]
    fn filter_rejects_garbage() {
        let settings = LoggingSettings {
            level: "[[not a filter".into(),
        };
        assert!(matches!(filter(&settings), Err(SettingsError::LogFilter(_))));
    }
}
