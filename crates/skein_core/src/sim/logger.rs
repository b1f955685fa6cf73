//! Gameplay log collaborators
//!
//! Every state change or rejected action is reported through `Logger` with
//! the names of the units involved. Whether a line is broadcast or kept
//! private is the collaborator's business.

use std::cell::RefCell;
use std::rc::Rc;

pub trait Logger {
    fn log(&mut self, message: &str, subjects: &[String], public: bool);
}

/// Forwards gameplay lines to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&mut self, message: &str, subjects: &[String], public: bool) {
        tracing::info!(target: "skein::gameplay", subjects = ?subjects, public, "{message}");
    }
}

/// One captured gameplay line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub message: String,
    pub subjects: Vec<String>,
    pub public: bool,
}

/// Keeps every line in a shared list.
///
/// Clones share the same list, so a test can keep one handle and give the
/// other to the game state.
#[derive(Debug, Default, Clone)]
pub struct RecordingLogger {
    records: Rc<RefCell<Vec<LogRecord>>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.borrow().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.records
            .borrow()
            .iter()
            .map(|record| record.message.clone())
            .collect()
    }

    /// Whether any captured line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.records
            .borrow()
            .iter()
            .any(|record| record.message.contains(needle))
    }

    pub fn clear(&self) {
        self.records.borrow_mut().clear();
    }
}

impl Logger for RecordingLogger {
    fn log(&mut self, message: &str, subjects: &[String], public: bool) {
        self.records.borrow_mut().push(LogRecord {
            message: message.to_string(),
            subjects: subjects.to_vec(),
            public,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_records() {
        let handle = RecordingLogger::new();
        let mut logger = handle.clone();
        logger.log("joined group [red]", &["alice".to_string()], true);

        assert_eq!(
            handle.records(),
            vec![LogRecord {
                message: "joined group [red]".into(),
                subjects: vec!["alice".into()],
                public: true,
            }]
        );
        assert!(handle.contains("[red]"));
        handle.clear();
        assert!(handle.messages().is_empty());
    }
}
