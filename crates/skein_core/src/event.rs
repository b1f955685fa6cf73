//! Zero-argument multicast events
//!
//! Used for death notification. Subscribers are identified by the handle
//! returned from `subscribe`, so the same callback can never be registered
//! twice under one handle and removal is explicit.

use std::collections::BTreeMap;
use std::fmt;

/// Handle returned by [`Event::subscribe`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// A deduplicated set of callbacks.
///
/// Invocation order is unspecified. The current implementation happens to
/// call listeners in subscription order, but callers must not rely on it.
#[derive(Default)]
pub struct Event {
    next_id: u64,
    listeners: BTreeMap<ListenerId, Box<dyn FnMut()>>,
}

impl Event {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut() + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.insert(id, Box::new(listener));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Invoke every listener once.
    pub fn emit(&mut self) {
        for listener in self.listeners.values_mut() {
            listener();
        }
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn emit_reaches_every_subscriber() {
        let hits = Rc::new(Cell::new(0));
        let mut event = Event::new();
        for _ in 0..3 {
            let hits = Rc::clone(&hits);
            event.subscribe(move || hits.set(hits.get() + 1));
        }
        event.emit();
        assert_eq!(hits.get(), 3);
    }

    #[test]
    fn unsubscribe_removes_only_that_listener() {
        let hits = Rc::new(Cell::new(0));
        let mut event = Event::new();
        let a = {
            let hits = Rc::clone(&hits);
            event.subscribe(move || hits.set(hits.get() + 1))
        };
        let _b = {
            let hits = Rc::clone(&hits);
            event.subscribe(move || hits.set(hits.get() + 10))
        };
        assert!(event.unsubscribe(a));
        assert!(!event.unsubscribe(a));
        event.emit();
        assert_eq!(hits.get(), 10);
        assert_eq!(event.len(), 1);
    }
}
