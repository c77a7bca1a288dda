//! Events emitted by the autosplitter

use serde::{Deserialize, Serialize};

/// Event emitted when a configured split condition is met
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitEvent {
    /// Position of the event in the configured event list
    pub index: usize,
    /// Human-readable description of the event
    pub description: String,
    /// Tick on which the event fired
    pub tick: u64,
}

impl SplitEvent {
    pub fn new(index: usize, description: impl Into<String>, tick: u64) -> Self {
        Self {
            index,
            description: description.into(),
            tick,
        }
    }
}

/// Callback type for split events
pub type SplitCallback = Box<dyn Fn(&SplitEvent) + Send + Sync>;

/// Event handler that can have multiple listeners
#[derive(Default)]
pub struct EventHandler {
    callbacks: Vec<SplitCallback>,
}

impl EventHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a callback for split events
    pub fn on_split(&mut self, callback: SplitCallback) {
        self.callbacks.push(callback);
    }

    /// Emit a split event to all listeners
    pub fn emit(&self, event: &SplitEvent) {
        for callback in &self.callbacks {
            callback(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_emit_reaches_all_listeners() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut handler = EventHandler::new();

        for _ in 0..2 {
            let count = count.clone();
            handler.on_split(Box::new(move |event| {
                assert_eq!(event.index, 3);
                count.fetch_add(1, Ordering::SeqCst);
            }));
        }

        handler.emit(&SplitEvent::new(3, "Map 'intro.bsp' was loaded", 7));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
