//! Autosplitter state types

use serde::{Deserialize, Serialize};

use super::events::SplitEvent;

/// Current state of the autosplitter
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AutosplitterState {
    /// ID of the game being tracked
    pub game_id: String,
    /// Whether a game process is currently attached
    pub process_attached: bool,
    /// Process ID if attached
    pub process_id: Option<u32>,
    /// Process name if attached
    pub process_name: Option<String>,
    /// Number of ticks processed
    pub ticks: u64,
    /// Event indices that fired since the last reset, in firing order
    pub splits_fired: Vec<usize>,
    /// Load-removal signal from the last tick
    pub is_loading: Option<bool>,
}

impl AutosplitterState {
    pub fn new(game_id: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
            ..Default::default()
        }
    }

    pub fn mark_attached(&mut self, process_id: u32, process_name: impl Into<String>) {
        self.process_attached = true;
        self.process_id = Some(process_id);
        self.process_name = Some(process_name.into());
    }

    pub fn mark_detached(&mut self) {
        self.process_attached = false;
        self.process_id = None;
        self.process_name = None;
        self.is_loading = None;
    }

    pub fn record_split(&mut self, event: &SplitEvent) {
        self.splits_fired.push(event.index);
    }

    /// Clear per-run progress
    pub fn reset(&mut self) {
        self.splits_fired.clear();
    }
}

/// Result of a single tick
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TickResult {
    /// Splits that fired this tick, in configuration order
    pub splits: Vec<SplitEvent>,
    /// Whether the game is loading (None if unknown or detached)
    pub is_loading: Option<bool>,
    pub process_attached: bool,
}

impl TickResult {
    pub fn should_split(&self) -> bool {
        !self.splits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_detach() {
        let mut state = AutosplitterState::new("kingpin");
        state.mark_attached(1234, "kingpin.exe");
        state.is_loading = Some(true);
        assert!(state.process_attached);
        assert_eq!(state.process_id, Some(1234));

        state.mark_detached();
        assert!(!state.process_attached);
        assert_eq!(state.process_id, None);
        assert_eq!(state.process_name, None);
        assert_eq!(state.is_loading, None);
        assert_eq!(state.game_id, "kingpin");
    }

    #[test]
    fn test_record_and_reset() {
        let mut state = AutosplitterState::new("kingpin");
        state.record_split(&SplitEvent::new(0, "a", 1));
        state.record_split(&SplitEvent::new(2, "b", 5));
        assert_eq!(state.splits_fired, vec![0, 2]);

        state.ticks = 9;
        state.reset();
        assert!(state.splits_fired.is_empty());
        assert_eq!(state.ticks, 9);
    }

    #[test]
    fn test_state_serialization() {
        let mut state = AutosplitterState::new("kingpin");
        state.mark_attached(42, "kingpin.exe");
        let json = serde_json::to_string(&state).unwrap();
        let parsed: AutosplitterState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, state);
    }
}
