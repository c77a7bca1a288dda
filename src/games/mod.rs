//! Game trait and implementations
//!
//! A game supplies static metadata (names, process names, capability flags and
//! the event types it offers) and acts as the factory for a [`StateTracker`],
//! the game-specific state that the generic poller updates every tick.

pub mod kingpin;

pub use kingpin::Kingpin;

use serde::{Deserialize, Serialize};

use crate::memory::ProcessContext;

/// Information about an event type a game offers for configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTypeInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Whether the event is parameterized by a map name
    pub takes_map: bool,
}

/// Game-specific state that is refreshed from process memory once per tick
pub trait StateTracker: Send {
    /// Values exposed to split conditions
    type Snapshot;

    /// Poll memory and update the snapshot. Read failures never propagate.
    fn update(&mut self, ctx: &ProcessContext);

    /// Current snapshot
    fn snapshot(&self) -> &Self::Snapshot;

    /// Whether the game is loading, for load removal (None if unknown)
    fn is_loading(&self) -> Option<bool> {
        None
    }
}

/// A configured split condition evaluated against a snapshot
pub trait SplitCondition<S> {
    /// True on the tick the event happens
    fn has_occurred(&self, snapshot: &S) -> bool;

    /// Whether the condition stays true while a game flag is held.
    /// Such conditions only split on the tick they become true.
    fn is_level_triggered(&self) -> bool {
        false
    }
}

/// Trait that all game implementations must satisfy
pub trait Game: Send {
    type Tracker: StateTracker;
    type Event: SplitCondition<<Self::Tracker as StateTracker>::Snapshot>
        + std::fmt::Display
        + Send;

    /// Unique identifier for this game (e.g., "kingpin")
    fn id(&self) -> &'static str;

    /// Human-readable game name
    fn name(&self) -> &'static str;

    /// Process names to search for
    fn process_names(&self) -> Vec<String>;

    /// Whether the game exposes a usable in-game timer
    fn game_time_exists(&self) -> bool;

    /// Whether load removal applies to this game
    fn load_removal_exists(&self) -> bool;

    /// Event types offered for configuration under the current settings
    fn event_types(&self) -> Vec<EventTypeInfo>;

    /// Whether a configured event may be used under the current settings
    fn is_event_enabled(&self, event: &Self::Event) -> bool;

    /// Create a tracker for a freshly attached process
    fn create_tracker(&self, ctx: &ProcessContext) -> Self::Tracker;

    /// Name of the host component
    fn component_name(&self) -> String {
        format!("{} Autosplitter", self.name())
    }

    /// Description of the host component
    fn description(&self) -> String {
        let mut description = format!("Automates splitting for {}", self.name());
        if self.load_removal_exists() {
            description.push_str(" and allows to remove loadtimes");
        }
        description.push('.');
        description
    }
}

/// Static facts about a game, serializable for the host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMetadata {
    pub id: String,
    pub name: String,
    pub component_name: String,
    pub description: String,
    pub process_names: Vec<String>,
    pub game_time_exists: bool,
    pub load_removal_exists: bool,
    pub event_types: Vec<EventTypeInfo>,
}

impl GameMetadata {
    /// Collect the metadata of a game
    pub fn of<G: Game>(game: &G) -> Self {
        Self {
            id: game.id().to_string(),
            name: game.name().to_string(),
            component_name: game.component_name(),
            description: game.description(),
            process_names: game.process_names(),
            game_time_exists: game.game_time_exists(),
            load_removal_exists: game.load_removal_exists(),
            event_types: game.event_types(),
        }
    }
}
