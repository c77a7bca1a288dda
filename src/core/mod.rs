//! Core autosplitter abstractions
//!
//! This module contains the main types for the autosplitter:
//! - `Autosplitter` - Generic poller driven by the host's timer
//! - `AutosplitterState` - Current state of the autosplitter
//! - `SplitEvent` - Events emitted when splits are detected

mod events;
mod runner;
mod state;

pub use events::{EventHandler, SplitCallback, SplitEvent};
pub use runner::Autosplitter;
pub use state::{AutosplitterState, TickResult};
