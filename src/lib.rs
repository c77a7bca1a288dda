//! Kingpin Autosplitter
//!
//! A memory-polling autosplitter for Kingpin: Life of Crime. The host timer
//! calls [`Autosplitter::tick`] on its own cadence; every tick the game state,
//! current map and boss cutscene flag are read from the game process and the
//! configured split events are evaluated against them.
//!
//! This crate can be used as:
//! - A Rust library (rlib) for direct integration
//! - A dynamic library (cdylib) for FFI-based loading, see [`ffi`]
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use kingpin_autosplitter::{create_autosplitter, AutosplitterConfig, SystemProcessFinder};
//!
//! let config = AutosplitterConfig::from_toml_str(r#"
//!     [[events]]
//!     type = "map_finished"
//!     map = "intro"
//! "#)?;
//! let mut autosplitter = create_autosplitter(&config, Arc::new(SystemProcessFinder))?;
//!
//! let result = autosplitter.tick();
//! for split in &result.splits {
//!     println!("split: {}", split.description);
//! }
//! # Ok::<(), kingpin_autosplitter::AutosplitterError>(())
//! ```

pub mod config;
pub mod core;
mod error;
pub mod ffi;
pub mod games;
pub mod memory;

pub use config::AutosplitterConfig;
pub use core::{Autosplitter, AutosplitterState, SplitEvent, TickResult};
pub use error::{AutosplitterError, Result};
pub use games::kingpin::{
    create_autosplitter, GameSnapshot, Kingpin, KingpinAutosplitter, KingpinEvent, KingpinState,
    MapName,
};
pub use games::{Game, GameMetadata, SplitCondition, StateTracker};
pub use memory::{MemoryReader, ProcessContext, ProcessFinder, SystemProcessFinder};
