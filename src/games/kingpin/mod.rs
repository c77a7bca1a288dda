//! Kingpin: Life of Crime
//!
//! Splits on map loads, map completions and the final boss cutscene. The game
//! has no usable in-game timer, but load removal works off the game state code.

pub mod addresses;
pub mod events;
pub mod state;

pub use addresses::{AddressTable, VersionConfig};
pub use events::{GeneralEventKind, KingpinEvent, MapEventKind, MapName};
pub use state::{GameSnapshot, KingpinState, KingpinTracker};

use serde::{Deserialize, Serialize};

use super::{EventTypeInfo, Game};
use crate::config::AutosplitterConfig;
use crate::core::Autosplitter;
use crate::memory::{ProcessContext, ProcessFinder};
use crate::Result;

use std::sync::Arc;

pub const GAME_ID: &str = "kingpin";
pub const GAME_NAME: &str = "Kingpin";
pub const PROCESS_NAMES: &[&str] = &["kingpin"];

/// Autosplitter specialized for Kingpin
pub type KingpinAutosplitter = Autosplitter<Kingpin>;

/// Toggles for optional events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KingpinSettings {
    pub map_changed: bool,
    pub cutscene_started: bool,
}

impl Default for KingpinSettings {
    fn default() -> Self {
        Self {
            map_changed: true,
            cutscene_started: true,
        }
    }
}

pub struct Kingpin {
    settings: KingpinSettings,
    addresses: AddressTable,
    versions: Vec<VersionConfig>,
    process_names: Vec<String>,
}

impl Kingpin {
    pub fn new() -> Self {
        Self {
            settings: KingpinSettings::default(),
            addresses: AddressTable::default(),
            versions: Vec::new(),
            process_names: PROCESS_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Build the game from a configuration, keeping defaults for unset parts
    pub fn from_config(config: &AutosplitterConfig) -> Self {
        let mut game = Self::new();
        game.settings = config.settings;
        game.addresses = config.addresses;
        game.versions = config.versions.clone();
        if !config.process_names.is_empty() {
            game.process_names = config.process_names.clone();
        }
        game
    }

    pub fn with_settings(mut self, settings: KingpinSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &KingpinSettings {
        &self.settings
    }
}

impl Default for Kingpin {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for Kingpin {
    type Tracker = KingpinTracker;
    type Event = KingpinEvent;

    fn id(&self) -> &'static str {
        GAME_ID
    }

    fn name(&self) -> &'static str {
        GAME_NAME
    }

    fn process_names(&self) -> Vec<String> {
        self.process_names.clone()
    }

    fn game_time_exists(&self) -> bool {
        false
    }

    fn load_removal_exists(&self) -> bool {
        true
    }

    fn event_types(&self) -> Vec<EventTypeInfo> {
        KingpinEvent::all_types()
            .into_iter()
            .filter(|t| match t.id.as_str() {
                "map_changed" => self.settings.map_changed,
                "cutscene_started" => self.settings.cutscene_started,
                _ => true,
            })
            .collect()
    }

    fn is_event_enabled(&self, event: &KingpinEvent) -> bool {
        match event {
            KingpinEvent::WithMap { .. } => true,
            KingpinEvent::WithoutMap { kind: GeneralEventKind::MapChanged } => {
                self.settings.map_changed
            }
            KingpinEvent::WithoutMap { kind: GeneralEventKind::CutsceneStarted } => {
                self.settings.cutscene_started
            }
        }
    }

    fn create_tracker(&self, ctx: &ProcessContext) -> KingpinTracker {
        let (version, addresses) =
            addresses::select_addresses(&self.addresses, &self.versions, ctx.module_size());
        match version {
            Some(name) => log::info!("Kingpin: using addresses for version {}", name),
            None => log::info!(
                "Kingpin: no version matches module size 0x{:X}, using default addresses",
                ctx.module_size()
            ),
        }
        KingpinTracker::new(addresses)
    }
}

/// Build a Kingpin autosplitter from a validated configuration
pub fn create_autosplitter(
    config: &AutosplitterConfig,
    finder: Arc<dyn ProcessFinder>,
) -> Result<KingpinAutosplitter> {
    config.validate()?;
    let game = Kingpin::from_config(config);
    Ok(Autosplitter::new(game, config.events.clone(), finder))
}
