//! Kingpin split events

use std::fmt;

use serde::{Deserialize, Serialize};

use super::state::{GameSnapshot, KingpinState};
use crate::games::{EventTypeInfo, SplitCondition};

/// File extension of Kingpin maps
pub const MAP_EXTENSION: &str = ".bsp";
/// Map hosting the final boss cutscene
pub const CUTSCENE_MAP: &str = "rcboss2";

/// A map file name, always ending in `.bsp`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MapName(String);

impl MapName {
    /// Create a map name, appending the extension when missing
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        if name.ends_with(MAP_EXTENSION) {
            MapName(name)
        } else {
            MapName(name + MAP_EXTENSION)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name without the extension
    pub fn stem(&self) -> &str {
        self.0.trim_end_matches(MAP_EXTENSION)
    }
}

impl TryFrom<String> for MapName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let map = MapName::new(value.trim());
        if map.stem().is_empty() {
            Err("map name must not be empty".to_string())
        } else {
            Ok(map)
        }
    }
}

impl From<MapName> for String {
    fn from(map: MapName) -> Self {
        map.0
    }
}

impl PartialEq<str> for MapName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl fmt::Display for MapName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Events parameterized by a map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapEventKind {
    Loaded,
    Finished,
}

/// Events without a map parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneralEventKind {
    MapChanged,
    CutsceneStarted,
}

/// A configured Kingpin split event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "EventConfig", from = "EventConfig")]
pub enum KingpinEvent {
    WithMap { kind: MapEventKind, map: MapName },
    WithoutMap { kind: GeneralEventKind },
}

/// Flat form used in configuration files
#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum EventConfig {
    MapLoaded { map: MapName },
    MapFinished { map: MapName },
    MapChanged,
    CutsceneStarted,
}

impl From<EventConfig> for KingpinEvent {
    fn from(config: EventConfig) -> Self {
        match config {
            EventConfig::MapLoaded { map } => KingpinEvent::WithMap {
                kind: MapEventKind::Loaded,
                map,
            },
            EventConfig::MapFinished { map } => KingpinEvent::WithMap {
                kind: MapEventKind::Finished,
                map,
            },
            EventConfig::MapChanged => KingpinEvent::WithoutMap {
                kind: GeneralEventKind::MapChanged,
            },
            EventConfig::CutsceneStarted => KingpinEvent::WithoutMap {
                kind: GeneralEventKind::CutsceneStarted,
            },
        }
    }
}

impl From<KingpinEvent> for EventConfig {
    fn from(event: KingpinEvent) -> Self {
        match event {
            KingpinEvent::WithMap { kind: MapEventKind::Loaded, map } => {
                EventConfig::MapLoaded { map }
            }
            KingpinEvent::WithMap { kind: MapEventKind::Finished, map } => {
                EventConfig::MapFinished { map }
            }
            KingpinEvent::WithoutMap { kind: GeneralEventKind::MapChanged } => {
                EventConfig::MapChanged
            }
            KingpinEvent::WithoutMap { kind: GeneralEventKind::CutsceneStarted } => {
                EventConfig::CutsceneStarted
            }
        }
    }
}

impl KingpinEvent {
    /// A certain map was loaded
    pub fn loaded_map(map: impl Into<String>) -> Self {
        KingpinEvent::WithMap {
            kind: MapEventKind::Loaded,
            map: MapName::new(map),
        }
    }

    /// A certain map was finished
    pub fn finished_map(map: impl Into<String>) -> Self {
        KingpinEvent::WithMap {
            kind: MapEventKind::Finished,
            map: MapName::new(map),
        }
    }

    pub fn map_changed() -> Self {
        KingpinEvent::WithoutMap {
            kind: GeneralEventKind::MapChanged,
        }
    }

    pub fn cutscene_started() -> Self {
        KingpinEvent::WithoutMap {
            kind: GeneralEventKind::CutsceneStarted,
        }
    }

    /// Target map, for map-parameterized events
    pub fn map(&self) -> Option<&MapName> {
        match self {
            KingpinEvent::WithMap { map, .. } => Some(map),
            KingpinEvent::WithoutMap { .. } => None,
        }
    }

    /// Identifier of the event type (matches the `type` key in configuration)
    pub fn type_id(&self) -> &'static str {
        match self {
            KingpinEvent::WithMap { kind: MapEventKind::Loaded, .. } => "map_loaded",
            KingpinEvent::WithMap { kind: MapEventKind::Finished, .. } => "map_finished",
            KingpinEvent::WithoutMap { kind: GeneralEventKind::MapChanged } => "map_changed",
            KingpinEvent::WithoutMap { kind: GeneralEventKind::CutsceneStarted } => {
                "cutscene_started"
            }
        }
    }

    /// All event types Kingpin knows about
    pub fn all_types() -> Vec<EventTypeInfo> {
        vec![
            event_type("map_loaded", "Map Loaded", "A certain map was loaded.", true),
            event_type("map_finished", "Map Finished", "A certain map was finished.", true),
            event_type("map_changed", "Map Changed", "The current map changed.", false),
            event_type(
                "cutscene_started",
                "Boss Cutscene Started",
                "The final boss cutscene on rcboss2 started.",
                false,
            ),
        ]
    }
}

fn event_type(id: &str, name: &str, description: &str, takes_map: bool) -> EventTypeInfo {
    EventTypeInfo {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        takes_map,
    }
}

impl SplitCondition<GameSnapshot> for KingpinEvent {
    fn has_occurred(&self, info: &GameSnapshot) -> bool {
        match self {
            KingpinEvent::WithMap { kind: MapEventKind::Loaded, map } => {
                info.previous_state != KingpinState::InGame
                    && info.in_game()
                    && *map == *info.current_map
            }
            KingpinEvent::WithMap { kind: MapEventKind::Finished, map } => {
                info.map_changed && *map != *info.current_map && *map == *info.previous_map
            }
            KingpinEvent::WithoutMap { kind: GeneralEventKind::MapChanged } => info.map_changed,
            KingpinEvent::WithoutMap { kind: GeneralEventKind::CutsceneStarted } => {
                info.in_special_cutscene && MapName::new(CUTSCENE_MAP) == *info.current_map
            }
        }
    }

    fn is_level_triggered(&self) -> bool {
        matches!(
            self,
            KingpinEvent::WithoutMap {
                kind: GeneralEventKind::CutsceneStarted
            }
        )
    }
}

impl fmt::Display for KingpinEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KingpinEvent::WithMap { kind: MapEventKind::Loaded, map } => {
                write!(f, "Map '{}' was loaded", map)
            }
            KingpinEvent::WithMap { kind: MapEventKind::Finished, map } => {
                write!(f, "Map '{}' was finished", map)
            }
            KingpinEvent::WithoutMap { kind: GeneralEventKind::MapChanged } => {
                write!(f, "Map changed")
            }
            KingpinEvent::WithoutMap { kind: GeneralEventKind::CutsceneStarted } => {
                write!(f, "Cutscene on '{}{}' started", CUTSCENE_MAP, MAP_EXTENSION)
            }
        }
    }
}
