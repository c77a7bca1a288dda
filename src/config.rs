//! Configuration types for the autosplitter
//!
//! The host hands over a TOML (or JSON) document describing the optional event
//! toggles, address overrides for specific game builds and the events to split on.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::games::kingpin::{AddressTable, KingpinEvent, KingpinSettings, VersionConfig};
use crate::{AutosplitterError, Result};

/// Full autosplitter configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutosplitterConfig {
    /// Process names to attach to; empty means the game's defaults
    #[serde(default)]
    pub process_names: Vec<String>,
    #[serde(default)]
    pub settings: KingpinSettings,
    /// Addresses used when no version matches
    #[serde(default)]
    pub addresses: AddressTable,
    #[serde(default)]
    pub versions: Vec<VersionConfig>,
    /// Events to split on, in split order
    #[serde(default)]
    pub events: Vec<KingpinEvent>,
}

impl AutosplitterConfig {
    /// Parse a TOML configuration
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON configuration
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file; `.json` files are parsed as JSON, anything else as TOML
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        log::info!("Loading autosplitter config from {}", path.display());

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            _ => Self::from_toml_str(&contents),
        }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Check the configuration for values that can never work
    pub fn validate(&self) -> Result<()> {
        for (index, event) in self.events.iter().enumerate() {
            if event.map().is_some_and(|m| m.stem().trim().is_empty()) {
                return Err(AutosplitterError::InvalidConfig(format!(
                    "event {} ({}) has an empty map name",
                    index,
                    event.type_id()
                )));
            }
        }

        let mut names = HashSet::new();
        for version in &self.versions {
            if !names.insert(version.name.as_str()) {
                return Err(AutosplitterError::InvalidConfig(format!(
                    "duplicate version '{}'",
                    version.name
                )));
            }
        }

        if self.process_names.iter().any(|n| n.trim().is_empty()) {
            return Err(AutosplitterError::InvalidConfig(
                "process names must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config() {
        let config = AutosplitterConfig::from_toml_str("").unwrap();
        assert!(config.process_names.is_empty());
        assert_eq!(config.settings, KingpinSettings::default());
        assert_eq!(config.addresses, AddressTable::default());
        assert!(config.versions.is_empty());
        assert!(config.events.is_empty());
    }

    #[test]
    fn test_full_config() {
        let config = AutosplitterConfig::from_toml_str(
            r#"
            process_names = ["kingpin"]

            [settings]
            map_changed = false

            [addresses]
            cutscene_flag = 0x90A700

            [[versions]]
            name = "1.21"
            module_size = 0x1000000
            [versions.addresses]
            game_state = 0xE7A190

            [[events]]
            type = "map_loaded"
            map = "intro"

            [[events]]
            type = "map_finished"
            map = "intro"
            "#,
        )
        .unwrap();

        assert_eq!(config.process_names, vec!["kingpin"]);
        assert!(!config.settings.map_changed);
        assert!(config.settings.cutscene_started);
        assert_eq!(config.addresses.cutscene_flag, 0x90A700);
        assert_eq!(config.addresses.game_state, 0xE7A180);
        assert_eq!(config.versions[0].module_size, 0x1000000);
        assert_eq!(config.versions[0].addresses.game_state, 0xE7A190);
        assert_eq!(config.versions[0].addresses.map_name, 0x90A705);
        assert_eq!(
            config.events,
            vec![
                KingpinEvent::loaded_map("intro"),
                KingpinEvent::finished_map("intro.bsp"),
            ]
        );
    }

    #[test]
    fn test_json_config() {
        let config = AutosplitterConfig::from_json_str(
            r#"{"events": [{"type": "map_changed"}, {"type": "cutscene_started"}]}"#,
        )
        .unwrap();
        assert_eq!(
            config.events,
            vec![KingpinEvent::map_changed(), KingpinEvent::cutscene_started()]
        );
    }

    #[test]
    fn test_unknown_event_type_rejected() {
        let result = AutosplitterConfig::from_toml_str(
            r#"
            [[events]]
            type = "boss_killed"
            "#,
        );
        assert!(matches!(result, Err(AutosplitterError::Toml(_))));
    }

    #[test]
    fn test_empty_map_rejected() {
        let config = AutosplitterConfig {
            events: vec![KingpinEvent::loaded_map("")],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AutosplitterError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_duplicate_versions_rejected() {
        let version = VersionConfig {
            name: "1.21".to_string(),
            module_size: 0x1000,
            addresses: AddressTable::default(),
        };
        let config = AutosplitterConfig {
            versions: vec![version.clone(), version],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AutosplitterError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_to_toml_string_parses_back() {
        let config = AutosplitterConfig {
            events: vec![
                KingpinEvent::loaded_map("intro"),
                KingpinEvent::cutscene_started(),
            ],
            ..Default::default()
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(AutosplitterConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let result = AutosplitterConfig::load("/nonexistent/kingpin.toml");
        assert!(matches!(result, Err(AutosplitterError::Io(_))));
    }
}
