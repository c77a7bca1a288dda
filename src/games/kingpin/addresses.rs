//! Memory addresses for Kingpin builds
//!
//! Offsets are relative to the main module base. A build is recognized by the
//! size of its main module.

use serde::{Deserialize, Serialize};

/// Game state code (i32): 3 = menu or loading, 4 = in game
pub const GAME_STATE_OFFSET: usize = 0xE7A180;
/// Current map file name, NUL-terminated ASCII
pub const MAP_NAME_OFFSET: usize = 0x90A705;
/// Nonzero while the scripted boss cutscene plays.
///
/// Unverified for retail builds: check it against your executable and
/// override `cutscene_flag` in the address table or a `[[versions]]` entry.
pub const CUTSCENE_FLAG_OFFSET: usize = 0x90A6F0;
/// Size of the map name buffer
pub const MAP_NAME_LENGTH: usize = 16;

/// Offsets of the values the tracker polls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressTable {
    pub game_state: usize,
    pub map_name: usize,
    pub cutscene_flag: usize,
}

impl Default for AddressTable {
    fn default() -> Self {
        Self {
            game_state: GAME_STATE_OFFSET,
            map_name: MAP_NAME_OFFSET,
            cutscene_flag: CUTSCENE_FLAG_OFFSET,
        }
    }
}

/// Addresses for one specific game build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionConfig {
    pub name: String,
    /// Main module size identifying the build
    pub module_size: usize,
    #[serde(default)]
    pub addresses: AddressTable,
}

/// Pick the address table for a module size.
///
/// The first version whose module size matches wins; otherwise the default
/// table is used and no version name is returned.
pub fn select_addresses<'a>(
    default: &AddressTable,
    versions: &'a [VersionConfig],
    module_size: usize,
) -> (Option<&'a str>, AddressTable) {
    versions
        .iter()
        .find(|v| v.module_size == module_size)
        .map(|v| (Some(v.name.as_str()), v.addresses))
        .unwrap_or((None, *default))
}
