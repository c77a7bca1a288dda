//! Kingpin game state tracking

use serde::{Deserialize, Serialize};

use super::addresses::{AddressTable, MAP_NAME_LENGTH};
use crate::games::StateTracker;
use crate::memory::ProcessContext;

/// Game state as reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KingpinState {
    /// Nothing has been read yet
    #[default]
    Unread,
    MenuOrLoading,
    InGame,
    /// Any other state code
    Other(i32),
}

impl KingpinState {
    pub fn from_code(code: i32) -> Self {
        match code {
            3 => KingpinState::MenuOrLoading,
            4 => KingpinState::InGame,
            other => KingpinState::Other(other),
        }
    }
}

/// Values read during the last poll ticks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub previous_state: KingpinState,
    pub current_state: KingpinState,
    /// Empty until a map has been read
    pub previous_map: String,
    pub current_map: String,
    /// True only on the tick a map transition is observed
    pub map_changed: bool,
    pub in_special_cutscene: bool,
}

impl GameSnapshot {
    pub fn in_game(&self) -> bool {
        self.current_state == KingpinState::InGame
    }
}

/// Tracks Kingpin state across poll ticks
pub struct KingpinTracker {
    addresses: AddressTable,
    snapshot: GameSnapshot,
}

impl KingpinTracker {
    pub fn new(addresses: AddressTable) -> Self {
        Self {
            addresses,
            snapshot: GameSnapshot::default(),
        }
    }

    pub fn addresses(&self) -> &AddressTable {
        &self.addresses
    }

    fn update_state(&mut self, ctx: &ProcessContext) {
        let code = match ctx.read_i32(self.addresses.game_state) {
            Ok(code) => code,
            Err(e) => {
                log::trace!("Kingpin: state not updated: {}", e);
                return;
            }
        };

        self.snapshot.previous_state = self.snapshot.current_state;
        self.snapshot.current_state = KingpinState::from_code(code);

        if self.snapshot.previous_state != self.snapshot.current_state {
            log::debug!(
                "Kingpin: state {:?} -> {:?}",
                self.snapshot.previous_state,
                self.snapshot.current_state
            );
            self.update_map(ctx);
        }
    }

    fn update_map(&mut self, ctx: &ProcessContext) {
        match ctx.read_c_string(self.addresses.map_name, MAP_NAME_LENGTH) {
            Ok(map) if map != self.snapshot.current_map => {
                log::debug!("Kingpin: map '{}' -> '{}'", self.snapshot.current_map, map);
                self.snapshot.previous_map = std::mem::replace(&mut self.snapshot.current_map, map);
                self.snapshot.map_changed = true;
            }
            Ok(_) => {}
            Err(e) => log::trace!("Kingpin: map not updated: {}", e),
        }
    }

    fn update_cutscene(&mut self, ctx: &ProcessContext) {
        self.snapshot.in_special_cutscene = match ctx.read_u8(self.addresses.cutscene_flag) {
            Ok(flag) => flag != 0,
            Err(e) => {
                log::trace!("Kingpin: cutscene flag unreadable: {}", e);
                false
            }
        };
    }
}

impl StateTracker for KingpinTracker {
    type Snapshot = GameSnapshot;

    fn update(&mut self, ctx: &ProcessContext) {
        self.snapshot.map_changed = false;
        self.update_state(ctx);
        self.update_cutscene(ctx);
    }

    fn snapshot(&self) -> &GameSnapshot {
        &self.snapshot
    }

    fn is_loading(&self) -> Option<bool> {
        match self.snapshot.current_state {
            KingpinState::Unread => None,
            _ => Some(!self.snapshot.in_game()),
        }
    }
}
