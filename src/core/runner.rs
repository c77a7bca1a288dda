//! Main autosplitter runner

use std::sync::Arc;

use super::events::{EventHandler, SplitCallback, SplitEvent};
use super::state::{AutosplitterState, TickResult};
use crate::games::{Game, SplitCondition, StateTracker};
use crate::memory::{ProcessContext, ProcessFinder};

type SnapshotOf<G> = <<G as Game>::Tracker as StateTracker>::Snapshot;

struct AttachedProcess<T> {
    ctx: ProcessContext,
    tracker: T,
}

/// Polls a game process and evaluates the configured split events.
///
/// The host drives it by calling [`Autosplitter::tick`] from its timer loop;
/// nothing here spawns threads or blocks.
pub struct Autosplitter<G: Game> {
    game: G,
    events: Vec<G::Event>,
    /// Result of each event on the previous tick, for level-triggered events
    was_true: Vec<bool>,
    finder: Arc<dyn ProcessFinder>,
    process: Option<AttachedProcess<G::Tracker>>,
    state: AutosplitterState,
    handler: EventHandler,
}

impl<G: Game> Autosplitter<G> {
    /// Create an autosplitter; events disabled by the game settings are dropped
    pub fn new(game: G, events: Vec<G::Event>, finder: Arc<dyn ProcessFinder>) -> Self {
        let events: Vec<G::Event> = events
            .into_iter()
            .filter(|event| {
                let enabled = game.is_event_enabled(event);
                if !enabled {
                    log::warn!("Ignoring disabled event: {}", event);
                }
                enabled
            })
            .collect();

        log::info!(
            "{} configured with {} events",
            game.component_name(),
            events.len()
        );

        let state = AutosplitterState::new(game.id());
        Self {
            game,
            was_true: vec![false; events.len()],
            events,
            finder,
            process: None,
            state,
            handler: EventHandler::new(),
        }
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn events(&self) -> &[G::Event] {
        &self.events
    }

    pub fn state(&self) -> &AutosplitterState {
        &self.state
    }

    pub fn is_attached(&self) -> bool {
        self.process.is_some()
    }

    /// Snapshot of the attached game, if any
    pub fn snapshot(&self) -> Option<&SnapshotOf<G>> {
        self.process.as_ref().map(|p| p.tracker.snapshot())
    }

    /// Register a callback for split events
    pub fn on_split(&mut self, callback: SplitCallback) {
        self.handler.on_split(callback);
    }

    /// Clear per-run progress; the game snapshot is kept
    pub fn reset(&mut self) {
        self.state.reset();
        self.was_true.fill(false);
        log::info!("Autosplitter reset");
    }

    /// Drop the attached process, if any
    pub fn detach(&mut self) {
        if let Some(process) = self.process.take() {
            log::info!(
                "Detached from '{}' (PID: {})",
                process.ctx.process_name(),
                process.ctx.process_id()
            );
        }
        self.state.mark_detached();
        self.was_true.fill(false);
    }

    /// Run one poll tick: attach if needed, update the game state and
    /// evaluate every configured event.
    pub fn tick(&mut self) -> TickResult {
        self.state.ticks += 1;
        let tick = self.state.ticks;

        if self.process.as_ref().is_some_and(|p| !p.ctx.is_alive()) {
            log::info!("{} process exited", self.game.name());
            self.detach();
        }

        if self.process.is_none() && !self.try_attach() {
            return TickResult::default();
        }

        let Some(process) = self.process.as_mut() else {
            return TickResult::default();
        };

        process.tracker.update(&process.ctx);
        let snapshot = process.tracker.snapshot();

        let mut splits = Vec::new();
        for (index, (event, was_true)) in self.events.iter().zip(&mut self.was_true).enumerate() {
            let occurred = event.has_occurred(snapshot);
            let held = event.is_level_triggered() && *was_true;
            *was_true = occurred;
            if occurred && !held {
                splits.push(SplitEvent::new(index, event.to_string(), tick));
            }
        }

        for split in &splits {
            log::debug!("Split {} on tick {}: {}", split.index, tick, split.description);
            self.state.record_split(split);
            self.handler.emit(split);
        }

        let is_loading = if self.game.load_removal_exists() {
            process.tracker.is_loading()
        } else {
            None
        };
        self.state.is_loading = is_loading;

        TickResult {
            splits,
            is_loading,
            process_attached: true,
        }
    }

    fn try_attach(&mut self) -> bool {
        let names = self.game.process_names();
        let name_refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();

        let Some((pid, name)) = self.finder.find_process(&name_refs) else {
            return false;
        };

        let reader = match self.finder.open_process(pid, &name) {
            Ok(reader) => reader,
            Err(e) => {
                log::debug!("Found '{}' (PID: {}) but could not open it: {}", name, pid, e);
                return false;
            }
        };

        let ctx = ProcessContext::new(reader, pid, name);
        log::info!(
            "Found '{}' (PID: {}), base=0x{:X}, size=0x{:X}",
            ctx.process_name(),
            pid,
            ctx.base_address(),
            ctx.module_size()
        );

        let tracker = self.game.create_tracker(&ctx);
        self.state.mark_attached(pid, ctx.process_name());
        self.process = Some(AttachedProcess { ctx, tracker });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::kingpin::{
        addresses::{CUTSCENE_FLAG_OFFSET, MAP_NAME_LENGTH},
        AddressTable, Kingpin, KingpinEvent, KingpinSettings,
    };
    use crate::memory::{MockMemoryReader, MockProcessFinder};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const BASE: usize = 0x400000;

    fn setup(
        events: Vec<KingpinEvent>,
    ) -> (Autosplitter<Kingpin>, MockMemoryReader, Arc<MockProcessFinder>) {
        let memory = MockMemoryReader::new().with_base(BASE);
        let finder = Arc::new(MockProcessFinder::new());
        finder.add_process_with_reader(100, "kingpin.exe", memory.clone());
        let splitter = Autosplitter::new(Kingpin::new(), events, finder.clone());
        (splitter, memory, finder)
    }

    fn set(memory: &MockMemoryReader, code: i32, map: &str) {
        let addresses = AddressTable::default();
        memory.write_i32(BASE + addresses.game_state, code);
        memory.write_c_string(BASE + addresses.map_name, map, MAP_NAME_LENGTH);
    }

    #[test]
    fn test_no_process() {
        let finder = Arc::new(MockProcessFinder::new());
        let mut splitter = Autosplitter::new(Kingpin::new(), vec![], finder);
        let result = splitter.tick();
        assert!(!result.process_attached);
        assert!(!splitter.is_attached());
        assert!(splitter.snapshot().is_none());
        assert_eq!(splitter.state().ticks, 1);
    }

    #[test]
    fn test_attach_on_first_tick() {
        let (mut splitter, memory, _finder) = setup(vec![]);
        set(&memory, 3, "");
        let result = splitter.tick();
        assert!(result.process_attached);
        assert_eq!(result.is_loading, Some(true));
        assert_eq!(splitter.state().process_id, Some(100));
        assert_eq!(splitter.state().process_name.as_deref(), Some("kingpin.exe"));
    }

    #[test]
    fn test_splits_fire_in_order() {
        let (mut splitter, memory, _finder) = setup(vec![
            KingpinEvent::map_changed(),
            KingpinEvent::loaded_map("intro"),
        ]);
        set(&memory, 3, "");
        assert!(!splitter.tick().should_split());

        set(&memory, 4, "intro.bsp");
        let result = splitter.tick();
        let indices: Vec<usize> = result.splits.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 1]);
        assert_eq!(result.splits[1].description, "Map 'intro.bsp' was loaded");
        assert_eq!(result.splits[1].tick, 2);
        assert_eq!(splitter.state().splits_fired, vec![0, 1]);

        splitter.reset();
        assert!(splitter.state().splits_fired.is_empty());
    }

    #[test]
    fn test_disabled_events_are_dropped() {
        let finder = Arc::new(MockProcessFinder::new());
        let game = Kingpin::new().with_settings(KingpinSettings {
            map_changed: false,
            cutscene_started: false,
        });
        let splitter = Autosplitter::new(
            game,
            vec![
                KingpinEvent::map_changed(),
                KingpinEvent::cutscene_started(),
                KingpinEvent::finished_map("intro"),
            ],
            finder,
        );
        assert_eq!(splitter.events(), &[KingpinEvent::finished_map("intro")]);
    }

    #[test]
    fn test_callbacks_receive_splits() {
        let (mut splitter, memory, _finder) = setup(vec![KingpinEvent::loaded_map("intro")]);
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        splitter.on_split(Box::new(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        }));

        set(&memory, 3, "");
        splitter.tick();
        set(&memory, 4, "intro.bsp");
        splitter.tick();
        splitter.tick();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_detach_when_process_exits() {
        let (mut splitter, memory, finder) = setup(vec![]);
        set(&memory, 4, "intro.bsp");
        splitter.tick();
        assert!(splitter.is_attached());

        memory.invalidate();
        finder.remove_process(100);
        let result = splitter.tick();
        assert!(!result.process_attached);
        assert!(!splitter.state().process_attached);
        assert_eq!(splitter.state().is_loading, None);
    }

    #[test]
    fn test_reattach_starts_fresh_snapshot() {
        let (mut splitter, memory, finder) = setup(vec![KingpinEvent::loaded_map("intro")]);
        set(&memory, 4, "intro.bsp");
        assert!(splitter.tick().should_split());

        memory.invalidate();
        finder.remove_process(100);
        splitter.tick();

        let fresh = MockMemoryReader::new().with_base(BASE);
        finder.add_process_with_reader(200, "kingpin.exe", fresh.clone());
        set(&fresh, 4, "intro.bsp");
        let result = splitter.tick();
        assert!(result.process_attached);
        assert!(result.should_split());
        assert_eq!(splitter.state().process_id, Some(200));
    }

    #[test]
    fn test_held_cutscene_splits_once() {
        let (mut splitter, memory, _finder) = setup(vec![KingpinEvent::cutscene_started()]);
        set(&memory, 3, "");
        splitter.tick();
        set(&memory, 4, "rcboss2.bsp");
        splitter.tick();

        memory.write_u8(BASE + CUTSCENE_FLAG_OFFSET, 1);
        let per_tick: Vec<usize> = (0..5).map(|_| splitter.tick().splits.len()).collect();
        assert_eq!(per_tick, vec![1, 0, 0, 0, 0]);
        assert_eq!(splitter.state().splits_fired, vec![0]);

        // Dropping the flag re-arms the event
        memory.write_u8(BASE + CUTSCENE_FLAG_OFFSET, 0);
        assert!(!splitter.tick().should_split());
        memory.write_u8(BASE + CUTSCENE_FLAG_OFFSET, 1);
        assert!(splitter.tick().should_split());
    }

    #[test]
    fn test_reset_rearms_held_cutscene() {
        let (mut splitter, memory, _finder) = setup(vec![KingpinEvent::cutscene_started()]);
        set(&memory, 4, "rcboss2.bsp");
        memory.write_u8(BASE + CUTSCENE_FLAG_OFFSET, 1);
        assert!(splitter.tick().should_split());
        assert!(!splitter.tick().should_split());

        splitter.reset();
        assert!(splitter.tick().should_split());
    }

    #[test]
    fn test_consecutive_map_changes_both_split() {
        let (mut splitter, memory, _finder) = setup(vec![KingpinEvent::map_changed()]);
        set(&memory, 4, "intro.bsp");
        splitter.tick();
        set(&memory, 3, "sr1.bsp");
        assert!(splitter.tick().should_split());
        set(&memory, 4, "sr2.bsp");
        assert!(splitter.tick().should_split());
    }
}
