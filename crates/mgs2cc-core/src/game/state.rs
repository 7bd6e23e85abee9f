use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU8, Ordering};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use strum::{Display, FromRepr, IntoStaticStr};
use tracing::{debug, info};

use super::stages::{CUTSCENE_OR_MENU_STAGES, NON_INTERACTIVE_PAUSE_CODES, PLAYABLE_STAGES};
use crate::error::Result;
use crate::memory::layout::fields;
use crate::memory::{Connector, Session};

/// Whether effects may run right now
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromRepr, IntoStaticStr, Display,
)]
#[repr(u8)]
pub enum GameState {
    /// No game loaded, or the state could not be read
    Unknown = 0,
    Ready = 1,
    /// Cutscene, menu, codec or pause screen
    WrongMode = 2,
}

/// Raw readiness inputs at one moment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameStateSnapshot {
    pub location_id: String,
    pub pause_code: u8,
    pub timestamp: DateTime<Local>,
}

/// Readiness rules. Only the cutscene/menu set and the pause codes gate
/// effects; `playable` is used for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateRules {
    pub playable: BTreeSet<String>,
    pub cutscene_or_menu: BTreeSet<String>,
    pub non_interactive_pause_codes: BTreeSet<u8>,
}

impl Default for StateRules {
    fn default() -> Self {
        Self {
            playable: PLAYABLE_STAGES.iter().map(|s| s.to_string()).collect(),
            cutscene_or_menu: CUTSCENE_OR_MENU_STAGES.iter().map(|s| s.to_string()).collect(),
            non_interactive_pause_codes: NON_INTERACTIVE_PAUSE_CODES.iter().copied().collect(),
        }
    }
}

impl StateRules {
    pub fn classify(&self, snapshot: &GameStateSnapshot) -> GameState {
        let location = snapshot.location_id.trim();
        if location.is_empty() {
            return GameState::Unknown;
        }

        if self.cutscene_or_menu.contains(location)
            || self.non_interactive_pause_codes.contains(&snapshot.pause_code)
        {
            return GameState::WrongMode;
        }

        if !self.playable.contains(location) {
            debug!("Location {:?} is not a known stage, presuming playable", location);
        }
        GameState::Ready
    }
}

/// Samples and classifies target readiness
pub struct StateClassifier {
    rules: StateRules,
    last_state: AtomicU8,
}

impl StateClassifier {
    pub fn new(rules: StateRules) -> Self {
        Self {
            rules,
            last_state: AtomicU8::new(GameState::Unknown as u8),
        }
    }

    pub fn rules(&self) -> &StateRules {
        &self.rules
    }

    /// Read the location id and pause code from the target.
    pub fn sample(&self, session: &Session) -> Result<GameStateSnapshot> {
        let location_id = session
            .memory
            .read_string(&session.addresses.location, fields::LOCATION_MAX_LEN)?;
        let pause_code = session.memory.read_u8(&session.addresses.pause_state)?;
        Ok(GameStateSnapshot {
            location_id,
            pause_code,
            timestamp: Local::now(),
        })
    }

    /// Classify the current target state. Never fails: a detached connector
    /// or any fault along the way yields `Unknown`.
    pub fn classify(&self, connector: &Connector) -> GameState {
        let state = match connector.session().and_then(|s| self.sample(&s)) {
            Ok(snapshot) => {
                debug!(
                    "Location {:?}, pause code {}",
                    snapshot.location_id, snapshot.pause_code
                );
                self.rules.classify(&snapshot)
            }
            Err(e) => {
                debug!("State sample failed: {}", e);
                GameState::Unknown
            }
        };
        self.record(state);
        state
    }

    /// Classification from the most recent `classify` call
    pub fn last_state(&self) -> GameState {
        GameState::from_repr(self.last_state.load(Ordering::SeqCst)).unwrap_or(GameState::Unknown)
    }

    /// Forget the last classification (e.g. after reattaching)
    pub fn reset(&self) {
        self.last_state
            .store(GameState::Unknown as u8, Ordering::SeqCst);
    }

    fn record(&self, state: GameState) {
        let previous = self.last_state.swap(state as u8, Ordering::SeqCst);
        if previous != state as u8 {
            let previous = GameState::from_repr(previous).unwrap_or(GameState::Unknown);
            info!("Game state changed: {} -> {}", previous, state);
        }
    }
}

impl Default for StateClassifier {
    fn default() -> Self {
        Self::new(StateRules::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::layout::MODULE_NAME;
    use crate::memory::{AddressTable, MockProcess, PointerWidth};
    use std::sync::Arc;

    const BASE: u64 = 0x40_0000;
    const PLAYER: u64 = 0x200_0000;

    fn snapshot(location: &str, pause_code: u8) -> GameStateSnapshot {
        GameStateSnapshot {
            location_id: location.to_string(),
            pause_code,
            timestamp: Local::now(),
        }
    }

    fn attached(location: &str, pause_code: u8) -> (Arc<MockProcess>, Connector) {
        let process = Arc::new(
            MockProcess::builder()
                .module(MODULE_NAME, BASE)
                .region(BASE + 0x949340, 8)
                .region(BASE + 0x17DBC7C, 1)
                .region(PLAYER, 0x200)
                .u64(BASE + 0x949340, PLAYER)
                .string(PLAYER + 0x2C, location)
                .u8(BASE + 0x17DBC7C, pause_code)
                .build(),
        );
        let connector = Connector::new();
        connector
            .attach(process.clone(), &AddressTable::default(), PointerWidth::Eight)
            .unwrap();
        (process, connector)
    }

    #[test]
    fn test_every_cutscene_or_menu_is_wrong_mode() {
        let rules = StateRules::default();
        for stage in CUTSCENE_OR_MENU_STAGES {
            assert_eq!(
                rules.classify(&snapshot(stage, 0)),
                GameState::WrongMode,
                "{stage}"
            );
        }
    }

    #[test]
    fn test_pause_codes() {
        let rules = StateRules::default();
        assert_eq!(rules.classify(&snapshot("w00a", 0)), GameState::Ready);
        for code in [1, 2, 4] {
            assert_eq!(rules.classify(&snapshot("w00a", code)), GameState::WrongMode);
        }
        assert_eq!(rules.classify(&snapshot("w00a", 3)), GameState::Ready);
    }

    #[test]
    fn test_empty_location_is_unknown() {
        let rules = StateRules::default();
        assert_eq!(rules.classify(&snapshot("", 0)), GameState::Unknown);
        assert_eq!(rules.classify(&snapshot("   ", 1)), GameState::Unknown);
    }

    #[test]
    fn test_unlisted_location_is_presumed_playable() {
        let rules = StateRules::default();
        assert_eq!(rules.classify(&snapshot("zz99z", 0)), GameState::Ready);
    }

    #[test]
    fn test_classify_reads_target() {
        let classifier = StateClassifier::default();

        let (_, connector) = attached("w31c", 0);
        assert_eq!(classifier.classify(&connector), GameState::Ready);

        let (_, connector) = attached("d005p01", 0);
        assert_eq!(classifier.classify(&connector), GameState::WrongMode);

        let (_, connector) = attached("w31c", 2);
        assert_eq!(classifier.classify(&connector), GameState::WrongMode);

        let (_, connector) = attached("", 0);
        assert_eq!(classifier.classify(&connector), GameState::Unknown);
    }

    #[test]
    fn test_location_read_is_capped_at_field_length() {
        let classifier = StateClassifier::default();
        let (process, connector) = attached("w00a", 0);
        process.poke(PLAYER + 0x2C, b"d005p01xyz");
        let session = connector.session().unwrap();
        assert_eq!(classifier.sample(&session).unwrap().location_id, "d005p01x");
    }

    #[test]
    fn test_faults_collapse_to_unknown() {
        let classifier = StateClassifier::default();

        let detached = Connector::new();
        assert_eq!(classifier.classify(&detached), GameState::Unknown);

        let (process, connector) = attached("w00a", 0);
        assert_eq!(classifier.classify(&connector), GameState::Ready);
        process.kill();
        assert_eq!(classifier.classify(&connector), GameState::Unknown);

        let (process, connector) = attached("w00a", 0);
        process.unload_module(MODULE_NAME);
        assert_eq!(classifier.classify(&connector), GameState::Unknown);
    }

    #[test]
    fn test_last_state_tracks_transitions() {
        let classifier = StateClassifier::default();
        assert_eq!(classifier.last_state(), GameState::Unknown);

        let (process, connector) = attached("w00a", 0);
        classifier.classify(&connector);
        assert_eq!(classifier.last_state(), GameState::Ready);

        process.poke(BASE + 0x17DBC7C, &[4]);
        classifier.classify(&connector);
        assert_eq!(classifier.last_state(), GameState::WrongMode);

        classifier.reset();
        assert_eq!(classifier.last_state(), GameState::Unknown);
    }

    #[test]
    fn test_rules_from_toml_override_defaults() {
        let rules: StateRules = toml::from_str("non_interactive_pause_codes = [7]").unwrap();
        assert_eq!(rules.classify(&snapshot("w00a", 1)), GameState::Ready);
        assert_eq!(rules.classify(&snapshot("w00a", 7)), GameState::WrongMode);
        assert_eq!(rules.classify(&snapshot("n_title", 0)), GameState::WrongMode);
    }
}
