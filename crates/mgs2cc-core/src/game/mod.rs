pub mod enums;
pub mod inventory;
pub mod stages;
pub mod state;

pub use enums::{Character, Item, Weapon};
pub use inventory::{Inventory, Slot, SlotKind, SlotValue};
pub use stages::{
    CUTSCENE_OR_MENU_STAGES, NON_INTERACTIVE_PAUSE_CODES, PLAYABLE_STAGES, is_cutscene_or_menu,
    is_playable_stage,
};
pub use state::{GameState, GameStateSnapshot, StateClassifier, StateRules};
