//! Stage id tables used for readiness gating.
//!
//! Only [`CUTSCENE_OR_MENU_STAGES`] gates effects. [`PLAYABLE_STAGES`] is
//! informational: a location in neither list is treated as playable.

/// Stage ids where the player is in control
pub const PLAYABLE_STAGES: &[&str] = &[
    // Tanker
    "w00a", "w00b", "w00c", "w01a", "w01b", "w01c", "w01d", "w01e", "w01f", "w02a", "w03a",
    "w03b", "w04a", "w04b", "w04c",
    // Plant
    "w11a", "w11b", "w11c", "w12a", "w12c", "w12b", "w13a", "w13b", "w14a", "w15a", "w15b",
    "w16a", "w16b", "w17a", "w18a", "w19a", "w20a", "w20b", "w20c", "w20d", "w21a", "w22a",
    "w23b", "w24a", "w24b", "w24d", "w24c", "w25a", "w25b", "w25c", "w25d", "w28a", "w31a",
    "w31b", "w31c", "w31d", "w32a", "w32b", "w41a", "w42a", "w43a", "w44a", "w45a", "w46a",
    "w51a", "w61a",
    // Snake Tales
    "a00a", "a00b", "a00c", "a01a", "a01b", "a01c", "a01d", "a01e", "a01f", "a02a", "a03a",
    "a03b", "a04a", "a04b", "a04c", "a11a", "a11b", "a11c", "a12a", "a12c", "a12b", "a13a",
    "a13b", "a14a", "a15a", "a15b", "a16a", "a16b", "a17a", "a18a", "a19a", "a20a", "a20b",
    "a20c", "a20d", "a21a", "a22a", "a23b", "a24a", "a24b", "a24d", "a24c", "a25a", "a25b",
    "a25c", "a25d", "a28a", "a31a", "a31b", "a31c", "a31d", "a32a", "a32b", "a41a", "a42a",
    "a43a", "a44a", "a45a", "a46a", "a51a", "a61a",
    // VR missions
    "vs01a", "vs02a", "vs03a", "vs04a", "vs05a", "vs06A", "vs07a", "vs08a", "vs09A", "vs10A",
    "sp01a", "sp02a", "sp03a", "sp04a", "sp05a", "sp06a", "sp07a", "sp08a", "st02a", "st03a",
    "st04a", "st05a", "sp21", "sp22", "sp23", "sp24", "sp25", "wp01a", "wp02a", "wp03a",
    "wp04a", "wp05a", "wp11a", "wp12a", "wp13a", "wp14a", "wp15a", "wp21a", "wp22a", "wp23a",
    "wp24a", "wp25a", "wp31a", "wp32a", "wp33a", "wp34a", "wp35a", "wp41a", "wp42a", "wp43a",
    "wp44a", "wp45a", "wp51a", "wp52a", "wp53a", "wp54a", "wp55a", "wp61a", "wp62a", "wp63a",
    "wp64a", "wp65a", "wp71a", "wp72a", "wp73a", "wp74a", "wp75a",
];

/// Stage ids for menus, demos and cutscenes
pub const CUTSCENE_OR_MENU_STAGES: &[&str] = &[
    // Menus
    "select", "n_title", "mselect", "tales", "ending",
    // Special
    "museum", "webdemo",
    // Tanker
    "d00t", "d01t", "d04t", "d05t", "d10t", "d11t", "d12t", "d12t3", "d12t4", "d13t", "d14t",
    // Plant
    "d001p01", "d001p02", "d005p01", "d005p03", "d010p01", "d012p01", "d014p01", "d021p01",
    "d036p03", "d036p05", "d045p01", "d046p01", "d053p01", "d055p01", "d063p01", "d065p02",
    "d070p01", "d070p09", "d070px9", "d078p01", "d080p01", "d080p06", "d080p07", "d080p08",
    "d082p01",
];

/// Pause state codes for menus, codec calls and item/weapon selection
pub const NON_INTERACTIVE_PAUSE_CODES: &[u8] = &[1, 2, 4];

pub fn is_playable_stage(location: &str) -> bool {
    PLAYABLE_STAGES.contains(&location)
}

pub fn is_cutscene_or_menu(location: &str) -> bool {
    CUTSCENE_OR_MENU_STAGES.contains(&location)
}
