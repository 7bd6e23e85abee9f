//! Memory layout constants for METAL GEAR SOLID 2 (Master Collection, PC)
//!
//! Chain expressions use the address catalogue format understood by
//! [`AddressChain::parse`](super::AddressChain::parse).

/// Executable image every chain is rooted at
pub const MODULE_NAME: &str = "METAL GEAR SOLID2.exe";

/// Default chain expressions for each logical field
pub mod chains {
    /// Current character id (`r_tnk0`, `r_plt0`, ...)
    pub const CHARACTER: &str = "\"METAL GEAR SOLID2.exe\"+949340=>+1C";
    /// Current stage id (`w00a`, `d005p01`, ...)
    pub const LOCATION: &str = "\"METAL GEAR SOLID2.exe\"+949340=>+2C";
    pub const PAUSE_STATE: &str = "\"METAL GEAR SOLID2.exe\"+17DBC7C";
    pub const ALERT_TIMER: &str = "\"METAL GEAR SOLID2.exe\"+16C9568";
    pub const FLINCH: &str = "\"METAL GEAR SOLID2.exe\"+17DF660=>+A8";
    /// Start of the weapon table; items follow at [`super::slots::ITEM_TABLE`]
    pub const WEAPONS_AND_ITEMS: &str = "\"METAL GEAR SOLID2.exe\"+1540C20=>+0";
    pub const EQUIPPED_WEAPON: &str = "\"METAL GEAR SOLID2.exe\"+949340=>+104";
    pub const EQUIPPED_ITEM: &str = "\"METAL GEAR SOLID2.exe\"+949340=>+106";
    pub const WEAPON_CLIP_COUNT: &str = "\"METAL GEAR SOLID2.exe\"+16E994C";
}

/// Inventory slot table layout
pub mod slots {
    /// Each slot is one i16
    pub const STRIDE: i64 = 2;

    pub const WEAPON_TABLE: i64 = 0;
    pub const ITEM_TABLE: i64 = 0x90;

    /// Maximum ammo per weapon, indexed like the weapon table
    pub const MAX_AMMO_TABLE: i64 = 0x2F4;

    /// Slot value for a weapon or item the player does not have
    pub const NOT_OWNED: i16 = -1;
}

/// Field sizes
pub mod fields {
    pub const LOCATION_MAX_LEN: usize = 8;
    pub const CHARACTER_MAX_LEN: usize = 8;
}

/// Values written by one-shot effects
pub mod values {
    /// Alert timer value that forces alert status
    pub const ALERT_TRIGGER: i16 = 9999;
    /// Alert timer value written once the alert has taken hold
    pub const ALERT_SETTLE: i16 = 5000;
    pub const FLINCH: u8 = 1;
}
