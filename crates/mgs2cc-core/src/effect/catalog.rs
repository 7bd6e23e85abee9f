//! Effect catalogue.
//!
//! Every effect is one row: display metadata plus an [`EffectKind`] that the
//! engine dispatches on. Ammo top-ups share a single kind parameterized by
//! weapon.

use std::time::Duration;

use serde::Serialize;

use crate::game::Weapon;

/// What an effect does, and the parameters it needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectKind {
    AlertStatus,
    Flinch,
    EmptyGunClip,
    InfiniteAmmo,
    SubtractAmmo,
    AddAmmo { weapon: Weapon },
}

impl EffectKind {
    /// Whether the effect repeats for a duration instead of firing once
    pub fn is_timed(&self) -> bool {
        matches!(self, Self::EmptyGunClip | Self::InfiniteAmmo)
    }

    /// Whether the request must carry an integer quantity parameter
    pub fn takes_quantity(&self) -> bool {
        matches!(self, Self::SubtractAmmo | Self::AddAmmo { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EffectDef {
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub price: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(flatten)]
    pub kind: EffectKind,
}

impl EffectDef {
    pub fn default_duration(&self) -> Option<Duration> {
        self.duration_secs.map(Duration::from_secs)
    }
}

const fn add_ammo(
    code: &'static str,
    name: &'static str,
    description: &'static str,
    weapon: Weapon,
) -> EffectDef {
    EffectDef {
        code,
        name,
        description,
        category: "Ammo",
        price: 1,
        duration_secs: None,
        quantity: Some(50),
        kind: EffectKind::AddAmmo { weapon },
    }
}

pub static CATALOG: &[EffectDef] = &[
    EffectDef {
        code: "setAlertStatus",
        name: "Set Alert Status",
        description: "Triggers an alert status, sending the guards to attack the player",
        category: "Alert Status",
        price: 80,
        duration_secs: None,
        quantity: None,
        kind: EffectKind::AlertStatus,
    },
    EffectDef {
        code: "flinchPlayer",
        name: "Flinch Player",
        description: "Makes the player flinch",
        category: "Snake/Raiden",
        price: 40,
        duration_secs: None,
        quantity: None,
        kind: EffectKind::Flinch,
    },
    EffectDef {
        code: "emptyGunClip",
        name: "Empty Gun Clip",
        description: "Continuously empties the player's weapon clip for a short duration",
        category: "Snake/Raiden",
        price: 25,
        duration_secs: Some(30),
        quantity: None,
        kind: EffectKind::EmptyGunClip,
    },
    EffectDef {
        code: "infiniteAmmo",
        name: "Infinite Ammo",
        description: "Gives the player infinite ammo for a short duration",
        category: "Snake/Raiden",
        price: 100,
        duration_secs: Some(20),
        quantity: None,
        kind: EffectKind::InfiniteAmmo,
    },
    EffectDef {
        code: "subtractAmmo",
        name: "Subtract Ammo",
        description: "Removes a chunk of the player's ammo/quantity from their equipped weapon",
        category: "Ammo",
        price: 1,
        duration_secs: None,
        quantity: Some(50),
        kind: EffectKind::SubtractAmmo,
    },
    add_ammo("addM9Ammo", "Add M9 Ammo", "Adds ammo to the M9", Weapon::M9),
    add_ammo("addUspAmmo", "Add USP Ammo", "Adds ammo to the USP", Weapon::Usp),
    add_ammo("addSocomAmmo", "Add SOCOM Ammo", "Adds ammo to the SOCOM", Weapon::Socom),
    add_ammo("addPsg1Ammo", "Add PSG1 Ammo", "Adds ammo to the PSG1", Weapon::Psg1),
    add_ammo("addRgb6Ammo", "Add RGB6 Ammo", "Adds grenades to the RGB6", Weapon::Rgb6),
    add_ammo("addNikitaAmmo", "Add Nikita Ammo", "Adds missiles to the Nikita", Weapon::Nikita),
    add_ammo("addStingerAmmo", "Add Stinger Ammo", "Adds missiles to the Stinger", Weapon::Stinger),
    add_ammo("addClaymoreAmmo", "Add Claymores", "Adds Claymores", Weapon::Claymore),
    add_ammo("addC4Ammo", "Add C4", "Adds C4", Weapon::C4),
    add_ammo("addChaffAmmo", "Add Chaff Grenades", "Adds Chaff Grenades", Weapon::Chaff),
    add_ammo("addStungAmmo", "Add Stun Grenades", "Adds Stun Grenades", Weapon::StunGrenade),
    add_ammo("addAks74uAmmo", "Add AKS74U Ammo", "Adds ammo to the AKS74U", Weapon::Aks74u),
    add_ammo(
        "addMagazineAmmo",
        "Add Magazine Ammo",
        "Gives the player extra Empty Magazines to throw",
        Weapon::Magazine,
    ),
    add_ammo("addGrenadeAmmo", "Add Grenades", "Adds Grenades", Weapon::Grenade),
    add_ammo("addM4Ammo", "Add M4 Ammo", "Adds ammo to the M4", Weapon::M4),
    add_ammo("addPsg1tAmmo", "Add PSG1-T Ammo", "Adds ammo to the PSG1-T", Weapon::Psg1T),
    add_ammo("addBookAmmo", "Add Books", "Adds Books", Weapon::Book),
];

pub fn lookup(code: &str) -> Option<&'static EffectDef> {
    CATALOG.iter().find(|def| def.code == code)
}
