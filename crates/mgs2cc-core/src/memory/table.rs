//! Address table: logical field name to chain expression.

use serde::{Deserialize, Serialize};

use super::layout::chains;
use super::{AddressChain, PointerWidth};
use crate::error::Result;

/// Chain expressions for every field the effects touch.
///
/// Loaded from the `[addresses]` config section; any field left out keeps
/// its built-in default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressTable {
    pub character: String,
    pub location: String,
    pub pause_state: String,
    pub alert_timer: String,
    pub flinch: String,
    pub weapons_and_items: String,
    pub equipped_weapon: String,
    pub equipped_item: String,
    pub weapon_clip_count: String,
}

impl Default for AddressTable {
    fn default() -> Self {
        Self {
            character: chains::CHARACTER.to_string(),
            location: chains::LOCATION.to_string(),
            pause_state: chains::PAUSE_STATE.to_string(),
            alert_timer: chains::ALERT_TIMER.to_string(),
            flinch: chains::FLINCH.to_string(),
            weapons_and_items: chains::WEAPONS_AND_ITEMS.to_string(),
            equipped_weapon: chains::EQUIPPED_WEAPON.to_string(),
            equipped_item: chains::EQUIPPED_ITEM.to_string(),
            weapon_clip_count: chains::WEAPON_CLIP_COUNT.to_string(),
        }
    }
}

impl AddressTable {
    /// Parse every expression. Fails on the first malformed one.
    pub fn compile(&self, width: PointerWidth) -> Result<Addresses> {
        let parse = |expr: &str| AddressChain::parse_with_width(expr, width);
        Ok(Addresses {
            character: parse(&self.character)?,
            location: parse(&self.location)?,
            pause_state: parse(&self.pause_state)?,
            alert_timer: parse(&self.alert_timer)?,
            flinch: parse(&self.flinch)?,
            weapons_and_items: parse(&self.weapons_and_items)?,
            equipped_weapon: parse(&self.equipped_weapon)?,
            equipped_item: parse(&self.equipped_item)?,
            weapon_clip_count: parse(&self.weapon_clip_count)?,
        })
    }

    /// (field name, expression) pairs in declaration order
    pub fn entries(&self) -> [(&'static str, &str); 9] {
        [
            ("character", &self.character),
            ("location", &self.location),
            ("pause_state", &self.pause_state),
            ("alert_timer", &self.alert_timer),
            ("flinch", &self.flinch),
            ("weapons_and_items", &self.weapons_and_items),
            ("equipped_weapon", &self.equipped_weapon),
            ("equipped_item", &self.equipped_item),
            ("weapon_clip_count", &self.weapon_clip_count),
        ]
    }
}

/// Compiled chains for an attached target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Addresses {
    pub character: AddressChain,
    pub location: AddressChain,
    pub pause_state: AddressChain,
    pub alert_timer: AddressChain,
    pub flinch: AddressChain,
    pub weapons_and_items: AddressChain,
    pub equipped_weapon: AddressChain,
    pub equipped_item: AddressChain,
    pub weapon_clip_count: AddressChain,
}

impl Addresses {
    fn chains(&self) -> [&AddressChain; 9] {
        [
            &self.character,
            &self.location,
            &self.pause_state,
            &self.alert_timer,
            &self.flinch,
            &self.weapons_and_items,
            &self.equipped_weapon,
            &self.equipped_item,
            &self.weapon_clip_count,
        ]
    }

    /// Distinct module names the chains are rooted at, sorted.
    pub fn modules(&self) -> Vec<&str> {
        let mut modules: Vec<&str> = self.chains().iter().map(|c| c.module()).collect();
        modules.sort_unstable();
        modules.dedup();
        modules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::memory::layout::MODULE_NAME;

    #[test]
    fn test_default_table_compiles() {
        let addresses = AddressTable::default()
            .compile(PointerWidth::Eight)
            .unwrap();
        assert_eq!(addresses.modules(), vec![MODULE_NAME]);
        assert_eq!(addresses.location.base_offset(), 0x949340);
        assert_eq!(addresses.location.steps()[0].offset, 0x2C);
        assert!(addresses.pause_state.steps().is_empty());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let table: AddressTable =
            toml::from_str("flinch = '\"other.exe\"+10=>+4'").unwrap();
        assert_eq!(table.flinch, "\"other.exe\"+10=>+4");
        assert_eq!(table.location, chains::LOCATION);

        let addresses = table.compile(PointerWidth::Eight).unwrap();
        assert_eq!(addresses.modules(), vec![MODULE_NAME, "other.exe"]);
    }

    #[test]
    fn test_malformed_entry_fails_compile() {
        let table = AddressTable {
            alert_timer: "16C9568".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            table.compile(PointerWidth::Eight),
            Err(Error::InvalidAddressChain { .. })
        ));
    }
}
