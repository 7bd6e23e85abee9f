//! Weapon and item slots.
//!
//! Slots are i16 counts in one table: weapons first, items from
//! `ITEM_TABLE`, and per-weapon maximums from `MAX_AMMO_TABLE`.

use serde::Serialize;
use tracing::debug;

use super::{Item, Weapon};
use crate::error::Result;
use crate::memory::layout::{fields, slots};
use crate::memory::{AddressChain, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SlotKind {
    Weapon,
    Item,
    MaxAmmo,
}

/// A slot in the weapons-and-items table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Slot {
    pub kind: SlotKind,
    pub index: i64,
}

impl Slot {
    pub fn weapon(weapon: Weapon) -> Self {
        Self {
            kind: SlotKind::Weapon,
            index: weapon.index(),
        }
    }

    pub fn item(item: Item) -> Self {
        Self {
            kind: SlotKind::Item,
            index: item.index(),
        }
    }

    pub fn max_ammo(weapon: Weapon) -> Self {
        Self {
            kind: SlotKind::MaxAmmo,
            index: weapon.index(),
        }
    }

    /// Byte offset from the start of the table
    pub fn offset(&self) -> i64 {
        let table = match self.kind {
            SlotKind::Weapon => slots::WEAPON_TABLE,
            SlotKind::Item => slots::ITEM_TABLE,
            SlotKind::MaxAmmo => slots::MAX_AMMO_TABLE,
        };
        table + self.index * slots::STRIDE
    }

    pub fn chain(&self, table: &AddressChain) -> AddressChain {
        table.offset(self.offset())
    }
}

/// Decoded slot contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SlotValue {
    NotOwned,
    Empty,
    Count(i16),
}

impl SlotValue {
    /// Any negative value means "not owned"; the game itself uses -1.
    pub fn from_raw(raw: i16) -> Self {
        match raw {
            r if r < 0 => Self::NotOwned,
            0 => Self::Empty,
            r => Self::Count(r),
        }
    }

    pub fn raw(&self) -> i16 {
        match self {
            Self::NotOwned => slots::NOT_OWNED,
            Self::Empty => 0,
            Self::Count(n) => *n,
        }
    }

    pub fn is_owned(&self) -> bool {
        !matches!(self, Self::NotOwned)
    }
}

/// Player inventory and loadout over an attached session
pub struct Inventory<'a> {
    session: &'a Session,
}

impl<'a> Inventory<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    pub fn read(&self, slot: Slot) -> Result<i16> {
        let chain = slot.chain(&self.session.addresses.weapons_and_items);
        self.session.memory.read_i16(&chain)
    }

    pub fn write(&self, slot: Slot, value: i16) -> Result<()> {
        let chain = slot.chain(&self.session.addresses.weapons_and_items);
        debug!("Writing {} to {:?} slot {}", value, slot.kind, slot.index);
        self.session.memory.write_i16(&chain, value)
    }

    pub fn value(&self, slot: Slot) -> Result<SlotValue> {
        self.read(slot).map(SlotValue::from_raw)
    }

    /// Currently equipped weapon; `None` for an index outside the table.
    pub fn equipped_weapon(&self) -> Result<Option<Weapon>> {
        let raw = self
            .session
            .memory
            .read_i16(&self.session.addresses.equipped_weapon)?;
        debug!("Equipped weapon = {}", raw);
        Ok(Weapon::from_raw(raw))
    }

    pub fn equipped_item(&self) -> Result<Option<Item>> {
        let raw = self
            .session
            .memory
            .read_i16(&self.session.addresses.equipped_item)?;
        Ok(Item::from_raw(raw))
    }

    pub fn equip_item(&self, item: Item) -> Result<()> {
        self.session
            .memory
            .write_i16(&self.session.addresses.equipped_item, item.index() as i16)
    }

    pub fn clip_count(&self) -> Result<i16> {
        let count = self
            .session
            .memory
            .read_i16(&self.session.addresses.weapon_clip_count)?;
        debug!("Weapon clip = {}", count);
        Ok(count)
    }

    pub fn set_clip_count(&self, count: i16) -> Result<()> {
        self.session
            .memory
            .write_i16(&self.session.addresses.weapon_clip_count, count)
    }

    /// Current character id, e.g. `r_tnk0`
    pub fn character_id(&self) -> Result<String> {
        self.session
            .memory
            .read_string(&self.session.addresses.character, fields::CHARACTER_MAX_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::memory::layout::MODULE_NAME;
    use crate::memory::{AddressTable, Connector, MockProcess, PointerWidth};

    const BASE: u64 = 0x40_0000;
    const TABLE: u64 = 0x300_0000;

    fn session() -> (Arc<MockProcess>, Session) {
        let process = Arc::new(
            MockProcess::builder()
                .module(MODULE_NAME, BASE)
                .region(BASE + 0x1540C20, 8)
                .region(TABLE, 0x400)
                .u64(BASE + 0x1540C20, TABLE)
                .i16(TABLE + 2, 15)
                .i16(TABLE + 8, -1)
                .i16(TABLE + 0x90 + 32 * 2, 0)
                .i16(TABLE + 0x2F4 + 2, 150)
                .build(),
        );
        let connector = Connector::new();
        connector
            .attach(process.clone(), &AddressTable::default(), PointerWidth::Eight)
            .unwrap();
        (process, connector.session().unwrap())
    }

    #[test]
    fn test_slot_offsets() {
        assert_eq!(Slot::weapon(Weapon::None).offset(), 0);
        assert_eq!(Slot::weapon(Weapon::M9).offset(), 2);
        assert_eq!(Slot::weapon(Weapon::Book).offset(), 42);
        assert_eq!(Slot::item(Item::None).offset(), 0x90);
        assert_eq!(Slot::item(Item::Bandana).offset(), 0x90 + 64);
        assert_eq!(Slot::item(Item::SpWig).offset(), 0x90 + 72);
        assert_eq!(Slot::max_ammo(Weapon::M9).offset(), 0x2F4 + 2);
    }

    #[test]
    fn test_slot_value_domain() {
        assert_eq!(SlotValue::from_raw(-1), SlotValue::NotOwned);
        assert_eq!(SlotValue::from_raw(-300), SlotValue::NotOwned);
        assert_eq!(SlotValue::from_raw(0), SlotValue::Empty);
        assert_eq!(SlotValue::from_raw(30), SlotValue::Count(30));
        assert_eq!(SlotValue::NotOwned.raw(), -1);
        assert!(!SlotValue::NotOwned.is_owned());
        assert!(SlotValue::Empty.is_owned());
    }

    #[test]
    fn test_reads_slots_through_table_pointer() {
        let (_, session) = session();
        let inventory = Inventory::new(&session);
        assert_eq!(inventory.value(Slot::weapon(Weapon::M9)).unwrap(), SlotValue::Count(15));
        assert_eq!(inventory.value(Slot::weapon(Weapon::Psg1)).unwrap(), SlotValue::NotOwned);
        assert_eq!(inventory.value(Slot::item(Item::Bandana)).unwrap(), SlotValue::Empty);
        assert_eq!(inventory.read(Slot::max_ammo(Weapon::M9)).unwrap(), 150);
    }

    #[test]
    fn test_writes_slot() {
        let (process, session) = session();
        let inventory = Inventory::new(&session);
        inventory.write(Slot::item(Item::SpWig), 1).unwrap();
        assert_eq!(process.peek_i16(TABLE + 0x90 + 36 * 2), 1);
    }
}
