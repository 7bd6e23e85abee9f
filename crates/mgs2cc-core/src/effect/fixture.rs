//! Simulated game for engine and dispatcher tests.

use std::sync::Arc;

use crate::game::{Item, Weapon};
use crate::memory::layout::MODULE_NAME;
use crate::memory::{AddressTable, Connector, MockProcess, PointerWidth};

pub const BASE: u64 = 0x40_0000;
pub const PLAYER: u64 = 0x200_0000;
pub const FLINCH_BLOCK: u64 = 0x210_0000;
pub const TABLE: u64 = 0x300_0000;

const PLAYER_PTR: u64 = BASE + 0x949340;
const PAUSE: u64 = BASE + 0x17DBC7C;
const ALERT: u64 = BASE + 0x16C9568;
const FLINCH_PTR: u64 = BASE + 0x17DF660;
const TABLE_PTR: u64 = BASE + 0x1540C20;
const CLIP: u64 = BASE + 0x16E994C;

const CHARACTER: u64 = PLAYER + 0x1C;
const LOCATION: u64 = PLAYER + 0x2C;
const EQUIPPED_WEAPON: u64 = PLAYER + 0x104;
const EQUIPPED_ITEM: u64 = PLAYER + 0x106;
const FLINCH: u64 = FLINCH_BLOCK + 0xA8;

/// Snake on the tanker's aft deck, unpaused, owning nothing
pub struct Target {
    pub process: Arc<MockProcess>,
    pub connector: Arc<Connector>,
}

impl Target {
    pub fn new() -> Self {
        let mut builder = MockProcess::builder()
            .module(MODULE_NAME, BASE)
            .region(PLAYER_PTR, 8)
            .region(PAUSE, 1)
            .region(ALERT, 2)
            .region(FLINCH_PTR, 8)
            .region(TABLE_PTR, 8)
            .region(CLIP, 2)
            .region(PLAYER, 0x200)
            .region(FLINCH_BLOCK, 0x100)
            .region(TABLE, 0x400)
            .u64(PLAYER_PTR, PLAYER)
            .u64(FLINCH_PTR, FLINCH_BLOCK)
            .u64(TABLE_PTR, TABLE);
        for slot in 0..0x90 / 2 + 41 {
            builder = builder.i16(TABLE + slot * 2, -1);
        }
        let process = Arc::new(builder.build());

        let connector = Arc::new(Connector::new());
        connector
            .attach(process.clone(), &AddressTable::default(), PointerWidth::Eight)
            .unwrap();

        let target = Self { process, connector };
        target.set_location("w00a");
        target.set_character("r_tnk0");
        target
    }

    fn poke_string(&self, address: u64, value: &str) {
        let mut bytes = value.as_bytes().to_vec();
        bytes.resize(8, 0);
        self.process.poke(address, &bytes);
    }

    pub fn set_location(&self, location: &str) {
        self.poke_string(LOCATION, location);
    }

    pub fn set_pause(&self, code: u8) {
        self.process.poke(PAUSE, &[code]);
    }

    pub fn set_character(&self, id: &str) {
        self.poke_string(CHARACTER, id);
    }

    pub fn set_weapon(&self, weapon: Weapon, count: i16) {
        self.process
            .poke(TABLE + weapon.index() as u64 * 2, &count.to_le_bytes());
    }

    pub fn weapon(&self, weapon: Weapon) -> i16 {
        self.process.peek_i16(TABLE + weapon.index() as u64 * 2)
    }

    pub fn set_item(&self, item: Item, count: i16) {
        self.process
            .poke(TABLE + 0x90 + item.index() as u64 * 2, &count.to_le_bytes());
    }

    pub fn item(&self, item: Item) -> i16 {
        self.process.peek_i16(TABLE + 0x90 + item.index() as u64 * 2)
    }

    pub fn equip(&self, weapon: Weapon) {
        self.process
            .poke(EQUIPPED_WEAPON, &(weapon.index() as i16).to_le_bytes());
    }

    pub fn equipped_item(&self) -> i16 {
        self.process.peek_i16(EQUIPPED_ITEM)
    }

    pub fn set_clip(&self, count: i16) {
        self.process.poke(CLIP, &count.to_le_bytes());
    }

    pub fn clip(&self) -> i16 {
        self.process.peek_i16(CLIP)
    }

    pub fn alert_timer(&self) -> i16 {
        self.process.peek_i16(ALERT)
    }

    pub fn flinch(&self) -> u8 {
        self.process.peek(FLINCH, 1)[0]
    }

    /// Make the flinch pointer null so the flinch field no longer resolves
    pub fn break_flinch_pointer(&self) {
        self.process.poke(FLINCH_PTR, &0u64.to_le_bytes());
    }

    pub fn repair_flinch_pointer(&self) {
        self.process.poke(FLINCH_PTR, &FLINCH_BLOCK.to_le_bytes());
    }
}
