//! Simulated target process for tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use super::ProcessMemory;
use crate::error::{Error, Result};

/// In-memory stand-in for a target process: named modules at chosen bases,
/// sparse mapped regions, and a count of writes made through `ProcessMemory`.
pub struct MockProcess {
    modules: RwLock<HashMap<String, u64>>,
    regions: RwLock<BTreeMap<u64, Vec<u8>>>,
    writes: AtomicUsize,
    alive: AtomicBool,
}

impl MockProcess {
    pub fn builder() -> MockProcessBuilder {
        MockProcessBuilder::default()
    }

    pub fn set_module_base(&self, module: &str, base: u64) {
        self.modules
            .write()
            .unwrap()
            .insert(module.to_string(), base);
    }

    pub fn unload_module(&self, module: &str) {
        self.modules.write().unwrap().remove(module);
    }

    /// Map a zero-filled region.
    pub fn add_region(&self, start: u64, size: usize) {
        self.regions.write().unwrap().insert(start, vec![0; size]);
    }

    /// Test-side write; not counted by `write_count`. Maps a fresh region
    /// when `address` is not inside an existing one.
    pub fn poke(&self, address: u64, data: &[u8]) {
        let mut regions = self.regions.write().unwrap();
        if let Some((start, bytes)) = regions.range_mut(..=address).next_back() {
            let offset = (address - *start) as usize;
            if offset + data.len() <= bytes.len() {
                bytes[offset..offset + data.len()].copy_from_slice(data);
                return;
            }
        }
        regions.insert(address, data.to_vec());
    }

    /// Test-side read that bypasses liveness.
    pub fn peek(&self, address: u64, size: usize) -> Vec<u8> {
        self.copy_out(address, size)
            .expect("peek outside mapped memory")
    }

    pub fn peek_i16(&self, address: u64) -> i16 {
        let bytes = self.peek(address, 2);
        i16::from_le_bytes([bytes[0], bytes[1]])
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Simulate the process exiting: every access fails from now on.
    pub fn kill(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    fn copy_out(&self, address: u64, size: usize) -> Option<Vec<u8>> {
        let regions = self.regions.read().unwrap();
        let (start, bytes) = regions.range(..=address).next_back()?;
        let offset = (address - start) as usize;
        bytes.get(offset..offset.checked_add(size)?).map(<[u8]>::to_vec)
    }
}

impl ProcessMemory for MockProcess {
    fn module_base(&self, module: &str) -> Result<u64> {
        if !self.is_alive() {
            return Err(Error::ModuleNotFound(module.to_string()));
        }
        self.modules
            .read()
            .unwrap()
            .get(module)
            .copied()
            .ok_or_else(|| Error::ModuleNotFound(module.to_string()))
    }

    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        if !self.is_alive() {
            return Err(Error::ReadFault { address, size });
        }
        self.copy_out(address, size)
            .ok_or(Error::ReadFault { address, size })
    }

    fn write_bytes(&self, address: u64, data: &[u8]) -> Result<()> {
        let fault = Error::WriteFault {
            address,
            size: data.len(),
        };
        if !self.is_alive() {
            return Err(fault);
        }

        let mut regions = self.regions.write().unwrap();
        let Some((start, bytes)) = regions.range_mut(..=address).next_back() else {
            return Err(fault);
        };
        let offset = (address - *start) as usize;
        let Some(target) = bytes.get_mut(offset..offset + data.len()) else {
            return Err(fault);
        };
        target.copy_from_slice(data);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
}

/// Builder for MockProcess
#[derive(Default)]
pub struct MockProcessBuilder {
    modules: HashMap<String, u64>,
    regions: Vec<(u64, usize)>,
    pokes: Vec<(u64, Vec<u8>)>,
}

impl MockProcessBuilder {
    pub fn module(mut self, name: &str, base: u64) -> Self {
        self.modules.insert(name.to_string(), base);
        self
    }

    /// Map a zero-filled region of `size` bytes at `start`.
    pub fn region(mut self, start: u64, size: usize) -> Self {
        self.regions.push((start, size));
        self
    }

    pub fn bytes(mut self, address: u64, data: &[u8]) -> Self {
        self.pokes.push((address, data.to_vec()));
        self
    }

    pub fn u8(self, address: u64, value: u8) -> Self {
        self.bytes(address, &[value])
    }

    pub fn i16(self, address: u64, value: i16) -> Self {
        self.bytes(address, &value.to_le_bytes())
    }

    pub fn u32(self, address: u64, value: u32) -> Self {
        self.bytes(address, &value.to_le_bytes())
    }

    pub fn u64(self, address: u64, value: u64) -> Self {
        self.bytes(address, &value.to_le_bytes())
    }

    pub fn string(self, address: u64, value: &str) -> Self {
        self.bytes(address, value.as_bytes())
    }

    pub fn build(self) -> MockProcess {
        let process = MockProcess {
            modules: RwLock::new(self.modules),
            regions: RwLock::new(BTreeMap::new()),
            writes: AtomicUsize::new(0),
            alive: AtomicBool::new(true),
        };
        for (start, size) in self.regions {
            process.add_region(start, size);
        }
        for (address, data) in self.pokes {
            process.poke(address, &data);
        }
        process
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_inside_region() {
        let process = MockProcess::builder()
            .region(0x1000, 0x10)
            .bytes(0x1004, &[1, 2, 3])
            .build();
        assert_eq!(process.read_bytes(0x1004, 3).unwrap(), vec![1, 2, 3]);
        assert_eq!(process.read_bytes(0x1000, 2).unwrap(), vec![0, 0]);
    }

    #[test]
    fn test_reads_crossing_region_end_fault() {
        let process = MockProcess::builder().region(0x1000, 0x10).build();
        assert!(matches!(
            process.read_bytes(0x100C, 8),
            Err(Error::ReadFault { .. })
        ));
        assert!(process.read_bytes(0x0FFF, 1).is_err());
    }

    #[test]
    fn test_writes_are_counted() {
        let process = MockProcess::builder().region(0x1000, 0x10).build();
        process.poke(0x1000, &[9]);
        assert_eq!(process.write_count(), 0);

        process.write_bytes(0x1001, &[7, 7]).unwrap();
        assert_eq!(process.write_count(), 1);
        assert_eq!(process.peek(0x1000, 3), vec![9, 7, 7]);

        assert!(process.write_bytes(0x2000, &[1]).is_err());
        assert_eq!(process.write_count(), 1);
    }

    #[test]
    fn test_killed_process_refuses_access() {
        let process = MockProcess::builder()
            .module("game.exe", 0x1000)
            .region(0x1000, 0x10)
            .build();
        process.kill();
        assert!(!process.is_alive());
        assert!(process.module_base("game.exe").is_err());
        assert!(process.read_bytes(0x1000, 1).is_err());
        assert!(process.write_bytes(0x1000, &[1]).is_err());
    }
}
