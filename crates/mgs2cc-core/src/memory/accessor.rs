//! Typed reads and writes through address chains.
//!
//! Every operation resolves its chain first, then transfers exactly the
//! number of bytes the type needs. All multi-byte values are little-endian.

use std::sync::Arc;

use encoding_rs::WINDOWS_1252;
use tracing::debug;

use super::{AddressChain, ProcessMemory, resolve};
use crate::error::{Error, Result};

/// Fixed-width value that can be moved to and from target memory.
pub trait Primitive: Copy + Send + Sync + 'static {
    const SIZE: usize;

    /// Decode from the first `SIZE` bytes of `bytes`.
    fn from_le_slice(bytes: &[u8]) -> Self;

    fn append_le(self, out: &mut Vec<u8>);
}

macro_rules! impl_primitive {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Primitive for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn from_le_slice(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(&bytes[..Self::SIZE]);
                    <$ty>::from_le_bytes(raw)
                }

                fn append_le(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_primitive!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

/// Typed view of a target's memory
#[derive(Clone)]
pub struct Accessor {
    memory: Arc<dyn ProcessMemory>,
}

impl Accessor {
    pub fn new(memory: Arc<dyn ProcessMemory>) -> Self {
        Self { memory }
    }

    pub fn is_alive(&self) -> bool {
        self.memory.is_alive()
    }

    pub fn module_base(&self, module: &str) -> Result<u64> {
        self.memory.module_base(module)
    }

    pub fn resolve(&self, chain: &AddressChain) -> Result<u64> {
        resolve(self.memory.as_ref(), chain)
    }

    pub fn read<T: Primitive>(&self, chain: &AddressChain) -> Result<T> {
        let address = self.resolve(chain)?;
        let bytes = self.read_exact(address, T::SIZE)?;
        Ok(T::from_le_slice(&bytes))
    }

    pub fn write<T: Primitive>(&self, chain: &AddressChain, value: T) -> Result<()> {
        let address = self.resolve(chain)?;
        let mut bytes = Vec::with_capacity(T::SIZE);
        value.append_le(&mut bytes);
        self.write_exact(address, &bytes)
    }

    pub fn read_u8(&self, chain: &AddressChain) -> Result<u8> {
        self.read(chain)
    }

    pub fn write_u8(&self, chain: &AddressChain, value: u8) -> Result<()> {
        self.write(chain, value)
    }

    pub fn read_i16(&self, chain: &AddressChain) -> Result<i16> {
        self.read(chain)
    }

    pub fn write_i16(&self, chain: &AddressChain, value: i16) -> Result<()> {
        self.write(chain, value)
    }

    pub fn read_i32(&self, chain: &AddressChain) -> Result<i32> {
        self.read(chain)
    }

    pub fn write_i32(&self, chain: &AddressChain, value: i32) -> Result<()> {
        self.write(chain, value)
    }

    pub fn read_f32(&self, chain: &AddressChain) -> Result<f32> {
        self.read(chain)
    }

    pub fn write_f32(&self, chain: &AddressChain, value: f32) -> Result<()> {
        self.write(chain, value)
    }

    /// Read a NUL-terminated single-byte string of at most `max_len` bytes.
    ///
    /// A transfer that yields no bytes gives an empty string rather than an
    /// error: polled fields are often zero-filled or unmapped for a moment
    /// while the target loads. Resolution failures are still returned.
    pub fn read_string(&self, chain: &AddressChain, max_len: usize) -> Result<String> {
        if max_len == 0 {
            return Ok(String::new());
        }

        let address = self.resolve(chain)?;
        let bytes = match self.memory.read_bytes(address, max_len) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("String read at {:#x} returned nothing: {}", address, e);
                return Ok(String::new());
            }
        };

        let end = memchr::memchr(0, &bytes).unwrap_or(bytes.len());
        let (text, _) = WINDOWS_1252.decode_without_bom_handling(&bytes[..end]);
        Ok(text.into_owned())
    }

    /// Write `value` into a fixed-length field of `len` bytes, truncating or
    /// zero-padding as needed.
    pub fn write_string(&self, chain: &AddressChain, value: &str, len: usize) -> Result<()> {
        let (encoded, _, _) = WINDOWS_1252.encode(value);
        let mut bytes = encoded.into_owned();
        bytes.resize(len, 0);
        let address = self.resolve(chain)?;
        self.write_exact(address, &bytes)
    }

    /// Read `count` contiguous elements. A partial transfer is a fault.
    pub fn read_array<T: Primitive>(&self, chain: &AddressChain, count: usize) -> Result<Vec<T>> {
        let address = self.resolve(chain)?;
        let size = count
            .checked_mul(T::SIZE)
            .ok_or(Error::ReadFault { address, size: usize::MAX })?;
        let bytes = self.read_exact(address, size)?;
        Ok(bytes.chunks_exact(T::SIZE).map(T::from_le_slice).collect())
    }

    pub fn write_array<T: Primitive>(&self, chain: &AddressChain, values: &[T]) -> Result<()> {
        let address = self.resolve(chain)?;
        let mut bytes = Vec::with_capacity(values.len() * T::SIZE);
        for value in values {
            value.append_le(&mut bytes);
        }
        self.write_exact(address, &bytes)
    }

    fn read_exact(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        match self.memory.read_bytes(address, size) {
            Ok(bytes) if bytes.len() == size => Ok(bytes),
            Ok(_) | Err(_) => Err(Error::ReadFault { address, size }),
        }
    }

    fn write_exact(&self, address: u64, data: &[u8]) -> Result<()> {
        self.memory
            .write_bytes(address, data)
            .map_err(|_| Error::WriteFault {
                address,
                size: data.len(),
            })
    }
}
