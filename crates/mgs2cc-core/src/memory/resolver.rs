//! Address chain resolution.

use tracing::trace;

use super::{AddressChain, ProcessMemory};
use crate::error::{Error, Result};

/// Evaluate `chain` against the target's current state.
///
/// The module base is looked up and every intermediate pointer is read on
/// each call. A missing module, an unreadable or null pointer, or address
/// arithmetic that overflows fails with `Error::Unresolvable`. Nothing is
/// retried here; the caller decides.
pub fn resolve<M: ProcessMemory + ?Sized>(memory: &M, chain: &AddressChain) -> Result<u64> {
    let unresolvable = |reason: String| Error::Unresolvable {
        chain: chain.to_string(),
        reason,
    };

    let base = memory
        .module_base(chain.module())
        .map_err(|e| unresolvable(e.to_string()))?;

    let mut address = base
        .checked_add_signed(chain.base_offset())
        .ok_or_else(|| unresolvable(format!("static offset overflows module base {base:#x}")))?;

    for step in chain.steps() {
        let bytes = memory
            .read_bytes(address, step.width.bytes())
            .map_err(|e| unresolvable(format!("pointer read failed: {e}")))?;
        let pointer = step
            .width
            .decode(&bytes)
            .ok_or_else(|| unresolvable(format!("short pointer read at {address:#x}")))?;

        if pointer == 0 {
            return Err(unresolvable(format!("null pointer at {address:#x}")));
        }

        address = pointer.checked_add_signed(step.offset).ok_or_else(|| {
            unresolvable(format!(
                "offset {:#x} overflows pointer {pointer:#x}",
                step.offset
            ))
        })?;
    }

    trace!("Resolved {} -> {:#x}", chain, address);
    Ok(address)
}
