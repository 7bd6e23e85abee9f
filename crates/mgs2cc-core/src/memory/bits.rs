//! Bit-field helpers for packed flag words.

/// Replace bits `start_bit..=end_bit` of `current` with the low bits of `value`.
///
/// Bits outside the range are preserved; high bits of `value` that do not fit
/// the range are discarded. An empty or out-of-range span (`start_bit >
/// end_bit` or `end_bit > 63`) leaves `current` unchanged.
pub fn set_bits(current: u64, start_bit: u32, end_bit: u32, value: u64) -> u64 {
    if start_bit > end_bit || end_bit > 63 {
        return current;
    }

    let width = end_bit - start_bit + 1;
    let field = if width == 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    };
    let mask = field << start_bit;

    (current & !mask) | ((value & field) << start_bit)
}
