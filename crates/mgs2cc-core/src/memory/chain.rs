//! Symbolic address chains.
//!
//! A chain is a recipe, not an address: module base plus a static offset,
//! followed by any number of "dereference, then add offset" steps. It is
//! evaluated fresh by the resolver on every access.
//!
//! The textual form matches the address catalogue format:
//!
//! ```text
//! "METAL GEAR SOLID2.exe"+949340=>+1C
//! ```
//!
//! Offsets are hexadecimal. `=>` reads a pointer at the current address and
//! applies the signed offset that follows it.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Size of a pointer stored in the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PointerWidth {
    #[serde(rename = "32")]
    Four,
    #[default]
    #[serde(rename = "64")]
    Eight,
}

impl PointerWidth {
    pub fn bytes(self) -> usize {
        match self {
            Self::Four => 4,
            Self::Eight => 8,
        }
    }

    /// Decode a little-endian pointer. `bytes` must hold at least `self.bytes()` bytes.
    pub fn decode(self, bytes: &[u8]) -> Option<u64> {
        match self {
            Self::Four => {
                let raw: [u8; 4] = bytes.get(..4)?.try_into().ok()?;
                Some(u32::from_le_bytes(raw) as u64)
            }
            Self::Eight => {
                let raw: [u8; 8] = bytes.get(..8)?.try_into().ok()?;
                Some(u64::from_le_bytes(raw))
            }
        }
    }
}

/// One "dereference, then add offset" step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Deref {
    pub offset: i64,
    pub width: PointerWidth,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AddressChain {
    module: Arc<str>,
    base_offset: i64,
    steps: Vec<Deref>,
}

impl AddressChain {
    /// Chain rooted at `module` + `offset`, with no dereferences.
    pub fn new(module: impl Into<Arc<str>>, offset: i64) -> Self {
        Self {
            module: module.into(),
            base_offset: offset,
            steps: Vec::new(),
        }
    }

    /// Append a 64-bit dereference step.
    pub fn deref(self, offset: i64) -> Self {
        self.deref_with(offset, PointerWidth::Eight)
    }

    /// Append a dereference step reading a pointer of `width`.
    pub fn deref_with(mut self, offset: i64, width: PointerWidth) -> Self {
        self.steps.push(Deref { offset, width });
        self
    }

    /// Derive a chain whose final address is shifted by `delta`.
    ///
    /// The delta folds into the last step, so `chain.offset(a).offset(b)`
    /// resolves the same as `chain.offset(a + b)`.
    pub fn offset(&self, delta: i64) -> Self {
        let mut derived = self.clone();
        match derived.steps.last_mut() {
            Some(step) => step.offset = step.offset.wrapping_add(delta),
            None => derived.base_offset = derived.base_offset.wrapping_add(delta),
        }
        derived
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn base_offset(&self) -> i64 {
        self.base_offset
    }

    pub fn steps(&self) -> &[Deref] {
        &self.steps
    }

    /// Parse the textual form with 64-bit pointers.
    pub fn parse(expr: &str) -> Result<Self> {
        Self::parse_with_width(expr, PointerWidth::Eight)
    }

    /// Parse the textual form, dereferencing pointers of `width`.
    pub fn parse_with_width(expr: &str, width: PointerWidth) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidAddressChain {
            expr: expr.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = expr.trim();
        let rest = trimmed
            .strip_prefix('"')
            .ok_or_else(|| invalid("expected a quoted module name"))?;
        let close = rest
            .find('"')
            .ok_or_else(|| invalid("unterminated module name"))?;
        let module = &rest[..close];
        if module.trim().is_empty() {
            return Err(invalid("empty module name"));
        }

        let mut segments = rest[close + 1..].split("=>");
        let base = segments.next().unwrap_or_default().trim();
        if base.is_empty() {
            return Err(invalid("missing static offset after module name"));
        }
        if !base.starts_with(['+', '-']) {
            return Err(invalid("static offset must start with '+' or '-'"));
        }
        let base_offset = parse_offset(base).map_err(|reason| invalid(&reason))?;

        let mut chain = Self::new(module, base_offset);
        for segment in segments {
            let offset = parse_offset(segment.trim()).map_err(|reason| invalid(&reason))?;
            chain = chain.deref_with(offset, width);
        }

        Ok(chain)
    }
}

fn parse_offset(segment: &str) -> std::result::Result<i64, String> {
    if segment.is_empty() {
        return Ok(0);
    }

    let (negative, digits) = match segment.as_bytes()[0] {
        b'+' => (false, &segment[1..]),
        b'-' => (true, &segment[1..]),
        _ => (false, segment),
    };
    let digits = digits.trim();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(digits);

    if digits.is_empty() {
        return Err(format!("missing hex digits in '{segment}'"));
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(format!("bad hex offset '{segment}'"));
    }

    let value = i64::from_str_radix(digits, 16)
        .map_err(|e| format!("bad hex offset '{segment}': {e}"))?;
    if negative {
        value
            .checked_neg()
            .ok_or_else(|| format!("offset out of range '{segment}'"))
    } else {
        Ok(value)
    }
}

fn write_offset(f: &mut fmt::Formatter<'_>, offset: i64) -> fmt::Result {
    if offset < 0 {
        write!(f, "-{:X}", offset.unsigned_abs())
    } else {
        write!(f, "+{:X}", offset)
    }
}

impl fmt::Display for AddressChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.module)?;
        write_offset(f, self.base_offset)?;
        for step in &self.steps {
            write!(f, "=>")?;
            write_offset(f, step.offset)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for AddressChain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
