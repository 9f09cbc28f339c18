//! Memory window type.
//!
//! The TCM sits on a 32-bit address bus. A window is the contiguous range
//! `[base, base + size)` that a memory target decodes. The end of the range is
//! computed in 64-bit arithmetic so that a window reaching the top of the
//! address space (`base + size == 2^32`) is representable.

use std::fmt;

use serde::Deserialize;

/// A contiguous, byte-addressable window on the 32-bit address bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct MemoryWindow {
    /// First address decoded by the target.
    pub base: u32,
    /// Number of bytes decoded by the target.
    pub size: u32,
}

impl MemoryWindow {
    /// Creates a window covering `[base, base + size)`.
    ///
    /// # Arguments
    ///
    /// * `base` - First decoded address.
    /// * `size` - Window length in bytes.
    pub const fn new(base: u32, size: u32) -> Self {
        Self { base, size }
    }

    /// Returns the exclusive end of the window as a 64-bit value.
    #[inline]
    pub const fn end(&self) -> u64 {
        self.base as u64 + self.size as u64
    }

    /// Returns `true` if `addr` lies inside the window.
    #[inline]
    pub const fn contains(&self, addr: u32) -> bool {
        addr >= self.base && (addr as u64) < self.end()
    }

    /// Returns `true` if the whole range `[start, start + len)` lies inside the window.
    ///
    /// An empty range is contained when its start is a valid address or equals
    /// the window end. Ranges whose end overflows `u64` are never contained.
    pub fn contains_range(&self, start: u64, len: u64) -> bool {
        let Some(end) = start.checked_add(len) else {
            return false;
        };
        start >= self.base as u64 && end <= self.end()
    }

    /// Translates an absolute address into an offset from the window base.
    ///
    /// Returns `None` when the address is outside the window.
    #[inline]
    pub const fn offset_of(&self, addr: u32) -> Option<usize> {
        if self.contains(addr) {
            Some((addr - self.base) as usize)
        } else {
            None
        }
    }
}

impl fmt::Display for MemoryWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:#010x}, {:#010x})", self.base, self.end())
    }
}
