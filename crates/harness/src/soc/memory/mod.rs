//! Tightly-Coupled Memory (TCM).
//!
//! The TCM is a single zero-initialised byte array mapped at a fixed base on the core's
//! 32-bit bus. It is allocated once when the model is built and never resized, so the
//! loader and the model always see the same storage.

use crate::common::{AccessFault, AccessType, ConfigError, MemoryWindow};
use crate::soc::traits::MemoryTarget;

/// TCM storage mapped at `window.base`.
#[derive(Clone, Debug)]
pub struct Tcm {
    window: MemoryWindow,
    data: Vec<u8>,
}

impl Tcm {
    /// Allocates a zeroed TCM covering `window`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Window`] for an empty window or one that extends past the
    /// top of the 32-bit bus.
    pub fn new(window: MemoryWindow) -> Result<Self, ConfigError> {
        if window.size == 0 || window.end() > 1 << 32 {
            return Err(ConfigError::Window(window));
        }
        Ok(Self {
            window,
            data: vec![0; window.size as usize],
        })
    }

    /// Returns the raw contents, indexed from the window base.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Translates `[addr, addr + len)` to a slice range, or faults with `access`.
    fn span(
        &self,
        addr: u32,
        len: usize,
        access: AccessType,
    ) -> Result<std::ops::Range<usize>, AccessFault> {
        if !self.window.contains_range(addr as u64, len as u64) {
            return Err(AccessFault::new(access, addr, self.window));
        }
        let start = (addr - self.window.base) as usize;
        Ok(start..start + len)
    }
}

impl MemoryTarget for Tcm {
    fn window(&self) -> MemoryWindow {
        self.window
    }

    fn read_byte(&self, addr: u32) -> Result<u8, AccessFault> {
        self.window
            .offset_of(addr)
            .map(|i| self.data[i])
            .ok_or(AccessFault::new(AccessType::Read, addr, self.window))
    }

    fn write_byte(&mut self, addr: u32, value: u8) -> Result<(), AccessFault> {
        let i = self
            .window
            .offset_of(addr)
            .ok_or(AccessFault::new(AccessType::Write, addr, self.window))?;
        self.data[i] = value;
        Ok(())
    }

    /// Copies `data` in one slice operation after checking the whole span.
    fn write_bytes(&mut self, addr: u32, data: &[u8]) -> Result<(), AccessFault> {
        let range = self.span(addr, data.len(), AccessType::Write)?;
        self.data[range].copy_from_slice(data);
        Ok(())
    }

    fn fill(&mut self, addr: u32, len: usize, value: u8) -> Result<(), AccessFault> {
        let range = self.span(addr, len, AccessType::Write)?;
        self.data[range].fill(value);
        Ok(())
    }

    fn read_u32_le(&self, addr: u32) -> Result<u32, AccessFault> {
        let range = self.span(addr, 4, AccessType::Read)?;
        let mut word = [0u8; 4];
        word.copy_from_slice(&self.data[range]);
        Ok(u32::from_le_bytes(word))
    }
}
