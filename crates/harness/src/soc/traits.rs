//! Collaborator traits for the hardware under test.
//!
//! This module defines the two seams between the harness and the model. It provides:
//! 1. **`MemoryTarget`:** Byte-addressable memory with range validation. It is the only way
//!    the image loader touches simulated memory state.
//! 2. **`HardwareModel`:** Reset and clock inputs, the stop notification, the memory target,
//!    and probe signals for waveform tracing.
//!
//! Keeping these as traits insulates the loader and controller from how a particular model
//! generator exposes its internal memories.

use crate::common::{AccessFault, AccessType, MemoryWindow};

/// Byte-addressable memory surface with a contiguous address window.
///
/// `read_byte` and `write_byte` are total only inside [`window`](Self::window). Accesses
/// outside it return an [`AccessFault`]; implementations must never drop them silently.
pub trait MemoryTarget {
    /// Returns the window `[base, base + size)` decoded by this target.
    fn window(&self) -> MemoryWindow;

    /// Returns `true` iff `addr` lies in the target's window.
    fn is_valid_address(&self, addr: u32) -> bool {
        self.window().contains(addr)
    }

    /// Reads one byte.
    ///
    /// # Errors
    ///
    /// Returns an [`AccessFault`] if `addr` is outside the window.
    fn read_byte(&self, addr: u32) -> Result<u8, AccessFault>;

    /// Writes one byte.
    ///
    /// # Errors
    ///
    /// Returns an [`AccessFault`] if `addr` is outside the window.
    fn write_byte(&mut self, addr: u32, value: u8) -> Result<(), AccessFault>;

    /// Writes a contiguous byte slice starting at `addr` (default: byte-by-byte).
    ///
    /// # Errors
    ///
    /// Returns the first [`AccessFault`] encountered.
    fn write_bytes(&mut self, addr: u32, data: &[u8]) -> Result<(), AccessFault> {
        for (i, byte) in data.iter().enumerate() {
            let target = checked_offset(self.window(), addr, i, AccessType::Write)?;
            self.write_byte(target, *byte)?;
        }
        Ok(())
    }

    /// Writes `value` to `len` consecutive bytes starting at `addr` (default: byte-by-byte).
    ///
    /// # Errors
    ///
    /// Returns the first [`AccessFault`] encountered.
    fn fill(&mut self, addr: u32, len: usize, value: u8) -> Result<(), AccessFault> {
        for i in 0..len {
            let target = checked_offset(self.window(), addr, i, AccessType::Write)?;
            self.write_byte(target, value)?;
        }
        Ok(())
    }

    /// Reads a little-endian 32-bit word as four byte reads.
    ///
    /// # Errors
    ///
    /// Returns an [`AccessFault`] if any of the four bytes is outside the window.
    fn read_u32_le(&self, addr: u32) -> Result<u32, AccessFault> {
        let mut bytes = [0u8; 4];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let target = checked_offset(self.window(), addr, i, AccessType::Read)?;
            *byte = self.read_byte(target)?;
        }
        Ok(u32::from_le_bytes(bytes))
    }
}

/// Computes `addr + i`, reporting a fault instead of wrapping at the top of the bus.
fn checked_offset(
    window: MemoryWindow,
    addr: u32,
    i: usize,
    access: AccessType,
) -> Result<u32, AccessFault> {
    u32::try_from(i)
        .ok()
        .and_then(|i| addr.checked_add(i))
        .ok_or(AccessFault::new(access, addr, window))
}

/// Outcome of a single clock edge of the model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    /// The model keeps running.
    Continue,
    /// The model requested the end of simulation (the `$finish` of an RTL testbench).
    Finished,
}

/// Declaration of a probe signal exported for waveform tracing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SignalDecl {
    /// Signal name as it appears in the trace.
    pub name: &'static str,
    /// Width in bits (1 to 64).
    pub width: u32,
}

impl SignalDecl {
    /// Declares a signal called `name` that is `width` bits wide.
    pub const fn new(name: &'static str, width: u32) -> Self {
        Self { name, width }
    }
}

/// The hardware model under test, as seen by the run controller.
///
/// The controller is the only caller. It drives `set_reset` and `clock_edge`, and touches
/// memory through `memory_mut` only while reset is asserted.
pub trait HardwareModel {
    /// Returns the model's memory so the loader can populate it.
    fn memory_mut(&mut self) -> &mut dyn MemoryTarget;

    /// Drives the CPU reset input. `true` holds the core in reset.
    fn set_reset(&mut self, asserted: bool);

    /// Advances the model by one rising clock edge.
    ///
    /// # Errors
    ///
    /// Returns an [`AccessFault`] if the model accessed memory outside its declared map.
    fn clock_edge(&mut self) -> Result<Edge, AccessFault>;

    /// Probe signals exported to the waveform trace, in sampling order.
    fn signals(&self) -> &'static [SignalDecl] {
        &[]
    }

    /// Appends the current value of each probe declared by [`signals`](Self::signals).
    fn sample(&self, _out: &mut Vec<u64>) {}
}
