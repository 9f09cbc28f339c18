//! Memory Access Types.
//!
//! Classifies accesses to a memory target so that faults can report which port
//! (loader write, model fetch, model data read/write) went out of range.

use std::fmt;

/// Type of memory access operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessType {
    /// Instruction fetch issued by the hardware model.
    Fetch,

    /// Data read, from the model or from a test reading memory back.
    Read,

    /// Data write. The image loader only ever issues writes.
    Write,
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fetch => "fetch",
            Self::Read => "read",
            Self::Write => "write",
        };
        f.write_str(name)
    }
}
