//! Instruction encodings the harness recognises.
//!
//! The stand-in model does not decode instructions; it only watches the fetch
//! stream for the two idioms bare-metal test firmware uses to signal the end of
//! a run.

/// `ebreak`: the conventional end-of-test marker.
pub const EBREAK: u32 = 0x0010_0073;

/// `jal x0, 0`: a jump to itself, used by firmware that parks the core.
pub const JAL_SELF: u32 = 0x0000_006f;

/// Size of a fetched instruction word in bytes.
pub const INSTRUCTION_SIZE: u32 = 4;
