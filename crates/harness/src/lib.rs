//! Firmware test harness for a RISC-V core with tightly-coupled memory.
//!
//! This crate loads an ELF image into a hardware model's TCM while the core is held in reset,
//! then clocks the model for a bounded number of cycles:
//! 1. **Memory:** The `MemoryTarget` contract and the TCM that implements it.
//! 2. **Loader:** ELF parsing, segment validation against the memory window, copy and zero-fill.
//! 3. **Controller:** The `ResetHeld -> Loading -> Running -> Stopped` sequence.
//! 4. **Tracing:** Value Change Dump output with a configurable start delay.
//! 5. **Configuration:** Memory map, clock, boot address and trace settings.

/// Common types (memory window, access types, errors, instruction constants).
pub mod common;
/// Testbench configuration and environment overrides.
pub mod config;
/// Image loader, run controller and stop signal.
pub mod sim;
/// Hardware model traits, TCM storage and the core + TCM top level.
pub mod soc;
/// Waveform trace recorders.
pub mod trace;

/// Root configuration type.
pub use crate::config::Config;
/// Controller driving a model through load and run.
pub use crate::sim::RunController;
/// Loader for ELF firmware images.
pub use crate::sim::ImageLoader;
/// Memory surface the loader writes through.
pub use crate::soc::MemoryTarget;
