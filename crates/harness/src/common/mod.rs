//! Common types shared by the loader, the memory targets and the run controller.
//!
//! 1. **Address Types:** The 32-bit memory window decoded by a target.
//! 2. **Constants:** Instruction encodings watched by the stand-in model.
//! 3. **Memory Access:** Classification of accesses for fault reporting.
//! 4. **Error Handling:** Access faults, load errors and harness errors.

/// Memory window type.
pub mod addr;

/// Instruction encodings the harness recognises.
pub mod constants;

/// Memory access type definitions.
pub mod data;

/// Error types.
pub mod error;

pub use addr::MemoryWindow;
pub use data::AccessType;
pub use error::{AccessFault, ConfigError, HarnessError, LoadError};
