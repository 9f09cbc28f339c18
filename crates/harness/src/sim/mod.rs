//! Firmware loading and run sequencing.
//!
//! Provides the ELF image loader, the reset/run controller, and the host stop signal that
//! lets the entry point cancel a run cooperatively.

/// Reset/load/run state machine.
pub mod controller;

/// Host stop requests and the SIGINT bridge.
pub mod interrupt;

/// ELF image loader.
pub mod loader;

pub use controller::{Phase, RunController, RunReport, RunSession, StopReason};
pub use interrupt::StopSignal;
pub use loader::{ExecutableImage, ImageLoader, Segment};
