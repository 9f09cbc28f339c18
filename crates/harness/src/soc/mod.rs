//! Hardware under test.
//!
//! This module organizes the model side of the harness: the collaborator traits the controller
//! and loader program against, the TCM storage, and a behavioural top level that ties them
//! together.

/// Tightly-coupled memory storage.
pub mod memory;

/// Behavioural core + TCM top level.
pub mod tcm_top;

/// Memory-target and hardware-model traits.
pub mod traits;

pub use memory::Tcm;
pub use tcm_top::TcmTop;
pub use traits::{Edge, HardwareModel, MemoryTarget, SignalDecl};
