//! Error definitions.
//!
//! This module defines every failure the harness can report. It provides:
//! 1. **Access Faults:** Out-of-window accesses to a memory target, from the loader or the model.
//! 2. **Load Errors:** Failures opening, parsing, validating or copying a firmware image.
//! 3. **Harness Errors:** Run-level failures reported by the run controller.
//! 4. **Config Errors:** Invalid command-line or configuration-file input.
//!
//! None of these are recoverable. The harness exists to fail fast when firmware,
//! linker script and memory map disagree.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::addr::MemoryWindow;
use super::data::AccessType;

/// An access to an address the memory target does not decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("{access} at {addr:#010x} is outside memory window {window}")]
pub struct AccessFault {
    /// Kind of access that faulted.
    pub access: AccessType,
    /// Faulting absolute address.
    pub addr: u32,
    /// Window decoded by the target.
    pub window: MemoryWindow,
}

impl AccessFault {
    /// Creates a fault for an access of type `access` at `addr`.
    pub const fn new(access: AccessType, addr: u32, window: MemoryWindow) -> Self {
        Self {
            access,
            addr,
            window,
        }
    }
}

/// Failure while loading an executable image into a memory target.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The image file could not be opened.
    #[error("could not open {}: {source}", .path.display())]
    Open {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The image is not a well-formed executable of a supported class.
    #[error("invalid executable image: {reason}")]
    Format {
        /// Human-readable description of the inconsistency.
        reason: String,
    },

    /// A loadable segment does not fit inside the memory window.
    ///
    /// Raised by the validation pre-pass, before any segment is written.
    #[error("segment {index} [{start:#x}, {end:#x}) does not fit in memory window {window}")]
    Range {
        /// Program-header index of the offending segment.
        index: usize,
        /// Segment load address.
        start: u64,
        /// Exclusive end of the segment (saturated on overflow).
        end: u64,
        /// Window decoded by the target.
        window: MemoryWindow,
    },

    /// Reading the image failed after it was opened.
    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The target refused a write after the segment had validated.
    #[error("memory target rejected segment data: {0}")]
    Access(#[from] AccessFault),
}

impl LoadError {
    /// Builds a [`LoadError::Format`] from anything printable.
    pub fn format(reason: impl Into<String>) -> Self {
        Self::Format {
            reason: reason.into(),
        }
    }
}

/// Failure of a harness run as reported by the run controller.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Loading the firmware image failed; reset was never released.
    #[error("firmware load failed for {}: {source}", .path.display())]
    Load {
        /// Image path given on the command line.
        path: PathBuf,
        /// Cause of the failure.
        #[source]
        source: LoadError,
    },

    /// The hardware model accessed memory outside its declared map.
    #[error("model fault after {cycles} cycles: {fault}")]
    ModelFault {
        /// Running cycles counted, including the faulting edge.
        cycles: u64,
        /// The offending access.
        #[source]
        fault: AccessFault,
    },

    /// The host requested termination (e.g. SIGINT).
    #[error("interrupted by host after {cycles} cycles")]
    Interrupted {
        /// Cycles completed before the interrupt was observed.
        cycles: u64,
    },

    /// The controller has already reached its terminal state.
    #[error("run controller already stopped")]
    Stopped,

    /// Writing the waveform trace failed.
    #[error("waveform trace: {0}")]
    Trace(#[from] io::Error),
}

/// Invalid user-supplied configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("could not read config {}: {source}", .path.display())]
    Read {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The configuration file is not valid JSON for [`crate::Config`].
    #[error("could not parse config {}: {source}", .path.display())]
    Parse {
        /// Path to the configuration file.
        path: PathBuf,
        /// Deserializer error.
        #[source]
        source: serde_json::Error,
    },

    /// A cycle budget argument could not be parsed.
    #[error("invalid cycle count '{0}': expected an unsigned number or -1")]
    Cycles(String),

    /// An environment variable holds a value that cannot be parsed.
    #[error("invalid value '{value}' for environment variable {name}")]
    Env {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
    },

    /// The configured memory window is empty or unrepresentable on the host.
    #[error("invalid memory window {0}")]
    Window(MemoryWindow),
}
