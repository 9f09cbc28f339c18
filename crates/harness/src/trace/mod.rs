//! Waveform trace recording.
//!
//! This module defines the contract between the run controller and a trace recorder. It
//! provides:
//! 1. **`TraceRecorder`:** Declare signals once, sample them at simulated timestamps, flush
//!    and close.
//! 2. **`TraceHandle`:** Owns a recorder and closes it exactly once, either explicitly when
//!    the run stops or on drop, so every exit path releases the file.
//! 3. **`VcdWriter`:** A Value Change Dump recorder.

use std::io;

use tracing::{debug, warn};

use crate::soc::traits::SignalDecl;

/// Value Change Dump writer.
pub mod vcd;

pub use vcd::VcdWriter;

/// A sink for sampled signal values.
pub trait TraceRecorder {
    /// Declares the signals that every subsequent [`sample`](Self::sample) will carry, in order.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the underlying sink.
    fn declare(&mut self, signals: &[SignalDecl]) -> io::Result<()>;

    /// Records `values` at simulated time `time_ns`.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the underlying sink.
    fn sample(&mut self, time_ns: u64, values: &[u64]) -> io::Result<()>;

    /// Flushes buffered output.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the underlying sink.
    fn flush(&mut self) -> io::Result<()>;

    /// Flushes and releases the sink. No calls are made after `close`.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the underlying sink.
    fn close(&mut self) -> io::Result<()>;
}

/// Scoped ownership of an open recorder.
///
/// Dropping an unclosed handle flushes and closes the recorder; errors at that point can only
/// be logged.
pub struct TraceHandle {
    recorder: Option<Box<dyn TraceRecorder>>,
}

impl TraceHandle {
    /// Takes ownership of `recorder`.
    pub fn new(recorder: Box<dyn TraceRecorder>) -> Self {
        Self {
            recorder: Some(recorder),
        }
    }

    /// Returns `true` until the recorder has been closed.
    pub const fn is_open(&self) -> bool {
        self.recorder.is_some()
    }

    /// Forwards to [`TraceRecorder::declare`]; a no-op once closed.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the recorder.
    pub fn declare(&mut self, signals: &[SignalDecl]) -> io::Result<()> {
        match self.recorder.as_mut() {
            Some(r) => r.declare(signals),
            None => Ok(()),
        }
    }

    /// Forwards to [`TraceRecorder::sample`]; a no-op once closed.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the recorder.
    pub fn sample(&mut self, time_ns: u64, values: &[u64]) -> io::Result<()> {
        match self.recorder.as_mut() {
            Some(r) => r.sample(time_ns, values),
            None => Ok(()),
        }
    }

    /// Flushes and closes the recorder. Later calls do nothing.
    ///
    /// # Errors
    ///
    /// Returns the flush or close error; the recorder is released either way.
    pub fn close(&mut self) -> io::Result<()> {
        let Some(mut recorder) = self.recorder.take() else {
            return Ok(());
        };
        let flushed = recorder.flush();
        let closed = recorder.close();
        debug!("waveform trace closed");
        flushed.and(closed)
    }
}

impl Drop for TraceHandle {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "failed to close waveform trace");
        }
    }
}

impl std::fmt::Debug for TraceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceHandle")
            .field("open", &self.is_open())
            .finish()
    }
}
