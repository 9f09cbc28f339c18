//! Host stop requests.
//!
//! A [`StopSignal`] is a cloneable flag owned by the entry point. The run controller polls it
//! once per clock edge, so cancellation is cooperative and the controller always gets to close
//! the waveform trace. On Unix, [`install_sigint`] routes `SIGINT` into a clone of the signal.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared, cooperative stop request.
#[derive(Clone, Debug, Default)]
pub struct StopSignal {
    requested: Arc<AtomicBool>,
}

impl StopSignal {
    /// Creates a signal with no stop requested.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a stop. Safe to call from a signal handler.
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once a stop has been requested.
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

#[cfg(unix)]
mod host {
    use std::sync::OnceLock;

    use super::StopSignal;

    /// Handle the SIGINT handler forwards to. Set once, before the handler is installed.
    static SIGINT_TARGET: OnceLock<StopSignal> = OnceLock::new();

    extern "C" fn on_sigint(_: libc::c_int) {
        if let Some(signal) = SIGINT_TARGET.get() {
            signal.request();
        }
    }

    pub(super) fn install(signal: &StopSignal) -> bool {
        if SIGINT_TARGET.set(signal.clone()).is_err() {
            return false;
        }
        let handler = on_sigint as extern "C" fn(libc::c_int);
        // SAFETY: the handler only performs an atomic load of an initialised OnceLock and an
        // atomic store, both async-signal-safe.
        let previous = unsafe { libc::signal(libc::SIGINT, handler as libc::sighandler_t) };
        previous != libc::SIG_ERR
    }
}

/// Routes `SIGINT` to `signal`.
///
/// Only the first call in a process installs a handler; later calls return `false`. Always
/// returns `false` on non-Unix hosts.
pub fn install_sigint(signal: &StopSignal) -> bool {
    #[cfg(unix)]
    {
        host::install(signal)
    }
    #[cfg(not(unix))]
    {
        let _ = signal;
        false
    }
}
