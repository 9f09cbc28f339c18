//! Reset/run sequencing.
//!
//! The run controller owns the hardware model for the duration of a run and walks it through
//! `ResetHeld -> Loading -> Running -> Stopped`:
//! 1. **ResetHeld:** Reset is asserted before any memory write and held for one clock edge.
//! 2. **Loading:** The firmware image is loaded into the model's memory. A failure stops the
//!    run with reset still asserted.
//! 3. **Running:** After one more edge with reset held, reset is released and the model is
//!    clocked until the cycle budget is spent, the model finishes, or the host interrupts.
//! 4. **Stopped:** Terminal. The waveform trace is closed on every path into this state.
//!
//! The loader and the model never touch memory at the same time: the model is in reset for the
//! whole of `Loading`.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::common::HarnessError;
use crate::sim::interrupt::StopSignal;
use crate::sim::loader::{ExecutableImage, ImageLoader};
use crate::soc::traits::{Edge, HardwareModel, SignalDecl};
use crate::trace::TraceHandle;

/// Signals the controller adds in front of the model's probes.
const CONTROLLER_SIGNALS: &[SignalDecl] = &[
    SignalDecl::new("clk", 1),
    SignalDecl::new("rst_cpu", 1),
    SignalDecl::new("cycle", 64),
];

/// Phase of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Reset asserted; memory may be written.
    ResetHeld,
    /// The image loader is writing memory.
    Loading,
    /// Reset released; the model is being clocked.
    Running,
    /// Terminal state.
    Stopped,
}

/// Mutable state of a single run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSession {
    /// Clock edges observed while running.
    pub cycle_count: u64,
    /// Cycle budget; `None` runs until an external stop.
    pub max_cycles: Option<u64>,
    /// Current phase.
    pub phase: Phase,
    /// Simulated time elapsed, including the reset edges.
    pub sim_time_ns: u64,
}

impl RunSession {
    /// Creates a session in [`Phase::ResetHeld`] with no cycles counted.
    pub const fn new(max_cycles: Option<u64>) -> Self {
        Self {
            cycle_count: 0,
            max_cycles,
            phase: Phase::ResetHeld,
            sim_time_ns: 0,
        }
    }

    const fn budget_spent(&self) -> bool {
        match self.max_cycles {
            Some(max) => self.cycle_count >= max,
            None => false,
        }
    }
}

/// Why a successful run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// `max_cycles` edges were counted.
    CycleBudget,
    /// The model raised its finish notification.
    ModelFinished,
}

/// Summary of a successful run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    /// Why the run stopped.
    pub reason: StopReason,
    /// Clock edges counted while running.
    pub cycles: u64,
    /// Simulated time at the stop.
    pub sim_time_ns: u64,
    /// The image that was loaded.
    pub image: ExecutableImage,
}

/// Drives a [`HardwareModel`] through load and run.
#[derive(Debug)]
pub struct RunController<M: HardwareModel> {
    model: M,
    image_path: PathBuf,
    loader: ImageLoader,
    session: RunSession,
    clock_period_ns: u64,
    stop: StopSignal,
    trace: Option<TraceHandle>,
    rst_cpu: bool,
    samples: Vec<u64>,
}

impl<M: HardwareModel> RunController<M> {
    /// Creates a controller that will load `image_path` into `model` and run it for at most
    /// `max_cycles` edges of a clock with period `clock_period_ns`.
    pub fn new(
        model: M,
        image_path: impl Into<PathBuf>,
        max_cycles: Option<u64>,
        clock_period_ns: u64,
    ) -> Self {
        Self {
            model,
            image_path: image_path.into(),
            loader: ImageLoader::new(),
            session: RunSession::new(max_cycles),
            clock_period_ns,
            stop: StopSignal::new(),
            trace: None,
            rst_cpu: true,
            samples: Vec::new(),
        }
    }

    /// Uses `stop` as the host stop request.
    #[must_use]
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// Records a waveform into `trace`.
    #[must_use]
    pub fn with_trace(mut self, trace: TraceHandle) -> Self {
        self.trace = Some(trace);
        self
    }

    /// Returns the session state.
    pub const fn session(&self) -> &RunSession {
        &self.session
    }

    /// Returns the model.
    pub const fn model(&self) -> &M {
        &self.model
    }

    /// Path of the image this controller loads.
    pub fn image_path(&self) -> &Path {
        &self.image_path
    }

    /// Returns `true` if the trace is still open.
    pub fn trace_open(&self) -> bool {
        self.trace.as_ref().is_some_and(TraceHandle::is_open)
    }

    /// Runs the full reset/load/run sequence.
    ///
    /// The session is [`Phase::Stopped`] and the trace is closed when this returns, whatever
    /// the outcome.
    ///
    /// # Errors
    ///
    /// * [`HarnessError::Load`] if the image could not be loaded; reset was never released.
    /// * [`HarnessError::ModelFault`] if the model accessed memory outside its map.
    /// * [`HarnessError::Interrupted`] if the stop signal was raised while running.
    /// * [`HarnessError::Trace`] if the waveform could not be written or closed.
    /// * [`HarnessError::Stopped`] if the controller has already run.
    pub fn run(&mut self) -> Result<RunReport, HarnessError> {
        if self.session.phase == Phase::Stopped {
            return Err(HarnessError::Stopped);
        }

        let result = self.sequence();
        self.session.phase = Phase::Stopped;
        let closed = self.trace.as_mut().map_or(Ok(()), TraceHandle::close);

        match result {
            Ok(report) => {
                closed?;
                Ok(report)
            }
            Err(e) => {
                info!(time_ns = self.session.sim_time_ns, "TB: aborted");
                if let Err(close_err) = closed {
                    warn!(error = %close_err, "failed to close waveform trace");
                }
                Err(e)
            }
        }
    }

    fn sequence(&mut self) -> Result<RunReport, HarnessError> {
        self.session.phase = Phase::ResetHeld;
        self.drive_reset(true);
        if let Some(trace) = self.trace.as_mut() {
            let mut signals = CONTROLLER_SIGNALS.to_vec();
            signals.extend_from_slice(self.model.signals());
            trace.declare(&signals)?;
        }
        let _ = self.step()?;

        self.session.phase = Phase::Loading;
        info!(path = %self.image_path.display(), "Running");
        let image = match self.loader.load(&self.image_path, self.model.memory_mut()) {
            Ok(image) => image,
            Err(source) => {
                error!(path = %self.image_path.display(), error = %source, "firmware load failed");
                return Err(HarnessError::Load {
                    path: self.image_path.clone(),
                    source,
                });
            }
        };

        // Memory is settled; hold reset for one more edge before releasing it.
        let _ = self.step()?;
        self.drive_reset(false);
        self.session.phase = Phase::Running;

        let reason = loop {
            if self.stop.is_requested() {
                warn!(cycles = self.session.cycle_count, "stop requested by host");
                return Err(HarnessError::Interrupted {
                    cycles: self.session.cycle_count,
                });
            }
            self.session.cycle_count += 1;
            if self.step()? == Edge::Finished {
                info!(cycles = self.session.cycle_count, "model requested finish");
                break StopReason::ModelFinished;
            }
            if self.session.budget_spent() {
                break StopReason::CycleBudget;
            }
        };

        info!(
            cycles = self.session.cycle_count,
            time_ns = self.session.sim_time_ns,
            ?reason,
            "simulation stopped"
        );
        Ok(RunReport {
            reason,
            cycles: self.session.cycle_count,
            sim_time_ns: self.session.sim_time_ns,
            image,
        })
    }

    fn drive_reset(&mut self, asserted: bool) {
        self.rst_cpu = asserted;
        self.model.set_reset(asserted);
    }

    /// Clocks one rising edge, records both clock phases and advances simulated time.
    fn step(&mut self) -> Result<Edge, HarnessError> {
        let edge = self
            .model
            .clock_edge()
            .map_err(|fault| HarnessError::ModelFault {
                cycles: self.session.cycle_count,
                fault,
            })?;

        let rise = self.session.sim_time_ns;
        self.record(rise, true)?;
        self.record(rise + self.clock_period_ns / 2, false)?;
        self.session.sim_time_ns += self.clock_period_ns;
        Ok(edge)
    }

    fn record(&mut self, time_ns: u64, clk: bool) -> Result<(), HarnessError> {
        let Some(trace) = self.trace.as_mut() else {
            return Ok(());
        };
        self.samples.clear();
        self.samples
            .extend([clk as u64, self.rst_cpu as u64, self.session.cycle_count]);
        self.model.sample(&mut self.samples);
        trace.sample(time_ns, &self.samples)?;
        Ok(())
    }
}
