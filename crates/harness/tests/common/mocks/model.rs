use tcm_harness::common::{AccessFault, AccessType, MemoryWindow};
use tcm_harness::sim::StopSignal;
use tcm_harness::soc::{Edge, HardwareModel, MemoryTarget, SignalDecl};

use super::memory::RecordingMemory;
use super::{Event, EventLog};

const SIGNALS: &[SignalDecl] = &[SignalDecl::new("running_edges", 16)];

/// Model that finishes or faults after a fixed number of edges out of reset.
pub struct ScriptedModel {
    memory: RecordingMemory,
    log: EventLog,
    reset: bool,
    running_edges: u64,
    finish_after: Option<u64>,
    fault_after: Option<u64>,
    stop_after: Option<(u64, StopSignal)>,
}

impl ScriptedModel {
    pub fn new(window: MemoryWindow, log: EventLog) -> Self {
        Self {
            memory: RecordingMemory::new(window).with_log(log.clone()),
            log,
            reset: false,
            running_edges: 0,
            finish_after: None,
            fault_after: None,
            stop_after: None,
        }
    }

    pub fn finish_after(mut self, edges: u64) -> Self {
        self.finish_after = Some(edges);
        self
    }

    pub fn fault_after(mut self, edges: u64) -> Self {
        self.fault_after = Some(edges);
        self
    }

    /// Raises `signal` on the given running edge, as a host Ctrl-C would.
    pub fn stop_after(mut self, edges: u64, signal: StopSignal) -> Self {
        self.stop_after = Some((edges, signal));
        self
    }

    pub fn memory(&self) -> &RecordingMemory {
        &self.memory
    }

    pub fn running_edges(&self) -> u64 {
        self.running_edges
    }
}

impl HardwareModel for ScriptedModel {
    fn memory_mut(&mut self) -> &mut dyn MemoryTarget {
        &mut self.memory
    }

    fn set_reset(&mut self, asserted: bool) {
        self.reset = asserted;
        self.log.borrow_mut().push(Event::Reset(asserted));
    }

    fn clock_edge(&mut self) -> Result<Edge, AccessFault> {
        self.log.borrow_mut().push(Event::Edge { reset: self.reset });
        if self.reset {
            return Ok(Edge::Continue);
        }
        self.running_edges += 1;
        if let Some((n, signal)) = &self.stop_after
            && self.running_edges >= *n
        {
            signal.request();
        }
        if self.fault_after.is_some_and(|n| self.running_edges >= n) {
            let window = self.memory.window();
            return Err(AccessFault::new(AccessType::Fetch, window.end() as u32, window));
        }
        if self.finish_after.is_some_and(|n| self.running_edges >= n) {
            return Ok(Edge::Finished);
        }
        Ok(Edge::Continue)
    }

    fn signals(&self) -> &'static [SignalDecl] {
        SIGNALS
    }

    fn sample(&self, out: &mut Vec<u64>) {
        out.push(self.running_edges);
    }
}
