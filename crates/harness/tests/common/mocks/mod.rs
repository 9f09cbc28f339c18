/// Hardware model driven by a script of edges.
pub mod model;
/// Trace recorder that records every call.
pub mod trace;

use std::cell::RefCell;
use std::rc::Rc;

/// One observable interaction between the harness and the model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Reset(bool),
    Edge { reset: bool },
    Validate(u32),
    Write(u32),
}

/// Event log shared between a mock model and its memory.
pub type EventLog = Rc<RefCell<Vec<Event>>>;

pub fn event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}
