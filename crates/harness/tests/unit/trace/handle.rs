//! # Trace Handle Tests
//!
//! A handle must close its recorder exactly once, whether closed explicitly or dropped.

use tcm_harness::soc::SignalDecl;
use tcm_harness::trace::TraceHandle;

use crate::common::mocks::trace::RecordingTrace;

#[test]
fn drop_closes_an_open_recorder() {
    let (recorder, log) = RecordingTrace::new();
    let handle = TraceHandle::new(Box::new(recorder));
    drop(handle);

    let log = log.borrow();
    assert_eq!((log.flushes, log.closes), (1, 1));
}

#[test]
fn explicit_close_is_not_repeated_on_drop() {
    let (recorder, log) = RecordingTrace::new();
    let mut handle = TraceHandle::new(Box::new(recorder));

    handle.close().unwrap();
    handle.close().unwrap();
    assert!(!handle.is_open());
    drop(handle);

    assert_eq!(log.borrow().closes, 1);
}

#[test]
fn calls_after_close_are_ignored() {
    let (recorder, log) = RecordingTrace::new();
    let mut handle = TraceHandle::new(Box::new(recorder));
    handle.declare(&[SignalDecl::new("clk", 1)]).unwrap();
    handle.sample(0, &[1]).unwrap();
    handle.close().unwrap();

    handle.sample(5, &[0]).unwrap();

    let log = log.borrow();
    assert_eq!(log.declared, vec!["clk"]);
    assert_eq!(log.samples, vec![(0, vec![1])]);
}
