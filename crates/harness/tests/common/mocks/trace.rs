use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use tcm_harness::soc::SignalDecl;
use tcm_harness::trace::TraceRecorder;

#[derive(Default)]
pub struct TraceLog {
    pub declared: Vec<&'static str>,
    pub samples: Vec<(u64, Vec<u64>)>,
    pub flushes: usize,
    pub closes: usize,
}

/// Recorder that keeps every call in a shared [`TraceLog`].
pub struct RecordingTrace {
    log: Rc<RefCell<TraceLog>>,
    fail_samples: bool,
}

impl RecordingTrace {
    pub fn new() -> (Self, Rc<RefCell<TraceLog>>) {
        let log = Rc::new(RefCell::new(TraceLog::default()));
        (
            Self {
                log: log.clone(),
                fail_samples: false,
            },
            log,
        )
    }

    /// Makes every `sample` call fail, as a full disk would.
    pub fn failing(mut self) -> Self {
        self.fail_samples = true;
        self
    }
}

impl TraceRecorder for RecordingTrace {
    fn declare(&mut self, signals: &[SignalDecl]) -> io::Result<()> {
        self.log
            .borrow_mut()
            .declared
            .extend(signals.iter().map(|s| s.name));
        Ok(())
    }

    fn sample(&mut self, time_ns: u64, values: &[u64]) -> io::Result<()> {
        if self.fail_samples {
            return Err(io::Error::other("disk full"));
        }
        self.log.borrow_mut().samples.push((time_ns, values.to_vec()));
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.log.borrow_mut().flushes += 1;
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.log.borrow_mut().closes += 1;
        Ok(())
    }
}
