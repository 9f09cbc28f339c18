//! Value Change Dump (IEEE 1364 §18) writer.
//!
//! Produces a flat `tb` scope with a 1 ns timescale on top of [`vcd_ng::Writer`]. Only changed
//! values are emitted after the initial `$dumpvars` block. Samples taken before the configured
//! start time are folded into the initial dump instead of being written.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use vcd_ng::{IdCode, SimulationCommand, TimescaleUnit, Value, VecValue};

use super::TraceRecorder;
use crate::soc::traits::SignalDecl;

/// Name of the single scope every signal is declared in.
const TOP_MODULE: &str = "tb";

/// VCD recorder writing to any [`Write`] sink.
pub struct VcdWriter<W: Write> {
    out: vcd_ng::Writer<W>,
    start_ns: u64,
    vars: Vec<Var>,
    last: Vec<u64>,
    pending: Option<Vec<u64>>,
    bits: Vec<Value>,
    dumped: bool,
    closed: bool,
}

#[derive(Debug)]
struct Var {
    id: IdCode,
    width: u32,
}

impl VcdWriter<BufWriter<File>> {
    /// Creates `path` and records into it once simulated time reaches `start_ns`.
    ///
    /// # Errors
    ///
    /// Returns the error from creating the file.
    pub fn create(path: &Path, start_ns: u64) -> io::Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?), start_ns))
    }
}

impl<W: Write> VcdWriter<W> {
    /// Wraps `out`; nothing is written before [`TraceRecorder::declare`].
    pub fn new(out: W, start_ns: u64) -> Self {
        Self {
            out: vcd_ng::Writer::new(out),
            start_ns,
            vars: Vec::new(),
            last: Vec::new(),
            pending: None,
            bits: Vec::new(),
            dumped: false,
            closed: false,
        }
    }

    fn write_value(&mut self, index: usize, value: u64) -> io::Result<()> {
        let Var { id, width } = self.vars[index];
        if width == 1 {
            return self.out.change_scalar(id, scalar(value));
        }
        self.bits.clear();
        self.bits
            .extend((0..width).rev().map(|bit| scalar(value.checked_shr(bit).unwrap_or(0))));
        self.out.change_vector(id, &VecValue::from(self.bits.clone()))
    }

    fn dump_all(&mut self, time_ns: u64, values: &[u64]) -> io::Result<()> {
        self.out.timestamp(time_ns)?;
        self.out.begin(SimulationCommand::Dumpvars)?;
        for (i, &v) in values.iter().enumerate() {
            self.write_value(i, v)?;
        }
        self.out.end()?;
        self.last = values.to_vec();
        self.dumped = true;
        Ok(())
    }
}

impl<W: Write> TraceRecorder for VcdWriter<W> {
    fn declare(&mut self, signals: &[SignalDecl]) -> io::Result<()> {
        self.out.timescale(1, TimescaleUnit::NS)?;
        self.out.add_module(TOP_MODULE)?;
        self.vars.clear();
        for signal in signals {
            let id = self.out.add_wire(signal.width, signal.name)?;
            self.vars.push(Var {
                id,
                width: signal.width,
            });
        }
        self.out.upscope()?;
        self.out.enddefinitions()
    }

    fn sample(&mut self, time_ns: u64, values: &[u64]) -> io::Result<()> {
        if values.len() != self.vars.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} values for {} declared signals", values.len(), self.vars.len()),
            ));
        }
        if time_ns < self.start_ns {
            self.pending = Some(values.to_vec());
            return Ok(());
        }
        if !self.dumped {
            // Values settled during the delay are reported at the start time.
            if let Some(pending) = self.pending.take()
                && time_ns > self.start_ns
            {
                self.dump_all(self.start_ns, &pending)?;
            } else {
                return self.dump_all(time_ns, values);
            }
        }

        let changed: Vec<usize> = (0..values.len())
            .filter(|&i| values[i] != self.last[i])
            .collect();
        if changed.is_empty() {
            return Ok(());
        }
        self.out.timestamp(time_ns)?;
        for i in changed {
            self.write_value(i, values[i])?;
            self.last[i] = values[i];
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.writer().flush()
    }

    fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.out.writer().flush()
    }
}

impl<W: Write> fmt::Debug for VcdWriter<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VcdWriter")
            .field("start_ns", &self.start_ns)
            .field("vars", &self.vars)
            .field("dumped", &self.dumped)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

/// Bit 0 of `value` as a VCD scalar.
const fn scalar(value: u64) -> Value {
    if value & 1 == 1 { Value::V1 } else { Value::V0 }
}
