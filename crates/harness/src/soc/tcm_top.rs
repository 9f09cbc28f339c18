//! Behavioural stand-in for the core + TCM top level.
//!
//! The real design under test is generated RTL. This model reproduces only what the harness
//! interacts with:
//! 1. **Reset:** While `rst_cpu` is asserted the fetch address is held at the boot address and
//!    the core issues no memory traffic.
//! 2. **Fetch port:** Out of reset, one 32-bit instruction word is fetched from TCM per clock
//!    edge and the fetch address advances sequentially.
//! 3. **Finish:** Fetching `ebreak` or a jump-to-self raises the stop notification.
//!
//! A fetch outside the TCM is reported as an access fault, which the run controller treats
//! as fatal.

use tracing::trace;

use crate::common::constants::{EBREAK, INSTRUCTION_SIZE, JAL_SELF};
use crate::common::{AccessFault, AccessType, ConfigError};
use crate::config::Config;
use crate::soc::memory::Tcm;
use crate::soc::traits::{Edge, HardwareModel, MemoryTarget, SignalDecl};

const SIGNALS: &[SignalDecl] = &[
    SignalDecl::new("pc", 32),
    SignalDecl::new("fetch_data", 32),
    SignalDecl::new("halted", 1),
];

/// Processor top level with its tightly-coupled memory.
#[derive(Debug)]
pub struct TcmTop {
    tcm: Tcm,
    boot_addr: u32,
    rst_cpu: bool,
    pc: u32,
    fetch_data: u32,
    halted: bool,
    retired: u64,
}

impl TcmTop {
    /// Builds the top level from the memory map and boot address in `config`.
    ///
    /// The core powers up with reset asserted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Window`] if the configured TCM window is invalid.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            tcm: Tcm::new(config.memory.window())?,
            boot_addr: config.cpu.boot_addr,
            rst_cpu: true,
            pc: config.cpu.boot_addr,
            fetch_data: 0,
            halted: false,
            retired: 0,
        })
    }

    /// Returns the TCM contents.
    pub const fn tcm(&self) -> &Tcm {
        &self.tcm
    }

    /// Current fetch address.
    pub const fn pc(&self) -> u32 {
        self.pc
    }

    /// Returns `true` once the core has fetched a finish idiom.
    pub const fn halted(&self) -> bool {
        self.halted
    }

    /// Number of instruction words fetched since reset was released.
    pub const fn retired(&self) -> u64 {
        self.retired
    }

    fn fetch(&self, addr: u32) -> Result<u32, AccessFault> {
        self.tcm
            .read_u32_le(addr)
            .map_err(|f| AccessFault::new(AccessType::Fetch, f.addr, f.window))
    }
}

impl HardwareModel for TcmTop {
    fn memory_mut(&mut self) -> &mut dyn MemoryTarget {
        &mut self.tcm
    }

    fn set_reset(&mut self, asserted: bool) {
        self.rst_cpu = asserted;
    }

    fn clock_edge(&mut self) -> Result<Edge, AccessFault> {
        if self.rst_cpu {
            self.pc = self.boot_addr;
            self.fetch_data = 0;
            self.halted = false;
            self.retired = 0;
            return Ok(Edge::Continue);
        }
        if self.halted {
            return Ok(Edge::Finished);
        }

        let word = self.fetch(self.pc)?;
        self.fetch_data = word;
        self.retired += 1;
        trace!(
            pc = format_args!("{:#010x}", self.pc),
            word = format_args!("{word:#010x}"),
            "fetch"
        );

        if word == EBREAK || word == JAL_SELF {
            self.halted = true;
            return Ok(Edge::Finished);
        }
        self.pc = self
            .pc
            .checked_add(INSTRUCTION_SIZE)
            .ok_or(AccessFault::new(AccessType::Fetch, self.pc, self.tcm.window()))?;
        Ok(Edge::Continue)
    }

    fn signals(&self) -> &'static [SignalDecl] {
        SIGNALS
    }

    fn sample(&self, out: &mut Vec<u64>) {
        out.extend([
            self.pc as u64,
            self.fetch_data as u64,
            self.halted as u64,
        ]);
    }
}
