//! Configuration for the testbench.
//!
//! This module defines the configuration structures used to parameterize a run. It provides:
//! 1. **Defaults:** The memory map, clock and boot address of the TCM top level.
//! 2. **Structures:** Memory, clock, CPU and waveform-trace sections.
//! 3. **Overrides:** JSON configuration files and the `ENABLE_WAVES` / `WAVES_DELAY_US`
//!    environment variables.
//! 4. **Cycle budgets:** Parsing of the `--cycles` argument.
//!
//! Every section is `#[serde(default)]`, so a configuration file only needs the keys it
//! changes.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::common::{ConfigError, MemoryWindow};

/// Default configuration constants for the testbench.
mod defaults {
    /// Base address of the TCM.
    pub const MEM_BASE: u32 = 0x0000_0000;

    /// Size of the TCM (64 KiB).
    pub const MEM_SIZE: u32 = 64 * 1024;

    /// Clock period in nanoseconds (100 MHz).
    pub const CLOCK_PERIOD_NS: u64 = 10;

    /// Address the core fetches from when it leaves reset.
    pub const BOOT_ADDR: u32 = MEM_BASE;

    /// Base name of the waveform file; `.vcd` is appended.
    pub const VCD_NAME: &str = "sysc_wave";
}

/// Environment variable that enables (`anything but "no"`) or disables (`"no"`) waveforms.
pub const ENV_ENABLE_WAVES: &str = "ENABLE_WAVES";

/// Environment variable holding the trace start delay in microseconds.
pub const ENV_WAVES_DELAY_US: &str = "WAVES_DELAY_US";

/// Memory map of the TCM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// First TCM address.
    pub base: u32,
    /// TCM size in bytes.
    pub size: u32,
}

impl MemoryConfig {
    /// Returns the TCM window described by this section.
    pub const fn window(&self) -> MemoryWindow {
        MemoryWindow::new(self.base, self.size)
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            base: defaults::MEM_BASE,
            size: defaults::MEM_SIZE,
        }
    }
}

/// Clock generation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Period of the core clock in nanoseconds.
    pub period_ns: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            period_ns: defaults::CLOCK_PERIOD_NS,
        }
    }
}

/// Settings of the core under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CpuConfig {
    /// Reset vector.
    pub boot_addr: u32,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            boot_addr: defaults::BOOT_ADDR,
        }
    }
}

/// Waveform trace settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Record a waveform trace.
    pub enabled: bool,
    /// Trace file name without the `.vcd` extension.
    pub vcd_name: String,
    /// Simulated microseconds to skip before recording starts.
    pub delay_us: Option<u64>,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            vcd_name: defaults::VCD_NAME.to_string(),
            delay_us: None,
        }
    }
}

impl TraceConfig {
    /// Returns the delay before recording starts, in nanoseconds of simulated time.
    pub const fn delay_ns(&self) -> u64 {
        match self.delay_us {
            Some(us) => us.saturating_mul(1000),
            None => 0,
        }
    }
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use tcm_harness::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.memory.size, 64 * 1024);
/// assert!(!config.trace.enabled);
/// ```
///
/// Partial JSON keeps the defaults for everything it omits:
///
/// ```
/// use tcm_harness::config::Config;
///
/// let config: Config = serde_json::from_str(r#"{ "memory": { "size": 131072 } }"#).unwrap();
/// assert_eq!(config.memory.size, 128 * 1024);
/// assert_eq!(config.memory.base, 0);
/// assert_eq!(config.clock.period_ns, 10);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// TCM memory map.
    pub memory: MemoryConfig,
    /// Clock generation.
    pub clock: ClockConfig,
    /// Core settings.
    pub cpu: CpuConfig,
    /// Waveform tracing.
    pub trace: TraceConfig,
}

impl Config {
    /// Reads a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read and [`ConfigError::Parse`]
    /// if it is not a valid configuration.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies the waveform environment variables using `lookup` to read them.
    ///
    /// `ENABLE_WAVES=no` disables tracing and any other value enables it. When the
    /// variable is absent the configured value is kept. `WAVES_DELAY_US` accepts
    /// decimal or `0x`-prefixed hexadecimal.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] if `WAVES_DELAY_US` is not a number.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_ENABLE_WAVES) {
            self.trace.enabled = value != "no";
        }
        if let Some(value) = lookup(ENV_WAVES_DELAY_US) {
            let us = parse_unsigned(&value).ok_or(ConfigError::Env {
                name: ENV_WAVES_DELAY_US,
                value,
            })?;
            self.trace.delay_us = Some(us);
        }
        Ok(())
    }
}

/// Parses a `--cycles` argument.
///
/// Returns `None` for `-1` (run until an external stop) and `Some(n)` for an unsigned
/// decimal or `0x`-prefixed hexadecimal number.
///
/// # Errors
///
/// Returns [`ConfigError::Cycles`] for anything else, including other negative numbers.
///
/// # Examples
///
/// ```
/// use tcm_harness::config::parse_cycle_budget;
///
/// assert_eq!(parse_cycle_budget("-1").unwrap(), None);
/// assert_eq!(parse_cycle_budget("0x100").unwrap(), Some(256));
/// assert!(parse_cycle_budget("-2").is_err());
/// ```
pub fn parse_cycle_budget(arg: &str) -> Result<Option<u64>, ConfigError> {
    if arg.trim() == "-1" {
        return Ok(None);
    }
    parse_unsigned(arg)
        .map(Some)
        .ok_or_else(|| ConfigError::Cycles(arg.to_string()))
}

fn parse_unsigned(text: &str) -> Option<u64> {
    let text = text.trim();
    let (digits, radix) = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None => (text, 10),
    };
    if digits.starts_with(['+', '-']) {
        return None;
    }
    u64::from_str_radix(digits, radix).ok()
}
