//! TCM testbench CLI.
//!
//! This binary runs one firmware image on the core + TCM model. It performs:
//! 1. **Configuration:** Built-in defaults, an optional JSON file, then the `ENABLE_WAVES` and
//!    `WAVES_DELAY_US` environment variables.
//! 2. **Load:** Holds the core in reset and loads the ELF given with `--elf`.
//! 3. **Run:** Releases reset and clocks the model for `--cycles` edges, until the firmware
//!    finishes, or until Ctrl-C.
//!
//! Exit status is zero only for a run that stopped normally. Help output, bad arguments, load
//! failures, model faults and interrupts all exit nonzero.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use tcm_harness::common::ConfigError;
use tcm_harness::config::{self, Config};
use tcm_harness::sim::{StopSignal, interrupt};
use tcm_harness::soc::TcmTop;
use tcm_harness::trace::{TraceHandle, VcdWriter};
use tcm_harness::RunController;

#[derive(Parser, Debug)]
#[command(
    name = "tb",
    author,
    about = "Load firmware into TCM, release reset, run N cycles",
    long_about = concat!(
        "Holds the core in reset, loads an ELF image into tightly-coupled memory, ",
        "then releases reset and clocks the model.\n\n",
        "Environment:\n",
        "  ENABLE_WAVES=no     disable the waveform trace (any other value enables it)\n",
        "  WAVES_DELAY_US=N    start recording after N simulated microseconds\n",
        "  RUST_LOG=...        log filter (default: info)",
    )
)]
struct Cli {
    /// ELF file to load.
    #[arg(short = 'f', long = "elf", value_name = "FILE")]
    elf: PathBuf,

    /// Max cycles to execute; -1 runs until the firmware finishes or Ctrl-C.
    #[arg(
        short = 'c',
        long = "cycles",
        value_name = "NUM",
        default_value = "-1",
        allow_negative_numbers = true,
        value_parser = parse_cycles
    )]
    cycles: CycleBudget,

    /// Force waveform tracing on (1) or off (0).
    #[arg(long, value_name = "0|1")]
    trace: Option<u8>,

    /// Waveform file name, without the .vcd extension.
    #[arg(long, value_name = "NAME", alias = "vcd_name")]
    vcd_name: Option<String>,

    /// JSON configuration file (memory map, clock, boot address, trace).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

/// `--cycles` value; `None` is unbounded.
#[derive(Clone, Copy, Debug)]
struct CycleBudget(Option<u64>);

fn parse_cycles(arg: &str) -> Result<CycleBudget, String> {
    config::parse_cycle_budget(arg)
        .map(CycleBudget)
        .map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    // Help, missing --elf and bad values all end here, before any reset or load activity.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("TEST FAILED");
            ExitCode::FAILURE
        }
    }
}

/// Layers the configuration file, then the environment, then command-line flags.
fn resolve_config<F>(cli: &Cli, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match &cli.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };
    config.apply_env(lookup)?;
    if let Some(trace) = cli.trace {
        config.trace.enabled = trace != 0;
    }
    if let Some(name) = &cli.vcd_name {
        config.trace.vcd_name.clone_from(name);
    }
    Ok(config)
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(&cli, |name| std::env::var(name).ok())?;

    let stop = StopSignal::new();
    if !interrupt::install_sigint(&stop) {
        warn!("Ctrl-C handler not installed; interrupt will not close the trace");
    }

    let model = TcmTop::new(&config)?;
    let mut controller =
        RunController::new(model, &cli.elf, cli.cycles.0, config.clock.period_ns)
            .with_stop_signal(stop);

    if config.trace.enabled {
        let path = PathBuf::from(format!("{}.vcd", config.trace.vcd_name));
        if let Some(us) = config.trace.delay_us {
            info!("WAVES: delay start until {us}us");
        }
        let writer = VcdWriter::create(&path, config.trace.delay_ns())?;
        info!(path = %path.display(), "waveform trace enabled");
        controller = controller.with_trace(TraceHandle::new(Box::new(writer)));
    }

    let report = controller.run()?;
    info!(
        cycles = report.cycles,
        time_ns = report.sim_time_ns,
        entry = format_args!("{:#x}", report.image.entry_point),
        fetched = controller.model().retired(),
        reason = ?report.reason,
        "exit success"
    );
    Ok(())
}
