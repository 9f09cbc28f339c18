//! # TCM Top-Level Tests
//!
//! Runs small firmware images on the core + TCM model through the run controller and checks
//! the fetch behaviour the harness relies on: nothing happens in reset, one word is fetched
//! per edge, and the finish idioms end the run.

use pretty_assertions::assert_eq;
use tcm_harness::common::constants::{EBREAK, JAL_SELF};
use tcm_harness::common::{AccessType, HarnessError};
use tcm_harness::config::Config;
use tcm_harness::sim::{RunController, StopReason};
use tcm_harness::soc::{Edge, HardwareModel, MemoryTarget, TcmTop};

use crate::common::builder::elf::ElfBuilder;
use crate::common::temp_image;

const NOP: u32 = 0x0000_0013;

fn program(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

type Outcome = (RunController<TcmTop>, Result<StopReason, HarnessError>);

fn run(config: &Config, words: &[u32], max_cycles: Option<u64>) -> Outcome {
    let image = temp_image(
        &ElfBuilder::new()
            .entry(config.cpu.boot_addr as u64)
            .segment(config.cpu.boot_addr as u64, &program(words))
            .build(),
    );
    let model = TcmTop::new(config).unwrap();
    let mut ctl = RunController::new(model, image.path(), max_cycles, config.clock.period_ns);
    let result = ctl.run().map(|report| report.reason);
    (ctl, result)
}

#[test]
fn ebreak_finishes_the_run() {
    let (ctl, result) = run(&Config::default(), &[NOP, NOP, EBREAK], None);

    assert_eq!(result.unwrap(), StopReason::ModelFinished);
    assert_eq!(ctl.session().cycle_count, 3);
    assert_eq!(ctl.model().retired(), 3);
    assert_eq!(ctl.model().pc(), 8);
    assert!(ctl.model().halted());
}

#[test]
fn jump_to_self_finishes_the_run() {
    let (ctl, result) = run(&Config::default(), &[JAL_SELF], Some(50));
    assert_eq!(result.unwrap(), StopReason::ModelFinished);
    assert_eq!(ctl.session().cycle_count, 1);
}

#[test]
fn budget_stops_a_running_core() {
    let (ctl, result) = run(&Config::default(), &[NOP; 16], Some(10));
    assert_eq!(result.unwrap(), StopReason::CycleBudget);
    assert_eq!(ctl.model().pc(), 40);
    assert!(!ctl.model().halted());
}

#[test]
fn fetch_past_tcm_is_a_model_fault() {
    let mut config = Config::default();
    config.memory.size = 16;
    let (_, result) = run(&config, &[NOP; 4], None);

    match result.unwrap_err() {
        HarnessError::ModelFault { cycles, fault } => {
            assert_eq!(cycles, 5);
            assert_eq!(fault.access, AccessType::Fetch);
            assert_eq!(fault.addr, 16);
        }
        other => panic!("expected ModelFault, got {other:?}"),
    }
}

#[test]
fn boots_from_configured_address() {
    let mut config = Config::default();
    config.memory.base = 0x2000_0000;
    config.cpu.boot_addr = 0x2000_0100;
    let (ctl, result) = run(&config, &[NOP, EBREAK], None);

    assert_eq!(result.unwrap(), StopReason::ModelFinished);
    assert_eq!(ctl.model().pc(), 0x2000_0104);
    assert_eq!(ctl.model().tcm().read_u32_le(0x2000_0104).unwrap(), EBREAK);
}

#[test]
fn core_is_idle_while_in_reset() {
    let mut top = TcmTop::new(&Config::default()).unwrap();
    top.memory_mut().write_bytes(0, &program(&[EBREAK])).unwrap();
    top.set_reset(true);

    for _ in 0..3 {
        assert_eq!(top.clock_edge().unwrap(), Edge::Continue);
    }
    assert_eq!(top.retired(), 0);
    assert_eq!(top.pc(), 0);

    top.set_reset(false);
    assert_eq!(top.clock_edge().unwrap(), Edge::Finished);
    assert_eq!(top.retired(), 1);
}

#[test]
fn sampled_values_match_declared_signals() {
    let top = TcmTop::new(&Config::default()).unwrap();
    let mut values = Vec::new();
    top.sample(&mut values);
    let names: Vec<&str> = top.signals().iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["pc", "fetch_data", "halted"]);
    assert_eq!(values.len(), names.len());
}
