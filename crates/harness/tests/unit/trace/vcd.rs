//! # VCD Writer Tests
//!
//! Checks the header, the initial value dump, change-only output and delayed start.

use pretty_assertions::assert_eq;
use tcm_harness::soc::SignalDecl;
use tcm_harness::trace::{TraceHandle, TraceRecorder, VcdWriter};

const SIGNALS: &[SignalDecl] = &[SignalDecl::new("clk", 1), SignalDecl::new("data", 8)];

fn record(start_ns: u64, samples: &[(u64, [u64; 2])]) -> String {
    let mut buf = Vec::new();
    {
        let mut vcd = VcdWriter::new(&mut buf, start_ns);
        vcd.declare(SIGNALS).unwrap();
        for (t, values) in samples {
            vcd.sample(*t, values).unwrap();
        }
        vcd.close().unwrap();
    }
    String::from_utf8(buf).unwrap()
}

/// Everything after `$enddefinitions`.
fn body(vcd: &str) -> Vec<&str> {
    vcd.lines()
        .skip_while(|l| !l.starts_with("$enddefinitions"))
        .skip(1)
        .collect()
}

#[test]
fn header_declares_each_signal() {
    let vcd = record(0, &[]);
    let lines: Vec<&str> = vcd.lines().map(str::trim).collect();
    assert!(lines.iter().any(|l| l.starts_with("$timescale") && l.contains("ns")));
    let scope = lines.iter().position(|l| *l == "$scope module tb $end").unwrap();
    assert_eq!(
        &lines[scope..],
        &[
            "$scope module tb $end",
            "$var wire 1 ! clk $end",
            "$var wire 8 \" data $end",
            "$upscope $end",
            "$enddefinitions $end",
        ]
    );
}

#[test]
fn only_changes_follow_the_initial_dump() {
    let vcd = record(0, &[(0, [1, 5]), (5, [0, 5]), (10, [1, 6]), (15, [1, 6])]);
    assert_eq!(
        body(&vcd),
        vec![
            "#0",
            "$dumpvars",
            "1!",
            "b00000101 \"",
            "$end",
            "#5",
            "0!",
            "#10",
            "1!",
            "b00000110 \"",
        ]
    );
}

#[test]
fn values_are_masked_to_width() {
    let vcd = record(0, &[(0, [3, 0x1FF])]);
    assert!(body(&vcd).contains(&"1!"));
    assert!(body(&vcd).contains(&"b11111111 \""));
}

#[test]
fn delayed_start_dumps_settled_values_at_start_time() {
    let vcd = record(20, &[(0, [1, 5]), (10, [0, 5]), (15, [1, 4]), (25, [0, 6])]);
    assert_eq!(
        body(&vcd),
        vec!["#20", "$dumpvars", "1!", "b00000100 \"", "$end", "#25", "0!", "b00000110 \""]
    );
}

#[test]
fn sample_at_start_time_is_the_initial_dump() {
    let vcd = record(10, &[(0, [1, 1]), (10, [0, 2])]);
    assert_eq!(body(&vcd), vec!["#10", "$dumpvars", "0!", "b00000010 \"", "$end"]);
}

#[test]
fn wrong_value_count_is_rejected() {
    let mut vcd = VcdWriter::new(Vec::new(), 0);
    vcd.declare(SIGNALS).unwrap();
    assert!(vcd.sample(0, &[1]).is_err());
}

#[test]
fn created_file_is_complete_after_handle_drop() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sysc_wave.vcd");
    {
        let mut handle = TraceHandle::new(Box::new(VcdWriter::create(&path, 0).unwrap()));
        handle.declare(SIGNALS).unwrap();
        handle.sample(0, &[1, 0xA]).unwrap();
    }
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("$enddefinitions $end"));
    assert!(text.trim_end().ends_with("$end"));
    assert!(text.contains("b00001010 \""));
}
