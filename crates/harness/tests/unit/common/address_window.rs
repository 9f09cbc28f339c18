//! # Memory Window Tests
//!
//! Verifies containment checks, offsets and formatting of memory windows, including windows
//! that reach the top of the address space.

use proptest::prelude::*;
use tcm_harness::common::MemoryWindow;

#[test]
fn contains_is_half_open() {
    let w = MemoryWindow::new(0x1000, 0x100);
    assert!(!w.contains(0x0FFF));
    assert!(w.contains(0x1000));
    assert!(w.contains(0x10FF));
    assert!(!w.contains(0x1100));
}

#[test]
fn end_of_top_window_is_two_to_the_32() {
    let w = MemoryWindow::new(0xFFFF_0000, 0x1_0000);
    assert_eq!(w.end(), 1 << 32);
    assert!(w.contains(0xFFFF_FFFF));
    assert!(w.contains_range(0xFFFF_FFF0, 0x10));
    assert!(!w.contains_range(0xFFFF_FFF0, 0x11));
}

#[test]
fn contains_range_rejects_overflowing_length() {
    let w = MemoryWindow::new(0, 0x1000);
    assert!(!w.contains_range(0x10, u64::MAX));
}

#[test]
fn empty_range_at_end_is_contained() {
    let w = MemoryWindow::new(0, 0x1000);
    assert!(w.contains_range(0x1000, 0));
}

#[test]
fn offset_is_relative_to_base() {
    let w = MemoryWindow::new(0x2000_0000, 0x4000);
    assert_eq!(w.offset_of(0x2000_0010), Some(0x10));
    assert_eq!(w.offset_of(0x1FFF_FFFF), None);
    assert_eq!(w.offset_of(0x2000_4000), None);
}

#[test]
fn display_shows_half_open_range() {
    let w = MemoryWindow::new(0x0, 0x1_0000);
    assert_eq!(w.to_string(), "[0x00000000, 0x00010000)");
}

proptest! {
    #[test]
    fn contains_range_agrees_with_endpoint_checks(
        start in 0u64..0x2_0000,
        len in 1u64..0x1000,
    ) {
        let w = MemoryWindow::new(0x8000, 0x8000);
        let last = start + len - 1;
        let expected = start >= 0x8000 && last < 0x1_0000;
        prop_assert_eq!(w.contains_range(start, len), expected);
    }
}
