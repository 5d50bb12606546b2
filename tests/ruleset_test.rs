// ruleset_test.rs - Integration tests for bounded rule enumeration.

use std::mem::MaybeUninit;

use yara_helpers::ruleset::{self, Ruleset};

/// A ruleset backed by a list, handing out indices as rule handles.
struct Table {
    names: Vec<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Handle(usize);

impl Table {
    fn new(names: &[&'static str]) -> Self {
        Table {
            names: names.to_vec(),
        }
    }

    fn with_len(n: usize) -> Self {
        Table {
            names: vec!["r"; n],
        }
    }

    fn name(&self, handle: Handle) -> &'static str {
        self.names[handle.0]
    }
}

impl Ruleset for Table {
    type Rule = Handle;
    type Iter<'r> = std::iter::Map<std::ops::Range<usize>, fn(usize) -> Handle>;

    fn rules(&self) -> Self::Iter<'_> {
        (0..self.names.len()).map(Handle as fn(usize) -> Handle)
    }
}

const SENTINEL: Handle = Handle(usize::MAX);

// === enumerate ===

#[test]
fn truncates_to_capacity_in_order() {
    let table = Table::new(&["r1", "r2", "r3", "r4", "r5"]);
    let mut out = [SENTINEL; 8];
    assert_eq!(ruleset::enumerate(&table, &mut out, 3), 3);

    let names: Vec<&str> = out[..3].iter().map(|h| table.name(*h)).collect();
    assert_eq!(names, ["r1", "r2", "r3"]);
    assert_eq!(ruleset::count(&table), 5);
}

#[test]
fn empty_ruleset_writes_nothing() {
    let table = Table::with_len(0);
    let mut out = [SENTINEL; 10];
    assert_eq!(ruleset::enumerate(&table, &mut out, 10), 0);
    assert_eq!(out, [SENTINEL; 10]);
    assert_eq!(ruleset::count(&table), 0);
}

#[test]
fn capacity_larger_than_count() {
    let table = Table::new(&["only"]);
    let mut out = [SENTINEL; 4];
    assert_eq!(ruleset::enumerate(&table, &mut out, 4), 1);
    assert_eq!(out, [Handle(0), SENTINEL, SENTINEL, SENTINEL]);
}

#[test]
fn written_is_min_of_count_and_capacity() {
    for len in 0..12 {
        let table = Table::with_len(len);
        for capacity in 0..12 {
            let mut out = vec![SENTINEL; 16];
            let n = ruleset::enumerate(&table, &mut out, capacity);
            assert_eq!(n, len.min(capacity), "len={} capacity={}", len, capacity);

            let expected: Vec<Handle> = (0..n).map(Handle).collect();
            assert_eq!(out[..n], expected[..]);
            assert!(out[n..].iter().all(|h| *h == SENTINEL));
        }
    }
}

#[test]
fn capacity_beyond_buffer_is_clamped() {
    let table = Table::with_len(10);
    let mut out = [SENTINEL; 3];
    assert_eq!(ruleset::enumerate(&table, &mut out, usize::MAX), 3);
    assert_eq!(out, [Handle(0), Handle(1), Handle(2)]);
}

#[test]
fn repeated_calls_agree() {
    let table = Table::new(&["a", "b", "c", "d"]);
    let mut first = [SENTINEL; 4];
    let mut second = [SENTINEL; 4];
    let n1 = ruleset::enumerate(&table, &mut first, 4);
    let n2 = ruleset::enumerate(&table, &mut second, 4);
    assert_eq!(n1, n2);
    assert_eq!(first, second);
    assert_eq!(ruleset::count(&table), ruleset::count(&table));
}

#[test]
fn option_buffer() {
    let table = Table::new(&["x", "y"]);
    let mut out: [Option<Handle>; 3] = [None; 3];
    assert_eq!(ruleset::enumerate(&table, &mut out, 3), 2);
    assert_eq!(out, [Some(Handle(0)), Some(Handle(1)), None]);
}

// === enumerate_uninit ===

#[test]
fn uninit_buffer_prefix() {
    let table = Table::with_len(7);
    let mut out = [MaybeUninit::<Handle>::uninit(); 5];
    let n = ruleset::enumerate_uninit(&table, &mut out, 5);
    assert_eq!(n, 5);

    let written: Vec<Handle> = out[..n]
        .iter()
        .map(|slot| unsafe { slot.assume_init() })
        .collect();
    assert_eq!(written, [Handle(0), Handle(1), Handle(2), Handle(3), Handle(4)]);
}

#[test]
fn uninit_zero_capacity() {
    let table = Table::with_len(3);
    let mut out = [MaybeUninit::<Handle>::uninit(); 2];
    assert_eq!(ruleset::enumerate_uninit(&table, &mut out, 0), 0);
}

// === count ===

#[test]
fn count_matches_full_enumeration() {
    let table = Table::with_len(25);
    let total = ruleset::count(&table);
    let mut out = vec![SENTINEL; total];
    assert_eq!(ruleset::enumerate(&table, &mut out, total), total);
}

#[test]
fn count_through_generic_helper() {
    fn total<R: Ruleset + ?Sized>(r: &R) -> usize {
        ruleset::count(r)
    }
    let table = Table::with_len(4);
    assert_eq!(total(&table), 4);
}
