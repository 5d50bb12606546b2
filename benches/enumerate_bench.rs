// Criterion benchmark suite: bounded rule enumeration
//
// Run: cargo bench
// With libyara: cargo bench --features ffi
// HTML report: target/criterion/report/index.html

use std::mem::MaybeUninit;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use yara_helpers::ruleset::{self, Ruleset};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Rules laid out contiguously, like libyara's rules table.
struct Table {
    rules: Vec<[u8; 64]>,
}

impl Table {
    fn new(n: usize) -> Self {
        Table {
            rules: vec![[0u8; 64]; n],
        }
    }
}

type Handle = *const [u8; 64];

fn handle(rule: &[u8; 64]) -> Handle {
    rule
}

impl Ruleset for Table {
    type Rule = Handle;
    type Iter<'r> = std::iter::Map<std::slice::Iter<'r, [u8; 64]>, fn(&[u8; 64]) -> Handle>;

    fn rules(&self) -> Self::Iter<'_> {
        self.rules.iter().map(handle as fn(&[u8; 64]) -> Handle)
    }
}

const SIZES: &[usize] = &[0, 16, 1024, 65536];

// ---------------------------------------------------------------------------
// 1. enumerate -- buffer sized to the ruleset, and truncated to 16 slots
// ---------------------------------------------------------------------------

fn bench_enumerate(c: &mut Criterion) {
    let mut group = c.benchmark_group("enumerate");
    for &n in SIZES {
        let table = Table::new(n);

        let mut full: Vec<Handle> = vec![std::ptr::null(); n];
        group.bench_with_input(BenchmarkId::new("full", n), &table, |b, table| {
            b.iter(|| black_box(ruleset::enumerate(black_box(table), &mut full, n)));
        });

        let mut small: [Handle; 16] = [std::ptr::null(); 16];
        group.bench_with_input(BenchmarkId::new("truncated", n), &table, |b, table| {
            b.iter(|| black_box(ruleset::enumerate(black_box(table), &mut small, 16)));
        });

        let mut uninit = vec![MaybeUninit::<Handle>::uninit(); n];
        group.bench_with_input(BenchmarkId::new("uninit", n), &table, |b, table| {
            b.iter(|| black_box(ruleset::enumerate_uninit(black_box(table), &mut uninit, n)));
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// 2. count
// ---------------------------------------------------------------------------

fn bench_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("count");
    for &n in SIZES {
        let table = Table::new(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &table, |b, table| {
            b.iter(|| black_box(ruleset::count(black_box(table))));
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// 3. libyara -- the same operations over a compiled ruleset
// ---------------------------------------------------------------------------

#[cfg(feature = "ffi")]
fn bench_libyara(c: &mut Criterion) {
    use yara_helpers::ffi::YR_RULE;
    use yara_helpers::Compiler;

    let mut group = c.benchmark_group("libyara");
    for &n in &[16usize, 1024] {
        let source: String = (0..n)
            .map(|i| format!("rule r{} {{ condition: true }}\n", i))
            .collect();
        let mut compiler = Compiler::new().expect("compiler");
        compiler.add_rules_str(&source).expect("rules");
        let rules = compiler.compile_rules().expect("compile");

        let mut out = vec![std::ptr::null_mut::<YR_RULE>(); n];
        group.bench_with_input(BenchmarkId::new("enumerate", n), &rules, |b, rules| {
            b.iter(|| black_box(rules.enumerate(&mut out, n)));
        });
        group.bench_with_input(BenchmarkId::new("count", n), &rules, |b, rules| {
            b.iter(|| black_box(rules.count()));
        });
    }
    group.finish();
}

#[cfg(not(feature = "ffi"))]
fn bench_libyara(_: &mut Criterion) {}

criterion_group!(benches, bench_enumerate, bench_count, bench_libyara);
criterion_main!(benches);
