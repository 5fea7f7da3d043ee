//! Benchmarks for the sCalc compiler and interpreter.
//!
//! Run with: `cargo bench --package scalc_language`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use scalc_foundation::FixedString;
use scalc_language::{Operands, Vm, compile, disassemble};

const NUMERIC: &[(&str, &str)] = &[
    ("constant", "42"),
    ("add_simple", "A+B"),
    ("arithmetic", "(A+B)*C-D/2"),
    ("functions", "SQRT(A*A+B*B)+ABS(C)"),
    ("conditional", "A>B?A-B:B-A"),
    ("vararg", "MAX(A,B,C,D,E,F)"),
    ("bitwise", "(A<<4)|(B&15)"),
];

const STRINGS: &[(&str, &str)] = &[
    ("concat", "AA+BB"),
    ("printf", "PRINTF('%8.3f',A)"),
    ("sscanf", "SSCANF('T=12.5','T=%lf')"),
    ("subrange", "AA[1,3]"),
    ("checksum", "MODBUS('\\x01\\x03\\x00\\x00\\x00\\x02')"),
];

fn registers() -> ([f64; 16], [FixedString; 12]) {
    let mut numbers = [0.0; 16];
    for (i, n) in numbers.iter_mut().enumerate() {
        *n = i as f64 + 1.5;
    }
    let mut strings = [FixedString::from("abcdef"); 12];
    strings[1] = FixedString::from("ghi");
    (numbers, strings)
}

// =============================================================================
// Compiler Benchmarks
// =============================================================================

fn bench_compiler(c: &mut Criterion) {
    let mut group = c.benchmark_group("compiler");

    for (name, source) in NUMERIC.iter().chain(STRINGS) {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::new(*name, source.len()), source, |b, s| {
            b.iter(|| compile(black_box(s)))
        });
    }

    let long = vec!["A*2"; 40].join("+");
    group.throughput(Throughput::Bytes(long.len() as u64));
    group.bench_with_input(BenchmarkId::new("long_sum", long.len()), &long, |b, s| {
        b.iter(|| compile(black_box(s)))
    });

    group.finish();
}

// =============================================================================
// VM Execution Benchmarks
// =============================================================================

fn bench_vm_execution(c: &mut Criterion) {
    let mut group = c.benchmark_group("vm_execution");
    let (mut numbers, mut strings) = registers();

    for (name, source) in NUMERIC.iter().chain(STRINGS) {
        let code = compile(source).unwrap();
        group.bench_function(*name, |b| {
            let mut vm = Vm::new();
            b.iter(|| {
                let mut regs = Operands::new(&mut numbers, &mut strings);
                vm.evaluate(black_box(&code), &mut regs)
            })
        });
    }

    // 100 loop iterations
    let looped = compile("A:=0;UNTIL(A:=A+1;B:=B+A;A>=100)").unwrap();
    group.throughput(Throughput::Elements(100));
    group.bench_function("until_100", |b| {
        let mut vm = Vm::new();
        b.iter(|| {
            let mut regs = Operands::new(&mut numbers, &mut strings);
            vm.evaluate(black_box(&looped), &mut regs)
        })
    });

    group.finish();
}

// =============================================================================
// End-to-End Benchmarks
// =============================================================================

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("end_to_end");
    let (mut numbers, mut strings) = registers();

    group.bench_function("compile_and_evaluate", |b| {
        let mut vm = Vm::new();
        b.iter(|| {
            let code = compile(black_box("(A+B)*C>D?PRINTF('%.2f',A):'low'")).unwrap();
            vm.evaluate(&code, &mut Operands::new(&mut numbers, &mut strings))
        })
    });

    let code = compile("A>B?PRINTF('%5.1f',SQRT(A)):MAX(A,B,C)").unwrap();
    group.bench_function("disassemble", |b| b.iter(|| disassemble(black_box(&code))));

    group.finish();
}

criterion_group!(benches, bench_compiler, bench_vm_execution, bench_end_to_end);

criterion_main!(benches);
