//! Integration tests for the VM
//!
//! Tests evaluation of compiled expressions against caller-owned registers.

use std::collections::BTreeMap;

use scalc_foundation::{EvalConfig, EvalErrorKind, FixedString};
use scalc_language::{Operands, Registers, Vm, compile, eval};

// =============================================================================
// Record-Style Expressions
// =============================================================================

#[test]
fn calc_record_average() {
    let mut numbers = [3.0, 5.0];
    let mut regs = Operands::new(&mut numbers, &mut []);
    let out = eval("(A+B)/2", &mut regs).unwrap();
    assert_eq!(out.number, 4.0);
    assert_eq!(out.text, "4");
}

#[test]
fn threshold_alarm() {
    let mut numbers = [12.5, 10.0];
    let mut regs = Operands::new(&mut numbers, &mut []);
    let out = eval("A>B?PRINTF('HIGH %.1f',A):'ok'", &mut regs).unwrap();
    assert_eq!(out.text, "HIGH 12.5");
}

#[test]
fn parse_instrument_reply() {
    let mut strings = [FixedString::from("T=23.75C;P=1013")];
    let mut regs = Operands::new(&mut [], &mut strings);
    assert_eq!(eval("DBL(AA['T=',';'])", &mut regs).unwrap().number, 23.75);
    assert_eq!(eval("SSCANF(AA,'T=%lf')", &mut regs).unwrap().number, 23.75);
}

#[test]
fn same_bytecode_runs_repeatedly() {
    let code = compile("A:=A+1;A").unwrap();
    let mut numbers = [0.0];
    let mut vm = Vm::new();
    for expected in 1..=5 {
        let out = vm
            .evaluate(&code, &mut Operands::new(&mut numbers, &mut []))
            .unwrap();
        assert_eq!(out.number, f64::from(expected));
    }
    assert_eq!(vm.stats().evaluations, 5);
}

#[test]
fn previous_result_chains_evaluations() {
    let mut vm = Vm::new();
    let code = compile("VAL*2").unwrap();
    let mut val = 1.0;
    let (mut numbers, mut strings) = ([0.0; 1], [FixedString::new(); 1]);
    for _ in 0..4 {
        let mut regs =
            Operands::new(&mut numbers, &mut strings).with_previous(val, FixedString::new());
        val = vm.evaluate(&code, &mut regs).unwrap().number;
    }
    assert_eq!(val, 16.0);
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn loop_budget_comes_from_config() {
    let code = compile("UNTIL(A:=A+1;A>=50)").unwrap();

    let mut numbers = [0.0];
    let mut vm = Vm::with_config(EvalConfig::new().with_loop_max(10));
    let err = vm
        .evaluate(&code, &mut Operands::new(&mut numbers, &mut []))
        .unwrap_err();
    assert_eq!(err.eval_kind(), Some(&EvalErrorKind::LoopLimit { limit: 10 }));

    let mut numbers = [0.0];
    vm.set_config(EvalConfig::new().with_loop_max(100));
    assert!(
        vm.evaluate(&code, &mut Operands::new(&mut numbers, &mut []))
            .is_ok()
    );
    assert_eq!(numbers[0], 50.0);
}

#[test]
fn seeded_random_is_reproducible() {
    let code = compile("RNDM+NRNDM").unwrap();
    let draw = |seed| {
        Vm::with_config(EvalConfig::new().with_seed(seed))
            .evaluate(&code, &mut Operands::new(&mut [], &mut []))
            .unwrap()
            .number
    };
    assert_eq!(draw(11), draw(11));
    assert_ne!(draw(11), draw(12));
}

// =============================================================================
// Custom Register Storage
// =============================================================================

/// Sparse registers that log every write.
#[derive(Default)]
struct Sparse {
    numbers: BTreeMap<usize, f64>,
    strings: BTreeMap<usize, FixedString>,
    writes: Vec<usize>,
}

impl Registers for Sparse {
    fn numeric(&self, index: usize) -> Option<f64> {
        Some(self.numbers.get(&index).copied().unwrap_or_default())
    }

    fn set_numeric(&mut self, index: usize, value: f64) -> bool {
        self.writes.push(index);
        self.numbers.insert(index, value);
        true
    }

    fn string(&self, index: usize) -> Option<FixedString> {
        Some(self.strings.get(&index).copied().unwrap_or_default())
    }

    fn set_string(&mut self, index: usize, value: FixedString) -> bool {
        self.strings.insert(index, value);
        true
    }
}

#[test]
fn evaluates_against_custom_storage() {
    let mut regs = Sparse::default();
    regs.numbers.insert(15, 2.0);

    let out = eval("C:=P*3;E:=C+1;LL:='n='+STR(E);LL", &mut regs).unwrap();
    assert_eq!(out.text, "n=7");
    assert_eq!(regs.writes, vec![2, 4]);
    assert_eq!(regs.numbers[&4], 7.0);
}

#[test]
fn trait_objects_work() {
    let mut numbers = [9.0];
    let mut strings: [FixedString; 0] = [];
    let mut ops = Operands::new(&mut numbers, &mut strings);
    let regs: &mut dyn Registers = &mut ops;
    assert_eq!(eval("SQRT(A)", regs).unwrap().number, 3.0);
}
