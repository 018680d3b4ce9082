//! End-to-end scenarios (§8): each drives the library pieces the same
//! way `glyphc run` does, against an in-memory host instead of the
//! filesystem-backed one.

use std::rc::Rc;

use glyph_cli::entry::check_entry_shape;
use glyph_cli::host::TestHost;
use glyph_cli::{natives, storage};
use glyph_compiler::compile;
use glyph_eval::{new_fault_cell, Evaluator};
use glyph_runtime::{bridge::to_host, HostValue, Value};
use num_bigint::BigInt;

fn run_script(source: &str, account_addresses: &[Vec<u8>]) -> (Result<Value, glyph_core::ScriptError>, Rc<TestHost>) {
    let checked = compile(source, "scenario.glyph").unwrap();
    check_entry_shape(&checked, account_addresses.len()).unwrap();

    let host = Rc::new(TestHost::new(account_addresses.to_vec()));
    let fault = new_fault_cell();
    let injected = natives::build(host.clone(), fault.clone());
    let evaluator = Evaluator::new(&checked, injected, fault);

    let args: Vec<Value> = account_addresses
        .iter()
        .map(|addr| storage::load_account(host.as_ref(), addr).unwrap())
        .collect();

    let result = evaluator.call_function("main", args.clone());
    if result.is_ok() {
        for (addr, account) in account_addresses.iter().zip(args.iter()) {
            storage::save_account(host.as_ref(), addr, account).unwrap();
        }
    }
    (result, host)
}

#[test]
fn s1_arithmetic() {
    let (result, _) = run_script("fun main() -> Int { return 2 + 3 * 4; }", &[]);
    assert_eq!(to_host(&result.unwrap()).unwrap(), HostValue::Int(BigInt::from(14)));
}

#[test]
fn s2_string_length_counts_grapheme_clusters() {
    let (result, _) = run_script(r#"fun main() -> Int { return "🇺🇸".length; }"#, &[]);
    assert_eq!(result.unwrap(), Value::Int(BigInt::from(1)));
}

#[test]
fn s3_storage_round_trips_across_runs() {
    let account = vec![0xAA];

    let first_run = r#"
        fun main(a: Account) {
            a.storage["k"] = 7;
        }
    "#;
    let (first, host) = run_script(first_run, &[account.clone()]);
    assert_eq!(first.unwrap(), Value::Void);

    let second_run = r#"
        fun main(a: Account) -> Int {
            return a.storage["k"];
        }
    "#;
    assert_eq!(run_against(&host, second_run, &account), Value::Int(BigInt::from(7)));
}

/// Runs `source`'s `main(a: Account)` once against an already-existing
/// host, so a struct stored by one invocation is visible to the next.
fn run_against(host: &Rc<TestHost>, source: &str, account: &[u8]) -> Value {
    let checked = compile(source, "scenario.glyph").unwrap();
    check_entry_shape(&checked, 1).unwrap();
    let fault = new_fault_cell();
    let injected = natives::build(host.clone(), fault.clone());
    let evaluator = Evaluator::new(&checked, injected, fault);
    let args = vec![storage::load_account(host.as_ref(), account).unwrap()];
    let result = evaluator.call_function("main", args.clone()).unwrap();
    storage::save_account(host.as_ref(), account, &args[0]).unwrap();
    result
}

#[test]
fn s4_structure_persists_across_three_runs() {
    let account = vec![0xBB];
    let host = Rc::new(TestHost::new(vec![account.clone()]));

    let counter_struct = "struct Counter { n: Int fun inc() { self.n = self.n + 1; } }";

    let seed = format!(
        r#"{counter_struct}
        fun main(a: Account) -> Int {{
            let c = Counter {{ n: 1 }};
            a.storage["counter"] = c;
            return c.n;
        }}"#
    );
    let increment_twice = format!(
        r#"{counter_struct}
        fun main(a: Account) -> Int {{
            let c = a.storage["counter"];
            c.inc();
            c.inc();
            a.storage["counter"] = c;
            return c.n;
        }}"#
    );
    let read_only = format!(
        r#"{counter_struct}
        fun main(a: Account) -> Int {{
            let c = a.storage["counter"];
            return c.n;
        }}"#
    );

    assert_eq!(run_against(&host, &seed, &account), Value::Int(BigInt::from(1)));
    assert_eq!(run_against(&host, &increment_twice, &account), Value::Int(BigInt::from(3)));
    assert_eq!(run_against(&host, &read_only, &account), Value::Int(BigInt::from(3)));
}

#[test]
fn s5_log_produces_exactly_one_call() {
    let (result, host) = run_script(r#"fun main() { log("hello"); }"#, &[]);
    assert_eq!(result.unwrap(), Value::Void);
    assert_eq!(&*host.logs.borrow(), &["hello".to_string()]);
}

#[test]
fn s6_deep_tail_recursion_does_not_overflow_the_host_stack() {
    let source = r#"
        fun sum(n: Int, acc: Int) -> Int {
            if n == 0 { return acc; }
            return sum(n - 1, acc + n);
        }
        fun main() -> Int { return sum(50000, 0); }
    "#;
    let (result, _) = run_script(source, &[]);
    let expected: BigInt = (1..=50000u32).map(BigInt::from).sum();
    assert_eq!(result.unwrap(), Value::Int(expected));
}
