//! Public entry point: [`Evaluator`] owns one script run's [`Context`]
//! and drives exactly one top-level trampoline per call — everything
//! beneath that single `run()` is chained via `More`/tail-call
//! propagation rather than native recursion (§4.4, §4.5).

use glyph_compiler::CheckedProgram;
use glyph_core::{ScriptError, ScriptResult};
use glyph_runtime::{Callable, Value};
use std::collections::HashMap;
use std::rc::Rc;

use crate::context::{Context, FaultCell};

pub struct Evaluator {
    ctx: Rc<Context>,
}

impl Evaluator {
    /// `injected` is the host-native global table (`log`, `getValue`, ...)
    /// built by the runner; `fault` is the cell those natives were given
    /// so a host-callback failure and an interpreter-internal fault share
    /// one propagation path.
    pub fn new(program: &CheckedProgram, injected: HashMap<String, Rc<dyn Callable>>, fault: FaultCell) -> Evaluator {
        let ctx = Context::new(program.program(), injected, fault);
        Evaluator { ctx }
    }

    /// Calls a top-level function by name (e.g. `main`), driving its
    /// trampoline to completion and converting a recorded fault into an
    /// `Err`.
    pub fn call_function(&self, name: &str, args: Vec<Value>) -> ScriptResult<Value> {
        let callable = self
            .ctx
            .globals
            .get(name)
            .cloned()
            .ok_or_else(|| ScriptError::entry_shape(format!("no such function `{name}`")))?;
        let result = callable.call(args).run();
        match self.ctx.take_fault() {
            Some(err) => Err(err),
            None => Ok(result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::new_fault_cell;
    use crate::native::NativeFunction;
    use glyph_compiler::compile;
    use num_bigint::BigInt;

    fn evaluator_for(source: &str) -> Evaluator {
        let checked = compile(source, "t.glyph").unwrap();
        Evaluator::new(&checked, HashMap::new(), new_fault_cell())
    }

    #[test]
    fn arithmetic_entry_point_evaluates() {
        let eval = evaluator_for("fun main() -> Int { return 2 + 3 * 4; }");
        assert_eq!(eval.call_function("main", vec![]).unwrap(), Value::Int(BigInt::from(14)));
    }

    #[test]
    fn struct_method_mutates_self_in_place() {
        let src = "struct Counter { n: Int fun inc() { self.n = self.n + 1; } } \
                   fun main() -> Int { let c = Counter { n: 1 }; c.inc(); c.inc(); return c.n; }";
        let eval = evaluator_for(src);
        assert_eq!(eval.call_function("main", vec![]).unwrap(), Value::Int(BigInt::from(3)));
    }

    #[test]
    fn a_structure_argument_aliases_the_caller_s_binding() {
        let src = "struct Counter { n: Int } \
                   fun bump(c: Counter) { c.n = c.n + 1; } \
                   fun main() -> Int { let c = Counter { n: 1 }; bump(c); return c.n; }";
        let eval = evaluator_for(src);
        assert_eq!(eval.call_function("main", vec![]).unwrap(), Value::Int(BigInt::from(2)));
    }

    #[test]
    fn deep_tail_recursion_does_not_blow_the_stack() {
        let src = "fun sum(n: Int, acc: Int) -> Int { if n == 0 { return acc; } return sum(n - 1, acc + n); } \
                   fun main() -> Int { return sum(50000, 0); }";
        let eval = evaluator_for(src);
        let expected: BigInt = (1..=50000u32).map(BigInt::from).sum();
        assert_eq!(eval.call_function("main", vec![]).unwrap(), Value::Int(expected));
    }

    #[test]
    fn division_by_zero_is_an_unreachable_fault_not_a_panic() {
        let eval = evaluator_for("fun main() -> Int { let z = 0; return 1 / z; }");
        assert!(matches!(eval.call_function("main", vec![]), Err(ScriptError::Unreachable(_))));
    }

    #[test]
    fn calling_a_host_native_function_returns_its_value() {
        let checked = compile(r#"fun main() -> Int { return double(21); }"#, "t.glyph").unwrap();
        let fault = new_fault_cell();
        let mut injected: HashMap<String, Rc<dyn Callable>> = HashMap::new();
        injected.insert(
            "double".to_string(),
            Rc::new(NativeFunction::new("double", 1, fault.clone(), |mut args| {
                let n = args.pop().unwrap();
                match n {
                    Value::Int(n) => Ok(Value::Int(n * 2)),
                    other => Err(ScriptError::host(format!("expected Int, got {}", other.type_name()))),
                }
            })),
        );
        let eval = Evaluator::new(&checked, injected, fault);
        assert_eq!(eval.call_function("main", vec![]).unwrap(), Value::Int(BigInt::from(42)));
    }
}
