//! [`NativeFunction`]: a `Callable` wrapping a plain Rust closure, for
//! host-native script globals (`log`, `getValue`, ...). Generalizes the
//! same shape `glyph-runtime`'s `ArrayAppend`/`DictionaryRemove` use for
//! built-in methods, but with a fallible closure and access to the
//! shared [`FaultCell`] so a host-callback failure surfaces the same way
//! an `Unreachable` fault does, rather than needing its own channel.

use glyph_core::{ScriptError, Trampoline};
use glyph_runtime::{Callable, Value};

use crate::context::FaultCell;

pub struct NativeFunction {
    name: String,
    arity: usize,
    fault: FaultCell,
    func: Box<dyn Fn(Vec<Value>) -> Result<Value, ScriptError>>,
}

impl NativeFunction {
    pub fn new(
        name: impl Into<String>,
        arity: usize,
        fault: FaultCell,
        func: impl Fn(Vec<Value>) -> Result<Value, ScriptError> + 'static,
    ) -> Self {
        NativeFunction { name: name.into(), arity, fault, func: Box::new(func) }
    }
}

impl Callable for NativeFunction {
    fn call(&self, args: Vec<Value>) -> Trampoline<'static, Value> {
        let value = match (self.func)(args) {
            Ok(v) => v,
            Err(e) => {
                let mut slot = self.fault.borrow_mut();
                if slot.is_none() {
                    *slot = Some(e);
                }
                Value::Void
            }
        };
        Trampoline::done(value)
    }

    fn arity(&self) -> usize {
        self.arity
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::new_fault_cell;

    #[test]
    fn native_function_records_host_error_into_the_fault_cell() {
        let fault = new_fault_cell();
        let f = NativeFunction::new("boom", 0, fault.clone(), |_| Err(ScriptError::host("no network")));
        let result = f.call(vec![]).run();
        assert_eq!(result, Value::Void);
        assert!(fault.borrow().is_some());
    }

    #[test]
    fn native_function_passes_through_a_successful_result() {
        let fault = new_fault_cell();
        let f = NativeFunction::new("double", 1, fault, |mut args| {
            let arg = args.pop().unwrap();
            Ok(match arg {
                Value::Int64(n) => Value::Int64(n * 2),
                other => other,
            })
        });
        assert_eq!(f.call(vec![Value::Int64(21)]).run(), Value::Int64(42));
    }
}
