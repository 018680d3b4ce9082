//! The seam between the Value domain and the evaluator's function
//! representation.
//!
//! The runtime crate has no notion of an AST or an environment — both
//! live in `glyph-compiler` and `glyph-eval` respectively — so a callable
//! is just "something that takes argument values and eventually produces
//! a value". `glyph-eval` supplies the concrete implementations (one for
//! host-native wrappers like `log`/`getValue`, one for interpreted
//! function bodies); this crate only needs the trait object.

use crate::value::Value;
use glyph_core::Trampoline;
use std::fmt;
use std::rc::Rc;

/// Something callable with a fixed arity, returning a trampoline that
/// resolves to the call's result value.
///
/// A function activation's internal control-flow states (`Active`,
/// `Returning`, `Breaking`, `Continuing`) never escape the function
/// boundary — the checker rejects a `break`/`continue` outside a loop and
/// a dangling `return` is just the function's result — so `call` always
/// bottoms out in a plain `Value`.
pub trait Callable {
    fn call(&self, args: Vec<Value>) -> Trampoline<'static, Value>;
    fn arity(&self) -> usize;
    /// A name used in diagnostics; not necessarily unique.
    fn name(&self) -> &str;
}

impl fmt::Debug for dyn Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<function {} /{}>", self.name(), self.arity())
    }
}

/// A structure method with `self` already bound.
///
/// Produced by [`crate::value::StructureData::get_member`] the first time
/// a method is looked up; `self` is always the structure's own shared
/// handle so mutations the method makes through it are visible to every
/// other binding of the same structure, per the aliasing rule in §3.2 of
/// the specification.
pub struct BoundMethod {
    pub self_value: Value,
    pub func: Rc<dyn Callable>,
}

impl Callable for BoundMethod {
    fn call(&self, mut args: Vec<Value>) -> Trampoline<'static, Value> {
        args.insert(0, self.self_value.clone());
        self.func.call(args)
    }

    fn arity(&self) -> usize {
        self.func.arity().saturating_sub(1)
    }

    fn name(&self) -> &str {
        self.func.name()
    }
}

/// Resolves a structure's function table by its type identifier.
///
/// Implemented by `glyph-eval`'s `Evaluator`, which owns the program-wide
/// table of structure method implementations for the lifetime of one
/// script run (reinitialized per run, so nothing leaks across scripts).
pub trait FunctionRegistry {
    fn functions_for(&self, struct_identifier: &str) -> Option<Rc<StructFunctionTable>>;
}

/// Method-name -> unbound implementation, for one structure type.
#[derive(Default)]
pub struct StructFunctionTable {
    methods: std::collections::HashMap<String, Rc<dyn Callable>>,
}

impl StructFunctionTable {
    pub fn new(methods: std::collections::HashMap<String, Rc<dyn Callable>>) -> Self {
        StructFunctionTable { methods }
    }

    pub fn get(&self, name: &str) -> Option<Rc<dyn Callable>> {
        self.methods.get(name).cloned()
    }
}
