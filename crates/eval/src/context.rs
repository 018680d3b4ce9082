//! The shared, `Rc`-held state one script run's worth of function
//! activations all see: the global function table, each struct's
//! declared methods, a lazily-built method-table cache for the
//! `FunctionRegistry` seam, and a single fault cell.
//!
//! `Callable::call` (the seam defined in `glyph-runtime`) has no `Result`
//! in its return type — host-native callables never fail in a way the
//! language needs to see, and giving the trait an error channel just for
//! the interpreted case would leak evaluator concerns into the runtime
//! crate. So an `Unreachable`/host fault is recorded here the first time
//! it occurs (first write wins) and the value `Value::Void` stands in for
//! the rest of that evaluation; [`Context::take_fault`] is checked once,
//! by the one caller that drives the top-level trampoline to completion.

use glyph_compiler::ast::{Program, StructDecl};
use glyph_core::ScriptError;
use glyph_runtime::{Callable, FunctionRegistry, StructFunctionTable};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::interpreted::InterpretedFunction;

/// A fault slot shared between the `Context` and every host-native
/// [`crate::native::NativeFunction`], created before either exists — the
/// natives are built by the runner ahead of the `Context` they end up
/// registered into, so the cell can't live *inside* `Context` itself
/// without a chicken-and-egg construction order.
pub type FaultCell = Rc<RefCell<Option<ScriptError>>>;

pub fn new_fault_cell() -> FaultCell {
    Rc::new(RefCell::new(None))
}

pub struct Context {
    pub globals: HashMap<String, Rc<dyn Callable>>,
    struct_decls: HashMap<String, Rc<StructDecl>>,
    method_tables: RefCell<HashMap<String, Rc<StructFunctionTable>>>,
    fault: FaultCell,
    self_handle: Weak<Context>,
}

impl Context {
    /// Builds the shared context for one script run: the program's own
    /// top-level functions (wrapped as [`InterpretedFunction`]s) merged
    /// with the host-injected globals, plus the struct declarations
    /// needed to lazily build method tables.
    pub fn new(program: &Program, injected: HashMap<String, Rc<dyn Callable>>, fault: FaultCell) -> Rc<Context> {
        let struct_decls = program
            .structs
            .iter()
            .map(|s| (s.name.clone(), Rc::new(s.clone())))
            .collect();

        Rc::new_cyclic(|self_handle| {
            let mut globals = injected;
            for decl in &program.functions {
                let func = InterpretedFunction::new(Rc::new(decl.clone()), self_handle.clone());
                globals.insert(decl.name.clone(), Rc::new(func) as Rc<dyn Callable>);
            }
            Context {
                globals,
                struct_decls,
                method_tables: RefCell::new(HashMap::new()),
                fault,
                self_handle: self_handle.clone(),
            }
        })
    }

    fn handle(&self) -> Rc<Context> {
        self.self_handle.upgrade().expect("context outlives its own functions")
    }

    /// Records the first fault seen during an evaluation and returns the
    /// dummy value callers should keep propagating.
    pub fn fault(&self, err: ScriptError) -> glyph_runtime::Value {
        let mut slot = self.fault.borrow_mut();
        if slot.is_none() {
            *slot = Some(err);
        }
        glyph_runtime::Value::Void
    }

    pub fn has_fault(&self) -> bool {
        self.fault.borrow().is_some()
    }

    pub fn take_fault(&self) -> Option<ScriptError> {
        self.fault.borrow_mut().take()
    }
}

impl FunctionRegistry for Context {
    fn functions_for(&self, struct_identifier: &str) -> Option<Rc<StructFunctionTable>> {
        if let Some(existing) = self.method_tables.borrow().get(struct_identifier) {
            return Some(existing.clone());
        }
        let decl = self.struct_decls.get(struct_identifier)?;
        let methods = decl
            .methods
            .iter()
            .map(|method| {
                let func = InterpretedFunction::method(Rc::new(method.clone()), Rc::downgrade(&self.handle()));
                (method.name.clone(), Rc::new(func) as Rc<dyn Callable>)
            })
            .collect::<HashMap<_, _>>();
        let table = Rc::new(StructFunctionTable::new(methods));
        self.method_tables
            .borrow_mut()
            .insert(struct_identifier.to_string(), table.clone());
        Some(table)
    }
}
