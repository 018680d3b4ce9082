//! [`InterpretedFunction`]: the `Callable` wrapping one parsed `fun`
//! declaration — either a top-level function or (when `is_method` is
//! set, by [`crate::context::Context::functions_for`]) a struct method
//! whose first argument is always `self`, prepended by
//! [`glyph_runtime::BoundMethod`] before `call` ever sees it.

use glyph_compiler::ast::FunDecl;
use glyph_core::Trampoline;
use glyph_runtime::{Callable, Value};
use std::rc::{Rc, Weak};

use crate::context::Context;
use crate::environment::Environment;
use crate::exec::{bind_params, exec_block, ExecOutcome};

pub struct InterpretedFunction {
    decl: Rc<FunDecl>,
    ctx: Weak<Context>,
    is_method: bool,
}

impl InterpretedFunction {
    pub fn new(decl: Rc<FunDecl>, ctx: Weak<Context>) -> Self {
        InterpretedFunction { decl, ctx, is_method: false }
    }

    pub fn method(decl: Rc<FunDecl>, ctx: Weak<Context>) -> Self {
        InterpretedFunction { decl, ctx, is_method: true }
    }
}

impl Callable for InterpretedFunction {
    fn call(&self, mut args: Vec<Value>) -> Trampoline<'static, Value> {
        let decl = self.decl.clone();
        let ctx_weak = self.ctx.clone();
        let is_method = self.is_method;
        Trampoline::more(move || {
            let Some(ctx) = ctx_weak.upgrade() else {
                return Trampoline::done(Value::Void);
            };
            if ctx.has_fault() {
                return Trampoline::done(Value::Void);
            }
            let mut env = Environment::new();
            if is_method && !args.is_empty() {
                let self_value = args.remove(0);
                env.define("self", self_value);
            }
            bind_params(&decl.params, args, &mut env);
            match exec_block(&ctx, &decl.body, &mut env) {
                ExecOutcome::Returned(t) => t,
                ExecOutcome::Fallthrough | ExecOutcome::Broke | ExecOutcome::Continued => {
                    Trampoline::done(Value::Void)
                }
            }
        })
    }

    fn arity(&self) -> usize {
        self.decl.params.len()
    }

    fn name(&self) -> &str {
        &self.decl.name
    }
}
