//! Statement and expression evaluation (§4.5).
//!
//! Every *non-tail* expression is evaluated eagerly — native Rust
//! recursion bounded by source-text nesting, which is never the thing
//! that needs unbounded depth. The one place recursion depth is
//! data-dependent, not source-dependent, is a tail call in a `return`
//! statement's expression: [`eval_tail`] is the only place that returns
//! an un-driven `Trampoline`, so a chain of tail calls flattens into the
//! single top-level `run()` loop instead of nesting a native stack frame
//! per call. See [`crate::interpreted::InterpretedFunction::call`] for
//! where that trampoline is finally driven.

use glyph_compiler::ast::{BinaryOp, Block, ElseBranch, Expr, Param, Statement, UnaryOp};
use glyph_core::{ScriptError, SourceLocation, Trampoline};
use glyph_runtime::{get_member, index_get, index_get_storage, index_set, set_member, Value};
use glyph_runtime::{integer, StructureData};
use std::collections::HashMap;
use std::rc::Rc;

use crate::context::Context;
use crate::environment::Environment;

/// How a block or statement finished: fell through to the next one, is
/// unwinding a `return` (carrying the function's eventual result as an
/// un-driven trampoline), or is unwinding a loop-local `break`/`continue`.
pub enum ExecOutcome {
    Fallthrough,
    Returned(Trampoline<'static, Value>),
    Broke,
    Continued,
}

/// Binds each parameter to the argument value itself, not a copy — the
/// same aliasing `self` already gets in [`crate::interpreted`]. A script
/// call's arguments are evaluated (and, for a literal compound value,
/// already copied at whatever `let`/assignment/struct-literal seam
/// produced them) before this ever runs; re-copying here would sever the
/// very aliasing the entry contract depends on (a signing account's
/// `Account` argument must be the same handle the runner re-encodes
/// after `main` returns, so a script's mutation through it is observed).
pub fn bind_params(params: &[Param], mut args: Vec<Value>, env: &mut Environment) {
    for (param, arg) in params.iter().zip(args.drain(..)) {
        env.define(param.name.clone(), arg);
    }
}

pub fn exec_block(ctx: &Context, block: &Block, env: &mut Environment) -> ExecOutcome {
    env.push_scope();
    let mut outcome = ExecOutcome::Fallthrough;
    for statement in &block.statements {
        outcome = exec_statement(ctx, statement, env);
        if !matches!(outcome, ExecOutcome::Fallthrough) || ctx.has_fault() {
            break;
        }
    }
    env.pop_scope();
    outcome
}

pub fn exec_statement(ctx: &Context, statement: &Statement, env: &mut Environment) -> ExecOutcome {
    match statement {
        Statement::Let { name, value, .. } | Statement::Var { name, value, .. } => {
            let v = eval_expr(ctx, value, env);
            env.define(name.clone(), v.copy());
            ExecOutcome::Fallthrough
        }
        Statement::Assign { target, value, location } => {
            let v = eval_expr(ctx, value, env);
            exec_assign(ctx, target, v, location, env);
            ExecOutcome::Fallthrough
        }
        Statement::If { condition, then_block, else_branch, location } => {
            match eval_bool(ctx, condition, env, location) {
                true => exec_block(ctx, then_block, env),
                false => match else_branch {
                    Some(ElseBranch::Block(block)) => exec_block(ctx, block, env),
                    Some(ElseBranch::If(stmt)) => exec_statement(ctx, stmt, env),
                    None => ExecOutcome::Fallthrough,
                },
            }
        }
        Statement::While { condition, body, location } => {
            loop {
                if ctx.has_fault() {
                    break;
                }
                if !eval_bool(ctx, condition, env, location) {
                    break;
                }
                match exec_block(ctx, body, env) {
                    ExecOutcome::Fallthrough | ExecOutcome::Continued => continue,
                    ExecOutcome::Broke => break,
                    returned @ ExecOutcome::Returned(_) => return returned,
                }
            }
            ExecOutcome::Fallthrough
        }
        Statement::Return { value, .. } => match value {
            Some(expr) => ExecOutcome::Returned(eval_tail(ctx, expr, env)),
            None => ExecOutcome::Returned(Trampoline::done(Value::Void)),
        },
        Statement::Break { .. } => ExecOutcome::Broke,
        Statement::Continue { .. } => ExecOutcome::Continued,
        Statement::Expr { expr, .. } => {
            eval_expr(ctx, expr, env);
            ExecOutcome::Fallthrough
        }
    }
}

fn eval_bool(ctx: &Context, expr: &Expr, env: &mut Environment, location: &SourceLocation) -> bool {
    match eval_expr(ctx, expr, env) {
        Value::Bool(b) => b,
        other => {
            ctx.fault(ScriptError::unreachable(
                format!("condition must be Bool, got {}", other.type_name()),
                location.clone(),
            ));
            false
        }
    }
}

fn exec_assign(ctx: &Context, target: &Expr, value: Value, location: &SourceLocation, env: &mut Environment) {
    match target {
        Expr::Identifier { name, .. } => {
            env.assign(name, value.copy());
        }
        Expr::Member { target, name, .. } => {
            let target_val = eval_expr(ctx, target, env);
            if let Err(e) = set_member(&target_val, name, value) {
                ctx.fault(ScriptError::unreachable(e.to_string(), location.clone()));
            }
        }
        Expr::Index { target, index, .. } => {
            let target_val = eval_expr(ctx, target, env);
            let index_val = eval_expr(ctx, index, env);
            if let Err(e) = index_set(&target_val, &index_val, value) {
                ctx.fault(ScriptError::unreachable(e.to_string(), location.clone()));
            }
        }
        _ => {
            ctx.fault(ScriptError::unreachable("invalid assignment target", location.clone()));
        }
    }
}

/// Evaluates every expression eagerly except a `Call` directly in tail
/// position, which is returned un-driven so the caller (a `return`
/// statement) can propagate it up to the enclosing function activation.
pub fn eval_tail(ctx: &Context, expr: &Expr, env: &mut Environment) -> Trampoline<'static, Value> {
    if let Expr::Call { callee, args, location } = expr {
        return match resolve_callable(ctx, callee, env) {
            Some(callable) => {
                let argv = eval_args(ctx, args, env);
                callable.call(argv)
            }
            None => Trampoline::done(ctx.fault(ScriptError::unreachable(
                "call target is not callable",
                location.clone(),
            ))),
        };
    }
    Trampoline::done(eval_expr(ctx, expr, env))
}

pub fn eval_expr(ctx: &Context, expr: &Expr, env: &mut Environment) -> Value {
    match expr {
        Expr::IntLiteral { value, .. } => Value::Int(value.clone()),
        Expr::StringLiteral { value, .. } => Value::String(value.clone()),
        Expr::BoolLiteral { value, .. } => Value::Bool(*value),
        Expr::NilLiteral { .. } => Value::Nil,
        Expr::Identifier { name, location } => env.get(name).unwrap_or_else(|| {
            ctx.fault(ScriptError::unreachable(format!("undefined identifier `{name}`"), location.clone()))
        }),
        Expr::Unary { op, operand, location } => {
            let v = eval_expr(ctx, operand, env);
            match op {
                UnaryOp::Neg => integer::neg(&v)
                    .unwrap_or_else(|e| ctx.fault(ScriptError::unreachable(e.to_string(), location.clone()))),
                UnaryOp::Not => match v {
                    Value::Bool(b) => Value::Bool(!b),
                    other => ctx.fault(ScriptError::unreachable(
                        format!("`!` requires Bool, got {}", other.type_name()),
                        location.clone(),
                    )),
                },
            }
        }
        Expr::Binary { op, left, right, location } => eval_binary(ctx, *op, left, right, location, env),
        Expr::Call { callee, args, location } => match resolve_callable(ctx, callee, env) {
            Some(callable) => {
                let argv = eval_args(ctx, args, env);
                callable.call(argv).run()
            }
            None => ctx.fault(ScriptError::unreachable("call target is not callable", location.clone())),
        },
        Expr::Member { target, name, location } => {
            let target_val = eval_expr(ctx, target, env);
            get_member(&target_val, name, ctx)
                .unwrap_or_else(|e| ctx.fault(ScriptError::unreachable(e.to_string(), location.clone())))
        }
        Expr::Index { target, index, location } => {
            let target_val = eval_expr(ctx, target, env);
            let index_val = eval_expr(ctx, index, env);
            let result = if is_storage_access(target) {
                index_get_storage(&target_val, &index_val)
            } else {
                index_get(&target_val, &index_val)
            };
            result.unwrap_or_else(|e| ctx.fault(ScriptError::unreachable(e.to_string(), location.clone())))
        }
        Expr::StructLiteral { name, fields, .. } => {
            let mut field_values = HashMap::new();
            for (field_name, field_expr) in fields {
                let v = eval_expr(ctx, field_expr, env);
                field_values.insert(field_name.clone(), v.copy());
            }
            Value::structure(StructureData::new(name.clone(), field_values))
        }
    }
}

/// `account.storage[key]` reads the host's key-value store directly
/// rather than Option-wrapping like a scripting-level `Dictionary<T>`
/// read would (§6's persistence layout; see `index_get_storage`).
/// Recognized syntactically: only `Account.storage` is ever typed as a
/// `Dictionary<Dynamic>` (§4.6), so an index whose target is a `.storage`
/// member access is unambiguously this case.
fn is_storage_access(target: &Expr) -> bool {
    matches!(target, Expr::Member { name, .. } if name == "storage")
}

fn eval_args(ctx: &Context, args: &[Expr], env: &mut Environment) -> Vec<Value> {
    args.iter().map(|a| eval_expr(ctx, a, env)).collect()
}

/// Resolves a call's callee to the `Callable` it names: a global function
/// for a bare identifier, or a bound method / built-in (`append`,
/// `remove`) for a member access. Any other callee shape was already
/// rejected by the checker.
fn resolve_callable(ctx: &Context, callee: &Expr, env: &mut Environment) -> Option<Rc<dyn glyph_runtime::Callable>> {
    match callee {
        Expr::Identifier { name, .. } => ctx.globals.get(name).cloned(),
        Expr::Member { target, name, .. } => {
            let target_val = eval_expr(ctx, target, env);
            match get_member(&target_val, name, ctx) {
                Ok(Value::Function(f)) => Some(f),
                _ => None,
            }
        }
        _ => None,
    }
}

fn eval_binary(ctx: &Context, op: BinaryOp, left: &Expr, right: &Expr, location: &SourceLocation, env: &mut Environment) -> Value {
    match op {
        BinaryOp::And => match eval_expr(ctx, left, env) {
            Value::Bool(false) => Value::Bool(false),
            Value::Bool(true) => eval_expr(ctx, right, env),
            other => ctx.fault(ScriptError::unreachable(
                format!("`&&` requires Bool, got {}", other.type_name()),
                location.clone(),
            )),
        },
        BinaryOp::Or => match eval_expr(ctx, left, env) {
            Value::Bool(true) => Value::Bool(true),
            Value::Bool(false) => eval_expr(ctx, right, env),
            other => ctx.fault(ScriptError::unreachable(
                format!("`||` requires Bool, got {}", other.type_name()),
                location.clone(),
            )),
        },
        _ => {
            let l = eval_expr(ctx, left, env);
            let r = eval_expr(ctx, right, env);
            match op {
                BinaryOp::Add => int_result(ctx, integer::add(&l, &r), location),
                BinaryOp::Sub => int_result(ctx, integer::sub(&l, &r), location),
                BinaryOp::Mul => int_result(ctx, integer::mul(&l, &r), location),
                BinaryOp::Div => int_result(ctx, integer::div(&l, &r), location),
                BinaryOp::Mod => int_result(ctx, integer::rem(&l, &r), location),
                BinaryOp::Lt => bool_result(ctx, integer::lt(&l, &r), location),
                BinaryOp::Le => bool_result(ctx, integer::le(&l, &r), location),
                BinaryOp::Gt => bool_result(ctx, integer::gt(&l, &r), location),
                BinaryOp::Ge => bool_result(ctx, integer::ge(&l, &r), location),
                BinaryOp::Eq => Value::Bool(l == r),
                BinaryOp::Ne => Value::Bool(l != r),
                BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
            }
        }
    }
}

fn int_result(ctx: &Context, result: Result<Value, integer::IntegerFault>, location: &SourceLocation) -> Value {
    result.unwrap_or_else(|e| ctx.fault(ScriptError::unreachable(e.to_string(), location.clone())))
}

fn bool_result(ctx: &Context, result: Result<bool, integer::IntegerFault>, location: &SourceLocation) -> Value {
    match result {
        Ok(b) => Value::Bool(b),
        Err(e) => ctx.fault(ScriptError::unreachable(e.to_string(), location.clone())),
    }
}
