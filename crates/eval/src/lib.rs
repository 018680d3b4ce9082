//! Tree-walking evaluator for the embedded script language (§4.5).
//!
//! Takes a [`glyph_compiler::CheckedProgram`] and a host-native global
//! table and runs it. Trampoline discipline (§4.4) keeps a tail-recursive
//! script's stack usage flat regardless of call depth; see
//! [`exec::eval_tail`] for where that discipline is applied and
//! [`Evaluator::call_function`] for the one place a trampoline is driven
//! per top-level call.

pub mod context;
pub mod environment;
pub mod evaluator;
pub mod exec;
pub mod interpreted;
pub mod native;

pub use context::{new_fault_cell, Context, FaultCell};
pub use environment::Environment;
pub use evaluator::Evaluator;
pub use interpreted::InterpretedFunction;
pub use native::NativeFunction;
