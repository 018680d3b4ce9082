//! Glyph Core: the error type and trampoline discipline shared by every
//! other crate in this workspace.
//!
//! - `error`: the single `ScriptError` enum every layer raises into.
//! - `source`: source locations used for diagnostics.
//! - `trampoline`: the `Done | More | FlatMap` suspension primitive that
//!   lets the evaluator walk arbitrarily deep scripts without growing the
//!   native call stack.

pub mod error;
pub mod source;
pub mod trampoline;

pub use error::{Diagnostic, ScriptError, ScriptResult};
pub use source::SourceLocation;
pub use trampoline::Trampoline;
