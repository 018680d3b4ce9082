//! Lexical environment: a stack of scope frames mapping names to values.
//!
//! Mirrors the shape of the checker's own `Scope` (a `Vec<HashMap<...>>`)
//! but holds `Value`s rather than static `Type`s, and has no notion of
//! mutability — the checker already rejected assignment to a `let`
//! binding, so the evaluator can assign blindly.

use glyph_runtime::Value;
use std::collections::HashMap;

pub struct Environment {
    frames: Vec<HashMap<String, Value>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment { frames: vec![HashMap::new()] }
    }

    pub fn push_scope(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        self.frames.pop();
        debug_assert!(!self.frames.is_empty(), "popped the function's outermost frame");
    }

    /// Binds a new name in the innermost frame. `let`/`var`/parameter
    /// binding all go through here, each having already called
    /// `Value::copy()` at the seam before reaching this method.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.frames
            .last_mut()
            .expect("environment always has at least one frame")
            .insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.frames.iter().rev().find_map(|frame| frame.get(name).cloned())
    }

    /// Rebinds an existing name in whichever frame currently holds it.
    /// Returns `false` if the name is not bound anywhere on the stack —
    /// unreachable for a checked program, since the checker already
    /// confirmed the target exists before accepting the assignment.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        for frame in self.frames.iter_mut().rev() {
            if let Some(slot) = frame.get_mut(name) {
                *slot = value;
                return true;
            }
        }
        false
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_updates_the_frame_that_declared_the_name() {
        let mut env = Environment::new();
        env.define("x", Value::Bool(true));
        env.push_scope();
        env.define("y", Value::Bool(false));
        assert!(env.assign("x", Value::Bool(false)));
        env.pop_scope();
        assert_eq!(env.get("x"), Some(Value::Bool(false)));
        assert_eq!(env.get("y"), None);
    }

    #[test]
    fn shadowing_in_an_inner_scope_does_not_leak_out() {
        let mut env = Environment::new();
        env.define("x", Value::Bool(true));
        env.push_scope();
        env.define("x", Value::Bool(false));
        assert_eq!(env.get("x"), Some(Value::Bool(false)));
        env.pop_scope();
        assert_eq!(env.get("x"), Some(Value::Bool(true)));
    }
}
