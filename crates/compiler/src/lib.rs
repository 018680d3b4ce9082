//! Lexer, recursive-descent parser, and single-pass type-checker for the
//! embedded script language (§4.6). Produces a [`typechecker::CheckedProgram`]
//! the evaluator crate walks; has no notion of a runtime `Value` or an
//! environment — those live in `glyph-runtime` and `glyph-eval`.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod typechecker;
pub mod types;

pub use parser::parse;
pub use typechecker::{check_program, CheckedProgram};

use glyph_core::ScriptError;
use std::path::Path;

/// Parses and checks one source file, returning the checked AST or every
/// diagnostic found across both phases that fired first (parsing aborts
/// before checking begins, per §7's propagation rule).
pub fn compile(source: &str, file: impl AsRef<Path>) -> Result<CheckedProgram, ScriptError> {
    let program = parser::parse(source, file)?;
    typechecker::check_program(program)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_the_arithmetic_scenario() {
        let checked = compile("fun main() -> Int { return 2 + 3 * 4; }", "s1.glyph").unwrap();
        assert_eq!(checked.program().functions.len(), 1);
    }

    #[test]
    fn parse_errors_short_circuit_before_checking() {
        assert!(matches!(compile("fun main( { }", "bad.glyph"), Err(ScriptError::Parse(_))));
    }
}
