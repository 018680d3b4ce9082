//! The entry contract (§6): `main`'s arity must equal the signing-account
//! count and every parameter must be the built-in `Account` type.

use glyph_compiler::ast::TypeRef;
use glyph_compiler::CheckedProgram;
use glyph_core::ScriptError;

pub fn check_entry_shape(checked: &CheckedProgram, account_count: usize) -> Result<(), ScriptError> {
    let program = checked.program();
    let main_fn = program
        .functions
        .iter()
        .find(|f| f.name == "main")
        .ok_or_else(|| ScriptError::entry_shape("script has no `main` function"))?;

    if main_fn.params.len() != account_count {
        return Err(ScriptError::entry_shape(format!(
            "main takes {} parameter(s) but {account_count} signing account(s) were supplied",
            main_fn.params.len()
        )));
    }
    for param in &main_fn.params {
        match &param.type_ref {
            TypeRef::Named(name) if name == "Account" => {}
            other => {
                return Err(ScriptError::entry_shape(format!(
                    "main's parameter `{}` must be Account, got {other:?}",
                    param.name
                )))
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyph_compiler::compile;

    #[test]
    fn arity_must_match_the_signing_account_count() {
        let checked = compile("fun main(a: Account) { }", "t.glyph").unwrap();
        assert!(check_entry_shape(&checked, 0).is_err());
        assert!(check_entry_shape(&checked, 1).is_ok());
    }

    #[test]
    fn every_parameter_must_be_account_typed() {
        let checked = compile("fun main(a: Account, n: Int) { }", "t.glyph").unwrap();
        assert!(check_entry_shape(&checked, 2).is_err());
    }

    #[test]
    fn a_zero_account_script_needs_no_main_parameters() {
        let checked = compile("fun main() -> Int { return 1; }", "t.glyph").unwrap();
        assert!(check_entry_shape(&checked, 0).is_ok());
    }

    #[test]
    fn a_missing_main_function_is_rejected() {
        let checked = compile("fun helper() -> Int { return 1; }", "t.glyph").unwrap();
        assert!(check_entry_shape(&checked, 0).is_err());
    }
}
