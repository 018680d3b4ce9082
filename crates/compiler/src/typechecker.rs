//! Single-pass type-checker/resolver (§4.6).
//!
//! Registers every struct and function signature first, then checks each
//! body. Every failure found is collected into one `ScriptError::Check`
//! rather than aborting on the first — when an expression fails to
//! check, `Type::Void` stands in as a recovery type so the walk keeps
//! going and can still find independent errors elsewhere in the same
//! function.

use crate::ast::{BinaryOp, Block, ElseBranch, Expr, FunDecl, Program, Statement, StructDecl, UnaryOp};
use crate::types::Type;
use glyph_core::{Diagnostic, ScriptError};
use std::collections::{HashMap, HashSet};

/// A program that has passed the checker. The evaluator only ever
/// receives one of these — there is no way to construct one except by
/// checking successfully.
pub struct CheckedProgram(Program);

impl CheckedProgram {
    pub fn program(&self) -> &Program {
        &self.0
    }
}

#[derive(Clone)]
struct FunctionSignature {
    params: Vec<Type>,
    return_type: Type,
}

#[derive(Clone)]
struct StructSignature {
    fields: HashMap<String, Type>,
    methods: HashMap<String, FunctionSignature>,
}

type Scope = Vec<HashMap<String, (Type, bool)>>;

pub struct TypeChecker {
    known_structs: HashSet<String>,
    structs: HashMap<String, StructSignature>,
    functions: HashMap<String, FunctionSignature>,
    diagnostics: Vec<Diagnostic>,
}

impl TypeChecker {
    pub fn new() -> Self {
        TypeChecker {
            known_structs: HashSet::new(),
            structs: HashMap::new(),
            functions: HashMap::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn check(mut self, program: Program) -> Result<CheckedProgram, ScriptError> {
        self.known_structs = program.structs.iter().map(|s| s.name.clone()).collect();
        self.register_structs(&program.structs);
        self.register_builtins();
        self.register_functions(&program.functions);

        for decl in &program.structs {
            self.check_struct(decl);
        }
        for decl in &program.functions {
            self.check_function(decl, None);
        }

        if self.diagnostics.is_empty() {
            Ok(CheckedProgram(program))
        } else {
            Err(ScriptError::check(self.diagnostics))
        }
    }

    fn resolve(&mut self, type_ref: &crate::ast::TypeRef, location: &glyph_core::SourceLocation) -> Type {
        match Type::resolve(type_ref, &self.known_structs) {
            Ok(t) => t,
            Err(message) => {
                self.diagnostics.push(Diagnostic::at(message, location.clone()));
                Type::Void
            }
        }
    }

    fn register_structs(&mut self, structs: &[StructDecl]) {
        for decl in structs {
            let mut fields = HashMap::new();
            for field in &decl.fields {
                let ty = self.resolve(&field.type_ref, &field.location);
                fields.insert(field.name.clone(), ty);
            }
            let mut methods = HashMap::new();
            for method in &decl.methods {
                let sig = self.function_signature(method);
                methods.insert(method.name.clone(), sig);
            }
            if self.structs.insert(decl.name.clone(), StructSignature { fields, methods }).is_some() {
                self.diagnostics.push(Diagnostic::at(
                    format!("struct `{}` is defined more than once", decl.name),
                    decl.location.clone(),
                ));
            }
        }
    }

    /// Signatures for the six host-native functions the runner injects
    /// under stable names (§6). Registered before any script-declared
    /// function so a script that redefines one of these names trips the
    /// ordinary "defined more than once" diagnostic rather than silently
    /// shadowing the host.
    fn register_builtins(&mut self) {
        let uint8_array = Type::Array(Box::new(Type::UInt8));
        let builtins = [
            ("log", vec![Type::String], Type::Void),
            (
                "getValue",
                vec![Type::String, Type::String, Type::String],
                Type::UInt64,
            ),
            (
                "setValue",
                vec![Type::String, Type::String, Type::String, Type::UInt64],
                Type::Void,
            ),
            (
                "createAccount",
                vec![uint8_array.clone(), uint8_array.clone()],
                Type::String,
            ),
            (
                "updateAccountCode",
                vec![Type::String, uint8_array],
                Type::Void,
            ),
            ("getAccount", vec![Type::String], Type::Account),
        ];
        for (name, params, return_type) in builtins {
            self.functions
                .insert(name.to_string(), FunctionSignature { params, return_type });
        }
    }

    fn register_functions(&mut self, functions: &[FunDecl]) {
        for decl in functions {
            let sig = self.function_signature(decl);
            if self.functions.insert(decl.name.clone(), sig).is_some() {
                self.diagnostics.push(Diagnostic::at(
                    format!("function `{}` is defined more than once", decl.name),
                    decl.location.clone(),
                ));
            }
        }
    }

    fn function_signature(&mut self, decl: &FunDecl) -> FunctionSignature {
        let params = decl
            .params
            .iter()
            .map(|p| self.resolve(&p.type_ref, &p.location))
            .collect();
        let return_type = match &decl.return_type {
            Some(t) => self.resolve(t, &decl.location),
            None => Type::Void,
        };
        FunctionSignature { params, return_type }
    }

    fn check_struct(&mut self, decl: &StructDecl) {
        for method in &decl.methods {
            self.check_function(method, Some(decl.name.as_str()));
        }
    }

    fn check_function(&mut self, decl: &FunDecl, owner: Option<&str>) {
        let sig = self.functions.get(&decl.name).cloned().unwrap_or_else(|| {
            owner
                .and_then(|o| self.structs.get(o))
                .and_then(|s| s.methods.get(&decl.name))
                .cloned()
                .unwrap_or(FunctionSignature { params: vec![], return_type: Type::Void })
        });

        let mut scope: Scope = vec![HashMap::new()];
        if let Some(owner) = owner {
            scope[0].insert("self".to_string(), (Type::Struct(owner.to_string()), false));
        }
        for (param, ty) in decl.params.iter().zip(sig.params.iter()) {
            scope[0].insert(param.name.clone(), (ty.clone(), true));
        }

        self.check_block(&decl.body, &mut scope, &sig.return_type, 0);
    }

    fn check_block(&mut self, block: &Block, scope: &mut Scope, return_type: &Type, loop_depth: usize) {
        scope.push(HashMap::new());
        for statement in &block.statements {
            self.check_statement(statement, scope, return_type, loop_depth);
        }
        scope.pop();
    }

    fn check_statement(&mut self, statement: &Statement, scope: &mut Scope, return_type: &Type, loop_depth: usize) {
        match statement {
            Statement::Let { name, value, .. } => {
                let ty = self.check_expr(value, scope);
                scope.last_mut().unwrap().insert(name.clone(), (ty, false));
            }
            Statement::Var { name, value, .. } => {
                let ty = self.check_expr(value, scope);
                scope.last_mut().unwrap().insert(name.clone(), (ty, true));
            }
            Statement::Assign { target, value, location } => {
                let value_ty = self.check_expr(value, scope);
                self.check_assignable(target, &value_ty, scope, location);
            }
            Statement::If { condition, then_block, else_branch, .. } => {
                let cond_ty = self.check_expr(condition, scope);
                self.expect_type(&cond_ty, &Type::Bool, condition.location());
                self.check_block(then_block, scope, return_type, loop_depth);
                match else_branch {
                    Some(ElseBranch::Block(block)) => self.check_block(block, scope, return_type, loop_depth),
                    Some(ElseBranch::If(stmt)) => self.check_statement(stmt, scope, return_type, loop_depth),
                    None => {}
                }
            }
            Statement::While { condition, body, .. } => {
                let cond_ty = self.check_expr(condition, scope);
                self.expect_type(&cond_ty, &Type::Bool, condition.location());
                self.check_block(body, scope, return_type, loop_depth + 1);
            }
            Statement::Return { value, location } => {
                let ty = match value {
                    Some(expr) => self.check_expr(expr, scope),
                    None => Type::Void,
                };
                self.expect_type(&ty, return_type, location);
            }
            Statement::Break { location } => {
                if loop_depth == 0 {
                    self.diagnostics.push(Diagnostic::at("`break` outside a loop", location.clone()));
                }
            }
            Statement::Continue { location } => {
                if loop_depth == 0 {
                    self.diagnostics.push(Diagnostic::at("`continue` outside a loop", location.clone()));
                }
            }
            Statement::Expr { expr, .. } => {
                self.check_expr(expr, scope);
            }
        }
    }

    fn check_assignable(&mut self, target: &Expr, value_ty: &Type, scope: &mut Scope, location: &glyph_core::SourceLocation) {
        match target {
            Expr::Identifier { name, location } => match self.lookup(scope, name) {
                Some((ty, mutable)) => {
                    if !mutable {
                        self.diagnostics.push(Diagnostic::at(
                            format!("cannot assign to `{name}`, it was bound with `let`"),
                            location.clone(),
                        ));
                    }
                    self.expect_type(value_ty, &ty, location);
                }
                None => self.diagnostics.push(Diagnostic::at(
                    format!("undefined identifier `{name}`"),
                    location.clone(),
                )),
            },
            Expr::Member { target, name, location } => {
                let target_ty = self.check_expr(target, scope);
                if target_ty == Type::Account {
                    let field_ty = match name.as_str() {
                        "address" => Some(Type::String),
                        "storage" => Some(Type::Dictionary(Box::new(Type::Dynamic))),
                        _ => None,
                    };
                    if let Some(field_ty) = field_ty {
                        self.expect_type(value_ty, &field_ty, location);
                        return;
                    }
                }
                if let Type::Struct(struct_name) = &target_ty {
                    if let Some(field_ty) = self
                        .structs
                        .get(struct_name)
                        .and_then(|s| s.fields.get(name))
                        .cloned()
                    {
                        self.expect_type(value_ty, &field_ty, location);
                        return;
                    }
                }
                self.diagnostics.push(Diagnostic::at(
                    format!("`{}` has no assignable field `{name}`", type_or_unknown(&target_ty)),
                    location.clone(),
                ));
            }
            Expr::Index { target, index, location } => {
                let target_ty = self.check_expr(target, scope);
                let index_ty = self.check_expr(index, scope);
                match &target_ty {
                    Type::Array(elem) => {
                        self.expect_integer(&index_ty, location);
                        self.expect_type(value_ty, elem, location);
                    }
                    Type::Dictionary(elem) => {
                        self.expect_type(value_ty, elem, location);
                    }
                    other => self.diagnostics.push(Diagnostic::at(
                        format!("`{other}` is not indexable"),
                        location.clone(),
                    )),
                }
            }
            _ => self.diagnostics.push(Diagnostic::at("invalid assignment target", location.clone())),
        }
    }

    fn check_expr(&mut self, expr: &Expr, scope: &mut Scope) -> Type {
        match expr {
            Expr::IntLiteral { .. } => Type::Int,
            Expr::StringLiteral { .. } => Type::String,
            Expr::BoolLiteral { .. } => Type::Bool,
            Expr::NilLiteral { .. } => Type::Option(Box::new(Type::Void)),
            Expr::Identifier { name, location } => match self.lookup(scope, name) {
                Some((ty, _)) => ty,
                None => {
                    self.diagnostics.push(Diagnostic::at(format!("undefined identifier `{name}`"), location.clone()));
                    Type::Void
                }
            },
            Expr::Unary { op, operand, location } => {
                let ty = self.check_expr(operand, scope);
                match op {
                    UnaryOp::Neg => {
                        self.expect_integer(&ty, location);
                        ty
                    }
                    UnaryOp::Not => {
                        self.expect_type(&ty, &Type::Bool, location);
                        Type::Bool
                    }
                }
            }
            Expr::Binary { op, left, right, location } => self.check_binary(*op, left, right, location, scope),
            Expr::Call { callee, args, location } => self.check_call(callee, args, location, scope),
            Expr::Member { target, name, location } => {
                let target_ty = self.check_expr(target, scope);
                self.member_type(&target_ty, name, location)
            }
            Expr::Index { target, index, location } => {
                let target_ty = self.check_expr(target, scope);
                let index_ty = self.check_expr(index, scope);
                match target_ty {
                    Type::Array(elem) => {
                        self.expect_integer(&index_ty, location);
                        *elem
                    }
                    Type::Dictionary(elem) if *elem == Type::Dynamic => Type::Dynamic,
                    Type::Dictionary(elem) => Type::Option(elem),
                    other => {
                        self.diagnostics.push(Diagnostic::at(format!("`{other}` is not indexable"), location.clone()));
                        Type::Void
                    }
                }
            }
            Expr::StructLiteral { name, fields, location } => self.check_struct_literal(name, fields, location, scope),
        }
    }

    fn check_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr, location: &glyph_core::SourceLocation, scope: &mut Scope) -> Type {
        let left_ty = self.check_expr(left, scope);
        let right_ty = self.check_expr(right, scope);
        match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
                self.expect_integer(&left_ty, location);
                self.expect_same(&left_ty, &right_ty, location);
                left_ty
            }
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                self.expect_integer(&left_ty, location);
                self.expect_same(&left_ty, &right_ty, location);
                Type::Bool
            }
            BinaryOp::Eq | BinaryOp::Ne => {
                self.expect_same(&left_ty, &right_ty, location);
                Type::Bool
            }
            BinaryOp::And | BinaryOp::Or => {
                self.expect_type(&left_ty, &Type::Bool, location);
                self.expect_type(&right_ty, &Type::Bool, location);
                Type::Bool
            }
        }
    }

    fn check_call(&mut self, callee: &Expr, args: &[Expr], location: &glyph_core::SourceLocation, scope: &mut Scope) -> Type {
        let arg_types: Vec<Type> = args.iter().map(|a| self.check_expr(a, scope)).collect();
        match callee {
            Expr::Identifier { name, location: id_location } => {
                let Some(sig) = self.functions.get(name).cloned() else {
                    self.diagnostics.push(Diagnostic::at(format!("undefined function `{name}`"), id_location.clone()));
                    return Type::Void;
                };
                self.check_arity_and_args(name, &sig, &arg_types, location);
                sig.return_type
            }
            Expr::Member { target, name, location: member_location } => {
                let target_ty = self.check_expr(target, scope);
                if target_ty == Type::Dynamic {
                    return Type::Dynamic;
                }
                let Type::Struct(struct_name) = &target_ty else {
                    self.diagnostics.push(Diagnostic::at(
                        format!("`{}` has no method `{name}`", type_or_unknown(&target_ty)),
                        member_location.clone(),
                    ));
                    return Type::Void;
                };
                let Some(sig) = self.structs.get(struct_name).and_then(|s| s.methods.get(name)).cloned() else {
                    self.diagnostics.push(Diagnostic::at(
                        format!("`{struct_name}` has no method `{name}`"),
                        member_location.clone(),
                    ));
                    return Type::Void;
                };
                self.check_arity_and_args(name, &sig, &arg_types, location);
                sig.return_type
            }
            other => {
                self.diagnostics.push(Diagnostic::at("expression is not callable", other.location().clone()));
                Type::Void
            }
        }
    }

    fn check_arity_and_args(&mut self, name: &str, sig: &FunctionSignature, args: &[Type], location: &glyph_core::SourceLocation) {
        if sig.params.len() != args.len() {
            self.diagnostics.push(Diagnostic::at(
                format!("`{name}` expects {} argument(s), got {}", sig.params.len(), args.len()),
                location.clone(),
            ));
            return;
        }
        for (expected, actual) in sig.params.iter().zip(args.iter()) {
            self.expect_type(actual, expected, location);
        }
    }

    fn check_struct_literal(&mut self, name: &str, fields: &[(String, Expr)], location: &glyph_core::SourceLocation, scope: &mut Scope) -> Type {
        let Some(signature) = self.structs.get(name).cloned() else {
            self.diagnostics.push(Diagnostic::at(format!("undefined struct `{name}`"), location.clone()));
            for (_, value) in fields {
                self.check_expr(value, scope);
            }
            return Type::Void;
        };
        let mut seen = HashSet::new();
        for (field_name, value) in fields {
            let value_ty = self.check_expr(value, scope);
            seen.insert(field_name.clone());
            match signature.fields.get(field_name) {
                Some(expected) => self.expect_type(&value_ty, expected, location),
                None => self.diagnostics.push(Diagnostic::at(
                    format!("`{name}` has no field `{field_name}`"),
                    location.clone(),
                )),
            }
        }
        for field_name in signature.fields.keys() {
            if !seen.contains(field_name) {
                self.diagnostics.push(Diagnostic::at(
                    format!("missing field `{field_name}` in `{name}` literal"),
                    location.clone(),
                ));
            }
        }
        Type::Struct(name.to_string())
    }

    fn member_type(&mut self, target_ty: &Type, name: &str, location: &glyph_core::SourceLocation) -> Type {
        if *target_ty == Type::Dynamic {
            return Type::Dynamic;
        }
        if *target_ty == Type::Account {
            return match name {
                "address" => Type::String,
                "storage" => Type::Dictionary(Box::new(Type::Dynamic)),
                _ => {
                    self.diagnostics.push(Diagnostic::at(format!("`Account` has no member `{name}`"), location.clone()));
                    Type::Void
                }
            };
        }
        if let Type::Struct(struct_name) = target_ty {
            if let Some(sig) = self.structs.get(struct_name) {
                if let Some(field_ty) = sig.fields.get(name) {
                    return field_ty.clone();
                }
                if sig.methods.contains_key(name) {
                    self.diagnostics.push(Diagnostic::at(
                        format!("`{name}` is a method; call it with `()`"),
                        location.clone(),
                    ));
                    return Type::Void;
                }
            }
        }
        match (target_ty, name) {
            (Type::String, "length") => return Type::Int,
            (Type::Array(_), "length") => return Type::Int,
            (Type::Dictionary(_), "length") => return Type::Int,
            _ => {}
        }
        self.diagnostics.push(Diagnostic::at(
            format!("`{}` has no member `{name}`", type_or_unknown(target_ty)),
            location.clone(),
        ));
        Type::Void
    }

    fn lookup(&self, scope: &Scope, name: &str) -> Option<(Type, bool)> {
        scope.iter().rev().find_map(|frame| frame.get(name).cloned())
    }

    fn expect_integer(&mut self, ty: &Type, location: &glyph_core::SourceLocation) {
        if !ty.is_integer() && *ty != Type::Void {
            self.diagnostics.push(Diagnostic::at(format!("expected an integer type, found `{ty}`"), location.clone()));
        }
    }

    fn expect_same(&mut self, a: &Type, b: &Type, location: &glyph_core::SourceLocation) {
        if a != b && *a != Type::Void && *b != Type::Void {
            self.diagnostics.push(Diagnostic::at(
                format!("mismatched types: `{a}` and `{b}`"),
                location.clone(),
            ));
        }
    }

    fn expect_type(&mut self, actual: &Type, expected: &Type, location: &glyph_core::SourceLocation) {
        if *actual == Type::Void || *expected == Type::Void {
            return;
        }
        if types_compatible(actual, expected) {
            return;
        }
        self.diagnostics.push(Diagnostic::at(
            format!("expected `{expected}`, found `{actual}`"),
            location.clone(),
        ));
    }
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// `nil` has type `Option<Void>` at the literal site since there is
/// nothing to infer the wrapped type from — so any `Option<T>` is
/// compatible with any other `Option<_>` here, rather than requiring `T`
/// to match exactly.
fn types_compatible(actual: &Type, expected: &Type) -> bool {
    match (actual, expected) {
        (Type::Dynamic, _) | (_, Type::Dynamic) => true,
        (Type::Option(_), Type::Option(_)) => true,
        _ => actual == expected,
    }
}

fn type_or_unknown(ty: &Type) -> String {
    if *ty == Type::Void {
        "<unknown>".to_string()
    } else {
        ty.to_string()
    }
}

pub fn check_program(program: Program) -> Result<CheckedProgram, ScriptError> {
    TypeChecker::new().check(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn check(src: &str) -> Result<CheckedProgram, ScriptError> {
        let program = parse(src, "t.glyph").unwrap();
        check_program(program)
    }

    #[test]
    fn arithmetic_entry_point_checks() {
        assert!(check("fun main() -> Int { return 2 + 3 * 4; }").is_ok());
    }

    #[test]
    fn cross_variant_integer_arithmetic_is_rejected() {
        let src = "fun f(a: Int8, b: Int32) -> Int8 { return a + b; }";
        assert!(check(src).is_err());
    }

    #[test]
    fn undefined_identifier_is_reported() {
        let err = check("fun main() { return missing; }").unwrap_err();
        assert_eq!(err.diagnostics().len(), 1);
    }

    #[test]
    fn collects_every_error_in_one_pass() {
        let src = "fun main() { return a + b + c; }";
        let err = check(src).unwrap_err();
        assert!(err.diagnostics().len() >= 3);
    }

    #[test]
    fn struct_method_self_rebinding_checks() {
        let src = "struct Counter { n: Int fun inc() { self.n = self.n + 1; } }";
        assert!(check(src).is_ok());
    }

    #[test]
    fn assigning_to_a_let_binding_is_rejected() {
        let src = "fun main() { let x = 1; x = 2; }";
        assert!(check(src).is_err());
    }

    #[test]
    fn break_outside_loop_is_rejected() {
        assert!(check("fun main() { break; }").is_err());
    }

    #[test]
    fn host_builtins_are_callable_by_name() {
        let src = r#"fun main() { log("hello"); let v = getValue("a", "", "k"); setValue("a", "", "k", v); }"#;
        assert!(check(src).is_ok());
    }

    #[test]
    fn struct_literal_missing_field_is_rejected() {
        let src = "struct P { x: Int y: Int } fun main() { let p = P { x: 1 }; }";
        assert!(check(src).is_err());
    }
}
