//! Abstract syntax tree produced by the parser and consumed by the
//! type-checker (§4.6).
//!
//! Deliberately small: the grammar has no array/dictionary literal
//! syntax, no generics beyond the type-reference position, and no
//! pattern matching — those values only ever arrive through the host
//! bridge or storage decode, never through source text.

use glyph_core::SourceLocation;
use num_bigint::BigInt;

#[derive(Debug, Clone, Default)]
pub struct Program {
    pub structs: Vec<StructDecl>,
    pub functions: Vec<FunDecl>,
}

#[derive(Debug, Clone)]
pub struct StructDecl {
    pub name: String,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<FunDecl>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: String,
    pub type_ref: TypeRef,
    pub location: SourceLocation,
}

#[derive(Debug, Clone)]
pub struct FunDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Option<TypeRef>,
    pub body: Block,
    pub location: SourceLocation,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub type_ref: TypeRef,
    pub location: SourceLocation,
}

/// A parsed type reference. The grammar's `type_name := IDENT` is
/// extended here with an optional `<...>` generic suffix — otherwise a
/// parameter or field could never name `Array<T>`/`Dictionary<V>`/
/// `Option<T>`, all of which the checker's built-in type set requires
/// (§4.6). A bare identifier still covers every scalar and struct type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Named(String),
    Generic { name: String, argument: Box<TypeRef> },
}

#[derive(Debug, Clone, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone)]
pub enum Statement {
    Let { name: String, value: Expr, location: SourceLocation },
    Var { name: String, value: Expr, location: SourceLocation },
    Assign { target: Expr, value: Expr, location: SourceLocation },
    If { condition: Expr, then_block: Block, else_branch: Option<ElseBranch>, location: SourceLocation },
    While { condition: Expr, body: Block, location: SourceLocation },
    Return { value: Option<Expr>, location: SourceLocation },
    Break { location: SourceLocation },
    Continue { location: SourceLocation },
    Expr { expr: Expr, location: SourceLocation },
}

#[derive(Debug, Clone)]
pub enum ElseBranch {
    Block(Block),
    If(Box<Statement>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

/// An expression. Assignment is a statement (`assign_stmt`), not an
/// expression form, per the grammar — so `Expr` never nests an
/// assignment.
#[derive(Debug, Clone)]
pub enum Expr {
    IntLiteral { value: BigInt, location: SourceLocation },
    StringLiteral { value: String, location: SourceLocation },
    BoolLiteral { value: bool, location: SourceLocation },
    NilLiteral { location: SourceLocation },
    Identifier { name: String, location: SourceLocation },
    Unary { op: UnaryOp, operand: Box<Expr>, location: SourceLocation },
    Binary { op: BinaryOp, left: Box<Expr>, right: Box<Expr>, location: SourceLocation },
    Call { callee: Box<Expr>, args: Vec<Expr>, location: SourceLocation },
    Member { target: Box<Expr>, name: String, location: SourceLocation },
    Index { target: Box<Expr>, index: Box<Expr>, location: SourceLocation },
    StructLiteral { name: String, fields: Vec<(String, Expr)>, location: SourceLocation },
}

impl Expr {
    pub fn location(&self) -> &SourceLocation {
        match self {
            Expr::IntLiteral { location, .. }
            | Expr::StringLiteral { location, .. }
            | Expr::BoolLiteral { location, .. }
            | Expr::NilLiteral { location }
            | Expr::Identifier { location, .. }
            | Expr::Unary { location, .. }
            | Expr::Binary { location, .. }
            | Expr::Call { location, .. }
            | Expr::Member { location, .. }
            | Expr::Index { location, .. }
            | Expr::StructLiteral { location, .. } => location,
        }
    }
}
