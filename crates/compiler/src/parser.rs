//! Recursive-descent parser with Pratt-style expression parsing (§4.6).
//!
//! Precedence, loosest to tightest: `||`, `&&`, equality, comparison,
//! additive, multiplicative, unary, postfix (call/member/index), primary.

use crate::ast::*;
use crate::lexer::{tokenize, LexError, Token, TokenKind};
use glyph_core::{ScriptError, SourceLocation};
use std::path::{Path, PathBuf};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    file: PathBuf,
}

type ParseResult<T> = Result<T, ScriptError>;

impl Parser {
    pub fn new(source: &str, file: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let tokens = tokenize(source).map_err(|e: LexError| {
            ScriptError::parse(e.message, SourceLocation::new(file.as_ref(), e.line))
        })?;
        Ok(Parser { tokens, pos: 0, file: file.as_ref().to_path_buf() })
    }

    pub fn parse_program(&mut self) -> ParseResult<Program> {
        let mut program = Program::default();
        while !self.check(&TokenKind::Eof) {
            if self.check(&TokenKind::Struct) {
                program.structs.push(self.parse_struct_decl()?);
            } else if self.check(&TokenKind::Fun) {
                program.functions.push(self.parse_fun_decl()?);
            } else {
                return Err(self.error("expected `struct` or `fun`"));
            }
        }
        Ok(program)
    }

    fn parse_struct_decl(&mut self) -> ParseResult<StructDecl> {
        let location = self.loc();
        self.expect(&TokenKind::Struct)?;
        let name = self.expect_ident()?;
        self.expect(&TokenKind::LBrace)?;
        let mut fields = Vec::new();
        while !self.check(&TokenKind::Fun) && !self.check(&TokenKind::RBrace) {
            fields.push(self.parse_field_decl()?);
        }
        let mut methods = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            methods.push(self.parse_fun_decl()?);
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(StructDecl { name, fields, methods, location })
    }

    fn parse_field_decl(&mut self) -> ParseResult<FieldDecl> {
        let location = self.loc();
        let name = self.expect_ident()?;
        self.expect(&TokenKind::Colon)?;
        let type_ref = self.parse_type_ref()?;
        Ok(FieldDecl { name, type_ref, location })
    }

    fn parse_fun_decl(&mut self) -> ParseResult<FunDecl> {
        let location = self.loc();
        self.expect(&TokenKind::Fun)?;
        let name = self.expect_ident()?;
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            params.push(self.parse_param()?);
            while self.matches(&TokenKind::Comma) {
                params.push(self.parse_param()?);
            }
        }
        self.expect(&TokenKind::RParen)?;
        let return_type = if self.matches(&TokenKind::Arrow) {
            Some(self.parse_type_ref()?)
        } else {
            None
        };
        let body = self.parse_block()?;
        Ok(FunDecl { name, params, return_type, body, location })
    }

    fn parse_param(&mut self) -> ParseResult<Param> {
        let location = self.loc();
        let name = self.expect_ident()?;
        self.expect(&TokenKind::Colon)?;
        let type_ref = self.parse_type_ref()?;
        Ok(Param { name, type_ref, location })
    }

    fn parse_type_ref(&mut self) -> ParseResult<TypeRef> {
        let name = self.expect_ident()?;
        if self.matches(&TokenKind::LAngle) {
            let argument = Box::new(self.parse_type_ref()?);
            self.expect(&TokenKind::RAngle)?;
            Ok(TypeRef::Generic { name, argument })
        } else {
            Ok(TypeRef::Named(name))
        }
    }

    fn parse_block(&mut self) -> ParseResult<Block> {
        self.expect(&TokenKind::LBrace)?;
        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            statements.push(self.parse_statement()?);
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(Block { statements })
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        let location = self.loc();
        match self.peek_kind() {
            TokenKind::Let => {
                self.advance();
                let name = self.expect_ident()?;
                self.expect(&TokenKind::Assign)?;
                let value = self.parse_expr()?;
                self.expect(&TokenKind::Semicolon)?;
                Ok(Statement::Let { name, value, location })
            }
            TokenKind::Var => {
                self.advance();
                let name = self.expect_ident()?;
                self.expect(&TokenKind::Assign)?;
                let value = self.parse_expr()?;
                self.expect(&TokenKind::Semicolon)?;
                Ok(Statement::Var { name, value, location })
            }
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::While => {
                self.advance();
                let condition = self.parse_expr()?;
                let body = self.parse_block()?;
                Ok(Statement::While { condition, body, location })
            }
            TokenKind::Return => {
                self.advance();
                let value = if self.check(&TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.expect(&TokenKind::Semicolon)?;
                Ok(Statement::Return { value, location })
            }
            TokenKind::Break => {
                self.advance();
                self.expect(&TokenKind::Semicolon)?;
                Ok(Statement::Break { location })
            }
            TokenKind::Continue => {
                self.advance();
                self.expect(&TokenKind::Semicolon)?;
                Ok(Statement::Continue { location })
            }
            _ => {
                let expr = self.parse_expr()?;
                if self.matches(&TokenKind::Assign) {
                    let value = self.parse_expr()?;
                    self.expect(&TokenKind::Semicolon)?;
                    Ok(Statement::Assign { target: expr, value, location })
                } else {
                    self.expect(&TokenKind::Semicolon)?;
                    Ok(Statement::Expr { expr, location })
                }
            }
        }
    }

    fn parse_if_stmt(&mut self) -> ParseResult<Statement> {
        let location = self.loc();
        self.expect(&TokenKind::If)?;
        let condition = self.parse_expr()?;
        let then_block = self.parse_block()?;
        let else_branch = if self.matches(&TokenKind::Else) {
            if self.check(&TokenKind::If) {
                Some(ElseBranch::If(Box::new(self.parse_if_stmt()?)))
            } else {
                Some(ElseBranch::Block(self.parse_block()?))
            }
        } else {
            None
        };
        Ok(Statement::If { condition, then_block, else_branch, location })
    }

    // ---- expressions (Pratt) ----

    fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_and()?;
        while self.check(&TokenKind::PipePipe) {
            let location = self.loc();
            self.advance();
            let right = self.parse_and()?;
            left = Expr::Binary { op: BinaryOp::Or, left: Box::new(left), right: Box::new(right), location };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_equality()?;
        while self.check(&TokenKind::AmpAmp) {
            let location = self.loc();
            self.advance();
            let right = self.parse_equality()?;
            left = Expr::Binary { op: BinaryOp::And, left: Box::new(left), right: Box::new(right), location };
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::Ne,
                _ => break,
            };
            let location = self.loc();
            self.advance();
            let right = self.parse_comparison()?;
            left = Expr::Binary { op, left: Box::new(left), right: Box::new(right), location };
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::LAngle => BinaryOp::Lt,
                TokenKind::Le => BinaryOp::Le,
                TokenKind::RAngle => BinaryOp::Gt,
                TokenKind::Ge => BinaryOp::Ge,
                _ => break,
            };
            let location = self.loc();
            self.advance();
            let right = self.parse_additive()?;
            left = Expr::Binary { op, left: Box::new(left), right: Box::new(right), location };
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            let location = self.loc();
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::Binary { op, left: Box::new(left), right: Box::new(right), location };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            let location = self.loc();
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::Binary { op, left: Box::new(left), right: Box::new(right), location };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        let location = self.loc();
        match self.peek_kind() {
            TokenKind::Minus => {
                self.advance();
                let operand = self.parse_unary()?;
                Ok(Expr::Unary { op: UnaryOp::Neg, operand: Box::new(operand), location })
            }
            TokenKind::Bang => {
                self.advance();
                let operand = self.parse_unary()?;
                Ok(Expr::Unary { op: UnaryOp::Not, operand: Box::new(operand), location })
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            let location = self.loc();
            match self.peek_kind() {
                TokenKind::Dot => {
                    self.advance();
                    let name = self.expect_ident()?;
                    expr = Expr::Member { target: Box::new(expr), name, location };
                }
                TokenKind::LParen => {
                    self.advance();
                    let mut args = Vec::new();
                    if !self.check(&TokenKind::RParen) {
                        args.push(self.parse_expr()?);
                        while self.matches(&TokenKind::Comma) {
                            args.push(self.parse_expr()?);
                        }
                    }
                    self.expect(&TokenKind::RParen)?;
                    expr = Expr::Call { callee: Box::new(expr), args, location };
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expr()?;
                    self.expect(&TokenKind::RBracket)?;
                    expr = Expr::Index { target: Box::new(expr), index: Box::new(index), location };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let location = self.loc();
        match self.peek_kind().clone() {
            TokenKind::Int(value) => {
                self.advance();
                Ok(Expr::IntLiteral { value, location })
            }
            TokenKind::Str(value) => {
                self.advance();
                Ok(Expr::StringLiteral { value, location })
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::BoolLiteral { value: true, location })
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::BoolLiteral { value: false, location })
            }
            TokenKind::Nil => {
                self.advance();
                Ok(Expr::NilLiteral { location })
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::Ident(name) => {
                self.advance();
                if self.check(&TokenKind::LBrace) && self.looks_like_struct_literal() {
                    self.advance();
                    let mut fields = Vec::new();
                    if !self.check(&TokenKind::RBrace) {
                        fields.push(self.parse_struct_literal_field()?);
                        while self.matches(&TokenKind::Comma) {
                            if self.check(&TokenKind::RBrace) {
                                break;
                            }
                            fields.push(self.parse_struct_literal_field()?);
                        }
                    }
                    self.expect(&TokenKind::RBrace)?;
                    Ok(Expr::StructLiteral { name, fields, location })
                } else {
                    Ok(Expr::Identifier { name, location })
                }
            }
            _ => Err(self.error("expected an expression")),
        }
    }

    fn parse_struct_literal_field(&mut self) -> ParseResult<(String, Expr)> {
        let name = self.expect_ident()?;
        self.expect(&TokenKind::Colon)?;
        let value = self.parse_expr()?;
        Ok((name, value))
    }

    /// Disambiguates `Ident {` as a struct literal versus the start of a
    /// block belonging to an enclosing `if`/`while` (e.g. `if x {`):
    /// a struct literal's brace is immediately followed by `IDENT :` or
    /// by a closing brace (an empty literal); anything else is a block.
    fn looks_like_struct_literal(&self) -> bool {
        matches!(self.tokens.get(self.pos + 1).map(|t| &t.kind), Some(TokenKind::RBrace))
            || matches!(
                (self.tokens.get(self.pos + 1).map(|t| &t.kind), self.tokens.get(self.pos + 2).map(|t| &t.kind)),
                (Some(TokenKind::Ident(_)), Some(TokenKind::Colon))
            )
    }

    // ---- token stream helpers ----

    fn peek_kind(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn loc(&self) -> SourceLocation {
        SourceLocation::new(self.file.clone(), self.tokens[self.pos].line)
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn matches(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> ParseResult<()> {
        if self.matches(kind) {
            Ok(())
        } else {
            Err(self.error(&format!("expected {kind:?}, found {:?}", self.peek_kind())))
        }
    }

    fn expect_ident(&mut self) -> ParseResult<String> {
        match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(self.error(&format!("expected an identifier, found {other:?}"))),
        }
    }

    fn error(&self, message: &str) -> ScriptError {
        ScriptError::parse(message, self.loc())
    }
}

pub fn parse(source: &str, file: impl AsRef<Path>) -> Result<Program, ScriptError> {
    Parser::new(source, file)?.parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_arithmetic_entry_point() {
        let program = parse("fun main() { return 2 + 3 * 4; }", "s1.glyph").unwrap();
        assert_eq!(program.functions.len(), 1);
        assert_eq!(program.functions[0].name, "main");
    }

    #[test]
    fn parses_struct_with_field_and_method() {
        let src = "struct Counter { n: Int fun inc() { self.n = self.n + 1; } }";
        let program = parse(src, "s.glyph").unwrap();
        assert_eq!(program.structs.len(), 1);
        assert_eq!(program.structs[0].fields.len(), 1);
        assert_eq!(program.structs[0].methods.len(), 1);
    }

    #[test]
    fn parses_if_else_if_chain() {
        let src = "fun f(x: Int) -> Int { if x < 0 { return 0; } else if x > 10 { return 10; } else { return x; } }";
        let program = parse(src, "s.glyph").unwrap();
        assert_eq!(program.functions[0].name, "f");
    }

    #[test]
    fn parses_struct_literal_and_index_and_member() {
        let src = "fun main() { let c = Counter { n: 1 }; return c.n; }";
        let program = parse(src, "s.glyph").unwrap();
        assert_eq!(program.functions[0].body.statements.len(), 2);
    }

    #[test]
    fn generic_type_refs_parse() {
        let src = "fun f(d: Dictionary<String>) -> Option<Int> { return nil; }";
        let program = parse(src, "s.glyph").unwrap();
        assert!(matches!(program.functions[0].params[0].type_ref, TypeRef::Generic { .. }));
    }

    #[test]
    fn unclosed_block_is_a_parse_error() {
        assert!(parse("fun main() { return 1;", "s.glyph").is_err());
    }
}
