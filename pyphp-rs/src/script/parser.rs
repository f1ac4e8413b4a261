//! Statement parser.
//!
//! Grammar:
//!
//! ```text
//! script    := statement+
//! statement := "echo" expr ";" | expr ";"
//! expr      := primary (binop primary)*         -- precedence climbing
//! binop     := "+" | "-"                        -- level 1, left-assoc
//!            | "*" | "/"                        -- level 2, left-assoc
//! primary   := INT
//!            | "$" LABEL
//!            | "'" "'" | '"' '"'
//!            | LABEL "(" [expr ("," expr)*] ")"
//! ```
//!
//! The parser is a stream: [`Parser::next_statement`] hands back one
//! statement at a time so the caller can execute it before the rest of the
//! input is looked at.  After a syntax error the stream ends.
//!
//! Expression trees are at most [`MAX_NESTING`] levels deep.  Deeper input
//! (nested calls or long operator chains) is a syntax error at the token
//! where the limit is crossed.

use std::fmt;

use super::ast::{BinOp, Expr, Stmt};
use super::lexer::{LexError, Lexer, LexerState, Token, TokenKind};

/// Deepest expression tree the parser will build.
pub const MAX_NESTING: usize = 1024;

/// The token sequence matches no grammar rule.  Aborts the current input unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub line: usize,
    /// Offending token, or `None` at end of input.
    pub found: Option<TokenKind>,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Syntax error on line {}.", self.line)
    }
}

impl std::error::Error for SyntaxError {}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    lookahead: Option<Token>,
    lex_errors: Vec<LexError>,
    failed: bool,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        Parser {
            lexer,
            lookahead: None,
            lex_errors: Vec::new(),
            failed: false,
            depth: 0,
        }
    }

    /// Lexer state as of the last token pulled.
    pub fn lexer_state(&self) -> LexerState {
        self.lexer.state()
    }

    /// Lexical errors collected since the last call.  Each was skipped over.
    pub fn take_lex_errors(&mut self) -> Vec<LexError> {
        std::mem::take(&mut self.lex_errors)
    }

    // ── Token plumbing ────────────────────────────────────────────────────────

    fn fill(&mut self) {
        if self.lookahead.is_some() {
            return;
        }
        for item in self.lexer.by_ref() {
            match item {
                Ok(tok) => {
                    self.lookahead = Some(tok);
                    return;
                }
                Err(e) => self.lex_errors.push(e),
            }
        }
    }

    fn peek(&mut self) -> Option<&Token> {
        self.fill();
        self.lookahead.as_ref()
    }

    fn peek_kind(&mut self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn advance(&mut self) -> Option<Token> {
        self.fill();
        self.lookahead.take()
    }

    fn error_at(&self, tok: Option<&Token>) -> SyntaxError {
        match tok {
            Some(t) => SyntaxError {
                line: t.line,
                found: Some(t.kind),
            },
            None => SyntaxError {
                line: self.lexer.state().line,
                found: None,
            },
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, SyntaxError> {
        match self.advance() {
            Some(t) if t.kind == kind => Ok(t),
            other => Err(self.error_at(other.as_ref())),
        }
    }

    /// Go one level deeper into the expression tree.
    fn descend(&mut self) -> Result<(), SyntaxError> {
        if self.depth >= MAX_NESTING {
            let tok = self.peek().cloned();
            return Err(self.error_at(tok.as_ref()));
        }
        self.depth += 1;
        Ok(())
    }

    // ── Grammar ───────────────────────────────────────────────────────────────

    /// Parse the next statement.  `None` once the input (or the unit, after
    /// an error) is exhausted.
    pub fn next_statement(&mut self) -> Option<Result<Stmt, SyntaxError>> {
        if self.failed {
            return None;
        }
        self.peek()?;
        let result = self.parse_statement();
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }

    fn parse_statement(&mut self) -> Result<Stmt, SyntaxError> {
        self.depth = 0;
        let stmt = if self.peek_kind() == Some(TokenKind::Echo) {
            self.advance();
            Stmt::Echo(self.parse_expr(0)?)
        } else {
            Stmt::Expr(self.parse_expr(0)?)
        };
        self.expect(TokenKind::Semi)?;
        Ok(stmt)
    }

    fn peek_binop(&mut self) -> Option<BinOp> {
        match self.peek_kind()? {
            TokenKind::Plus => Some(BinOp::Add),
            TokenKind::Minus => Some(BinOp::Sub),
            TokenKind::Times => Some(BinOp::Mul),
            TokenKind::Divide => Some(BinOp::Div),
            _ => None,
        }
    }

    /// Precedence climbing: only operators binding tighter than `min_prec`
    /// are folded into this call's operand.  Every fold adds a level above
    /// the operand built so far.
    fn parse_expr(&mut self, min_prec: u8) -> Result<Expr, SyntaxError> {
        let entry = self.depth;
        let mut lhs = self.parse_primary()?;
        while let Some(op) = self.peek_binop() {
            let prec = op.precedence();
            if prec <= min_prec {
                break;
            }
            self.advance();
            self.descend()?;
            let rhs = self.parse_expr(prec)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        self.depth = entry;
        Ok(lhs)
    }

    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        let tok = self.advance();
        match tok.as_ref().map(|t| t.kind) {
            Some(TokenKind::Int) => {
                let lexeme = tok.map(|t| t.lexeme).unwrap_or_default();
                Ok(Expr::IntLiteral(lexeme.parse().unwrap_or(0)))
            }
            Some(TokenKind::Dollar) => {
                let name = self.expect(TokenKind::Label)?;
                Ok(Expr::VariableRef(name.lexeme))
            }
            Some(quote @ (TokenKind::SingleQuote | TokenKind::DoubleQuote)) => {
                self.expect(quote)?;
                Ok(Expr::EmptyStringLiteral)
            }
            Some(TokenKind::Label) => {
                let name = tok.map(|t| t.lexeme).unwrap_or_default();
                let args = self.parse_call_args()?;
                Ok(Expr::Call { name, args })
            }
            _ => Err(self.error_at(tok.as_ref())),
        }
    }

    fn parse_call_args(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if self.peek_kind() == Some(TokenKind::RParen) {
            self.advance();
            return Ok(args);
        }
        loop {
            self.descend()?;
            args.push(self.parse_expr(0)?);
            self.depth -= 1;
            match self.advance() {
                Some(t) if t.kind == TokenKind::Comma => continue,
                Some(t) if t.kind == TokenKind::RParen => return Ok(args),
                other => return Err(self.error_at(other.as_ref())),
            }
        }
    }
}

/// Parse a whole script region into statements, stopping at the first
/// syntax error.  Lexical errors are skipped.
pub fn parse_script(src: &str) -> Result<Vec<Stmt>, SyntaxError> {
    let mut parser = Parser::new(Lexer::new(src));
    let mut stmts = Vec::new();
    while let Some(stmt) = parser.next_statement() {
        stmts.push(stmt?);
    }
    Ok(stmts)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Result<Vec<Stmt>, SyntaxError> {
        parse_script(&format!("<?php {src}"))
    }

    fn expr(src: &str) -> Expr {
        match parse(&format!("{src};")).expect("parse failed").remove(0) {
            Stmt::Expr(e) => e,
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    fn bin(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    #[test]
    fn statement_forms() {
        let stmts = parse("echo 1; 2;").unwrap();
        assert_eq!(
            stmts,
            vec![Stmt::Echo(Expr::IntLiteral(1)), Stmt::Expr(Expr::IntLiteral(2))]
        );
    }

    #[test]
    fn precedence() {
        use Expr::IntLiteral as I;
        assert_eq!(
            expr("2+3*4"),
            bin(BinOp::Add, I(2), bin(BinOp::Mul, I(3), I(4)))
        );
        assert_eq!(
            expr("2*3+4"),
            bin(BinOp::Add, bin(BinOp::Mul, I(2), I(3)), I(4))
        );
    }

    #[test]
    fn left_associative() {
        use Expr::IntLiteral as I;
        assert_eq!(
            expr("8-3-2"),
            bin(BinOp::Sub, bin(BinOp::Sub, I(8), I(3)), I(2))
        );
        assert_eq!(
            expr("8/4*2"),
            bin(BinOp::Mul, bin(BinOp::Div, I(8), I(4)), I(2))
        );
    }

    #[test]
    fn primaries() {
        assert_eq!(expr("$foo"), Expr::VariableRef("foo".into()));
        assert_eq!(expr("''"), Expr::EmptyStringLiteral);
        assert_eq!(expr("\"\""), Expr::EmptyStringLiteral);
        assert_eq!(expr("' '"), Expr::EmptyStringLiteral);
        assert_eq!(
            expr("f()"),
            Expr::Call { name: "f".into(), args: vec![] }
        );
        assert_eq!(
            expr("f(1, $x, g())"),
            Expr::Call {
                name: "f".into(),
                args: vec![
                    Expr::IntLiteral(1),
                    Expr::VariableRef("x".into()),
                    Expr::Call { name: "g".into(), args: vec![] },
                ],
            }
        );
    }

    #[test]
    fn oversized_literal_is_zero() {
        assert_eq!(expr("99999999999999999999"), Expr::IntLiteral(0));
    }

    #[test]
    fn quoted_content_is_not_supported() {
        assert!(parse("'abc';").is_err());
        assert!(parse("'\";").is_err());
    }

    #[test]
    fn parentheses_are_not_grouping() {
        assert!(parse("(1+2);").is_err());
    }

    #[test]
    fn missing_semicolon() {
        assert_eq!(
            parse("echo 1").unwrap_err(),
            SyntaxError { line: 1, found: None }
        );
    }

    #[test]
    fn bare_label_is_an_error() {
        assert!(parse("foo;").is_err());
    }

    #[test]
    fn trailing_comma_is_an_error() {
        assert!(parse("f(1,);").is_err());
    }

    #[test]
    fn error_reports_offending_line() {
        let err = parse("echo 1;\n\necho ;").unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.found, Some(TokenKind::Semi));
        assert_eq!(err.to_string(), "Syntax error on line 3.");
    }

    #[test]
    fn stream_stops_after_error() {
        let mut p = Parser::new(Lexer::new("<?php 1; ; 2;"));
        assert!(matches!(p.next_statement(), Some(Ok(_))));
        assert!(matches!(p.next_statement(), Some(Err(_))));
        assert!(p.next_statement().is_none());
    }

    #[test]
    fn lexical_errors_are_collected() {
        let mut p = Parser::new(Lexer::new("<?php #1;"));
        assert_eq!(p.next_statement(), Some(Ok(Stmt::Expr(Expr::IntLiteral(1)))));
        let errs = p.take_lex_errors();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].ch, '#');
        assert!(p.take_lex_errors().is_empty());
    }

    #[test]
    fn nesting_within_limit() {
        let depth = MAX_NESTING - 1;
        let src = format!("{}1{};", "f(".repeat(depth), ")".repeat(depth));
        assert!(parse(&src).is_ok());
    }

    #[test]
    fn deep_nesting_is_a_syntax_error() {
        let depth = 100_000;
        let src = format!("echo {}1{};", "f(".repeat(depth), ")".repeat(depth));
        let err = parse(&src).unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(err.to_string(), "Syntax error on line 1.");
    }

    #[test]
    fn long_operator_chain_is_a_syntax_error() {
        let src = format!("1{};", "+1".repeat(100_000));
        assert!(parse(&src).is_err());
        let src = format!("1{};", "+1".repeat(MAX_NESTING / 2));
        assert!(parse(&src).is_ok());
    }

    #[test]
    fn empty_input_has_no_statements() {
        assert_eq!(parse_script("").unwrap(), vec![]);
        assert_eq!(parse_script("<?php ?>").unwrap(), vec![]);
    }
}
