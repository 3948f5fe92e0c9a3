//! Recursive-descent parser with panic-mode recovery.
//!
//! Each statement that fails to parse is recorded and the cursor skips ahead
//! to a synchronization point (`}`, end of input, or a token that begins a new
//! statement), so a single run reports every syntax error exactly once.

use std::fmt;

use thiserror::Error;

use crate::ast::{
    BinaryOperator, Expression, FunctionDef, Number, Program, Statement, UnaryOperator,
};
use crate::token::{Span, Token, TokenKind};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParserError {
    #[error("Expected {expected}, got {got}")]
    ExpectedToken {
        expected: String,
        got: String,
        line: usize,
        column: usize,
    },
    #[error("Missing {expected}")]
    MissingToken {
        expected: String,
        line: usize,
        column: usize,
    },
    #[error("Invalid syntax: {message}")]
    InvalidSyntax {
        message: String,
        line: usize,
        column: usize,
    },
}

impl ParserError {
    pub fn expected_token(expected: impl Into<String>, got: &Token<'_>) -> Self {
        ParserError::ExpectedToken {
            expected: expected.into(),
            got: got.kind.describe(),
            line: got.line(),
            column: got.column(),
        }
    }

    pub fn missing_token(expected: impl Into<String>, span: Span) -> Self {
        ParserError::MissingToken {
            expected: expected.into(),
            line: span.line,
            column: span.column,
        }
    }

    pub fn invalid_syntax(message: impl Into<String>, span: Span) -> Self {
        ParserError::InvalidSyntax {
            message: message.into(),
            line: span.line,
            column: span.column,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            ParserError::ExpectedToken { line, column, .. }
            | ParserError::MissingToken { line, column, .. }
            | ParserError::InvalidSyntax { line, column, .. } => Span::new(*line, *column),
        }
    }

    pub(crate) fn hindi_message(&self) -> String {
        match self {
            ParserError::ExpectedToken { expected, got, .. } => {
                format!("{expected} अपेक्षित था, {got} मिला")
            }
            ParserError::MissingToken { expected, .. } => format!("{expected} गायब है"),
            ParserError::InvalidSyntax { message, .. } => format!("गलत वाक्य रचना: {message}"),
        }
    }
}

/// All syntax errors of one parse, surfaced as a single failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ParserErrorCollection {
    pub errors: Vec<ParserError>,
}

impl fmt::Display for ParserErrorCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, error) in self.errors.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            let span = error.span();
            write!(f, "Line {}, Col {}: {error}", span.line, span.column)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParserErrorCollection {}

type ParseResult<T> = Result<T, ParserError>;

pub struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    errors: Vec<ParserError>,
}

fn starts_statement(kind: &TokenKind<'_>) -> bool {
    matches!(
        kind,
        TokenKind::Agar
            | TokenKind::JabTak
            | TokenKind::Kaam
            | TokenKind::Class
            | TokenKind::Wapas
            | TokenKind::Koshish
            | TokenKind::Maan
            | TokenKind::Har
            | TokenKind::Likho
            | TokenKind::LikhoOnline
            | TokenKind::Poocho
            | TokenKind::Uchalo
            | TokenKind::Ruk
            | TokenKind::AgeBadho
            | TokenKind::Lao
    )
}

fn starts_expression(kind: &TokenKind<'_>) -> bool {
    matches!(
        kind,
        TokenKind::Identifier(_)
            | TokenKind::Int(_)
            | TokenKind::Float(_)
            | TokenKind::Str(_)
            | TokenKind::Sach
            | TokenKind::Jhoot
            | TokenKind::Khaali
            | TokenKind::Yeh
            | TokenKind::Upar
            | TokenKind::Naya
            | TokenKind::Lambda
            | TokenKind::Nahi
            | TokenKind::Minus
            | TokenKind::LParen
            | TokenKind::LBracket
            | TokenKind::LBrace
    )
}

impl<'a> Parser<'a> {
    pub fn new(mut tokens: Vec<Token<'a>>) -> Self {
        if tokens.is_empty() {
            tokens.push(Token::new(TokenKind::EOF, Span::default()));
        }
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
        }
    }

    pub fn parse(mut self) -> Result<Program, ParserErrorCollection> {
        let mut statements = Vec::new();
        while !self.at_eof() {
            match self.parse_statement() {
                Ok(statement) => statements.push(statement),
                Err(error) => {
                    self.errors.push(error);
                    self.synchronize();
                }
            }
        }
        if self.errors.is_empty() {
            Ok(Program { statements })
        } else {
            Err(ParserErrorCollection {
                errors: self.errors,
            })
        }
    }

    /// Skip ahead to the next plausible statement boundary: `}`, end of
    /// input, or a token that begins a new statement. When the failure is
    /// already positioned on a statement keyword (an unfinished statement ran
    /// into the next one), recovery resumes right there so the following
    /// statement is not swallowed. Every statement dispatch consumes at least
    /// one token before it can fail, so this always makes progress.
    fn synchronize(&mut self) {
        if !starts_statement(&self.current().kind) {
            self.advance();
        }
        loop {
            let kind = &self.current().kind;
            if matches!(kind, TokenKind::RBrace | TokenKind::EOF) || starts_statement(kind) {
                return;
            }
            self.advance();
        }
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        let token = *self.current();
        let line = token.line();
        match token.kind {
            TokenKind::Maan => self.parse_var_decl(),
            TokenKind::Agar => self.parse_if(),
            TokenKind::JabTak => self.parse_while(),
            TokenKind::Har => self.parse_for_each(),
            TokenKind::Kaam => Ok(Statement::FunctionDef(self.parse_function_def()?)),
            TokenKind::Class => self.parse_class_def(),
            TokenKind::Wapas => self.parse_return(),
            TokenKind::Ruk => {
                self.advance();
                Ok(Statement::Break { line })
            }
            TokenKind::AgeBadho => {
                self.advance();
                Ok(Statement::Continue { line })
            }
            TokenKind::Koshish => self.parse_try(),
            TokenKind::Uchalo => {
                self.advance();
                let value = self.parse_expression()?;
                Ok(Statement::Throw { value, line })
            }
            TokenKind::Likho => self.parse_print(true),
            TokenKind::LikhoOnline => self.parse_print(false),
            TokenKind::Poocho => self.parse_input(),
            TokenKind::Lao => {
                self.advance();
                let module = self.expect_identifier("module name")?;
                Ok(Statement::Import { module, line })
            }
            TokenKind::LBrace => {
                let body = self.parse_block()?;
                Ok(Statement::Block { body, line })
            }
            TokenKind::Identifier(name) if matches!(self.peek_kind(), TokenKind::Assign) => {
                self.advance();
                self.advance();
                let value = self.parse_expression()?;
                Ok(Statement::Assign {
                    name: name.to_string(),
                    value,
                    line,
                })
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_var_decl(&mut self) -> ParseResult<Statement> {
        let line = self.current().line();
        self.advance(); // maan
        let name = self.expect_identifier("variable name after 'maan'")?;
        self.expect(TokenKind::Assign, "'='")?;
        let value = self.parse_expression()?;
        Ok(Statement::VarDecl { name, value, line })
    }

    fn parse_if(&mut self) -> ParseResult<Statement> {
        let line = self.current().line();
        self.advance(); // agar
        let condition = self.parse_expression()?;
        let then_body = self.parse_block()?;

        let mut elif_branches = Vec::new();
        while matches!(self.current().kind, TokenKind::WarnaAgar) {
            self.advance();
            let elif_condition = self.parse_expression()?;
            let elif_body = self.parse_block()?;
            elif_branches.push((elif_condition, elif_body));
        }

        let else_body = if matches!(self.current().kind, TokenKind::Warna) {
            self.advance();
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Statement::If {
            condition,
            then_body,
            elif_branches,
            else_body,
            line,
        })
    }

    fn parse_while(&mut self) -> ParseResult<Statement> {
        let line = self.current().line();
        self.advance(); // jab_tak
        let condition = self.parse_expression()?;
        let body = self.parse_block()?;
        Ok(Statement::While {
            condition,
            body,
            line,
        })
    }

    fn parse_for_each(&mut self) -> ParseResult<Statement> {
        let line = self.current().line();
        self.advance(); // har
        let variable = self.expect_identifier("loop variable after 'har'")?;
        self.expect(TokenKind::Mein, "'mein'")?;
        let iterable = self.parse_expression()?;
        let body = self.parse_block()?;
        Ok(Statement::ForEach {
            variable,
            iterable,
            body,
            line,
        })
    }

    fn parse_function_def(&mut self) -> ParseResult<FunctionDef> {
        let line = self.current().line();
        self.advance(); // kaam
        let name = self.expect_identifier("function name after 'kaam'")?;
        let params = self.parse_params()?;
        let body = self.parse_block()?;
        Ok(FunctionDef {
            name,
            params,
            body,
            line,
        })
    }

    fn parse_class_def(&mut self) -> ParseResult<Statement> {
        let line = self.current().line();
        self.advance(); // class
        let name = self.expect_identifier("class name after 'class'")?;
        let parent = if matches!(self.current().kind, TokenKind::Extends) {
            self.advance();
            Some(self.expect_identifier("parent class name after 'extends'")?)
        } else {
            None
        };
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut methods = Vec::new();
        while !matches!(self.current().kind, TokenKind::RBrace | TokenKind::EOF) {
            if matches!(self.current().kind, TokenKind::Kaam) {
                methods.push(self.parse_function_def()?);
            } else {
                return Err(ParserError::expected_token(
                    "'kaam' method definition inside class body",
                    self.current(),
                ));
            }
        }
        self.expect_closing_brace()?;
        Ok(Statement::ClassDef {
            name,
            parent,
            methods,
            line,
        })
    }

    fn parse_return(&mut self) -> ParseResult<Statement> {
        let line = self.current().line();
        self.advance(); // wapas
        let value = if starts_expression(&self.current().kind) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        Ok(Statement::Return { value, line })
    }

    fn parse_try(&mut self) -> ParseResult<Statement> {
        let line = self.current().line();
        self.advance(); // koshish
        let body = self.parse_block()?;
        self.expect(TokenKind::Pakad, "'pakad'")?;
        let catch_var = self.expect_identifier("catch variable after 'pakad'")?;
        let catch_body = self.parse_block()?;
        let finally_body = if matches!(self.current().kind, TokenKind::Aakhir) {
            self.advance();
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(Statement::Try {
            body,
            catch_var,
            catch_body,
            finally_body,
            line,
        })
    }

    fn parse_print(&mut self, newline: bool) -> ParseResult<Statement> {
        let line = self.current().line();
        self.advance(); // likho / likho_online
        self.expect(TokenKind::LParen, "'('")?;
        let args = self.parse_call_args()?;
        Ok(Statement::Print {
            args,
            newline,
            line,
        })
    }

    fn parse_input(&mut self) -> ParseResult<Statement> {
        let line = self.current().line();
        self.advance(); // poocho
        let variable = self.expect_identifier("variable name after 'poocho'")?;
        let prompt = if let TokenKind::Str(text) = self.current().kind {
            self.advance();
            Some(text.to_string())
        } else {
            None
        };
        Ok(Statement::Input {
            variable,
            prompt,
            line,
        })
    }

    fn parse_expression_statement(&mut self) -> ParseResult<Statement> {
        let expr = self.parse_expression()?;
        if matches!(self.current().kind, TokenKind::Assign) {
            let assign_span = self.current().span;
            self.advance();
            let value = self.parse_expression()?;
            return match expr {
                Expression::Index {
                    target,
                    index,
                    line,
                } => Ok(Statement::IndexAssign {
                    target: *target,
                    index: *index,
                    value,
                    line,
                }),
                Expression::PropertyAccess {
                    target,
                    property,
                    line,
                } => Ok(Statement::PropertyAssign {
                    target: *target,
                    property,
                    value,
                    line,
                }),
                _ => Err(ParserError::invalid_syntax(
                    "invalid assignment target",
                    assign_span,
                )),
            };
        }
        Ok(Statement::Expr(expr))
    }

    /// `{ statement* }`. Errors inside the block are recorded and recovery
    /// continues inside the block so every bad statement is reported.
    fn parse_block(&mut self) -> ParseResult<Vec<Statement>> {
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut statements = Vec::new();
        while !matches!(self.current().kind, TokenKind::RBrace | TokenKind::EOF) {
            match self.parse_statement() {
                Ok(statement) => statements.push(statement),
                Err(error) => {
                    self.errors.push(error);
                    self.synchronize();
                }
            }
        }
        self.expect_closing_brace()?;
        Ok(statements)
    }

    // ------------------------------------------------------------------
    // Expressions, lowest precedence first
    // ------------------------------------------------------------------

    fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_logical_or()
    }

    fn parse_logical_or(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_logical_and()?;
        while matches!(self.current().kind, TokenKind::Ya) {
            let line = self.current().line();
            self.advance();
            let right = self.parse_logical_and()?;
            expr = Expression::BinaryOp {
                op: BinaryOperator::Or,
                left: Box::new(expr),
                right: Box::new(right),
                line,
            };
        }
        Ok(expr)
    }

    fn parse_logical_and(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_equality()?;
        while matches!(self.current().kind, TokenKind::Aur) {
            let line = self.current().line();
            self.advance();
            let right = self.parse_equality()?;
            expr = Expression::BinaryOp {
                op: BinaryOperator::And,
                left: Box::new(expr),
                right: Box::new(right),
                line,
            };
        }
        Ok(expr)
    }

    fn parse_equality(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_comparison()?;
        loop {
            let op = match self.current().kind {
                TokenKind::EqEq => BinaryOperator::Equal,
                TokenKind::NotEq => BinaryOperator::NotEqual,
                _ => break,
            };
            let line = self.current().line();
            self.advance();
            let right = self.parse_comparison()?;
            expr = Expression::BinaryOp {
                op,
                left: Box::new(expr),
                right: Box::new(right),
                line,
            };
        }
        Ok(expr)
    }

    fn parse_comparison(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_addition()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Greater => BinaryOperator::Greater,
                TokenKind::Less => BinaryOperator::Less,
                TokenKind::GreaterEq => BinaryOperator::GreaterEqual,
                TokenKind::LessEq => BinaryOperator::LessEqual,
                _ => break,
            };
            let line = self.current().line();
            self.advance();
            let right = self.parse_addition()?;
            expr = Expression::BinaryOp {
                op,
                left: Box::new(expr),
                right: Box::new(right),
                line,
            };
        }
        Ok(expr)
    }

    fn parse_addition(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_multiplication()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinaryOperator::Add,
                TokenKind::Minus => BinaryOperator::Sub,
                _ => break,
            };
            let line = self.current().line();
            self.advance();
            let right = self.parse_multiplication()?;
            expr = Expression::BinaryOp {
                op,
                left: Box::new(expr),
                right: Box::new(right),
                line,
            };
        }
        Ok(expr)
    }

    fn parse_multiplication(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_unary()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Star => BinaryOperator::Mul,
                TokenKind::Slash => BinaryOperator::Div,
                TokenKind::Percent => BinaryOperator::Mod,
                _ => break,
            };
            let line = self.current().line();
            self.advance();
            let right = self.parse_unary()?;
            expr = Expression::BinaryOp {
                op,
                left: Box::new(expr),
                right: Box::new(right),
                line,
            };
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> ParseResult<Expression> {
        let op = match self.current().kind {
            TokenKind::Minus => UnaryOperator::Neg,
            TokenKind::Nahi => UnaryOperator::Nahi,
            _ => return self.parse_postfix(),
        };
        let line = self.current().line();
        self.advance();
        let operand = self.parse_unary()?;
        Ok(Expression::UnaryOp {
            op,
            operand: Box::new(operand),
            line,
        })
    }

    fn parse_postfix(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.current().kind {
                TokenKind::LBracket => {
                    let line = self.current().line();
                    self.advance();
                    let index = self.parse_expression()?;
                    self.expect(TokenKind::RBracket, "']'")?;
                    expr = Expression::Index {
                        target: Box::new(expr),
                        index: Box::new(index),
                        line,
                    };
                }
                TokenKind::Dot => {
                    let line = self.current().line();
                    self.advance();
                    let name = self.expect_identifier("property name after '.'")?;
                    if matches!(self.current().kind, TokenKind::LParen) {
                        self.advance();
                        let args = self.parse_call_args()?;
                        expr = Expression::MethodCall {
                            target: Box::new(expr),
                            method: name,
                            args,
                            line,
                        };
                    } else {
                        expr = Expression::PropertyAccess {
                            target: Box::new(expr),
                            property: name,
                            line,
                        };
                    }
                }
                TokenKind::LParen => {
                    let line = self.current().line();
                    self.advance();
                    let args = self.parse_call_args()?;
                    expr = Expression::Call {
                        callee: Box::new(expr),
                        args,
                        line,
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_primary(&mut self) -> ParseResult<Expression> {
        let token = *self.current();
        let line = token.line();
        match token.kind {
            TokenKind::Int(value) => {
                self.advance();
                Ok(Expression::Number {
                    value: Number::Int(value),
                    line,
                })
            }
            TokenKind::Float(value) => {
                self.advance();
                Ok(Expression::Number {
                    value: Number::Float(value),
                    line,
                })
            }
            TokenKind::Str(value) => {
                self.advance();
                Ok(Expression::Str {
                    value: value.to_string(),
                    line,
                })
            }
            TokenKind::Sach => {
                self.advance();
                Ok(Expression::Boolean { value: true, line })
            }
            TokenKind::Jhoot => {
                self.advance();
                Ok(Expression::Boolean { value: false, line })
            }
            TokenKind::Khaali => {
                self.advance();
                Ok(Expression::Khaali { line })
            }
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(Expression::Variable {
                    name: name.to_string(),
                    line,
                })
            }
            TokenKind::Yeh => {
                self.advance();
                Ok(Expression::Yeh { line })
            }
            TokenKind::Upar => {
                self.advance();
                self.expect(TokenKind::LParen, "'('")?;
                let args = self.parse_call_args()?;
                Ok(Expression::Super { args, line })
            }
            TokenKind::Naya => {
                self.advance();
                let class_name = self.expect_identifier("class name after 'naya'")?;
                self.expect(TokenKind::LParen, "'('")?;
                let args = self.parse_call_args()?;
                Ok(Expression::NewObject {
                    class_name,
                    args,
                    line,
                })
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(Expression::Parenthesized {
                    inner: Box::new(inner),
                    line,
                })
            }
            TokenKind::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                if !matches!(self.current().kind, TokenKind::RBracket) {
                    elements.push(self.parse_expression()?);
                    while matches!(self.current().kind, TokenKind::Comma) {
                        self.advance();
                        elements.push(self.parse_expression()?);
                    }
                }
                self.expect(TokenKind::RBracket, "']'")?;
                Ok(Expression::List { elements, line })
            }
            TokenKind::LBrace => {
                self.advance();
                let mut pairs = Vec::new();
                if !matches!(self.current().kind, TokenKind::RBrace) {
                    pairs.push(self.parse_dict_entry()?);
                    while matches!(self.current().kind, TokenKind::Comma) {
                        self.advance();
                        pairs.push(self.parse_dict_entry()?);
                    }
                }
                self.expect(TokenKind::RBrace, "'}'")?;
                Ok(Expression::Dict { pairs, line })
            }
            TokenKind::Lambda => {
                self.advance();
                let params = self.parse_params()?;
                self.expect(TokenKind::Arrow, "'->'")?;
                let body = self.parse_expression()?;
                Ok(Expression::Lambda {
                    params,
                    body: Box::new(body),
                    line,
                })
            }
            _ => Err(ParserError::expected_token("expression", &token)),
        }
    }

    fn parse_dict_entry(&mut self) -> ParseResult<(Expression, Expression)> {
        let key = self.parse_expression()?;
        self.expect(TokenKind::Colon, "':'")?;
        let value = self.parse_expression()?;
        Ok((key, value))
    }

    /// Comma-separated arguments up to `)`; the opening `(` is already
    /// consumed.
    fn parse_call_args(&mut self) -> ParseResult<Vec<Expression>> {
        let mut args = Vec::new();
        if !matches!(self.current().kind, TokenKind::RParen) {
            args.push(self.parse_expression()?);
            while matches!(self.current().kind, TokenKind::Comma) {
                self.advance();
                args.push(self.parse_expression()?);
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        Ok(args)
    }

    fn parse_params(&mut self) -> ParseResult<Vec<String>> {
        self.expect(TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        if !matches!(self.current().kind, TokenKind::RParen) {
            params.push(self.expect_identifier("parameter name")?);
            while matches!(self.current().kind, TokenKind::Comma) {
                self.advance();
                params.push(self.expect_identifier("parameter name")?);
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        Ok(params)
    }

    // ------------------------------------------------------------------
    // Token plumbing
    // ------------------------------------------------------------------

    fn current(&self) -> &Token<'a> {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> TokenKind<'a> {
        self.tokens
            .get(self.pos + 1)
            .map(|token| token.kind)
            .unwrap_or(TokenKind::EOF)
    }

    fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn at_eof(&self) -> bool {
        matches!(self.current().kind, TokenKind::EOF)
    }

    fn expect(&mut self, kind: TokenKind<'static>, expected: &str) -> ParseResult<()> {
        if self.current().kind == kind {
            self.advance();
            Ok(())
        } else if matches!(self.current().kind, TokenKind::EOF) {
            Err(ParserError::missing_token(expected, self.current().span))
        } else {
            Err(ParserError::expected_token(expected, self.current()))
        }
    }

    /// A missing `}` is reported as a missing-token error so truncated blocks
    /// read well in diagnostics.
    fn expect_closing_brace(&mut self) -> ParseResult<()> {
        if matches!(self.current().kind, TokenKind::RBrace) {
            self.advance();
            Ok(())
        } else {
            Err(ParserError::missing_token("'}'", self.current().span))
        }
    }

    fn expect_identifier(&mut self, expected: &str) -> ParseResult<String> {
        if let TokenKind::Identifier(name) = self.current().kind {
            self.advance();
            Ok(name.to_string())
        } else if matches!(self.current().kind, TokenKind::EOF) {
            Err(ParserError::missing_token(expected, self.current().span))
        } else {
            Err(ParserError::expected_token(expected, self.current()))
        }
    }
}

/// Convenience entry point mirroring `lexer::tokenize`.
pub fn parse_tokens(tokens: Vec<Token<'_>>) -> Result<Program, ParserErrorCollection> {
    Parser::new(tokens).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use indoc::indoc;

    fn parse_source(source: &str) -> Program {
        let tokens = tokenize(source).expect("tokenize failed");
        parse_tokens(tokens).expect("parse failed")
    }

    fn parse_errors(source: &str) -> Vec<ParserError> {
        let (tokens, _) = crate::lexer::tokenize_safe(source);
        match parse_tokens(tokens) {
            Ok(_) => Vec::new(),
            Err(collection) => collection.errors,
        }
    }

    #[test]
    fn parses_var_decl_and_print() {
        let program = parse_source("maan x = 1 + 2\nlikho(x)");
        assert_eq!(
            program.statements,
            vec![
                Statement::VarDecl {
                    name: "x".to_string(),
                    value: Expression::BinaryOp {
                        op: BinaryOperator::Add,
                        left: Box::new(Expression::Number {
                            value: Number::Int(1),
                            line: 1,
                        }),
                        right: Box::new(Expression::Number {
                            value: Number::Int(2),
                            line: 1,
                        }),
                        line: 1,
                    },
                    line: 1,
                },
                Statement::Print {
                    args: vec![Expression::Variable {
                        name: "x".to_string(),
                        line: 2,
                    }],
                    newline: true,
                    line: 2,
                },
            ]
        );
    }

    #[test]
    fn binary_operators_are_left_associative() {
        let program = parse_source("maan x = 1 - 2 - 3");
        let Statement::VarDecl { value, .. } = &program.statements[0] else {
            panic!("expected declaration");
        };
        let Expression::BinaryOp { op, left, .. } = value else {
            panic!("expected binary op");
        };
        assert_eq!(*op, BinaryOperator::Sub);
        assert!(matches!(**left, Expression::BinaryOp { .. }));
    }

    #[test]
    fn precedence_binds_multiplication_tighter_than_addition() {
        let program = parse_source("maan x = 1 + 2 * 3");
        let Statement::VarDecl { value, .. } = &program.statements[0] else {
            panic!("expected declaration");
        };
        let Expression::BinaryOp { op, right, .. } = value else {
            panic!("expected binary op");
        };
        assert_eq!(*op, BinaryOperator::Add);
        assert!(
            matches!(&**right, Expression::BinaryOp { op, .. } if *op == BinaryOperator::Mul)
        );
    }

    #[test]
    fn parses_if_elif_else_chain() {
        let program = parse_source(indoc! {"
            agar x > 0 { likho(1) } warna_agar x < 0 { likho(2) } warna { likho(3) }
        "});
        let Statement::If {
            elif_branches,
            else_body,
            ..
        } = &program.statements[0]
        else {
            panic!("expected if");
        };
        assert_eq!(elif_branches.len(), 1);
        assert!(else_body.is_some());
    }

    #[test]
    fn parses_class_with_inheritance_and_methods() {
        let program = parse_source(indoc! {"
            class B extends A {
                kaam __init__(n) { yeh.n = n }
                kaam who() { likho(yeh.n) }
            }
        "});
        let Statement::ClassDef {
            name,
            parent,
            methods,
            ..
        } = &program.statements[0]
        else {
            panic!("expected class");
        };
        assert_eq!(name, "B");
        assert_eq!(parent.as_deref(), Some("A"));
        assert_eq!(methods.len(), 2);
        assert_eq!(methods[0].name, "__init__");
    }

    #[test]
    fn parses_lambda_and_call_chain() {
        let program = parse_source("maan add5 = lambda(x) -> x + 5\nlikho(add5(3))");
        let Statement::VarDecl { value, .. } = &program.statements[0] else {
            panic!("expected declaration");
        };
        assert!(matches!(value, Expression::Lambda { params, .. } if params == &["x".to_string()]));
    }

    #[test]
    fn parses_index_and_property_assignments() {
        let program = parse_source("arr[0] = 5\nobj.naam = \"Meera\"");
        assert!(matches!(program.statements[0], Statement::IndexAssign { .. }));
        assert!(matches!(
            program.statements[1],
            Statement::PropertyAssign { .. }
        ));
    }

    #[test]
    fn parses_try_catch_finally() {
        let program =
            parse_source("koshish { uchalo \"boom\" } pakad e { likho(e) } aakhir { likho(1) }");
        let Statement::Try {
            catch_var,
            finally_body,
            ..
        } = &program.statements[0]
        else {
            panic!("expected try");
        };
        assert_eq!(catch_var, "e");
        assert!(finally_body.is_some());
    }

    #[test]
    fn empty_source_parses_to_empty_program() {
        assert!(parse_source("").statements.is_empty());
    }

    #[test]
    fn missing_close_paren_is_reported_and_parsing_recovers() {
        let errors = parse_errors("likho(\"ok\"\nlikho(\"done\")");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("')'"));
    }

    #[test]
    fn missing_close_brace_is_reported_and_later_statements_still_parse() {
        let errors = parse_errors(indoc! {"
            kaam f() {
                likho(1)
            maan x = 3 +
        "});
        assert!(
            errors
                .iter()
                .any(|error| matches!(error, ParserError::MissingToken { .. }))
        );
        // The bad trailing expression is also caught in the same run.
        assert!(errors.len() >= 2);
    }

    #[test]
    fn each_syntax_error_is_reported_once() {
        let errors = parse_errors("maan x =\nmaan y = 2\nmaan z =");
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn pretty_printed_program_reparses_to_the_same_rendering() {
        let source = indoc! {r#"
            maan x = 10
            kaam add(a, b) { wapas a + b }
            class A { kaam __init__(n) { yeh.n = n } }
            maan a = naya A(x)
            agar a.n > 5 { likho("bada") } warna { likho("chota") }
            har item mein [1, 2, 3] { likho_online(item) }
            koshish { uchalo "oops" } pakad e { likho(e) }
            maan d = {"k": 1, "j": 2}
            d["k"] = d["j"] + 1
            maan twice = lambda(n) -> n * 2
            likho(twice(add(1, 2)), -x, nahi jhoot)
        "#};
        let first = parse_source(source);
        let rendered = first.to_string();
        let second = parse_source(&rendered);
        assert_eq!(rendered, second.to_string());
    }
}
