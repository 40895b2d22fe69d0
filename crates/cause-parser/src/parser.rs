// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The parser implementation using Pratt parsing for expressions.

use cause_ast::expr::{BinOp, Expr, ExprKind, LogicalOp, Param, UnaryOp};
use cause_ast::token::{Token, TokenKind};
use cause_ast::{NodeId, Span};
use cause_lexer::LexError;

/// The parser for a single lambda-form expression.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Collected errors during parsing
    errors: Vec<ParseError>,
    /// Counter for generating unique NodeIds
    next_node_id: u32,
}

/// An infix operator found at the current position.
enum Infix {
    Binary(BinOp),
    Logical(LogicalOp),
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0, errors: Vec::new(), next_node_id: 0 }
    }

    fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    fn node(&mut self, kind: ExprKind, span: Span) -> Expr {
        let id = self.next_id();
        Expr::new(id, kind, span)
    }

    // =========================================================================
    // Token Navigation
    // =========================================================================

    fn current(&self) -> &Token {
        static EOF: Token = Token { kind: TokenKind::Eof, span: Span { start: 0, end: 0 } };
        self.tokens.get(self.pos).or(self.tokens.last()).unwrap_or(&EOF)
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek(&self, n: usize) -> &TokenKind {
        self.tokens.get(self.pos + n).map(|t| &t.kind).unwrap_or(&TokenKind::Eof)
    }

    fn at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    fn advance(&mut self) -> Span {
        let span = self.current().span;
        if !self.at_end() {
            self.pos += 1;
        }
        span
    }

    /// End offset of the most recently consumed token.
    fn prev_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.span.end)
            .unwrap_or(0)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<Span, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::expected(
                kind.display_name(),
                self.current_kind(),
                self.current().span,
            ))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.current_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(ParseError::expected(
                "a name",
                self.current_kind(),
                self.current().span,
            )),
        }
    }

    /// Allow keywords as property names.
    /// After `.`, any keyword can be used as an identifier.
    fn expect_property_name(&mut self) -> Result<String, ParseError> {
        let name = match self.current_kind().clone() {
            TokenKind::Ident(name) => name,
            TokenKind::Function => "function".to_string(),
            TokenKind::Return => "return".to_string(),
            TokenKind::Typeof => "typeof".to_string(),
            TokenKind::Void => "void".to_string(),
            TokenKind::In => "in".to_string(),
            TokenKind::Bool(true) => "true".to_string(),
            TokenKind::Bool(false) => "false".to_string(),
            TokenKind::Null => "null".to_string(),
            TokenKind::Undefined => "undefined".to_string(),
            _ => {
                return Err(ParseError::expected(
                    "property name",
                    self.current_kind(),
                    self.current().span,
                ))
            }
        };
        self.advance();
        Ok(name)
    }

    /// Scan from an opening `(` to its matching `)` and report whether `=>`
    /// follows. Does not consume anything.
    fn looks_like_arrow_params(&self) -> bool {
        let mut depth = 0usize;
        let mut i = self.pos;
        while let Some(token) = self.tokens.get(i) {
            match token.kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return matches!(
                            self.tokens.get(i + 1).map(|t| &t.kind),
                            Some(TokenKind::FatArrow)
                        );
                    }
                }
                TokenKind::Eof => return false,
                _ => {}
            }
            i += 1;
        }
        false
    }

    // =========================================================================
    // Top-Level Parsing
    // =========================================================================

    /// Parse exactly one expression followed by end of input.
    pub fn parse(&mut self) -> ParseResult {
        let expr = match self.parse_expr() {
            Ok(expr) => {
                if !self.at_end() {
                    let err = ParseError::expected(
                        "end of input",
                        self.current_kind(),
                        self.current().span,
                    );
                    self.errors.push(err);
                }
                Some(expr)
            }
            Err(e) => {
                self.errors.push(e);
                None
            }
        };

        ParseResult {
            expr,
            errors: std::mem::take(&mut self.errors),
        }
    }

    // =========================================================================
    // Expression Parsing
    // =========================================================================

    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_expr_bp(0)
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let start = self.current().span.start;
        let mut lhs = self.parse_prefix()?;

        loop {
            if let Some(bp) = self.postfix_bp() {
                if bp < min_bp { break; }
                lhs = self.parse_postfix(lhs)?;
                continue;
            }

            if self.check(&TokenKind::Question) {
                if Self::CONDITIONAL_BP < min_bp { break; }
                self.advance();
                let consequent = self.parse_expr_bp(0)?;
                self.expect(&TokenKind::Colon)?;
                let alternate = self.parse_expr_bp(Self::CONDITIONAL_BP)?;
                let end = alternate.span.end;
                lhs = self.node(
                    ExprKind::Conditional {
                        test: Box::new(lhs),
                        consequent: Box::new(consequent),
                        alternate: Box::new(alternate),
                    },
                    Span::new(start, end),
                );
                continue;
            }

            if let Some((l_bp, r_bp)) = self.infix_bp() {
                if l_bp < min_bp { break; }

                let op = self.parse_infix_op()?;
                let rhs = self.parse_expr_bp(r_bp)?;
                let span = Span::new(start, rhs.span.end);
                let (left, right) = (Box::new(lhs), Box::new(rhs));
                let kind = match op {
                    Infix::Binary(op) => ExprKind::Binary { op, left, right },
                    Infix::Logical(op) => ExprKind::Logical { op, left, right },
                };
                lhs = self.node(kind, span);
                continue;
            }

            break;
        }

        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span.start;

        let unary = match self.current_kind() {
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::Typeof => Some(UnaryOp::Typeof),
            TokenKind::Void => Some(UnaryOp::Void),
            _ => None,
        };
        if let Some(op) = unary {
            self.advance();
            let operand = self.parse_expr_bp(Self::PREFIX_BP)?;
            let span = Span::new(start, operand.span.end);
            return Ok(self.node(ExprKind::Unary { op, operand: Box::new(operand) }, span));
        }

        let kind = match self.current_kind().clone() {
            TokenKind::Number(n) => ExprKind::Number(n),
            TokenKind::String(s) => ExprKind::String(s),
            TokenKind::Bool(b) => ExprKind::Bool(b),
            TokenKind::Null => ExprKind::Null,
            TokenKind::Undefined => ExprKind::Undefined,
            TokenKind::Ident(name) => {
                if matches!(self.peek(1), TokenKind::FatArrow) {
                    return self.parse_arrow();
                }
                ExprKind::Ident(name)
            }
            TokenKind::LParen => {
                if self.looks_like_arrow_params() {
                    return self.parse_arrow();
                }
                return self.parse_paren();
            }
            TokenKind::LBracket => return self.parse_array_literal(),
            TokenKind::Function => return self.parse_function(),
            TokenKind::LBrace => {
                return Err(ParseError::expected(
                    "expression",
                    self.current_kind(),
                    self.current().span,
                )
                .with_hint("object literals are not supported; build values with functions or arrays"))
            }
            _ => {
                return Err(ParseError::expected(
                    "expression",
                    self.current_kind(),
                    self.current().span,
                ))
            }
        };

        let span = self.advance();
        Ok(self.node(kind, span))
    }

    fn parse_paren(&mut self) -> Result<Expr, ParseError> {
        let start = self.expect(&TokenKind::LParen)?.start;
        let mut inner = self.parse_expr()?;
        let end = self.expect(&TokenKind::RParen)?.end;
        // Parentheses are not a node; widen the span so diagnostics cover them.
        inner.span = Span::new(start, end);
        Ok(inner)
    }

    fn parse_array_literal(&mut self) -> Result<Expr, ParseError> {
        let start = self.expect(&TokenKind::LBracket)?.start;
        let mut elements = Vec::new();

        while !self.check(&TokenKind::RBracket) && !self.at_end() {
            elements.push(self.parse_expr()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        let end = self.expect(&TokenKind::RBracket)?.end;
        Ok(self.node(ExprKind::Array(elements), Span::new(start, end)))
    }

    /// Parse `x => body` or `(a, b = d) => body`.
    fn parse_arrow(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span.start;
        let params = if self.check(&TokenKind::LParen) {
            self.parse_params()?
        } else {
            let span = self.current().span;
            let name = self.expect_ident()?;
            vec![Param { name, default: None, span }]
        };
        self.expect(&TokenKind::FatArrow)?;

        let body = if self.check(&TokenKind::LBrace) {
            self.parse_return_block()?
        } else {
            self.parse_expr()?
        };

        let span = Span::new(start, body.span.end.max(self.prev_end()));
        Ok(self.node(
            ExprKind::Function { name: None, params, body: Box::new(body), arrow: true },
            span,
        ))
    }

    /// Parse `function name?(params) { return body; }`.
    fn parse_function(&mut self) -> Result<Expr, ParseError> {
        let start = self.expect(&TokenKind::Function)?.start;
        let name = match self.current_kind() {
            TokenKind::Ident(_) => Some(self.expect_ident()?),
            _ => None,
        };
        let params = self.parse_params()?;
        let body = self.parse_return_block()?;
        let span = Span::new(start, self.prev_end());
        Ok(self.node(
            ExprKind::Function { name, params, body: Box::new(body), arrow: false },
            span,
        ))
    }

    fn parse_params(&mut self) -> Result<Vec<Param>, ParseError> {
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();

        while !self.check(&TokenKind::RParen) && !self.at_end() {
            let span = self.current().span;
            let name = self.expect_ident()?;
            let default = if self.match_token(&TokenKind::Eq) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            let span = Span::new(span.start, self.prev_end());
            params.push(Param { name, default, span });
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect(&TokenKind::RParen)?;
        Ok(params)
    }

    /// A function body in lambda form: `{ return e; }` or `{}`.
    fn parse_return_block(&mut self) -> Result<Expr, ParseError> {
        let open = self.expect(&TokenKind::LBrace)?;

        if self.check(&TokenKind::RBrace) {
            let close = self.advance();
            return Ok(self.node(ExprKind::Undefined, open.to(close)));
        }

        if !self.check(&TokenKind::Return) {
            return Err(ParseError::expected(
                "'return'",
                self.current_kind(),
                self.current().span,
            ));
        }
        let ret = self.advance();

        let body = if self.check(&TokenKind::Semi) || self.check(&TokenKind::RBrace) {
            self.node(ExprKind::Undefined, ret)
        } else {
            self.parse_expr()?
        };
        self.match_token(&TokenKind::Semi);
        self.expect(&TokenKind::RBrace)?;
        Ok(body)
    }

    fn parse_postfix(&mut self, lhs: Expr) -> Result<Expr, ParseError> {
        let start = lhs.span.start;

        match self.current_kind() {
            TokenKind::LParen => {
                let args = self.parse_args()?;
                let end = self.prev_end();
                Ok(self.node(
                    ExprKind::Call { callee: Box::new(lhs), args },
                    Span::new(start, end),
                ))
            }
            TokenKind::LBracket => {
                self.advance();
                let property = self.parse_expr()?;
                let end = self.expect(&TokenKind::RBracket)?.end;
                Ok(self.node(
                    ExprKind::Member { object: Box::new(lhs), property: Box::new(property), computed: true },
                    Span::new(start, end),
                ))
            }
            TokenKind::Dot => {
                self.advance();
                let name_span = self.current().span;
                let name = self.expect_property_name()?;
                let property = self.node(ExprKind::Ident(name), name_span);
                Ok(self.node(
                    ExprKind::Member { object: Box::new(lhs), property: Box::new(property), computed: false },
                    Span::new(start, name_span.end),
                ))
            }
            _ => Err(ParseError::expected(
                "'(', '[' or '.'",
                self.current_kind(),
                self.current().span,
            )),
        }
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect(&TokenKind::LParen)?;
        let mut args = Vec::new();

        while !self.check(&TokenKind::RParen) && !self.at_end() {
            args.push(self.parse_expr()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect(&TokenKind::RParen)?;
        Ok(args)
    }

    // =========================================================================
    // Operator Precedence
    // =========================================================================

    const CONDITIONAL_BP: u8 = 3;
    const PREFIX_BP: u8 = 26;

    fn postfix_bp(&self) -> Option<u8> {
        match self.current_kind() {
            TokenKind::LParen | TokenKind::LBracket | TokenKind::Dot => Some(28),
            _ => None,
        }
    }

    fn infix_bp(&self) -> Option<(u8, u8)> {
        match self.current_kind() {
            TokenKind::QuestionQuestion | TokenKind::PipePipe => Some((4, 5)),
            TokenKind::AmpAmp => Some((6, 7)),
            TokenKind::Pipe => Some((8, 9)),
            TokenKind::Caret => Some((10, 11)),
            TokenKind::Amp => Some((12, 13)),
            TokenKind::EqEq | TokenKind::BangEq | TokenKind::EqEqEq | TokenKind::BangEqEq => Some((14, 15)),
            TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq | TokenKind::In => Some((16, 17)),
            TokenKind::LtLt | TokenKind::GtGt | TokenKind::GtGtGt => Some((18, 19)),
            TokenKind::Plus | TokenKind::Minus => Some((20, 21)),
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Some((22, 23)),
            // Right-associative
            TokenKind::StarStar => Some((25, 24)),
            _ => None,
        }
    }

    fn parse_infix_op(&mut self) -> Result<Infix, ParseError> {
        let op = match self.current_kind() {
            TokenKind::AmpAmp => Infix::Logical(LogicalOp::And),
            TokenKind::PipePipe => Infix::Logical(LogicalOp::Or),
            TokenKind::QuestionQuestion => Infix::Logical(LogicalOp::Coalesce),
            TokenKind::Plus => Infix::Binary(BinOp::Add),
            TokenKind::Minus => Infix::Binary(BinOp::Sub),
            TokenKind::Star => Infix::Binary(BinOp::Mul),
            TokenKind::Slash => Infix::Binary(BinOp::Div),
            TokenKind::Percent => Infix::Binary(BinOp::Mod),
            TokenKind::StarStar => Infix::Binary(BinOp::Pow),
            TokenKind::EqEq => Infix::Binary(BinOp::Eq),
            TokenKind::BangEq => Infix::Binary(BinOp::Ne),
            TokenKind::EqEqEq => Infix::Binary(BinOp::StrictEq),
            TokenKind::BangEqEq => Infix::Binary(BinOp::StrictNe),
            TokenKind::Lt => Infix::Binary(BinOp::Lt),
            TokenKind::Gt => Infix::Binary(BinOp::Gt),
            TokenKind::LtEq => Infix::Binary(BinOp::Le),
            TokenKind::GtEq => Infix::Binary(BinOp::Ge),
            TokenKind::In => Infix::Binary(BinOp::In),
            TokenKind::Amp => Infix::Binary(BinOp::BitAnd),
            TokenKind::Pipe => Infix::Binary(BinOp::BitOr),
            TokenKind::Caret => Infix::Binary(BinOp::BitXor),
            TokenKind::LtLt => Infix::Binary(BinOp::Shl),
            TokenKind::GtGt => Infix::Binary(BinOp::Shr),
            TokenKind::GtGtGt => Infix::Binary(BinOp::UShr),
            _ => return Err(ParseError::expected(
                "operator like '+' or '-'",
                self.current_kind(),
                self.current().span,
            )),
        };
        self.advance();
        Ok(op)
    }
}

/// Result of parsing: the expression plus any errors found.
#[derive(Debug)]
pub struct ParseResult {
    pub expr: Option<Expr>,
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    /// Returns true if parsing completed without errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty() && self.expr.is_some()
    }
}

/// A parser error with location and friendly message.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub span: Span,
    pub message: String,
    pub hint: Option<String>,
}

impl ParseError {
    fn expected(expected: &str, found: &TokenKind, span: Span) -> Self {
        let message = format_expected_message(expected, found);
        let hint = crate::hints::for_expected(expected, found).map(String::from);
        Self { span, message, hint }
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        Self { span: e.span, message: e.message, hint: e.hint }
    }
}

/// Format a user-friendly "expected X, found Y" message.
fn format_expected_message(expected: &str, found: &TokenKind) -> String {
    match expected {
        "')'" => {
            if matches!(found, TokenKind::Eof) {
                "Unclosed '(' - missing ')'".to_string()
            } else {
                format!("Expected ')', found {}", found.display_name())
            }
        }
        "']'" => {
            if matches!(found, TokenKind::Eof) {
                "Unclosed '[' - missing ']'".to_string()
            } else {
                format!("Expected ']', found {}", found.display_name())
            }
        }
        "'}'" => format!("Expected '}}' to close the function body, found {}", found.display_name()),
        "'{'" => format!("Expected '{{' to start the function body, found {}", found.display_name()),
        "a name" => format!("Expected name, found {}", found.display_name()),
        "expression" => format!("Expected expression, found {}", found.display_name()),
        "end of input" => format!("Unexpected {} after expression", found.display_name()),
        _ => format!("Expected {}, found {}", expected, found.display_name()),
    }
}
