// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The lexer implementation using logos.

use cause_ast::token::{Token, TokenKind};
use cause_ast::Span;
use logos::Logos;

/// Raw token type for logos - literal values are parsed in a second pass.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum RawToken {
    // === Keywords ===
    #[token("function")]
    Function,
    #[token("return")]
    Return,
    #[token("typeof")]
    Typeof,
    #[token("void")]
    Void,
    #[token("in")]
    In,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,
    #[token("undefined")]
    Undefined,

    // === Operators (longest first) ===
    #[token("===")]
    EqEqEq,
    #[token("!==")]
    BangEqEq,
    #[token(">>>")]
    GtGtGt,

    #[token("**")]
    StarStar,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("<<")]
    LtLt,
    #[token(">>")]
    GtGt,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("??")]
    QuestionQuestion,
    #[token("=>")]
    FatArrow,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("!")]
    Bang,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,

    // === Delimiters ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,

    // === Comments ===
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    /// Carries whether the comment was closed.
    #[token("/*", block_comment)]
    BlockComment(bool),

    // === Literals ===
    #[regex(r"0[xX][0-9a-fA-F_]+")]
    HexNumber,
    #[regex(r"0[bB][01_]+")]
    BinNumber,
    #[regex(r"0[oO][0-7_]+")]
    OctNumber,
    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?")]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+")]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9]+)?")]
    Float,
    #[regex(r"[0-9][0-9_]*")]
    DecNumber,

    #[regex(r#""([^"\\\n]|\\.|\\u\{[0-9a-fA-F]{1,6}\})*""#)]
    #[regex(r#"'([^'\\\n]|\\.|\\u\{[0-9a-fA-F]{1,6}\})*'"#)]
    String,

    // === Identifier (after keywords; Unicode letters so `δ` is a name) ===
    #[regex(r"[\p{L}_$][\p{L}\p{N}_$]*")]
    Ident,
}

/// Skip a `/* ... */` comment. Comments do not nest.
fn block_comment(lexer: &mut logos::Lexer<RawToken>) -> bool {
    match lexer.remainder().find("*/") {
        Some(end) => {
            lexer.bump(end + 2);
            true
        }
        None => {
            lexer.bump(lexer.remainder().len());
            false
        }
    }
}

/// Maximum number of errors to collect before stopping.
const MAX_ERRORS: usize = 20;

/// The lexer for expression source text.
pub struct Lexer<'a> {
    source: &'a str,
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, errors: Vec::new() }
    }

    /// Tokenize the entire source, collecting multiple errors.
    pub fn tokenize(&mut self) -> LexResult {
        let mut tokens = Vec::new();
        let mut raw_lexer = RawToken::lexer(self.source);

        while let Some(result) = raw_lexer.next() {
            if self.errors.len() >= MAX_ERRORS {
                break;
            }

            let span = raw_lexer.span();
            let slice = raw_lexer.slice();

            let kind = match result {
                Ok(RawToken::BlockComment(true)) => continue,
                Ok(RawToken::BlockComment(false)) => {
                    self.errors.push(LexError::unterminated_comment(span.start, span.end));
                    continue;
                }
                Ok(raw) => match convert_token(raw, slice, span.start, span.end) {
                    Ok(kind) => kind,
                    Err(e) => {
                        self.errors.push(e);
                        continue;
                    }
                },
                Err(()) => {
                    let ch = self.source.get(span.start..).and_then(|s| s.chars().next()).unwrap_or('?');
                    self.errors.push(LexError::unexpected_char(ch, span.start));
                    continue;
                }
            };

            tokens.push(Token {
                kind,
                span: Span::new(span.start, span.end),
            });
        }

        tokens.push(Token {
            kind: TokenKind::Eof,
            span: Span::new(self.source.len(), self.source.len()),
        });

        LexResult {
            tokens,
            errors: std::mem::take(&mut self.errors),
        }
    }
}

/// Convert a raw logos token to a [`TokenKind`], parsing literal values.
fn convert_token(raw: RawToken, slice: &str, start: usize, end: usize) -> Result<TokenKind, LexError> {
    Ok(match raw {
        RawToken::Function => TokenKind::Function,
        RawToken::Return => TokenKind::Return,
        RawToken::Typeof => TokenKind::Typeof,
        RawToken::Void => TokenKind::Void,
        RawToken::In => TokenKind::In,
        RawToken::True => TokenKind::Bool(true),
        RawToken::False => TokenKind::Bool(false),
        RawToken::Null => TokenKind::Null,
        RawToken::Undefined => TokenKind::Undefined,

        RawToken::EqEqEq => TokenKind::EqEqEq,
        RawToken::BangEqEq => TokenKind::BangEqEq,
        RawToken::GtGtGt => TokenKind::GtGtGt,
        RawToken::StarStar => TokenKind::StarStar,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::BangEq => TokenKind::BangEq,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::LtLt => TokenKind::LtLt,
        RawToken::GtGt => TokenKind::GtGt,
        RawToken::AmpAmp => TokenKind::AmpAmp,
        RawToken::PipePipe => TokenKind::PipePipe,
        RawToken::QuestionQuestion => TokenKind::QuestionQuestion,
        RawToken::FatArrow => TokenKind::FatArrow,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::Eq => TokenKind::Eq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::Gt => TokenKind::Gt,
        RawToken::Amp => TokenKind::Amp,
        RawToken::Pipe => TokenKind::Pipe,
        RawToken::Caret => TokenKind::Caret,
        RawToken::Tilde => TokenKind::Tilde,
        RawToken::Bang => TokenKind::Bang,
        RawToken::Question => TokenKind::Question,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Dot => TokenKind::Dot,

        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Semi => TokenKind::Semi,

        RawToken::DecNumber | RawToken::Float => {
            let cleaned: String = slice.chars().filter(|c| *c != '_').collect();
            let value = cleaned.parse::<f64>().map_err(|_| LexError::invalid_number(start, end))?;
            TokenKind::Number(value)
        }
        RawToken::HexNumber => TokenKind::Number(parse_radix(slice, 16, start, end)?),
        RawToken::BinNumber => TokenKind::Number(parse_radix(slice, 2, start, end)?),
        RawToken::OctNumber => TokenKind::Number(parse_radix(slice, 8, start, end)?),
        RawToken::String => {
            let inner = &slice[1..slice.len() - 1];
            TokenKind::String(parse_string(inner, start)?)
        }
        RawToken::Ident => TokenKind::Ident(slice.to_string()),

        RawToken::LineComment | RawToken::BlockComment(_) => {
            unreachable!("comments are filtered before conversion")
        }
    })
}

/// Parse a prefixed integer literal (`0x`, `0b`, `0o`).
fn parse_radix(slice: &str, radix: u32, start: usize, end: usize) -> Result<f64, LexError> {
    let cleaned: String = slice[2..].chars().filter(|c| *c != '_').collect();
    u64::from_str_radix(&cleaned, radix)
        .map(|n| n as f64)
        .map_err(|_| LexError::invalid_number(start, end))
}

/// Parse a string literal body (handling escape sequences).
fn parse_string(s: &str, pos: usize) -> Result<String, LexError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            result.push(parse_escape(&mut chars, pos)?);
        } else {
            result.push(c);
        }
    }

    Ok(result)
}

fn parse_escape(chars: &mut impl Iterator<Item = char>, pos: usize) -> Result<char, LexError> {
    match chars.next() {
        Some('n') => Ok('\n'),
        Some('r') => Ok('\r'),
        Some('t') => Ok('\t'),
        Some('\\') => Ok('\\'),
        Some('0') => Ok('\0'),
        Some('\'') => Ok('\''),
        Some('"') => Ok('"'),
        Some('u') => parse_unicode_escape(chars, pos),
        _ => Err(LexError::invalid_escape(pos)),
    }
}

/// Parse `\u{XXXX}` (1-6 hex digits).
fn parse_unicode_escape(chars: &mut impl Iterator<Item = char>, pos: usize) -> Result<char, LexError> {
    if chars.next() != Some('{') {
        return Err(LexError::invalid_escape(pos));
    }

    let mut hex = String::new();
    loop {
        match chars.next() {
            Some('}') => break,
            Some(c) if c.is_ascii_hexdigit() && hex.len() < 6 => hex.push(c),
            _ => return Err(LexError::invalid_escape(pos)),
        }
    }

    let code_point = u32::from_str_radix(&hex, 16).map_err(|_| LexError::invalid_escape(pos))?;
    char::from_u32(code_point).ok_or(LexError::invalid_escape(pos))
}

/// Result of lexing: tokens plus any errors found.
#[derive(Debug)]
pub struct LexResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
}

impl LexResult {
    /// Returns true if lexing completed without errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A lexer error with location and friendly message.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct LexError {
    pub span: Span,
    pub message: String,
    pub hint: Option<String>,
}

impl LexError {
    fn unexpected_char(ch: char, pos: usize) -> Self {
        Self {
            span: Span::new(pos, pos + ch.len_utf8()),
            message: format!("Unexpected character '{}'", ch),
            hint: match ch {
                '"' | '\'' => Some("strings must close on the same line".to_string()),
                '`' => Some("template literals are not part of lambda form".to_string()),
                _ => None,
            },
        }
    }

    fn unterminated_comment(start: usize, end: usize) -> Self {
        Self {
            span: Span::new(start, end),
            message: "Unterminated block comment".to_string(),
            hint: Some("close the comment with '*/'".to_string()),
        }
    }

    fn invalid_escape(pos: usize) -> Self {
        Self {
            span: Span::new(pos, pos + 1),
            message: "Invalid escape sequence".to_string(),
            hint: Some("Valid: \\n \\r \\t \\\\ \\0 \\' \\\" \\u{...}".to_string()),
        }
    }

    fn invalid_number(start: usize, end: usize) -> Self {
        Self {
            span: Span::new(start, end),
            message: "Invalid number".to_string(),
            hint: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn doesnt_crash(s in "\\PC*") {
            let result = Lexer::new(&s).tokenize();
            prop_assert!(matches!(result.tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)));
        }
    }

    fn kinds(src: &str) -> Vec<TokenKind> {
        let result = Lexer::new(src).tokenize();
        assert!(result.is_ok(), "Lex errors: {:?}", result.errors);
        result.tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn namespace_identifier_is_a_name() {
        assert_eq!(
            kinds("δ[fetch]"),
            vec![
                TokenKind::Ident("δ".into()),
                TokenKind::LBracket,
                TokenKind::Ident("fetch".into()),
                TokenKind::RBracket,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn longest_operator_wins() {
        assert_eq!(
            kinds("a === b !== c >>> d ** e"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::EqEqEq,
                TokenKind::Ident("b".into()),
                TokenKind::BangEqEq,
                TokenKind::Ident("c".into()),
                TokenKind::GtGtGt,
                TokenKind::Ident("d".into()),
                TokenKind::StarStar,
                TokenKind::Ident("e".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(
            kinds("1_000 0x1F 0b101 0o17 2.5e3 .5"),
            vec![
                TokenKind::Number(1000.0),
                TokenKind::Number(31.0),
                TokenKind::Number(5.0),
                TokenKind::Number(15.0),
                TokenKind::Number(2500.0),
                TokenKind::Number(0.5),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn strings_and_escapes() {
        assert_eq!(
            kinds(r#"'it\'s' "a\u{3b4}\n""#),
            vec![
                TokenKind::String("it's".into()),
                TokenKind::String("aδ\n".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keywords_do_not_swallow_longer_names() {
        assert_eq!(
            kinds("undefinedValue in inner"),
            vec![
                TokenKind::Ident("undefinedValue".into()),
                TokenKind::In,
                TokenKind::Ident("inner".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("a /* note */ + // trailing\n b"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Plus,
                TokenKind::Ident("b".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_comment_is_an_error() {
        let result = Lexer::new("a /* open").tokenize();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].message, "Unterminated block comment");
    }

    #[test]
    fn unexpected_character_reports_span() {
        let result = Lexer::new("a # b").tokenize();
        assert!(!result.is_ok());
        assert_eq!(result.errors[0].span, Span::new(2, 3));
        // Lexing continues past the bad character.
        assert_eq!(result.tokens.len(), 3);
    }
}
