// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Parser for cause expressions.
//!
//! Transforms a token stream into a single expression tree.

mod hints;
mod parser;

pub use parser::{ParseError, ParseResult, Parser};

/// Lex and parse `source`. Lexer errors are reported as parse errors and
/// stop before parsing.
pub fn parse_source(source: &str) -> ParseResult {
    let lex_result = cause_lexer::Lexer::new(source).tokenize();
    if !lex_result.is_ok() {
        return ParseResult {
            expr: None,
            errors: lex_result.errors.into_iter().map(ParseError::from).collect(),
        };
    }
    Parser::new(lex_result.tokens).parse()
}
