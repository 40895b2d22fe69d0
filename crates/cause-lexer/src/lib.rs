//! Lexer for cause expressions.
//!
//! Tokenizes source text into a stream of tokens for the parser.

mod lexer;

pub use lexer::{LexError, LexResult, Lexer};
