// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Error hints - suggestions for fixing common mistakes.
//!
//! Kept separate from the main parser to avoid clutter.

use cause_ast::token::TokenKind;

/// Get a hint for an "expected X" error based on context.
pub fn for_expected(expected: &str, found: &TokenKind) -> Option<&'static str> {
    match (expected, found) {
        // Function body hints
        ("'{'", _) => Some("function bodies look like '{ return expr; }'"),
        ("'}'", TokenKind::Semi) => Some("a body holds a single 'return' statement"),
        ("'}'", _) => Some("every '{' needs a matching '}'"),
        ("'return'", _) => Some("lambda form allows only '{ return expr; }' in a body"),
        ("'=>'", _) => Some("arrow functions are written '(a, b) => expr'"),

        // Parentheses hints
        ("')'", TokenKind::Eof) => Some("add ')' to close the parenthesis"),
        ("')'", _) => None,

        // Bracket hints
        ("']'", TokenKind::Eof) => Some("add ']' to close the bracket"),
        ("']'", _) => None,

        ("':'", _) => Some("a conditional needs both branches: test ? a : b"),

        // Expression hints
        ("expression", TokenKind::Eq) => Some("assignment is not an expression in lambda form"),
        ("expression", TokenKind::Semi) => Some("only a single expression is accepted"),
        ("expression", TokenKind::Eof) => Some("the expression is incomplete"),
        ("expression", _) => Some("try a value, variable, or function call"),

        // Name hints
        ("a name", TokenKind::Number(_)) => Some("names can't start with a number"),
        ("a name", _) => Some("names start with a letter, '_' or '$'"),
        ("property name", _) => Some("use o[expr] for computed properties"),

        ("end of input", TokenKind::Semi) => Some("statements are not supported; pass one expression"),
        ("end of input", _) => Some("only a single expression is accepted"),

        _ => None,
    }
}
