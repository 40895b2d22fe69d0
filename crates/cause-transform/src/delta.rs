// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Delta-expression recognition.
//!
//! A delta expression names a State-producing function through the
//! namespace identifier:
//!
//! - `δ[name]` reads as `name`;
//! - `expr.δ[name]` reads as `expr.name`.
//!
//! Both are typed `Function(Value -> State)` by the member rule.

use cause_ast::expr::{Expr, ExprKind};

/// If `expr` is a delta expression, return it with the namespace hop
/// removed. Anything else yields `None`.
pub fn recognize(expr: &Expr, namespace: &str) -> Option<Expr> {
    let ExprKind::Member { object, property, computed: true } = &expr.kind else {
        return None;
    };
    let name = property.as_ident()?;

    match &object.kind {
        // δ[name]
        ExprKind::Ident(ns) if ns == namespace => Some(Expr::new(
            expr.id,
            ExprKind::Ident(name.to_string()),
            property.span,
        )),
        // expr.δ[name]
        ExprKind::Member { object: inner, property: hop, computed: false }
            if hop.as_ident() == Some(namespace) =>
        {
            Some(Expr::new(
                expr.id,
                ExprKind::Member {
                    object: inner.clone(),
                    property: Box::new(Expr::new(property.id, ExprKind::Ident(name.to_string()), property.span)),
                    computed: false,
                },
                expr.span,
            ))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cause_ast::DEFAULT_NAMESPACE;

    fn parse(src: &str) -> Expr {
        cause_parser::parse_source(src).expr.unwrap()
    }

    fn recognized(src: &str) -> Option<String> {
        recognize(&parse(src), DEFAULT_NAMESPACE).map(|e| e.to_string())
    }

    #[test]
    fn bare_delta() {
        assert_eq!(recognized("δ[fetch]").as_deref(), Some("fetch"));
    }

    #[test]
    fn delta_through_member() {
        assert_eq!(recognized("response.δ[json]").as_deref(), Some("response.json"));
        assert_eq!(recognized("a.b.δ[c]").as_deref(), Some("a.b.c"));
    }

    #[test]
    fn not_delta() {
        assert_eq!(recognized("δ.fetch"), None);
        assert_eq!(recognized("δ[\"fetch\"]"), None);
        assert_eq!(recognized("other[fetch]"), None);
        assert_eq!(recognized("a[δ][b]"), None);
        assert_eq!(recognized("a.b[c]"), None);
    }

    #[test]
    fn custom_namespace() {
        let expr = parse("ns[fetch]");
        assert_eq!(recognize(&expr, "ns").map(|e| e.to_string()).as_deref(), Some("fetch"));
        assert_eq!(recognize(&expr, DEFAULT_NAMESPACE), None);
    }
}
