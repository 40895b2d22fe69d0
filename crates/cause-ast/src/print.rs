// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Source printer for expression trees.
//!
//! Emits JavaScript-like text with the fewest parentheses that keep the
//! tree's shape. Runtime forms are printed as calls on the namespace
//! identifier, e.g. `δ.depend(true, δ.operators["+"], a, δ.success(b))`.

use std::fmt::{self, Write};

use crate::expr::{Expr, ExprKind, LogicalOp, Param, UnaryOp};
use crate::DEFAULT_NAMESPACE;

const PREC_ARROW: u8 = 2;
const PREC_CONDITIONAL: u8 = 3;
const PREC_UNARY: u8 = 15;
const PREC_POSTFIX: u8 = 18;
const PREC_PRIMARY: u8 = 20;

pub struct Printer {
    namespace: String,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl Printer {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self { namespace: namespace.into() }
    }

    pub fn print(&self, expr: &Expr) -> String {
        let mut out = String::new();
        self.expr(&mut out, expr, 0);
        out
    }

    fn expr(&self, out: &mut String, expr: &Expr, min: u8) {
        let prec = precedence(expr);
        if prec < min {
            out.push('(');
            self.bare(out, expr);
            out.push(')');
        } else {
            self.bare(out, expr);
        }
    }

    fn bare(&self, out: &mut String, expr: &Expr) {
        let ns = self.namespace.as_str();
        match &expr.kind {
            ExprKind::Number(n) => out.push_str(&format_number(*n)),
            ExprKind::String(s) => quote(out, s),
            ExprKind::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            ExprKind::Null => out.push_str("null"),
            ExprKind::Undefined => out.push_str("undefined"),
            ExprKind::Ident(name) => out.push_str(name),
            ExprKind::Unary { op, operand } => {
                out.push_str(op.symbol());
                if matches!(op, UnaryOp::Typeof | UnaryOp::Void) {
                    out.push(' ');
                }
                // `- -x` and `-(-1)` must not collapse into `--x`.
                let nested_sign = match &operand.kind {
                    ExprKind::Unary { op: UnaryOp::Neg | UnaryOp::Plus, .. } => true,
                    ExprKind::Number(n) => n.is_sign_negative(),
                    _ => false,
                };
                let min = if nested_sign { PREC_PRIMARY + 1 } else { PREC_UNARY };
                self.expr(out, operand, min);
            }
            ExprKind::Binary { op, left, right } => {
                let prec = op.precedence();
                // `-a ** b` is a syntax error; a unary base needs parentheses.
                let (left_min, right_min) = if prec == 14 {
                    (PREC_UNARY + 1, prec)
                } else {
                    (prec, prec + 1)
                };
                self.expr(out, left, left_min);
                let _ = write!(out, " {} ", op.symbol());
                self.expr(out, right, right_min);
            }
            ExprKind::Logical { op, left, right } => {
                let prec = op.precedence();
                self.logical_operand(out, *op, left, prec);
                let _ = write!(out, " {} ", op.symbol());
                self.logical_operand(out, *op, right, prec + 1);
            }
            ExprKind::Call { callee, args } => {
                self.expr(out, callee, PREC_POSTFIX);
                self.args(out, args);
            }
            ExprKind::Conditional { test, consequent, alternate } => {
                self.expr(out, test, PREC_CONDITIONAL + 1);
                out.push_str(" ? ");
                self.expr(out, consequent, PREC_ARROW);
                out.push_str(" : ");
                self.expr(out, alternate, PREC_ARROW);
            }
            ExprKind::Array(elements) => {
                out.push('[');
                self.list(out, elements);
                out.push(']');
            }
            ExprKind::Member { object, property, computed } => {
                if matches!(object.kind, ExprKind::Number(_)) {
                    self.expr(out, object, PREC_PRIMARY + 1);
                } else {
                    self.expr(out, object, PREC_POSTFIX);
                }
                match (computed, property.as_ident()) {
                    (false, Some(name)) => {
                        out.push('.');
                        out.push_str(name);
                    }
                    _ => {
                        out.push('[');
                        self.expr(out, property, 0);
                        out.push(']');
                    }
                }
            }
            ExprKind::Function { name, params, body, arrow } => {
                if *arrow {
                    self.params(out, params);
                    out.push_str(" => ");
                    self.expr(out, body, PREC_ARROW);
                } else {
                    out.push_str("function");
                    if let Some(name) = name {
                        out.push(' ');
                        out.push_str(name);
                    }
                    self.params(out, params);
                    out.push_str(" { return ");
                    self.expr(out, body, 0);
                    out.push_str("; }");
                }
            }
            ExprKind::Success(value) => {
                let _ = write!(out, "{ns}.success(");
                self.expr(out, value, PREC_ARROW);
                out.push(')');
            }
            ExprKind::Wrap { callee, args } => {
                let _ = write!(out, "{ns}(");
                self.expr(out, callee, PREC_POSTFIX);
                self.args(out, args);
                out.push(')');
            }
            ExprKind::Depend { lifted, callee, args } => {
                let _ = write!(out, "{ns}.depend({lifted}, ");
                self.expr(out, callee, PREC_ARROW);
                for arg in args {
                    out.push_str(", ");
                    self.expr(out, arg, PREC_ARROW);
                }
                out.push(')');
            }
            ExprKind::Operator(name) => {
                let _ = write!(out, "{ns}.operators[");
                quote(out, name);
                out.push(']');
            }
            ExprKind::Intrinsic(intrinsic) => {
                let _ = write!(out, "{ns}[");
                quote(out, intrinsic.name());
                out.push(']');
            }
        }
    }

    /// `??` cannot be mixed with `&&` or `||` without parentheses.
    fn logical_operand(&self, out: &mut String, parent: LogicalOp, operand: &Expr, min: u8) {
        if let ExprKind::Logical { op, .. } = &operand.kind {
            let mixes_coalesce = *op != parent
                && (*op == LogicalOp::Coalesce || parent == LogicalOp::Coalesce);
            if mixes_coalesce {
                out.push('(');
                self.bare(out, operand);
                out.push(')');
                return;
            }
        }
        self.expr(out, operand, min);
    }

    fn args(&self, out: &mut String, args: &[Expr]) {
        out.push('(');
        self.list(out, args);
        out.push(')');
    }

    fn list(&self, out: &mut String, items: &[Expr]) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.expr(out, item, PREC_ARROW);
        }
    }

    fn params(&self, out: &mut String, params: &[Param]) {
        out.push('(');
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&param.name);
            if let Some(default) = &param.default {
                out.push_str(" = ");
                self.expr(out, default, PREC_ARROW);
            }
        }
        out.push(')');
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Printer::default().print(self))
    }
}

fn precedence(expr: &Expr) -> u8 {
    match &expr.kind {
        ExprKind::Function { .. } => PREC_ARROW,
        ExprKind::Conditional { .. } => PREC_CONDITIONAL,
        ExprKind::Logical { op, .. } => op.precedence(),
        ExprKind::Binary { op, .. } => op.precedence(),
        ExprKind::Unary { .. } => PREC_UNARY,
        ExprKind::Number(n) if n.is_sign_negative() && !n.is_nan() => PREC_UNARY,
        ExprKind::Call { .. }
        | ExprKind::Member { .. }
        | ExprKind::Success(_)
        | ExprKind::Wrap { .. }
        | ExprKind::Depend { .. }
        | ExprKind::Operator(_)
        | ExprKind::Intrinsic(_) => PREC_POSTFIX,
        ExprKind::Number(_)
        | ExprKind::String(_)
        | ExprKind::Bool(_)
        | ExprKind::Null
        | ExprKind::Undefined
        | ExprKind::Ident(_)
        | ExprKind::Array(_) => PREC_PRIMARY,
    }
}

/// Format a number the way JavaScript prints numeric literals.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 && n.is_sign_negative() {
        "-0".to_string()
    } else {
        format!("{}", n)
    }
}

fn quote(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{{{:x}}}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{BinOp, Intrinsic};
    use crate::Span;

    fn node(kind: ExprKind) -> Expr {
        Expr::synthetic(kind, Span::default())
    }

    fn ident(name: &str) -> Expr {
        node(ExprKind::Ident(name.to_string()))
    }

    fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
        node(ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) })
    }

    #[test]
    fn parenthesizes_by_precedence() {
        let sum = binary(BinOp::Add, ident("a"), ident("b"));
        let product = binary(BinOp::Mul, sum.clone(), ident("c"));
        assert_eq!(product.to_string(), "(a + b) * c");

        let right_nested = binary(BinOp::Sub, ident("a"), sum);
        assert_eq!(right_nested.to_string(), "a - (a + b)");
    }

    #[test]
    fn power_is_right_associative() {
        let inner = binary(BinOp::Pow, ident("b"), ident("c"));
        assert_eq!(binary(BinOp::Pow, ident("a"), inner.clone()).to_string(), "a ** b ** c");
        assert_eq!(binary(BinOp::Pow, inner, ident("a")).to_string(), "(b ** c) ** a");
    }

    #[test]
    fn runtime_forms_use_namespace() {
        let depend = node(ExprKind::Depend {
            lifted: false,
            callee: Box::new(node(ExprKind::Intrinsic(Intrinsic::If))),
            args: vec![
                ident("t"),
                node(ExprKind::Success(Box::new(node(ExprKind::Operator("+".into()))))),
            ],
        });
        assert_eq!(depend.to_string(), r#"δ.depend(false, δ["if"], t, δ.success(δ.operators["+"]))"#);
        assert_eq!(
            Printer::new("ns").print(&depend),
            r#"ns.depend(false, ns["if"], t, ns.success(ns.operators["+"]))"#
        );
    }

    #[test]
    fn member_and_numbers() {
        let member = node(ExprKind::Member {
            object: Box::new(node(ExprKind::Number(1.0))),
            property: Box::new(ident("x")),
            computed: false,
        });
        assert_eq!(member.to_string(), "(1).x");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
    }

    #[test]
    fn strings_are_escaped() {
        let s = node(ExprKind::String("a\"b\n".into()));
        assert_eq!(s.to_string(), r#""a\"b\n""#);
    }
}
