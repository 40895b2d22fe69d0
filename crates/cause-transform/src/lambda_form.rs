// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The lambda-form step that runs before the rewrite.
//!
//! A [`Normalize`] implementation takes a parsed expression and returns it
//! in lambda form along with the names it reads but does not bind. The
//! default, [`LambdaForm`], accepts input that is already in lambda form:
//! it rejects rewriter-only nodes and computes free variables.

use cause_ast::expr::{Expr, ExprKind};
use cause_ast::DEFAULT_NAMESPACE;
use indexmap::IndexSet;

use crate::error::TransformError;
use crate::symbols::Symbols;

/// A validated tree and the free variables it reads, in first-use order.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub expr: Expr,
    pub free: IndexSet<String>,
}

pub trait Normalize {
    fn normalize(&self, expr: Expr, symbols: &Symbols) -> Result<Normalized, TransformError>;
}

/// Validates lambda form and collects free variables.
#[derive(Debug, Clone)]
pub struct LambdaForm {
    namespace: String,
}

impl LambdaForm {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self { namespace: namespace.into() }
    }
}

impl Default for LambdaForm {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl Normalize for LambdaForm {
    fn normalize(&self, expr: Expr, symbols: &Symbols) -> Result<Normalized, TransformError> {
        let mut scan = Scan {
            namespace: &self.namespace,
            symbols,
            bound: Vec::new(),
            free: IndexSet::new(),
        };
        scan.expr(&expr)?;
        let free = scan.free;
        Ok(Normalized { expr, free })
    }
}

struct Scan<'a> {
    namespace: &'a str,
    symbols: &'a Symbols,
    /// Names bound by enclosing functions, innermost last.
    bound: Vec<&'a str>,
    free: IndexSet<String>,
}

impl<'a> Scan<'a> {
    fn is_bound(&self, name: &str) -> bool {
        name == self.namespace
            || self.symbols.contains(name)
            || self.bound.iter().any(|b| *b == name)
    }

    fn expr(&mut self, expr: &'a Expr) -> Result<(), TransformError> {
        match &expr.kind {
            ExprKind::Number(_)
            | ExprKind::String(_)
            | ExprKind::Bool(_)
            | ExprKind::Null
            | ExprKind::Undefined => Ok(()),
            ExprKind::Ident(name) => {
                if !self.is_bound(name) {
                    self.free.insert(name.clone());
                }
                Ok(())
            }
            ExprKind::Unary { operand, .. } => self.expr(operand),
            ExprKind::Binary { left, right, .. } | ExprKind::Logical { left, right, .. } => {
                self.expr(left)?;
                self.expr(right)
            }
            ExprKind::Call { callee, args } => {
                self.expr(callee)?;
                args.iter().try_for_each(|a| self.expr(a))
            }
            ExprKind::Conditional { test, consequent, alternate } => {
                self.expr(test)?;
                self.expr(consequent)?;
                self.expr(alternate)
            }
            ExprKind::Array(elements) => elements.iter().try_for_each(|e| self.expr(e)),
            ExprKind::Member { object, property, computed } => {
                self.expr(object)?;
                if *computed {
                    self.expr(property)?;
                }
                Ok(())
            }
            ExprKind::Function { name, params, body, .. } => {
                let mark = self.bound.len();
                if let Some(name) = name {
                    self.bound.push(name);
                }
                for param in params {
                    self.bound.push(&param.name);
                }
                let result = params
                    .iter()
                    .filter_map(|p| p.default.as_ref())
                    .try_for_each(|d| self.expr(d))
                    .and_then(|()| self.expr(body));
                self.bound.truncate(mark);
                result
            }
            ExprKind::Success(_) => Err(not_lambda_form("success", expr)),
            ExprKind::Wrap { .. } => Err(not_lambda_form("wrap", expr)),
            ExprKind::Depend { .. } => Err(not_lambda_form("depend", expr)),
            ExprKind::Operator(_) => Err(not_lambda_form("operator", expr)),
            ExprKind::Intrinsic(_) => Err(not_lambda_form("intrinsic", expr)),
        }
    }
}

fn not_lambda_form(form: &'static str, expr: &Expr) -> TransformError {
    TransformError::NotLambdaForm { form, span: expr.span }
}
