// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Bottom-up fold over expression trees.
//!
//! [`Folder::fold`] dispatches each node kind to a [`Rules`] handler. The
//! handler receives the folder itself so it decides which children to fold
//! and in what order. Leaves pass through unchanged as [`Type::Value`].

use cause_ast::expr::{BinOp, Expr, ExprKind, LogicalOp, Param, UnaryOp};
use cause_types::Type;

use crate::error::TransformError;

/// A rewritten node together with its type.
#[derive(Debug, Clone, PartialEq)]
pub struct Folded {
    pub ty: Type,
    pub expr: Expr,
}

impl Folded {
    pub fn new(ty: Type, expr: Expr) -> Self {
        Self { ty, expr }
    }
}

pub type FoldResult = Result<Folded, TransformError>;

/// Handlers for every composite surface kind.
///
/// `expr` is the original node; the remaining arguments are its fields.
pub trait Rules {
    fn unary(&self, folder: &Folder<'_>, expr: &Expr, op: UnaryOp, operand: &Expr) -> FoldResult;

    fn binary(&self, folder: &Folder<'_>, expr: &Expr, op: BinOp, left: &Expr, right: &Expr) -> FoldResult;

    fn logical(&self, folder: &Folder<'_>, expr: &Expr, op: LogicalOp, left: &Expr, right: &Expr) -> FoldResult;

    fn call(&self, folder: &Folder<'_>, expr: &Expr, callee: &Expr, args: &[Expr]) -> FoldResult;

    fn conditional(
        &self,
        folder: &Folder<'_>,
        expr: &Expr,
        test: &Expr,
        consequent: &Expr,
        alternate: &Expr,
    ) -> FoldResult;

    fn array(&self, folder: &Folder<'_>, expr: &Expr, elements: &[Expr]) -> FoldResult;

    fn member(&self, folder: &Folder<'_>, expr: &Expr, object: &Expr, property: &Expr, computed: bool) -> FoldResult;

    fn function(
        &self,
        folder: &Folder<'_>,
        expr: &Expr,
        name: Option<&str>,
        params: &[Param],
        body: &Expr,
        arrow: bool,
    ) -> FoldResult;
}

/// The recursive driver. Cheap to copy; holds only the rule set.
#[derive(Clone, Copy)]
pub struct Folder<'r> {
    rules: &'r dyn Rules,
}

impl<'r> Folder<'r> {
    pub fn new(rules: &'r dyn Rules) -> Self {
        Self { rules }
    }

    pub fn fold(&self, expr: &Expr) -> FoldResult {
        let rules = self.rules;
        match &expr.kind {
            ExprKind::Number(_)
            | ExprKind::String(_)
            | ExprKind::Bool(_)
            | ExprKind::Null
            | ExprKind::Undefined
            | ExprKind::Ident(_) => Ok(Folded::new(Type::Value, expr.clone())),

            ExprKind::Unary { op, operand } => rules.unary(self, expr, *op, operand),
            ExprKind::Binary { op, left, right } => rules.binary(self, expr, *op, left, right),
            ExprKind::Logical { op, left, right } => rules.logical(self, expr, *op, left, right),
            ExprKind::Call { callee, args } => rules.call(self, expr, callee, args),
            ExprKind::Conditional { test, consequent, alternate } => {
                rules.conditional(self, expr, test, consequent, alternate)
            }
            ExprKind::Array(elements) => rules.array(self, expr, elements),
            ExprKind::Member { object, property, computed } => {
                rules.member(self, expr, object, property, *computed)
            }
            ExprKind::Function { name, params, body, arrow } => {
                rules.function(self, expr, name.as_deref(), params, body, *arrow)
            }

            // Already-rewritten forms keep their shape and fixed type.
            ExprKind::Success(value) => {
                let value = self.fold(value)?.expr;
                Ok(Folded::new(Type::State, rebuild(expr, ExprKind::Success(Box::new(value)))))
            }
            ExprKind::Wrap { callee, args } => {
                let callee = Box::new(self.fold(callee)?.expr);
                let args = self.fold_exprs(args)?;
                Ok(Folded::new(Type::State, rebuild(expr, ExprKind::Wrap { callee, args })))
            }
            ExprKind::Depend { lifted, callee, args } => {
                let callee = Box::new(self.fold(callee)?.expr);
                let args = self.fold_exprs(args)?;
                Ok(Folded::new(
                    Type::State,
                    rebuild(expr, ExprKind::Depend { lifted: *lifted, callee, args }),
                ))
            }
            ExprKind::Operator(_) | ExprKind::Intrinsic(_) => Ok(Folded::new(Type::Value, expr.clone())),
        }
    }

    /// Fold each expression, keeping only the rewritten nodes.
    pub fn fold_exprs(&self, exprs: &[Expr]) -> Result<Vec<Expr>, TransformError> {
        exprs.iter().map(|e| self.fold(e).map(|f| f.expr)).collect()
    }
}

/// A node that replaces `original` in place, keeping its id and span.
pub fn rebuild(original: &Expr, kind: ExprKind) -> Expr {
    Expr::new(original.id, kind, original.span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cause_ast::{NodeId, Span};

    /// Rules that rebuild every node unchanged and type it `Value`.
    struct Identity;

    impl Rules for Identity {
        fn unary(&self, f: &Folder<'_>, e: &Expr, op: UnaryOp, operand: &Expr) -> FoldResult {
            let operand = Box::new(f.fold(operand)?.expr);
            Ok(Folded::new(Type::Value, rebuild(e, ExprKind::Unary { op, operand })))
        }
        fn binary(&self, f: &Folder<'_>, e: &Expr, op: BinOp, l: &Expr, r: &Expr) -> FoldResult {
            let left = Box::new(f.fold(l)?.expr);
            let right = Box::new(f.fold(r)?.expr);
            Ok(Folded::new(Type::Value, rebuild(e, ExprKind::Binary { op, left, right })))
        }
        fn logical(&self, f: &Folder<'_>, e: &Expr, op: LogicalOp, l: &Expr, r: &Expr) -> FoldResult {
            let left = Box::new(f.fold(l)?.expr);
            let right = Box::new(f.fold(r)?.expr);
            Ok(Folded::new(Type::Value, rebuild(e, ExprKind::Logical { op, left, right })))
        }
        fn call(&self, _: &Folder<'_>, e: &Expr, _: &Expr, _: &[Expr]) -> FoldResult {
            Ok(Folded::new(Type::State, e.clone()))
        }
        fn conditional(&self, _: &Folder<'_>, e: &Expr, _: &Expr, _: &Expr, _: &Expr) -> FoldResult {
            Ok(Folded::new(Type::Value, e.clone()))
        }
        fn array(&self, _: &Folder<'_>, e: &Expr, _: &[Expr]) -> FoldResult {
            Ok(Folded::new(Type::Value, e.clone()))
        }
        fn member(&self, _: &Folder<'_>, e: &Expr, _: &Expr, _: &Expr, _: bool) -> FoldResult {
            Ok(Folded::new(Type::Value, e.clone()))
        }
        fn function(
            &self,
            _: &Folder<'_>,
            e: &Expr,
            _: Option<&str>,
            _: &[Param],
            _: &Expr,
            _: bool,
        ) -> FoldResult {
            Ok(Folded::new(Type::value_to_value(), e.clone()))
        }
    }

    fn node(kind: ExprKind) -> Expr {
        Expr::new(NodeId(0), kind, Span::new(0, 1))
    }

    #[test]
    fn leaves_pass_through_as_value() {
        let folder = Folder::new(&Identity);
        for kind in [ExprKind::Number(1.0), ExprKind::Null, ExprKind::Ident("x".into())] {
            let expr = node(kind);
            let folded = folder.fold(&expr).unwrap();
            assert_eq!(folded.ty, Type::Value);
            assert_eq!(folded.expr, expr);
        }
    }

    #[test]
    fn handlers_see_folded_children() {
        let call = node(ExprKind::Call { callee: Box::new(node(ExprKind::Ident("f".into()))), args: vec![] });
        let expr = node(ExprKind::Unary { op: UnaryOp::Not, operand: Box::new(call) });
        let folded = Folder::new(&Identity).fold(&expr).unwrap();
        assert_eq!(folded.ty, Type::Value);
        assert_eq!(folded.expr, expr);
    }

    #[test]
    fn runtime_forms_have_fixed_types() {
        let folder = Folder::new(&Identity);
        let success = node(ExprKind::Success(Box::new(node(ExprKind::Number(1.0)))));
        assert_eq!(folder.fold(&success).unwrap().ty, Type::State);
        let operator = node(ExprKind::Operator("+".into()));
        assert_eq!(folder.fold(&operator).unwrap().ty, Type::Value);
    }
}
