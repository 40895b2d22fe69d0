// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The State/Value rewrite rules.
//!
//! Every composite node is treated as a call: its operands are folded and
//! their types combined. When nothing is State the node is rebuilt from the
//! folded operands. When something is State the node becomes a
//! dependency-construction call, `δ.depend(lifted, callee, args...)`, with
//! every plain operand lifted through `δ.success`.

use cause_ast::expr::{
    BinOp, Expr, ExprKind, Intrinsic, LogicalOp, Param, UnaryOp, ARRAY_OPERATOR, MEMBER_OPERATOR,
};
use cause_ast::{Span, DEFAULT_NAMESPACE};
use cause_types::{NonFunction, Type};
use log::debug;

use crate::delta;
use crate::error::TransformError;
use crate::fold::{rebuild, FoldResult, Folded, Folder, Rules};

/// The rewrite rules, parameterized by the namespace identifier used for
/// delta expressions.
#[derive(Debug, Clone)]
pub struct DeltaRules {
    namespace: String,
}

impl DeltaRules {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self { namespace: namespace.into() }
    }
}

impl Default for DeltaRules {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

/// Outcome of treating a node as a call.
enum Applied {
    /// At least one input is State. Operands are already lifted.
    Depend {
        lifted: bool,
        callee: Option<Expr>,
        args: Vec<Expr>,
    },
    /// Nothing is State; operands are folded but otherwise untouched.
    Direct {
        ty: Type,
        callee: Option<Folded>,
        args: Vec<Expr>,
    },
}

/// Fold `callee` (if any) and `args` and decide whether the call must go
/// through the dependency runtime. A missing callee counts as a plain value.
fn apply(folder: &Folder<'_>, callee: Option<&Expr>, args: &[&Expr]) -> Result<Applied, TransformError> {
    let callee = callee.map(|c| folder.fold(c)).transpose()?;
    let args = args
        .iter()
        .map(|a| folder.fold(a))
        .collect::<Result<Vec<_>, _>>()?;

    let callee_ty = callee.as_ref().map_or(Type::Value, |c| c.ty.clone());
    let arguments_ty = Type::concat_all(args.iter().map(|a| &a.ty));
    let dependencies_ty = callee_ty.concat(&arguments_ty);

    if dependencies_ty.is_state() {
        Ok(Applied::Depend {
            lifted: callee_ty != Type::to_state(),
            callee: callee.map(lift),
            args: args.into_iter().map(lift).collect(),
        })
    } else {
        Ok(Applied::Direct {
            ty: callee_ty.returns(),
            callee,
            args: args.into_iter().map(|a| a.expr).collect(),
        })
    }
}

/// Wrap a non-State node in `δ.success`.
fn lift(folded: Folded) -> Expr {
    match folded.ty.flatten() {
        NonFunction::State => folded.expr,
        NonFunction::Value => {
            let span = folded.expr.span;
            Expr::synthetic(ExprKind::Success(Box::new(folded.expr)), span)
        }
    }
}

fn depend(span: Span, lifted: bool, callee: Expr, args: Vec<Expr>) -> Folded {
    Folded::new(
        Type::State,
        Expr::synthetic(ExprKind::Depend { lifted, callee: Box::new(callee), args }, span),
    )
}

fn operator(name: &str, span: Span) -> Expr {
    Expr::synthetic(ExprKind::Operator(name.to_string()), span)
}

/// `() => body`, used to delay a conditional branch.
fn thunk(body: Expr) -> Expr {
    let span = body.span;
    Expr::synthetic(
        ExprKind::Function { name: None, params: Vec::new(), body: Box::new(body), arrow: true },
        span,
    )
}

impl DeltaRules {
    /// Shared shape of operator nodes: a Value result rebuilds the node from
    /// the folded operands, a State result depends on `δ.operators[name]`.
    fn operation(
        &self,
        folder: &Folder<'_>,
        expr: &Expr,
        name: &str,
        operands: &[&Expr],
        rebuild_kind: impl FnOnce(Vec<Expr>) -> ExprKind,
    ) -> FoldResult {
        match apply(folder, None, operands)? {
            Applied::Direct { ty, args, .. } => Ok(Folded::new(ty, rebuild(expr, rebuild_kind(args)))),
            Applied::Depend { lifted, args, .. } => {
                debug!("operator {:?} depends on State operands at {:?}", name, expr.span);
                Ok(depend(expr.span, lifted, operator(name, expr.span), args))
            }
        }
    }
}

/// Split the two folded operands of a binary-shaped node.
fn pair(args: Vec<Expr>) -> (Box<Expr>, Box<Expr>) {
    let mut args = args.into_iter();
    match (args.next(), args.next()) {
        (Some(left), Some(right)) => (Box::new(left), Box::new(right)),
        _ => unreachable!("binary operations fold exactly two operands"),
    }
}

fn single(args: Vec<Expr>) -> Box<Expr> {
    match args.into_iter().next() {
        Some(operand) => Box::new(operand),
        None => unreachable!("unary operations fold exactly one operand"),
    }
}

impl Rules for DeltaRules {
    fn unary(&self, folder: &Folder<'_>, expr: &Expr, op: UnaryOp, operand: &Expr) -> FoldResult {
        self.operation(folder, expr, op.operator_name(), &[operand], |args| ExprKind::Unary {
            op,
            operand: single(args),
        })
    }

    fn binary(&self, folder: &Folder<'_>, expr: &Expr, op: BinOp, left: &Expr, right: &Expr) -> FoldResult {
        self.operation(folder, expr, op.symbol(), &[left, right], |args| {
            let (left, right) = pair(args);
            ExprKind::Binary { op, left, right }
        })
    }

    fn logical(&self, folder: &Folder<'_>, expr: &Expr, op: LogicalOp, left: &Expr, right: &Expr) -> FoldResult {
        self.operation(folder, expr, op.symbol(), &[left, right], |args| {
            let (left, right) = pair(args);
            ExprKind::Logical { op, left, right }
        })
    }

    fn call(&self, folder: &Folder<'_>, expr: &Expr, callee: &Expr, args: &[Expr]) -> FoldResult {
        let args: Vec<&Expr> = args.iter().collect();
        match apply(folder, Some(callee), &args)? {
            Applied::Depend { lifted, callee, args } => {
                let Some(callee) = callee else {
                    unreachable!("calls always have a callee");
                };
                Ok(depend(expr.span, lifted, callee, args))
            }
            Applied::Direct { ty, callee, args } => {
                let Some(callee) = callee else {
                    unreachable!("calls always have a callee");
                };
                let kind = if callee.ty == Type::to_state() {
                    ExprKind::Wrap { callee: Box::new(callee.expr), args }
                } else {
                    ExprKind::Call { callee: Box::new(callee.expr), args }
                };
                Ok(Folded::new(ty, rebuild(expr, kind)))
            }
        }
    }

    fn conditional(
        &self,
        folder: &Folder<'_>,
        expr: &Expr,
        test: &Expr,
        consequent: &Expr,
        alternate: &Expr,
    ) -> FoldResult {
        let consequent = folder.fold(consequent)?;
        let alternate = folder.fold(alternate)?;

        // Equal function types survive so the result can still be called
        // through `wrap`; the join would flatten them to Value.
        let return_ty = if consequent.ty == alternate.ty {
            consequent.ty.clone()
        } else if consequent.ty.is_function() || alternate.ty.is_function() {
            return Err(TransformError::Undecidable {
                consequent: consequent.ty,
                alternate: alternate.ty,
                span: expr.span,
            });
        } else {
            consequent.ty.concat(&alternate.ty)
        };

        let (consequent, alternate) = if return_ty.is_state() {
            (lift(consequent), lift(alternate))
        } else {
            (consequent.expr, alternate.expr)
        };

        let test = folder.fold(test)?;
        if !test.ty.is_state() {
            let kind = ExprKind::Conditional {
                test: Box::new(test.expr),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            };
            return Ok(Folded::new(return_ty, rebuild(expr, kind)));
        }

        debug!("conditional waits on a State test at {:?}", expr.span);
        let branch = |body: Expr| {
            let span = body.span;
            Expr::synthetic(ExprKind::Success(Box::new(thunk(body))), span)
        };
        let callee = Expr::synthetic(ExprKind::Intrinsic(Intrinsic::If), expr.span);
        Ok(depend(
            expr.span,
            false,
            callee,
            vec![test.expr, branch(consequent), branch(alternate)],
        ))
    }

    fn array(&self, folder: &Folder<'_>, expr: &Expr, elements: &[Expr]) -> FoldResult {
        let elements: Vec<&Expr> = elements.iter().collect();
        self.operation(folder, expr, ARRAY_OPERATOR, &elements, ExprKind::Array)
    }

    fn member(&self, folder: &Folder<'_>, expr: &Expr, object: &Expr, property: &Expr, computed: bool) -> FoldResult {
        if let Some(stripped) = delta::recognize(expr, &self.namespace) {
            debug!("delta expression at {:?}", expr.span);
            let folded = folder.fold(&stripped)?;
            return Ok(Folded::new(Type::to_state(), folded.expr));
        }

        // A named property is passed to the runtime as its string key.
        let key;
        let property_operand = if computed {
            property
        } else {
            let name = property.as_ident().unwrap_or_default().to_string();
            key = Expr::synthetic(ExprKind::String(name), property.span);
            &key
        };

        match apply(folder, None, &[object, property_operand])? {
            Applied::Direct { ty, args, .. } => {
                let (object, folded_property) = pair(args);
                let property = if computed { folded_property } else { Box::new(property.clone()) };
                let kind = ExprKind::Member { object, property, computed };
                Ok(Folded::new(ty, rebuild(expr, kind)))
            }
            Applied::Depend { lifted, args, .. } => {
                debug!("member access depends on State at {:?}", expr.span);
                Ok(depend(expr.span, lifted, operator(MEMBER_OPERATOR, expr.span), args))
            }
        }
    }

    fn function(
        &self,
        folder: &Folder<'_>,
        expr: &Expr,
        name: Option<&str>,
        params: &[Param],
        body: &Expr,
        arrow: bool,
    ) -> FoldResult {
        let params = params
            .iter()
            .map(|param| {
                let default = param.default.as_ref().map(|d| folder.fold(d).map(|f| f.expr)).transpose()?;
                Ok(Param { name: param.name.clone(), default, span: param.span })
            })
            .collect::<Result<Vec<_>, TransformError>>()?;
        let body = folder.fold(body)?;

        let ty = if body.ty.is_state() { Type::to_state() } else { Type::value_to_value() };
        let kind = ExprKind::Function {
            name: name.map(String::from),
            params,
            body: Box::new(body.expr),
            arrow,
        };
        Ok(Folded::new(ty, rebuild(expr, kind)))
    }
}
