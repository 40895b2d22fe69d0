// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The interpreter implementation.
//!
//! A tree-walk evaluator for rewritten expressions. Surface nodes follow
//! JavaScript semantics; rewriter nodes are forwarded to the [`Namespace`]
//! the interpreter was created with.

use std::collections::HashMap;
use std::rc::Rc;

use cause_ast::expr::{Expr, ExprKind, Intrinsic, LogicalOp};
use indexmap::IndexMap;

use crate::env::Environment;
use crate::namespace::Namespace;
use crate::operators;
use crate::value::{Closure, Value};

/// The tree-walk interpreter.
pub struct Interpreter<'n> {
    namespace: &'n dyn Namespace,
}

impl<'n> Interpreter<'n> {
    pub fn new(namespace: &'n dyn Namespace) -> Self {
        Self { namespace }
    }

    pub fn namespace(&self) -> &'n dyn Namespace {
        self.namespace
    }

    /// Evaluate an expression.
    pub fn eval(&self, expr: &Expr, env: &Environment) -> Result<Value, RuntimeError> {
        match &expr.kind {
            ExprKind::Number(n) => Ok(Value::Number(*n)),
            ExprKind::String(s) => Ok(Value::string(s.as_str())),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Null => Ok(Value::Null),
            ExprKind::Undefined => Ok(Value::Undefined),
            ExprKind::Ident(name) => env
                .get(name)
                .cloned()
                .ok_or_else(|| RuntimeError::UndefinedVariable(name.clone())),

            ExprKind::Unary { op, operand } => {
                let operand = self.eval(operand, env)?;
                Ok(operators::unary(*op, &operand))
            }
            ExprKind::Binary { op, left, right } => {
                let left = self.eval(left, env)?;
                let right = self.eval(right, env)?;
                operators::binary(*op, &left, &right)
            }
            // Short-circuit: the right side is only evaluated when needed.
            ExprKind::Logical { op, left, right } => {
                let left = self.eval(left, env)?;
                let decided = match op {
                    LogicalOp::And => !operators::truthy(&left),
                    LogicalOp::Or => operators::truthy(&left),
                    LogicalOp::Coalesce => !operators::nullish(&left),
                };
                if decided {
                    Ok(left)
                } else {
                    self.eval(right, env)
                }
            }
            ExprKind::Call { callee, args } => {
                let callee = self.eval(callee, env)?;
                let args = self.eval_all(args, env)?;
                self.call(&callee, args)
            }
            ExprKind::Conditional { test, consequent, alternate } => {
                if operators::truthy(&self.eval(test, env)?) {
                    self.eval(consequent, env)
                } else {
                    self.eval(alternate, env)
                }
            }
            ExprKind::Array(elements) => Ok(Value::array(self.eval_all(elements, env)?)),
            ExprKind::Member { object, property, computed } => {
                let object = self.eval(object, env)?;
                let key = if *computed {
                    operators::property_key(&self.eval(property, env)?)
                } else {
                    property.as_ident().unwrap_or_default().to_string()
                };
                operators::get_property(&object, &key)
            }
            ExprKind::Function { name, params, body, .. } => Ok(Value::Function(Rc::new(Closure {
                name: name.clone(),
                params: params.clone(),
                body: (**body).clone(),
                env: env.clone(),
            }))),

            ExprKind::Success(value) => {
                let value = self.eval(value, env)?;
                Ok(self.namespace.success(value))
            }
            ExprKind::Wrap { callee, args } => {
                let callee = self.eval(callee, env)?;
                let args = self.eval_all(args, env)?;
                Ok(self.namespace.wrap(callee, args))
            }
            ExprKind::Depend { lifted, callee, args } => {
                let callee = self.eval(callee, env)?;
                let args = self.eval_all(args, env)?;
                Ok(self.namespace.depend(*lifted, callee, args))
            }
            ExprKind::Operator(name) => self.namespace.operator(name),
            ExprKind::Intrinsic(intrinsic) => Ok(self.namespace.intrinsic(*intrinsic)),
        }
    }

    fn eval_all(&self, exprs: &[Expr], env: &Environment) -> Result<Vec<Value>, RuntimeError> {
        exprs.iter().map(|e| self.eval(e, env)).collect()
    }

    /// Call a function value with arguments.
    ///
    /// Missing arguments are `undefined` (or the parameter default); extra
    /// arguments are ignored.
    pub fn call(&self, callee: &Value, args: Vec<Value>) -> Result<Value, RuntimeError> {
        match callee {
            Value::Function(closure) => {
                let mut env = closure.env.clone();
                // A named function literal sees itself by name.
                if let Some(name) = &closure.name {
                    env = env.bind(name.clone(), callee.clone());
                }

                let mut args = args.into_iter();
                for param in &closure.params {
                    let value = match (args.next(), &param.default) {
                        (Some(Value::Undefined) | None, Some(default)) => self.eval(default, &env)?,
                        (Some(value), _) => value,
                        (None, None) => Value::Undefined,
                    };
                    env = env.bind(param.name.clone(), value);
                }

                self.eval(&closure.body, &env)
            }
            Value::Native(native) => (native.func)(self, args),
            other => Err(RuntimeError::NotCallable(other.to_string())),
        }
    }

    /// The namespace as an ordinary object, for code that reaches it by
    /// name (`δ.success(x)`, `δ.operators["+"]`).
    pub fn namespace_object(&self) -> Value {
        let operators: IndexMap<String, Value> = operators::names()
            .filter_map(|name| Some((name.to_string(), self.namespace.operator(name).ok()?)))
            .collect();

        let mut entries = IndexMap::new();
        entries.insert(
            "success".to_string(),
            Value::native("success", |interp, args| {
                let value = args.into_iter().next().unwrap_or(Value::Undefined);
                Ok(interp.namespace().success(value))
            }),
        );
        entries.insert(
            "depend".to_string(),
            Value::native("depend", |interp, args| {
                let mut args = args.into_iter();
                let lifted = operators::truthy(&args.next().unwrap_or(Value::Undefined));
                let callee = args.next().unwrap_or(Value::Undefined);
                Ok(interp.namespace().depend(lifted, callee, args.collect()))
            }),
        );
        entries.insert("operators".to_string(), Value::object(operators));
        entries.insert(Intrinsic::If.name().to_string(), self.namespace.intrinsic(Intrinsic::If));
        Value::object(entries)
    }

    /// Evaluate `body` with `bindings` in scope.
    pub fn eval_with(&self, body: &Expr, bindings: HashMap<String, Value>) -> Result<Value, RuntimeError> {
        self.eval(body, &Environment::new().extend(bindings))
    }
}

/// A runtime error.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("undefined variable: {0}")]
    UndefinedVariable(String),

    #[error("{0} is not a function")]
    NotCallable(String),

    #[error("type error: {0}")]
    TypeError(String),

    #[error("unknown operator: {0:?}")]
    UnknownOperator(String),

    #[error("arity mismatch: expected {expected}, got {got}")]
    ArityMismatch { expected: usize, got: usize },
}
