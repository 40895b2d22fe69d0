// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The dependency runtime seam.
//!
//! Rewritten code never builds dependency descriptors itself. Every
//! `δ.success`, `δ.depend`, `δ(...)`, `δ.operators[...]` and `δ["if"]` in
//! the tree is evaluated by calling into a [`Namespace`].

use cause_ast::expr::Intrinsic;

use crate::interp::RuntimeError;
use crate::operators;
use crate::value::{State, Value};

pub trait Namespace {
    /// Lift a plain value into State.
    fn success(&self, value: Value) -> Value;

    /// A call to `callee` that waits on State arguments.
    fn depend(&self, lifted: bool, callee: Value, args: Vec<Value>) -> Value;

    /// A call to a State-producing function, handed to the runtime instead
    /// of being made directly.
    fn wrap(&self, callee: Value, args: Vec<Value>) -> Value;

    /// The operator named `name` as a callable value.
    fn operator(&self, name: &str) -> Result<Value, RuntimeError>;

    fn intrinsic(&self, intrinsic: Intrinsic) -> Value;
}

/// Builds [`State`] descriptors and resolves nothing.
///
/// Pair with [`eager::resolve`](crate::eager::resolve) to run them.
#[derive(Debug, Default, Clone, Copy)]
pub struct Descriptors;

impl Namespace for Descriptors {
    fn success(&self, value: Value) -> Value {
        Value::state(State::Success(value))
    }

    fn depend(&self, lifted: bool, callee: Value, args: Vec<Value>) -> Value {
        Value::state(State::Depend { lifted, callee, args })
    }

    fn wrap(&self, callee: Value, args: Vec<Value>) -> Value {
        Value::state(State::Deferred { callee, args })
    }

    fn operator(&self, name: &str) -> Result<Value, RuntimeError> {
        operators::lookup(name).ok_or_else(|| RuntimeError::UnknownOperator(name.to_string()))
    }

    fn intrinsic(&self, intrinsic: Intrinsic) -> Value {
        match intrinsic {
            // (test, consequent thunk, alternate thunk)
            Intrinsic::If => Value::native(intrinsic.name(), |interp, args| {
                let [test, consequent, alternate]: [Value; 3] = args
                    .try_into()
                    .map_err(|args: Vec<Value>| RuntimeError::ArityMismatch { expected: 3, got: args.len() })?;
                let branch = if operators::truthy(&test) { consequent } else { alternate };
                interp.call(&branch, Vec::new())
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Interpreter;

    #[test]
    fn descriptors() {
        let ns = Descriptors;
        let one = Value::Number(1.0);
        assert_eq!(ns.success(one.clone()), Value::state(State::Success(one.clone())));
        let deferred = ns.wrap(Value::Null, vec![one.clone()]);
        assert_eq!(deferred.as_state(), Some(&State::Deferred { callee: Value::Null, args: vec![one] }));
    }

    #[test]
    fn unknown_operator() {
        assert!(matches!(Descriptors.operator("<=>"), Err(RuntimeError::UnknownOperator(name)) if name == "<=>"));
    }

    #[test]
    fn if_calls_only_the_chosen_thunk() {
        let interp = Interpreter::new(&Descriptors);
        let chosen = Value::native("chosen", |_, _| Ok(Value::string("yes")));
        let never = Value::native("never", |_, _| Err(RuntimeError::TypeError("called".into())));
        let if_ = Descriptors.intrinsic(Intrinsic::If);

        let result = interp.call(&if_, vec![Value::Bool(true), chosen.clone(), never.clone()]);
        assert_eq!(result.unwrap(), Value::string("yes"));
        let result = interp.call(&if_, vec![Value::Number(0.0), never, chosen]);
        assert_eq!(result.unwrap(), Value::string("yes"));
    }

    #[test]
    fn if_checks_arity() {
        let interp = Interpreter::new(&Descriptors);
        let if_ = Descriptors.intrinsic(Intrinsic::If);
        let err = interp.call(&if_, vec![Value::Bool(true)]).unwrap_err();
        assert!(matches!(err, RuntimeError::ArityMismatch { expected: 3, got: 1 }));
    }
}
