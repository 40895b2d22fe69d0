// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! A synchronous resolver for [`Descriptors`](crate::Descriptors) output.
//!
//! Every dependency is available immediately, so resolving a descriptor is
//! just running the calls it describes in order. Useful for tests and the
//! command line; a real runtime would schedule the same descriptors
//! asynchronously.

use log::trace;

use crate::interp::{Interpreter, RuntimeError};
use crate::value::{State, Value};

/// Resolve `value` to a plain value. Non-State values are returned as is.
pub fn resolve(interp: &Interpreter<'_>, value: Value) -> Result<Value, RuntimeError> {
    let Value::State(state) = &value else {
        return Ok(value);
    };

    match &**state {
        State::Success(inner) => Ok(inner.clone()),
        State::Depend { lifted, callee, args } => {
            let callee = resolve(interp, callee.clone())?;
            let args = args
                .iter()
                .map(|arg| resolve(interp, arg.clone()))
                .collect::<Result<Vec<_>, _>>()?;
            trace!("resolving dependency on {} with {} argument(s)", callee, args.len());
            let result = interp.call(&callee, args)?;
            // A callee that was not lifted produces State of its own.
            if *lifted {
                Ok(result)
            } else {
                resolve(interp, result)
            }
        }
        State::Deferred { callee, args } => {
            let result = interp.call(callee, args.clone())?;
            resolve(interp, result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::{Descriptors, Namespace};
    use cause_ast::expr::Intrinsic;

    fn n(v: f64) -> Value {
        Value::Number(v)
    }

    #[test]
    fn plain_values_pass_through() {
        let interp = Interpreter::new(&Descriptors);
        assert_eq!(resolve(&interp, n(1.0)).unwrap(), n(1.0));
    }

    #[test]
    fn lifted_operator() {
        let ns = Descriptors;
        let interp = Interpreter::new(&ns);
        let plus = ns.operator("+").unwrap();
        let state = ns.depend(true, plus, vec![ns.success(n(1.0)), ns.success(n(2.0))]);
        assert_eq!(resolve(&interp, state).unwrap(), n(3.0));
    }

    #[test]
    fn deferred_call_is_made_and_resolved() {
        let ns = Descriptors;
        let interp = Interpreter::new(&ns);
        let load = Value::native("load", |interp, args| {
            let key = args.into_iter().next().unwrap_or(Value::Undefined);
            Ok(interp.namespace().success(key))
        });
        let state = ns.wrap(load, vec![Value::string("k")]);
        assert_eq!(resolve(&interp, state).unwrap(), Value::string("k"));
    }

    #[test]
    fn unlifted_results_are_resolved_again() {
        let ns = Descriptors;
        let interp = Interpreter::new(&ns);
        let thunk = |v: f64| Value::native("thunk", move |interp, _| Ok(interp.namespace().success(n(v))));
        let state = ns.depend(
            false,
            ns.intrinsic(Intrinsic::If),
            vec![ns.success(Value::Bool(false)), ns.success(thunk(1.0)), ns.success(thunk(2.0))],
        );
        assert_eq!(resolve(&interp, state).unwrap(), n(2.0));
    }
}
