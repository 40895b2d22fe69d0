//! Environment for variable bindings.
//!
//! Scopes are immutable and shared, so a closure can hold on to the scope
//! it was created in while callers keep extending their own.

use std::collections::HashMap;
use std::rc::Rc;

use crate::value::Value;

/// A scope in the environment.
#[derive(Default)]
struct Scope {
    bindings: HashMap<String, Value>,
    parent: Environment,
}

/// The environment holding variable bindings.
#[derive(Clone, Default)]
pub struct Environment {
    scope: Option<Rc<Scope>>,
}

impl Environment {
    /// Create a new empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// A child environment with `bindings` in its innermost scope.
    pub fn extend(&self, bindings: HashMap<String, Value>) -> Environment {
        Environment {
            scope: Some(Rc::new(Scope { bindings, parent: self.clone() })),
        }
    }

    /// A child environment binding a single name.
    pub fn bind(&self, name: impl Into<String>, value: Value) -> Environment {
        self.extend(HashMap::from([(name.into(), value)]))
    }

    /// Look up a variable.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let mut current = self.scope.as_deref();
        while let Some(scope) = current {
            if let Some(value) = scope.bindings.get(name) {
                return Some(value);
            }
            current = scope.parent.scope.as_deref();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_scopes_shadow_outer() {
        let outer = Environment::new().bind("x", Value::Number(1.0));
        let inner = outer.bind("x", Value::Number(2.0));
        assert_eq!(inner.get("x"), Some(&Value::Number(2.0)));
        assert_eq!(outer.get("x"), Some(&Value::Number(1.0)));
        assert_eq!(inner.get("y"), None);
    }
}
