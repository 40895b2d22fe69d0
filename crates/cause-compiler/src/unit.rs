// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Executable form of a compiled expression.

use std::collections::HashMap;

use cause_ast::expr::Expr;
use cause_interp::{Interpreter, RuntimeError, Value};
use indexmap::IndexMap;
use log::debug;

/// A rewritten body plus the parameters it expects: the namespace
/// identifier first, then each free variable in first-use order.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub parameters: Vec<String>,
    pub body: Expr,
}

impl Unit {
    pub fn new(namespace: impl Into<String>, free: impl IntoIterator<Item = String>, body: Expr) -> Self {
        let mut parameters = vec![namespace.into()];
        parameters.extend(free);
        Self { parameters, body }
    }

    pub fn namespace(&self) -> &str {
        &self.parameters[0]
    }

    pub fn free(&self) -> &[String] {
        &self.parameters[1..]
    }

    /// Run the body. The namespace parameter is bound to the interpreter's
    /// namespace; free variables are bound from `values` by name.
    ///
    /// A free variable with no value is only an error if the body reads it.
    pub fn invoke(&self, interp: &Interpreter<'_>, values: &IndexMap<String, Value>) -> Result<Value, RuntimeError> {
        let mut bindings = HashMap::with_capacity(self.parameters.len());
        bindings.insert(self.namespace().to_string(), interp.namespace_object());
        for name in self.free() {
            if let Some(value) = values.get(name) {
                bindings.insert(name.clone(), value.clone());
            }
        }

        let unused = values.keys().filter(|k| !self.free().contains(k)).count();
        if unused > 0 {
            debug!("ignoring {} value(s) that the body never reads", unused);
        }

        interp.eval_with(&self.body, bindings)
    }
}
