// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Runtime values.

use std::fmt;
use std::rc::Rc;

use cause_ast::expr::{Expr, Param};
use cause_ast::print::format_number;
use indexmap::IndexMap;

use crate::env::Environment;
use crate::interp::{Interpreter, RuntimeError};

/// Signature of functions implemented in Rust.
pub type NativeFn = dyn Fn(&Interpreter<'_>, Vec<Value>) -> Result<Value, RuntimeError>;

/// A runtime value in the interpreter.
#[derive(Clone)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Array(Rc<Vec<Value>>),
    Object(Rc<IndexMap<String, Value>>),
    /// A function literal closed over its environment
    Function(Rc<Closure>),
    /// A function implemented in Rust
    Native(Rc<Native>),
    /// A dependency descriptor built by the namespace
    State(Rc<State>),
}

/// A user function together with the scope it was created in.
pub struct Closure {
    pub name: Option<String>,
    pub params: Vec<Param>,
    pub body: Expr,
    pub env: Environment,
}

pub struct Native {
    pub name: String,
    pub func: Box<NativeFn>,
}

/// Descriptors produced by [`Descriptors`](crate::Descriptors).
#[derive(Debug, Clone, PartialEq)]
pub enum State {
    /// An already-available value.
    Success(Value),
    /// Call `callee` with `args` once they are available. When `lifted` is
    /// false the call itself produces State.
    Depend {
        lifted: bool,
        callee: Value,
        args: Vec<Value>,
    },
    /// A call to a State-producing function, not yet made.
    Deferred { callee: Value, args: Vec<Value> },
}

impl Value {
    pub fn string(s: impl Into<Rc<str>>) -> Value {
        Value::String(s.into())
    }

    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(items))
    }

    pub fn object(entries: IndexMap<String, Value>) -> Value {
        Value::Object(Rc::new(entries))
    }

    pub fn native(
        name: impl Into<String>,
        func: impl Fn(&Interpreter<'_>, Vec<Value>) -> Result<Value, RuntimeError> + 'static,
    ) -> Value {
        Value::Native(Rc::new(Native { name: name.into(), func: Box::new(func) }))
    }

    pub fn state(state: State) -> Value {
        Value::State(Rc::new(state))
    }

    pub fn as_state(&self) -> Option<&State> {
        match self {
            Value::State(state) => Some(state),
            _ => None,
        }
    }

    /// The name reported in type errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) | Value::Native(_) => "function",
            Value::State(_) => "state",
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::array(items)
    }
}

/// Structural equality for data; identity for functions.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),
            (Value::State(a), Value::State(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Renders values the way a REPL would show them: strings quoted,
/// containers expanded.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Object(entries) => {
                if entries.is_empty() {
                    return write!(f, "{{}}");
                }
                write!(f, "{{ ")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, " }}")
            }
            Value::Function(closure) => match &closure.name {
                Some(name) => write!(f, "[Function {}]", name),
                None => write!(f, "[Function (anonymous)]"),
            },
            Value::Native(native) => write!(f, "[Function {}]", native.name),
            Value::State(state) => write!(f, "{}", state),
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Success(value) => write!(f, "Success({})", value),
            State::Depend { lifted, callee, args } => {
                write!(f, "Depend({}, {}", lifted, callee)?;
                for arg in args {
                    write!(f, ", {}", arg)?;
                }
                write!(f, ")")
            }
            State::Deferred { callee, args } => {
                write!(f, "Deferred({}", callee)?;
                for arg in args {
                    write!(f, ", {}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}
