// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type representation.

use std::fmt;

/// The type of an expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// A plain value, usable directly.
    Value,
    /// A value that is only available through the dependency runtime.
    State,
    /// A function; calling it yields `output`.
    Function { input: Box<Type>, output: Box<Type> },
}

impl Type {
    /// The neutral element of [`Type::concat`].
    pub fn identity() -> Type {
        Type::Value
    }

    /// `Function(Value -> Value)`
    pub fn value_to_value() -> Type {
        Type::function(Type::Value, Type::Value)
    }

    /// `Function(Value -> State)`
    pub fn to_state() -> Type {
        Type::function(Type::Value, Type::State)
    }

    pub fn function(input: Type, output: Type) -> Type {
        Type::Function { input: Box::new(input), output: Box::new(output) }
    }

    /// Combine two types: `State` absorbs, everything else is `Value`.
    pub fn concat(&self, other: &Type) -> Type {
        self.flatten().max(other.flatten()).into()
    }

    /// This type as [`Type::concat`] sees it. Functions count as `Value`;
    /// they are only State-shaped once called.
    pub fn flatten(&self) -> NonFunction {
        match self {
            Type::State => NonFunction::State,
            Type::Value | Type::Function { .. } => NonFunction::Value,
        }
    }

    /// Fold [`Type::concat`] over `types`, starting from the identity.
    pub fn concat_all<'a>(types: impl IntoIterator<Item = &'a Type>) -> Type {
        types
            .into_iter()
            .fold(Type::identity(), |acc, ty| acc.concat(ty))
    }

    /// The type produced by calling this type: the output of a function,
    /// otherwise the type itself.
    pub fn returns(&self) -> Type {
        match self {
            Type::Function { output, .. } => (**output).clone(),
            other => other.clone(),
        }
    }

    pub fn is_state(&self) -> bool {
        matches!(self, Type::State)
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Type::Function { .. })
    }
}

impl Default for Type {
    fn default() -> Self {
        Type::identity()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Value => write!(f, "Value"),
            Type::State => write!(f, "State"),
            Type::Function { input, output } => write!(f, "Function({} -> {})", input, output),
        }
    }
}

/// The non-function half of the lattice, ordered so that the join is `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NonFunction {
    Value,
    State,
}

impl From<NonFunction> for Type {
    fn from(ty: NonFunction) -> Self {
        match ty {
            NonFunction::Value => Type::Value,
            NonFunction::State => Type::State,
        }
    }
}
