// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Tree-walk interpreter for rewritten expressions.
//!
//! Evaluates a rewritten tree directly. The dependency runtime is reached
//! through the [`Namespace`] trait; [`Descriptors`] builds inspectable
//! descriptors and [`eager::resolve`] runs them synchronously.

pub mod eager;
mod env;
mod interp;
mod namespace;
pub mod operators;
mod value;

pub use env::Environment;
pub use interp::{Interpreter, RuntimeError};
pub use namespace::{Descriptors, Namespace};
pub use value::{Closure, Native, NativeFn, State, Value};
