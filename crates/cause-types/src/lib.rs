// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The Value/State type lattice.
//!
//! Every subexpression is classified as a plain [`Type::Value`], a
//! [`Type::State`] that must be consumed through the dependency runtime, or
//! a [`Type::Function`] whose output tells what calling it produces.

mod types;

pub use types::{NonFunction, Type};
