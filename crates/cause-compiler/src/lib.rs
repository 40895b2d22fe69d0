// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The compile driver.
//!
//! Parses one expression, checks it is in lambda form, rewrites it with
//! [`DeltaRules`](cause_transform::DeltaRules), and packages the result as
//! a [`Unit`] that runs against any [`Namespace`](cause_interp::Namespace).

mod config;
mod driver;
mod error;
mod unit;

pub use config::CompileOptions;
pub use driver::{Compiled, Compiler};
pub use error::{CompileError, Error};
pub use unit::Unit;

use cause_transform::Symbols;

/// Compile with default options.
pub fn compile(symbols: impl Into<Symbols>, source: &str) -> Result<Compiled, CompileError> {
    Compiler::default().compile(symbols, source)
}
