// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type-directed State/Value rewriting.
//!
//! [`LambdaForm`] validates the input and finds its free variables,
//! [`Folder`] walks the tree bottom-up, and [`DeltaRules`] decides how each
//! node is rewritten so that State is only ever consumed through the
//! dependency runtime.

pub mod delta;
mod error;
mod fold;
mod lambda_form;
mod rules;
mod symbols;

pub use error::TransformError;
pub use fold::{rebuild, FoldResult, Folded, Folder, Rules};
pub use lambda_form::{LambdaForm, Normalize, Normalized};
pub use rules::DeltaRules;
pub use symbols::Symbols;

/// Rewrite `expr` with the default rules for `namespace`.
pub fn rewrite(expr: &cause_ast::expr::Expr, namespace: &str) -> FoldResult {
    let rules = DeltaRules::new(namespace);
    Folder::new(&rules).fold(expr)
}
