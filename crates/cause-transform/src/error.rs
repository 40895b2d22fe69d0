// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Rewrite errors.

use cause_ast::Span;
use cause_types::Type;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    /// The branches of a conditional disagree and at least one is a function.
    #[error(
        "The following expression is too hard to figure out. The consequent returns {consequent} \
         but the alternate returns {alternate}. I can currently only handle non-function mismatches."
    )]
    Undecidable {
        consequent: Type,
        alternate: Type,
        span: Span,
    },
    /// A rewriter-only form appeared in the input.
    #[error("{form} cannot appear in input; only lambda form is accepted")]
    NotLambdaForm { form: &'static str, span: Span },
}

impl TransformError {
    pub fn span(&self) -> Span {
        match self {
            TransformError::Undecidable { span, .. } | TransformError::NotLambdaForm { span, .. } => *span,
        }
    }
}
