// SPDX-License-Identifier: (MIT OR Apache-2.0)

use cause_interp::RuntimeError;
use cause_parser::ParseError;
use cause_transform::TransformError;

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("could not parse the source ({} error(s))", .0.len())]
    Parse(Vec<ParseError>),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("no binding for free variable(s): {}", .0.join(", "))]
    MissingBindings(Vec<String>),
}

/// Anything that can go wrong between source text and a result.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}
