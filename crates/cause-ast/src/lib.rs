// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression tree types for the cause rewriter.
//!
//! This crate defines the nodes shared between the lexer, parser,
//! rewriter, and interpreter, plus the printer that turns a tree back
//! into source text.

pub mod span;
pub mod token;
pub mod expr;
pub mod print;

pub use span::{LineIndex, Location, Span};
pub use print::Printer;

/// Unique identifier for expression nodes.
///
/// Nodes synthesized by the rewriter carry [`NodeId::DUMMY`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const DUMMY: NodeId = NodeId(u32::MAX);
}

/// The reserved identifier that names the dependency-runtime namespace.
pub const DEFAULT_NAMESPACE: &str = "δ";
